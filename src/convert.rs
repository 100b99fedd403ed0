//! Conversion of boxes and points between coordinate frames.
//!
//! Every conversion goes through a [`FrameRegistry`], a table of
//! [`ConversionRule`]s keyed by ordered `(src, dst)` frame pairs.

use crate::{
    error::{BoxError, Result},
    frame::Frame,
    points::PointSet,
    types::BoxSet,
};
use log::debug;
use nalgebra as na;
use std::collections::HashMap;

/// An affine map `p ↦ rotation · p + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: na::Matrix3<f64>,
    pub translation: na::Vector3<f64>,
}

impl RigidTransform {
    pub fn new(rotation: na::Matrix3<f64>, translation: na::Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::from_rotation(na::Matrix3::identity())
    }

    pub fn from_rotation(rotation: na::Matrix3<f64>) -> Self {
        Self::new(rotation, na::Vector3::zeros())
    }

    /// Split a `3 x 4` `[R | t]` matrix.
    pub fn from_matrix3x4(mat: &na::Matrix3x4<f64>) -> Self {
        Self::new(
            mat.fixed_view::<3, 3>(0, 0).into_owned(),
            mat.fixed_view::<3, 1>(0, 3).into_owned(),
        )
    }

    pub fn apply(&self, v: &na::Vector3<f64>) -> na::Vector3<f64> {
        self.rotation * v + self.translation
    }

    pub fn inverse(&self) -> Option<Self> {
        let rotation = self.rotation.try_inverse()?;
        let translation = -(rotation * self.translation);
        Some(Self::new(rotation, translation))
    }
}

/// How box rows change between two frames: the transform applied to the
/// reference point and the permutation applied to the sizes
/// (`new_size[i] = old_size[size_order[i]]`). Yaw carries over unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRule {
    pub transform: RigidTransform,
    pub size_order: [usize; 3],
}

impl ConversionRule {
    fn identity() -> Self {
        Self {
            transform: RigidTransform::identity(),
            size_order: [0, 1, 2],
        }
    }

    fn from_rows(rows: [[f64; 3]; 3], size_order: [usize; 3]) -> Self {
        let rotation = na::Matrix3::from_fn(|r, c| rows[r][c]);
        Self {
            transform: RigidTransform::from_rotation(rotation),
            size_order,
        }
    }

    pub fn inverse(&self) -> Option<Self> {
        let mut size_order = [0; 3];
        for (i, &j) in self.size_order.iter().enumerate() {
            size_order[j] = i;
        }
        Some(Self {
            transform: self.transform.inverse()?,
            size_order,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRegistry {
    rules: HashMap<(Frame, Frame), ConversionRule>,
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FrameRegistry {
    /// A registry without any rule; only same-frame conversions succeed.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Sensor-free axis permutations between the three frames.
    pub fn standard() -> Self {
        use Frame::*;
        let mut registry = Self::empty();
        let rules = [
            (Lidar, Camera, [[0., -1., 0.], [0., 0., -1.], [1., 0., 0.]], [1, 2, 0]),
            (Camera, Lidar, [[0., 0., 1.], [-1., 0., 0.], [0., -1., 0.]], [2, 0, 1]),
            (Depth, Camera, [[1., 0., 0.], [0., 0., -1.], [0., 1., 0.]], [0, 2, 1]),
            (Camera, Depth, [[1., 0., 0.], [0., 0., 1.], [0., -1., 0.]], [0, 2, 1]),
            (Lidar, Depth, [[0., -1., 0.], [1., 0., 0.], [0., 0., 1.]], [1, 0, 2]),
            (Depth, Lidar, [[0., 1., 0.], [-1., 0., 0.], [0., 0., 1.]], [1, 0, 2]),
        ];
        for (src, dst, rows, size_order) in rules {
            registry.register(src, dst, ConversionRule::from_rows(rows, size_order));
        }
        registry
    }

    /// Register `rule` for `src -> dst`, returning the rule it replaces.
    pub fn register(
        &mut self,
        src: Frame,
        dst: Frame,
        rule: ConversionRule,
    ) -> Option<ConversionRule> {
        self.rules.insert((src, dst), rule)
    }

    pub fn rule(&self, src: Frame, dst: Frame) -> Result<ConversionRule> {
        if src == dst {
            return Ok(ConversionRule::identity());
        }
        self.rules
            .get(&(src, dst))
            .copied()
            .ok_or(BoxError::NoConversionRule { src, dst })
    }

    /// Move point coordinates from `src` to `dst`.
    pub fn convert_points(&self, src: Frame, dst: Frame, points: &PointSet) -> Result<PointSet> {
        let mut converted = points.clone();
        if src != dst {
            let transform = self.rule(src, dst)?.transform;
            converted.map_xyz(|p| transform.apply(&p));
        }
        Ok(converted)
    }
}

impl BoxSet {
    /// A copy of these boxes expressed in `dst`.
    ///
    /// `rt` overrides the registered transform for this pair (for example a
    /// sensor calibration); the size permutation still comes from the
    /// registry. The source set is left unchanged.
    pub fn convert_to(
        &self,
        registry: &FrameRegistry,
        dst: Frame,
        rt: Option<&RigidTransform>,
    ) -> Result<BoxSet> {
        let src = self.frame;
        if src == dst {
            return Ok(self.clone());
        }
        let rule = registry.rule(src, dst)?;
        let transform = rt.copied().unwrap_or(rule.transform);
        debug!("converting {} boxes from {src} to {dst}", self.len());

        let mut data = self.data.clone();
        for row in data.chunks_exact_mut(self.box_dim) {
            let center = transform.apply(&na::Vector3::new(row[0], row[1], row[2]));
            let size = [row[3], row[4], row[5]];
            row[..3].copy_from_slice(center.as_slice());
            for (i, &j) in rule.size_order.iter().enumerate() {
                row[3 + i] = size[j];
            }
        }
        Ok(self.with_data(dst, data))
    }
}
