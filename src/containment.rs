//! Point-in-box queries.
//!
//! The batched primitive that decides which box a point falls into is
//! pluggable through [`PointsInBoxesBatch`]; [`BoxSet::points_in_boxes`]
//! only prepares its inputs in the LiDAR frame and unwraps the result.

use crate::{
    convert::FrameRegistry,
    error::{BoxError, Result},
    frame::Frame,
    points::PointSet,
    types::{BoxRow, BoxSet},
    utils::yaw_rotation,
};
use log::debug;
use nalgebra as na;

/// Batched point-in-oriented-box search.
///
/// `points[b]` is queried against `boxes[b]`, both in the LiDAR frame. The
/// result has the shape of `points`; each entry holds the index of a box
/// containing the point, or `None`. Implementations backed by an
/// accelerator must only return once their results are complete.
pub trait PointsInBoxesBatch {
    fn query(
        &self,
        points: &[Vec<na::Point3<f64>>],
        boxes: &[BoxSet],
    ) -> Result<Vec<Vec<Option<usize>>>>;
}

/// Reference implementation on the CPU: the first box containing a point
/// wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuPointsInBoxes;

impl CpuPointsInBoxes {
    fn contains(row: BoxRow<'_>, point: &na::Point3<f64>) -> bool {
        let center = row.center();
        let size = row.size();
        let half_height = size.z / 2.0;
        if (point.z - (center.z + half_height)).abs() > half_height {
            return false;
        }
        // Undo the yaw applied to the box corners.
        let shift = point - center;
        let local = yaw_rotation(2, row.yaw()) * na::Vector3::new(shift.x, shift.y, 0.0);
        local.x.abs() < size.x / 2.0 && local.y.abs() < size.y / 2.0
    }
}

impl PointsInBoxesBatch for CpuPointsInBoxes {
    fn query(
        &self,
        points: &[Vec<na::Point3<f64>>],
        boxes: &[BoxSet],
    ) -> Result<Vec<Vec<Option<usize>>>> {
        if points.len() != boxes.len() {
            return Err(BoxError::Containment(format!(
                "{} point batches for {} box batches",
                points.len(),
                boxes.len()
            )));
        }
        if let Some(other) = boxes.iter().find(|b| b.frame() != Frame::Lidar) {
            return Err(BoxError::Containment(format!(
                "expected lidar boxes, got {}",
                other.frame()
            )));
        }

        let indices = points
            .iter()
            .zip(boxes)
            .map(|(points, boxes)| {
                points
                    .iter()
                    .map(|point| boxes.rows().position(|row| Self::contains(row, point)))
                    .collect()
            })
            .collect();
        Ok(indices)
    }
}

impl BoxSet {
    /// Index of the box each point lies in, or `None`.
    ///
    /// `points` are given in this set's frame as `[M, C]` or `[1, M, C]`.
    /// Both points and boxes are moved to the LiDAR frame before the query.
    pub fn points_in_boxes(
        &self,
        registry: &FrameRegistry,
        primitive: &impl PointsInBoxesBatch,
        points: &PointSet,
    ) -> Result<Vec<Option<usize>>> {
        let points_lidar = registry.convert_points(self.frame, Frame::Lidar, points)?;
        let boxes_lidar = self.convert_to(registry, Frame::Lidar, None)?;
        debug!(
            "querying {} points against {} boxes",
            points.len(),
            boxes_lidar.len()
        );

        let batch = vec![points_lidar.xyz().collect::<Vec<_>>()];
        let mut result = primitive.query(&batch, std::slice::from_ref(&boxes_lidar))?;

        match (result.pop(), result.is_empty()) {
            (Some(indices), true) if indices.len() == points.len() => Ok(indices),
            _ => Err(BoxError::Containment(
                "primitive returned a result of the wrong shape".to_string(),
            )),
        }
    }
}
