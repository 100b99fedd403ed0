//! In-place transforms of a [`BoxSet`] and its accompanying points.

use crate::{
    frame::FlipDirection,
    geometry::box_corners,
    points::PointSet,
    types::{BoxRow, BoxSet, YAW},
    utils::{limit_period, right_mul},
};
use itertools::Itertools;
use log::trace;
use nalgebra as na;
use noisy_float::prelude::*;
use std::f64::consts::PI;

impl BoxSet {
    /// Rotate boxes, and optionally points, about the frame's vertical axis.
    ///
    /// Returns the matrix that was right-multiplied onto the centers (and
    /// points) so callers can apply the same rotation elsewhere. Boxes
    /// without yaw stay axis-aligned: their horizontal size becomes the
    /// extent of the rotated corners.
    pub fn rotate(&mut self, angle: f64, points: Option<&mut PointSet>) -> na::Matrix3<f64> {
        let frame = self.frame;
        let rot_mat_t = frame.rotation_matrix(angle);
        let [a0, a1] = frame.bev_axes();
        let with_yaw = self.with_yaw;
        let yaw_step = frame.yaw_step() * angle;

        for row in self.rows_mut() {
            if !with_yaw {
                let corners =
                    box_corners(frame, BoxRow(&*row)).map(|c| right_mul(&c.coords, &rot_mat_t));
                let extent = |axis: usize| {
                    corners
                        .iter()
                        .map(|c| r64(c[axis]))
                        .minmax()
                        .into_option()
                        .map(|(lo, hi)| (hi - lo).raw())
                };
                if let (Some(e0), Some(e1)) = (extent(a0), extent(a1)) {
                    row[3 + a0] = e0;
                    row[3 + a1] = e1;
                }
            } else {
                row[YAW] += yaw_step;
            }

            let center = na::Vector3::new(row[0], row[1], row[2]);
            row[..3].copy_from_slice(right_mul(&center, &rot_mat_t).as_slice());
        }

        if let Some(points) = points {
            points.map_xyz(|p| right_mul(&p, &rot_mat_t));
        }
        trace!("rotated {} {} boxes by {angle} rad", self.len(), frame);
        rot_mat_t
    }

    /// Mirror boxes, and optionally points, in the bird's-eye view.
    pub fn flip(&mut self, direction: FlipDirection, points: Option<&mut PointSet>) {
        let axis = self.frame.flip_axis(direction);
        let with_yaw = self.with_yaw;

        for row in self.rows_mut() {
            row[axis] = -row[axis];
            if with_yaw {
                row[YAW] = match direction {
                    FlipDirection::Horizontal => PI - row[YAW],
                    FlipDirection::Vertical => -row[YAW],
                };
            }
        }

        if let Some(points) = points {
            points.negate_axis(axis);
        }
        trace!("flipped {} {} boxes {direction:?}", self.len(), self.frame);
    }

    /// Whether each center lies strictly inside `(xmin, ymin, xmax, ymax)`
    /// in the bird's-eye view.
    ///
    /// Only the center is tested, not the whole rotated footprint.
    pub fn in_range_bev(&self, range: [f64; 4]) -> Vec<bool> {
        let [a0, a1] = self.frame.bev_axes();
        let [xmin, ymin, xmax, ymax] = range;
        self.rows()
            .map(|row| {
                let c = row.center();
                c[a0] > xmin && c[a1] > ymin && c[a0] < xmax && c[a1] < ymax
            })
            .collect()
    }

    /// Whether each center lies strictly inside
    /// `(xmin, ymin, zmin, xmax, ymax, zmax)`.
    pub fn in_range_3d(&self, range: [f64; 6]) -> Vec<bool> {
        self.rows()
            .map(|row| {
                let c = row.center();
                (0..3).all(|axis| c[axis] > range[axis] && c[axis] < range[axis + 3])
            })
            .collect()
    }

    pub fn translate(&mut self, offset: na::Vector3<f64>) {
        for row in self.rows_mut() {
            for axis in 0..3 {
                row[axis] += offset[axis];
            }
        }
    }

    /// Scale centers and sizes by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for row in self.rows_mut() {
            row[..6].iter_mut().for_each(|v| *v *= factor);
        }
    }

    /// Wrap every yaw into `[-offset * period, (1 - offset) * period)`.
    pub fn limit_yaw(&mut self, offset: f64, period: f64) {
        for row in self.rows_mut() {
            row[YAW] = limit_period(row[YAW], offset, period);
        }
    }
}
