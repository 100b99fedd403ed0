//! Derived geometric views over a [`BoxSet`].

use crate::{
    frame::Frame,
    types::{BoxRow, BoxSet},
    utils::{limit_period, right_mul, yaw_rotation},
};
use geo::Coord;
use nalgebra as na;
use std::f64::consts::{FRAC_PI_4, PI};

/// Corners of the unit cube in `unravel_index` order, re-ordered so that
/// consecutive corners wind around each face:
/// (x0y0z0, x0y0z1, x0y1z1, x0y1z0, x1y0z0, x1y0z1, x1y1z1, x1y1z0).
const CORNER_ORDER: [usize; 8] = [0, 1, 3, 2, 4, 5, 7, 6];

fn unit_corner(index: usize) -> na::Vector3<f64> {
    na::Vector3::new(
        ((index >> 2) & 1) as f64,
        ((index >> 1) & 1) as f64,
        (index & 1) as f64,
    )
}

/// The 8 corners of one box.
pub(crate) fn box_corners(frame: Frame, row: BoxRow<'_>) -> [na::Point3<f64>; 8] {
    let size = row.size();
    let center = row.center();
    let origin = frame.relative_origin();
    let rot = yaw_rotation(frame.yaw_axis(), row.yaw());

    CORNER_ORDER.map(|index| {
        let local = (unit_corner(index) - origin).component_mul(&size);
        center + right_mul(&local, &rot)
    })
}

impl BoxSet {
    /// Volumetric centers: the bottom center moved up by half the height.
    pub fn gravity_center(&self) -> Vec<na::Point3<f64>> {
        let axis = self.frame.vertical_axis();
        let up = self.frame.up_sign();
        self.rows()
            .map(|row| {
                let mut center = row.center();
                center[axis] += up * row.size()[axis] * 0.5;
                center
            })
            .collect()
    }

    /// Corners of every box, `N x 8`.
    ///
    /// ```text
    ///                                up z
    ///                 front y           ^
    ///                      /            |
    ///                     /             |
    ///       (x0, y1, z1) + -----------  + (x1, y1, z1)
    ///                   /|            / |
    ///                  / |           /  |
    ///    (x0, y0, z1) + ----------- +   + (x1, y1, z0)
    ///                 |  /      .   |  /
    ///                 | / origin    | /
    ///    (x0, y0, z0) + ----------- + --------> right x
    ///                               (x1, y0, z0)
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the set is empty.
    pub fn corners(&self) -> Vec<[na::Point3<f64>; 8]> {
        assert!(!self.is_empty(), "corners of an empty box set are not supported");
        self.rows().map(|row| box_corners(self.frame, row)).collect()
    }

    /// Rotated bird's-eye-view rectangles as `(x, y, w, h, yaw)`.
    pub fn bev(&self) -> Vec<[f64; 5]> {
        let [a0, a1] = self.frame.bev_axes();
        self.rows()
            .map(|row| {
                let c = row.center();
                let s = row.size();
                [c[a0], c[a1], s[a0], s[a1], row.yaw()]
            })
            .collect()
    }

    /// Axis-aligned rectangles approximating the BEV boxes.
    ///
    /// A box whose yaw is closer to a quarter turn than to zero has its width
    /// and height swapped; this is not the true envelope of the rotated box.
    pub fn nearest_bev(&self) -> Vec<geo::Rect<f64>> {
        self.bev()
            .into_iter()
            .map(|[x, y, w, h, yaw]| {
                let normed = limit_period(yaw, 0.5, PI).abs();
                let (w, h) = if normed > FRAC_PI_4 { (h, w) } else { (w, h) };
                geo::Rect::new(
                    Coord {
                        x: x - w / 2.0,
                        y: y - h / 2.0,
                    },
                    Coord {
                        x: x + w / 2.0,
                        y: y + h / 2.0,
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    const BOTTOM: [usize; 4] = [0, 3, 4, 7];
    const TOP: [usize; 4] = [1, 2, 5, 6];

    fn single(frame: Frame, row: [f64; 7]) -> BoxSet {
        BoxSet::new(frame, row.to_vec(), 7, true).unwrap()
    }

    #[test]
    fn unit_box_corners() {
        let boxes = single(Frame::Depth, [0.0, 0.0, 0.0, 2.0, 2.0, 2.0, 0.0]);
        let corners = boxes.corners();
        let expected = [
            [-1.0, -1.0, 0.0],
            [-1.0, -1.0, 2.0],
            [-1.0, 1.0, 2.0],
            [-1.0, 1.0, 0.0],
            [1.0, -1.0, 0.0],
            [1.0, -1.0, 2.0],
            [1.0, 1.0, 2.0],
            [1.0, 1.0, 0.0],
        ];
        for (corner, [x, y, z]) in corners[0].iter().zip(expected) {
            assert_relative_eq!(*corner, na::Point3::new(x, y, z));
        }
        assert_relative_eq!(boxes.gravity_center()[0], na::Point3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn corner_heights_match_centers() {
        for frame in [Frame::Depth, Frame::Lidar] {
            let boxes = single(frame, [1.0, -2.0, 0.5, 3.0, 1.0, 1.5, 0.7]);
            let corners = &boxes.corners()[0];
            for i in BOTTOM {
                assert_relative_eq!(corners[i].z, 0.5, epsilon = 1e-12);
            }
            for i in TOP {
                assert_relative_eq!(corners[i].z, 2.0, epsilon = 1e-12);
            }
            let mean_z = corners.iter().map(|c| c.z).sum::<f64>() / 8.0;
            assert_relative_eq!(mean_z, boxes.gravity_center()[0].z, epsilon = 1e-12);
        }
    }

    #[test]
    fn camera_corners_hang_above_bottom_center() {
        let boxes = single(Frame::Camera, [0.0, 1.0, 5.0, 2.0, 1.5, 4.0, 0.0]);
        let corners = &boxes.corners()[0];
        let ys: Vec<f64> = corners.iter().map(|c| c.y).collect();
        assert_relative_eq!(ys.iter().cloned().fold(f64::MIN, f64::max), 1.0);
        assert_relative_eq!(ys.iter().cloned().fold(f64::MAX, f64::min), -0.5);
        assert_relative_eq!(boxes.gravity_center()[0], na::Point3::new(0.0, 0.25, 5.0));
        let mean_y = ys.iter().sum::<f64>() / 8.0;
        assert_relative_eq!(mean_y, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn yaw_turns_corners_about_vertical_axis() {
        let boxes = single(Frame::Depth, [0.0, 0.0, 0.0, 4.0, 2.0, 1.0, FRAC_PI_2]);
        let corners = &boxes.corners()[0];
        // The long side ends up along y.
        let xs = corners.iter().map(|c| c.x.abs()).fold(0.0, f64::max);
        let ys = corners.iter().map(|c| c.y.abs()).fold(0.0, f64::max);
        assert_relative_eq!(xs, 1.0, epsilon = 1e-12);
        assert_relative_eq!(ys, 2.0, epsilon = 1e-12);
    }

    #[test]
    #[should_panic]
    fn corners_of_empty_set_panics() {
        let boxes = BoxSet::new(Frame::Depth, vec![], 7, true).unwrap();
        boxes.corners();
    }

    #[test]
    fn bev_columns() {
        let row = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.1];
        assert_eq!(single(Frame::Depth, row).bev(), vec![[1.0, 2.0, 4.0, 5.0, 0.1]]);
        assert_eq!(single(Frame::Camera, row).bev(), vec![[1.0, 3.0, 4.0, 6.0, 0.1]]);
    }

    #[test]
    fn nearest_bev_swaps_near_quarter_turn() {
        let boxes = single(Frame::Depth, [1.0, 1.0, 0.0, 4.0, 2.0, 1.0, 0.0]);
        let rect = boxes.nearest_bev()[0];
        assert_relative_eq!(rect.min().x, -1.0);
        assert_relative_eq!(rect.min().y, 0.0);
        assert_relative_eq!(rect.max().x, 3.0);
        assert_relative_eq!(rect.max().y, 2.0);

        let boxes = single(Frame::Depth, [1.0, 1.0, 0.0, 4.0, 2.0, 1.0, 1.2]);
        let rect = boxes.nearest_bev()[0];
        assert_relative_eq!(rect.width(), 2.0);
        assert_relative_eq!(rect.height(), 4.0);

        // Yaw near a half turn behaves like yaw near zero.
        let boxes = single(Frame::Depth, [1.0, 1.0, 0.0, 4.0, 2.0, 1.0, PI - 0.2]);
        let rect = boxes.nearest_bev()[0];
        assert_relative_eq!(rect.width(), 4.0);
        assert_relative_eq!(rect.height(), 2.0);
    }

    #[test]
    fn nearest_bev_keeps_dims_at_exactly_an_eighth_turn() {
        for yaw in [FRAC_PI_4, -FRAC_PI_4] {
            let boxes = single(Frame::Depth, [0.0, 0.0, 0.0, 4.0, 2.0, 1.0, yaw]);
            let rect = boxes.nearest_bev()[0];
            assert_abs_diff_eq!(rect.width(), 4.0);
            assert_abs_diff_eq!(rect.height(), 2.0);
        }
        let boxes = single(Frame::Depth, [0.0, 0.0, 0.0, 4.0, 2.0, 1.0, FRAC_PI_4 + 1e-9]);
        assert_abs_diff_eq!(boxes.nearest_bev()[0].width(), 2.0);
    }
}
