//! Coordinate conventions and their per-frame constants.
//!
//! ```text
//!   Depth                 LiDAR                  Camera
//!   up z    y front       up z    x front        z front
//!      ^   ^                 ^   ^                   ^
//!      |  /                  |  /                   /
//!      | /                   | /                   /
//!      0 ------> x right     left y <------ 0     0 ------> x right
//!                                                  |
//!                                                  v
//!                                                down y
//! ```
//!
//! Depth: yaw is 0 along +x and increases from +x towards +y.
//! LiDAR: yaw is 0 along -y and increases from -y towards +x.
//! Camera: yaw is about the y axis, 0 along +x and increases from +x towards +z.

use crate::error::BoxError;
use crate::utils::yaw_rotation;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frame {
    Depth,
    Lidar,
    Camera,
}

impl Frame {
    pub const ALL: [Frame; 3] = [Frame::Depth, Frame::Lidar, Frame::Camera];

    /// Relative position of the stored reference point inside the unit box.
    pub fn relative_origin(self) -> na::Vector3<f64> {
        match self {
            Frame::Depth | Frame::Lidar => na::Vector3::new(0.5, 0.5, 0.0),
            Frame::Camera => na::Vector3::new(0.5, 1.0, 0.5),
        }
    }

    /// Axis the yaw angle rotates about.
    pub fn yaw_axis(self) -> usize {
        match self {
            Frame::Depth | Frame::Lidar => 2,
            Frame::Camera => 1,
        }
    }

    pub fn vertical_axis(self) -> usize {
        self.yaw_axis()
    }

    /// `1.0` if the vertical axis points up, `-1.0` if it points down.
    pub fn up_sign(self) -> f64 {
        match self {
            Frame::Depth | Frame::Lidar => 1.0,
            Frame::Camera => -1.0,
        }
    }

    /// The two axes spanning the bird's-eye-view plane.
    pub fn bev_axes(self) -> [usize; 2] {
        match self {
            Frame::Depth | Frame::Lidar => [0, 1],
            Frame::Camera => [0, 2],
        }
    }

    /// Coordinate mirrored by a flip in the given direction.
    pub fn flip_axis(self, direction: FlipDirection) -> usize {
        use FlipDirection::*;
        match (self, direction) {
            (Frame::Depth, Horizontal) => 0,
            (Frame::Depth, Vertical) => 1,
            (Frame::Lidar, Horizontal) => 1,
            (Frame::Lidar, Vertical) => 0,
            (Frame::Camera, Horizontal) => 0,
            (Frame::Camera, Vertical) => 2,
        }
    }

    /// Matrix right-multiplied onto centers and points by `rotate`.
    pub fn rotation_matrix(self, angle: f64) -> na::Matrix3<f64> {
        match self {
            Frame::Depth => yaw_rotation(2, angle).transpose(),
            Frame::Lidar => yaw_rotation(2, angle),
            Frame::Camera => yaw_rotation(1, angle),
        }
    }

    /// Sign applied to the angle when `rotate` updates yaw.
    pub fn yaw_step(self) -> f64 {
        match self {
            Frame::Depth => -1.0,
            Frame::Lidar | Frame::Camera => 1.0,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frame::Depth => "depth",
            Frame::Lidar => "lidar",
            Frame::Camera => "camera",
        };
        f.write_str(name)
    }
}

impl FromStr for Frame {
    type Err = BoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "depth" => Ok(Frame::Depth),
            "lidar" => Ok(Frame::Lidar),
            "camera" | "cam" => Ok(Frame::Camera),
            _ => Err(BoxError::UnknownFrame(s.to_string())),
        }
    }
}

/// Direction of a bird's-eye-view flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

impl FromStr for FlipDirection {
    type Err = BoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(FlipDirection::Horizontal),
            "vertical" => Ok(FlipDirection::Vertical),
            _ => Err(BoxError::UnknownFlipDirection(s.to_string())),
        }
    }
}
