//! Oriented 3D bounding boxes in Depth, LiDAR and camera coordinates.
//!
//! A [`BoxSet`] stores boxes as `(x, y, z, size_x, size_y, size_z, yaw, ...)`
//! rows whose center is the bottom center of the box. Geometric views
//! (corners, gravity centers, bird's-eye-view rectangles), in-place transforms
//! (rotation, flipping) and frame conversions all follow the conventions of
//! the box's [`Frame`].

mod config;
mod containment;
mod convert;
mod error;
mod frame;
mod geometry;
mod points;
mod transform;
mod types;
mod utils;

pub use crate::config::{RegistryConfig, RuleConfig};
pub use crate::containment::{CpuPointsInBoxes, PointsInBoxesBatch};
pub use crate::convert::{ConversionRule, FrameRegistry, RigidTransform};
pub use crate::error::{BoxError, Result};
pub use crate::frame::{FlipDirection, Frame};
pub use crate::points::PointSet;
pub use crate::types::{BoxRow, BoxSet};
pub use crate::utils::{limit_period, yaw_rotation};
