//! Error types for box construction, transforms and frame conversion.

use crate::frame::Frame;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoxError {
    #[error("box_dim must be at least 7, got {0}")]
    BoxDimTooSmall(usize),

    #[error("table of {len} values cannot be split into rows of {box_dim} columns")]
    WidthMismatch { len: usize, box_dim: usize },

    #[error("unknown flip direction `{0}`, expected `horizontal` or `vertical`")]
    UnknownFlipDirection(String),

    #[error("unknown coordinate frame `{0}`")]
    UnknownFrame(String),

    #[error("unsupported point array shape {0:?}, expected [M, C] or [1, M, C] with C >= 3")]
    PointShape(Vec<usize>),

    #[error("point batch dimension must be 1, got {0}")]
    PointBatch(usize),

    #[error("box index {index} out of range for {len} boxes")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("incompatible box sets: {0}")]
    Incompatible(String),

    #[error("no conversion rule registered from {src} to {dst}")]
    NoConversionRule { src: Frame, dst: Frame },

    #[error("transform from {src} to {dst} is not invertible")]
    SingularTransform { src: Frame, dst: Frame },

    #[error("containment query failed: {0}")]
    Containment(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for BoxError {
    fn from(e: toml::de::Error) -> Self {
        BoxError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BoxError>;
