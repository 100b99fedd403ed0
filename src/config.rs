//! Calibration overrides for the frame registry, loaded from TOML.
//!
//! ```toml
//! [[rules]]
//! src = "lidar"
//! dst = "camera"
//! rotation = [[0.0, -1.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0]]
//! translation = [0.0, -0.08, -0.27]
//! ```

use crate::{
    convert::{ConversionRule, FrameRegistry, RigidTransform},
    error::{BoxError, Result},
    frame::Frame,
};
use log::{debug, warn};
use nalgebra as na;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    pub src: Frame,
    pub dst: Frame,
    /// Row-major 3x3 matrix.
    pub rotation: [[f64; 3]; 3],
    #[serde(default)]
    pub translation: [f64; 3],
    /// Also register the inverse rule for `dst -> src`.
    #[serde(default = "default_symmetric")]
    pub symmetric: bool,
}

fn default_symmetric() -> bool {
    true
}

impl RegistryConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading frame registry config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

impl RuleConfig {
    fn transform(&self) -> RigidTransform {
        RigidTransform::new(
            na::Matrix3::from_fn(|r, c| self.rotation[r][c]),
            na::Vector3::from(self.translation),
        )
    }
}

impl FrameRegistry {
    /// The standard registry with the configured rules layered on top.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut registry = Self::standard();

        for rule in &config.rules {
            let (src, dst) = (rule.src, rule.dst);
            if src == dst {
                return Err(BoxError::Config(format!(
                    "conversion from {src} to itself is always the identity"
                )));
            }
            let size_order = registry.rule(src, dst)?.size_order;
            let forward = ConversionRule {
                transform: rule.transform(),
                size_order,
            };
            let backward = if rule.symmetric {
                Some(
                    forward
                        .inverse()
                        .ok_or(BoxError::SingularTransform { src, dst })?,
                )
            } else {
                None
            };

            replace(&mut registry, src, dst, forward);
            if let Some(backward) = backward {
                replace(&mut registry, dst, src, backward);
            }
        }
        Ok(registry)
    }
}

fn replace(registry: &mut FrameRegistry, src: Frame, dst: Frame, rule: ConversionRule) {
    if let Some(previous) = registry.register(src, dst, rule) {
        if previous != rule {
            warn!("overriding {src} -> {dst} conversion from config");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoxSet;
    use approx::assert_relative_eq;

    const CALIBRATION: &str = r#"
        [[rules]]
        src = "lidar"
        dst = "camera"
        rotation = [[0.0, -1.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0]]
        translation = [0.0, -0.08, -0.27]

        [[rules]]
        src = "depth"
        dst = "lidar"
        rotation = [[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]
        translation = [1.0, 0.0, 0.0]
        symmetric = false
    "#;

    #[test]
    fn parse_and_apply_calibration() {
        let config = RegistryConfig::from_toml_str(CALIBRATION).unwrap();
        assert_eq!(config.rules.len(), 2);
        assert!(config.rules[0].symmetric);
        assert!(!config.rules[1].symmetric);

        let registry = FrameRegistry::from_config(&config).unwrap();
        let l2c = registry.rule(Frame::Lidar, Frame::Camera).unwrap();
        assert_relative_eq!(l2c.transform.translation, na::Vector3::new(0.0, -0.08, -0.27));
        assert_eq!(l2c.size_order, [1, 2, 0]);

        // The inverse was registered alongside.
        let c2l = registry.rule(Frame::Camera, Frame::Lidar).unwrap();
        let v = na::Vector3::new(3.0, -1.0, 2.0);
        assert_relative_eq!(
            c2l.transform.apply(&l2c.transform.apply(&v)),
            v,
            epsilon = 1e-12
        );

        // Not symmetric: lidar -> depth keeps the standard rule.
        let l2d = registry.rule(Frame::Lidar, Frame::Depth).unwrap();
        assert_eq!(l2d, FrameRegistry::standard().rule(Frame::Lidar, Frame::Depth).unwrap());

        let boxes = BoxSet::new(Frame::Depth, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0], 7, true)
            .unwrap();
        let lidar = boxes.convert_to(&registry, Frame::Lidar, None).unwrap();
        assert_eq!(lidar.bottom_center()[0], na::Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn rejects_bad_rules() {
        let same = RegistryConfig::from_toml_str(
            r#"
            [[rules]]
            src = "camera"
            dst = "camera"
            rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
            "#,
        )
        .unwrap();
        assert!(matches!(
            FrameRegistry::from_config(&same),
            Err(BoxError::Config(_))
        ));

        let singular = RegistryConfig::from_toml_str(
            r#"
            [[rules]]
            src = "lidar"
            dst = "depth"
            rotation = [[1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]
            "#,
        )
        .unwrap();
        assert!(matches!(
            FrameRegistry::from_config(&singular),
            Err(BoxError::SingularTransform { .. })
        ));

        assert!(matches!(
            RegistryConfig::from_toml_str("[[rules]]\nsrc = \"radar\""),
            Err(BoxError::Config(_))
        ));
    }

    #[test]
    fn empty_config_is_standard() {
        let config = RegistryConfig::from_toml_str("").unwrap();
        assert_eq!(
            FrameRegistry::from_config(&config).unwrap(),
            FrameRegistry::standard()
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            RegistryConfig::load("/nonexistent/registry.toml"),
            Err(BoxError::Io(_))
        ));
    }
}
