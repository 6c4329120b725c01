#![forbid(unsafe_code)]

//! Scene configuration.
//!
//! Every field has a default matching the shipped look, so hosts only pass
//! what they want to change. Keys are camelCase to read naturally from a JS
//! options object.

use crate::error::ConfigError;
use serde::Deserialize;
use std::f32::consts::TAU;

/// Which placement front end drives the glyph grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    /// Travelling wave plus elliptical cursor pull.
    #[default]
    Wave,
    /// Per-cell orbits with sparse cursor perturbations.
    Orbit,
}

/// How whitespace survives text extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    /// Whitespace runs collapse to one separator cell.
    #[default]
    Collapsed,
    /// Whitespace is dropped; gaps live only in the source indices.
    Dense,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Cell edge length in pixels.
    pub cell_size: f32,
    /// Glyph size in pixels.
    pub font_size: f32,
    /// Glyph colour (RGB).
    pub color: [f32; 3],
    pub weight: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 30.0,
            font_size: 20.0,
            color: [1.0, 1.0, 1.0],
            weight: 0.5,
        }
    }
}

impl GridConfig {
    /// Horizontal distance, in cells, between pulled neighbours.
    #[must_use]
    pub fn text_spacing(&self) -> f32 {
        self.font_size / self.cell_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaveConfig {
    /// Peak displacement in cells (halved for cells outside the falloff).
    pub amplitude: f32,
    /// Angular velocity in radians per second.
    pub velocity: f32,
    pub x_offset: f32,
    pub y_offset: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            amplitude: 0.8,
            velocity: 0.6 * TAU,
            x_offset: 0.3,
            y_offset: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointerConfig {
    /// Falloff ellipse radii in cells.
    pub radius_x: f32,
    pub radius_y: f32,
    /// Sigmoid exponent of the pull blend.
    pub fade: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            radius_x: 10.0,
            radius_y: 7.0,
            fade: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrbitConfig {
    /// Grid pitch in pixels.
    pub spacing: f32,
    /// Orbit radius of undisturbed cells, in pixels.
    pub max_amplitude: f32,
    pub radius_x: f32,
    pub radius_y: f32,
    /// Seconds per full orbit.
    pub period: f32,
    /// Phase delay per pixel of `x + y`, in seconds.
    pub delay_per_px: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            spacing: 30.0,
            max_amplitude: 8.0,
            radius_x: 15.0,
            radius_y: 4.0,
            period: 1.0 / 0.6,
            delay_per_px: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundConfig {
    pub enabled: bool,
    /// Cursor radius in pixels; the shader widens it by 1.2.
    pub mouse_radius: f32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mouse_radius: 300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetConfig {
    /// Font prefix; `<prefix>.png` and `<prefix>-msdf.json` are fetched.
    pub font_prefix: String,
    pub content_url: String,
    pub content_mode: ContentMode,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            font_prefix: "fonts/FiraCode-VF".to_string(),
            content_url: "https://en.wikipedia.org/w/api.php?&action=parse&prop=text&format=json&page=Internet&origin=*".to_string(),
            content_mode: ContentMode::Collapsed,
        }
    }
}

impl AssetConfig {
    #[must_use]
    pub fn atlas_image_url(&self) -> String {
        format!("{}.png", self.font_prefix)
    }

    #[must_use]
    pub fn atlas_metrics_url(&self) -> String {
        format!("{}-msdf.json", self.font_prefix)
    }
}

/// Complete scene configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    pub placement: PlacementKind,
    pub grid: GridConfig,
    pub wave: WaveConfig,
    pub pointer: PointerConfig,
    pub orbit: OrbitConfig,
    pub background: BackgroundConfig,
    pub assets: AssetConfig,
}

impl SceneConfig {
    /// Parse and validate a JSON options object. Missing keys keep defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would divide by zero or stall the layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("grid.cellSize", self.grid.cell_size),
            ("grid.fontSize", self.grid.font_size),
            ("pointer.radiusX", self.pointer.radius_x),
            ("pointer.radiusY", self.pointer.radius_y),
            ("orbit.spacing", self.orbit.spacing),
            ("orbit.radiusX", self.orbit.radius_x),
            ("orbit.radiusY", self.orbit.radius_y),
            ("orbit.period", self.orbit.period),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: f64::from(value),
                });
            }
        }
        if !(self.pointer.fade.is_finite() && self.pointer.fade >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "pointer.fade",
                value: f64::from(self.pointer.fade),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = SceneConfig::from_json_str("{}").expect("defaults");
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.grid.cell_size, 30.0);
        assert!((config.grid.text_spacing() - 20.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn partial_override_keeps_siblings() {
        let config =
            SceneConfig::from_json_str(r#"{"placement":"orbit","pointer":{"radiusX":4}}"#)
                .expect("parse");
        assert_eq!(config.placement, PlacementKind::Orbit);
        assert_eq!(config.pointer.radius_x, 4.0);
        assert_eq!(config.pointer.radius_y, 7.0);
    }

    #[test]
    fn zero_cell_size_is_rejected() {
        let err = SceneConfig::from_json_str(r#"{"grid":{"cellSize":0}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "grid.cellSize",
                ..
            }
        ));
    }

    #[test]
    fn asset_urls_share_prefix() {
        let assets = AssetConfig {
            font_prefix: "fonts/Mono".into(),
            ..AssetConfig::default()
        };
        assert_eq!(assets.atlas_image_url(), "fonts/Mono.png");
        assert_eq!(assets.atlas_metrics_url(), "fonts/Mono-msdf.json");
    }
}
