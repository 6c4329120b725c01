#![forbid(unsafe_code)]

//! MSDF font atlas model.
//!
//! Parses an msdf-bmfont style descriptor into an immutable lookup table of
//! per-character transforms:
//! - `view` maps the unit quad to the glyph's sized, offset quad in
//!   line-height units, centred on its advance.
//! - `uv` maps the unit quad into the glyph's rectangle in normalized atlas
//!   coordinates.
//!
//! The table is built once per load and never mutated afterwards, so it can
//! be shared behind an `Arc` between the loader and the render loop.

use crate::error::AtlasLoadError;
use glam::{Mat4, Vec3};
use serde::Deserialize;
use std::collections::HashMap;

/// One glyph record of the descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphDescriptor {
    pub ch: char,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub xoffset: f32,
    pub yoffset: f32,
    pub xadvance: f32,
}

/// Atlas-wide metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasMetrics {
    pub line_height: f32,
    /// Atlas width in pixels. UVs are normalized by width on both axes.
    pub scale_w: f32,
    pub distance_range: f32,
}

impl AtlasMetrics {
    /// Slope constant controlling edge antialiasing; divided by the draw size.
    #[must_use]
    pub fn df_slope(&self) -> f32 {
        2.0 * self.distance_range
    }
}

/// Cached transform pair for one character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharTransform {
    /// Model-space transform (`tView`).
    pub view: Mat4,
    /// Texture-space transform (`tUV`).
    pub uv: Mat4,
}

impl CharTransform {
    /// Derive both transforms for `glyph`.
    #[must_use]
    pub fn derive(glyph: &GlyphDescriptor, metrics: &AtlasMetrics) -> Self {
        let lh = metrics.line_height;
        let view = Mat4::from_scale(Vec3::new(1.0 / lh, 1.0 / lh, 1.0))
            * Mat4::from_translation(Vec3::new(glyph.xoffset, -glyph.yoffset, 0.0))
            * Mat4::from_translation(Vec3::new(-glyph.xadvance / 2.0, lh / 2.0, 0.0))
            * Mat4::from_scale(Vec3::new(glyph.width, glyph.height, 1.0));

        let scale = 1.0 / metrics.scale_w;
        let uv = Mat4::from_scale(Vec3::splat(scale))
            * Mat4::from_translation(Vec3::new(glyph.x, glyph.y, 0.0))
            * Mat4::from_scale(Vec3::new(glyph.width, glyph.height, 1.0));

        Self { view, uv }
    }
}

// ---------------------------------------------------------------------------
// Descriptor (wire format)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCommon {
    line_height: f32,
    scale_w: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDistanceField {
    distance_range: f32,
}

#[derive(Debug, Deserialize)]
struct RawChar {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    char: Option<String>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    xoffset: f32,
    yoffset: f32,
    xadvance: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescriptor {
    common: RawCommon,
    distance_field: RawDistanceField,
    chars: Vec<RawChar>,
}

impl RawChar {
    fn resolve_char(&self) -> Result<char, AtlasLoadError> {
        if let Some(text) = &self.char {
            let mut it = text.chars();
            return match (it.next(), it.next()) {
                (Some(ch), None) => Ok(ch),
                _ => Err(AtlasLoadError::Invalid(format!(
                    "glyph record names {text:?}, expected a single character"
                ))),
            };
        }
        self.id
            .and_then(char::from_u32)
            .ok_or_else(|| AtlasLoadError::Invalid("glyph record has no char or id".into()))
    }

    fn to_descriptor(&self) -> Result<GlyphDescriptor, AtlasLoadError> {
        Ok(GlyphDescriptor {
            ch: self.resolve_char()?,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            xoffset: self.xoffset,
            yoffset: self.yoffset,
            xadvance: self.xadvance,
        })
    }
}

// ---------------------------------------------------------------------------
// GlyphAtlas
// ---------------------------------------------------------------------------

/// Immutable glyph lookup table built from a descriptor.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    metrics: AtlasMetrics,
    glyphs: HashMap<char, GlyphDescriptor>,
    transforms: HashMap<char, CharTransform>,
}

impl GlyphAtlas {
    /// Parse a descriptor and derive every glyph's transforms.
    pub fn load(json: &str) -> Result<Self, AtlasLoadError> {
        let raw: RawDescriptor = serde_json::from_str(json)?;

        let metrics = AtlasMetrics {
            line_height: raw.common.line_height,
            scale_w: raw.common.scale_w,
            distance_range: raw.distance_field.distance_range,
        };
        if !(metrics.line_height.is_finite() && metrics.line_height > 0.0) {
            return Err(AtlasLoadError::Invalid("lineHeight must be positive".into()));
        }
        if !(metrics.scale_w.is_finite() && metrics.scale_w > 0.0) {
            return Err(AtlasLoadError::Invalid("scaleW must be positive".into()));
        }

        let glyphs = raw
            .chars
            .iter()
            .map(|record| record.to_descriptor().map(|g| (g.ch, g)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_glyphs(metrics, glyphs.into_iter().map(|(_, g)| g)))
    }

    /// Build an atlas from already-parsed records. Later duplicates win.
    #[must_use]
    pub fn from_glyphs(
        metrics: AtlasMetrics,
        records: impl IntoIterator<Item = GlyphDescriptor>,
    ) -> Self {
        let mut glyphs = HashMap::new();
        let mut transforms = HashMap::new();
        for glyph in records {
            transforms.insert(glyph.ch, CharTransform::derive(&glyph, &metrics));
            glyphs.insert(glyph.ch, glyph);
        }
        tracing::debug!(
            glyphs = glyphs.len(),
            line_height = metrics.line_height,
            df_slope = metrics.df_slope(),
            "glyph atlas built"
        );
        Self {
            metrics,
            glyphs,
            transforms,
        }
    }

    #[must_use]
    pub fn metrics(&self) -> &AtlasMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn df_slope(&self) -> f32 {
        self.metrics.df_slope()
    }

    #[must_use]
    pub fn glyph(&self, ch: char) -> Option<&GlyphDescriptor> {
        self.glyphs.get(&ch)
    }

    /// Transform pair for `ch`, or `None` when the atlas has no such glyph.
    #[must_use]
    pub fn transform(&self, ch: char) -> Option<&CharTransform> {
        self.transforms.get(&ch)
    }

    #[must_use]
    pub fn contains(&self, ch: char) -> bool {
        self.transforms.contains_key(&ch)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}
