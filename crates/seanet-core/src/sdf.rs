#![forbid(unsafe_code)]

//! CPU side of the multi-channel SDF glyph renderer.
//!
//! [`GlyphBatch`] turns draw requests into [`GlyphInstance`] records, one per
//! accepted character. The GPU front end uploads the batch and issues exactly
//! one quad draw per instance. Requests made before the atlas is ready, or
//! for characters the atlas lacks, produce no instance.
//!
//! The fragment stage is mirrored here ([`glyph_coverage`], [`shade_glyph`])
//! so the shading rule can be checked without a GPU.

use crate::atlas::GlyphAtlas;
use crate::error::SeaError;
use crate::placement::DrawCommand;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use std::collections::HashSet;

/// Default stroke weight (SDF threshold).
pub const DEFAULT_WEIGHT: f32 = 0.5;

/// Fragments below this coverage are discarded.
pub const ALPHA_CUTOFF: f32 = 0.001;

/// Straight (non-premultiplied) colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Accept grey, grey+alpha, rgb or rgba component lists.
    #[must_use]
    pub fn from_components(raw: &[f32]) -> Option<Self> {
        match *raw {
            [v] => Some(Self::new(v, v, v, 1.0)),
            [v, a] => Some(Self::new(v, v, v, a)),
            [r, g, b] => Some(Self::new(r, g, b, 1.0)),
            [r, g, b, a] => Some(Self::new(r, g, b, a)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[f32; 3]> for Rgba {
    fn from(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2], 1.0)
    }
}

/// Per-glyph GPU record.
///
/// Layout matches the WGSL `GlyphInstance` struct (160 bytes, 16-aligned).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlyphInstance {
    pub model_view: [[f32; 4]; 4],
    pub uv_transform: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// (weight, slope, 0, 0)
    pub params: [f32; 4],
}

pub const GLYPH_INSTANCE_BYTES: usize = std::mem::size_of::<GlyphInstance>();

impl GlyphInstance {
    #[must_use]
    pub fn model_view(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model_view)
    }

    #[must_use]
    pub fn uv_transform(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.uv_transform)
    }

    #[must_use]
    pub fn weight(&self) -> f32 {
        self.params[0]
    }

    #[must_use]
    pub fn slope(&self) -> f32 {
        self.params[1]
    }
}

/// Orthographic projection with a bottom-left origin, in pixels.
#[must_use]
pub fn pixel_projection(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh_gl(0.0, width.max(1.0), 0.0, height.max(1.0), -1.0, 1.0)
}

/// Why a draw request produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    NotReady,
    MissingGlyph(char),
}

impl Skip {
    /// The error behind a skip. Waiting for the atlas is not one.
    #[must_use]
    pub fn error(self) -> Option<SeaError> {
        match self {
            Self::NotReady => None,
            Self::MissingGlyph(ch) => Some(SeaError::UnknownGlyph(ch)),
        }
    }
}

/// Collects glyph instances for one frame.
#[derive(Debug, Default)]
pub struct GlyphBatch {
    instances: Vec<GlyphInstance>,
    reported_missing: HashSet<char>,
    reported_waiting: bool,
}

impl GlyphBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop last frame's instances; diagnostics state is kept.
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    #[must_use]
    pub fn instances(&self) -> &[GlyphInstance] {
        &self.instances
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Queue one glyph. `atlas` is `None` until both atlas parts arrived.
    pub fn draw_char(
        &mut self,
        atlas: Option<&GlyphAtlas>,
        ch: char,
        position: Vec2,
        size: f32,
        color: Rgba,
        weight: f32,
    ) -> Result<(), Skip> {
        let Some(atlas) = atlas else {
            if !self.reported_waiting {
                self.reported_waiting = true;
                tracing::info!("waiting for fonts");
            }
            return Err(Skip::NotReady);
        };
        let Some(transform) = atlas.transform(ch) else {
            let skip = Skip::MissingGlyph(ch);
            if self.reported_missing.insert(ch)
                && let Some(err) = skip.error()
            {
                tracing::warn!(error = %err, "glyph skipped");
            }
            return Err(skip);
        };

        let model_view = Mat4::from_translation(Vec3::new(position.x, position.y, 0.0))
            * Mat4::from_scale(Vec3::new(size, size, 1.0))
            * transform.view;
        let slope = if size > 0.0 {
            atlas.df_slope() / size
        } else {
            f32::INFINITY
        };

        self.instances.push(GlyphInstance {
            model_view: model_view.to_cols_array_2d(),
            uv_transform: transform.uv.to_cols_array_2d(),
            color: color.to_array(),
            params: [weight, slope, 0.0, 0.0],
        });
        Ok(())
    }

    /// Queue a layout command.
    pub fn draw(&mut self, atlas: Option<&GlyphAtlas>, cmd: &DrawCommand) -> Result<(), Skip> {
        self.draw_char(atlas, cmd.ch, cmd.position, cmd.size, cmd.color, cmd.weight)
    }

    /// Queue every command; skipped cells never abort the rest.
    pub fn extend(&mut self, atlas: Option<&GlyphAtlas>, cmds: &[DrawCommand]) -> usize {
        cmds.iter()
            .filter(|cmd| self.draw(atlas, cmd).is_ok())
            .count()
    }
}

// ---------------------------------------------------------------------------
// Fragment reference
// ---------------------------------------------------------------------------

/// Median of three, used to combine the SDF channels.
#[inline]
#[must_use]
pub fn median3(a: f32, b: f32, c: f32) -> f32 {
    a.min(b).max(a.max(b).min(c))
}

/// Hermite smoothstep with GLSL semantics.
#[inline]
#[must_use]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Coverage of an atlas texel, or `None` if the fragment is discarded.
#[must_use]
pub fn glyph_coverage(texel: [f32; 3], weight: f32, slope: f32) -> Option<f32> {
    let dist = median3(texel[0], texel[1], texel[2]);
    let alpha = smoothstep(weight - slope, weight + slope, dist);
    (alpha >= ALPHA_CUTOFF).then_some(alpha)
}

/// Output colour: rgb weighted by coverage, opaque alpha.
#[must_use]
pub fn shade_glyph(color: Rgba, alpha: f32) -> [f32; 4] {
    [color.r * alpha, color.g * alpha, color.b * alpha, 1.0]
}
