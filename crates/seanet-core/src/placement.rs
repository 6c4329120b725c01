#![forbid(unsafe_code)]

//! Character placement: the seam between the text model and the glyph
//! renderer.
//!
//! A placement engine turns the visible part of the text stream into one
//! [`DrawCommand`] per cell, each frame. Two engines exist: the travelling
//! wave with cursor pull ([`crate::layout::WaveLayout`]) and the orbiting
//! cells with sparse cursor perturbations ([`crate::orbit::OrbitLayout`]).

use crate::grid::GridDims;
use crate::sdf::Rgba;
use glam::Vec2;

/// Text shown until content is ready.
pub const PLACEHOLDER: &str = "Loading...";

/// One glyph to draw this frame. Position is in pixels, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub ch: char,
    pub position: Vec2,
    pub size: f32,
    pub color: Rgba,
    pub weight: f32,
}

/// Everything a placement engine may read for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub text: &'a [char],
    /// Source positions of `text`; `None` for the placeholder.
    pub source_indices: Option<&'a [usize]>,
    pub dims: GridDims,
    /// Viewport in pixels.
    pub viewport: Vec2,
    /// Cursor in cell space.
    pub mouse: Option<Vec2>,
    pub time: f32,
}

impl FrameInput<'_> {
    /// Source indices, but only when they line up with the text.
    #[must_use]
    pub fn indices(&self) -> Option<&[usize]> {
        self.source_indices
            .filter(|idx| idx.len() == self.text.len())
    }

    /// Source position of linear cell `i` (identity without indices).
    #[must_use]
    pub fn source_index(&self, i: usize) -> f32 {
        self.indices()
            .and_then(|idx| idx.get(i))
            .map_or(i as f32, |&v| v as f32)
    }

    /// Source position bounding a row at linear cell `i`.
    ///
    /// Past the end of the text the last index plus one is used, so the
    /// final (partial) row still spans a sensible range.
    #[must_use]
    pub fn row_bound(&self, i: usize) -> f32 {
        match self.indices() {
            None => i as f32,
            Some(idx) => match idx.get(i) {
                Some(&v) => v as f32,
                None => idx.last().map_or(i as f32, |&last| last as f32 + 1.0),
            },
        }
    }
}

/// A front end that positions characters on the grid.
pub trait CharacterPlacement {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Cell pitch in pixels.
    fn cell_size(&self) -> f32;

    /// Grid dimensions for a viewport in pixels.
    fn grid_dims(&self, viewport: Vec2) -> GridDims;

    /// React to a cursor move. `frame.mouse` holds the new position.
    fn pointer_moved(&mut self, _frame: &FrameInput<'_>) {}

    /// Forget state tied to the previous grid or text.
    fn reset(&mut self) {}

    /// Append this frame's commands to `out`.
    fn place(&mut self, frame: &FrameInput<'_>, out: &mut Vec<DrawCommand>);
}
