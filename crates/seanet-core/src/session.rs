#![forbid(unsafe_code)]

//! Session: the single owner of per-canvas state.
//!
//! The host forwards resize, pointer and clock events, feeds content and the
//! atlas as they arrive, and asks for the frame's draw list. Nothing here
//! touches the platform; the web crate wraps a `Session` and renders what it
//! produces.

use std::sync::Arc;

use crate::atlas::GlyphAtlas;
use crate::background::BackgroundInput;
use crate::config::{PlacementKind, SceneConfig};
use crate::content::ContentState;
use crate::error::SeaError;
use crate::grid::{GridDims, GridState};
use crate::layout::WaveLayout;
use crate::orbit::OrbitLayout;
use crate::placement::{CharacterPlacement, DrawCommand, FrameInput, PLACEHOLDER};
use crate::sdf::{GlyphBatch, GlyphInstance};
use crate::text::TextBuffer;
use glam::Vec2;

/// Background cursor position before the first pointer move.
const FAR_AWAY: f32 = -1.0e5;

pub struct Session {
    config: SceneConfig,
    grid: GridState,
    /// Pointer in canvas pixels, origin top-left.
    pointer_px: Option<Vec2>,
    content: ContentState,
    placement: Box<dyn CharacterPlacement>,
    atlas: Option<Arc<GlyphAtlas>>,
    placeholder: Vec<char>,
    commands: Vec<DrawCommand>,
    batch: GlyphBatch,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("placement", &self.placement.name())
            .field("grid", &self.grid)
            .field("content", &self.content.label())
            .field("atlas_ready", &self.atlas.is_some())
            .finish_non_exhaustive()
    }
}

fn frame_input<'a>(
    content: &'a ContentState,
    placeholder: &'a [char],
    grid: &GridState,
) -> FrameInput<'a> {
    let (text, source_indices) = match content.text().filter(|t| !t.is_empty()) {
        Some(buf) => (buf.chars(), Some(buf.source_indices())),
        None => (placeholder, None),
    };
    FrameInput {
        text,
        source_indices,
        dims: grid.dims(),
        viewport: grid.viewport(),
        mouse: grid.mouse(),
        time: grid.time(),
    }
}

impl Session {
    /// Build a session from a validated configuration.
    pub fn new(config: SceneConfig) -> Result<Self, SeaError> {
        config.validate()?;
        let placement: Box<dyn CharacterPlacement> = match config.placement {
            PlacementKind::Wave => Box::new(WaveLayout::new(config.grid, config.wave, config.pointer)),
            PlacementKind::Orbit => Box::new(OrbitLayout::new(config.orbit, &config.grid)),
        };
        tracing::debug!(placement = placement.name(), "session created");
        Ok(Self {
            config,
            grid: GridState::new(),
            pointer_px: None,
            content: ContentState::default(),
            placement,
            atlas: None,
            placeholder: PLACEHOLDER.chars().collect(),
            commands: Vec::new(),
            batch: GlyphBatch::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[must_use]
    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    #[must_use]
    pub fn dims(&self) -> GridDims {
        self.grid.dims()
    }

    #[must_use]
    pub fn content(&self) -> &ContentState {
        &self.content
    }

    #[must_use]
    pub fn placement_name(&self) -> &'static str {
        self.placement.name()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Drop per-layout state, then replay the last pointer position so a
    /// resting cursor keeps its effect.
    fn reset_placement(&mut self) {
        self.placement.reset();
        if self.grid.mouse().is_some() {
            let input = frame_input(&self.content, &self.placeholder, &self.grid);
            self.placement.pointer_moved(&input);
        }
    }

    /// Apply a canvas size in pixels. Returns `false` if nothing changed.
    pub fn resize(&mut self, width_px: u32, height_px: u32) -> bool {
        let viewport = Vec2::new(width_px as f32, height_px as f32);
        let dims = self.placement.grid_dims(viewport);
        if !self.grid.set_viewport(viewport, dims) {
            return false;
        }
        self.reset_placement();
        tracing::debug!(
            width_px,
            height_px,
            cols = dims.width,
            rows = dims.height,
            "grid resized"
        );
        true
    }

    /// Pointer moved to canvas-local pixels (origin top-left).
    pub fn pointer_moved(&mut self, canvas_x: f32, canvas_y: f32) {
        let px = Vec2::new(canvas_x, canvas_y);
        self.pointer_px = Some(px);
        self.grid.set_mouse(px / self.placement.cell_size());
        let input = frame_input(&self.content, &self.placeholder, &self.grid);
        self.placement.pointer_moved(&input);
    }

    /// Set the animation clock, in seconds.
    pub fn tick(&mut self, seconds: f32) {
        self.grid.set_time(seconds);
    }

    pub fn begin_loading(&mut self) {
        self.content.begin_loading();
        self.reset_placement();
        tracing::debug!(state = self.content.label(), "content requested");
    }

    pub fn content_loaded(&mut self, text: TextBuffer) {
        tracing::info!(chars = text.len(), "content ready");
        self.content.loaded(text);
        self.reset_placement();
    }

    /// Record a content failure. A reload keeps the text already shown;
    /// otherwise the placeholder stays up.
    pub fn content_failed(&mut self, err: &SeaError) {
        tracing::warn!(error = %err, "content unavailable");
        self.content.failed(err.to_string());
    }

    /// Install the atlas once both parts arrived.
    pub fn set_atlas(&mut self, atlas: Arc<GlyphAtlas>) {
        tracing::info!(glyphs = atlas.len(), "glyph atlas ready");
        self.atlas = Some(atlas);
    }

    #[must_use]
    pub fn atlas(&self) -> Option<&Arc<GlyphAtlas>> {
        self.atlas.as_ref()
    }

    #[must_use]
    pub fn is_atlas_ready(&self) -> bool {
        self.atlas.is_some()
    }

    // -----------------------------------------------------------------------
    // Frame output
    // -----------------------------------------------------------------------

    /// Lay out the current frame.
    pub fn frame(&mut self) -> &[DrawCommand] {
        self.commands.clear();
        let input = frame_input(&self.content, &self.placeholder, &self.grid);
        self.placement.place(&input, &mut self.commands);
        &self.commands
    }

    /// Lay out the current frame and turn it into glyph instances.
    ///
    /// Cells whose glyph is missing, or all cells while the atlas is still
    /// loading, produce nothing.
    pub fn glyph_instances(&mut self) -> &[GlyphInstance] {
        let _span = tracing::trace_span!("frame", time = self.grid.time()).entered();
        self.frame();
        self.batch.clear();
        self.batch.extend(self.atlas.as_deref(), &self.commands);
        self.batch.instances()
    }

    /// Background inputs for this frame: cursor in pixels with a
    /// bottom-left origin.
    #[must_use]
    pub fn background_input(&self) -> BackgroundInput {
        let mouse = self.pointer_px.map_or(Vec2::splat(FAR_AWAY), |p| {
            Vec2::new(p.x, self.grid.viewport().y - p.y)
        });
        BackgroundInput {
            mouse,
            time: self.grid.time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{AtlasMetrics, GlyphDescriptor};
    use crate::error::AssetKind;

    fn atlas_for(chars: &str) -> Arc<GlyphAtlas> {
        let metrics = AtlasMetrics {
            line_height: 32.0,
            scale_w: 256.0,
            distance_range: 4.0,
        };
        let glyphs = chars.chars().map(|ch| GlyphDescriptor {
            ch,
            x: 0.0,
            y: 0.0,
            width: 16.0,
            height: 20.0,
            xoffset: 0.0,
            yoffset: 0.0,
            xadvance: 16.0,
        });
        Arc::new(GlyphAtlas::from_glyphs(metrics, glyphs))
    }

    fn session() -> Session {
        let mut s = Session::new(SceneConfig::default()).expect("default config");
        s.resize(300, 90);
        s
    }

    #[test]
    fn placeholder_until_ready() {
        let mut s = session();
        let drawn: String = s.frame().iter().map(|c| c.ch).collect();
        assert_eq!(drawn, PLACEHOLDER);

        s.begin_loading();
        s.content_loaded(TextBuffer::from_plain("hello"));
        let drawn: String = s.frame().iter().map(|c| c.ch).collect();
        assert_eq!(drawn, "hello");
    }

    #[test]
    fn failure_keeps_placeholder() {
        let mut s = session();
        s.begin_loading();
        s.content_failed(&SeaError::AssetFetch {
            asset: AssetKind::PageContent,
            reason: "offline".into(),
        });
        assert_eq!(s.content().label(), "failed");
        assert_eq!(s.frame().len(), PLACEHOLDER.len());
    }

    #[test]
    fn failed_reload_keeps_current_text() {
        let mut s = session();
        s.begin_loading();
        s.content_loaded(TextBuffer::from_plain("hello"));
        s.begin_loading();
        let during: String = s.frame().iter().map(|c| c.ch).collect();
        assert_eq!(during, "hello");

        s.content_failed(&SeaError::AssetFetch {
            asset: AssetKind::PageContent,
            reason: "offline".into(),
        });
        let after: String = s.frame().iter().map(|c| c.ch).collect();
        assert_eq!(after, "hello");
        assert!(s.content().is_ready());
    }

    #[test]
    fn orbit_field_survives_resize_under_resting_cursor() {
        let config = SceneConfig {
            placement: PlacementKind::Orbit,
            ..SceneConfig::default()
        };
        let mut s = Session::new(config).expect("orbit config");
        s.resize(300, 90);
        s.content_loaded(TextBuffer::from_plain(&"x".repeat(60)));
        s.pointer_moved(45.0, 45.0);
        let warped: Vec<DrawCommand> = s.frame().to_vec();

        // Grow and shrink back: same grid, same resting cursor.
        assert!(s.resize(600, 90));
        assert!(s.resize(300, 90));
        assert_eq!(s.frame(), warped.as_slice());

        let mut calm = Session::new(SceneConfig {
            placement: PlacementKind::Orbit,
            ..SceneConfig::default()
        })
        .expect("orbit config");
        calm.resize(300, 90);
        calm.content_loaded(TextBuffer::from_plain(&"x".repeat(60)));
        assert_ne!(calm.frame(), warped.as_slice());
    }

    #[test]
    fn empty_content_shows_placeholder() {
        let mut s = session();
        s.content_loaded(TextBuffer::new());
        assert_eq!(s.frame().len(), PLACEHOLDER.len());
    }

    #[test]
    fn resize_is_idempotent() {
        let mut s = session();
        assert!(!s.resize(300, 90));
        assert_eq!(s.dims(), GridDims::new(10, 3));
        assert!(s.resize(600, 90));
        assert_eq!(s.dims(), GridDims::new(20, 3));
    }

    #[test]
    fn no_instances_before_atlas() {
        let mut s = session();
        assert!(s.glyph_instances().is_empty());
        s.set_atlas(atlas_for("Loadig."));
        // "Loading..." needs L, o, a, d, i, n, g and '.'; 'n' is missing.
        assert_eq!(s.glyph_instances().len(), PLACEHOLDER.len() - 1);
    }

    #[test]
    fn background_mouse_is_flipped_and_far_before_first_move() {
        let mut s = session();
        assert_eq!(s.background_input().mouse, Vec2::splat(FAR_AWAY));
        s.pointer_moved(40.0, 10.0);
        assert_eq!(s.background_input().mouse, Vec2::new(40.0, 80.0));
        assert_eq!(s.grid().mouse(), Some(Vec2::new(40.0 / 30.0, 10.0 / 30.0)));
    }

    #[test]
    fn orbit_session_uses_ceil_grid() {
        let config = SceneConfig {
            placement: PlacementKind::Orbit,
            ..SceneConfig::default()
        };
        let mut s = Session::new(config).expect("orbit config");
        s.resize(310, 90);
        assert_eq!(s.placement_name(), "orbit");
        assert_eq!(s.dims(), GridDims::new(11, 3));
    }
}
