//! Property-based invariant tests for the layout engines and their inputs.
//!
//! 1. Both engines emit exactly `min(L, W·H)` commands, in text order.
//! 2. A cursor outside every row's radius leaves all cells at their nominal
//!    wave position.
//! 3. Grid dimensions are at least 1×1 for any viewport; resize is
//!    idempotent.
//! 4. Text extraction keeps chars and indices aligned and non-decreasing.
//! 5. Atlas transforms are deterministic; unknown glyphs yield no instance.
//! 6. The perturbation field only holds cells inside the ellipse, and its
//!    reported counts match the change in size.
//! 7. The background field is pure and quantized.

use glam::Vec2;
use proptest::prelude::*;
use seanet_core::background::field_value;
use seanet_core::config::{GridConfig, OrbitConfig, PointerConfig, WaveConfig};
use seanet_core::grid::GridDims;
use seanet_core::layout::WaveLayout;
use seanet_core::orbit::{OrbitLayout, falloff};
use seanet_core::sdf::{GlyphBatch, Rgba};
use seanet_core::{
    CharacterPlacement, DrawCommand, FrameInput, GlyphAtlas, PlacementKind, SceneConfig, Session,
    TextBuffer,
};

const ATLAS: &str = r#"{
    "common": {"lineHeight": 32, "scaleW": 256},
    "distanceField": {"distanceRange": 4},
    "chars": [
        {"id": 97, "char": "a", "x": 0, "y": 0, "width": 14, "height": 16,
         "xoffset": 1, "yoffset": 8, "xadvance": 16},
        {"id": 98, "char": "b", "x": 16, "y": 0, "width": 14, "height": 22,
         "xoffset": 1, "yoffset": 2, "xadvance": 16}
    ]
}"#;

// ── Helpers ─────────────────────────────────────────────────────────────

fn wave() -> WaveLayout {
    WaveLayout::new(
        GridConfig::default(),
        WaveConfig::default(),
        PointerConfig::default(),
    )
}

fn text_strategy() -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(prop::char::range('!', '~'), 0..400)
}

fn dims_strategy() -> impl Strategy<Value = GridDims> {
    (1u32..40, 1u32..30).prop_map(|(w, h)| GridDims::new(w, h))
}

fn input<'a>(
    text: &'a [char],
    idx: Option<&'a [usize]>,
    dims: GridDims,
    mouse: Option<Vec2>,
    time: f32,
) -> FrameInput<'a> {
    FrameInput {
        text,
        source_indices: idx,
        dims,
        viewport: Vec2::new(dims.width as f32 * 30.0, dims.height as f32 * 30.0),
        mouse,
        time,
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Truncation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wave_emits_min_of_text_and_grid(
        text in text_strategy(),
        dims in dims_strategy(),
        mx in -5.0f32..45.0,
        my in -5.0f32..35.0,
        time in 0.0f32..100.0,
    ) {
        let mut out: Vec<DrawCommand> = Vec::new();
        wave().layout_frame(&input(&text, None, dims, Some(Vec2::new(mx, my)), time), &mut out);
        let expected = text.len().min(dims.cell_count());
        prop_assert_eq!(out.len(), expected);
        for (cmd, ch) in out.iter().zip(&text) {
            prop_assert_eq!(cmd.ch, *ch);
            prop_assert!(cmd.position.is_finite());
        }
    }

    #[test]
    fn orbit_emits_min_of_text_and_grid(
        text in text_strategy(),
        dims in dims_strategy(),
        mx in -5.0f32..45.0,
        my in -5.0f32..35.0,
    ) {
        let mut orbit = OrbitLayout::new(OrbitConfig::default(), &GridConfig::default());
        let frame = input(&text, None, dims, Some(Vec2::new(mx, my)), 0.5);
        orbit.pointer_moved(&frame);
        let mut out = Vec::new();
        orbit.place(&frame, &mut out);
        prop_assert_eq!(out.len(), text.len().min(dims.cell_count()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Far cursor
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn far_cursor_leaves_nominal_positions(
        text in text_strategy(),
        dims in dims_strategy(),
        mx in -100.0f32..100.0,
        time in 0.0f32..50.0,
    ) {
        let engine = wave();
        let mut nominal = Vec::new();
        engine.layout_frame(&input(&text, None, dims, None, time), &mut nominal);

        // Every row is more than radiusY away.
        let far = Some(Vec2::new(mx, -1000.0));
        let mut warped = Vec::new();
        engine.layout_frame(&input(&text, None, dims, far, time), &mut warped);

        prop_assert_eq!(nominal, warped);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Grid dimensions
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn grid_is_never_empty(w in 0u32..5000, h in 0u32..5000, orbit in any::<bool>()) {
        let config = SceneConfig {
            placement: if orbit { PlacementKind::Orbit } else { PlacementKind::Wave },
            ..SceneConfig::default()
        };
        let mut session = Session::new(config).expect("default config");
        session.resize(w, h);
        let dims = session.dims();
        prop_assert!(dims.width >= 1 && dims.height >= 1);
    }

    #[test]
    fn resize_is_idempotent(w in 1u32..5000, h in 1u32..5000) {
        let mut session = Session::new(SceneConfig::default()).expect("default config");
        session.resize(w, h);
        let dims = session.dims();
        prop_assert!(!session.resize(w, h));
        prop_assert_eq!(session.dims(), dims);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Text extraction
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn text_buffer_stays_aligned(raw in "\\PC{0,200}") {
        let buf = TextBuffer::from_plain(&raw);
        prop_assert_eq!(buf.chars().len(), buf.source_indices().len());
        prop_assert!(buf.source_indices().windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(buf.chars().iter().all(|c| c.is_ascii() && !c.is_ascii_control()));
        let n = raw.chars().count();
        prop_assert!(buf.source_indices().iter().all(|&i| i < n));
    }

    #[test]
    fn wave_accepts_real_source_indices(raw in "[a-z \\t]{0,300}", dims in dims_strategy(), mx in 0.0f32..40.0, my in 0.0f32..30.0) {
        let buf = TextBuffer::from_plain(&raw);
        let frame = input(buf.chars(), Some(buf.source_indices()), dims, Some(Vec2::new(mx, my)), 2.0);
        let mut out = Vec::new();
        wave().layout_frame(&frame, &mut out);
        prop_assert_eq!(out.len(), buf.len().min(dims.cell_count()));
        prop_assert!(out.iter().all(|c| c.position.is_finite()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Atlas
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn atlas_transforms_are_deterministic() {
    let a = GlyphAtlas::load(ATLAS).expect("atlas");
    let b = GlyphAtlas::load(ATLAS).expect("atlas");
    for ch in ['a', 'b'] {
        let ta = a.transform(ch).map(|t| (t.view, t.uv));
        let tb = b.transform(ch).map(|t| (t.view, t.uv));
        assert!(ta.is_some());
        assert_eq!(ta, tb);
    }
}

proptest! {
    #[test]
    fn unknown_glyphs_produce_no_instances(text in "[a-z]{0,60}") {
        let atlas = GlyphAtlas::load(ATLAS).expect("atlas");
        let mut batch = GlyphBatch::new();
        let mut accepted = 0;
        for ch in text.chars() {
            if batch.draw_char(Some(&atlas), ch, Vec2::ZERO, 20.0, Rgba::WHITE, 0.5).is_ok() {
                accepted += 1;
            }
        }
        let known = text.chars().filter(|c| matches!(c, 'a' | 'b')).count();
        prop_assert_eq!(accepted, known);
        prop_assert_eq!(batch.len(), known);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Perturbation field
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn field_tracks_the_ellipse(
        moves in prop::collection::vec((-10.0f32..50.0, -10.0f32..40.0), 1..12),
        dims in dims_strategy(),
    ) {
        let text: Vec<char> = std::iter::repeat_n('x', dims.cell_count()).collect();
        let config = OrbitConfig::default();
        let mut orbit = OrbitLayout::new(config, &GridConfig::default());
        let mut live = 0usize;
        for (mx, my) in moves {
            let mouse = Vec2::new(mx, my);
            orbit.pointer_moved(&input(&text, None, dims, Some(mouse), 0.0));
            let update = orbit.last_update();
            live = live + update.inserted - update.removed;
            prop_assert_eq!(orbit.field().len(), live);
            for (key, _) in orbit.field().iter() {
                let f = falloff(mx - key.x as f32, my - key.y as f32, config.radius_x, config.radius_y);
                prop_assert!(f > 0.0, "cell {:?} outside ellipse", key);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Background
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn background_is_pure_and_quantized(
        fx in 0.0f32..2000.0,
        fy in 0.0f32..2000.0,
        mx in 0.0f32..2000.0,
        my in 0.0f32..2000.0,
        time in 0.0f32..100.0,
    ) {
        let frag = Vec2::new(fx, fy);
        let mouse = Vec2::new(mx, my);
        let a = field_value(frag, mouse, time, 300.0);
        let b = field_value(frag, mouse, time, 300.0);
        prop_assert_eq!(a.to_bits(), b.to_bits());
        prop_assert!(a == 0.0 || (a - 0.4).abs() < 1e-6);
    }
}
