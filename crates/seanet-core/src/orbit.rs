#![forbid(unsafe_code)]

//! Orbit placement.
//!
//! Every cell circles its slot at a fixed radius. Around the cursor a sparse
//! [`PerturbationField`] shrinks the orbit and shifts the cell horizontally
//! so the row's characters gather around the pointer in source order. Only
//! cells that enter or leave the falloff ellipse touch the map.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use crate::config::{GridConfig, OrbitConfig};
use crate::grid::{CellRounding, GridDims};
use crate::placement::{CharacterPlacement, DrawCommand, FrameInput};
use crate::sdf::Rgba;
use glam::Vec2;

/// Grid cell. Orders row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub y: u32,
    pub x: u32,
}

impl CellKey {
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { y, x }
    }
}

/// Local override of a cell's motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perturbation {
    /// Orbit radius in pixels.
    pub amplitude: f32,
    /// Horizontal offset in pixels.
    pub shift: f32,
}

/// What a pointer move changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldUpdate {
    pub inserted: usize,
    pub updated: usize,
    pub removed: usize,
}

impl FieldUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.removed == 0
    }
}

/// Ellipse weight: 1 at the centre, 0 on and outside the boundary.
#[must_use]
pub fn falloff(dx: f32, dy: f32, rx: f32, ry: f32) -> f32 {
    let (nx, ny) = (dx / rx, dy / ry);
    (1.0 - nx * nx - ny * ny).max(0.0)
}

/// Half-open cell range `[floor(max(c - r, 0)), ceil(min(c + r, limit)))`.
fn window(center: f32, radius: f32, limit: u32) -> std::ops::Range<u32> {
    let lo = (center - radius).max(0.0).floor();
    let hi = (center + radius).min(limit as f32).ceil();
    if hi <= lo {
        return 0..0;
    }
    lo as u32..hi as u32
}

/// Sparse map of perturbed cells.
#[derive(Debug, Clone, Default)]
pub struct PerturbationField {
    cells: BTreeMap<CellKey, Perturbation>,
}

impl PerturbationField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: CellKey) -> Option<&Perturbation> {
        self.cells.get(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &Perturbation)> {
        self.cells.iter()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Recompute the field for a cursor at `mouse` (cell space).
    pub fn update(
        &mut self,
        frame: &FrameInput<'_>,
        mouse: Vec2,
        config: &OrbitConfig,
        font_spacing: f32,
    ) -> FieldUpdate {
        let mut stats = FieldUpdate::default();
        let dims = frame.dims;
        let xs = window(mouse.x, config.radius_x, dims.width);
        let ys = window(mouse.y, config.radius_y, dims.height);

        let before = self.cells.len();
        self.cells
            .retain(|key, _| xs.contains(&key.x) && ys.contains(&key.y));
        stats.removed += before - self.cells.len();

        let width = dims.width as usize;
        let frac = mouse.x / dims.width as f32;
        let len = frame.text.len();

        for y in ys {
            let row_start = y as usize * width;
            let row_min = frame.row_bound(row_start);
            let row_size = frame.row_bound(row_start + width) - row_min;
            let centre = frac * row_size + row_min;

            for x in xs.clone() {
                let key = CellKey::new(x, y);
                let i = row_start + x as usize;
                let factor = if i < len {
                    falloff(mouse.x - x as f32, mouse.y - y as f32, config.radius_x, config.radius_y)
                } else {
                    0.0
                };
                if factor <= 0.0 {
                    if self.cells.remove(&key).is_some() {
                        stats.removed += 1;
                    }
                    continue;
                }
                let di = frame.source_index(i) - centre;
                let perturbation = Perturbation {
                    amplitude: (1.0 - factor) * config.max_amplitude,
                    shift: ((mouse.x + di * font_spacing) - x as f32) * factor * config.spacing,
                };
                match self.cells.insert(key, perturbation) {
                    Some(_) => stats.updated += 1,
                    None => stats.inserted += 1,
                }
            }
        }
        stats
    }
}

/// Orbiting cells with a sparse cursor field.
#[derive(Debug, Clone)]
pub struct OrbitLayout {
    config: OrbitConfig,
    font_spacing: f32,
    font_size: f32,
    weight: f32,
    color: Rgba,
    field: PerturbationField,
    last_update: FieldUpdate,
}

impl OrbitLayout {
    #[must_use]
    pub fn new(config: OrbitConfig, grid: &GridConfig) -> Self {
        Self {
            font_spacing: grid.font_size / config.spacing,
            font_size: grid.font_size,
            weight: grid.weight,
            color: Rgba::from(grid.color),
            config,
            field: PerturbationField::new(),
            last_update: FieldUpdate::default(),
        }
    }

    #[must_use]
    pub fn field(&self) -> &PerturbationField {
        &self.field
    }

    /// Counts from the most recent pointer move.
    #[must_use]
    pub fn last_update(&self) -> FieldUpdate {
        self.last_update
    }

    /// Pixel position of cell `(x, y)` with the given perturbation.
    #[must_use]
    pub fn orbit_position(
        &self,
        x: u32,
        y: u32,
        perturbation: Option<&Perturbation>,
        time: f32,
        viewport_h: f32,
    ) -> Vec2 {
        let spacing = self.config.spacing;
        let px = x as f32 * spacing;
        let py = y as f32 * spacing;
        let (amplitude, shift) =
            perturbation.map_or((self.config.max_amplitude, 0.0), |p| (p.amplitude, p.shift));

        let phase = (time + self.config.delay_per_px * (px + py)) / self.config.period;
        let angle = phase.fract() * TAU;
        let centre = Vec2::new(px + 0.5 * spacing + shift, viewport_h - (py + 0.5 * spacing));
        centre + Vec2::new(angle.cos(), angle.sin()) * amplitude
    }
}

impl CharacterPlacement for OrbitLayout {
    fn name(&self) -> &'static str {
        "orbit"
    }

    fn cell_size(&self) -> f32 {
        self.config.spacing
    }

    fn grid_dims(&self, viewport: Vec2) -> GridDims {
        GridDims::from_viewport(
            viewport,
            self.config.spacing,
            CellRounding::Ceil,
            CellRounding::Ceil,
        )
    }

    fn pointer_moved(&mut self, frame: &FrameInput<'_>) {
        let Some(mouse) = frame.mouse else {
            return;
        };
        self.last_update = self
            .field
            .update(frame, mouse, &self.config, self.font_spacing);
        if !self.last_update.is_empty() {
            tracing::trace!(
                inserted = self.last_update.inserted,
                updated = self.last_update.updated,
                removed = self.last_update.removed,
                live = self.field.len(),
                "perturbation field updated"
            );
        }
    }

    fn reset(&mut self) {
        self.field.clear();
    }

    fn place(&mut self, frame: &FrameInput<'_>, out: &mut Vec<DrawCommand>) {
        let len = frame.text.len();
        let width = frame.dims.width;
        for y in 0..frame.dims.height {
            for x in 0..width {
                let i = (y * width + x) as usize;
                if i >= len {
                    return;
                }
                let p = self.field.get(CellKey::new(x, y));
                out.push(DrawCommand {
                    ch: frame.text[i],
                    position: self.orbit_position(x, y, p, frame.time, frame.viewport.y),
                    size: self.font_size,
                    color: self.color,
                    weight: self.weight,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame<'a>(text: &'a [char], dims: GridDims, mouse: Option<Vec2>) -> FrameInput<'a> {
        FrameInput {
            text,
            source_indices: None,
            dims,
            viewport: Vec2::new(dims.width as f32 * 30.0, dims.height as f32 * 30.0),
            mouse,
            time: 0.0,
        }
    }

    fn engine() -> OrbitLayout {
        OrbitLayout::new(OrbitConfig::default(), &GridConfig::default())
    }

    #[test]
    fn falloff_is_one_at_centre_and_zero_outside() {
        assert_eq!(falloff(0.0, 0.0, 15.0, 4.0), 1.0);
        assert_eq!(falloff(15.0, 0.0, 15.0, 4.0), 0.0);
        assert_eq!(falloff(20.0, 5.0, 15.0, 4.0), 0.0);
    }

    #[test]
    fn window_clamps_to_grid() {
        assert_eq!(window(2.5, 15.0, 40), 0..18);
        assert_eq!(window(38.0, 15.0, 40), 23..40);
        assert_eq!(window(-30.0, 15.0, 40), 0..0);
    }

    #[test]
    fn first_move_inserts_then_same_move_updates() {
        let text: Vec<char> = std::iter::repeat_n('x', 40 * 10).collect();
        let dims = GridDims::new(40, 10);
        let mouse = Vec2::new(20.0, 5.0);
        let mut layout = engine();

        layout.pointer_moved(&frame(&text, dims, Some(mouse)));
        let first = layout.last_update();
        assert!(first.inserted > 0);
        assert_eq!(first.updated, 0);
        assert_eq!(first.removed, 0);
        assert_eq!(layout.field().len(), first.inserted);

        layout.pointer_moved(&frame(&text, dims, Some(mouse)));
        let second = layout.last_update();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, first.inserted);
    }

    #[test]
    fn moving_away_clears_the_field() {
        let text: Vec<char> = std::iter::repeat_n('x', 40 * 10).collect();
        let dims = GridDims::new(40, 10);
        let mut layout = engine();
        layout.pointer_moved(&frame(&text, dims, Some(Vec2::new(20.0, 5.0))));
        let live = layout.field().len();

        layout.pointer_moved(&frame(&text, dims, Some(Vec2::new(-100.0, -100.0))));
        assert_eq!(layout.last_update().removed, live);
        assert!(layout.field().is_empty());
    }

    #[test]
    fn only_cells_inside_the_ellipse_are_perturbed() {
        let text: Vec<char> = std::iter::repeat_n('x', 40 * 10).collect();
        let dims = GridDims::new(40, 10);
        let mouse = Vec2::new(20.0, 5.0);
        let mut layout = engine();
        layout.pointer_moved(&frame(&text, dims, Some(mouse)));
        for (key, p) in layout.field().iter() {
            let f = falloff(mouse.x - key.x as f32, mouse.y - key.y as f32, 15.0, 4.0);
            assert!(f > 0.0);
            assert!(p.amplitude < 8.0 + 1e-6);
        }
        // Centre cell: factor 1, orbit collapses.
        let centre = layout.field().get(CellKey::new(20, 5)).copied();
        assert_eq!(centre.map(|p| p.amplitude), Some(0.0));
    }

    #[test]
    fn unperturbed_cells_orbit_at_full_radius() {
        let layout = engine();
        for t in [0.0f32, 0.3, 1.1] {
            let pos = layout.orbit_position(3, 2, None, t, 300.0);
            let slot = Vec2::new(3.0 * 30.0 + 15.0, 300.0 - (2.0 * 30.0 + 15.0));
            assert!((pos.distance(slot) - 8.0).abs() < 1e-3);
        }
    }

    #[test]
    fn place_truncates_at_text_length() {
        let text: Vec<char> = "orbit".chars().collect();
        let mut layout = engine();
        let mut out = Vec::new();
        layout.place(&frame(&text, GridDims::new(3, 3), None), &mut out);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn grid_uses_ceil_both_ways() {
        let dims = engine().grid_dims(Vec2::new(800.0, 610.0));
        assert_eq!(dims, GridDims::new(27, 21));
    }
}
