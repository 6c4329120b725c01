#![forbid(unsafe_code)]

//! Grid layout and wave engine.
//!
//! Each frame, every visible cell gets a position made of:
//! - its grid slot, optionally pulled horizontally toward the cursor when
//!   the cell lies inside the falloff ellipse, and
//! - a travelling wave whose phase shifts diagonally across the grid.
//!
//! Inside the ellipse the normalized squared distance `d` both scales the
//! wave amplitude and drives a sigmoid blend between the slot and a target
//! that packs the row's characters around the cursor in source order.

use crate::config::{GridConfig, PointerConfig, WaveConfig};
use crate::grid::{CellRounding, GridDims};
use crate::placement::{CharacterPlacement, DrawCommand, FrameInput};
use crate::sdf::Rgba;
use glam::Vec2;

/// Sigmoid blend from `pulled` (at `d = 0`) to `slot` (at `d = 1`).
///
/// `fac = 1 / (1 + (d / (1 - d))^fade)` is the weight of `pulled`.
#[must_use]
pub fn pull_blend(pulled: f32, slot: f32, d: f32, fade: f32) -> f32 {
    if d <= 0.0 {
        return pulled;
    }
    if d >= 1.0 {
        return slot;
    }
    let fac = 1.0 / (1.0 + (d / (1.0 - d)).powf(fade));
    (1.0 - fac) * slot + fac * pulled
}

/// Wave engine with elliptical cursor pull.
#[derive(Debug, Clone)]
pub struct WaveLayout {
    grid: GridConfig,
    wave: WaveConfig,
    pointer: PointerConfig,
    color: Rgba,
}

/// Pull parameters shared by a row.
#[derive(Debug, Clone, Copy)]
struct RowPull {
    mouse: Vec2,
    /// Source position under the cursor.
    center: f32,
    /// Cells outside this range are never inside the ellipse.
    lo: f32,
    hi: f32,
}

impl WaveLayout {
    #[must_use]
    pub fn new(grid: GridConfig, wave: WaveConfig, pointer: PointerConfig) -> Self {
        Self {
            color: Rgba::from(grid.color),
            grid,
            wave,
            pointer,
        }
    }

    /// Pixel position of a cell at fractional column `x`, row `y`.
    #[must_use]
    pub fn wave_position(&self, x: f32, y: f32, amp: f32, time: f32, viewport_h: f32) -> Vec2 {
        let phase = (time - self.wave.x_offset * x - self.wave.y_offset * y) * self.wave.velocity;
        let vx = x + 0.5 + phase.sin() * amp;
        let vy = y + 0.5 - phase.cos() * amp;
        let cell = self.grid.cell_size;
        Vec2::new(vx * cell, viewport_h - vy * cell)
    }

    /// Amplitude of cells outside the falloff.
    #[must_use]
    pub fn nominal_amplitude(&self) -> f32 {
        self.wave.amplitude / 2.0
    }

    fn row_pull(&self, frame: &FrameInput<'_>, y: usize, row_start: usize) -> Option<RowPull> {
        let mouse = frame.mouse?;
        if (y as f32 - mouse.y).abs() >= self.pointer.radius_y {
            return None;
        }
        let width = frame.dims.width as usize;
        let min_i = frame.row_bound(row_start);
        let max_i = frame.row_bound(row_start + width);
        let center = (mouse.x / width as f32) * (max_i - min_i) + min_i;
        Some(RowPull {
            mouse,
            center,
            lo: (mouse.x - self.pointer.radius_x).floor(),
            hi: (mouse.x + self.pointer.radius_x).ceil(),
        })
    }

    /// Lay out one frame, appending to `out`.
    ///
    /// Stops at the end of the text; a partial last row is simply shorter.
    pub fn layout_frame(&self, frame: &FrameInput<'_>, out: &mut Vec<DrawCommand>) {
        let len = frame.text.len();
        let width = frame.dims.width as usize;
        let spacing = self.grid.text_spacing();
        let (rx, ry) = (self.pointer.radius_x, self.pointer.radius_y);

        for y in 0..frame.dims.height as usize {
            let row_start = y * width;
            if row_start >= len {
                return;
            }
            let pull = self.row_pull(frame, y, row_start);

            for x in 0..width {
                let i = row_start + x;
                if i >= len {
                    return;
                }
                let mut amp = self.nominal_amplitude();
                let mut client_x = x as f32;

                if let Some(p) = pull.filter(|p| (p.lo..=p.hi).contains(&(x as f32))) {
                    let dx = (x as f32 - p.mouse.x) / rx;
                    let dy = (y as f32 - p.mouse.y) / ry;
                    let sum = dx * dx + dy * dy;
                    if sum < 1.0 {
                        amp *= sum;
                        let target = p.mouse.x + spacing * (frame.source_index(i) - p.center);
                        client_x = pull_blend(target, x as f32, sum, self.pointer.fade);
                    }
                }

                out.push(DrawCommand {
                    ch: frame.text[i],
                    position: self.wave_position(
                        client_x,
                        y as f32,
                        amp,
                        frame.time,
                        frame.viewport.y,
                    ),
                    size: self.grid.font_size,
                    color: self.color,
                    weight: self.grid.weight,
                });
            }
        }
    }
}

impl CharacterPlacement for WaveLayout {
    fn name(&self) -> &'static str {
        "wave"
    }

    fn cell_size(&self) -> f32 {
        self.grid.cell_size
    }

    fn grid_dims(&self, viewport: Vec2) -> GridDims {
        GridDims::from_viewport(
            viewport,
            self.grid.cell_size,
            CellRounding::Round,
            CellRounding::Ceil,
        )
    }

    fn place(&mut self, frame: &FrameInput<'_>, out: &mut Vec<DrawCommand>) {
        self.layout_frame(frame, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> WaveLayout {
        WaveLayout::new(
            GridConfig::default(),
            WaveConfig::default(),
            PointerConfig::default(),
        )
    }

    fn input<'a>(
        text: &'a [char],
        idx: Option<&'a [usize]>,
        dims: GridDims,
        mouse: Option<Vec2>,
    ) -> FrameInput<'a> {
        FrameInput {
            text,
            source_indices: idx,
            dims,
            viewport: Vec2::new(dims.width as f32 * 30.0, dims.height as f32 * 30.0),
            mouse,
            time: 1.25,
        }
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(pull_blend(10.0, 2.0, 0.0, 2.0), 10.0);
        assert_eq!(pull_blend(10.0, 2.0, 1.0, 2.0), 2.0);
        // d = 0.5 -> ratio 1 -> fac 0.5
        assert!((pull_blend(10.0, 2.0, 0.5, 2.0) - 6.0).abs() < 1e-6);
    }

    #[test]
    fn blend_is_monotonic_in_distance() {
        let mut prev = pull_blend(10.0, 0.0, 0.0, 2.0);
        for step in 1..=20 {
            let d = step as f32 / 20.0;
            let v = pull_blend(10.0, 0.0, d, 2.0);
            assert!(v <= prev + 1e-6, "blend rose at d={d}");
            prev = v;
        }
    }

    #[test]
    fn truncates_at_text_length() {
        let text: Vec<char> = "hello world".chars().collect();
        let mut out = Vec::new();
        layout().layout_frame(&input(&text, None, GridDims::new(4, 5), None), &mut out);
        assert_eq!(out.len(), text.len());
        let drawn: String = out.iter().map(|c| c.ch).collect();
        assert_eq!(drawn, "hello world");
    }

    #[test]
    fn fills_grid_when_text_is_longer() {
        let text: Vec<char> = std::iter::repeat_n('x', 100).collect();
        let mut out = Vec::new();
        layout().layout_frame(&input(&text, None, GridDims::new(4, 5), None), &mut out);
        assert_eq!(out.len(), 20);
    }

    #[test]
    fn no_mouse_means_nominal_positions() {
        let engine = layout();
        let text: Vec<char> = "abcdef".chars().collect();
        let frame = input(&text, None, GridDims::new(3, 2), None);
        let mut out = Vec::new();
        engine.layout_frame(&frame, &mut out);
        for (i, cmd) in out.iter().enumerate() {
            let (x, y) = ((i % 3) as f32, (i / 3) as f32);
            let expected =
                engine.wave_position(x, y, engine.nominal_amplitude(), 1.25, frame.viewport.y);
            assert_eq!(cmd.position, expected);
        }
    }

    #[test]
    fn y_axis_is_flipped() {
        let engine = WaveLayout::new(
            GridConfig::default(),
            WaveConfig {
                amplitude: 0.0,
                ..WaveConfig::default()
            },
            PointerConfig::default(),
        );
        let text = ['a', 'b'];
        let mut out = Vec::new();
        engine.layout_frame(&input(&text, None, GridDims::new(1, 2), None), &mut out);
        // Row 0 sits at the top: 60 - 0.5 * 30.
        assert_eq!(out[0].position, Vec2::new(15.0, 45.0));
        assert_eq!(out[1].position, Vec2::new(15.0, 15.0));
    }

    #[test]
    fn cell_under_cursor_is_pulled_to_target_with_zero_amplitude() {
        let engine = WaveLayout::new(
            GridConfig::default(),
            WaveConfig::default(),
            PointerConfig::default(),
        );
        let text: Vec<char> = std::iter::repeat_n('x', 20).collect();
        // Cursor exactly on cell (5, 0) of a 20x1 grid.
        let frame = input(&text, None, GridDims::new(20, 1), Some(Vec2::new(5.0, 0.0)));
        let mut out = Vec::new();
        engine.layout_frame(&frame, &mut out);

        // centre = (5/20) * 20 = 5 -> target = 5 + spacing * 0 = 5; amp = 0.
        let expected = engine.wave_position(5.0, 0.0, 0.0, 1.25, frame.viewport.y);
        assert_eq!(out[5].position, expected);
    }

    #[test]
    fn pull_moves_neighbours_toward_cursor() {
        let engine = layout();
        let text: Vec<char> = std::iter::repeat_n('x', 40).collect();
        let mouse = Vec2::new(20.0, 0.0);
        let frame = input(&text, None, GridDims::new(40, 1), Some(mouse));
        let mut out = Vec::new();
        engine.layout_frame(&frame, &mut out);

        // Without sourceIndices the target packs cells at text spacing (< 1).
        let spacing = GridConfig::default().text_spacing();
        let x = 22usize;
        let d = ((x as f32 - 20.0) / 10.0).powi(2);
        let target = 20.0 + spacing * (x as f32 - 20.0);
        let pulled = pull_blend(target, x as f32, d, 2.0);
        assert!(pulled < x as f32);
        let expected =
            engine.wave_position(pulled, 0.0, engine.nominal_amplitude() * d, 1.25, 30.0);
        assert_eq!(out[x].position, expected);
    }
}
