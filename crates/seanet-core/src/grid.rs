#![forbid(unsafe_code)]

//! Grid geometry and per-session grid state.

use glam::Vec2;

/// Rounding rule used to turn viewport pixels into whole cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRounding {
    Round,
    Ceil,
}

impl CellRounding {
    fn apply(self, v: f32) -> f32 {
        match self {
            Self::Round => v.round(),
            Self::Ceil => v.ceil(),
        }
    }
}

/// Grid dimensions in cells. Always at least 1×1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDims {
    pub width: u32,
    pub height: u32,
}

impl GridDims {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Derive dimensions from a viewport size in pixels.
    #[must_use]
    pub fn from_viewport(
        viewport: Vec2,
        cell_size: f32,
        horizontal: CellRounding,
        vertical: CellRounding,
    ) -> Self {
        let cells = |px: f32, rounding: CellRounding| -> u32 {
            let v = rounding.apply(px.max(0.0) / cell_size);
            if v.is_finite() { v as u32 } else { 1 }
        };
        Self::new(
            cells(viewport.x, horizontal),
            cells(viewport.y, vertical),
        )
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Mutable per-session grid state.
///
/// Dimensions change on resize, time on every frame, the cursor on pointer
/// moves. Only the owning session writes to it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridState {
    dims: GridDims,
    viewport: Vec2,
    /// Cursor in cell space, `None` until the first pointer move.
    mouse: Option<Vec2>,
    time: f32,
}

impl GridState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    #[must_use]
    pub fn mouse(&self) -> Option<Vec2> {
        self.mouse
    }

    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Store a new viewport and grid. Returns `false` when nothing changed.
    pub(crate) fn set_viewport(&mut self, viewport: Vec2, dims: GridDims) -> bool {
        if self.viewport == viewport && self.dims == dims {
            return false;
        }
        self.viewport = viewport;
        self.dims = dims;
        true
    }

    pub(crate) fn set_mouse(&mut self, cell: Vec2) {
        self.mouse = Some(cell);
    }

    pub(crate) fn set_time(&mut self, time: f32) {
        self.time = time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dims_are_clamped() {
        assert_eq!(GridDims::new(0, 0), GridDims::new(1, 1));
    }

    #[test]
    fn viewport_rounding_rules() {
        let dims = GridDims::from_viewport(
            Vec2::new(800.0, 610.0),
            30.0,
            CellRounding::Round,
            CellRounding::Ceil,
        );
        // 800/30 = 26.67 -> 27, 610/30 = 20.33 -> 21
        assert_eq!(dims, GridDims::new(27, 21));
    }

    #[test]
    fn tiny_viewport_still_has_one_cell() {
        let dims = GridDims::from_viewport(
            Vec2::new(3.0, 0.5),
            30.0,
            CellRounding::Round,
            CellRounding::Ceil,
        );
        assert_eq!(dims, GridDims::new(1, 1));
    }

    #[test]
    fn set_viewport_reports_changes_only() {
        let mut state = GridState::new();
        let dims = GridDims::new(10, 5);
        assert!(state.set_viewport(Vec2::new(300.0, 150.0), dims));
        assert!(!state.set_viewport(Vec2::new(300.0, 150.0), dims));
        assert_eq!(state.dims(), dims);
    }
}
