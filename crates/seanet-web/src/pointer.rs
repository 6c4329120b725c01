#![forbid(unsafe_code)]

//! Canvas geometry helpers that do not need the DOM.

use glam::Vec2;

/// Convert a page-space pointer position to canvas-local pixels.
///
/// `offsets` are the `(offsetLeft, offsetTop)` pairs of the canvas and each
/// element up its `offsetParent` chain.
#[must_use]
pub fn page_to_canvas(page: Vec2, offsets: impl IntoIterator<Item = Vec2>) -> Vec2 {
    offsets.into_iter().fold(page, |p, offset| p - offset)
}

/// `clientWidth`/`clientHeight` as a backing-store size. Negative values
/// (detached elements) clamp to zero.
#[must_use]
pub fn clamp_client(client: (i32, i32)) -> (u32, u32) {
    (client.0.max(0) as u32, client.1.max(0) as u32)
}

/// New backing-store size when the canvas no longer matches its layout box.
#[must_use]
pub fn synced_size(backing: (u32, u32), client: (i32, i32)) -> Option<(u32, u32)> {
    let client = clamp_client(client);
    (client != backing).then_some(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtracts_every_offset_in_the_chain() {
        let offsets = [Vec2::new(10.0, 20.0), Vec2::new(5.0, 0.0), Vec2::new(0.0, 8.0)];
        assert_eq!(
            page_to_canvas(Vec2::new(100.0, 50.0), offsets),
            Vec2::new(85.0, 22.0)
        );
    }

    #[test]
    fn no_parents_is_identity() {
        assert_eq!(
            page_to_canvas(Vec2::new(3.0, 4.0), std::iter::empty()),
            Vec2::new(3.0, 4.0)
        );
    }

    #[test]
    fn size_sync_only_on_change() {
        assert_eq!(synced_size((300, 150), (300, 150)), None);
        assert_eq!(synced_size((300, 150), (640, 480)), Some((640, 480)));
        assert_eq!(synced_size((300, 150), (-1, 20)), Some((0, 20)));
    }

    #[test]
    fn first_sync_matches_initial_backing_size() {
        // The driver sizes the canvas with `clamp_client` at start-up and
        // then compares raw client sizes every frame.
        for raw in [(640, 480), (-5, 300), (0, 0)] {
            assert_eq!(synced_size(clamp_client(raw), raw), None);
            assert_eq!(synced_size((1, 1), raw).unwrap_or((1, 1)), clamp_client(raw));
        }
    }
}
