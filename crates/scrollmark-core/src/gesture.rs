use crate::layout::finite_or_zero;

/// Half-screen jump for a click at `client_y` within a viewport of
/// `viewport_height`: upward in the top half, downward otherwise.
pub fn click_scroll_delta(client_y: f32, viewport_height: f32) -> f32 {
    let half = finite_or_zero(viewport_height).max(0.0) / 2.0;
    if finite_or_zero(client_y) < half {
        -half
    } else {
        half
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_halves_pick_direction() {
        assert_eq!(click_scroll_delta(100.0, 800.0), -400.0);
        assert_eq!(click_scroll_delta(650.0, 800.0), 400.0);
        assert_eq!(click_scroll_delta(400.0, 800.0), 400.0);
    }

    #[test]
    fn degenerate_viewport_does_not_move() {
        assert_eq!(click_scroll_delta(10.0, 0.0), 0.0);
        assert_eq!(click_scroll_delta(10.0, f32::NAN), 0.0);
    }
}
