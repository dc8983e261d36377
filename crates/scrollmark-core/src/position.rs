use crate::config::{EngineConfig, PositionMode};
use crate::layout::{LayoutIndex, LayoutSurface, Viewport, finite_or_zero};

/// Logical reader position. A session only ever produces the variant that
/// matches its configured [`PositionMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    PanelIndex(usize),
    ScrollOffset(i64),
}

impl Position {
    /// Interpret a raw resume seed for the given mode. Negative panel seeds
    /// clamp to the first panel.
    pub fn from_seed(mode: PositionMode, seed: i64) -> Self {
        match mode {
            PositionMode::PanelIndex => Position::PanelIndex(seed.max(0) as usize),
            PositionMode::ScrollOffset => Position::ScrollOffset(seed),
        }
    }

    /// Field name used on the wire for this representation.
    pub fn field_name(self) -> &'static str {
        match self {
            Position::PanelIndex(_) => "index",
            Position::ScrollOffset(_) => "scroll",
        }
    }

    pub fn value(self) -> i64 {
        match self {
            Position::PanelIndex(idx) => idx as i64,
            Position::ScrollOffset(px) => px,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.field_name(), self.value())
    }
}

/// Maps viewport state onto a logical [`Position`].
#[derive(Debug, Clone, Copy)]
pub struct PositionTracker {
    mode: PositionMode,
    slack_px: f32,
    header_gap_px: f32,
    completion_slack_px: f32,
}

impl PositionTracker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            mode: config.position_mode,
            slack_px: config.selection_slack_px,
            header_gap_px: config.header_gap_px,
            completion_slack_px: config.completion_slack_px,
        }
    }

    /// Vertical space taken by the sticky header, including the gap kept
    /// between the header and the panel below it.
    pub fn header_offset(&self, surface: &dyn LayoutSurface) -> f32 {
        match surface.header_height() {
            Some(height) if height.is_finite() => height.max(0.0) + self.header_gap_px,
            _ => 0.0,
        }
    }

    /// `None` means there is nothing to track: a page without panels is
    /// inert in both modes.
    pub fn current_position(
        &self,
        layout: &LayoutIndex,
        scroll_y: f32,
        header_offset: f32,
    ) -> Option<Position> {
        if layout.is_empty() {
            return None;
        }
        let scroll_y = finite_or_zero(scroll_y);
        match self.mode {
            PositionMode::PanelIndex => {
                let y = scroll_y + finite_or_zero(header_offset) + self.slack_px;
                layout
                    .last_at_or_above(y)
                    .map(|panel| Position::PanelIndex(panel.index))
            }
            PositionMode::ScrollOffset => Some(Position::ScrollOffset(scroll_y.round() as i64)),
        }
    }

    /// Whether the viewport bottom has reached the end of the content.
    pub fn is_completed(&self, viewport: Viewport) -> bool {
        let viewport = viewport.sanitized();
        if viewport.content_height <= 0.0 {
            return false;
        }
        viewport.scroll_y + viewport.height >= viewport.content_height - self.completion_slack_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(mode: PositionMode) -> PositionTracker {
        let config = EngineConfig {
            position_mode: mode,
            ..EngineConfig::default()
        };
        PositionTracker::new(&config)
    }

    #[test]
    fn reverse_scan_selects_panel_under_header() {
        let layout = LayoutIndex::from_offsets([0.0, 100.0, 250.0, 400.0]);
        let tracker = tracker(PositionMode::PanelIndex);
        // 200 + 50 + 10 slack = 260
        assert_eq!(
            tracker.current_position(&layout, 200.0, 50.0),
            Some(Position::PanelIndex(2))
        );
    }

    #[test]
    fn position_before_first_panel_is_zero() {
        let layout = LayoutIndex::from_offsets([80.0, 300.0]);
        let tracker = tracker(PositionMode::PanelIndex);
        assert_eq!(
            tracker.current_position(&layout, 0.0, 0.0),
            Some(Position::PanelIndex(0))
        );
    }

    #[test]
    fn empty_layout_tracks_nothing_in_index_mode() {
        let tracker = tracker(PositionMode::PanelIndex);
        assert_eq!(
            tracker.current_position(&LayoutIndex::default(), 900.0, 40.0),
            None
        );
    }

    #[test]
    fn offset_mode_rounds_scroll_and_ignores_panel_tops() {
        let layout = LayoutIndex::from_offsets([0.0, 5000.0]);
        let tracker = tracker(PositionMode::ScrollOffset);
        assert_eq!(
            tracker.current_position(&layout, 1234.6, 40.0),
            Some(Position::ScrollOffset(1235))
        );
        assert_eq!(
            tracker.current_position(&layout, f32::NAN, 0.0),
            Some(Position::ScrollOffset(0))
        );
    }

    #[test]
    fn empty_layout_tracks_nothing_in_offset_mode() {
        let tracker = tracker(PositionMode::ScrollOffset);
        assert_eq!(
            tracker.current_position(&LayoutIndex::default(), 300.0, 0.0),
            None
        );
    }

    #[test]
    fn completion_uses_bottom_slack() {
        let tracker = tracker(PositionMode::PanelIndex);
        let at = |scroll_y| Viewport {
            scroll_y,
            height: 800.0,
            content_height: 5000.0,
        };
        assert!(!tracker.is_completed(at(4000.0)));
        assert!(tracker.is_completed(at(4196.0)));
        assert!(tracker.is_completed(at(4200.0)));
        assert!(!tracker.is_completed(Viewport::default()));
    }

    #[test]
    fn seeds_follow_mode() {
        assert_eq!(
            Position::from_seed(PositionMode::PanelIndex, -3),
            Position::PanelIndex(0)
        );
        assert_eq!(
            Position::from_seed(PositionMode::ScrollOffset, 640),
            Position::ScrollOffset(640)
        );
        assert_eq!(Position::PanelIndex(7).to_string(), "index=7");
    }
}
