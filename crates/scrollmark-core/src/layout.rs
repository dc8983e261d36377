//! Panel geometry snapshots.
//!
//! Panel offsets move whenever an image finishes decoding, so nothing here is
//! cached: every consumer takes a fresh [`LayoutIndex`] from the
//! [`LayoutSurface`] right before it needs geometry.

/// Read-only view of the host page geometry.
pub trait LayoutSurface {
    /// Top offsets of every panel, in document order, relative to the top of
    /// the scrollable area.
    fn panel_offsets(&self) -> Vec<f32>;

    /// Height of the sticky header, or `None` when the page has no header.
    fn header_height(&self) -> Option<f32>;

    fn viewport(&self) -> Viewport;
}

/// Viewport metrics in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub scroll_y: f32,
    pub height: f32,
    pub content_height: f32,
}

impl Viewport {
    pub fn sanitized(self) -> Self {
        Viewport {
            scroll_y: finite_or_zero(self.scroll_y),
            height: finite_or_zero(self.height).max(0.0),
            content_height: finite_or_zero(self.content_height).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    pub index: usize,
    pub top_offset: f32,
}

/// Ordered panel snapshot captured at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutIndex {
    panels: Vec<Panel>,
}

impl LayoutIndex {
    pub fn snapshot(surface: &dyn LayoutSurface) -> Self {
        Self::from_offsets(surface.panel_offsets())
    }

    pub fn from_offsets(offsets: impl IntoIterator<Item = f32>) -> Self {
        let panels = offsets
            .into_iter()
            .enumerate()
            .map(|(index, top)| Panel {
                index,
                top_offset: finite_or_zero(top),
            })
            .collect();
        Self { panels }
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn get(&self, index: usize) -> Option<Panel> {
        self.panels.get(index).copied()
    }

    /// Clamp `index` to the last valid panel. `None` for an empty layout.
    pub fn clamp_index(&self, index: usize) -> Option<usize> {
        if self.panels.is_empty() {
            None
        } else {
            Some(index.min(self.panels.len() - 1))
        }
    }

    /// Last panel (by document order) whose top edge is at or above `y`.
    ///
    /// Falls back to the first panel when every top is below `y`; identical
    /// offsets resolve to the later panel.
    pub fn last_at_or_above(&self, y: f32) -> Option<Panel> {
        self.panels
            .iter()
            .rev()
            .find(|panel| panel.top_offset <= y)
            .or_else(|| self.panels.first())
            .copied()
    }

    /// Panel whose top edge is closest to `y`; the earlier panel wins ties.
    pub fn nearest_to(&self, y: f32) -> Option<Panel> {
        let mut best: Option<(f32, Panel)> = None;
        for panel in &self.panels {
            let distance = (panel.top_offset - y).abs();
            match best {
                Some((best_distance, _)) if best_distance <= distance => {}
                _ => best = Some((distance, *panel)),
            }
        }
        best.map(|(_, panel)| panel)
    }
}

pub(crate) fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}
