use crate::layout::LayoutIndex;
use crate::position::Position;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

/// Bounded re-application of the resume target while images settle.
///
/// One attempt runs immediately, one per scheduled delay, and one on the
/// page load-complete signal. Nothing is retried after that.
#[derive(Debug)]
pub struct ResumeCoordinator {
    target: Position,
    retries: VecDeque<Instant>,
    awaiting_load: bool,
    attempts: usize,
}

impl ResumeCoordinator {
    pub fn new(target: Position, now: Instant, delays: &[Duration]) -> Self {
        Self {
            target,
            retries: delays.iter().map(|delay| now + *delay).collect(),
            awaiting_load: true,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.retries.front().copied()
    }

    pub fn is_finished(&self) -> bool {
        self.retries.is_empty() && !self.awaiting_load
    }

    /// Consume every retry that is due; `true` when an attempt should run.
    /// Retries that came due together collapse into a single attempt.
    pub fn take_due(&mut self, now: Instant) -> bool {
        let mut due = false;
        while self.retries.front().is_some_and(|deadline| *deadline <= now) {
            self.retries.pop_front();
            due = true;
        }
        due
    }

    /// `true` the first time the load-complete signal is observed.
    pub fn take_load_complete(&mut self) -> bool {
        std::mem::replace(&mut self.awaiting_load, false)
    }

    /// Compute the scroll offset for the target against a fresh snapshot.
    pub fn attempt(&mut self, layout: &LayoutIndex, header_offset: f32) -> Option<f32> {
        self.attempts += 1;
        let y = scroll_target(self.target, layout, header_offset);
        debug!(
            resume_target = %self.target,
            attempt = self.attempts,
            panels = layout.len(),
            ?y,
            "Resume attempt"
        );
        y
    }
}

/// Offset that puts the panel for `target` just below the header. `None` for
/// an empty layout.
pub fn scroll_target(target: Position, layout: &LayoutIndex, header_offset: f32) -> Option<f32> {
    let panel = match target {
        Position::PanelIndex(idx) => {
            let clamped = layout.clamp_index(idx)?;
            if clamped != idx {
                debug!(
                    requested = idx,
                    clamped,
                    "Resume target past last panel; clamping"
                );
            }
            layout.get(clamped)?
        }
        Position::ScrollOffset(px) => layout.nearest_to(px as f32)?,
    };
    Some((panel.top_offset - header_offset).max(0.0))
}
