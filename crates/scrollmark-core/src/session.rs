//! Reader session: one per opened content view.
//!
//! The session owns every piece of mutable tracking state and reduces host
//! events into [`Effect`]s. It never touches the page or the network itself;
//! [`crate::runtime::ReaderRuntime`] executes the effects.

use crate::config::EngineConfig;
use crate::gesture::click_scroll_delta;
use crate::layout::{LayoutIndex, LayoutSurface};
use crate::position::{Position, PositionTracker};
use crate::resume::ResumeCoordinator;
use crate::sync::{ProgressRecord, ProgressSync};
use std::time::Instant;
use tracing::{debug, info, trace};

/// Host events the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReaderEvent {
    Scrolled,
    VisibilityHidden,
    LoadComplete,
    Teardown,
    Click { client_y: f32 },
    /// A previously reported deadline has been reached.
    Tick,
}

impl ReaderEvent {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Scrolled => "scroll",
            Self::VisibilityHidden => "visibility_hidden",
            Self::LoadComplete => "load_complete",
            Self::Teardown => "teardown",
            Self::Click { .. } => "click",
            Self::Tick => "tick",
        }
    }
}

/// Describes work that must be performed outside the pure reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ScrollTo(f32),
    ScrollBy(f32),
    Deliver(ProgressRecord),
}

#[derive(Debug)]
pub struct ReaderSession {
    config: EngineConfig,
    tracker: PositionTracker,
    sync: ProgressSync,
    resume: ResumeCoordinator,
    closed: bool,
}

impl ReaderSession {
    /// Start a session and run the immediate resume attempt.
    pub fn open(
        config: EngineConfig,
        content_id: impl Into<String>,
        seed: i64,
        surface: &dyn LayoutSurface,
        now: Instant,
    ) -> (Self, Vec<Effect>) {
        let config = config.sanitized();
        let tracker = PositionTracker::new(&config);
        let target = Position::from_seed(config.position_mode, seed);
        let resume = ResumeCoordinator::new(target, now, &config.resume_retry_delays());
        let sync = ProgressSync::new(content_id, config.debounce());
        info!(
            content = %sync.content_id(),
            mode = %config.position_mode,
            resume_target = %target,
            "Opened reader session"
        );

        let mut session = Self {
            config,
            tracker,
            sync,
            resume,
            closed: false,
        };
        let mut effects = Vec::new();
        session.restore(surface, &mut effects);
        (session, effects)
    }

    pub fn reduce(
        &mut self,
        event: ReaderEvent,
        surface: &dyn LayoutSurface,
        now: Instant,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.closed {
            trace!(action = event.action(), "Session closed; ignoring event");
            return effects;
        }
        match event {
            ReaderEvent::Scrolled => self.observe(surface, now),
            ReaderEvent::VisibilityHidden => {
                self.observe(surface, now);
                self.flush(&mut effects);
            }
            ReaderEvent::LoadComplete => {
                if self.resume.take_load_complete() {
                    self.restore(surface, &mut effects);
                }
            }
            ReaderEvent::Teardown => {
                self.observe(surface, now);
                self.flush(&mut effects);
                self.closed = true;
                info!(content = %self.sync.content_id(), "Reader session torn down");
            }
            ReaderEvent::Click { client_y } => {
                let delta = click_scroll_delta(client_y, surface.viewport().sanitized().height);
                if delta != 0.0 {
                    effects.push(Effect::ScrollBy(delta));
                }
            }
            ReaderEvent::Tick => {
                if self.resume.take_due(now) {
                    self.restore(surface, &mut effects);
                }
                if let Some(record) = self.sync.poll(now) {
                    effects.push(Effect::Deliver(record));
                }
            }
        }
        effects
    }

    /// Earliest instant at which the host must send [`ReaderEvent::Tick`].
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.closed {
            return None;
        }
        match (self.resume.next_deadline(), self.sync.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn current_position(&self, surface: &dyn LayoutSurface) -> Option<Position> {
        let layout = LayoutIndex::snapshot(surface);
        let viewport = surface.viewport().sanitized();
        self.tracker
            .current_position(&layout, viewport.scroll_y, self.tracker.header_offset(surface))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sync(&self) -> &ProgressSync {
        &self.sync
    }

    pub fn resume(&self) -> &ResumeCoordinator {
        &self.resume
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn observe(&mut self, surface: &dyn LayoutSurface, now: Instant) {
        let Some(position) = self.current_position(surface) else {
            trace!("No panels to track");
            return;
        };
        let completed = self.tracker.is_completed(surface.viewport());
        self.sync.notify(position, completed, now);
    }

    fn flush(&mut self, effects: &mut Vec<Effect>) {
        if let Some(record) = self.sync.flush_now() {
            effects.push(Effect::Deliver(record));
        }
    }

    fn restore(&mut self, surface: &dyn LayoutSurface, effects: &mut Vec<Effect>) {
        let layout = LayoutIndex::snapshot(surface);
        let header_offset = self.tracker.header_offset(surface);
        match self.resume.attempt(&layout, header_offset) {
            Some(y) => effects.push(Effect::ScrollTo(y)),
            None => debug!("Nothing to restore on an empty layout"),
        }
    }
}
