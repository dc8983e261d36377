//! Simulated reader page and the replay loop that drives a session through a
//! script on a virtual clock.

use crate::script::{ScriptAction, SessionScript};
use scrollmark_core::{
    EngineConfig, LayoutSurface, Position, ProgressTransport, ReaderEvent, ReaderRuntime,
    Viewport, ViewportControl,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Panels stacked vertically below an optional sticky header.
#[derive(Debug, Clone)]
pub struct SimulatedPage {
    panel_heights: Vec<f32>,
    header_height: Option<f32>,
    viewport_height: f32,
    scroll_y: f32,
}

impl SimulatedPage {
    pub fn from_script(script: &SessionScript) -> Self {
        Self {
            panel_heights: script.panel_heights.clone(),
            header_height: script.header_height,
            viewport_height: script.viewport_height,
            scroll_y: 0.0,
        }
    }

    pub fn resize_panel(&mut self, panel: usize, height: f32) -> bool {
        match self.panel_heights.get_mut(panel) {
            Some(slot) if height.is_finite() && height >= 0.0 => {
                *slot = height;
                self.scroll_y = self.scroll_y.min(self.max_scroll());
                true
            }
            _ => false,
        }
    }

    fn content_height(&self) -> f32 {
        self.header_height.unwrap_or(0.0) + self.panel_heights.iter().sum::<f32>()
    }

    fn max_scroll(&self) -> f32 {
        (self.content_height() - self.viewport_height).max(0.0)
    }
}

impl LayoutSurface for SimulatedPage {
    fn panel_offsets(&self) -> Vec<f32> {
        let mut top = self.header_height.unwrap_or(0.0);
        self.panel_heights
            .iter()
            .map(|height| {
                let offset = top;
                top += height;
                offset
            })
            .collect()
    }

    fn header_height(&self) -> Option<f32> {
        self.header_height
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            scroll_y: self.scroll_y,
            height: self.viewport_height,
            content_height: self.content_height(),
        }
    }
}

impl ViewportControl for SimulatedPage {
    fn scroll_to(&mut self, y: f32) {
        let y = if y.is_finite() { y } else { 0.0 };
        self.scroll_y = y.clamp(0.0, self.max_scroll());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub final_scroll_y: f32,
    pub final_position: Option<Position>,
    pub last_sent: Option<Position>,
    pub resume_attempts: usize,
}

/// Replay `script` against a fresh session, firing timers at their exact
/// deadlines between scripted events.
pub fn replay<T: ProgressTransport>(
    script: &SessionScript,
    config: EngineConfig,
    transport: T,
) -> ReplaySummary {
    let origin = Instant::now();
    let at = |ms: u64| origin + Duration::from_millis(ms);
    let page = SimulatedPage::from_script(script);
    let mut runtime = ReaderRuntime::start(
        config,
        script.content_id.clone(),
        script.seed,
        page,
        transport,
        origin,
    );

    for step in &script.steps {
        let now = at(step.at_ms);
        run_timers_until(&mut runtime, now);
        if runtime.session().is_closed() {
            warn!(at_ms = step.at_ms, "Event after teardown ignored");
            continue;
        }
        debug!(at_ms = step.at_ms, action = ?step.action, "Replaying step");
        match step.action {
            ScriptAction::Scroll { y } => {
                runtime.host_mut().scroll_to(y);
                runtime.dispatch(ReaderEvent::Scrolled, now);
            }
            ScriptAction::ResizePanel { panel, height } => {
                if !runtime.host_mut().resize_panel(panel, height) {
                    warn!(panel, height, "Ignoring resize of unknown panel");
                }
            }
            ScriptAction::Load => runtime.dispatch(ReaderEvent::LoadComplete, now),
            ScriptAction::Click { client_y } => {
                runtime.dispatch(ReaderEvent::Click { client_y }, now)
            }
            ScriptAction::Hidden => runtime.dispatch(ReaderEvent::VisibilityHidden, now),
            ScriptAction::Teardown => runtime.dispatch(ReaderEvent::Teardown, now),
        }
    }

    if !runtime.session().is_closed() {
        let mut end = at(script.steps.last().map_or(0, |step| step.at_ms));
        while let Some(deadline) = runtime.session().next_deadline() {
            end = end.max(deadline);
            runtime.tick(deadline);
        }
        runtime.dispatch(ReaderEvent::Teardown, end);
    }

    let summary = ReplaySummary {
        final_scroll_y: runtime.host().viewport().scroll_y,
        final_position: runtime.session().current_position(runtime.host()),
        last_sent: runtime.session().sync().last_sent(),
        resume_attempts: runtime.session().resume().attempts(),
    };
    info!(
        content = %script.content_id,
        final_scroll_y = summary.final_scroll_y,
        final_position = ?summary.final_position,
        last_sent = ?summary.last_sent,
        resume_attempts = summary.resume_attempts,
        "Replay finished"
    );
    summary
}

fn run_timers_until<H, T>(runtime: &mut ReaderRuntime<H, T>, until: Instant)
where
    H: ViewportControl,
    T: ProgressTransport,
{
    while let Some(deadline) = runtime.session().next_deadline() {
        if deadline > until {
            break;
        }
        runtime.tick(deadline);
    }
}
