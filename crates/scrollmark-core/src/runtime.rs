use crate::config::EngineConfig;
use crate::layout::LayoutSurface;
use crate::session::{Effect, ReaderEvent, ReaderSession};
use crate::transport::ProgressTransport;
use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Instant;
use tracing::{debug, trace};

/// Mutable side of the host page.
pub trait ViewportControl: LayoutSurface {
    fn scroll_to(&mut self, y: f32);

    fn scroll_by(&mut self, dy: f32) {
        let y = self.viewport().sanitized().scroll_y + dy;
        self.scroll_to(y);
    }
}

/// Executes session effects against a host and a transport.
///
/// Programmatic scrolls are fed back as [`ReaderEvent::Scrolled`], the same
/// way a page reports them, so resume jumps and click jumps are tracked like
/// any other scroll.
pub struct ReaderRuntime<H, T> {
    session: ReaderSession,
    host: H,
    transport: T,
    queue: VecDeque<ReaderEvent>,
}

impl<H: ViewportControl, T: ProgressTransport> ReaderRuntime<H, T> {
    pub fn start(
        config: EngineConfig,
        content_id: impl Into<String>,
        seed: i64,
        host: H,
        transport: T,
        now: Instant,
    ) -> Self {
        let (session, effects) = ReaderSession::open(config, content_id, seed, &host, now);
        let mut runtime = Self {
            session,
            host,
            transport,
            queue: VecDeque::new(),
        };
        runtime.run_effects(effects);
        runtime.drain(now);
        runtime
    }

    pub fn dispatch(&mut self, event: ReaderEvent, now: Instant) {
        self.queue.push_back(event);
        self.drain(now);
    }

    /// Fire timers whose deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self
            .session
            .next_deadline()
            .is_some_and(|deadline| deadline <= now)
        {
            self.dispatch(ReaderEvent::Tick, now);
        }
    }

    /// Block on host events until the session is torn down. Deadlines are
    /// honored through `recv_timeout`; a disconnected channel counts as
    /// teardown.
    pub fn drive(&mut self, events: &Receiver<ReaderEvent>) {
        while !self.session.is_closed() {
            let received = match self.session.next_deadline() {
                Some(deadline) => {
                    events.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => events.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(event) => self.dispatch(event, Instant::now()),
                Err(RecvTimeoutError::Timeout) => self.dispatch(ReaderEvent::Tick, Instant::now()),
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("Host event source closed; tearing down");
                    self.dispatch(ReaderEvent::Teardown, Instant::now());
                }
            }
        }
    }

    pub fn session(&self) -> &ReaderSession {
        &self.session
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn drain(&mut self, now: Instant) {
        while let Some(event) = self.queue.pop_front() {
            trace!(action = event.action(), "Reducing host event");
            let effects = self.session.reduce(event, &self.host, now);
            self.run_effects(effects);
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ScrollTo(y) => self.scroll_with(|host| host.scroll_to(y)),
            Effect::ScrollBy(dy) => self.scroll_with(|host| host.scroll_by(dy)),
            Effect::Deliver(record) => self.transport.dispatch(record),
        }
    }

    fn scroll_with(&mut self, apply: impl FnOnce(&mut H)) {
        let before = self.host.viewport().scroll_y;
        apply(&mut self.host);
        let after = self.host.viewport().scroll_y;
        if (after - before).abs() > f32::EPSILON {
            self.queue.push_back(ReaderEvent::Scrolled);
        }
    }
}
