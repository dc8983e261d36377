//! Debounced progress delivery.
//!
//! Positions arrive on every scroll settle; only the last one observed in a
//! quiet window is handed to the transport. `last_sent` is updated when a
//! delivery is initiated since the transport never reports back.

use crate::position::Position;
use crate::timer::Timer;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Name of the content identifier field on the wire.
pub const CONTENT_FIELD: &str = "episode";
pub const COMPLETED_FIELD: &str = "completed";

/// One progress update for the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub content_id: String,
    pub position: Position,
    pub completed: bool,
}

impl ProgressRecord {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (CONTENT_FIELD, self.content_id.clone()),
            (self.position.field_name(), self.position.value().to_string()),
            (COMPLETED_FIELD, self.completed.to_string()),
        ]
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert(CONTENT_FIELD.to_string(), self.content_id.clone().into());
        body.insert(
            self.position.field_name().to_string(),
            self.position.value().into(),
        );
        body.insert(COMPLETED_FIELD.to_string(), self.completed.into());
        serde_json::Value::Object(body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingDelivery {
    position: Position,
    completed: bool,
}

/// Per-session sync state. The timer is armed exactly while `pending` holds a
/// position.
#[derive(Debug)]
pub struct ProgressSync {
    content_id: String,
    debounce: Duration,
    last_sent: Option<Position>,
    pending: Option<PendingDelivery>,
    timer: Timer,
}

impl ProgressSync {
    pub fn new(content_id: impl Into<String>, debounce: Duration) -> Self {
        Self {
            content_id: content_id.into(),
            debounce,
            last_sent: None,
            pending: None,
            timer: Timer::default(),
        }
    }

    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    pub fn last_sent(&self) -> Option<Position> {
        self.last_sent
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Restart the debounce window with `position` as the value to deliver.
    pub fn notify(&mut self, position: Position, completed: bool, now: Instant) {
        let restarted = self.timer.cancel();
        self.pending = None;
        if self.last_sent == Some(position) {
            trace!(%position, restarted, "Position already delivered; window closed");
            return;
        }
        self.pending = Some(PendingDelivery {
            position,
            completed,
        });
        self.timer.arm(now, self.debounce);
        trace!(%position, completed, restarted, "Debounce window armed");
    }

    /// Deliver the pending position once the debounce window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<ProgressRecord> {
        if !self.timer.fire_if_due(now) {
            return None;
        }
        let pending = self.pending.take()?;
        self.initiate(pending)
    }

    /// Bypass the debounce window and deliver whatever is pending right away.
    pub fn flush_now(&mut self) -> Option<ProgressRecord> {
        self.timer.cancel();
        let pending = self.pending.take()?;
        self.initiate(pending)
    }

    fn initiate(&mut self, pending: PendingDelivery) -> Option<ProgressRecord> {
        if self.last_sent == Some(pending.position) {
            return None;
        }
        self.last_sent = Some(pending.position);
        debug!(
            content = %self.content_id,
            position = %pending.position,
            completed = pending.completed,
            "Initiating progress delivery"
        );
        Some(ProgressRecord {
            content_id: self.content_id.clone(),
            position: pending.position,
            completed: pending.completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(300);

    fn ms(start: Instant, offset: u64) -> Instant {
        start + Duration::from_millis(offset)
    }

    #[test]
    fn burst_within_window_delivers_only_last_position() {
        let start = Instant::now();
        let mut sync = ProgressSync::new("42", DEBOUNCE);
        for (i, at) in [0u64, 40, 90, 150, 220].into_iter().enumerate() {
            sync.notify(Position::PanelIndex(i), false, ms(start, at));
            assert_eq!(sync.poll(ms(start, at)), None);
        }

        assert_eq!(sync.poll(ms(start, 500)), None);
        let record = sync.poll(ms(start, 520)).expect("delivery after quiet window");
        assert_eq!(record.position, Position::PanelIndex(4));
        assert_eq!(sync.poll(ms(start, 2_000)), None);
        assert!(!sync.has_pending());
    }

    #[test]
    fn repeated_position_after_delivery_is_deduplicated() {
        let start = Instant::now();
        let mut sync = ProgressSync::new("42", DEBOUNCE);
        sync.notify(Position::PanelIndex(3), false, start);
        assert!(sync.poll(ms(start, 300)).is_some());

        for at in [400u64, 800, 1_200] {
            sync.notify(Position::PanelIndex(3), false, ms(start, at));
            assert!(!sync.has_pending());
            assert_eq!(sync.poll(ms(start, at + 300)), None);
        }
        assert_eq!(sync.flush_now(), None);
    }

    #[test]
    fn returning_to_sent_position_cancels_pending_change() {
        let start = Instant::now();
        let mut sync = ProgressSync::new("42", DEBOUNCE);
        sync.notify(Position::PanelIndex(1), false, start);
        assert!(sync.poll(ms(start, 300)).is_some());

        sync.notify(Position::PanelIndex(2), false, ms(start, 400));
        sync.notify(Position::PanelIndex(1), false, ms(start, 450));
        assert_eq!(sync.poll(ms(start, 1_000)), None);
        assert_eq!(sync.last_sent(), Some(Position::PanelIndex(1)));
    }

    #[test]
    fn flush_sends_pending_once_and_disarms_timer() {
        let start = Instant::now();
        let mut sync = ProgressSync::new("42", DEBOUNCE);
        sync.notify(Position::ScrollOffset(900), true, start);

        let record = sync.flush_now().expect("flush delivers pending");
        assert_eq!(record.position, Position::ScrollOffset(900));
        assert!(record.completed);
        assert_eq!(sync.next_deadline(), None);
        assert_eq!(sync.poll(ms(start, 5_000)), None);
        assert_eq!(sync.flush_now(), None);
    }

    #[test]
    fn flush_without_pending_is_noop() {
        let mut sync = ProgressSync::new("42", DEBOUNCE);
        assert_eq!(sync.flush_now(), None);
        assert_eq!(sync.last_sent(), None);
    }

    #[test]
    fn wire_fields_follow_position_representation() {
        let record = ProgressRecord {
            content_id: "17".to_string(),
            position: Position::PanelIndex(5),
            completed: false,
        };
        assert_eq!(
            record.form_fields(),
            vec![
                ("episode", "17".to_string()),
                ("index", "5".to_string()),
                ("completed", "false".to_string()),
            ]
        );

        let record = ProgressRecord {
            position: Position::ScrollOffset(2048),
            completed: true,
            ..record
        };
        assert_eq!(
            record.to_json(),
            serde_json::json!({"episode": "17", "scroll": 2048, "completed": true})
        );
    }
}
