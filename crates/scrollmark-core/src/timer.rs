use std::time::{Duration, Instant};

/// Single cancelable deadline. Arming replaces any previous deadline, so at
/// most one callback is ever outstanding per timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm and report `true` if the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rearming_replaces_deadline() {
        let start = Instant::now();
        let mut timer = Timer::default();
        timer.arm(start, Duration::from_millis(300));
        timer.arm(start + Duration::from_millis(100), Duration::from_millis(300));

        assert!(!timer.fire_if_due(start + Duration::from_millis(350)));
        assert!(timer.fire_if_due(start + Duration::from_millis(400)));
        assert!(!timer.is_armed());
        assert!(!timer.fire_if_due(start + Duration::from_millis(900)));
    }

    #[test]
    fn cancel_reports_whether_armed() {
        let mut timer = Timer::default();
        assert!(!timer.cancel());
        timer.arm(Instant::now(), Duration::from_millis(5));
        assert!(timer.cancel());
        assert_eq!(timer.deadline(), None);
    }
}
