use std::time::Duration;

/// Latest-wins resize debouncer with a single pending timer.
///
/// Every request restarts the quiet period; only the most recent size is
/// delivered once `delay` has elapsed without a newer request. Time is a
/// host timestamp (elapsed since any fixed origin) passed in by the caller.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    pending: Option<PendingResize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingResize {
    width: f32,
    height: f32,
    due: Duration,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Records a container size, replacing any pending one.
    pub fn request(&mut self, width: f32, height: f32, now: Duration) {
        if self.pending.is_some() {
            tracing::trace!(width, height, "resize superseded pending request");
        }
        self.pending = Some(PendingResize {
            width,
            height,
            due: now.saturating_add(self.delay),
        });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Timestamp at which the pending resize fires, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.map(|pending| pending.due)
    }

    /// Takes the pending size once its quiet period is over.
    pub fn poll(&mut self, now: Duration) -> Option<(f32, f32)> {
        let pending = self.pending?;
        if now < pending.due {
            return None;
        }
        self.pending = None;
        Some((pending.width, pending.height))
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(250);

    #[test]
    fn fires_only_after_quiet_period() {
        let start = Duration::from_secs(10);
        let mut debouncer = ResizeDebouncer::new(DELAY);
        debouncer.request(800.0, 600.0, start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(249)), None);
        assert_eq!(debouncer.poll(start + DELAY), Some((800.0, 600.0)));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + DELAY * 4), None);
    }

    #[test]
    fn newer_request_restarts_timer_and_wins() {
        let start = Duration::from_secs(10);
        let mut debouncer = ResizeDebouncer::new(DELAY);
        debouncer.request(800.0, 600.0, start);
        let later = start + Duration::from_millis(200);
        debouncer.request(1024.0, 700.0, later);
        assert_eq!(debouncer.poll(start + DELAY), None);
        assert_eq!(debouncer.deadline(), Some(later + DELAY));
        assert_eq!(debouncer.poll(later + DELAY), Some((1024.0, 700.0)));
    }

    #[test]
    fn far_future_request_saturates() {
        let mut debouncer = ResizeDebouncer::new(DELAY);
        debouncer.request(800.0, 600.0, Duration::MAX);
        assert_eq!(debouncer.deadline(), Some(Duration::MAX));
        assert_eq!(debouncer.poll(Duration::MAX), Some((800.0, 600.0)));
    }

    #[test]
    fn cancel_drops_pending_size() {
        let start = Duration::from_secs(10);
        let mut debouncer = ResizeDebouncer::new(DELAY);
        debouncer.request(800.0, 600.0, start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + DELAY), None);
    }
}
