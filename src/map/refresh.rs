use std::time::{Duration, Instant};

/// Repaint flow control.
///
/// Requests arriving while a repaint is already scheduled are coalesced
/// into that one repaint. Nothing fires while frozen; unfreezing schedules
/// a repaint of whatever was requested in between.
#[derive(Debug, Clone)]
pub struct RefreshControl {
    interval: Duration,
    deadline: Option<Instant>,
    /// Requests folded into the scheduled repaint
    pending: u32,
    dirty: bool,
    forced: bool,
    frozen: bool,
    painting: bool,
}

impl RefreshControl {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
            pending: 0,
            dirty: false,
            forced: false,
            frozen: false,
            painting: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Schedule a repaint one interval from `now`, unless one is pending
    pub fn request(&mut self, now: Instant) {
        self.pending += 1;
        if self.deadline.is_none() {
            self.deadline = Some(now + self.interval);
        } else {
            log::trace!("repaint request coalesced ({} pending)", self.pending);
        }
    }

    /// The map data or camera changed; `refresh` will repaint
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Repaint on the next `refresh` even when nothing is dirty
    pub fn force(&mut self) {
        self.forced = true;
    }

    /// Request a repaint if anything is dirty or forced. Returns true when
    /// a repaint was requested.
    pub fn refresh(&mut self, now: Instant) -> bool {
        if self.frozen || !(self.dirty || self.forced) {
            return false;
        }
        self.request(now);
        true
    }

    pub fn freeze(&mut self) {
        if !self.frozen {
            log::debug!("display frozen");
        }
        self.frozen = true;
    }

    pub fn unfreeze(&mut self, now: Instant) {
        if self.frozen {
            log::debug!("display unfrozen");
        }
        self.frozen = false;
        self.dirty = true;
        self.request(now);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// True once when the scheduled repaint is due. Clears the schedule
    /// and the dirty state.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.frozen {
            return false;
        }
        match self.deadline {
            Some(deadline) if now >= deadline => {
                if self.pending > 1 {
                    log::trace!("{} repaint requests served by one repaint", self.pending);
                }
                self.deadline = None;
                self.pending = 0;
                self.dirty = false;
                self.forced = false;
                true
            }
            _ => false,
        }
    }

    /// How long the event loop may sleep before the next repaint is due
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        if self.frozen {
            return None;
        }
        self.deadline.map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Enter a repaint. Returns false if one is already running.
    pub fn begin(&mut self) -> bool {
        if self.painting {
            log::warn!("repaint re-entered, ignored");
            return false;
        }
        self.painting = true;
        true
    }

    pub fn end(&mut self) {
        self.painting = false;
    }

    pub fn is_painting(&self) -> bool {
        self.painting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(50);

    #[test]
    fn test_requests_coalesce() {
        let t0 = Instant::now();
        let mut refresh = RefreshControl::new(INTERVAL);
        refresh.request(t0);
        refresh.request(t0 + Duration::from_millis(10));
        refresh.request(t0 + Duration::from_millis(40));

        assert!(!refresh.take_due(t0 + Duration::from_millis(49)));
        assert!(refresh.take_due(t0 + INTERVAL));
        assert!(!refresh.take_due(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn test_refresh_needs_dirty_or_forced() {
        let t0 = Instant::now();
        let mut refresh = RefreshControl::new(INTERVAL);
        assert!(!refresh.refresh(t0));

        refresh.mark_dirty();
        assert!(refresh.refresh(t0));
        assert!(refresh.take_due(t0 + INTERVAL));
        assert!(!refresh.refresh(t0 + INTERVAL));

        refresh.force();
        assert!(refresh.refresh(t0 + INTERVAL));
    }

    #[test]
    fn test_frozen_never_fires() {
        let t0 = Instant::now();
        let mut refresh = RefreshControl::new(INTERVAL);
        refresh.request(t0);
        refresh.freeze();
        refresh.mark_dirty();
        assert!(!refresh.refresh(t0));
        assert!(!refresh.take_due(t0 + Duration::from_secs(1)));
        assert_eq!(refresh.time_until_due(t0), None);

        let t1 = t0 + Duration::from_secs(2);
        refresh.unfreeze(t1);
        // the deadline scheduled before freezing is still pending
        assert!(refresh.take_due(t1));
        assert!(!refresh.take_due(t1 + INTERVAL));
    }

    #[test]
    fn test_unfreeze_requests_repaint() {
        let t0 = Instant::now();
        let mut refresh = RefreshControl::new(INTERVAL);
        refresh.freeze();
        refresh.unfreeze(t0);
        assert_eq!(refresh.time_until_due(t0), Some(INTERVAL));
        assert!(refresh.take_due(t0 + INTERVAL));
    }

    #[test]
    fn test_reentry_guard() {
        let mut refresh = RefreshControl::new(INTERVAL);
        assert!(refresh.begin());
        assert!(!refresh.begin());
        refresh.end();
        assert!(refresh.begin());
    }
}
