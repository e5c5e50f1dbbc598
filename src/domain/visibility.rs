use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
struct VisibilityInner {
    enabled: bool,
    editing: bool,
    showing: bool,
    last_touch: Instant,
}

/// Idle auto-hide state, shared between the touch path and the idle timer.
#[derive(Debug)]
pub struct Visibility {
    timeout: Duration,
    inner: Mutex<VisibilityInner>,
}

impl Visibility {
    pub fn new(timeout: Duration, now: Instant) -> Self {
        Self {
            timeout,
            inner: Mutex::new(VisibilityInner {
                enabled: false,
                editing: false,
                showing: true,
                last_touch: now,
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_showing(&self) -> bool {
        self.lock().showing
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.lock().enabled = enabled;
    }

    pub fn set_editing(&self, editing: bool) {
        self.lock().editing = editing;
    }

    /// Restarts the countdown. Returns `true` if the overlay was hidden and
    /// has to be redrawn.
    pub fn touch(&self, now: Instant) -> bool {
        let mut inner = self.lock();
        inner.last_touch = now;
        let was_hidden = !inner.showing;
        inner.showing = true;
        was_hidden
    }

    /// One idle-timer tick. Returns `true` if the overlay just got hidden.
    pub fn tick(&self, now: Instant) -> bool {
        let mut inner = self.lock();
        if !inner.enabled || !inner.showing || inner.editing {
            return false;
        }
        if now.saturating_duration_since(inner.last_touch) < self.timeout {
            return false;
        }
        inner.showing = false;
        log::debug!("overlay hidden after {:?} without input", self.timeout);
        true
    }

    fn lock(&self) -> MutexGuard<'_, VisibilityInner> {
        // Plain flags: still consistent after a poisoning panic.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
