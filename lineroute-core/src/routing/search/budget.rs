use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Deadline and cancellation checked on every search iteration.
///
/// An unreachable destination makes a search exhaust its whole component
/// before failing; the budget bounds that work.
#[derive(Debug, Clone, Default)]
pub struct SearchBudget {
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
}

// The deadline is only compared every this many iterations
const CLOCK_CHECK_INTERVAL: usize = 64;

impl SearchBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            cancel: None,
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: None,
        }
    }

    /// Attaches a flag another thread can set to abort the query
    #[must_use]
    pub fn cancel_on(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Called once per main-loop iteration
    pub(crate) fn interrupted(&self, iteration: usize) -> bool {
        if self.is_cancelled() {
            return true;
        }
        iteration % CLOCK_CHECK_INTERVAL == 0 && self.is_expired()
    }
}
