use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks whether a render pass was opened by a render-target bind and not yet closed.
#[derive(Debug, Default)]
pub struct RenderPassTracker {
    open: AtomicBool,
}

impl RenderPassTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::Release);
    }

    /// Closes the pass. Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        self.open.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_reports_each_open_pass_once() {
        let tracker = RenderPassTracker::new();
        assert!(!tracker.close());
        tracker.open();
        tracker.open();
        assert!(tracker.is_open());
        assert!(tracker.close());
        assert!(!tracker.close());
    }
}
