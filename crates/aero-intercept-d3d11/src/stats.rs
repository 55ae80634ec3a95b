use std::sync::atomic::{AtomicU64, Ordering};

/// Per-context counters. Cheap to bump on the calling thread, readable from anywhere.
#[derive(Debug, Default)]
pub struct ContextStats {
    interface_upgrades: AtomicU64,
    suppressed_calls: AtomicU64,
    render_passes_begun: AtomicU64,
    render_passes_finished: AtomicU64,
    command_lists_recorded: AtomicU64,
    command_lists_executed: AtomicU64,
}

impl ContextStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_interface_upgrades(&self) {
        self.interface_upgrades.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_suppressed_calls(&self) {
        self.suppressed_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_render_passes_begun(&self) {
        self.render_passes_begun.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_render_passes_finished(&self) {
        self.render_passes_finished.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_command_lists_recorded(&self) {
        self.command_lists_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_command_lists_executed(&self) {
        self.command_lists_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ContextStatsSnapshot {
        ContextStatsSnapshot {
            interface_upgrades: self.interface_upgrades.load(Ordering::Relaxed),
            suppressed_calls: self.suppressed_calls.load(Ordering::Relaxed),
            render_passes_begun: self.render_passes_begun.load(Ordering::Relaxed),
            render_passes_finished: self.render_passes_finished.load(Ordering::Relaxed),
            command_lists_recorded: self.command_lists_recorded.load(Ordering::Relaxed),
            command_lists_executed: self.command_lists_executed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextStatsSnapshot {
    pub interface_upgrades: u64,
    pub suppressed_calls: u64,
    pub render_passes_begun: u64,
    pub render_passes_finished: u64,
    pub command_lists_recorded: u64,
    pub command_lists_executed: u64,
}
