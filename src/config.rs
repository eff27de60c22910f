//! Configuration types.

use std::time::Duration;

/// Flow configuration.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Attempts per touchpoint call (one initial try plus retries).
    pub touchpoint_attempts: u32,
    /// Per-attempt deadline; the in-flight request is cancelled when it
    /// elapses.
    pub touchpoint_deadline: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            touchpoint_attempts: 3,
            touchpoint_deadline: Duration::from_secs(10),
        }
    }
}
