use std::time::{Duration, Instant};

use crate::error::Result;

pub const DEFAULT_CLEAR_AFTER: Duration = Duration::from_secs(10);

pub trait HealthProbe: Send + Sync {
    fn probe(&self) -> Result<()>;
    fn backend_name(&self) -> &'static str;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HealthStatus {
    #[default]
    Idle,
    Checking,
    Success,
    Error,
}

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Idle => "-",
            HealthStatus::Checking => "checking",
            HealthStatus::Success => "ok",
            HealthStatus::Error => "error",
        }
    }
}

/// Cosmetic probe result; a settled outcome fades back to `Idle`.
#[derive(Clone, Debug)]
pub struct HealthIndicator {
    state: HealthStatus,
    settled_at: Option<Instant>,
    clear_after: Duration,
}

impl Default for HealthIndicator {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAR_AFTER)
    }
}

impl HealthIndicator {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            state: HealthStatus::Idle,
            settled_at: None,
            clear_after,
        }
    }

    pub fn clear_after(&self) -> Duration {
        self.clear_after
    }

    /// Returns false when a check is already running.
    pub fn begin(&mut self) -> bool {
        if self.state == HealthStatus::Checking {
            return false;
        }
        self.state = HealthStatus::Checking;
        self.settled_at = None;
        true
    }

    pub fn finish(&mut self, healthy: bool, now: Instant) {
        self.state = if healthy {
            HealthStatus::Success
        } else {
            HealthStatus::Error
        };
        self.settled_at = Some(now);
    }

    pub fn status(&self, now: Instant) -> HealthStatus {
        match (self.state, self.settled_at) {
            (HealthStatus::Success | HealthStatus::Error, Some(settled))
                if now.saturating_duration_since(settled) >= self.clear_after =>
            {
                HealthStatus::Idle
            }
            (state, _) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HealthIndicator, HealthStatus};
    use std::time::{Duration, Instant};

    #[test]
    fn settled_status_clears_after_window() {
        let mut indicator = HealthIndicator::new(Duration::from_secs(10));
        let start = Instant::now();

        assert!(indicator.begin());
        assert_eq!(indicator.status(start), HealthStatus::Checking);

        indicator.finish(true, start);
        assert_eq!(
            indicator.status(start + Duration::from_secs(9)),
            HealthStatus::Success
        );
        assert_eq!(
            indicator.status(start + Duration::from_secs(10)),
            HealthStatus::Idle
        );
    }

    #[test]
    fn checking_never_expires() {
        let mut indicator = HealthIndicator::new(Duration::from_millis(1));
        let start = Instant::now();
        indicator.begin();

        assert_eq!(
            indicator.status(start + Duration::from_secs(60)),
            HealthStatus::Checking
        );
        assert!(!indicator.begin());
    }

    #[test]
    fn failure_is_reported_then_cleared() {
        let mut indicator = HealthIndicator::default();
        let start = Instant::now();
        indicator.begin();
        indicator.finish(false, start);

        assert_eq!(indicator.status(start), HealthStatus::Error);
        assert_eq!(
            indicator.status(start + indicator.clear_after()),
            HealthStatus::Idle
        );
        assert!(indicator.begin());
    }
}
