//! Point-in-time view of preload counters.

use std::fmt;

/// Copy of [`PreloadMetrics`](crate::telemetry::PreloadMetrics) at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total preload calls.
    pub requests: u64,
    /// Calls rejected for an empty key.
    pub rejected: u64,
    /// Calls that found no surface for their asset kind.
    pub unavailable: u64,
    /// Calls satisfied by the backend.
    pub cache_hits: u64,
    /// Calls that joined an in-flight load.
    pub joined: u64,
    /// Underlying loads launched.
    pub loads_started: u64,
    /// Underlying loads that succeeded.
    pub loads_succeeded: u64,
    /// Underlying loads that failed.
    pub loads_failed: u64,
}

impl MetricsSnapshot {
    /// Loads launched but not yet settled.
    pub fn loads_pending(&self) -> u64 {
        self.loads_started
            .saturating_sub(self.loads_succeeded + self.loads_failed)
    }

    /// Fraction of accepted requests that avoided a new load.
    pub fn dedup_ratio(&self) -> f64 {
        let accepted = self.cache_hits + self.joined + self.loads_started;
        if accepted == 0 {
            return 0.0;
        }
        (self.cache_hits + self.joined) as f64 / accepted as f64
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requests: {} hits, {} joined, {} loaded, {} failed, {} pending, {} rejected, {} unavailable",
            self.requests,
            self.cache_hits,
            self.joined,
            self.loads_succeeded,
            self.loads_failed,
            self.loads_pending(),
            self.rejected,
            self.unavailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_pending() {
        let snapshot = MetricsSnapshot {
            loads_started: 5,
            loads_succeeded: 2,
            loads_failed: 1,
            ..Default::default()
        };
        assert_eq!(snapshot.loads_pending(), 2);
    }

    #[test]
    fn test_dedup_ratio() {
        let snapshot = MetricsSnapshot {
            cache_hits: 1,
            joined: 2,
            loads_started: 1,
            ..Default::default()
        };
        assert!((snapshot.dedup_ratio() - 0.75).abs() < f64::EPSILON);
        assert_eq!(MetricsSnapshot::default().dedup_ratio(), 0.0);
    }

    #[test]
    fn test_display() {
        let snapshot = MetricsSnapshot {
            requests: 3,
            cache_hits: 1,
            joined: 1,
            loads_started: 1,
            loads_succeeded: 1,
            ..Default::default()
        };
        let display = snapshot.to_string();
        assert!(display.starts_with("3 requests"));
        assert!(display.contains("1 hits"));
        assert!(display.contains("0 pending"));
    }
}
