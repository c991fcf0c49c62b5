//! Aggregate intent parameters.
//!
//! Callers may pass `max_parallel`, `timeout_sec` and `limit`; absent values
//! take the defaults here and present ones are clamped.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateParams {
    pub max_parallel: usize,
    pub timeout: Duration,
    /// Upper clamp for caller-supplied timeouts.
    pub max_timeout: Duration,
    pub limit: usize,
}

impl Default for AggregateParams {
    fn default() -> Self {
        Self {
            max_parallel: 2,
            timeout: Duration::from_secs(5),
            max_timeout: Duration::from_secs(30),
            limit: 20,
        }
    }
}

impl AggregateParams {
    /// Clamp a requested parallelism to `[1, tasks]`.
    pub fn parallelism(&self, requested: Option<i64>, tasks: usize) -> usize {
        let wanted = match requested {
            Some(n) if n > 0 => n as usize,
            Some(_) => 1,
            None => self.max_parallel,
        };
        wanted.clamp(1, tasks.max(1))
    }

    /// Non-positive requests fall back to the default; large ones are capped.
    pub fn deadline(&self, requested_sec: Option<i64>) -> Duration {
        match requested_sec {
            Some(sec) if sec > 0 => Duration::from_secs(sec as u64).min(self.max_timeout),
            _ => self.timeout.min(self.max_timeout),
        }
    }

    pub fn row_limit(&self, requested: Option<i64>) -> usize {
        match requested {
            Some(n) if n > 0 => n as usize,
            _ => self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallelism_clamp() {
        let p = AggregateParams::default();
        assert_eq!(p.parallelism(None, 4), 2);
        assert_eq!(p.parallelism(Some(0), 4), 1);
        assert_eq!(p.parallelism(Some(-3), 4), 1);
        assert_eq!(p.parallelism(Some(16), 4), 4);
    }

    #[test]
    fn test_deadline_clamp() {
        let p = AggregateParams::default();
        assert_eq!(p.deadline(None), Duration::from_secs(5));
        assert_eq!(p.deadline(Some(3)), Duration::from_secs(3));
        assert_eq!(p.deadline(Some(300)), Duration::from_secs(30));
    }

    #[test]
    fn test_row_limit() {
        let p = AggregateParams::default();
        assert_eq!(p.row_limit(Some(5)), 5);
        assert_eq!(p.row_limit(None), 20);
    }
}
