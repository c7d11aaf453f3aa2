//! Timestamp utilities

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert a configured number of seconds into a duration
///
/// Negative and non-finite values collapse to zero. Values too large for a
/// `Duration` saturate at `Duration::MAX`.
pub fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        // After 2000-01-01, before 2100-01-01
        assert!(timestamp.timestamp() > 946_684_800);
        assert!(timestamp.timestamp() < 4_102_444_800);
    }

    #[test]
    fn test_secs_to_duration_fractional() {
        assert_eq!(secs_to_duration(0.5), Duration::from_millis(500));
        assert_eq!(secs_to_duration(5.0), Duration::from_secs(5));
    }

    #[test]
    fn test_secs_to_duration_clamps_invalid_values() {
        assert_eq!(secs_to_duration(0.0), Duration::ZERO);
        assert_eq!(secs_to_duration(-1.0), Duration::ZERO);
        assert_eq!(secs_to_duration(f64::NAN), Duration::ZERO);
        assert_eq!(secs_to_duration(f64::INFINITY), Duration::ZERO);
    }

    #[test]
    fn test_secs_to_duration_saturates_huge_values() {
        assert_eq!(secs_to_duration(1e20), Duration::MAX);
        assert_eq!(secs_to_duration(f64::MAX), Duration::MAX);
    }
}
