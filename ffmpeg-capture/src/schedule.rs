//! Wall-clock segment boundary computation
//!
//! Pure functions of the supplied "now": no stored previous-boundary
//! state, so concurrent sessions computing durations can never skew each
//! other. Callers pass `Local::now()` at the moment they need a duration.

use chrono::{DateTime, Duration, Local, Timelike};

/// Segment rotation cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationMode {
    /// Split at the top of every hour (normal operation)
    Hourly,
    /// Split at the top of every minute (fast-iteration mode)
    Minutely,
}

impl RotationMode {
    /// Pick the mode for the given fast-iteration flag
    pub fn from_fast(fast: bool) -> Self {
        if fast {
            RotationMode::Minutely
        } else {
            RotationMode::Hourly
        }
    }

    /// Full cycle length in seconds
    pub fn cycle_seconds(self) -> u64 {
        match self {
            RotationMode::Hourly => 3600,
            RotationMode::Minutely => 60,
        }
    }
}

/// Seconds from `now` until the next segment boundary.
///
/// The boundary is the top of the next hour or minute, found by
/// truncating `now + 1 cycle`. If the remainder truncates below one
/// second (a call landing right on the boundary), a full extra cycle is
/// added instead: a near-zero duration would make the capture loop spin
/// through ffmpeg invocations back to back.
pub fn seconds_until_boundary(now: DateTime<Local>, mode: RotationMode) -> u64 {
    let cycle = mode.cycle_seconds();

    let boundary = match mode {
        RotationMode::Hourly => (now + Duration::hours(1))
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0)),
        RotationMode::Minutely => (now + Duration::minutes(1))
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0)),
    };

    // Truncation can land in a DST gap; a plain full cycle is close enough
    let Some(boundary) = boundary else {
        return cycle;
    };

    let remaining = (boundary - now).num_seconds();
    if remaining < 1 {
        remaining.max(0) as u64 + cycle
    } else {
        remaining as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 12, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_hourly_mid_hour() {
        assert_eq!(seconds_until_boundary(at(12, 30, 0), RotationMode::Hourly), 1800);
        assert_eq!(seconds_until_boundary(at(12, 0, 1), RotationMode::Hourly), 3599);
    }

    #[test]
    fn test_hourly_one_second_left() {
        assert_eq!(seconds_until_boundary(at(12, 59, 59), RotationMode::Hourly), 1);
    }

    #[test]
    fn test_hourly_on_boundary_gets_full_cycle() {
        assert_eq!(seconds_until_boundary(at(13, 0, 0), RotationMode::Hourly), 3600);
    }

    #[test]
    fn test_hourly_subsecond_remainder_corrected() {
        // 12:59:59.5 truncates to 0 remaining; must get a full extra hour
        let now = at(12, 59, 59).with_nanosecond(500_000_000).unwrap();
        assert_eq!(seconds_until_boundary(now, RotationMode::Hourly), 3600);
    }

    #[test]
    fn test_minutely() {
        assert_eq!(seconds_until_boundary(at(12, 30, 30), RotationMode::Minutely), 30);
        assert_eq!(seconds_until_boundary(at(12, 30, 0), RotationMode::Minutely), 60);
    }

    #[test]
    fn test_minutely_subsecond_remainder_corrected() {
        let now = at(12, 30, 59).with_nanosecond(900_000_000).unwrap();
        assert_eq!(seconds_until_boundary(now, RotationMode::Minutely), 60);
    }

    #[test]
    fn test_never_zero() {
        for s in 0..60 {
            assert!(seconds_until_boundary(at(12, 59, s), RotationMode::Hourly) > 0);
            assert!(seconds_until_boundary(at(12, 30, s), RotationMode::Minutely) > 0);
        }
    }

    #[test]
    fn test_reentrant_same_input_same_output() {
        let now = at(12, 17, 42);
        let a = seconds_until_boundary(now, RotationMode::Hourly);
        let b = seconds_until_boundary(now, RotationMode::Hourly);
        assert_eq!(a, b);
        assert_eq!(a, 42 * 60 + 18); // up to 13:00:00
    }
}
