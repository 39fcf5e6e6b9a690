//! Time comparison and clock-value helpers.

use std::time::Duration;

use crate::pcm::PcmFormat;

/// Tolerance used when a declared duration is compared with the duration
/// implied by a byte count.
///
/// The default (`TimeTolerance::EXACT`) compares at sample-frame resolution:
/// two durations are equal when they map to the same frame-aligned byte count.
/// A non-zero tolerance accepts any difference up to and including its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeTolerance(Duration);

impl TimeTolerance {
    /// Frame-exact comparison.
    pub const EXACT: TimeTolerance = TimeTolerance(Duration::ZERO);

    /// Accepts differences up to `tolerance`.
    pub fn new(tolerance: Duration) -> Self {
        Self(tolerance)
    }

    /// Accepts differences up to `millis` milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// The tolerance as a duration.
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Compares a declared duration with the duration of `bytes` payload bytes.
    pub fn matches_bytes(&self, format: &PcmFormat, declared: Duration, bytes: u64) -> bool {
        if self.0.is_zero() {
            return format.bytes_for_duration(declared) == bytes;
        }
        abs_diff(declared, format.duration_for_bytes(bytes)) <= self.0
    }

    /// Compares two durations.
    pub fn equals(&self, a: Duration, b: Duration) -> bool {
        abs_diff(a, b) <= self.0
    }
}

fn abs_diff(a: Duration, b: Duration) -> Duration {
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// Formats a duration as a full clock value, `h:mm:ss.mmm`.
///
/// Sub-millisecond remainders are rounded to the nearest millisecond.
pub fn to_clock_value(duration: Duration) -> String {
    let total_millis = (duration.as_nanos() + 500_000) / 1_000_000;
    let millis = total_millis % 1000;
    let total_secs = total_millis / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
}

/// Duration as fractional milliseconds.
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_tolerance_uses_frame_resolution() {
        let format = PcmFormat::mono(22050);
        let tol = TimeTolerance::default();
        assert_eq!(tol, TimeTolerance::EXACT);
        assert!(tol.matches_bytes(&format, Duration::from_millis(600), 26460));
        assert!(!tol.matches_bytes(&format, Duration::from_millis(600), 26462));
        // 10us is less than half a frame at 22050 Hz
        assert!(tol.matches_bytes(&format, Duration::from_micros(600_010), 26460));
    }

    #[test]
    fn test_loose_tolerance() {
        let format = PcmFormat::mono(22050);
        let tol = TimeTolerance::from_millis(5);
        assert!(tol.matches_bytes(&format, Duration::from_millis(604), 26460));
        assert!(!tol.matches_bytes(&format, Duration::from_millis(606), 26460));
    }

    #[test]
    fn test_equals() {
        let tol = TimeTolerance::new(Duration::from_micros(500));
        assert!(tol.equals(Duration::from_millis(10), Duration::from_micros(10_400)));
        assert!(!tol.equals(Duration::from_millis(10), Duration::from_micros(10_600)));
        assert!(TimeTolerance::EXACT.equals(Duration::from_secs(1), Duration::from_secs(1)));
    }

    #[test]
    fn test_clock_value() {
        assert_eq!(to_clock_value(Duration::ZERO), "0:00:00.000");
        assert_eq!(to_clock_value(Duration::from_millis(600)), "0:00:00.600");
        assert_eq!(to_clock_value(Duration::from_millis(3_723_004)), "1:02:03.004");
        assert_eq!(to_clock_value(Duration::from_micros(1_999_600)), "0:00:02.000");
    }

    #[test]
    fn test_as_millis_f64() {
        assert_eq!(as_millis_f64(Duration::from_millis(1500)), 1500.0);
    }
}
