// Statistics interval validation

/// Intervals (in days) the stats engine can be configured with.
pub const ALLOWED_INTERVALS: [u32; 4] = [1, 7, 30, 90];

/// Check whether `interval` is one of the supported retention periods.
///
/// This is a closed set, not a range: 2 or 89 are rejected just like 0.
pub const fn is_valid_interval(interval: u32) -> bool {
    matches!(interval, 1 | 7 | 30 | 90)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_intervals_are_valid() {
        for interval in ALLOWED_INTERVALS {
            assert!(is_valid_interval(interval), "{interval} should be valid");
        }
    }

    #[test]
    fn test_other_intervals_are_rejected() {
        for interval in [0, 2, 6, 8, 14, 29, 31, 60, 89, 91, 365, u32::MAX] {
            assert!(!is_valid_interval(interval), "{interval} should be rejected");
        }
    }

    #[test]
    fn test_exhaustive_small_range() {
        let valid: Vec<u32> = (0..=200).filter(|i| is_valid_interval(*i)).collect();
        assert_eq!(valid, ALLOWED_INTERVALS.to_vec());
    }
}
