//! Decimal rounding for reported measurements.

/// Rounds `value` to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn rounds_to_requested_places() {
        assert_eq!(round_to(12.3456, 2), 12.35);
        assert_eq!(round_to(85.06, 1), 85.1);
        assert_eq!(round_to(93.6, 0), 94.0);
    }

    #[test]
    fn negative_values_round_away_from_zero() {
        assert_eq!(round_to(-2.25, 1), -2.3);
        assert_eq!(round_to(-0.004, 2), -0.0);
    }
}
