//! Percent-change trend strings for the statistics cards.

/// Percent change from `previous` to `current`, e.g. `+12.50%` or `-3.10%`.
///
/// A zero `previous` yields `"0.00%"` rather than a division by zero.
pub fn calculate_percentage(current: f64, previous: f64) -> String {
    if previous == 0.0 {
        return "0.00%".to_string();
    }

    let mut pct = (current - previous) / previous * 100.0;
    if pct == 0.0 {
        // Normalize -0.0 so it renders as "+0.00%".
        pct = 0.0;
    }

    if pct >= 0.0 {
        format!("+{pct:.2}%")
    } else {
        format!("{pct:.2}%")
    }
}

/// True when a rendered trend reports growth.
pub fn is_increase(percentage: &str) -> bool {
    percentage.starts_with('+')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_previous_is_flat() {
        for current in [0.0, 1.0, 1e9, -5.0] {
            assert_eq!(calculate_percentage(current, 0.0), "0.00%");
        }
    }

    #[test]
    fn growth_is_signed_with_plus() {
        assert_eq!(calculate_percentage(110.0, 100.0), "+10.00%");
        assert_eq!(calculate_percentage(100.0, 100.0), "+0.00%");
        assert_eq!(calculate_percentage(1_000_001.0, 3.0), "+33333266.67%");
        for (current, previous) in [(5.0, 5.0), (7.0, 3.0), (1e9, 1.0)] {
            assert!(is_increase(&calculate_percentage(current, previous)));
        }
    }

    #[test]
    fn decline_keeps_bare_minus() {
        assert_eq!(calculate_percentage(90.0, 100.0), "-10.00%");
        assert_eq!(calculate_percentage(0.0, 4.0), "-100.00%");
        assert!(!is_increase(&calculate_percentage(1.0, 2.0)));
    }

    #[test]
    fn negative_zero_is_normalized() {
        assert_eq!(calculate_percentage(-3.0, -3.0), "+0.00%");
    }
}
