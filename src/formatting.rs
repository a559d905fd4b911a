pub fn format_change(value: f64) -> String {
    if value.is_finite() {
        let normalized = if value.abs() < 0.005 { 0.0 } else { value };
        format!("{normalized:+.1}")
    } else {
        "-".to_string()
    }
}

pub fn format_pct(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.1}")
    } else {
        "-".to_string()
    }
}

/// Compact human scale for large smoker counts: 281000000 -> "281.0M".
pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_is_signed() {
        assert_eq!(format_change(15.6), "+15.6");
        assert_eq!(format_change(-5.0), "-5.0");
        assert_eq!(format_change(0.001), "+0.0");
        assert_eq!(format_change(f64::NAN), "-");
    }

    #[test]
    fn counts_scale_to_units() {
        assert_eq!(format_count(281_000_000.0), "281.0M");
        assert_eq!(format_count(2_100_000_000.0), "2.1B");
        assert_eq!(format_count(5_000.0), "5.0K");
        assert_eq!(format_count(312.0), "312");
    }
}
