//! Number formatting for panels

/// Large amounts as `x.xx B` / `x.xx M`, smaller ones with thousands separators
pub fn format_number(value: Option<f64>) -> String {
    let value = match value.filter(|v| v.is_finite()) {
        Some(v) => v,
        None => return "-".to_string(),
    };

    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.2} B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2} M", value / 1e6)
    } else {
        group_thousands(value)
    }
}

/// A percentage already expressed in percent, e.g. `12.5` -> `12.50%`
pub fn format_percentage(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.2}%", v),
        None => "-".to_string(),
    }
}

pub fn format_ratio(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_scales() {
        assert_eq!(format_number(Some(2_750_000_000.0)), "2.75 B");
        assert_eq!(format_number(Some(-3_400_000.0)), "-3.40 M");
        assert_eq!(format_number(Some(987_654.0)), "987,654");
        assert_eq!(format_number(Some(-1_234.4)), "-1,234");
        assert_eq!(format_number(Some(12.0)), "12");
        assert_eq!(format_number(None), "-");
        assert_eq!(format_number(Some(f64::NAN)), "-");
    }

    #[test]
    fn test_percent_and_ratio() {
        assert_eq!(format_percentage(Some(1.5)), "1.50%");
        assert_eq!(format_percentage(None), "-");
        assert_eq!(format_ratio(Some(28.456)), "28.46");
        assert_eq!(format_price(189.3), "$189.30");
    }
}
