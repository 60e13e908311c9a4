/// Parses a cell as a finite floating-point number after stripping thousands
/// separators and percent signs. Literal "NaN"/"inf" text is rejected so a
/// metric value is always finite.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell.chars().filter(|c| *c != ',' && *c != '%').collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return None;
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

pub fn is_numeric(cell: &str) -> bool {
    parse_number(cell).is_some()
}

/// Numeric value of a metric cell. Unparsable or empty cells coerce to 0
/// rather than poisoning the record.
pub fn metric_value(cell: &str) -> f64 {
    parse_number(cell).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_strips_separators() {
        assert_eq!(parse_number("1,234.5%"), Some(1234.5));
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("-3.25"), Some(-3.25));
        assert_eq!(parse_number("100%"), Some(100.0));
    }

    #[test]
    fn test_parse_number_rejects_non_numbers() {
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("East"), None);
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-inf"), None);
    }

    #[test]
    fn test_metric_value_defaults_to_zero() {
        assert_eq!(metric_value("n/a"), 0.0);
        assert_eq!(metric_value(""), 0.0);
        assert_eq!(metric_value("7"), 7.0);
    }
}
