//! Tolerant parsing of the date formats found in transaction sheets.
use chrono::NaiveDate;

/// Accepted formats, tried in order. The first one that parses wins, so
/// ambiguous inputs like `03/04/2024` resolve month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d-%B-%y",
    "%d-%B-%Y",
];

/// Parses `text` against the accepted formats.
///
/// Returns `None` for empty or unrecognised input; callers skip the record
/// rather than failing the whole computation.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unambiguous_formats_agree() {
        let expected = ymd(2024, 1, 15);
        for input in [
            "2024-01-15",
            "15-01-2024",
            "01/15/2024",
            "15/01/2024",
            "15-Jan-2024",
            "15-Jan-24",
            "15-January-2024",
            "15-January-24",
        ] {
            assert_eq!(parse_date(input), Some(expected), "input: {input}");
        }
    }

    #[test]
    fn test_ambiguous_slash_date_is_month_first() {
        assert_eq!(parse_date("03/04/2024"), Some(ymd(2024, 3, 4)));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(parse_date("  2023-06-30 "), Some(ymd(2023, 6, 30)));
    }

    #[test]
    fn test_empty_and_garbage_yield_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-45"), None);
    }
}
