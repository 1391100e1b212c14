use chrono::{DateTime, Utc};

/// Truncate a string to fit within `max_len` characters, ending in "..."
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// The last `max_len` characters of a string, for input fields that scroll
pub fn tail(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(max_len)).collect()
}

/// Format a creation timestamp for the list column
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Footer text for the number of incomplete items
pub fn items_left_label(count: usize) -> String {
    if count == 1 {
        "1 item left".to_string()
    } else {
        format!("{} items left", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("hello", 3), "hel");
        assert_eq!(truncate_string("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_tail() {
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("ab", 3), "ab");
        assert_eq!(tail("", 3), "");
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2025, 3, 7, 14, 30, 0).unwrap();
        assert_eq!(format_date(&date), "Mar 07, 2025");
    }

    #[test]
    fn test_items_left_label() {
        assert_eq!(items_left_label(0), "0 items left");
        assert_eq!(items_left_label(1), "1 item left");
        assert_eq!(items_left_label(5), "5 items left");
    }
}
