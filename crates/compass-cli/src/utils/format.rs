/// Truncate a string to a maximum length, adding ellipsis if needed
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

/// Return the value, or a placeholder when it is blank
pub fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// Two-digit display of a schedule filter: "2024-06" or "2024-06-03"
pub fn schedule_label(year: i32, month: u32, day: Option<u32>) -> String {
    match day {
        Some(day) => format!("{:04}-{:02}-{:02}", year, month, day),
        None => format!("{:04}-{:02}", year, month),
    }
}
