//! Field rendering shared by the list projection, the aggregation engine and
//! the report exporter.

use chrono::NaiveDate;

/// Split a comma-delimited assignee field into trimmed, non-empty names.
/// Duplicates and insertion order are preserved.
pub fn split_assignees(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Join assignee names back into the comma-delimited storage form.
pub fn join_assignees(names: &[String]) -> String {
    names
        .iter()
        .map(|name| name.trim())
        .collect::<Vec<_>>()
        .join(",")
}

/// Render a snake_case enum value for humans: `in_progress` -> "In Progress".
/// An empty input yields an empty string.
pub fn humanize(value: &str) -> String {
    value
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Date rendering used by the list projection, e.g. "Sep 24, 2025".
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}
