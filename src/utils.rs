//! Count formatting for log lines and summaries.

/// Format a count with K/M suffix for compact log output.
///
/// ```
/// use sinkhole::utils::format_count;
/// assert_eq!(format_count(812), "812");
/// assert_eq!(format_count(154_320), "154.3K");
/// ```
pub fn format_count(count: usize) -> String {
    match count {
        n if n >= 1_000_000 => format!("{:.1}M", n as f64 / 1_000_000.0),
        n if n >= 1_000 => format!("{:.1}K", n as f64 / 1_000.0),
        n => n.to_string(),
    }
}

/// Format a count with comma thousands separators.
///
/// ```
/// use sinkhole::utils::format_count_with_separator;
/// assert_eq!(format_count_with_separator(154_320), "154,320");
/// ```
pub fn format_count_with_separator(n: usize) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - head) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
