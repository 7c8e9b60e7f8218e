//! egui front end. Everything here only reads query results from
//! [`crate::state::AppState`]; no filtering or counting happens in the UI.

pub mod details;
pub mod overview;
pub mod panels;
pub mod plot;

/// Shown wherever a metric is undefined for the current view.
pub const NOT_AVAILABLE: &str = "N/A";

/// `1234567` → `"1,234,567"`.
pub fn fmt_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format an optional float with `decimals` places, or "N/A".
pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Format an optional percentage, e.g. `"42.5%"`, or "N/A".
pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}%"),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn fmt_or_na<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

/// Cut `text` to at most `max_chars` characters, appending "…" when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_pos, _)) => format!("{}…", &text[..byte_pos]),
        None => text.to_string(),
    }
}

/// Display label for a source; an empty source shows as "Unknown Source".
pub fn source_label(source: &str) -> &str {
    if source.is_empty() {
        "Unknown Source"
    } else {
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(fmt_count(0), "0");
        assert_eq!(fmt_count(999), "999");
        assert_eq!(fmt_count(1000), "1,000");
        assert_eq!(fmt_count(1234567), "1,234,567");
    }

    #[test]
    fn missing_metrics_render_na() {
        assert_eq!(fmt_opt(None, 1), "N/A");
        assert_eq!(fmt_opt(Some(2.345), 1), "2.3");
        assert_eq!(fmt_pct(Some(50.0)), "50.0%");
        assert_eq!(fmt_pct(None), "N/A");
        assert_eq!(fmt_or_na(Some(2020)), "2020");
        assert_eq!(fmt_or_na::<i32>(None), "N/A");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("naïve text", 3), "naï…");
        assert_eq!(truncate_chars("abc", 3), "abc");
    }
}
