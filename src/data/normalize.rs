//! Raw rows → normalized [`Paper`]s.
//!
//! Malformed fields never fail a load: they degrade to `None` and are tallied
//! in [`DataQuality`].

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};

use super::model::{DataQuality, NO_ABSTRACT, Paper, PaperTable, RawPaper};

/// Date layouts accepted for `publish_time`, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Normalize every raw row into an immutable table.
pub fn normalize(rows: Vec<RawPaper>, source_path: Option<PathBuf>) -> PaperTable {
    let mut quality = DataQuality::default();
    let papers: Vec<Paper> = rows
        .into_iter()
        .map(|raw| normalize_row(raw, &mut quality))
        .collect();

    if quality.unparsable_dates > 0 {
        log::warn!(
            "{} of {} rows have an unparsable publish_time (treated as missing)",
            quality.unparsable_dates,
            papers.len()
        );
    }
    log::info!("Data quality: {quality}");

    PaperTable::new(papers, source_path, quality)
}

/// Normalize a single row, recording any degraded field in `quality`.
pub fn normalize_row(raw: RawPaper, quality: &mut DataQuality) -> Paper {
    // 1. dates
    let publish_time = match non_blank(raw.publish_time) {
        Some(text) => {
            let parsed = parse_publish_time(&text);
            if parsed.is_none() {
                log::debug!("unparsable publish_time {text:?}");
                quality.unparsable_dates += 1;
            }
            parsed
        }
        None => {
            quality.missing_dates += 1;
            None
        }
    };

    // 2. year / month
    let publish_year = publish_time.map(|d| d.year());
    let publish_month = publish_time.map(|d| d.month());

    // 3. blank → None
    let abstract_text = non_blank(raw.abstract_text);
    let journal = non_blank(raw.journal);
    let doi = non_blank(raw.doi);
    let authors = non_blank(raw.authors);
    let source = match non_blank(raw.source) {
        Some(s) => s,
        None => {
            quality.missing_sources += 1;
            String::new()
        }
    };
    quality.missing_abstracts += usize::from(abstract_text.is_none());
    quality.missing_journals += usize::from(journal.is_none());
    quality.missing_dois += usize::from(doi.is_none());
    quality.missing_authors += usize::from(authors.is_none());

    // 4. derived counts
    let author_count = authors.as_deref().map(count_authors);
    let abstract_length = abstract_text
        .as_deref()
        .unwrap_or(NO_ABSTRACT)
        .chars()
        .count();

    Paper {
        title: raw.title.unwrap_or_default(),
        authors,
        journal,
        source,
        publish_time,
        publish_year,
        publish_month,
        abstract_text,
        doi,
        has_full_text: raw.has_full_text.as_deref().is_some_and(parse_flag),
        author_count,
        abstract_length,
    }
}

/// Parse a `publish_time` cell.
///
/// Accepts full dates in [`DATE_FORMATS`], ISO datetimes (time part dropped),
/// `YYYY-MM` (first of the month) and a bare `YYYY` (first of January).
pub fn parse_publish_time(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    // ISO datetime: "2020-03-14T00:00:00Z", "2020-03-14 12:00:00"
    let date_part = match text.find(|c: char| c == 'T' || c == ' ') {
        Some(pos) if pos >= 8 => &text[..pos],
        _ => text,
    };

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(date_part, fmt) {
            return Some(d);
        }
    }

    let mut parts = date_part.split('-');
    let year = parts.next()?;
    if year.len() != 4 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    match (parts.next(), parts.next()) {
        (None, _) => NaiveDate::from_ymd_opt(year, 1, 1),
        (Some(month), None) => NaiveDate::from_ymd_opt(year, month.parse().ok()?, 1),
        _ => None,
    }
}

/// Number of comma-separated tokens, mirroring `str.split(',').len()`.
pub fn count_authors(authors: &str) -> usize {
    authors.split(',').count()
}

fn parse_flag(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "true" | "t" | "1" | "yes" | "y"
    )
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
