use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Presentation sentinels
// ---------------------------------------------------------------------------

/// Label shown for a paper without a journal.
pub const UNKNOWN_JOURNAL: &str = "Unknown Journal";
/// Label shown for a paper without an abstract.
pub const NO_ABSTRACT: &str = "No abstract available";
/// Label shown for a paper without a DOI.
pub const NO_DOI: &str = "No DOI available";

// ---------------------------------------------------------------------------
// RawPaper – one un-normalized row as read from disk
// ---------------------------------------------------------------------------

/// A row exactly as the loader found it: every field optional text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPaper {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub journal: Option<String>,
    pub source: Option<String>,
    pub publish_time: Option<String>,
    pub abstract_text: Option<String>,
    pub doi: Option<String>,
    pub has_full_text: Option<String>,
}

// ---------------------------------------------------------------------------
// Paper – one row of the normalized table
// ---------------------------------------------------------------------------

/// A single paper after normalization. Derived fields are computed once by
/// [`crate::data::normalize`] and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    pub title: String,
    /// Comma-separated author names.
    pub authors: Option<String>,
    pub journal: Option<String>,
    /// Provenance of the record (CORD-19 `source_x`).
    pub source: String,
    pub publish_time: Option<NaiveDate>,
    pub publish_year: Option<i32>,
    /// 1-based month.
    pub publish_month: Option<u32>,
    pub abstract_text: Option<String>,
    pub doi: Option<String>,
    pub has_full_text: bool,
    /// Number of comma-separated tokens in `authors`.
    pub author_count: Option<usize>,
    /// Character length of the abstract, or of [`NO_ABSTRACT`] when missing.
    pub abstract_length: usize,
}

impl Paper {
    pub fn journal_label(&self) -> &str {
        journal_label(self.journal.as_deref())
    }

    pub fn abstract_label(&self) -> &str {
        self.abstract_text.as_deref().unwrap_or(NO_ABSTRACT)
    }

    pub fn doi_label(&self) -> &str {
        self.doi.as_deref().unwrap_or(NO_DOI)
    }
}

/// Display label for an optional journal name.
pub fn journal_label(journal: Option<&str>) -> &str {
    journal.unwrap_or(UNKNOWN_JOURNAL)
}

// ---------------------------------------------------------------------------
// DataQuality – what normalization had to degrade
// ---------------------------------------------------------------------------

/// Counts of fields that were missing or malformed at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataQuality {
    /// `publish_time` present but not parseable as a date.
    pub unparsable_dates: usize,
    pub missing_dates: usize,
    pub missing_abstracts: usize,
    pub missing_journals: usize,
    pub missing_dois: usize,
    pub missing_authors: usize,
    pub missing_sources: usize,
}

impl fmt::Display for DataQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unparsable dates, {} missing dates, {} missing abstracts, \
             {} missing journals, {} missing DOIs, {} missing author lists, \
             {} missing sources",
            self.unparsable_dates,
            self.missing_dates,
            self.missing_abstracts,
            self.missing_journals,
            self.missing_dois,
            self.missing_authors,
            self.missing_sources,
        )
    }
}

// ---------------------------------------------------------------------------
// PaperTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The normalized, immutable dataset. Shared read-only behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PaperTable {
    papers: Vec<Paper>,
    source_path: Option<PathBuf>,
    quality: DataQuality,
}

impl PaperTable {
    pub fn new(papers: Vec<Paper>, source_path: Option<PathBuf>, quality: DataQuality) -> Self {
        PaperTable {
            papers,
            source_path,
            quality,
        }
    }

    /// Build a table directly from already-normalized papers.
    pub fn from_papers(papers: Vec<Paper>) -> Self {
        Self::new(papers, None, DataQuality::default())
    }

    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn get(&self, idx: usize) -> Option<&Paper> {
        self.papers.get(idx)
    }

    /// File this table was loaded from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn quality(&self) -> &DataQuality {
        &self.quality
    }

    /// Number of papers.
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(journal: Option<&str>) -> Paper {
        Paper {
            title: "t".into(),
            authors: None,
            journal: journal.map(String::from),
            source: "PMC".into(),
            publish_time: None,
            publish_year: None,
            publish_month: None,
            abstract_text: None,
            doi: None,
            has_full_text: false,
            author_count: None,
            abstract_length: NO_ABSTRACT.len(),
        }
    }

    #[test]
    fn labels_fall_back_to_sentinels() {
        let p = paper(None);
        assert_eq!(p.journal_label(), UNKNOWN_JOURNAL);
        assert_eq!(p.abstract_label(), NO_ABSTRACT);
        assert_eq!(p.doi_label(), NO_DOI);

        let named = paper(Some("Lancet"));
        assert_eq!(named.journal_label(), "Lancet");
    }
}
