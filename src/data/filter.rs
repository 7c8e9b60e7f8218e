use std::collections::BTreeSet;

use super::model::{Paper, PaperTable};
use super::stats::{CategoryColumn, aggregate_by_category};

// ---------------------------------------------------------------------------
// FilterSpec – the user's constraints
// ---------------------------------------------------------------------------

/// Constraints chosen in the side panel.
///
/// An empty set means "no constraint on this dimension", never "exclude
/// everything". Non-empty constraints are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub years: BTreeSet<i32>,
    /// `None` selects papers without a journal.
    pub journals: BTreeSet<Option<String>>,
    pub sources: BTreeSet<String>,
    /// Case-insensitive substring matched against title OR abstract.
    pub search_term: Option<String>,
}

impl FilterSpec {
    /// The initial selection of the dashboard: every year and every source
    /// pre-selected, no journal selected. Both resolve to "include all".
    pub fn dashboard_defaults(options: &FilterOptions) -> Self {
        FilterSpec {
            years: options.years.iter().copied().collect(),
            journals: BTreeSet::new(),
            sources: options.sources.iter().cloned().collect(),
            search_term: None,
        }
    }

    /// The active search needle, lowercased. Only an empty term is inactive;
    /// surrounding whitespace is part of the needle.
    pub fn search_needle(&self) -> Option<String> {
        self.search_term
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    pub fn has_search(&self) -> bool {
        self.search_needle().is_some()
    }

    /// Whether `paper` satisfies every non-empty constraint.
    pub fn matches(&self, paper: &Paper) -> bool {
        self.matches_with(paper, self.search_needle().as_deref())
    }

    fn matches_with(&self, paper: &Paper, needle: Option<&str>) -> bool {
        if !self.years.is_empty() {
            match paper.publish_year {
                Some(y) if self.years.contains(&y) => {}
                _ => return false,
            }
        }
        if !self.journals.is_empty() && !self.journals.contains(&paper.journal) {
            return false;
        }
        if !self.sources.is_empty() && !self.sources.contains(&paper.source) {
            return false;
        }
        match needle {
            Some(needle) => matches_search(paper, needle),
            None => true,
        }
    }
}

/// `needle` must already be lowercased. A missing abstract never matches.
fn matches_search(paper: &Paper, needle: &str) -> bool {
    paper.title.to_lowercase().contains(needle)
        || paper
            .abstract_text
            .as_deref()
            .is_some_and(|a| a.to_lowercase().contains(needle))
}

// ---------------------------------------------------------------------------
// FilteredView – index list into the table
// ---------------------------------------------------------------------------

/// A read-only subset of a [`PaperTable`], in table order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a PaperTable,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// The unfiltered view over the whole table.
    pub fn all(table: &'a PaperTable) -> Self {
        FilteredView {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    /// Build a view from explicit indices. Out-of-range indices are dropped.
    pub fn from_indices(table: &'a PaperTable, indices: Vec<usize>) -> Self {
        let indices = indices.into_iter().filter(|&i| i < table.len()).collect();
        FilteredView { table, indices }
    }

    pub fn table(&self) -> &'a PaperTable {
        self.table
    }

    /// Row positions in the base table.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    /// The `n`th paper of the view.
    pub fn get(&self, n: usize) -> Option<&'a Paper> {
        self.indices.get(n).and_then(|&i| self.table.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Paper> + '_ {
        let papers = self.table.papers();
        self.indices.iter().map(move |&i| &papers[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the view of papers that pass every active constraint.
///
/// A paper passes when:
/// * each of `years`/`journals`/`sources` is empty or contains the paper's value
/// * there is no active search term, or the term occurs in its title or abstract
pub fn apply_filters<'a>(table: &'a PaperTable, spec: &FilterSpec) -> FilteredView<'a> {
    let needle = spec.search_needle();
    let indices = table
        .papers()
        .iter()
        .enumerate()
        .filter(|(_, p)| spec.matches_with(p, needle.as_deref()))
        .map(|(i, _)| i)
        .collect();
    FilteredView { table, indices }
}

// ---------------------------------------------------------------------------
// FilterOptions – what the side panel offers
// ---------------------------------------------------------------------------

/// Choices offered by the filter widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Distinct publication years, ascending.
    pub years: Vec<i32>,
    /// Most frequent journals, most common first.
    pub journals: Vec<Option<String>>,
    /// Distinct sources in first-seen order.
    pub sources: Vec<String>,
}

impl FilterOptions {
    pub fn from_table(table: &PaperTable, journal_option_count: usize) -> Self {
        let years: BTreeSet<i32> = table.papers().iter().filter_map(|p| p.publish_year).collect();

        let all = FilteredView::all(table);
        let journals =
            aggregate_by_category(&all, CategoryColumn::Journal, Some(journal_option_count))
            .into_iter()
            .map(|c| c.value)
            .collect();

        let mut seen = BTreeSet::new();
        let sources = table
            .papers()
            .iter()
            .filter(|p| seen.insert(p.source.as_str()))
            .map(|p| p.source.clone())
            .collect();

        FilterOptions {
            years: years.into_iter().collect(),
            journals,
            sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::NO_ABSTRACT;

    fn paper(
        year: Option<i32>,
        journal: Option<&str>,
        source: &str,
        title: &str,
        abs: Option<&str>,
    ) -> Paper {
        Paper {
            title: title.into(),
            authors: None,
            journal: journal.map(String::from),
            source: source.into(),
            publish_time: None,
            publish_year: year,
            publish_month: None,
            abstract_text: abs.map(String::from),
            doi: None,
            has_full_text: false,
            author_count: None,
            abstract_length: abs.unwrap_or(NO_ABSTRACT).len(),
        }
    }

    fn table() -> PaperTable {
        PaperTable::from_papers(vec![
            paper(Some(2020), Some("J1"), "S1", "COVID vaccine trial", None),
            paper(Some(2021), Some("J2"), "S2", "unrelated topic", Some("Vaccine efficacy study")),
            paper(Some(2020), Some("J1"), "S1", "other", Some("other")),
            paper(None, None, "S2", "undated", Some("no year here")),
        ])
    }

    #[test]
    fn empty_spec_is_identity() {
        let t = table();
        let view = apply_filters(&t, &FilterSpec::default());
        assert_eq!(view.indices(), &[0, 1, 2, 3]);
        assert!(view.iter().zip(t.papers()).all(|(a, b)| a == b));
    }

    #[test]
    fn year_constraint_excludes_undated_rows() {
        let t = table();
        let spec = FilterSpec {
            years: [2020].into(),
            ..FilterSpec::default()
        };
        assert_eq!(apply_filters(&t, &spec).indices(), &[0, 2]);
    }

    #[test]
    fn constraints_are_conjunctive() {
        let t = table();
        let spec = FilterSpec {
            years: [2020, 2021].into(),
            sources: ["S2".to_string()].into(),
            ..FilterSpec::default()
        };
        assert_eq!(apply_filters(&t, &spec).indices(), &[1]);
    }

    #[test]
    fn none_journal_selects_missing_journals() {
        let t = table();
        let spec = FilterSpec {
            journals: [None].into(),
            ..FilterSpec::default()
        };
        assert_eq!(apply_filters(&t, &spec).indices(), &[3]);
    }

    #[test]
    fn unknown_values_match_nothing_without_error() {
        let t = table();
        let spec = FilterSpec {
            years: [1850].into(),
            ..FilterSpec::default()
        };
        assert!(apply_filters(&t, &spec).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_over_title_or_abstract() {
        let t = table();
        let spec = FilterSpec {
            search_term: Some("VACCINE".into()),
            ..FilterSpec::default()
        };
        assert_eq!(apply_filters(&t, &spec).indices(), &[0, 1]);
    }

    #[test]
    fn missing_abstract_never_matches_sentinel_text() {
        let t = table();
        let spec = FilterSpec {
            search_term: Some("abstract available".into()),
            ..FilterSpec::default()
        };
        assert!(apply_filters(&t, &spec).is_empty());
    }

    #[test]
    fn empty_search_term_is_inactive() {
        let t = table();
        let spec = FilterSpec {
            search_term: Some(String::new()),
            ..FilterSpec::default()
        };
        assert!(!spec.has_search());
        assert_eq!(apply_filters(&t, &spec).len(), 4);
    }

    #[test]
    fn search_whitespace_is_significant() {
        let t = PaperTable::from_papers(vec![
            paper(None, None, "S1", "covid vaccine trial", None),
            paper(None, None, "S1", "trial run", None),
            paper(None, None, "S1", "single", None),
        ]);
        let leading_space = FilterSpec {
            search_term: Some(" trial".into()),
            ..FilterSpec::default()
        };
        assert_eq!(apply_filters(&t, &leading_space).indices(), &[0]);

        let only_space = FilterSpec {
            search_term: Some(" ".into()),
            ..FilterSpec::default()
        };
        assert!(only_space.has_search());
        assert_eq!(apply_filters(&t, &only_space).indices(), &[0, 1]);
    }

    #[test]
    fn filtering_leaves_table_untouched() {
        let t = table();
        let before = t.papers().to_vec();
        let spec = FilterSpec {
            years: [2021].into(),
            ..FilterSpec::default()
        };
        let _ = apply_filters(&t, &spec);
        assert_eq!(t.papers(), before.as_slice());
    }

    #[test]
    fn options_and_dashboard_defaults() {
        let t = table();
        let opts = FilterOptions::from_table(&t, 20);
        assert_eq!(opts.years, vec![2020, 2021]);
        assert_eq!(opts.sources, vec!["S1".to_string(), "S2".to_string()]);
        assert_eq!(opts.journals[0], Some("J1".to_string()));
        assert_eq!(opts.journals.len(), 3);

        let spec = FilterSpec::dashboard_defaults(&opts);
        assert!(spec.journals.is_empty());
        // Every year pre-selected still drops undated rows, as the dashboard does.
        assert_eq!(apply_filters(&t, &spec).indices(), &[0, 1, 2]);
    }

    #[test]
    fn from_indices_drops_out_of_range() {
        let t = table();
        let view = FilteredView::from_indices(&t, vec![1, 9, 3]);
        assert_eq!(view.indices(), &[1, 3]);
        assert_eq!(view.get(1).map(|p| p.title.as_str()), Some("undated"));
    }
}
