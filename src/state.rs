use std::path::Path;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::TableCache;
use crate::data::filter::{FilterOptions, FilterSpec, FilteredView, apply_filters};
use crate::data::model::{Paper, PaperTable};
use crate::data::stats::{
    CategoryColumn, CategoryCount, FullTextSplit, HistogramBucket, Metrics, NumericColumn,
    YearMonth, aggregate_by_category, aggregate_by_year, aggregate_by_year_month,
    full_text_split, histogram_buckets, sample_positions, summarize,
};

// ---------------------------------------------------------------------------
// Tabs and filter dimensions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Trends,
    Publications,
    Search,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Trends, Tab::Publications, Tab::Search];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Trends => "Trends",
            Tab::Publications => "Publications",
            Tab::Search => "Search",
        }
    }
}

/// A multi-choice filter in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Year,
    Journal,
    Source,
}

// ---------------------------------------------------------------------------
// Snapshot – everything the panels render for one filter state
// ---------------------------------------------------------------------------

/// Query results for one [`FilterSpec`], recomputed on every change.
///
/// Metrics and charts use the side-panel constraints only; the search term
/// narrows the listing in the Search tab.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Table positions passing the side-panel constraints.
    pub visible_indices: Vec<usize>,
    pub metrics: Metrics,
    pub by_year: Vec<(i32, usize)>,
    pub by_month: Vec<(YearMonth, usize)>,
    pub by_source: Vec<CategoryCount>,
    pub top_journals: Vec<CategoryCount>,
    pub author_histogram: Vec<HistogramBucket>,
    pub abstract_histogram: Vec<HistogramBucket>,
    pub full_text: FullTextSplit,
    /// Number of search hits, when a search is active.
    pub search_hits: Option<usize>,
    /// Table positions listed in the Search tab.
    pub listed: Vec<usize>,
}

impl Snapshot {
    pub fn compute(
        table: &PaperTable,
        spec: &FilterSpec,
        config: &DashboardConfig,
        rng: &mut StdRng,
    ) -> Self {
        let panel_spec = FilterSpec {
            search_term: None,
            ..spec.clone()
        };
        let view = apply_filters(table, &panel_spec);

        let (search_hits, listed) = if spec.has_search() {
            let hits = apply_filters(table, spec);
            let listed = hits
                .indices()
                .iter()
                .copied()
                .take(config.search_result_limit)
                .collect();
            (Some(hits.len()), listed)
        } else {
            (None, sample_listing(&view, config.sample_size, rng))
        };

        log::debug!(
            "recomputed snapshot: {} of {} papers visible",
            view.len(),
            table.len()
        );

        Snapshot {
            metrics: summarize(&view),
            by_year: aggregate_by_year(&view),
            by_month: aggregate_by_year_month(&view),
            by_source: aggregate_by_category(&view, CategoryColumn::Source, None),
            top_journals: aggregate_by_category(
                &view,
                CategoryColumn::Journal,
                Some(config.top_journals),
            ),
            author_histogram: histogram_buckets(
                &view,
                NumericColumn::AuthorCount,
                config.author_bins,
            ),
            abstract_histogram: histogram_buckets(
                &view,
                NumericColumn::AbstractLength,
                config.abstract_bins,
            ),
            full_text: full_text_split(&view),
            search_hits,
            listed,
            visible_indices: view.into_indices(),
        }
    }
}

fn sample_listing(view: &FilteredView<'_>, n: usize, rng: &mut StdRng) -> Vec<usize> {
    sample_positions(view.len(), n, rng)
        .into_iter()
        .map(|pos| view.indices()[pos])
        .collect()
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded table (None until a file loads).
    pub table: Option<Arc<PaperTable>>,

    /// Side-panel selections and search term.
    pub filters: FilterSpec,

    /// What the filter widgets offer.
    pub options: FilterOptions,

    /// Colour per source, stable across filter changes.
    pub source_colors: ColorMap,

    /// Text box contents; copied into `filters` when it changes.
    pub search_input: String,

    /// Results for the current `filters` (cached).
    pub snapshot: Snapshot,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    rng: StdRng,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let rng = match config.sample_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            table: None,
            filters: FilterSpec::default(),
            options: FilterOptions::default(),
            source_colors: ColorMap::new(std::iter::empty::<&str>()),
            search_input: String::new(),
            snapshot: Snapshot::default(),
            tab: Tab::default(),
            status_message: None,
            rng,
        }
    }

    /// Load `path` through `cache` and install it. A failure leaves no
    /// dataset and sets the status message.
    pub fn load(&mut self, path: &Path, cache: &TableCache) {
        match cache.load(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} papers from {}",
                    table.len(),
                    path.display()
                );
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.table = None;
                self.snapshot = Snapshot::default();
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded table and initialise the filters.
    pub fn set_table(&mut self, table: Arc<PaperTable>) {
        self.options = FilterOptions::from_table(&table, self.config.journal_options);
        self.filters = FilterSpec::dashboard_defaults(&self.options);
        self.source_colors = ColorMap::new(self.options.sources.iter().map(String::as_str));
        self.search_input.clear();
        self.table = Some(table);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the snapshot after a filter change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.snapshot = Snapshot::compute(table, &self.filters, &self.config, &mut self.rng);
        }
    }

    /// Draw a fresh random sample for the listing.
    pub fn reshuffle(&mut self) {
        self.refilter();
    }

    /// Copy the search box into the filter spec, as typed.
    pub fn apply_search_input(&mut self) {
        let term = (!self.search_input.is_empty()).then(|| self.search_input.clone());
        if term != self.filters.search_term {
            self.filters.search_term = term;
            self.refilter();
        }
    }

    pub fn toggle_year(&mut self, year: i32) {
        toggle(&mut self.filters.years, year);
        self.refilter();
    }

    pub fn toggle_journal(&mut self, journal: Option<String>) {
        toggle(&mut self.filters.journals, journal);
        self.refilter();
    }

    pub fn toggle_source(&mut self, source: String) {
        toggle(&mut self.filters.sources, source);
        self.refilter();
    }

    /// Select every offered value of a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        match dim {
            Dimension::Year => self.filters.years = self.options.years.iter().copied().collect(),
            Dimension::Journal => {
                self.filters.journals = self.options.journals.iter().cloned().collect()
            }
            Dimension::Source => {
                self.filters.sources = self.options.sources.iter().cloned().collect()
            }
        }
        self.refilter();
    }

    /// Clear a dimension, which removes its constraint.
    pub fn select_none(&mut self, dim: Dimension) {
        match dim {
            Dimension::Year => self.filters.years.clear(),
            Dimension::Journal => self.filters.journals.clear(),
            Dimension::Source => self.filters.sources.clear(),
        }
        self.refilter();
    }

    /// Papers listed in the Search tab.
    pub fn listed_papers(&self) -> Vec<&Paper> {
        let Some(table) = &self.table else {
            return Vec::new();
        };
        self.snapshot
            .listed
            .iter()
            .filter_map(|&i| table.get(i))
            .collect()
    }

    /// Size of the whole table, for the "Total Papers" delta.
    pub fn baseline_total(&self) -> usize {
        self.table.as_ref().map_or(0, |t| t.len())
    }
}

fn toggle<T: Ord>(set: &mut std::collections::BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::NO_ABSTRACT;

    fn paper(year: i32, journal: &str, source: &str, title: &str) -> Paper {
        Paper {
            title: title.into(),
            authors: Some("A, B".into()),
            journal: Some(journal.into()),
            source: source.into(),
            publish_time: chrono::NaiveDate::from_ymd_opt(year, 6, 1),
            publish_year: Some(year),
            publish_month: Some(6),
            abstract_text: None,
            doi: None,
            has_full_text: true,
            author_count: Some(2),
            abstract_length: NO_ABSTRACT.len(),
        }
    }

    fn state() -> AppState {
        let config = DashboardConfig {
            sample_seed: Some(3),
            sample_size: 2,
            ..DashboardConfig::default()
        };
        let mut state = AppState::new(config);
        state.set_table(Arc::new(PaperTable::from_papers(vec![
            paper(2020, "J1", "S1", "covid vaccine trial"),
            paper(2021, "J2", "S2", "unrelated topic"),
            paper(2020, "J1", "S1", "other"),
        ])));
        state
    }

    #[test]
    fn defaults_select_everything() {
        let s = state();
        assert_eq!(s.filters.years.len(), 2);
        assert_eq!(s.filters.sources.len(), 2);
        assert!(s.filters.journals.is_empty());
        assert_eq!(s.snapshot.visible_indices, vec![0, 1, 2]);
        assert_eq!(s.snapshot.listed.len(), 2);
        assert_eq!(s.snapshot.search_hits, None);
    }

    #[test]
    fn toggling_a_year_refilters() {
        let mut s = state();
        s.toggle_year(2021);
        assert_eq!(s.snapshot.visible_indices, vec![0, 2]);
        assert_eq!(s.snapshot.metrics.unique_journal_count, 1);
        s.toggle_year(2021);
        assert_eq!(s.snapshot.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn clearing_a_dimension_removes_the_constraint() {
        let mut s = state();
        s.toggle_source("S1".into());
        assert_eq!(s.snapshot.visible_indices, vec![1]);
        s.select_none(Dimension::Source);
        assert_eq!(s.snapshot.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn search_narrows_listing_but_not_metrics() {
        let mut s = state();
        s.search_input = "Vaccine".into();
        s.apply_search_input();
        assert_eq!(s.filters.search_term.as_deref(), Some("Vaccine"));
        assert_eq!(s.snapshot.search_hits, Some(1));
        assert_eq!(s.snapshot.listed, vec![0]);
        assert_eq!(s.snapshot.metrics.total_count, 3);
        assert_eq!(s.listed_papers()[0].title, "covid vaccine trial");
    }

    #[test]
    fn search_input_is_used_as_typed() {
        let mut s = state();
        s.search_input = " trial".into();
        s.apply_search_input();
        assert_eq!(s.filters.search_term.as_deref(), Some(" trial"));
        assert_eq!(s.snapshot.search_hits, Some(1));

        s.search_input.clear();
        s.apply_search_input();
        assert_eq!(s.filters.search_term, None);
        assert_eq!(s.snapshot.search_hits, None);
    }

    #[test]
    fn seeded_samples_repeat() {
        let a = state();
        let b = state();
        assert_eq!(a.snapshot.listed, b.snapshot.listed);
    }

    #[test]
    fn failed_load_clears_dataset() {
        let mut s = state();
        s.load(Path::new("/no/such/metadata.csv"), &TableCache::new());
        assert!(s.table.is_none());
        assert!(s.snapshot.visible_indices.is_empty());
        assert!(s.status_message.as_deref().unwrap().contains("not found"));
    }
}
