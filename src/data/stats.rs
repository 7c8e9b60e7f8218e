//! Summary metrics and chart series over a [`FilteredView`].
//!
//! Every function here is total: an empty view yields `None` metrics or empty
//! series, never a panic or a NaN.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::index;

use super::filter::FilteredView;
use super::model::{Paper, journal_label};

// ---------------------------------------------------------------------------
// Columns addressed by the aggregations
// ---------------------------------------------------------------------------

/// Categorical columns that can be counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryColumn {
    Journal,
    Source,
}

impl CategoryColumn {
    fn value(self, paper: &Paper) -> Option<&str> {
        match self {
            CategoryColumn::Journal => paper.journal.as_deref(),
            CategoryColumn::Source => Some(paper.source.as_str()),
        }
    }
}

/// Numeric columns that can be binned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    AuthorCount,
    AbstractLength,
}

impl NumericColumn {
    fn value(self, paper: &Paper) -> Option<f64> {
        match self {
            NumericColumn::AuthorCount => paper.author_count.map(|n| n as f64),
            NumericColumn::AbstractLength => Some(paper.abstract_length as f64),
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One bar of a categorical distribution. `value` is `None` for papers
/// missing the column (only possible for journals).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub value: Option<String>,
    pub count: usize,
}

impl CategoryCount {
    /// Display label, with the journal sentinel for a missing value.
    pub fn label(&self) -> &str {
        journal_label(self.value.as_deref())
    }
}

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Months since year 0, a continuous axis for plotting.
    pub fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    pub fn from_ordinal(ordinal: i64) -> Self {
        YearMonth {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// An equal-width histogram bin `[start, end)`; the last bin is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBucket {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBucket {
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Availability of full text within a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullTextSplit {
    pub available: usize,
    pub unavailable: usize,
}

/// Headline numbers for the overview tab. `None` means "N/A".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub total_count: usize,
    pub unique_journal_count: usize,
    pub mean_author_count: Option<f64>,
    pub full_text_percentage: Option<f64>,
    pub mode_year: Option<i32>,
    pub date_range_min: Option<NaiveDate>,
    pub date_range_max: Option<NaiveDate>,
    pub mean_abstract_length: Option<f64>,
    pub mode_source: Option<CategoryCount>,
    pub mode_journal: Option<CategoryCount>,
    /// Share of papers that have an abstract.
    pub abstract_completeness_percentage: Option<f64>,
}

impl Metrics {
    /// Filtered total minus the baseline total; `None` when they agree.
    pub fn count_delta(&self, baseline_total: usize) -> Option<i64> {
        let delta = self.total_count as i64 - baseline_total as i64;
        (delta != 0).then_some(delta)
    }
}

// ---------------------------------------------------------------------------
// summarize
// ---------------------------------------------------------------------------

pub fn summarize(view: &FilteredView<'_>) -> Metrics {
    let total = view.len();

    let mut journals: HashMap<Option<&str>, usize> = HashMap::new();
    let mut sources: HashMap<&str, usize> = HashMap::new();
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    let mut author_sum = 0usize;
    let mut author_rows = 0usize;
    let mut abstract_sum = 0usize;
    let mut with_abstract = 0usize;
    let mut full_text = 0usize;
    let mut date_min: Option<NaiveDate> = None;
    let mut date_max: Option<NaiveDate> = None;

    for p in view.iter() {
        *journals.entry(p.journal.as_deref()).or_default() += 1;
        *sources.entry(p.source.as_str()).or_default() += 1;
        if let Some(y) = p.publish_year {
            *years.entry(y).or_default() += 1;
        }
        if let Some(n) = p.author_count {
            author_sum += n;
            author_rows += 1;
        }
        abstract_sum += p.abstract_length;
        with_abstract += usize::from(p.abstract_text.is_some());
        full_text += usize::from(p.has_full_text);
        if let Some(d) = p.publish_time {
            date_min = Some(date_min.map_or(d, |m| m.min(d)));
            date_max = Some(date_max.map_or(d, |m| m.max(d)));
        }
    }

    let unique_journal_count = journals.len();
    // Ties rank by display label, so a missing journal sorts as "Unknown Journal".
    let labelled_journals = journals
        .into_iter()
        .map(|(j, n)| ((journal_label(j), j), n));

    Metrics {
        total_count: total,
        unique_journal_count,
        mean_author_count: mean(author_sum, author_rows),
        full_text_percentage: percentage(full_text, total),
        mode_year: mode(years.iter().map(|(&y, &n)| (y, n))).map(|(y, _)| y),
        date_range_min: date_min,
        date_range_max: date_max,
        mean_abstract_length: mean(abstract_sum, total),
        mode_source: mode(sources.into_iter()).map(|(s, count)| CategoryCount {
            value: Some(s.to_string()),
            count,
        }),
        mode_journal: mode(labelled_journals).map(|((_, j), count)| CategoryCount {
            value: j.map(String::from),
            count,
        }),
        abstract_completeness_percentage: percentage(with_abstract, total),
    }
}

fn mean(sum: usize, n: usize) -> Option<f64> {
    (n > 0).then(|| sum as f64 / n as f64)
}

fn percentage(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| 100.0 * part as f64 / whole as f64)
}

/// Most frequent key; ties go to the smallest key.
fn mode<K: Ord>(counts: impl Iterator<Item = (K, usize)>) -> Option<(K, usize)> {
    counts.fold(None, |best, (k, n)| match best {
        Some((bk, bn)) if bn > n || (bn == n && bk <= k) => Some((bk, bn)),
        _ => Some((k, n)),
    })
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// Papers per publication year, ascending. Undated papers are left out.
pub fn aggregate_by_year(view: &FilteredView<'_>) -> Vec<(i32, usize)> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for y in view.iter().filter_map(|p| p.publish_year) {
        *counts.entry(y).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Papers per calendar month, chronological. Undated papers are left out.
pub fn aggregate_by_year_month(view: &FilteredView<'_>) -> Vec<(YearMonth, usize)> {
    let mut counts: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for p in view.iter() {
        if let (Some(year), Some(month)) = (p.publish_year, p.publish_month) {
            *counts.entry(YearMonth { year, month }).or_default() += 1;
        }
    }
    counts.into_iter().collect()
}

/// Value counts of `column`, most common first; equal counts keep the order
/// in which values first appear in the view. `top_n` caps the length.
pub fn aggregate_by_category(
    view: &FilteredView<'_>,
    column: CategoryColumn,
    top_n: Option<usize>,
) -> Vec<CategoryCount> {
    let mut slots: HashMap<Option<&str>, usize> = HashMap::new();
    let mut counts: Vec<(Option<&str>, usize)> = Vec::new();
    for p in view.iter() {
        let value = column.value(p);
        let slot = *slots.entry(value).or_insert_with(|| {
            counts.push((value, 0));
            counts.len() - 1
        });
        counts[slot].1 += 1;
    }

    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(top_n.unwrap_or(usize::MAX))
        .map(|(value, count)| CategoryCount {
            value: value.map(String::from),
            count,
        })
        .collect()
}

/// Equal-width histogram of `column` over the view's observed range.
///
/// Missing values are skipped. A single distinct value yields one bucket.
pub fn histogram_buckets(
    view: &FilteredView<'_>,
    column: NumericColumn,
    bucket_count: usize,
) -> Vec<HistogramBucket> {
    let values: Vec<f64> = view.iter().filter_map(|p| column.value(p)).collect();
    if values.is_empty() || bucket_count == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range.abs() < f64::EPSILON {
        return vec![HistogramBucket {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let width = range / bucket_count as f64;
    let mut buckets: Vec<HistogramBucket> = (0..bucket_count)
        .map(|i| HistogramBucket {
            start: min + width * i as f64,
            end: if i + 1 == bucket_count {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - min) / width).floor() as usize).min(bucket_count - 1);
        buckets[idx].count += 1;
    }
    buckets
}

/// Full-text availability counts.
pub fn full_text_split(view: &FilteredView<'_>) -> FullTextSplit {
    view.iter().fold(FullTextSplit::default(), |mut acc, p| {
        if p.has_full_text {
            acc.available += 1;
        } else {
            acc.unavailable += 1;
        }
        acc
    })
}

// ---------------------------------------------------------------------------
// Row listings
// ---------------------------------------------------------------------------

/// Up to `n` rows of the view.
///
/// `deterministic` returns the first `n` rows (search result listing);
/// otherwise a uniform sample without replacement is drawn. Either way the
/// rows come back in view order.
pub fn sample_rows<'a>(view: &FilteredView<'a>, n: usize, deterministic: bool) -> Vec<&'a Paper> {
    if deterministic {
        view.iter().take(n).collect()
    } else {
        sample_rows_with_rng(view, n, &mut rand::thread_rng())
    }
}

/// Random sample without replacement using the caller's generator.
pub fn sample_rows_with_rng<'a, R: Rng + ?Sized>(
    view: &FilteredView<'a>,
    n: usize,
    rng: &mut R,
) -> Vec<&'a Paper> {
    sample_positions(view.len(), n, rng)
        .into_iter()
        .filter_map(|i| view.get(i))
        .collect()
}

/// `min(n, len)` distinct positions in `0..len`, ascending.
pub fn sample_positions<R: Rng + ?Sized>(len: usize, n: usize, rng: &mut R) -> Vec<usize> {
    let mut picked = index::sample(rng, len, n.min(len)).into_vec();
    picked.sort_unstable();
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterSpec, apply_filters};
    use crate::data::model::{NO_ABSTRACT, PaperTable};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn paper(date: Option<(i32, u32, u32)>, journal: Option<&str>, source: &str) -> Paper {
        let publish_time = date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        Paper {
            title: "t".into(),
            authors: Some("a, b".into()),
            journal: journal.map(String::from),
            source: source.into(),
            publish_time,
            publish_year: date.map(|(y, _, _)| y),
            publish_month: date.map(|(_, m, _)| m),
            abstract_text: None,
            doi: None,
            has_full_text: false,
            author_count: Some(2),
            abstract_length: NO_ABSTRACT.len(),
        }
    }

    fn table() -> PaperTable {
        let mut with_text = paper(Some((2021, 1, 5)), Some("J2"), "S2");
        with_text.abstract_text = Some("abcd".into());
        with_text.abstract_length = 4;
        with_text.has_full_text = true;
        with_text.author_count = Some(5);
        PaperTable::from_papers(vec![
            paper(Some((2020, 3, 1)), Some("J1"), "S1"),
            with_text,
            paper(Some((2020, 3, 20)), Some("J1"), "S1"),
            paper(None, None, "S2"),
        ])
    }

    #[test]
    fn summary_of_mixed_view() {
        let t = table();
        let m = summarize(&FilteredView::all(&t));
        assert_eq!(m.total_count, 4);
        assert_eq!(m.unique_journal_count, 3);
        assert_eq!(m.mean_author_count, Some(11.0 / 4.0));
        assert_eq!(m.full_text_percentage, Some(25.0));
        assert_eq!(m.mode_year, Some(2020));
        assert_eq!(m.date_range_min, NaiveDate::from_ymd_opt(2020, 3, 1));
        assert_eq!(m.date_range_max, NaiveDate::from_ymd_opt(2021, 1, 5));
        assert_eq!(m.abstract_completeness_percentage, Some(25.0));
        let expected_len = (3 * NO_ABSTRACT.len() + 4) as f64 / 4.0;
        assert_eq!(m.mean_abstract_length, Some(expected_len));
        // S1 and S2 tie at two papers each: smallest wins
        assert_eq!(m.mode_source.as_ref().map(|c| c.label()), Some("S1"));
        assert_eq!(m.mode_journal.map(|c| (c.value, c.count)), Some((Some("J1".into()), 2)));
    }

    #[test]
    fn summary_of_empty_view_is_all_na() {
        let t = table();
        let m = summarize(&FilteredView::from_indices(&t, Vec::new()));
        assert_eq!(
            m,
            Metrics {
                total_count: 0,
                unique_journal_count: 0,
                ..Metrics::default()
            }
        );
    }

    #[test]
    fn mean_author_count_ignores_missing() {
        let mut p = paper(None, None, "S");
        p.author_count = None;
        let t = PaperTable::from_papers(vec![p, paper(None, None, "S")]);
        assert_eq!(summarize(&FilteredView::all(&t)).mean_author_count, Some(2.0));
    }

    #[test]
    fn mode_prefers_smallest_on_tie() {
        let counts = vec![(2021, 2), (2019, 2), (2020, 1)];
        assert_eq!(mode(counts.into_iter()), Some((2019, 2)));
        assert_eq!(mode(std::iter::empty::<(i32, usize)>()), None);
    }

    #[test]
    fn journal_tie_ranks_missing_journal_by_label() {
        let t = PaperTable::from_papers(vec![
            paper(None, None, "S"),
            paper(None, Some("BMJ"), "S"),
        ]);
        let m = summarize(&FilteredView::all(&t));
        assert_eq!(m.mode_journal.map(|c| c.value), Some(Some("BMJ".to_string())));

        let t = PaperTable::from_papers(vec![
            paper(None, Some("Vaccine"), "S"),
            paper(None, None, "S"),
        ]);
        let m = summarize(&FilteredView::all(&t));
        assert_eq!(m.mode_journal.map(|c| c.value), Some(None));
    }

    #[test]
    fn year_series_sorted_and_skips_undated() {
        let t = table();
        let view = FilteredView::all(&t);
        let series = aggregate_by_year(&view);
        assert_eq!(series, vec![(2020, 2), (2021, 1)]);
        let dated = view.iter().filter(|p| p.publish_year.is_some()).count();
        assert_eq!(series.iter().map(|(_, n)| n).sum::<usize>(), dated);
    }

    #[test]
    fn year_month_series_is_chronological() {
        let t = table();
        let series = aggregate_by_year_month(&FilteredView::all(&t));
        assert_eq!(
            series,
            vec![
                (YearMonth { year: 2020, month: 3 }, 2),
                (YearMonth { year: 2021, month: 1 }, 1)
            ]
        );
        assert_eq!(series[0].0.to_string(), "2020-03");
        assert_eq!(series[0].0.first_day(), NaiveDate::from_ymd_opt(2020, 3, 1));
    }

    #[test]
    fn year_month_ordinal_round_trips_across_years() {
        let ym = YearMonth { year: 2020, month: 12 };
        assert_eq!(YearMonth::from_ordinal(ym.ordinal()), ym);
        assert_eq!(YearMonth::from_ordinal(ym.ordinal() + 1), YearMonth { year: 2021, month: 1 });
    }

    #[test]
    fn category_counts_descend_with_first_seen_ties() {
        let t = table();
        let view = FilteredView::all(&t);
        let journals = aggregate_by_category(&view, CategoryColumn::Journal, None);
        let labels: Vec<_> = journals.iter().map(|c| (c.label(), c.count)).collect();
        assert_eq!(labels, vec![("J1", 2), ("J2", 1), ("Unknown Journal", 1)]);

        let top1 = aggregate_by_category(&view, CategoryColumn::Journal, Some(1));
        assert_eq!(top1.len(), 1);

        let sources = aggregate_by_category(&view, CategoryColumn::Source, None);
        let labels: Vec<_> = sources.iter().map(|c| (c.label(), c.count)).collect();
        assert_eq!(labels, vec![("S1", 2), ("S2", 2)]);
    }

    #[test]
    fn histogram_covers_range_with_closed_last_bucket() {
        let t = table();
        let view = FilteredView::all(&t);
        let buckets = histogram_buckets(&view, NumericColumn::AuthorCount, 3);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].start, 2.0);
        assert_eq!(buckets[2].end, 5.0);
        assert_eq!(buckets.iter().map(|b| b.count).collect::<Vec<_>>(), vec![3, 0, 1]);
    }

    #[test]
    fn histogram_edge_cases() {
        let t = table();
        let empty = FilteredView::from_indices(&t, Vec::new());
        assert!(histogram_buckets(&empty, NumericColumn::AbstractLength, 30).is_empty());

        let all = FilteredView::all(&t);
        assert!(histogram_buckets(&all, NumericColumn::AuthorCount, 0).is_empty());

        let same = FilteredView::from_indices(&t, vec![0, 2]);
        let one = histogram_buckets(&same, NumericColumn::AuthorCount, 20);
        assert_eq!(one, vec![HistogramBucket { start: 2.0, end: 2.0, count: 2 }]);
    }

    #[test]
    fn full_text_split_counts_both_sides() {
        let t = table();
        let split = full_text_split(&FilteredView::all(&t));
        assert_eq!(split, FullTextSplit { available: 1, unavailable: 3 });
    }

    #[test]
    fn sample_larger_than_view_returns_everything() {
        let t = table();
        let view = FilteredView::all(&t);
        assert_eq!(sample_rows(&view, 10, false).len(), 4);
        assert_eq!(sample_rows(&view, 10, true).len(), 4);
    }

    #[test]
    fn sample_is_without_replacement_and_in_view_order() {
        let t = table();
        let view = apply_filters(&t, &FilterSpec::default());
        let mut rng = StdRng::seed_from_u64(7);
        let rows = sample_rows_with_rng(&view, 3, &mut rng);
        assert_eq!(rows.len(), 3);
        let positions: Vec<usize> = rows
            .iter()
            .map(|r| t.papers().iter().position(|p| std::ptr::eq(p, *r)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn sample_positions_are_distinct_and_bounded() {
        let mut rng = StdRng::seed_from_u64(1);
        let picked = sample_positions(50, 10, &mut rng);
        assert_eq!(picked.len(), 10);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
        assert!(picked.iter().all(|&i| i < 50));
        assert!(sample_positions(0, 5, &mut rng).is_empty());
    }

    #[test]
    fn deterministic_sample_is_the_head() {
        let t = table();
        let view = FilteredView::all(&t);
        let rows = sample_rows(&view, 2, true);
        assert!(std::ptr::eq(rows[0], &t.papers()[0]));
        assert!(std::ptr::eq(rows[1], &t.papers()[1]));
    }

    #[test]
    fn count_delta_only_when_filtered() {
        let m = Metrics {
            total_count: 3,
            ..Metrics::default()
        };
        assert_eq!(m.count_delta(3), None);
        assert_eq!(m.count_delta(10), Some(-7));
    }
}
