use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::color::{FULL_TEXT_AVAILABLE, FULL_TEXT_MISSING};
use crate::data::stats::{CategoryCount, HistogramBucket, YearMonth};
use crate::state::AppState;
use crate::ui::source_label;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Trends tab
// ---------------------------------------------------------------------------

pub fn trends_tab(ui: &mut Ui, state: &AppState) {
    let snap = &state.snapshot;

    ui.heading("Publication Trends");
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Publications by Year");
        year_chart(&mut cols[0], &snap.by_year);
        cols[1].strong("Monthly Publication Trends");
        month_chart(&mut cols[1], &snap.by_month);
    });

    ui.add_space(8.0);
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Publications by Source");
        source_chart(&mut cols[0], state, &snap.by_source);
        cols[1].strong("Distribution of Authors per Paper");
        histogram(&mut cols[1], "author_hist", "Number of Authors", &snap.author_histogram);
    });
}

fn year_chart(ui: &mut Ui, by_year: &[(i32, usize)]) {
    let bars = by_year
        .iter()
        .map(|&(year, n)| {
            Bar::new(f64::from(year), n as f64)
                .name(year)
                .width(0.8)
                .fill(Color32::from_rgb(0x1F, 0x77, 0xB4))
        })
        .collect();

    Plot::new("year_chart")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Number of Publications")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn month_chart(ui: &mut Ui, by_month: &[(YearMonth, usize)]) {
    let points: PlotPoints = by_month
        .iter()
        .map(|&(ym, n)| [ym.ordinal() as f64, n as f64])
        .collect();

    Plot::new("month_chart")
        .height(CHART_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label("Number of Publications")
        .x_axis_formatter(|mark, _range| {
            YearMonth::from_ordinal(mark.value.round() as i64).to_string()
        })
        .label_formatter(|_name, point| {
            format!(
                "{}: {}",
                YearMonth::from_ordinal(point.x.round() as i64),
                point.y
            )
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("papers").width(3.0));
        });
}

fn source_chart(ui: &mut Ui, state: &AppState, by_source: &[CategoryCount]) {
    Plot::new("source_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .show_axes([false, true])
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            // one chart per bar so each source gets a legend entry
            for (i, c) in by_source.iter().enumerate() {
                let label = source_label(c.label());
                let color = state.source_colors.color_for(c.label());
                let bar = Bar::new(i as f64, c.count as f64)
                    .name(label)
                    .width(0.7)
                    .fill(color);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(label).color(color));
            }
        });
}

fn histogram(ui: &mut Ui, id: &str, x_label: &str, buckets: &[HistogramBucket]) {
    let bars = buckets
        .iter()
        .map(|b| {
            let width = (b.end - b.start).max(1.0) * 0.95;
            Bar::new(b.midpoint(), b.count as f64)
                .width(width)
                .name(format!("{:.0}–{:.0}", b.start, b.end))
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label("Frequency")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Publications tab
// ---------------------------------------------------------------------------

pub fn publications_tab(ui: &mut Ui, state: &AppState) {
    let snap = &state.snapshot;

    ui.heading("Publication Details");
    ui.strong(format!("Top {} Journals by Publication Count", state.config.top_journals));
    top_journal_chart(ui, &snap.top_journals);
    crate::ui::details::journal_table(ui, &snap.top_journals);

    ui.add_space(8.0);
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Abstract Length Distribution");
        histogram(
            &mut cols[0],
            "abstract_hist",
            "Abstract Length (characters)",
            &snap.abstract_histogram,
        );
        cols[1].strong("Full Text Availability");
        full_text_chart(&mut cols[1], snap.full_text.available, snap.full_text.unavailable);
    });
}

fn top_journal_chart(ui: &mut Ui, journals: &[CategoryCount]) {
    // Most common at the top.
    let n = journals.len();
    let bars = journals
        .iter()
        .enumerate()
        .map(|(i, c)| Bar::new((n - i) as f64, c.count as f64).name(c.label()).width(0.7))
        .collect();

    Plot::new("journal_chart")
        .height(CHART_HEIGHT + 140.0)
        .x_axis_label("Number of Publications")
        .show_axes([true, false])
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn full_text_chart(ui: &mut Ui, available: usize, unavailable: usize) {
    Plot::new("full_text_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .show_axes([false, true])
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (x, label, n, color) in [
                (0.0, "Available", available, FULL_TEXT_AVAILABLE),
                (1.0, "Not Available", unavailable, FULL_TEXT_MISSING),
            ] {
                let bar = Bar::new(x, n as f64).width(0.7).name(label).fill(color);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(label).color(color));
            }
        });
}
