use eframe::egui::{self, RichText, Ui};

use crate::data::stats::CategoryCount;
use crate::state::AppState;
use crate::ui::{NOT_AVAILABLE, fmt_count, fmt_opt, fmt_or_na, fmt_pct, source_label};

// ---------------------------------------------------------------------------
// Overview tab – key metrics and quick insights
// ---------------------------------------------------------------------------

pub fn overview_tab(ui: &mut Ui, state: &AppState) {
    let m = &state.snapshot.metrics;

    ui.heading("Dataset Overview");
    ui.add_space(6.0);

    let delta = m
        .count_delta(state.baseline_total())
        .map(|d| format!("{d:+}"));

    ui.columns(4, |cols: &mut [Ui]| {
        metric_card(&mut cols[0], "Total Papers", &fmt_count(m.total_count), delta.as_deref());
        metric_card(&mut cols[1], "Unique Journals", &fmt_count(m.unique_journal_count), None);
        metric_card(&mut cols[2], "Avg Authors/Paper", &fmt_opt(m.mean_author_count, 1), None);
        metric_card(&mut cols[3], "Full Text Available", &fmt_pct(m.full_text_percentage), None);
    });

    ui.add_space(12.0);
    ui.heading("Quick Insights");

    let date_range = match (m.date_range_min, m.date_range_max) {
        (Some(lo), Some(hi)) => format!("{} to {}", lo.format("%Y-%m-%d"), hi.format("%Y-%m-%d")),
        _ => format!("{NOT_AVAILABLE} to {NOT_AVAILABLE}"),
    };
    let abstract_len = match m.mean_abstract_length {
        Some(v) => format!("{v:.0} characters"),
        None => NOT_AVAILABLE.to_string(),
    };

    ui.columns(2, |cols: &mut [Ui]| {
        insight_box(
            &mut cols[0],
            "Publication Patterns",
            &[
                ("Most active year", fmt_or_na(m.mode_year)),
                ("Date range", date_range),
                ("Average abstract length", abstract_len),
            ],
        );
        insight_box(
            &mut cols[1],
            "Top Contributors",
            &[
                ("Most common source", category(&m.mode_source, true)),
                ("Most active journal", category(&m.mode_journal, false)),
                (
                    "Data quality",
                    format!("{} complete", fmt_pct(m.abstract_completeness_percentage)),
                ),
            ],
        );
    });

    if let Some(table) = &state.table {
        ui.add_space(12.0);
        ui.collapsing("Load report", |ui: &mut Ui| {
            if let Some(path) = table.source_path() {
                ui.label(format!("File: {}", path.display()));
            }
            ui.label(table.quality().to_string());
        });
    }
}

fn category(value: &Option<CategoryCount>, is_source: bool) -> String {
    match value {
        Some(c) if is_source => format!("{} ({})", source_label(c.label()), fmt_count(c.count)),
        Some(c) => format!("{} ({})", c.label(), fmt_count(c.count)),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn metric_card(ui: &mut Ui, label: &str, value: &str, delta: Option<&str>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(24.0).strong());
        if let Some(delta) = delta {
            ui.label(RichText::new(delta).small());
        }
    });
}

fn insight_box(ui: &mut Ui, title: &str, rows: &[(&str, String)]) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.strong(title);
        for (label, value) in rows {
            ui.horizontal(|ui: &mut Ui| {
                ui.label(format!("{label}:"));
                ui.strong(value);
            });
        }
    });
}
