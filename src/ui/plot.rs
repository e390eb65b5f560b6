use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Cohort variance bar chart (view A)
// ---------------------------------------------------------------------------

/// Render mean VARIANCE per revenue cohort, one coloured bar per cohort.
pub fn cohort_variance_chart(ui: &mut Ui, state: &AppState) {
    ui.heading("Average Variance per Revenue Cohort");

    let cohorts = &state.cohorts;
    if cohorts.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No rows match the current filters.");
        });
        return;
    }

    let labels: Vec<String> = cohorts.iter().map(|c| c.cohort.clone()).collect();

    Plot::new("cohort_variance_plot")
        .legend(Legend::default())
        .x_axis_label("Revenue Cohort")
        .y_axis_label("Average Variance (₹)")
        .x_axis_formatter(move |mark, _range| {
            let slot = mark.value.round();
            if (mark.value - slot).abs() > 1e-6 || slot < 0.0 {
                return String::new();
            }
            labels.get(slot as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (slot, cohort) in cohorts.iter().enumerate() {
                // NaN mean: leave a gap where the bar would be.
                if cohort.mean_variance.is_nan() {
                    continue;
                }
                let bar = Bar::new(slot as f64, cohort.mean_variance)
                    .width(0.6)
                    .name(format!("{} ({} rows)", cohort.cohort, cohort.rows));
                let chart = BarChart::new(vec![bar])
                    .name(&cohort.cohort)
                    .color(state.cohort_colors.color_for(&cohort.cohort));
                plot_ui.bar_chart(chart);
            }
        });
}
