use eframe::egui::{self, RichText, Slider, Ui};

use crate::data::filter::ClosedRange;
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – range filters
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let mut filter = state.filter;
    let mut changed = range_sliders(
        ui,
        "Kitchen EBITDA (₹)",
        &mut filter.kitchen_ebitda,
        state.dataset.ebitda_bounds,
    );
    ui.add_space(8.0);
    changed |= range_sliders(
        ui,
        "Net Revenue (₹)",
        &mut filter.net_revenue,
        state.dataset.revenue_bounds,
    );
    ui.add_space(8.0);

    if ui.button("Reset filters").clicked() {
        state.reset_filter();
    } else if changed {
        state.set_filter(filter);
    }
}

/// A min and a max slider over the load-time bounds of one column.
/// Values are shown rounded but stored exactly, so fractional bounds stay
/// inside the filter. Returns whether the user moved either handle.
fn range_sliders(ui: &mut Ui, label: &str, range: &mut ClosedRange, bounds: ClosedRange) -> bool {
    ui.strong(label);
    let min = ui.add(
        Slider::new(&mut range.min, bounds.min..=bounds.max)
            .text("min")
            .custom_formatter(|v, _| format!("{v:.0}")),
    );
    let max = ui.add(
        Slider::new(&mut range.max, bounds.min..=bounds.max)
            .text("max")
            .custom_formatter(|v, _| format!("{v:.0}")),
    );
    // Dragging one handle past the other swaps them.
    *range = ClosedRange::new(range.min, range.max);
    min.changed() || max.changed()
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title and row counts.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.label(RichText::new("Dashboard 2: Variance Level P&L").strong());
        ui.separator();
        ui.label(format!(
            "{} rows loaded from {}, {} after filters",
            state.dataset.len(),
            state.dataset.source.display(),
            state.filtered.len()
        ));
    });
}

// ---------------------------------------------------------------------------
// Report tabs
// ---------------------------------------------------------------------------

pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(
            &mut state.tab,
            Tab::CohortVariance,
            "Avg Variance by Revenue Cohort",
        );
        ui.selectable_value(
            &mut state.tab,
            Tab::StoreCount,
            "Store Count by Month & Revenue",
        );
    });
}
