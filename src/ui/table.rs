use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::StorePivot;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Store count pivot (view B)
// ---------------------------------------------------------------------------

/// Render the bucket selector and the month × revenue range table.
pub fn store_count_view(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Store Count by Month and Revenue Range");

    let current = state.selected_bucket;
    let mut chosen = current;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Select Variance Bucket");
        egui::ComboBox::from_id_salt("variance_bucket")
            .selected_text(current.map_or("none", |b| b.label()))
            .show_ui(ui, |ui: &mut Ui| {
                for bucket in &state.buckets {
                    ui.selectable_value(&mut chosen, Some(*bucket), bucket.label());
                }
            });
    });
    if let Some(bucket) = chosen.filter(|_| chosen != current) {
        state.select_bucket(bucket);
    }

    let Some(bucket) = state.selected_bucket else {
        ui.label("No variance bucket is present in the filtered rows.");
        return;
    };

    ui.add_space(6.0);
    ui.label(RichText::new(format!("Store Count for Variance Bucket: {bucket}")).strong());
    ui.add_space(4.0);
    pivot_table(ui, &state.pivot);
}

fn pivot_table(ui: &mut Ui, pivot: &StorePivot) {
    if pivot.is_empty() {
        ui.label("No stores with a month and revenue range in this bucket.");
        return;
    }

    let totals = pivot.row_totals();
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(90.0))
        .columns(Column::auto().at_least(60.0), pivot.ranges.len() + 1)
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("MONTH");
            });
            for range in &pivot.ranges {
                header.col(|ui| {
                    ui.strong(range.label());
                });
            }
            header.col(|ui| {
                ui.strong("Total");
            });
        })
        .body(|mut body| {
            for ((month, counts), total) in pivot.months.iter().zip(&pivot.counts).zip(&totals) {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(month.to_string());
                    });
                    for count in counts {
                        row.col(|ui| {
                            ui.label(count.to_string());
                        });
                    }
                    row.col(|ui| {
                        ui.strong(total.to_string());
                    });
                });
            }
        });
}
