use eframe::egui::{Align, Color32, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::format;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Screening results (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered companies table.
pub fn results_table(ui: &mut Ui, state: &AppState) {
    ui.heading("Screening results");

    if let Some(err) = &state.load_error {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(RichText::new(format!("Could not load the companies dataset: {err}")).color(Color32::RED));
        });
        return;
    }
    if state.session.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to start screening  (File → Open…)");
        });
        return;
    }
    if let Some(err) = &state.criteria_error {
        ui.label(RichText::new(err).color(Color32::YELLOW));
        return;
    }

    let rows = state.visible_rows();
    if rows.is_empty() {
        ui.label("No companies match the current filters.");
        return;
    }
    ui.label(format!("Showing {} of {} matches", rows.len(), state.result.len()));
    ui.separator();

    let right = Layout::right_to_left(Align::Center);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder().at_least(160.0).clip(true))
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(170.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(90.0))
        .header(ROW_HEIGHT, |mut header| {
            for title in ["Ticker", "Company", "Sector", "Market Cap", "PE Ratio", "Dividend Yield"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let record = &rows[row.index()];
                row.col(|ui| {
                    ui.monospace(&record.ticker);
                });
                row.col(|ui| {
                    ui.label(&record.company);
                });
                row.col(|ui| {
                    let mut text = RichText::new(&record.sector);
                    if let Some(cm) = &state.color_map {
                        text = text.color(cm.color_for(&record.sector));
                    }
                    ui.label(text);
                });
                row.col(|ui| {
                    ui.with_layout(right, |ui| ui.label(format::market_cap(record.market_cap)));
                });
                row.col(|ui| {
                    ui.with_layout(right, |ui| ui.label(format::ratio(record.pe_ratio)));
                });
                row.col(|ui| {
                    ui.with_layout(right, |ui| ui.label(format::percent(record.dividend_yield)));
                });
            });
        });
}
