use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Line, Plot, PlotPoints};

use crate::lookup::TickerSnapshot;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Ticker snapshot (bottom panel)
// ---------------------------------------------------------------------------

/// Render the last lookup: metrics plus the closing-price chart.
pub fn ticker_panel(ui: &mut Ui, state: &AppState) {
    match &state.lookup {
        None => {
            ui.label("Enter a ticker in the sidebar to see its snapshot and six-month chart.");
        }
        Some(Err(err)) => {
            ui.label(RichText::new(format!("Lookup failed: {err}")).color(Color32::RED));
        }
        Some(Ok(snapshot)) => {
            ui.heading(snapshot.title());
            metrics_grid(ui, snapshot);
            ui.separator();
            price_chart(ui, snapshot);
        }
    }
}

fn metrics_grid(ui: &mut Ui, snapshot: &TickerSnapshot) {
    let metrics = snapshot.metrics();
    ui.columns(2, |cols| {
        for (i, (label, value)) in metrics.iter().enumerate() {
            let col = &mut cols[i / 2];
            col.label(RichText::new(*label).small());
            col.label(RichText::new(value).heading());
        }
    });
}

/// Days since the common era, used as the chart's x coordinate.
fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn price_chart(ui: &mut Ui, snapshot: &TickerSnapshot) {
    if snapshot.history.is_empty() {
        ui.label("No price history returned for this ticker.");
        return;
    }

    let first = snapshot.history[0].date;
    let points: PlotPoints = snapshot
        .history
        .iter()
        .map(|p| [day_number(p.date) - day_number(first), p.close])
        .collect();

    Plot::new("price_history")
        .legend(egui_plot::Legend::default())
        .x_axis_label(format!("Days since {first}"))
        .y_axis_label("Close")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let line = Line::new(points)
                .name(&snapshot.ticker)
                .color(Color32::LIGHT_BLUE)
                .width(1.5);
            plot_ui.line(line);
        });
}
