use eframe::egui::{self, Color32, RichText, Slider, Ui};

use crate::data::filter::FilterCriteria;
use crate::data::model::{ALL_SECTORS, MarketCapBracket};
use crate::data::source::SourceSpec;
use crate::state::AppState;

/// Slider extents for the P/E range.
const PE_SLIDER: std::ops::RangeInclusive<f64> = 0.0..=100.0;
/// Slider extents for the dividend-yield range (percent).
const DIVIDEND_SLIDER: std::ops::RangeInclusive<f64> = 0.0..=10.0;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets and ticker lookup
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if let Some(err) = state.load_error.clone() {
        ui.label(RichText::new("Companies dataset unavailable").strong());
        ui.label(RichText::new(err).color(Color32::RED));
        ui.add_space(4.0);
        if ui.button("Retry").clicked() {
            state.reload();
        }
    } else if state.session.is_some() {
        let criteria = criteria_controls(ui, state);
        state.set_criteria(criteria);
    } else {
        ui.label("No dataset loaded.");
    }

    ui.add_space(8.0);
    ui.separator();
    ticker_controls(ui, state);
}

/// Draw the four filter controls and return the criteria they now describe.
fn criteria_controls(ui: &mut Ui, state: &AppState) -> FilterCriteria {
    let current = &state.criteria;

    // ---- Sector ----
    ui.strong("Sector");
    let mut sector = current
        .sector
        .clone()
        .unwrap_or_else(|| ALL_SECTORS.to_string());
    egui::ComboBox::from_id_salt("sector")
        .selected_text(&sector)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for choice in state.sector_choices() {
                let mut text = RichText::new(&choice);
                if let Some(cm) = &state.color_map {
                    if choice != ALL_SECTORS {
                        text = text.color(cm.color_for(&choice));
                    }
                }
                if ui.selectable_label(sector == choice, text).clicked() {
                    sector = choice;
                }
            }
        });
    ui.add_space(6.0);

    // ---- P/E range ----
    ui.strong("P/E ratio");
    let (mut pe_min, mut pe_max) = (current.pe_min, current.pe_max);
    let min_moved = ui
        .add(Slider::new(&mut pe_min, PE_SLIDER).step_by(1.0).text("min"))
        .changed();
    ui.add(Slider::new(&mut pe_max, PE_SLIDER).step_by(1.0).text("max"));
    keep_ordered(&mut pe_min, &mut pe_max, min_moved);
    ui.add_space(6.0);

    // ---- Dividend yield range ----
    ui.strong("Dividend yield (%)");
    let (mut div_min, mut div_max) = (current.div_min, current.div_max);
    let min_moved = ui
        .add(Slider::new(&mut div_min, DIVIDEND_SLIDER).step_by(0.1).text("min"))
        .changed();
    ui.add(Slider::new(&mut div_max, DIVIDEND_SLIDER).step_by(0.1).text("max"));
    keep_ordered(&mut div_min, &mut div_max, min_moved);
    ui.add_space(6.0);

    // ---- Market-cap bracket ----
    ui.strong("Market cap");
    let mut bracket = current.bracket;
    egui::ComboBox::from_id_salt("bracket")
        .selected_text(bracket.label())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for option in MarketCapBracket::ALL {
                ui.selectable_value(&mut bracket, option, option.label());
            }
        });

    if ui.small_button("Reset filters").clicked() {
        return FilterCriteria::default();
    }

    FilterCriteria {
        sector: Some(sector),
        pe_min,
        pe_max,
        div_min,
        div_max,
        bracket,
    }
}

/// Drag one end of a range past the other and the other end follows.
fn keep_ordered(min: &mut f64, max: &mut f64, min_moved: bool) {
    if *min > *max {
        if min_moved {
            *max = *min;
        } else {
            *min = *max;
        }
    }
}

fn ticker_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Look up a ticker");
    let response = ui.add(
        egui::TextEdit::singleline(&mut state.ticker_input).hint_text("e.g. AAPL"),
    );
    let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Look up").clicked() || submitted {
            state.run_lookup();
        }
        if state.lookup.is_some() && ui.small_button("Clear").clicked() {
            state.clear_lookup();
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Use embedded sample").clicked() {
                state.set_source(SourceSpec::Embedded);
                ui.close_menu();
            }
            if ui.button("Use remote dataset").clicked() {
                state.set_source(SourceSpec::Remote(state.config.dataset_url.clone()));
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &state.session {
            ui.label(format!(
                "{} companies from {} (loaded {}), {} match",
                session.table().len(),
                session.source(),
                session.opened_at().format("%H:%M:%S"),
                state.result.len()
            ));
        }

        if let Some(msg) = &state.load_error {
            ui.label(RichText::new(format!("Error: {msg}")).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open companies dataset")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening companies dataset {}", path.display());
        state.set_source(SourceSpec::File(path));
    }
}
