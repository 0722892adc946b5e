use crate::color::ColorMap;
use crate::config::Config;
use crate::data::filter::FilterCriteria;
use crate::data::loader::CachedLoader;
use crate::data::model::{ALL_SECTORS, CompaniesTable, CompanyRecord};
use crate::data::source::{DatasetSource, SourceSpec};
use crate::lookup::{self, LookupError, MarketData, TickerSnapshot, YahooMarketData};
use crate::session::Session;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,

    /// Where the current session's table comes from.
    pub source: SourceSpec,

    loader: Option<CachedLoader<Box<dyn DatasetSource>>>,

    /// Loaded session (None until a load succeeds).
    pub session: Option<Session>,

    /// Fatal load error; filtering is unavailable while set.
    pub load_error: Option<String>,

    /// Criteria behind `result`.
    pub criteria: FilterCriteria,

    /// Rows passing `criteria` (cached).
    pub result: CompaniesTable,

    /// Set when `criteria` fails validation; `result` is then empty.
    pub criteria_error: Option<String>,

    /// Sector colours for the results table.
    pub color_map: Option<ColorMap>,

    /// Free-text ticker box.
    pub ticker_input: String,

    /// Outcome of the last ticker lookup.
    pub lookup: Option<Result<TickerSnapshot, LookupError>>,

    market_data: Option<Box<dyn MarketData>>,
}

impl AppState {
    /// Build the state and open the configured session.
    pub fn new(config: Config) -> Self {
        let market_data: Option<Box<dyn MarketData>> =
            match YahooMarketData::new(config.http_timeout(), config.history_days) {
                Ok(provider) => Some(Box::new(provider)),
                Err(e) => {
                    log::warn!("Ticker lookup unavailable: {e}");
                    None
                }
            };
        let mut state = Self::with_market_data(config, market_data);
        state.reload();
        state
    }

    /// Build the state without opening a session.
    pub fn with_market_data(config: Config, market_data: Option<Box<dyn MarketData>>) -> Self {
        Self {
            source: config.source_spec(),
            config,
            loader: None,
            session: None,
            load_error: None,
            criteria: FilterCriteria::default(),
            result: CompaniesTable::default(),
            criteria_error: None,
            color_map: None,
            ticker_input: String::new(),
            lookup: None,
            market_data,
        }
    }

    /// Switch to a different source and open a fresh session over it.
    pub fn set_source(&mut self, source: SourceSpec) {
        self.source = source;
        self.loader = None;
        self.reload();
    }

    /// Drop the cached table and load the current source again.
    pub fn reload(&mut self) {
        if let Some(loader) = &self.loader {
            loader.invalidate();
        } else {
            match self.source.open(self.config.http_timeout()) {
                Ok(source) => self.loader = Some(CachedLoader::new(source)),
                Err(e) => {
                    self.fail_load(e.to_string());
                    return;
                }
            }
        }

        let opened = match &self.loader {
            Some(loader) => Session::open(loader),
            None => return,
        };
        match opened {
            Ok(session) => self.set_session(session),
            Err(e) => self.fail_load(e.to_string()),
        }
    }

    fn fail_load(&mut self, message: String) {
        log::error!("Failed to load companies from {}: {message}", self.source);
        self.session = None;
        self.result = CompaniesTable::default();
        self.color_map = None;
        self.load_error = Some(message);
    }

    /// Ingest a newly opened session and rerun the current query.
    pub fn set_session(&mut self, session: Session) {
        self.color_map = Some(ColorMap::new(session.table().sectors()));
        self.session = Some(session);
        self.load_error = None;
        self.refilter();
    }

    /// Replace the criteria; reruns the query only when they changed.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if criteria != self.criteria {
            self.criteria = criteria;
            self.refilter();
        }
    }

    /// Recompute `result` from the session and criteria.
    pub fn refilter(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        match self.criteria.validate() {
            Ok(()) => {
                self.result = session.query(&self.criteria);
                self.criteria_error = None;
                log::debug!(
                    "{} of {} companies match",
                    self.result.len(),
                    session.table().len()
                );
            }
            Err(e) => {
                self.result = CompaniesTable::default();
                self.criteria_error = Some(e.to_string());
            }
        }
    }

    /// Rows to render, capped at the display limit.
    pub fn visible_rows(&self) -> &[CompanyRecord] {
        let rows = self.result.records();
        &rows[..rows.len().min(self.config.display_limit)]
    }

    /// Sector choices for the selector; just "All" before a load.
    pub fn sector_choices(&self) -> Vec<String> {
        self.session
            .as_ref()
            .map(Session::sector_choices)
            .unwrap_or_else(|| vec![ALL_SECTORS.to_string()])
    }

    /// Look up `ticker_input`. Never touches the table or criteria.
    pub fn run_lookup(&mut self) {
        let outcome = match &self.market_data {
            Some(provider) => lookup::lookup(provider.as_ref(), &self.ticker_input),
            None => Err(LookupError::Provider(
                "market-data client is unavailable".to_string(),
            )),
        };
        self.lookup = Some(outcome);
    }

    pub fn clear_lookup(&mut self) {
        self.lookup = None;
    }
}
