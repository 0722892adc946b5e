//! Single-ticker snapshot and price history.
//!
//! Independent of the companies table: a failed lookup is reported to the
//! user and leaves the screening state untouched.

pub mod yahoo;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format;

pub use yahoo::YahooMarketData;

/// Why a lookup produced no snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("please enter a ticker symbol")]
    EmptyTicker,

    #[error("no quote found for {0}, check the symbol")]
    UnknownTicker(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("provider response is missing {0}")]
    MissingField(&'static str),

    #[error("market-data provider error: {0}")]
    Provider(String),
}

impl From<yahoo_finance_api::YahooError> for LookupError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        use yahoo_finance_api::YahooError as Y;
        match err {
            Y::ConnectionFailed(_) | Y::FetchFailed(_) | Y::NoResponse | Y::TooManyRequests(_) => {
                Self::Network(err.to_string())
            }
            Y::MissingField(field) => Self::Provider(format!("missing {field}")),
            other => Self::Provider(other.to_string()),
        }
    }
}

/// One daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Live figures for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub ticker: String,
    pub long_name: String,
    pub market_cap: f64,
    pub trailing_pe: Option<f64>,
    /// Fraction on a 0–1 scale, as reported by the provider.
    pub dividend_yield: Option<f64>,
    pub sector: Option<String>,
    /// Daily closes, oldest first.
    pub history: Vec<PricePoint>,
}

impl TickerSnapshot {
    pub fn title(&self) -> String {
        format!("{} ({})", self.long_name, self.ticker)
    }

    /// `(label, value)` pairs for the metrics panel.
    pub fn metrics(&self) -> [(&'static str, String); 4] {
        [
            ("Market Cap", format::market_cap(self.market_cap)),
            ("P/E Ratio", format::optional_ratio(self.trailing_pe)),
            ("Dividend Yield", format::fraction_as_percent(self.dividend_yield)),
            ("Sector", format::optional_text(self.sector.as_deref())),
        ]
    }

    pub fn last_close(&self) -> Option<f64> {
        self.history.last().map(|p| p.close)
    }
}

/// A provider of live ticker data.
pub trait MarketData {
    /// Look up an already normalised ticker.
    fn snapshot(&self, ticker: &str) -> Result<TickerSnapshot, LookupError>;
}

/// Trim and uppercase user input; `None` when nothing is left.
pub fn normalize_ticker(input: &str) -> Option<String> {
    let ticker = input.trim().to_ascii_uppercase();
    (!ticker.is_empty()).then_some(ticker)
}

/// Normalise `input` and ask `provider` for its snapshot.
pub fn lookup(provider: &dyn MarketData, input: &str) -> Result<TickerSnapshot, LookupError> {
    let ticker = normalize_ticker(input).ok_or(LookupError::EmptyTicker)?;
    log::info!("Looking up {ticker}");
    match provider.snapshot(&ticker) {
        Ok(snapshot) => {
            log::debug!(
                "{ticker}: {} closes, last {:?}",
                snapshot.history.len(),
                snapshot.last_close()
            );
            Ok(snapshot)
        }
        Err(e) => {
            log::warn!("Lookup of {ticker} failed: {e}");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct StubProvider {
        seen: RefCell<Vec<String>>,
    }

    impl MarketData for StubProvider {
        fn snapshot(&self, ticker: &str) -> Result<TickerSnapshot, LookupError> {
            self.seen.borrow_mut().push(ticker.to_string());
            match ticker {
                "AAPL" => Ok(apple()),
                other => Err(LookupError::UnknownTicker(other.to_string())),
            }
        }
    }

    fn apple() -> TickerSnapshot {
        TickerSnapshot {
            ticker: "AAPL".to_string(),
            long_name: "Apple Inc.".to_string(),
            market_cap: 2_500_000_000_000.0,
            trailing_pe: Some(28.5),
            dividend_yield: Some(0.0055),
            sector: Some("Technology".to_string()),
            history: vec![
                PricePoint {
                    date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
                    close: 170.0,
                },
                PricePoint {
                    date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
                    close: 172.5,
                },
            ],
        }
    }

    fn stub() -> StubProvider {
        StubProvider {
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn input_is_trimmed_and_uppercased() {
        let provider = stub();
        let snapshot = lookup(&provider, "  aapl ").unwrap();
        assert_eq!(snapshot.title(), "Apple Inc. (AAPL)");
        assert_eq!(provider.seen.borrow().as_slice(), ["AAPL"]);
    }

    #[test]
    fn blank_input_never_reaches_the_provider() {
        let provider = stub();
        assert_eq!(lookup(&provider, "   "), Err(LookupError::EmptyTicker));
        assert!(provider.seen.borrow().is_empty());
    }

    #[test]
    fn unknown_ticker_is_a_typed_error() {
        let err = lookup(&stub(), "zzzz").unwrap_err();
        assert_eq!(err, LookupError::UnknownTicker("ZZZZ".to_string()));
        assert_eq!(err.to_string(), "no quote found for ZZZZ, check the symbol");
    }

    #[test]
    fn metrics_are_formatted_for_display() {
        let mut snapshot = apple();
        assert_eq!(
            snapshot.metrics(),
            [
                ("Market Cap", "$ 2,500,000,000,000".to_string()),
                ("P/E Ratio", "28.50".to_string()),
                ("Dividend Yield", "0.55%".to_string()),
                ("Sector", "Technology".to_string()),
            ]
        );
        assert_eq!(snapshot.last_close(), Some(172.5));

        snapshot.trailing_pe = None;
        snapshot.dividend_yield = None;
        snapshot.sector = None;
        let metrics = snapshot.metrics();
        assert_eq!(metrics[1].1, "N/A");
        assert_eq!(metrics[2].1, "0.00%");
        assert_eq!(metrics[3].1, "N/A");
    }

    #[test]
    fn provider_failures_split_into_network_and_provider() {
        use yahoo_finance_api::YahooError;
        assert!(matches!(
            LookupError::from(YahooError::NoResponse),
            LookupError::Network(_)
        ));
        assert!(matches!(
            LookupError::from(YahooError::TooManyRequests("quote".to_string())),
            LookupError::Network(_)
        ));
        assert!(matches!(
            LookupError::from(YahooError::InvalidCrumb),
            LookupError::Provider(_)
        ));
    }
}
