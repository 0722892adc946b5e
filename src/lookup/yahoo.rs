//! Yahoo Finance implementation of [`MarketData`].

use std::cell::RefCell;
use std::time::Duration;

use chrono::DateTime;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

use super::{LookupError, MarketData, PricePoint, TickerSnapshot};

/// Snapshot fields without price history.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSummary {
    pub long_name: String,
    pub market_cap: f64,
    pub trailing_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub sector: Option<String>,
}

/// Pull the snapshot fields out of a quoteSummary answer for `ticker`.
pub fn quote_summary(
    ticker: &str,
    response: yahoo::YQuoteSummary,
) -> Result<QuoteSummary, LookupError> {
    if let Some(err) = response.finance.and_then(|f| f.error) {
        return Err(LookupError::Provider(
            err.description
                .or(err.code)
                .unwrap_or_else(|| "unspecified error".to_string()),
        ));
    }

    let body = response
        .quote_summary
        .ok_or_else(|| LookupError::UnknownTicker(ticker.to_string()))?;
    if let Some(err) = body.error {
        log::debug!(
            "quoteSummary error for {ticker}: {:?} {:?}",
            err.code,
            err.description
        );
        return Err(LookupError::UnknownTicker(ticker.to_string()));
    }
    let data = body
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| LookupError::UnknownTicker(ticker.to_string()))?;

    let long_name = data
        .quote_type
        .and_then(|q| q.long_name.or(q.short_name))
        .filter(|n| !n.trim().is_empty())
        .ok_or(LookupError::MissingField("longName"))?;
    let detail = data.summary_detail;
    let market_cap = detail
        .as_ref()
        .and_then(|d| d.market_cap)
        .ok_or(LookupError::MissingField("marketCap"))? as f64;

    // "Infinity" P/E comes through as a non-finite float.
    let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
    Ok(QuoteSummary {
        long_name,
        market_cap,
        trailing_pe: finite(detail.as_ref().and_then(|d| d.trailing_pe)),
        dividend_yield: finite(detail.as_ref().and_then(|d| d.dividend_yield)),
        sector: data
            .asset_profile
            .and_then(|a| a.sector)
            .filter(|s| !s.is_empty()),
    })
}

/// Daily closes from a chart answer, oldest first. Bars without a close are
/// skipped; a chart with no bars at all is an empty history.
pub fn price_history(response: &yahoo::YResponse) -> Result<Vec<PricePoint>, LookupError> {
    if response.chart.result.is_none() {
        if let Some(err) = &response.chart.error {
            return Err(LookupError::Provider(format!(
                "chart error {:?}: {:?}",
                err.code, err.description
            )));
        }
    }

    let quotes = match response.quotes() {
        Ok(quotes) => quotes,
        Err(yahoo::YahooError::NoQuotes) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let mut history: Vec<PricePoint> = quotes
        .iter()
        .filter_map(|q| {
            let date = DateTime::from_timestamp(q.timestamp, 0)?.date_naive();
            Some(PricePoint {
                date,
                close: q.close,
            })
        })
        .collect();
    history.sort_by_key(|p| p.date);
    Ok(history)
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Blocking Yahoo Finance client: quoteSummary for the snapshot, chart API
/// for daily closes.
pub struct YahooMarketData {
    // quoteSummary needs `&mut` to refresh its cookie and crumb.
    connector: RefCell<yahoo::YahooConnector>,
    history_days: i64,
}

impl std::fmt::Debug for YahooMarketData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooMarketData")
            .field("history_days", &self.history_days)
            .finish_non_exhaustive()
    }
}

impl YahooMarketData {
    pub fn new(timeout: Duration, history_days: i64) -> Result<Self, LookupError> {
        let connector = yahoo::YahooConnector::builder().timeout(timeout).build()?;
        Ok(Self {
            connector: RefCell::new(connector),
            history_days,
        })
    }

    fn fetch_summary(&self, ticker: &str) -> Result<QuoteSummary, LookupError> {
        let response = self.connector.borrow_mut().get_ticker_info(ticker)?;
        quote_summary(ticker, response)
    }

    fn fetch_history(&self, ticker: &str) -> Result<Vec<PricePoint>, LookupError> {
        let end = OffsetDateTime::now_utc();
        let start = end - time::Duration::days(self.history_days);
        let response = self.connector.borrow().get_quote_history(ticker, start, end)?;
        price_history(&response)
    }
}

/// Join the two halves of a lookup.
fn assemble(ticker: &str, summary: QuoteSummary, history: Vec<PricePoint>) -> TickerSnapshot {
    TickerSnapshot {
        ticker: ticker.to_string(),
        long_name: summary.long_name,
        market_cap: summary.market_cap,
        trailing_pe: summary.trailing_pe,
        dividend_yield: summary.dividend_yield,
        sector: summary.sector,
        history,
    }
}

impl MarketData for YahooMarketData {
    fn snapshot(&self, ticker: &str) -> Result<TickerSnapshot, LookupError> {
        let summary = self.fetch_summary(ticker)?;
        let history = self.fetch_history(ticker)?;
        Ok(assemble(ticker, summary, history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn summary_json(body: &str) -> yahoo::YQuoteSummary {
        yahoo::YQuoteSummary::from_json(serde_json::from_str(body).unwrap()).unwrap()
    }

    fn chart_json(body: &str) -> yahoo::YResponse {
        yahoo::YResponse::from_json(serde_json::from_str(body).unwrap()).unwrap()
    }

    const APPLE: &str = r#"{"quoteSummary":{"result":[{
        "quoteType":{"symbol":"AAPL","shortName":"Apple","longName":"Apple Inc."},
        "summaryDetail":{"marketCap":2500000000000,"trailingPE":28.5,"dividendYield":0.0055},
        "assetProfile":{"sector":"Technology","industry":"Consumer Electronics","companyOfficers":[]}
    }],"error":null}}"#;

    const META: &str = r#"{
        "currency":"USD","symbol":"AAPL","instrumentType":"EQUITY",
        "exchangeName":"NMS","fullExchangeName":"NasdaqGS",
        "gmtoffset":-18000,"timezone":"EST","exchangeTimezoneName":"America/New_York",
        "hasPrePostMarketData":true,"priceHint":2,
        "currentTradingPeriod":{
            "pre":{"timezone":"EST","start":1767344400,"end":1767364200,"gmtoffset":-18000},
            "regular":{"timezone":"EST","start":1767364200,"end":1767387600,"gmtoffset":-18000},
            "post":{"timezone":"EST","start":1767387600,"end":1767402000,"gmtoffset":-18000}},
        "dataGranularity":"1d","range":"","validRanges":["1d","5d","1mo"]}"#;

    fn chart(timestamps: &str, closes: &str) -> yahoo::YResponse {
        let n = closes.split(',').count();
        let filler = vec!["1.0"; n].join(",");
        let volume = vec!["100"; n].join(",");
        chart_json(&format!(
            r#"{{"chart":{{"result":[{{"meta":{META},"timestamp":[{timestamps}],
                "indicators":{{"quote":[{{"open":[{filler}],"high":[{filler}],"low":[{filler}],
                "volume":[{volume}],"close":[{closes}]}}]}}}}],"error":null}}}}"#
        ))
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn full_summary_is_decoded() {
        let summary = quote_summary("AAPL", summary_json(APPLE)).unwrap();
        assert_eq!(
            summary,
            QuoteSummary {
                long_name: "Apple Inc.".to_string(),
                market_cap: 2.5e12,
                trailing_pe: Some(28.5),
                dividend_yield: Some(0.0055),
                sector: Some("Technology".to_string()),
            }
        );
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let body = r#"{"quoteSummary":{"result":[{
            "quoteType":{"shortName":"Amazon.com, Inc."},
            "summaryDetail":{"marketCap":1900000000000,"trailingPE":"Infinity"}
        }],"error":null}}"#;
        let summary = quote_summary("AMZN", summary_json(body)).unwrap();
        assert_eq!(summary.long_name, "Amazon.com, Inc.");
        assert_eq!(summary.market_cap, 1.9e12);
        assert_eq!(summary.trailing_pe, None);
        assert_eq!(summary.dividend_yield, None);
        assert_eq!(summary.sector, None);
    }

    #[rstest]
    #[case::not_found(r#"{"quoteSummary":{"result":null,"error":{
        "code":"Not Found","description":"Quote not found for symbol: ZZZZ"}}}"#)]
    #[case::empty_result(r#"{"quoteSummary":{"result":[],"error":null}}"#)]
    fn unanswered_summary_means_unknown_ticker(#[case] body: &str) {
        assert_eq!(
            quote_summary("ZZZZ", summary_json(body)),
            Err(LookupError::UnknownTicker("ZZZZ".to_string()))
        );
    }

    #[test]
    fn rejected_crumb_is_a_provider_error() {
        let body = r#"{"finance":{"result":null,"error":{
            "code":"Unauthorized","description":"Invalid Crumb"}}}"#;
        assert_eq!(
            quote_summary("AAPL", summary_json(body)),
            Err(LookupError::Provider("Invalid Crumb".to_string()))
        );
    }

    #[test]
    fn missing_name_or_cap_is_reported() {
        let no_name = r#"{"quoteSummary":{"result":[{
            "summaryDetail":{"marketCap":1}}],"error":null}}"#;
        assert_eq!(
            quote_summary("X", summary_json(no_name)),
            Err(LookupError::MissingField("longName"))
        );
        let no_cap = r#"{"quoteSummary":{"result":[{
            "quoteType":{"longName":"X Corp"}}],"error":null}}"#;
        assert_eq!(
            quote_summary("X", summary_json(no_cap)),
            Err(LookupError::MissingField("marketCap"))
        );
    }

    #[test]
    fn closes_become_dated_points_oldest_first() {
        // Tue 6th, Fri 2nd, Mon 5th; the bar on the 5th has no close.
        let response = chart("1767709800,1767364200,1767623400", "251.5,243.25,null");
        let history = price_history(&response).unwrap();
        assert_eq!(
            history,
            vec![
                PricePoint {
                    date: day(2),
                    close: 243.25,
                },
                PricePoint {
                    date: day(6),
                    close: 251.5,
                },
            ]
        );
    }

    #[test]
    fn chart_without_bars_is_an_empty_history() {
        let response = chart_json(&format!(
            r#"{{"chart":{{"result":[{{"meta":{META},"indicators":{{"quote":[{{}}]}}}}],"error":null}}}}"#
        ));
        assert_eq!(price_history(&response), Ok(Vec::new()));
    }

    #[test]
    fn chart_error_is_a_provider_error() {
        let response = chart_json(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#,
        );
        assert!(matches!(
            price_history(&response),
            Err(LookupError::Provider(_))
        ));
    }

    #[test]
    fn summary_and_history_assemble_into_a_snapshot() {
        let summary = quote_summary("AAPL", summary_json(APPLE)).unwrap();
        let history = price_history(&chart("1767364200,1767623400", "243.25,245.0")).unwrap();
        let snapshot = assemble("AAPL", summary, history);

        assert_eq!(snapshot.title(), "Apple Inc. (AAPL)");
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.history[0].date, day(2));
        assert_eq!(snapshot.last_close(), Some(245.0));
        assert_eq!(snapshot.metrics()[2].1, "0.55%");
    }
}
