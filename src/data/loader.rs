use std::cell::RefCell;
use std::io::Read;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::error::{DataError, Result};
use super::model::{CompaniesTable, CompanyRecord, UNCLASSIFIED_SECTOR};
use super::source::{DatasetSource, RawDataset, SourceFormat};

// ---------------------------------------------------------------------------
// Source schema
// ---------------------------------------------------------------------------

pub const SYMBOL_COLUMN: &str = "Symbol";
pub const NAME_COLUMN: &str = "Name";
pub const SECTOR_COLUMN: &str = "Sector";
pub const MARKET_CAP_COLUMN: &str = "Market Cap";
pub const PE_COLUMN: &str = "Price/Earnings";
pub const DIVIDEND_COLUMN: &str = "Dividend Yield";

/// Columns a source must provide; extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    SYMBOL_COLUMN,
    NAME_COLUMN,
    SECTOR_COLUMN,
    MARKET_CAP_COLUMN,
    PE_COLUMN,
    DIVIDEND_COLUMN,
];

/// One source row before numeric coercion.
#[derive(Debug, Default)]
struct RawRow<'a> {
    symbol: &'a str,
    name: &'a str,
    sector: &'a str,
    market_cap: Option<f64>,
    pe_ratio: Option<f64>,
    dividend_yield: Option<f64>,
}

impl RawRow<'_> {
    /// The record, or why the row is dropped. Negative P/E is a real
    /// reading and passes through.
    fn normalize(&self) -> std::result::Result<CompanyRecord, &'static str> {
        if self.symbol.is_empty() {
            return Err("no ticker");
        }
        let (Some(market_cap), Some(pe_ratio), Some(dividend_yield)) =
            (self.market_cap, self.pe_ratio, self.dividend_yield)
        else {
            return Err("incomplete financials");
        };
        if market_cap < 0.0 || dividend_yield < 0.0 {
            return Err("negative market cap or dividend yield");
        }
        let sector = if self.sector.is_empty() {
            UNCLASSIFIED_SECTOR
        } else {
            self.sector
        };
        Ok(CompanyRecord::new(
            self.symbol,
            self.name,
            sector,
            market_cap,
            pe_ratio,
            dividend_yield,
        ))
    }
}

/// Collects normalised rows and counts the dropped ones.
#[derive(Debug, Default)]
struct RowSink {
    records: Vec<CompanyRecord>,
    dropped: usize,
}

impl RowSink {
    fn push(&mut self, raw: &RawRow<'_>, origin: std::fmt::Arguments<'_>) {
        match raw.normalize() {
            Ok(record) => self.records.push(record),
            Err(reason) => {
                log::debug!("Dropping {origin} ({:?}): {reason}", raw.symbol);
                self.dropped += 1;
            }
        }
    }

    fn finish(self) -> CompaniesTable {
        if self.dropped > 0 {
            log::info!(
                "Dropped {} rows with incomplete financial data",
                self.dropped
            );
        }
        CompaniesTable::new(self.records)
    }
}

/// Empty, non-numeric and non-finite cells all count as missing.
fn parse_number(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn missing_columns(present: impl Fn(&str) -> bool) -> Vec<String> {
    REQUIRED_COLUMNS
        .into_iter()
        .filter(|&col| !present(col))
        .map(|col| col.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Decode and normalise a fetched dataset.
pub fn parse_dataset(raw: &RawDataset) -> Result<CompaniesTable> {
    match raw.format {
        SourceFormat::Csv => parse_csv(raw.bytes.as_slice()),
        SourceFormat::Json => {
            let text = std::str::from_utf8(&raw.bytes)
                .map_err(|e| DataError::Malformed(format!("JSON is not UTF-8: {e}")))?;
            parse_json(text)
        }
    }
}

/// Fetch from `source` and normalise, without caching.
pub fn load_from(source: &dyn DatasetSource) -> Result<CompaniesTable> {
    let raw = source.fetch()?;
    let table = parse_dataset(&raw)?;
    log::info!(
        "Loaded {} companies from {}",
        table.len(),
        source.describe()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with at least the [`REQUIRED_COLUMNS`]; column
/// order does not matter.
pub fn parse_csv<R: Read>(reader: R) -> Result<CompaniesTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let missing = missing_columns(|col| position(col).is_some());
    if !missing.is_empty() {
        return Err(DataError::MissingColumns { columns: missing });
    }
    // All present, checked above.
    let idx: Vec<usize> = REQUIRED_COLUMNS
        .into_iter()
        .filter_map(position)
        .collect();

    let mut sink = RowSink::default();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.map_err(|e| {
            DataError::Malformed(format!("CSV row {}: {e}", row_no + 1))
        })?;
        let cell = |i: usize| row.get(idx[i]).unwrap_or("");
        let raw = RawRow {
            symbol: cell(0),
            name: cell(1),
            sector: cell(2),
            market_cap: parse_number(cell(3)),
            pe_ratio: parse_number(cell(4)),
            dividend_yield: parse_number(cell(5)),
        };
        sink.push(&raw, format_args!("CSV row {}", row_no + 1));
    }

    Ok(sink.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, keyed by the source column names):
///
/// ```json
/// [
///   { "Symbol": "AAPL", "Name": "Apple Inc.", "Sector": "Technology",
///     "Market Cap": 2.5e12, "Price/Earnings": "28.5", "Dividend Yield": 0.55 }
/// ]
/// ```
///
/// Numeric fields may be numbers or numeric strings. A required column is
/// missing when no object carries that key.
pub fn parse_json(text: &str) -> Result<CompaniesTable> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root
        .as_array()
        .ok_or_else(|| DataError::Malformed("expected top-level JSON array".to_string()))?;

    let objects = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.as_object()
                .ok_or_else(|| DataError::Malformed(format!("row {i} is not a JSON object")))
        })
        .collect::<Result<Vec<_>>>()?;

    if !objects.is_empty() {
        let missing = missing_columns(|col| objects.iter().any(|o| o.contains_key(col)));
        if !missing.is_empty() {
            return Err(DataError::MissingColumns { columns: missing });
        }
    }

    let text_field = |obj: &serde_json::Map<String, JsonValue>, key: &str| -> String {
        match obj.get(key) {
            Some(JsonValue::String(s)) => s.trim().to_string(),
            Some(JsonValue::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    };
    let number_field = |obj: &serde_json::Map<String, JsonValue>, key: &str| -> Option<f64> {
        match obj.get(key)? {
            JsonValue::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            JsonValue::String(s) => parse_number(s),
            _ => None,
        }
    };

    let mut sink = RowSink::default();
    for (i, obj) in objects.iter().copied().enumerate() {
        let symbol = text_field(obj, SYMBOL_COLUMN);
        let name = text_field(obj, NAME_COLUMN);
        let sector = text_field(obj, SECTOR_COLUMN);
        let raw = RawRow {
            symbol: &symbol,
            name: &name,
            sector: &sector,
            market_cap: number_field(obj, MARKET_CAP_COLUMN),
            pe_ratio: number_field(obj, PE_COLUMN),
            dividend_yield: number_field(obj, DIVIDEND_COLUMN),
        };
        sink.push(&raw, format_args!("JSON row {i}"));
    }

    Ok(sink.finish())
}

// ---------------------------------------------------------------------------
// Cached loader
// ---------------------------------------------------------------------------

/// Loads a source once and hands out the same table until invalidated.
pub struct CachedLoader<S> {
    source: S,
    cache: RefCell<Option<Arc<CompaniesTable>>>,
}

impl<S: DatasetSource> CachedLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RefCell::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the cached table, fetching it on first use.
    pub fn load(&self) -> Result<Arc<CompaniesTable>> {
        if let Some(table) = self.cache.borrow().as_ref() {
            log::debug!("Reusing cached table from {}", self.source.describe());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_from(&self.source)?);
        *self.cache.borrow_mut() = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Forget the cached table; the next `load` fetches again.
    pub fn invalidate(&self) {
        self.cache.borrow_mut().take();
    }

    pub fn is_cached(&self) -> bool {
        self.cache.borrow().is_some()
    }
}

impl<S: DatasetSource> std::fmt::Debug for CachedLoader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedLoader")
            .field("source", &self.source.describe())
            .field("cached", &self.is_cached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::EmbeddedSample;
    use std::cell::Cell;

    const HEADER: &str = "Symbol,Name,Sector,Price,Price/Earnings,Dividend Yield,Market Cap\n";

    #[test]
    fn renames_and_coerces_columns() {
        let csv = format!("{HEADER}AAPL,Apple Inc.,Technology,189.8,28.5,0.55,2500000000000\n");
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            table.records(),
            &[CompanyRecord::new("AAPL", "Apple Inc.", "Technology", 2.5e12, 28.5, 0.55)]
        );
    }

    #[test]
    fn drops_rows_with_incomplete_financials() {
        let csv = format!(
            "{HEADER}\
             AAPL,Apple,Technology,1,28.5,0.55,2500000000000\n\
             NOPE,No PE,Technology,1,,0.55,2500000000000\n\
             NODV,No Div,Energy,1,10,,1000\n\
             NOMC,No Cap,Energy,1,10,1.0,\n\
             JUNK,Junk,Energy,1,n/a,1.0,1000\n\
             NANS,NaN,Energy,1,NaN,1.0,1000\n\
             XOM,Exxon,Energy,1,12.3,4.1,500000000000\n"
        );
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.tickers(), vec!["AAPL", "XOM"]);
    }

    #[test]
    fn negative_cap_or_yield_is_dropped_but_negative_pe_is_kept() {
        let csv = format!(
            "{HEADER}\
             NEG,Negative Cap,Energy,1,10,1.0,-5\n\
             NDV,Negative Yield,Energy,1,10,-1,1000\n\
             LOSS,Loss Maker,Energy,1,-12.5,0,1000\n"
        );
        assert_eq!(parse_csv(csv.as_bytes()).unwrap().tickers(), vec!["LOSS"]);

        let json = r#"[
            {"Symbol": "NEG", "Name": "N", "Sector": "Energy",
             "Market Cap": -5, "Price/Earnings": 10, "Dividend Yield": -1},
            {"Symbol": "LOSS", "Name": "L", "Sector": "Energy",
             "Market Cap": 1000, "Price/Earnings": -12.5, "Dividend Yield": 0}
        ]"#;
        assert_eq!(parse_json(json).unwrap().tickers(), vec!["LOSS"]);
    }

    #[test]
    fn sink_counts_every_kind_of_drop() {
        let row = |symbol, market_cap, pe_ratio| RawRow {
            symbol,
            name: "Co",
            sector: "",
            market_cap,
            pe_ratio,
            dividend_yield: Some(1.0),
        };
        let mut sink = RowSink::default();
        sink.push(&row("OK", Some(1e9), Some(10.0)), format_args!("row 1"));
        sink.push(&row("", Some(1e9), Some(10.0)), format_args!("row 2"));
        sink.push(&row("NOPE", Some(1e9), None), format_args!("row 3"));
        sink.push(&row("NEG", Some(-1.0), Some(10.0)), format_args!("row 4"));
        assert_eq!(sink.dropped, 3);

        let table = sink.finish();
        assert_eq!(table.tickers(), vec!["OK"]);
        assert_eq!(table.get(0).unwrap().sector, UNCLASSIFIED_SECTOR);
    }

    #[test]
    fn keeps_source_order_and_duplicates() {
        let csv = format!(
            "{HEADER}\
             ZZZ,Z,Energy,1,1,1,1\n\
             AAA,A,Energy,1,1,1,1\n\
             ZZZ,Z again,Energy,1,2,2,2\n"
        );
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.tickers(), vec!["ZZZ", "AAA", "ZZZ"]);
    }

    #[test]
    fn missing_required_columns_fail() {
        let csv = "Symbol,Name,Price/Earnings\nAAPL,Apple,28.5\n";
        match parse_csv(csv.as_bytes()) {
            Err(DataError::MissingColumns { columns }) => {
                assert_eq!(columns, vec!["Sector", "Market Cap", "Dividend Yield"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn header_whitespace_and_empty_sector_are_normalised() {
        let csv = " Symbol , Name , Sector , Market Cap , Price/Earnings , Dividend Yield \n\
                   T1 , Thing , , 5 , 6 , 7 \n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            table.records(),
            &[CompanyRecord::new("T1", "Thing", UNCLASSIFIED_SECTOR, 5.0, 6.0, 7.0)]
        );
    }

    #[test]
    fn header_only_is_an_empty_table() {
        let table = parse_csv(HEADER.as_bytes()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn json_records_accept_numbers_and_strings() {
        let json = r#"[
            {"Symbol": "AAPL", "Name": "Apple", "Sector": "Technology",
             "Market Cap": 2.5e12, "Price/Earnings": "28.5", "Dividend Yield": 0.55},
            {"Symbol": "PLTR", "Name": "Palantir", "Sector": "Technology",
             "Market Cap": 5.1e10, "Price/Earnings": null, "Dividend Yield": 0}
        ]"#;
        let table = parse_json(json).unwrap();
        assert_eq!(
            table.records(),
            &[CompanyRecord::new("AAPL", "Apple", "Technology", 2.5e12, 28.5, 0.55)]
        );
    }

    #[test]
    fn json_missing_column_fails() {
        let json = r#"[{"Symbol": "AAPL", "Name": "Apple", "Sector": "Technology"}]"#;
        assert!(matches!(
            parse_json(json),
            Err(DataError::MissingColumns { .. })
        ));
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(matches!(parse_json("{}"), Err(DataError::Malformed(_))));
        assert!(matches!(parse_json("[1, 2]"), Err(DataError::Malformed(_))));
        assert!(matches!(parse_json("not json"), Err(DataError::Json(_))));
    }

    #[test]
    fn embedded_sample_loads_and_drops_incomplete_rows() {
        let table = load_from(&EmbeddedSample).unwrap();
        assert_eq!(table.len(), 21);
        assert!(!table.tickers().contains(&"PLTR"));
        assert!(!table.tickers().contains(&"REI"));
        assert!(!table.tickers().contains(&"TTE"));
        assert_eq!(table.get(0).map(|r| r.ticker.as_str()), Some("AAPL"));
    }

    struct CountingSource {
        fetches: Cell<usize>,
    }

    impl DatasetSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        fn fetch(&self) -> Result<RawDataset> {
            self.fetches.set(self.fetches.get() + 1);
            EmbeddedSample.fetch()
        }
    }

    #[test]
    fn cached_loader_fetches_once_until_invalidated() {
        let loader = CachedLoader::new(CountingSource {
            fetches: Cell::new(0),
        });
        assert!(!loader.is_cached());

        let first = loader.load().unwrap();
        let second = loader.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.source().fetches.get(), 1);

        loader.invalidate();
        assert!(!loader.is_cached());
        loader.load().unwrap();
        assert_eq!(loader.source().fetches.get(), 2);
    }

    struct FailingSource;

    impl DatasetSource for FailingSource {
        fn describe(&self) -> String {
            "failing".to_string()
        }

        fn fetch(&self) -> Result<RawDataset> {
            Err(DataError::Http {
                url: "http://example.invalid/companies.csv".to_string(),
                status: 503,
            })
        }
    }

    #[test]
    fn failed_load_is_not_cached() {
        let loader = CachedLoader::new(FailingSource);
        assert!(matches!(loader.load(), Err(DataError::Http { status: 503, .. })));
        assert!(!loader.is_cached());
    }
}
