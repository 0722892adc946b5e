use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sector vocabulary
// ---------------------------------------------------------------------------

/// Sentinel sector choice meaning "no sector constraint".
pub const ALL_SECTORS: &str = "All";

/// Sector assigned to rows whose source sector cell is empty.
pub const UNCLASSIFIED_SECTOR: &str = "Unclassified";

/// Built-in sector choices offered before any table-specific sectors.
pub const KNOWN_SECTORS: [&str; 5] = [
    "Technology",
    "Healthcare",
    "Financial Services",
    "Consumer Defensive",
    "Energy",
];

// ---------------------------------------------------------------------------
// MarketCapBracket – market-capitalisation tiers
// ---------------------------------------------------------------------------

/// Lower bound (inclusive) of the large-cap tier: 10 billion.
pub const LARGE_CAP_MIN: f64 = 10e9;

/// Lower bound (inclusive) of the mid-cap tier: 2 billion.
pub const MID_CAP_MIN: f64 = 2e9;

/// Market-capitalisation tier used as a filter criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketCapBracket {
    #[default]
    All,
    /// `market_cap >= 10e9`
    Large,
    /// `2e9 <= market_cap < 10e9`
    Mid,
    /// `market_cap < 2e9`
    Small,
}

impl MarketCapBracket {
    /// Every bracket in display order.
    pub const ALL: [MarketCapBracket; 4] = [
        MarketCapBracket::All,
        MarketCapBracket::Large,
        MarketCapBracket::Mid,
        MarketCapBracket::Small,
    ];

    /// Whether a company with the given market cap falls in this bracket.
    pub fn contains(self, market_cap: f64) -> bool {
        match self {
            MarketCapBracket::All => true,
            MarketCapBracket::Large => market_cap >= LARGE_CAP_MIN,
            MarketCapBracket::Mid => market_cap >= MID_CAP_MIN && market_cap < LARGE_CAP_MIN,
            MarketCapBracket::Small => market_cap < MID_CAP_MIN,
        }
    }

    /// Label shown in the bracket selector.
    pub fn label(self) -> &'static str {
        match self {
            MarketCapBracket::All => "All",
            MarketCapBracket::Large => "Large Cap (>10B)",
            MarketCapBracket::Mid => "Mid Cap (2B-10B)",
            MarketCapBracket::Small => "Small Cap (<2B)",
        }
    }
}

impl fmt::Display for MarketCapBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CompanyRecord – one row of the table
// ---------------------------------------------------------------------------

/// A single listed company with normalised financials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Sector")]
    pub sector: String,
    /// Absolute currency units.
    #[serde(rename = "Market Cap")]
    pub market_cap: f64,
    /// May be zero or negative for loss-making companies.
    #[serde(rename = "PE Ratio")]
    pub pe_ratio: f64,
    /// Percentage on a 0–100 scale.
    #[serde(rename = "Dividend Yield")]
    pub dividend_yield: f64,
}

impl CompanyRecord {
    pub fn new(
        ticker: impl Into<String>,
        company: impl Into<String>,
        sector: impl Into<String>,
        market_cap: f64,
        pe_ratio: f64,
        dividend_yield: f64,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            company: company.into(),
            sector: sector.into(),
            market_cap,
            pe_ratio,
            dividend_yield,
        }
    }

    pub fn bracket(&self) -> MarketCapBracket {
        [
            MarketCapBracket::Large,
            MarketCapBracket::Mid,
            MarketCapBracket::Small,
        ]
        .into_iter()
        .find(|b| b.contains(self.market_cap))
        .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// CompaniesTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Ordered sequence of companies. Row order is the source order; duplicate
/// tickers are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompaniesTable {
    records: Vec<CompanyRecord>,
}

impl CompaniesTable {
    pub fn new(records: Vec<CompanyRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CompanyRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompanyRecord> {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&CompanyRecord> {
        self.records.get(index)
    }

    /// Number of companies.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tickers in row order.
    pub fn tickers(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.ticker.as_str()).collect()
    }

    /// Distinct sectors in order of first appearance.
    pub fn sectors(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.sector.as_str()) {
                seen.push(&record.sector);
            }
        }
        seen
    }
}

impl From<Vec<CompanyRecord>> for CompaniesTable {
    fn from(records: Vec<CompanyRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<CompanyRecord> for CompaniesTable {
    fn from_iter<I: IntoIterator<Item = CompanyRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CompaniesTable {
    type Item = &'a CompanyRecord;
    type IntoIter = std::slice::Iter<'a, CompanyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
