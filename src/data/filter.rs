use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{ALL_SECTORS, CompaniesTable, CompanyRecord, MarketCapBracket};

// ---------------------------------------------------------------------------
// FilterCriteria – one query's worth of user selections
// ---------------------------------------------------------------------------

/// Immutable set of screening criteria, rebuilt on every interaction.
///
/// Ranges are inclusive on both ends. [`apply`] does not check that
/// `min <= max`; callers wanting that guarantee use [`FilterCriteria::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// `None` or `"All"` means no sector constraint.
    pub sector: Option<String>,
    pub pe_min: f64,
    pub pe_max: f64,
    pub div_min: f64,
    pub div_max: f64,
    pub bracket: MarketCapBracket,
}

impl Default for FilterCriteria {
    /// Initial dashboard selections: any sector, P/E 0–25, yield 0–5 %.
    fn default() -> Self {
        Self {
            sector: None,
            pe_min: 0.0,
            pe_max: 25.0,
            div_min: 0.0,
            div_max: 5.0,
            bracket: MarketCapBracket::All,
        }
    }
}

/// Returned by [`FilterCriteria::validate`] for a malformed range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidCriteria {
    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field} bound is not a number")]
    NotANumber { field: &'static str },
}

impl FilterCriteria {
    /// Criteria that keep every row of any table.
    pub fn unbounded() -> Self {
        Self {
            sector: None,
            pe_min: f64::NEG_INFINITY,
            pe_max: f64::INFINITY,
            div_min: f64::NEG_INFINITY,
            div_max: f64::INFINITY,
            bracket: MarketCapBracket::All,
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_pe_range(mut self, min: f64, max: f64) -> Self {
        self.pe_min = min;
        self.pe_max = max;
        self
    }

    pub fn with_dividend_range(mut self, min: f64, max: f64) -> Self {
        self.div_min = min;
        self.div_max = max;
        self
    }

    pub fn with_bracket(mut self, bracket: MarketCapBracket) -> Self {
        self.bracket = bracket;
        self
    }

    /// The sector a row must match, or `None` when unconstrained.
    pub fn sector_constraint(&self) -> Option<&str> {
        match self.sector.as_deref() {
            None | Some(ALL_SECTORS) => None,
            Some(sector) => Some(sector),
        }
    }

    /// The four predicates these criteria stand for, in the default order.
    pub fn predicates(&self) -> [Predicate<'_>; 4] {
        [
            Predicate::Sector(self.sector_constraint()),
            Predicate::PeRange {
                min: self.pe_min,
                max: self.pe_max,
            },
            Predicate::DividendRange {
                min: self.div_min,
                max: self.div_max,
            },
            Predicate::Bracket(self.bracket),
        ]
    }

    /// Whether a single record passes every predicate.
    pub fn matches(&self, record: &CompanyRecord) -> bool {
        self.predicates().iter().all(|p| p.matches(record))
    }

    /// Fail fast on NaN bounds or `min > max`.
    pub fn validate(&self) -> Result<(), InvalidCriteria> {
        for (field, min, max) in [
            ("P/E", self.pe_min, self.pe_max),
            ("dividend yield", self.div_min, self.div_max),
        ] {
            if min.is_nan() || max.is_nan() {
                return Err(InvalidCriteria::NotANumber { field });
            }
            if min > max {
                return Err(InvalidCriteria::InvertedRange { field, min, max });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Predicate – a single inclusion test
// ---------------------------------------------------------------------------

/// One independent row test. Predicates commute, so any application order
/// yields the same subset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate<'a> {
    /// Exact, case-sensitive sector match; `None` keeps every row.
    Sector(Option<&'a str>),
    PeRange { min: f64, max: f64 },
    DividendRange { min: f64, max: f64 },
    Bracket(MarketCapBracket),
}

impl Predicate<'_> {
    pub fn matches(&self, record: &CompanyRecord) -> bool {
        match *self {
            Predicate::Sector(None) => true,
            Predicate::Sector(Some(sector)) => record.sector == sector,
            Predicate::PeRange { min, max } => min <= record.pe_ratio && record.pe_ratio <= max,
            Predicate::DividendRange { min, max } => {
                min <= record.dividend_yield && record.dividend_yield <= max
            }
            Predicate::Bracket(bracket) => bracket.contains(record.market_cap),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Filter `table` down to the rows passing every criterion.
///
/// The result is an order-preserving subsequence of `table`; an empty result
/// is not an error.
pub fn apply(table: &CompaniesTable, criteria: &FilterCriteria) -> CompaniesTable {
    apply_predicates(table, &criteria.predicates())
}

/// Narrow `table` by each predicate in turn.
pub fn apply_predicates(table: &CompaniesTable, predicates: &[Predicate<'_>]) -> CompaniesTable {
    let mut candidates: Vec<&CompanyRecord> = table.iter().collect();
    for predicate in predicates {
        candidates.retain(|record| predicate.matches(record));
    }
    candidates.into_iter().cloned().collect()
}

/// Return indices of rows that pass all criteria.
pub fn filtered_indices(table: &CompaniesTable, criteria: &FilterCriteria) -> Vec<usize> {
    table
        .iter()
        .enumerate()
        .filter(|(_, record)| criteria.matches(record))
        .map(|(i, _)| i)
        .collect()
}
