//! Data layer: core types, loading, and filtering.
//!
//! Architecture:
//! ```text
//!  remote CSV / .csv / .json / embedded sample
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  source   │  fetch raw bytes
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  rename columns, coerce numbers, drop incomplete rows
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────────┐
//!   │ CompaniesTable │  Vec<CompanyRecord>, source order
//!   └───────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterCriteria → order-preserving subset
//!   └──────────┘
//! ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod source;

pub use error::DataError;
pub use filter::{FilterCriteria, InvalidCriteria, Predicate, apply};
pub use loader::CachedLoader;
pub use model::{CompaniesTable, CompanyRecord, MarketCapBracket};
pub use source::{DatasetSource, SourceSpec};
