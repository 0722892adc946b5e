//! SmartFin Lab: screen listed companies by sector, P/E, dividend yield and
//! market-cap bracket, and look up a single ticker's snapshot.
//!
//! The screening core lives in [`data`] and [`session`]; [`lookup`] talks to
//! the market-data provider; [`app`], [`state`] and [`ui`] are the desktop
//! front end.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod format;
pub mod lookup;
pub mod session;
pub mod state;
pub mod ui;

pub use data::{CompaniesTable, CompanyRecord, DataError, FilterCriteria, MarketCapBracket};
pub use session::Session;
