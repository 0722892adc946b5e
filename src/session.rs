use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::data::error::Result;
use crate::data::filter::{self, FilterCriteria};
use crate::data::loader::CachedLoader;
use crate::data::model::{ALL_SECTORS, CompaniesTable, KNOWN_SECTORS};
use crate::data::source::DatasetSource;

// ---------------------------------------------------------------------------
// Session – one user's loaded table
// ---------------------------------------------------------------------------

/// Read-only handle to the table loaded for this session.
///
/// Obtained once through a [`CachedLoader`] and passed to every query; the
/// table itself is never mutated.
#[derive(Debug, Clone)]
pub struct Session {
    table: Arc<CompaniesTable>,
    source: String,
    opened_at: DateTime<Local>,
}

impl Session {
    /// Open a session over the loader's (possibly cached) table.
    pub fn open<S: DatasetSource>(loader: &CachedLoader<S>) -> Result<Self> {
        let table = loader.load()?;
        let source = loader.source().describe();
        log::info!("Session opened over {} companies from {source}", table.len());
        Ok(Self {
            table,
            source,
            opened_at: Local::now(),
        })
    }

    /// Wrap an already loaded table.
    pub fn from_table(table: CompaniesTable, source: impl Into<String>) -> Self {
        Self {
            table: Arc::new(table),
            source: source.into(),
            opened_at: Local::now(),
        }
    }

    pub fn table(&self) -> &CompaniesTable {
        &self.table
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn opened_at(&self) -> DateTime<Local> {
        self.opened_at
    }

    /// Run one query against the session's table.
    pub fn query(&self, criteria: &FilterCriteria) -> CompaniesTable {
        filter::apply(&self.table, criteria)
    }

    /// "All", then the built-in sectors, then any other sector in the table.
    pub fn sector_choices(&self) -> Vec<String> {
        let mut choices: Vec<String> = std::iter::once(ALL_SECTORS)
            .chain(KNOWN_SECTORS)
            .map(str::to_string)
            .collect();
        for sector in self.table.sectors() {
            if !choices.iter().any(|c| c == sector) {
                choices.push(sector.to_string());
            }
        }
        choices
    }
}
