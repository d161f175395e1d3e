mod matcher;
mod normalizer;
mod overrides;
mod registry;
pub mod roster;
mod table;

pub use matcher::MatchPass;
pub use roster::RosterRecord;
pub use table::{write_csv, MatchRecord};

use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Only roster entries in this category participate in matching by default.
pub const DEFAULT_CATEGORY_FILTER: &str = "Property & Casualty";

#[derive(Debug)]
pub enum MappingBuildError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for MappingBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingBuildError::Io(err) => write!(f, "failed to read mapping input: {}", err),
            MappingBuildError::Csv(err) => write!(f, "invalid mapping CSV data: {}", err),
        }
    }
}

impl std::error::Error for MappingBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MappingBuildError::Io(err) => Some(err),
            MappingBuildError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for MappingBuildError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for MappingBuildError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Builds the registry-to-roster mapping table for one run. Each run stands
/// alone; the emitted table replaces whatever the previous run produced.
pub struct CarrierMappingBuilder;

impl CarrierMappingBuilder {
    pub fn from_paths<P, Q>(
        roster_path: P,
        registry_path: Q,
        category_filter: &str,
        run_date: NaiveDate,
    ) -> Result<Vec<MatchRecord>, MappingBuildError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let roster_file = std::fs::File::open(roster_path)?;
        let registry_file = std::fs::File::open(registry_path)?;
        Self::from_readers(roster_file, registry_file, category_filter, run_date)
    }

    pub fn from_readers<R1, R2>(
        roster: R1,
        registry: R2,
        category_filter: &str,
        run_date: NaiveDate,
    ) -> Result<Vec<MatchRecord>, MappingBuildError>
    where
        R1: Read,
        R2: Read,
    {
        let roster_records = roster::parse_records(roster)?;
        let source_names = registry::parse_names(registry)?;
        info!(
            roster_rows = roster_records.len(),
            registry_names = source_names.len(),
            category_filter,
            "loaded mapping inputs"
        );

        let matches = matcher::match_carriers(&source_names, &roster_records, category_filter);
        let exact = matches
            .iter()
            .filter(|matched| matched.pass == MatchPass::Exact)
            .count();
        info!(
            matched = matches.len(),
            exact,
            normalized = matches.len() - exact,
            "matching passes complete"
        );

        Ok(table::build_records(matches, run_date))
    }
}
