//! Shapes resolved pairs into the mapping-table rows handed to the
//! persistence collaborator, whose contract is replace-all.

use super::matcher::{CarrierMatch, MatchPass};
use super::overrides::has_pilgrim_marker;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

/// One row of the mapping table.
#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub source_name: String,
    pub target_name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub matched_by: MatchPass,
    pub run_date: NaiveDate,
}

pub(crate) fn build_records(matches: Vec<CarrierMatch>, run_date: NaiveDate) -> Vec<MatchRecord> {
    matches
        .into_iter()
        .map(|matched| {
            // Bracketed Pilgrim sub-brands keep their registry spelling while
            // taking address data from the generic roster entry.
            let target_name = if has_pilgrim_marker(&matched.source_name) {
                matched.source_name.clone()
            } else {
                matched.target.company.clone()
            };
            let target = matched.target;

            MatchRecord {
                source_name: matched.source_name,
                target_name,
                address: target.address,
                city: target.city,
                state: target.state,
                zip: target.zip,
                phone: target.phone,
                matched_by: matched.pass,
                run_date,
            }
        })
        .collect()
}

/// Serializes the full table for the replace-all hand-off.
pub fn write_csv<W: Write>(records: &[MatchRecord], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::mapping::roster::RosterRecord;

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).expect("valid run date")
    }

    fn pilgrim_match() -> CarrierMatch {
        CarrierMatch {
            source_name: "XYZ Corp (Pilgrim)".to_string(),
            pass: MatchPass::Normalized,
            target: RosterRecord {
                company: "Pilgrim Insurance Company".to_string(),
                company_type: Some("Property & Casualty".to_string()),
                naic: None,
                address: Some("695 Atlantic Ave".to_string()),
                city: Some("Boston".to_string()),
                state: Some("MA".to_string()),
                zip: Some("02111".to_string()),
                phone: None,
            },
        }
    }

    #[test]
    fn pilgrim_rows_keep_the_registry_spelling() {
        let records = build_records(vec![pilgrim_match()], run_date());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target_name, "XYZ Corp (Pilgrim)");
        assert_eq!(records[0].address.as_deref(), Some("695 Atlantic Ave"));
        assert_eq!(records[0].run_date, run_date());
    }

    #[test]
    fn ordinary_rows_use_the_roster_name() {
        let mut matched = pilgrim_match();
        matched.source_name = "Pilgrim Ins Co".to_string();
        let records = build_records(vec![matched], run_date());
        assert_eq!(records[0].target_name, "Pilgrim Insurance Company");
        assert_eq!(records[0].source_name, "Pilgrim Ins Co");
    }

    #[test]
    fn csv_output_carries_headers_and_provenance() {
        let mut buffer = Vec::new();
        write_csv(&build_records(vec![pilgrim_match()], run_date()), &mut buffer)
            .expect("csv writes");
        let text = String::from_utf8(buffer).expect("utf8 csv");

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "source_name,target_name,address,city,state,zip,phone,matched_by,run_date"
            )
        );
        let row = lines.next().expect("data row");
        assert!(row.contains("normalized"));
        assert!(row.contains("2025-11-03"));
    }
}
