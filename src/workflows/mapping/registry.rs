//! Carrier names from the vehicle-registration registry feed, exported as a
//! single-column CSV.

use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct RegistryRow {
    #[serde(rename = "CARRIER_NAME", default)]
    carrier_name: String,
}

/// Registry carrier names in feed order. Blank rows are skipped; duplicate
/// raw strings are kept here and collapsed by the matcher.
pub(crate) fn parse_names<R: Read>(reader: R) -> Result<Vec<String>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut names = Vec::new();

    for row in csv_reader.deserialize::<RegistryRow>() {
        let row = row?;
        if row.carrier_name.is_empty() {
            continue;
        }
        names.push(row.carrier_name);
    }

    Ok(names)
}
