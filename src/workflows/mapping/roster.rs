//! Roster rows from the regulator's published company list, already reduced
//! to tabular CSV by the spreadsheet collaborator. Header names follow the
//! published sheet; blank cells become `None`.

use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Clone, Deserialize)]
pub struct RosterRecord {
    #[serde(rename = "Company", default)]
    pub company: String,
    #[serde(
        rename = "Company Type",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub company_type: Option<String>,
    #[serde(rename = "NAIC #", default, deserialize_with = "empty_string_as_none")]
    pub naic: Option<String>,
    #[serde(rename = "Address", default, deserialize_with = "empty_string_as_none")]
    pub address: Option<String>,
    #[serde(rename = "City", default, deserialize_with = "empty_string_as_none")]
    pub city: Option<String>,
    #[serde(rename = "State", default, deserialize_with = "empty_string_as_none")]
    pub state: Option<String>,
    #[serde(rename = "Zip", default, deserialize_with = "empty_string_as_none")]
    pub zip: Option<String>,
    #[serde(rename = "Phone", default, deserialize_with = "empty_string_as_none")]
    pub phone: Option<String>,
}

impl RosterRecord {
    /// Field cleanup carried over from the sheet loader: two-letter state,
    /// ZIP 5 or ZIP+4, digits-only NAIC.
    fn clean(&mut self) {
        if let Some(state) = self.state.take() {
            self.state = Some(extract_state(&state).unwrap_or(state));
        }
        self.zip = self.zip.take().as_deref().and_then(extract_zip);
        self.naic = self.naic.take().as_deref().and_then(extract_digits);
    }
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<RosterRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<RosterRecord>() {
        let mut record = row?;
        record.clean();
        records.push(record);
    }

    Ok(records)
}

fn extract_state(raw: &str) -> Option<String> {
    let chars: Vec<char> = raw.chars().collect();
    chars
        .windows(2)
        .find(|pair| pair[0].is_ascii_alphabetic() && pair[1].is_ascii_alphabetic())
        .map(|pair| pair.iter().collect::<String>().to_ascii_uppercase())
}

fn extract_zip(raw: &str) -> Option<String> {
    let chars: Vec<char> = raw.chars().collect();
    for start in 0..chars.len().saturating_sub(4) {
        if !chars[start..start + 5].iter().all(char::is_ascii_digit) {
            continue;
        }
        let mut end = start + 5;
        // Accept a ZIP+4 tail when it is fully formed.
        if chars.len() >= end + 5
            && chars[end] == '-'
            && chars[end + 1..end + 5].iter().all(char::is_ascii_digit)
        {
            end += 5;
        }
        return Some(chars[start..end].iter().collect());
    }
    None
}

fn extract_digits(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
