//! Two-pass join between registry names and roster records: literal equality
//! first, then canonical-key equality over the remainder. Pass results are
//! combined in priority order so an exact match always beats a normalized
//! match for the same registry name.

use super::normalizer::normalize_name;
use super::overrides::comparison_target;
use super::roster::RosterRecord;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Which matching strategy resolved a registry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPass {
    Exact,
    Normalized,
}

impl MatchPass {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Normalized => "normalized",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CarrierMatch {
    pub(crate) source_name: String,
    pub(crate) pass: MatchPass,
    pub(crate) target: RosterRecord,
}

/// Joins registry names against eligible roster records.
///
/// Registry names are collapsed to first occurrence before any pass. Roster
/// records participate only when their category contains `category_filter`
/// (case-insensitive). When several roster records share a literal name or a
/// canonical key, the first in roster input order wins, so reruns over
/// identical input produce identical output. Names that survive both passes
/// unmatched are simply absent from the result.
pub(crate) fn match_carriers(
    source_names: &[String],
    roster: &[RosterRecord],
    category_filter: &str,
) -> Vec<CarrierMatch> {
    let filter = category_filter.to_ascii_lowercase();

    let mut literal_index: HashMap<&str, &RosterRecord> = HashMap::new();
    let mut normalized_index: HashMap<String, &RosterRecord> = HashMap::new();
    for record in roster {
        let eligible = record
            .company_type
            .as_deref()
            .is_some_and(|category| category.to_ascii_lowercase().contains(&filter));
        if !eligible || record.company.is_empty() {
            continue;
        }

        literal_index.entry(record.company.as_str()).or_insert(record);
        if let Some(key) = normalize_name(&record.company) {
            normalized_index.entry(key).or_insert(record);
        }
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(source_names.len());
    let unique: Vec<&String> = source_names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .collect();

    let mut resolved = Vec::new();
    let mut residual = Vec::new();

    for name in unique {
        match literal_index.get(name.as_str()) {
            Some(record) => resolved.push(CarrierMatch {
                source_name: name.clone(),
                pass: MatchPass::Exact,
                target: (*record).clone(),
            }),
            None => residual.push(name),
        }
    }

    // Overrides rewrite only the comparison text; the emitted source name
    // stays raw.
    for name in residual {
        let Some(key) = normalize_name(comparison_target(name)) else {
            continue;
        };
        if let Some(record) = normalized_index.get(&key) {
            resolved.push(CarrierMatch {
                source_name: name.clone(),
                pass: MatchPass::Normalized,
                target: (*record).clone(),
            });
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_record(company: &str, company_type: &str) -> RosterRecord {
        RosterRecord {
            company: company.to_string(),
            company_type: Some(company_type.to_string()),
            naic: None,
            address: Some(format!("{company} HQ")),
            city: Some("Boston".to_string()),
            state: Some("MA".to_string()),
            zip: Some("02101".to_string()),
            phone: None,
        }
    }

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn exact_match_wins_over_normalized_candidate() {
        let roster = vec![
            roster_record("Acme Corporation", "Property & Casualty"),
            roster_record("Acme Co", "Property & Casualty"),
        ];
        let matches = match_carriers(&names(&["Acme Co"]), &roster, "Property & Casualty");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pass, MatchPass::Exact);
        assert_eq!(matches[0].target.company, "Acme Co");
        assert_eq!(matches[0].target.address.as_deref(), Some("Acme Co HQ"));
    }

    #[test]
    fn normalized_pass_catches_suffix_variants() {
        let roster = vec![roster_record(
            "Acme Insurance Company",
            "Property & Casualty",
        )];
        let matches = match_carriers(&names(&["The Acme Ins. Co."]), &roster, "Property & Casualty");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pass, MatchPass::Normalized);
        assert_eq!(matches[0].target.company, "Acme Insurance Company");
    }

    #[test]
    fn category_filter_excludes_even_literal_matches() {
        let roster = vec![roster_record("Sunset Company", "Life")];
        let matches = match_carriers(&names(&["Sunset Company"]), &roster, "Property & Casualty");
        assert!(matches.is_empty());
    }

    #[test]
    fn filter_match_is_case_insensitive_substring() {
        let roster = vec![roster_record(
            "Acme Co",
            "Domestic property & casualty Insurer",
        )];
        let matches = match_carriers(&names(&["Acme Co"]), &roster, "Property & Casualty");
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn duplicate_registry_names_collapse_to_one_match() {
        let roster = vec![roster_record("Acme Co", "Property & Casualty")];
        let matches = match_carriers(
            &names(&["Acme Co", "Acme Co"]),
            &roster,
            "Property & Casualty",
        );
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn unmatched_names_are_dropped_silently() {
        let roster = vec![roster_record("Acme Co", "Property & Casualty")];
        let matches = match_carriers(
            &names(&["Nowhere Mutual Holdings"]),
            &roster,
            "Property & Casualty",
        );
        assert!(matches.is_empty());
    }

    #[test]
    fn names_without_canonical_key_stay_unmatched() {
        let roster = vec![roster_record("Acme Co", "Property & Casualty")];
        let matches = match_carriers(&names(&["The Insurance Co"]), &roster, "Property & Casualty");
        assert!(matches.is_empty());
    }

    #[test]
    fn tie_break_takes_first_roster_record_in_input_order() {
        let mut first = roster_record("Acme Insurance Company", "Property & Casualty");
        first.city = Some("Worcester".to_string());
        let second = roster_record("Acme Insurance Co", "Property & Casualty");
        let roster = vec![first, second];

        let matches = match_carriers(&names(&["Acme"]), &roster, "Property & Casualty");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].target.city.as_deref(), Some("Worcester"));
    }

    #[test]
    fn output_lists_exact_matches_before_normalized_ones() {
        let roster = vec![
            roster_record("Acme Co", "Property & Casualty"),
            roster_record("Safety Insurance Company", "Property & Casualty"),
        ];
        let matches = match_carriers(
            &names(&["Safety Ins Co", "Acme Co"]),
            &roster,
            "Property & Casualty",
        );

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].pass, MatchPass::Exact);
        assert_eq!(matches[0].source_name, "Acme Co");
        assert_eq!(matches[1].pass, MatchPass::Normalized);
        assert_eq!(matches[1].source_name, "Safety Ins Co");
    }

    #[test]
    fn rerun_on_identical_input_is_deterministic() {
        let roster = vec![
            roster_record("Acme Insurance Company", "Property & Casualty"),
            roster_record("Safety Insurance Company", "Property & Casualty"),
            roster_record("Acme Co", "Property & Casualty"),
        ];
        let sources = names(&["Acme Co", "Safety Ins", "The Acme Insurance Co"]);

        let first = match_carriers(&sources, &roster, "Property & Casualty");
        let second = match_carriers(&sources, &roster, "Property & Casualty");

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.source_name, b.source_name);
            assert_eq!(a.pass, b.pass);
            assert_eq!(a.target.company, b.target.company);
        }
    }

    #[test]
    fn empty_inputs_degrade_to_empty_output() {
        assert!(match_carriers(&[], &[], "Property & Casualty").is_empty());
        let roster = vec![roster_record("Acme Co", "Property & Casualty")];
        assert!(match_carriers(&[], &roster, "Property & Casualty").is_empty());
        assert!(match_carriers(&names(&["Acme Co"]), &[], "Property & Casualty").is_empty());
    }
}
