//! Curated corrections for registry names whose roster counterpart cannot be
//! reached by normalization alone. Rules rewrite only the text used for the
//! normalized pass; literal matching always sees the raw name.

pub(crate) const PILGRIM_MARKER: &str = "(pilgrim)";

#[derive(Debug, Clone, Copy)]
enum OverrideRule {
    /// Any name containing the marker (case-insensitive) is redirected to
    /// one fixed roster name.
    Contains {
        marker: &'static str,
        target: &'static str,
    },
    /// Exact raw-name equality, case-sensitive. Replacement names are never
    /// re-checked against the table.
    Exact {
        source: &'static str,
        target: &'static str,
    },
}

const RULES: &[OverrideRule] = &[
    OverrideRule::Contains {
        marker: PILGRIM_MARKER,
        target: "Pilgrim Insurance Company",
    },
    OverrideRule::Exact {
        source: "Privilege Underwriters Reciprocal Exchange (PURE)",
        target: "Privilege Underwriters Reciprocal Exchange",
    },
    OverrideRule::Exact {
        source: "Metropolitan Property and Casualty Insurance Company",
        target: "Farmers Casualty Insurance Company",
    },
    OverrideRule::Exact {
        source: "Electric Insurance Company",
        target: "Plymouth Rock Assurance Corporation",
    },
    OverrideRule::Exact {
        source: "Foremost Insurance Company",
        target: "Foremost Property and Casualty Insurance Company",
    },
    OverrideRule::Exact {
        source: "Citation Insurance Company, MA",
        target: "Citation Insurance Company",
    },
    OverrideRule::Exact {
        source: "IDS Property Casualty Insurance Company",
        target: "American Family Connect Insurance Company",
    },
    OverrideRule::Exact {
        source: "Seaworthy Insurance Company",
        target: "GEICO Marine Insurance Company",
    },
];

/// The name a registry entry should be compared under during the normalized
/// pass. Defaults to the raw name when no rule applies.
pub(crate) fn comparison_target(raw: &str) -> &str {
    for rule in RULES {
        match *rule {
            OverrideRule::Contains { marker, target } => {
                if contains_ignore_case(raw, marker) {
                    return target;
                }
            }
            OverrideRule::Exact { source, target } => {
                if raw == source {
                    return target;
                }
            }
        }
    }
    raw
}

/// Whether a registry name carries the bracketed Pilgrim sub-brand marker.
/// The assembler uses this to keep the registry spelling in the output.
pub(crate) fn has_pilgrim_marker(raw: &str) -> bool {
    contains_ignore_case(raw, PILGRIM_MARKER)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
