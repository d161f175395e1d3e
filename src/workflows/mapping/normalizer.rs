//! Canonical comparison keys for carrier names. The key is only ever used
//! for joining; display names always come from the raw inputs.

const PUNCTUATION: &[char] = &[
    '.', ',', '\'', '"', '/', '\\', '(', ')', '[', ']', '{', '}', ':', '-',
];

/// Legal-entity and insurance-generic terms trimmed from the end of a name.
/// "L.L.C" and "P&C" cannot survive the punctuation and ampersand passes,
/// but stay to mirror the curated list maintained on the database side.
const TRAILING_STOPWORDS: &[&str] = &[
    "INC",
    "INCORPORATED",
    "LLC",
    "L.L.C",
    "CO",
    "COMPANY",
    "CORP",
    "CORPORATION",
    "GROUP",
    "HOLDINGS",
    "MUTUAL",
    "ASSOCIATION",
    "ASSN",
    "ASSOCIATES",
    "INSURANCE",
    "INS",
    "CASUALTY",
    "INDEMNITY",
    "ASSURANCE",
    "FIRE",
    "MARINE",
    "PROPERTY",
    "P&C",
    "PC",
    "THE",
];

/// Reduces a free-text company name to its comparable core, or `None` when
/// nothing survives. Deterministic and idempotent.
pub(crate) fn normalize_name(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }

    // '&' becomes a word before punctuation stripping so "A&B" keeps its
    // middle token instead of fusing into "AB".
    let expanded = raw.to_uppercase().replace('&', " AND ");
    let cleaned: String = expanded
        .chars()
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();

    if tokens.first() == Some(&"THE") {
        tokens.remove(0);
    }

    // Suffix-only trim: a stopword in the middle of the name is kept.
    while let Some(last) = tokens.last() {
        if TRAILING_STOPWORDS.contains(last) {
            tokens.pop();
        } else {
            break;
        }
    }

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}
