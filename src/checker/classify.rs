// src/checker/classify.rs
// =============================================================================
// This module decides, without any network access, what to do with a cell.
//
// Three possible answers:
// - the cell is empty            -> skip it ("empty")
// - the cell is a social profile -> skip it ("social")
// - anything else                -> probe it
//
// The function is pure: same input, same answer, never fails.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::config::Policy;

/// Why a record was left out of probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Empty,
    Social,
}

/// The classifier's answer for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Skipped(SkipReason),
    Probe,
}

// Classifies a raw cell value
//
// Parameters:
//   value: the cell contents, None when the cell is absent
//   policy: supplies the social-domain list (already lower-cased)
//
// Example:
//   Some("https://LinkedIn.com/in/x") -> Skipped(Social)
//   Some("   ")                       -> Skipped(Empty)
//   Some("example.com")               -> Probe
pub fn classify(value: Option<&str>, policy: &Policy) -> Verdict {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Verdict::Skipped(SkipReason::Empty),
    };

    if is_social(value, policy) {
        Verdict::Skipped(SkipReason::Social)
    } else {
        Verdict::Probe
    }
}

/// Case-insensitive containment test against the social-domain list.
pub fn is_social(value: &str, policy: &Policy) -> bool {
    let lowered = value.to_lowercase();
    policy
        .social_domains
        .iter()
        .any(|domain| lowered.contains(domain.as_str()))
}
