// src/table/detect.rs
// =============================================================================
// Finds the column that holds the website addresses.
//
// Two steps:
// 1. Keyword match on the header ("website", "domain", "url", ...).
//    This alone picks up columns like "LinkedIn URL" far too often.
// 2. For each candidate, in header order, measure how many of its values
//    are social links. A column that is mostly social links is vetoed.
//    The first candidate that survives wins.
// =============================================================================

use super::Table;
use crate::checker::is_social;
use crate::config::Policy;

/// A header that matched a keyword, with its social ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub name: String,
    pub social_ratio: f64,
    pub accepted: bool,
}

// Lists every keyword-matching column, in header order
//
// `accepted` is true when the social ratio does not exceed the policy limit.
pub fn candidates(table: &Table, policy: &Policy) -> Vec<Candidate> {
    table
        .headers()
        .iter()
        .enumerate()
        .filter(|(_, header)| header_matches(header, policy))
        .map(|(index, header)| {
            let social_ratio = social_ratio(table.column(index), policy);
            Candidate {
                index,
                name: header.clone(),
                social_ratio,
                accepted: social_ratio <= policy.social_ratio_limit,
            }
        })
        .collect()
}

/// Picks the website column, or None when no candidate qualifies.
pub fn detect_column(table: &Table, policy: &Policy) -> Option<usize> {
    candidates(table, policy)
        .into_iter()
        .find(|candidate| candidate.accepted)
        .map(|candidate| candidate.index)
}

fn header_matches(header: &str, policy: &Policy) -> bool {
    let header = header.to_lowercase();
    policy
        .column_keywords
        .iter()
        .any(|keyword| header.contains(keyword.as_str()))
}

// Share of non-empty values that are social links.
// A column with no values at all has a ratio of 0.
fn social_ratio<'a, I>(values: I, policy: &Policy) -> f64
where
    I: Iterator<Item = Option<&'a str>>,
{
    let (mut filled, mut social) = (0usize, 0usize);
    for value in values.flatten().map(str::trim).filter(|v| !v.is_empty()) {
        filled += 1;
        if is_social(value, policy) {
            social += 1;
        }
    }

    if filled == 0 {
        0.0
    } else {
        social as f64 / filled as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> Table {
        Table::from_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_social_column_is_vetoed() {
        let table = table(
            "Name,LinkedIn_Profile,Company_Domain\n\
             Acme,https://linkedin.com/company/acme,acme.com\n\
             Beta,https://linkedin.com/company/beta,beta.io\n\
             Gamma,https://linkedin.com/company/gamma,gamma.org\n\
             Delta,https://delta.dev,delta.dev\n",
        );
        let policy = Policy {
            // make "profile" a keyword so LinkedIn_Profile is a candidate too
            column_keywords: vec!["profile".into(), "domain".into()],
            ..Policy::default()
        };

        let found = candidates(&table, &policy);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "LinkedIn_Profile");
        assert!((found[0].social_ratio - 0.75).abs() < 1e-9);
        assert!(!found[0].accepted);

        assert_eq!(detect_column(&table, &policy), Some(2));
        assert_eq!(detect_column(&table, &Policy::default()), Some(2));
    }

    #[test]
    fn test_linkedin_url_header_is_skipped_for_website() {
        let table = table(
            "LinkedIn URL,Website\n\
             linkedin.com/in/a,a.com\n\
             linkedin.com/in/b,\n",
        );
        assert_eq!(detect_column(&table, &Policy::default()), Some(1));
    }

    #[test]
    fn test_ratio_at_limit_is_accepted() {
        // 7 social out of 10 is exactly 0.7: not more than the limit
        let mut text = String::from("Website\n");
        for i in 0..7 {
            text.push_str(&format!("facebook.com/p{i}\n"));
        }
        for i in 0..3 {
            text.push_str(&format!("site{i}.com\n"));
        }
        assert_eq!(detect_column(&table(&text), &Policy::default()), Some(0));
    }

    #[test]
    fn test_empty_values_are_ignored_in_ratio() {
        let table = table("Name,Site\nA,instagram.com/x\nB,\nC,  \nD,real.com\n");
        let found = candidates(&table, &Policy::default());
        assert!((found[0].social_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_first_qualifying_candidate_wins() {
        let table = table("Domain,Website\na.com,b.com\n");
        assert_eq!(detect_column(&table, &Policy::default()), Some(0));
    }

    #[test]
    fn test_not_found() {
        let no_keyword = table("Name,City\nAcme,Oslo\n");
        assert_eq!(detect_column(&no_keyword, &Policy::default()), None);

        let all_social = table("Website\ntwitter.com/a\nt.me/b\n");
        assert_eq!(detect_column(&all_social, &Policy::default()), None);
    }
}
