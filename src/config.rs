// src/config.rs
// =============================================================================
// This module holds the knobs of a run.
//
// Two kinds of configuration:
// - Policy: the heuristic data (which domains count as "social", which column
//   headers look like a website column). Can be loaded from a JSON file so the
//   lists can change without touching code.
// - ProbeSettings: timeouts and pool sizes for the two probing phases.
//   These come from command-line flags.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Domains that are never probed: they are profiles on a platform, not an
/// independently hosted business website.
pub const DEFAULT_SOCIAL_DOMAINS: &[&str] = &[
    "linkedin.com",
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "wa.me",
    "whatsapp.com",
    "t.me",
    "youtube.com",
    "pinterest.com",
    "tiktok.com",
];

/// Header fragments that mark a column as a website-column candidate.
pub const DEFAULT_COLUMN_KEYWORDS: &[&str] = &[
    "website",
    "company_website",
    "company domain",
    "company_domain",
    "site",
    "web",
    "webpage",
    "business_website",
    "official_site",
    "domain",
    "url",
];

/// A candidate column is rejected when more than this share of its
/// non-empty values are social links.
pub const DEFAULT_SOCIAL_RATIO_LIMIT: f64 = 0.7;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("could not read policy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid policy file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

// The classification policy.
//
// #[serde(default)] means a policy file only has to mention the fields it
// wants to change: everything else comes from Policy::default().
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub social_domains: Vec<String>,
    pub column_keywords: Vec<String>,
    pub social_ratio_limit: f64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            social_domains: DEFAULT_SOCIAL_DOMAINS.iter().map(|s| s.to_string()).collect(),
            column_keywords: DEFAULT_COLUMN_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            social_ratio_limit: DEFAULT_SOCIAL_RATIO_LIMIT,
        }
    }
}

impl Policy {
    /// Loads a policy from a JSON file, e.g.
    ///
    /// ```json
    /// { "social_domains": ["linkedin.com", "xing.com"] }
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let text = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| PolicyError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let policy: Policy = serde_json::from_str(text)?;
        Ok(policy.normalized())
    }

    // Matching is case-insensitive, so store everything lower-cased once
    // instead of lowering on every comparison.
    fn normalized(mut self) -> Self {
        for list in [&mut self.social_domains, &mut self.column_keywords] {
            *list = list
                .iter()
                .map(|entry| entry.trim().to_lowercase())
                .filter(|entry| !entry.is_empty())
                .collect();
        }
        self
    }
}

/// Timeouts and pool sizes for the two probing phases.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    /// Per-host bound on name resolution (phase one).
    pub fast_timeout: Duration,
    /// Per-request bound on the HEAD request (phase two).
    pub recheck_timeout: Duration,
    /// Maximum resolutions in flight at once.
    pub fast_workers: usize,
    /// Maximum HEAD requests in flight at once.
    pub recheck_workers: usize,
    /// Upgrade `http://` targets to `https://` for the recheck.
    pub force_https: bool,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            fast_timeout: Duration::from_secs(2),
            recheck_timeout: Duration::from_secs(6),
            fast_workers: 100,
            recheck_workers: 25,
            force_https: true,
        }
    }
}

impl ProbeSettings {
    // A pool of zero workers would never make progress
    pub fn clamped(mut self) -> Self {
        self.fast_workers = self.fast_workers.max(1);
        self.recheck_workers = self.recheck_workers.max(1);
        self
    }
}
