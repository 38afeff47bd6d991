// src/checker/mod.rs
// =============================================================================
// This module contains the website liveness engine.
//
// Submodules:
// - classify: decides which cells are probed and which are skipped
// - pool: bounded worker pool shared by both probing phases
// - dns: phase one, name resolution only
// - http: phase two, HEAD request for rows that failed phase one
// - aggregate: result types and the order-preserving merge
// - engine: wires the phases together
//
// This file (mod.rs) is the module root - it exports the public API that
// the rest of the application uses.
// =============================================================================

mod aggregate;
mod classify;
mod dns;
mod engine;
mod http;
mod pool;

use thiserror::Error;

pub use aggregate::{ProbeOutcome, ResultSet, SummaryCounts, UrlRecord};
pub use classify::{is_social, SkipReason};
pub use dns::SystemResolver;
pub use engine::{Engine, LogProgress, Verification};
pub use http::ReqwestProbe;

#[cfg(test)]
pub use dns::Resolver;
#[cfg(test)]
pub use http::HttpProbe;

/// Why a single probe failed. Never surfaced to the user: every variant
/// turns into `Inactive`, the message only shows up in debug logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("name resolution failed: {0}")]
    Resolve(String),
    #[error("host resolved to no addresses")]
    NoAddress,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("timed out")]
    Timeout,
}
