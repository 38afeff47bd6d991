// src/checker/dns.rs
// =============================================================================
// Phase one: the fast existence probe.
//
// We don't fetch anything here. We only ask "does this host name resolve?"
// That is cheap (one DNS round trip) and good enough to sort most rows.
// It is also optimistic: a host can resolve and still be dead. Rows that do
// NOT resolve get a second chance in phase two (see http.rs).
//
// Rust concepts:
// - Traits: the Resolver trait lets tests swap in a fake DNS
// - async-trait: async methods in traits used through `&dyn Resolver`
// - tokio::select!: racing a lookup against a deadline
// =============================================================================

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use hickory_resolver::TokioAsyncResolver;
use std::time::Duration;
use tracing::{debug, warn};

use super::aggregate::ProbeOutcome;
use super::ProbeError;

/// Anything that can answer "does this host resolve?".
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, host: &str) -> Result<(), ProbeError>;
}

/// Asynchronous DNS client shared by every phase-one task.
///
/// Uses the system resolver configuration (resolv.conf and the hosts file)
/// when it can be read, public resolvers otherwise.
#[derive(Clone)]
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    // One attempt per lookup, bounded by `timeout`
    pub fn new(timeout: Duration) -> Self {
        let (config, mut opts) = read_system_conf().unwrap_or_else(|e| {
            warn!(error = %e, "could not read the system DNS configuration, using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        });
        opts.timeout = timeout;
        opts.attempts = 1;

        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<(), ProbeError> {
        let lookup = self
            .inner
            .lookup_ip(strip_port(host))
            .await
            .map_err(|e| ProbeError::Resolve(e.to_string()))?;

        match lookup.iter().next() {
            Some(_) => Ok(()),
            None => Err(ProbeError::NoAddress),
        }
    }
}

// Checks a single url by name resolution only
//
// Parameters:
//   resolver: the DNS backend
//   url: raw cell value (scheme optional)
//   timeout: how long an answer may take to count as Active
//
// Returns: Active when the host resolves in time, Inactive for every kind
// of failure. A late lookup is still awaited before returning.
pub async fn fast_probe(resolver: &dyn Resolver, url: &str, timeout: Duration) -> ProbeOutcome {
    let host = match extract_host(url) {
        Some(host) => host,
        None => {
            debug!(url, "no host name in value");
            return ProbeOutcome::Inactive;
        }
    };

    let lookup = resolver.resolve(host);
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(lookup, deadline);

    tokio::select! {
        result = &mut lookup => match result {
            Ok(()) => ProbeOutcome::Active,
            Err(e) => {
                debug!(host, error = %e, "host did not resolve");
                ProbeOutcome::Inactive
            }
        },
        _ = &mut deadline => {
            debug!(host, ?timeout, "resolution timed out");
            // A lookup running on a blocking thread can't be cancelled.
            // The pool slot stays taken until it returns.
            let _ = lookup.await;
            ProbeOutcome::Inactive
        }
    }
}

// Pulls the host part out of a loosely written url
//
// Examples:
//   "https://example.com/about" -> Some("example.com")
//   "example.com"               -> Some("example.com")
//   "HTTP://Example.com?ref=x"  -> Some("Example.com")
//   "https:///nothing"          -> None
pub fn extract_host(url: &str) -> Option<&str> {
    let trimmed = url.trim();

    // Only treat "xxx://" as a scheme when xxx looks like one
    let rest = match trimmed.split_once("://") {
        Some((scheme, rest))
            if !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            rest
        }
        _ => trimmed,
    };

    let host = rest
        .split(|c| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or("");

    if host.is_empty() || host.chars().any(char::is_whitespace) {
        None
    } else {
        Some(host)
    }
}

// Drops a trailing ":port" and IPv6 brackets, DNS only wants the name
fn strip_port(host: &str) -> &str {
    let name = match host.rsplit_once(':') {
        // "[::1]:8080" or "example.com:8080", but not a bare "::1"
        Some((name, port))
            if (name.ends_with(']') || !name.contains(':')) && port.parse::<u16>().is_ok() =>
        {
            name
        }
        _ => host,
    };
    name.trim_start_matches('[').trim_end_matches(']')
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why #[async_trait]?
//    - We call the resolver through `&dyn Resolver`
//    - async fns in traits can't be used as trait objects directly, so the
//      macro rewrites them to return a boxed future
//
// 2. Why select! instead of tokio::time::timeout?
//    - timeout drops the inner future when the deadline passes
//    - Dropping a future that waits on spawn_blocking does not stop the
//      blocking thread, so the pool would start a new lookup while the old
//      one is still running
//    - With select! we keep the future pinned and await it after the
//      deadline: the row is already Inactive, but the slot is only freed
//      once the lookup has really finished
//
// 3. Why hickory-resolver?
//    - Its lookups are plain async I/O, dropping them cancels them
//    - It takes the timeout itself (ResolverOpts), so the lookup ends close
//      to the deadline anyway
//
// 4. Why Option<&str> from extract_host?
//    - The host is a slice of the input, no allocation needed
//    - None means "nothing that looks like a host", which is just Inactive
// -----------------------------------------------------------------------------
