// src/checker/http.rs
// =============================================================================
// Phase two: the deep recheck.
//
// Only rows that failed name resolution in phase one end up here. For each
// of them we make a real HTTP HEAD request (no body download) and look at
// the status code:
// - 200-399: the site answers, mark it Active
// - anything else, or no answer at all: it stays Inactive
//
// Redirects are NOT followed. A 3xx already proves a live server.
//
// Rust concepts:
// - Traits + async-trait: HttpProbe can be faked in tests
// - url::Url: turning a spreadsheet cell into a proper request target
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::aggregate::ProbeOutcome;
use super::ProbeError;

/// Sends one lightweight request and reports the status code.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn head(&self, url: &Url) -> Result<u16, ProbeError>;
}

/// HEAD requests through a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: Client,
}

impl ReqwestProbe {
    // Builds the client once; it is reused for every request
    // (reqwest pools connections internally)
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn head(&self, url: &Url) -> Result<u16, ProbeError> {
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(categorize_error)?;
        Ok(response.status().as_u16())
    }
}

// Maps reqwest's error into our smaller vocabulary.
// Only used for logging: every variant ends up as Inactive.
fn categorize_error(error: reqwest::Error) -> ProbeError {
    if error.is_timeout() {
        ProbeError::Timeout
    } else if error.is_connect() {
        ProbeError::Connect(error.to_string())
    } else {
        ProbeError::Request(error.to_string())
    }
}

/// Status codes that count as a live site.
pub fn is_live_status(status: u16) -> bool {
    (200..400).contains(&status)
}

// Turns a raw cell into the url we actually request
//
// - no scheme            -> https:// is assumed
// - query and fragment   -> dropped (we only care that the server answers)
// - empty path           -> "/"
// - force_https          -> http:// is upgraded to https://
//
// Returns None for anything that is not an http(s) url with a host.
pub fn recheck_target(raw: &str, force_https: bool) -> Option<Url> {
    let trimmed = raw.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url = Url::parse(&candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    if force_https && url.scheme() == "http" {
        url.set_scheme("https").ok()?;
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url)
}

// Rechecks a single url with a HEAD request
//
// Parameters:
//   probe: the HTTP backend
//   raw: the original cell value
//   timeout: upper bound for the whole request
//   force_https: see recheck_target()
pub async fn recheck_probe(
    probe: &dyn HttpProbe,
    raw: &str,
    timeout: Duration,
    force_https: bool,
) -> ProbeOutcome {
    let url = match recheck_target(raw, force_https) {
        Some(url) => url,
        None => {
            debug!(raw, "not a usable http url");
            return ProbeOutcome::Inactive;
        }
    };

    match tokio::time::timeout(timeout, probe.head(&url)).await {
        Ok(Ok(status)) if is_live_status(status) => {
            debug!(%url, status, "recheck succeeded");
            ProbeOutcome::Active
        }
        Ok(Ok(status)) => {
            debug!(%url, status, "recheck answered with a failing status");
            ProbeOutcome::Inactive
        }
        Ok(Err(e)) => {
            debug!(%url, error = %e, "recheck request failed");
            ProbeOutcome::Inactive
        }
        Err(_) => {
            debug!(%url, ?timeout, "recheck timed out");
            ProbeOutcome::Inactive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn probe_path(server: &MockServer, route: &str) -> ProbeOutcome {
        let probe = ReqwestProbe::new(TIMEOUT).unwrap();
        let url = format!("{}{}", server.uri(), route);
        recheck_probe(&probe, &url, TIMEOUT, false).await
    }

    #[test]
    fn test_recheck_target_defaults_to_https() {
        let url = recheck_target("example.com", true).unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_recheck_target_upgrades_and_strips() {
        let url = recheck_target("http://Example.com/about?utm=x#top", true).unwrap();
        assert_eq!(url.as_str(), "https://example.com/about");

        let url = recheck_target("http://example.com:8080/a", false).unwrap();
        assert_eq!(url.as_str(), "http://example.com:8080/a");
    }

    #[test]
    fn test_recheck_target_rejects_non_http() {
        assert!(recheck_target("ftp://example.com", true).is_none());
        assert!(recheck_target("https://", true).is_none());
        assert!(recheck_target("exa mple.com", true).is_none());
    }

    #[test]
    fn test_live_status_range() {
        assert!(is_live_status(200));
        assert!(is_live_status(301));
        assert!(is_live_status(399));
        assert!(!is_live_status(199));
        assert!(!is_live_status(400));
        assert!(!is_live_status(503));
    }

    #[tokio::test]
    async fn test_head_ok_is_active() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert_eq!(probe_path(&server, "/").await, ProbeOutcome::Active);
    }

    #[tokio::test]
    async fn test_redirect_is_active_without_following() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/moved"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", "http://127.0.0.1:9/gone"),
            )
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(probe_path(&server, "/moved").await, ProbeOutcome::Active);
    }

    #[tokio::test]
    async fn test_error_status_is_inactive() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert_eq!(probe_path(&server, "/missing").await, ProbeOutcome::Inactive);
        assert_eq!(probe_path(&server, "/down").await, ProbeOutcome::Inactive);
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let probe = ReqwestProbe::new(TIMEOUT).unwrap();
        let outcome =
            recheck_probe(&probe, &server.uri(), Duration::from_millis(100), false).await;
        assert_eq!(outcome, ProbeOutcome::Inactive);
    }

    #[tokio::test]
    async fn test_refused_connection_is_inactive() {
        // Grab a free port, then close it so nothing is listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let probe = ReqwestProbe::new(TIMEOUT).unwrap();
        let url = format!("http://127.0.0.1:{port}/");
        assert_eq!(
            recheck_probe(&probe, &url, TIMEOUT, false).await,
            ProbeOutcome::Inactive
        );
    }
}
