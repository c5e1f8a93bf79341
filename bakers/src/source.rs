//! The injected fetch collaborator behind the baker directory.
//!
//! The directory only ever talks to a [`BakerSource`]; the reqwest-backed
//! [`HttpBakerSource`] is the production implementation and
//! [`NullBakerSource`] is a controllable in-memory one for deterministic
//! tests (it never touches the network).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::DirectoryError;

/// Path of the directory listing on the baker data service.
const BAKERS_PATH: &str = "/v2/bakers";

/// A source of raw, untrusted baker records.
///
/// Implementations must be idempotent-safe to call repeatedly and may fail;
/// the directory never retries on its own. Returned records are unvalidated —
/// normalization happens in the directory's fetch pipeline.
pub trait BakerSource: Send + Sync + 'static {
    fn fetch_raw(&self) -> BoxFuture<'_, Result<Vec<Value>, DirectoryError>>;
}

// ── HttpBakerSource ─────────────────────────────────────────────────────

/// HTTP source fetching the baker list from a directory service.
///
/// Wraps `reqwest::Client` with the service's base URL. A response body that
/// is valid JSON but not an array yields an empty record list rather than an
/// error.
#[derive(Clone)]
pub struct HttpBakerSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBakerSource {
    /// Create a source targeting the given base URL
    /// (e.g. `https://bakers.example.com`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DirectoryError::Source(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// The configured service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl BakerSource for HttpBakerSource {
    fn fetch_raw(&self) -> BoxFuture<'_, Result<Vec<Value>, DirectoryError>> {
        Box::pin(async move {
            let url = format!("{}{BAKERS_PATH}", self.base_url);
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| DirectoryError::Source(format!("request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(DirectoryError::Source(format!(
                    "directory service returned HTTP {}",
                    response.status()
                )));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| DirectoryError::Source(format!("invalid JSON response: {e}")))?;

            Ok(body.as_array().cloned().unwrap_or_default())
        })
    }
}

// ── NullBakerSource ─────────────────────────────────────────────────────

/// A controllable source for deterministic tests.
///
/// Returns a programmed response, counts how often it was called, and can
/// simulate slow services via an artificial delay.
pub struct NullBakerSource {
    response: Mutex<Result<Vec<Value>, DirectoryError>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl NullBakerSource {
    /// A source that answers every fetch with the given records.
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            response: Mutex::new(Ok(records)),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    /// A source that fails every fetch with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Mutex::new(Err(DirectoryError::Source(message.into()))),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    /// Delay each fetch, to widen race windows in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Replace the programmed response for subsequent fetches.
    pub fn set_response(&self, response: Result<Vec<Value>, DirectoryError>) {
        *self.response.lock().unwrap() = response;
    }

    /// How many fetches have been issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BakerSource for NullBakerSource {
    fn fetch_raw(&self) -> BoxFuture<'_, Result<Vec<Value>, DirectoryError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.response.lock().unwrap().clone();
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            response
        })
    }
}
