//! Test-only, scripted `Geocoder` used by unit and behaviour tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::{AddressResult, GeocodeError, Geocoder};

/// Scripted `Geocoder` recording every query it receives.
///
/// Responses are keyed by the exact query string. Queries without a script
/// resolve to an empty result set immediately. Clones share the script and
/// the call log, so a test can hand one clone to a resolver and inspect the
/// other.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use pinpoint_core::{AddressResult, Geocoder, test_support::StubGeocoder};
///
/// # tokio_test_block_on(async {
/// let stub = StubGeocoder::new()
///     .with_results("ber", vec![AddressResult::new("Berlin, Germany", 52.5, 13.4)])
///     .with_delay("ber", Duration::from_millis(5));
///
/// let results = stub.search("ber").await?;
/// assert_eq!(results.len(), 1);
/// assert_eq!(stub.calls(), vec!["ber".to_owned()]);
/// # Ok::<(), pinpoint_core::GeocodeError>(())
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(future: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(future)
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StubGeocoder {
    script: Arc<Mutex<Script>>,
}

#[derive(Debug, Default)]
struct Script {
    responses: HashMap<String, StubResponse>,
    calls: Vec<String>,
}

#[derive(Debug, Clone)]
struct StubResponse {
    outcome: Result<Vec<AddressResult>, GeocodeError>,
    delay: Duration,
}

impl Default for StubResponse {
    fn default() -> Self {
        Self {
            outcome: Ok(Vec::new()),
            delay: Duration::ZERO,
        }
    }
}

impl StubGeocoder {
    /// Create a geocoder with no scripted queries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `results`.
    #[must_use]
    pub fn with_results(self, query: &str, results: Vec<AddressResult>) -> Self {
        self.respond_with(query, results);
        self
    }

    /// Fail `query` with `error`.
    #[must_use]
    pub fn with_error(self, query: &str, error: GeocodeError) -> Self {
        self.fail_with(query, error);
        self
    }

    /// Hold the answer to `query` back for `delay`.
    #[must_use]
    pub fn with_delay(self, query: &str, delay: Duration) -> Self {
        self.delay(query, delay);
        self
    }

    /// Script `query` to succeed with `results`, keeping any delay.
    pub fn respond_with(&self, query: &str, results: Vec<AddressResult>) {
        self.lock().response(query).outcome = Ok(results);
    }

    /// Script `query` to fail with `error`, keeping any delay.
    pub fn fail_with(&self, query: &str, error: GeocodeError) {
        self.lock().response(query).outcome = Err(error);
    }

    /// Delay the answer to `query`.
    pub fn delay(&self, query: &str, delay: Duration) {
        self.lock().response(query).delay = delay;
    }

    /// Queries received so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Script {
    fn response(&mut self, query: &str) -> &mut StubResponse {
        self.responses.entry(query.to_owned()).or_default()
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<AddressResult>, GeocodeError> {
        let response = {
            let mut script = self.lock();
            script.calls.push(query.to_owned());
            script.responses.get(query).cloned().unwrap_or_default()
        };
        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }
        response.outcome
    }
}
