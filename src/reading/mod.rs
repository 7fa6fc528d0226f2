//! Reading flow: cache, then backend, then cache again.
//!
//! Every reading kind runs the same sequence. Derive the cache key from
//! the request, serve a same-day hit without touching the backend, or
//! call the backend once and persist what it returned. Ad presentation is
//! the caller's move afterwards, detached, so a reading that has been
//! produced is returned even when every ad path fails.
//!
//! [`UsageMeter`] sits beside the flow and counts free-tier uses per day;
//! checking it before generating is the caller's policy, not the
//! service's.

mod limits;

pub use limits::{
    DEFAULT_DAILY_LIMIT, DEFAULT_MAX_BONUS, DEFAULT_USAGE_STORAGE_KEY, UsageConfig, UsageMeter,
};

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::cache::ResponseCache;
use crate::error::Result;
use crate::telemetry;
use crate::types::ReadingRequest;

/// Boundary to the generative AI service that writes the readings.
///
/// The crate never talks to a model directly; implementations wrap
/// whatever transport the app uses and surface failures as
/// [`Backend`](crate::SutradharError::Backend) errors.
#[async_trait]
pub trait ReadingBackend: Send + Sync {
    /// Short identifier used in logs and metric labels.
    fn name(&self) -> &str;

    /// Produce the reading payload for one request.
    async fn generate(&self, request: &ReadingRequest) -> Result<Value>;
}

/// Runs the cached reading flow over a [`ReadingBackend`].
pub struct ReadingService {
    backend: Arc<dyn ReadingBackend>,
    cache: Arc<ResponseCache>,
}

impl ReadingService {
    pub fn new(backend: Arc<dyn ReadingBackend>, cache: Arc<ResponseCache>) -> Self {
        Self { backend, cache }
    }

    /// The cache this service reads through.
    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Fetch a reading, hitting the backend at most once per UTC day for a
    /// given request.
    ///
    /// The language is folded into the cache key, so the same palm photo
    /// read in English and in Hindi costs two backend calls, not one
    /// mistranslated hit.
    #[instrument(skip(self, request), fields(feature = request.kind.as_str(), backend = self.backend.name()))]
    pub async fn reading(&self, request: &ReadingRequest) -> Result<Value> {
        let feature = request.kind.as_str();
        let input = cache_input(request);

        if let Some(value) = self.cache.get::<Value>(feature, &input) {
            debug!("reading served from cache");
            return Ok(value);
        }

        let start = Instant::now();
        let result = self.backend.generate(request).await;
        record_backend_request(self.backend.name(), feature, start, result.is_ok());
        let value = result?;

        self.cache.set(feature, &input, &value);
        Ok(value)
    }

    /// [`reading`](Self::reading) deserialized into a typed payload.
    pub async fn reading_as<T: DeserializeOwned>(&self, request: &ReadingRequest) -> Result<T> {
        let value = self.reading(request).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Cache input for a request: the raw input plus the language, so
/// translations never shadow each other.
fn cache_input(request: &ReadingRequest) -> Value {
    json!({
        "input": request.input,
        "language": request.language.as_str(),
    })
}

fn record_backend_request(backend: &str, feature: &str, start: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    let elapsed = start.elapsed().as_secs_f64();
    metrics::counter!(telemetry::BACKEND_REQUESTS_TOTAL,
        "backend" => backend.to_owned(),
        "feature" => feature.to_owned(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::BACKEND_REQUEST_DURATION_SECONDS,
        "backend" => backend.to_owned(),
        "feature" => feature.to_owned(),
    )
    .record(elapsed);
}
