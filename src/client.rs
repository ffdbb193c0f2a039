use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::cache::{ResponseCache, SharedCache};
use crate::error::{PainelError, Result};
use crate::models::{MomItem, MomPayload, MomSeries, Statement, StatementKind, StatementPayload};
use crate::settings::Settings;

/// Where report data comes from. The HTTP client is the production source;
/// tests substitute fixtures.
pub trait ReportSource: Send + Sync {
    fn statement(&self, kind: StatementKind) -> Result<Statement>;
    fn mom(&self, series: MomSeries) -> Result<Vec<MomItem>>;
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    http: Client,
    cache: Option<SharedCache>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, cache: Option<SharedCache>) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PainelError::Other(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            http,
            cache,
        })
    }

    pub fn from_settings(settings: &Settings, use_cache: bool) -> Result<Self> {
        let cache = use_cache.then(|| ResponseCache::shared(Duration::from_secs(settings.cache_ttl_secs)));
        Self::new(
            &settings.api_url,
            Duration::from_secs(settings.request_timeout_secs),
            cache,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn cached(&self, key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        let guard = cache.lock().ok()?;
        if !guard.has(key) {
            debug!(key, "cache miss");
            return None;
        }
        guard.get(key).map(str::to_string)
    }

    fn remember(&self, key: String, body: String) {
        if let Some(cache) = &self.cache {
            if let Ok(mut guard) = cache.lock() {
                let dropped = guard.purge_expired_at(Instant::now());
                if dropped > 0 {
                    debug!(dropped, "purged expired cache entries");
                }
                guard.set(key, body);
            }
        }
    }

    /// GET an endpoint and decode it. Only bodies that decode successfully
    /// are cached, so an error payload is retried on the next request.
    fn fetch<T>(&self, endpoint: &str, decode: fn(&str) -> Result<T>) -> Result<T> {
        let url = self.url(endpoint);
        let timeout = self.timeout.as_secs().to_string();
        let key = ResponseCache::key(&url, &[("timeout", timeout.as_str())]);

        if let Some(body) = self.cached(&key) {
            debug!(%url, "cache hit");
            return decode(&body);
        }

        info!(%url, "GET");
        let resp = self.http.get(&url).send()?;
        let status = resp.status();
        let body = resp.text()?;

        if !status.is_success() {
            warn!(%url, %status, "backend returned failure status");
            return Err(api_error_from_body(&body)
                .unwrap_or_else(|| PainelError::Api(format!("HTTP {status} from {url}"))));
        }

        let value = decode(&body)?;
        self.remember(key, body);
        Ok(value)
    }
}

impl ReportSource for ApiClient {
    fn statement(&self, kind: StatementKind) -> Result<Statement> {
        self.fetch(kind.endpoint(), decode_statement)
    }

    fn mom(&self, series: MomSeries) -> Result<Vec<MomItem>> {
        self.fetch(series.endpoint(), decode_mom)
    }
}

fn api_error_from_body(body: &str) -> Option<PainelError> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    let msg = v
        .get("error")
        .or_else(|| v.get("message"))
        .and_then(|m| m.as_str())?;
    Some(PainelError::Api(msg.to_string()))
}

pub fn decode_statement(body: &str) -> Result<Statement> {
    match serde_json::from_str::<StatementPayload>(body)? {
        StatementPayload::Failure { error } => Err(PainelError::Api(error)),
        StatementPayload::Success(mut statement) => {
            statement.assign_ids();
            Ok(statement)
        }
    }
}

pub fn decode_mom(body: &str) -> Result<Vec<MomItem>> {
    let payload: MomPayload = serde_json::from_str(body)?;
    if !payload.success {
        let msg = payload
            .error
            .unwrap_or_else(|| "backend reported success=false".to_string());
        return Err(PainelError::Api(msg));
    }
    Ok(payload.data.map(|d| d.mom_analysis).unwrap_or_default())
}
