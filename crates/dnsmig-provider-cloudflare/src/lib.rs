// # Cloudflare DNS Provider
//
// This crate provides a Cloudflare DNS provider implementation for the
// ownership migrator.
//
// ## Behavior
//
// - Zones are addressed by name and resolved to an id once per provider
// - Listing follows `result_info.total_pages` with 100 records per page
// - Cloudflare keeps one content per record, so each listed record has
//   exactly one value; several TXT records may share a name
// - Updates keep the record's TTL and `proxied` flag
// - No retry, no backoff and no dry-run: the engine owns those decisions
// - HTTP timeout configured (30 seconds)
//
// ## Security Requirements
//
// - Credentials NEVER appear in logs or Debug output
// - Credentials are provided via environment variables only
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?page=&per_page=`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use dnsmig_core::config::ProviderConfig;
use dnsmig_core::traits::{DnsProvider, DnsProviderFactory};
use dnsmig_core::{Error, Record, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Records per page when listing a zone
const PAGE_SIZE: u32 = 100;

const PROVIDER: &str = "cloudflare";

/// How requests are authenticated
#[derive(Clone)]
pub enum Credentials {
    /// Scoped API token, sent as a Bearer token
    Token(String),
    /// Legacy global API key with the account email
    Key { key: String, email: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(<REDACTED>)"),
            Credentials::Key { email, .. } => f
                .debug_struct("Key")
                .field("key", &"<REDACTED>")
                .field("email", email)
                .finish(),
        }
    }
}

impl Credentials {
    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Credentials::Token(token) => request.bearer_auth(token),
            Credentials::Key { key, email } => request
                .header("X-Auth-Key", key)
                .header("X-Auth-Email", email),
        }
    }
}

/// Cloudflare API envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

/// A DNS record as Cloudflare returns and accepts it
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DnsRecord {
    #[serde(default, skip_serializing)]
    id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
    ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    proxied: Option<bool>,
}

impl From<DnsRecord> for Record {
    fn from(record: DnsRecord) -> Self {
        let extra = match record.proxied {
            Some(proxied) => serde_json::json!({ "proxied": proxied }),
            None => serde_json::Value::Null,
        };
        let mut out = Record::new(record.name, record.record_type, record.ttl, vec![record.content])
            .with_extra(extra);
        out.id = record.id;
        out
    }
}

impl TryFrom<&Record> for DnsRecord {
    type Error = Error;

    fn try_from(record: &Record) -> Result<Self> {
        let content = match record.values.as_slice() {
            [content] => content.clone(),
            values => {
                return Err(Error::provider(
                    PROVIDER,
                    format!(
                        "record {} must carry exactly one value, got {}",
                        record,
                        values.len()
                    ),
                ));
            }
        };

        Ok(Self {
            id: record.id.clone(),
            name: record.name.trim_end_matches('.').to_string(),
            record_type: record.record_type.clone(),
            content,
            ttl: record.ttl,
            proxied: record.extra.get("proxied").and_then(serde_json::Value::as_bool),
        })
    }
}

/// Cloudflare DNS provider
///
/// Stateless apart from the zone name → id lookups made during a run.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose credentials.
pub struct CloudflareProvider {
    /// ⚠️ NEVER log this value
    credentials: Credentials,

    /// API base URL, overridable for tests
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Zone name → zone id
    zone_ids: Mutex<HashMap<String, String>>,
}

impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// Fails if the credentials are empty or the HTTP client cannot be built.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let empty = match &credentials {
            Credentials::Token(token) => token.is_empty(),
            Credentials::Key { key, email } => key.is_empty() || email.is_empty(),
        };
        if empty {
            return Err(Error::config("Cloudflare credentials cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
            zone_ids: Mutex::new(HashMap::new()),
        })
    }

    /// Point the provider at another API endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<Envelope<T>> {
        let response = self
            .credentials
            .apply(request)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed while {}: {}", context, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::from_status(PROVIDER, status.as_u16(), context, &body));
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            Error::provider(PROVIDER, format!("Failed to parse response while {}: {}", context, e))
        })?;

        if !envelope.success {
            let messages: Vec<String> = envelope
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect();
            return Err(Error::provider(
                PROVIDER,
                format!("{} failed: {}", context, messages.join(", ")),
            ));
        }

        Ok(envelope)
    }

    /// Resolve a zone name to its id, once per zone
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// ```
    async fn zone_id(&self, zone: &str) -> Result<String> {
        let zone = zone.trim_end_matches('.');
        if let Some(id) = self
            .zone_ids
            .lock()
            .ok()
            .and_then(|ids| ids.get(zone).cloned())
        {
            return Ok(id);
        }

        tracing::debug!("Looking up zone ID for zone: {}", zone);
        let request = self
            .client
            .get(format!("{}/zones", self.base_url))
            .query(&[("name", zone)]);
        let envelope: Envelope<Vec<Zone>> = self.send(request, "looking up zone").await?;

        let id = envelope
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|z| z.id)
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone)))?;

        tracing::debug!("Found zone ID: {}", id);
        if let Ok(mut ids) = self.zone_ids.lock() {
            ids.insert(zone.to_string(), id.clone());
        }
        Ok(id)
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, zone_id)
    }

    fn record_id<'a>(&self, record: &'a Record, action: &'static str) -> Result<&'a str> {
        record.id.as_deref().ok_or_else(|| {
            Error::provider_mutation(action, &record.name, "record has no Cloudflare id")
        })
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones/:zone_id/dns_records?page=1&per_page=100
    /// ```
    async fn list_records(&self, zone: &str) -> Result<Vec<Record>> {
        let zone_id = self
            .zone_id(zone)
            .await
            .map_err(|e| Error::provider_list(zone, e.to_string()))?;

        let mut records = Vec::new();
        let mut page = 1;
        loop {
            let request = self.client.get(self.records_url(&zone_id)).query(&[
                ("page", page.to_string()),
                ("per_page", PAGE_SIZE.to_string()),
            ]);
            let envelope: Envelope<Vec<DnsRecord>> = self
                .send(request, "listing records")
                .await
                .map_err(|e| Error::provider_list(zone, e.to_string()))?;

            records.extend(envelope.result.unwrap_or_default().into_iter().map(Record::from));

            let total_pages = envelope.result_info.map(|i| i.total_pages).unwrap_or(1);
            tracing::debug!("Fetched page {}/{} of zone {}", page, total_pages, zone);
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id   (POST without an id)
    /// { "name": ..., "type": ..., "content": ..., "ttl": ..., "proxied": ... }
    /// ```
    async fn upsert_record(&self, zone: &str, record: &Record) -> Result<()> {
        let zone_id = self.zone_id(zone).await?;
        let body = DnsRecord::try_from(record)?;

        let request = match record.id.as_deref() {
            Some(id) => self
                .client
                .put(format!("{}/{}", self.records_url(&zone_id), id)),
            None => self.client.post(self.records_url(&zone_id)),
        };

        self.send::<serde_json::Value>(request.json(&body), "updating record")
            .await?;
        tracing::debug!("Cloudflare record upserted: {}", record);
        Ok(())
    }

    /// ```http
    /// DELETE /zones/:zone_id/dns_records/:record_id
    /// ```
    async fn delete_record(&self, zone: &str, record: &Record) -> Result<()> {
        let zone_id = self.zone_id(zone).await?;
        let id = self.record_id(record, "delete")?;

        let request = self
            .client
            .delete(format!("{}/{}", self.records_url(&zone_id), id));
        self.send::<serde_json::Value>(request, "deleting record")
            .await?;
        tracing::debug!("Cloudflare record deleted: {}", record);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Factory for creating Cloudflare providers
pub struct CloudflareFactory;

#[async_trait]
impl DnsProviderFactory for CloudflareFactory {
    async fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Cloudflare {
                api_token,
                api_key,
                email,
            } => {
                let credentials = match (api_token, api_key, email) {
                    (Some(token), _, _) if !token.is_empty() => Credentials::Token(token.clone()),
                    (_, Some(key), Some(email)) => Credentials::Key {
                        key: key.clone(),
                        email: email.clone(),
                    },
                    _ => {
                        return Err(Error::config(
                            "Cloudflare API token, or API key and email, are required",
                        ));
                    }
                };
                Ok(Box::new(CloudflareProvider::new(credentials)?))
            }
            _ => Err(Error::config("Invalid config for Cloudflare provider")),
        }
    }
}

/// Register the Cloudflare provider with a registry
///
/// # Example
///
/// ```rust
/// use dnsmig_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// dnsmig_provider_cloudflare::register(&registry);
/// assert!(registry.has_provider("cloudflare"));
/// ```
pub fn register(registry: &dnsmig_core::ProviderRegistry) {
    registry.register_provider(PROVIDER, Box::new(CloudflareFactory));
}
