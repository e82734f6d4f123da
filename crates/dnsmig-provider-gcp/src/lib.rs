// # Google Cloud DNS Provider
//
// This crate provides a Cloud DNS provider implementation for the
// ownership migrator, talking to the v1 REST API directly.
//
// ## Behavior
//
// - The zone is the managed zone name; the project comes from configuration
// - Listing follows `nextPageToken`
// - Upserts patch the record set by name and type (created when missing);
//   deletes post a change carrying the listed record set as the deletion
// - Authentication uses a configured access token, or the token of the
//   instance service account from the metadata server
// - No retry, no backoff and no dry-run: the engine owns those decisions
//
// ## API Reference
//
// - List: GET `/dns/v1/projects/:project/managedZones/:zone/rrsets`
// - Patch: PATCH `/dns/v1/projects/:project/managedZones/:zone/rrsets/:name/:type`
// - Change: POST `/dns/v1/projects/:project/managedZones/:zone/changes`
// - Metadata token: GET `/computeMetadata/v1/instance/service-accounts/default/token`

use async_trait::async_trait;
use dnsmig_core::config::ProviderConfig;
use dnsmig_core::traits::{DnsProvider, DnsProviderFactory};
use dnsmig_core::{Error, Record, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Cloud DNS API base URL
const CLOUD_DNS_API_BASE: &str = "https://dns.googleapis.com";

/// GCE metadata server token endpoint
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER: &str = "gcp";

/// A resource record set as Cloud DNS returns and accepts it
///
/// Fields the migrator does not interpret (routing policies, DNSSEC
/// signatures) are kept in `other` and end up in [`Record::extra`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ResourceRecordSet {
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    ttl: u32,
    #[serde(default)]
    rrdatas: Vec<String>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl From<ResourceRecordSet> for Record {
    fn from(mut set: ResourceRecordSet) -> Self {
        set.other.remove("kind");
        let extra = if set.other.is_empty() {
            Value::Null
        } else {
            Value::Object(set.other)
        };
        Record::new(set.name, set.record_type, set.ttl, set.rrdatas).with_extra(extra)
    }
}

impl From<&Record> for ResourceRecordSet {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            ttl: record.ttl,
            rrdatas: record.values.clone(),
            other: record.extra.as_object().cloned().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    rrsets: Vec<ResourceRecordSet>,
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct Change {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    additions: Vec<ResourceRecordSet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    deletions: Vec<ResourceRecordSet>,
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// Where access tokens come from
#[derive(Clone)]
enum TokenSource {
    Static(String),
    Metadata(String),
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Static(_) => f.write_str("Static(<REDACTED>)"),
            TokenSource::Metadata(url) => f.debug_tuple("Metadata").field(url).finish(),
        }
    }
}

/// Google Cloud DNS provider
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the access token.
#[derive(Debug)]
pub struct GcpProvider {
    project: String,
    token_source: TokenSource,
    /// Token fetched from the metadata server, once per provider
    fetched_token: OnceCell<String>,
    base_url: String,
    client: reqwest::Client,
}

impl GcpProvider {
    /// Create a new Cloud DNS provider
    ///
    /// Without `access_token` the provider asks the metadata server for the
    /// instance service account token on first use.
    pub fn new(project: impl Into<String>, access_token: Option<String>) -> Result<Self> {
        let project = project.into();
        if project.is_empty() {
            return Err(Error::config("GCP project cannot be empty"));
        }

        let token_source = match access_token {
            Some(token) if !token.is_empty() => TokenSource::Static(token),
            _ => TokenSource::Metadata(METADATA_TOKEN_URL.to_string()),
        };

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            project,
            token_source,
            fetched_token: OnceCell::new(),
            base_url: CLOUD_DNS_API_BASE.to_string(),
            client,
        })
    }

    /// Point the provider at another API endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use another metadata token endpoint (only when no static token is set)
    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        if let TokenSource::Metadata(_) = self.token_source {
            self.token_source = TokenSource::Metadata(url.into());
        }
        self
    }

    async fn token(&self) -> Result<String> {
        match &self.token_source {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Metadata(url) => self
                .fetched_token
                .get_or_try_init(|| self.metadata_token(url))
                .await
                .cloned(),
        }
    }

    async fn metadata_token(&self, url: &str) -> Result<String> {
        tracing::debug!("Fetching access token from the metadata server");
        let response = self
            .client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| Error::auth(format!("metadata server unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::auth(format!(
                "metadata server refused token request: {}",
                response.status()
            )));
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("invalid metadata token response: {}", e)))?;
        Ok(token.access_token)
    }

    fn zone_url(&self, zone: &str) -> String {
        format!(
            "{}/dns/v1/projects/{}/managedZones/{}",
            self.base_url, self.project, zone
        )
    }

    fn rrset_url(&self, zone: &str, record: &Record) -> String {
        format!(
            "{}/rrsets/{}/{}",
            self.zone_url(zone),
            record.name,
            record.record_type
        )
    }

    async fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        Err(Error::from_status(PROVIDER, status.as_u16(), context, &body))
    }

    async fn submit(&self, zone: &str, change: &Change, context: &str) -> Result<()> {
        let token = self.token().await?;
        let response = self
            .client
            .post(format!("{}/changes", self.zone_url(zone)))
            .bearer_auth(token)
            .json(change)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed while {}: {}", context, e)))?;
        Self::check(response, context).await?;
        Ok(())
    }
}

#[async_trait]
impl DnsProvider for GcpProvider {
    async fn list_records(&self, zone: &str) -> Result<Vec<Record>> {
        let token = self
            .token()
            .await
            .map_err(|e| Error::provider_list(zone, e.to_string()))?;

        let mut records = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .get(format!("{}/rrsets", self.zone_url(zone)))
                .bearer_auth(&token);
            if let Some(page) = &page_token {
                request = request.query(&[("pageToken", page)]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::provider_list(zone, e.to_string()))?;
            let response = Self::check(response, "listing record sets")
                .await
                .map_err(|e| Error::provider_list(zone, e.to_string()))?;
            let page: ListResponse = response
                .json()
                .await
                .map_err(|e| Error::provider_list(zone, format!("invalid response: {}", e)))?;

            records.extend(page.rrsets.into_iter().map(Record::from));
            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        tracing::debug!("Listed {} record sets in managed zone {}", records.len(), zone);
        Ok(records)
    }

    /// Replace the record set in place, creating it if it is missing
    ///
    /// ```http
    /// PATCH /dns/v1/projects/:project/managedZones/:zone/rrsets/:name/:type
    /// POST  /dns/v1/projects/:project/managedZones/:zone/rrsets        (on 404)
    /// ```
    async fn upsert_record(&self, zone: &str, record: &Record) -> Result<()> {
        let token = self.token().await?;
        let body = ResourceRecordSet::from(record);

        let response = self
            .client
            .patch(self.rrset_url(zone, record))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed while patching record set: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("Record set {} not found, creating it", record);
            let response = self
                .client
                .post(format!("{}/rrsets", self.zone_url(zone)))
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    Error::http(format!("HTTP request failed while creating record set: {}", e))
                })?;
            Self::check(response, "creating record set").await?;
            return Ok(());
        }

        Self::check(response, "patching record set").await?;
        Ok(())
    }

    /// ```http
    /// POST /dns/v1/projects/:project/managedZones/:zone/changes
    /// { "deletions": [ <record set as listed> ] }
    /// ```
    async fn delete_record(&self, zone: &str, record: &Record) -> Result<()> {
        let change = Change {
            additions: Vec::new(),
            deletions: vec![ResourceRecordSet::from(record)],
        };
        self.submit(zone, &change, "deleting record set").await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Factory for creating Cloud DNS providers
pub struct GcpFactory;

#[async_trait]
impl DnsProviderFactory for GcpFactory {
    async fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Gcp {
                project,
                access_token,
            } => Ok(Box::new(GcpProvider::new(
                project.clone(),
                access_token.clone(),
            )?)),
            _ => Err(Error::config("Invalid config for GCP provider")),
        }
    }
}

/// Register the Cloud DNS provider with a registry
pub fn register(registry: &dnsmig_core::ProviderRegistry) {
    registry.register_provider(PROVIDER, Box::new(GcpFactory));
}
