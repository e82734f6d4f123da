// # AWS Route53 DNS Provider
//
// This crate provides a Route53 DNS provider implementation for the
// ownership migrator.
//
// ## Behavior
//
// - The zone is the hosted zone ID (`Z...`, with or without `/hostedzone/`)
// - Listing follows `NextRecordName` / `NextRecordType` /
//   `NextRecordIdentifier` until the response is no longer truncated
// - Upserts use a single `UPSERT` change; deletes send the record set
//   exactly as it was listed
// - Credentials come from the default AWS provider chain
// - No retry, no backoff and no dry-run beyond what the SDK does itself
//
// ## API Reference
//
// - ListResourceRecordSets: GET `/2013-04-01/hostedzone/:id/rrset`
// - ChangeResourceRecordSets: POST `/2013-04-01/hostedzone/:id/rrset`

pub mod convert;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_route53::Client;
use aws_sdk_route53::config::Region;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{Change, ChangeAction, ChangeBatch, RrType};
use dnsmig_core::config::ProviderConfig;
use dnsmig_core::traits::{DnsProvider, DnsProviderFactory};
use dnsmig_core::{Error, Record, Result};

const PROVIDER: &str = "route53";

/// Records requested per page
const PAGE_SIZE: i32 = 300;

/// AWS Route53 DNS provider
#[derive(Debug, Clone)]
pub struct Route53Provider {
    client: Client,
}

impl Route53Provider {
    /// Wrap an already configured SDK client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Load configuration from the environment (default credential chain)
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;
        Self::new(Client::new(&config))
    }

    async fn change(&self, zone: &str, action: ChangeAction, record: &Record) -> Result<()> {
        let batch = ChangeBatch::builder()
            .changes(
                Change::builder()
                    .action(action.clone())
                    .resource_record_set(convert::to_record_set(record)?)
                    .build()
                    .map_err(|e| Error::provider(PROVIDER, e.to_string()))?,
            )
            .build()
            .map_err(|e| Error::provider(PROVIDER, e.to_string()))?;

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(zone)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, DisplayErrorContext(&e).to_string()))?;

        tracing::debug!("Route53 {} submitted for {}", action.as_str(), record);
        Ok(())
    }
}

#[async_trait]
impl DnsProvider for Route53Provider {
    async fn list_records(&self, zone: &str) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut next: Option<(String, Option<RrType>, Option<String>)> = None;

        loop {
            let mut request = self
                .client
                .list_resource_record_sets()
                .hosted_zone_id(zone)
                .max_items(PAGE_SIZE);
            if let Some((name, record_type, identifier)) = next.take() {
                request = request
                    .start_record_name(name)
                    .set_start_record_type(record_type)
                    .set_start_record_identifier(identifier);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::provider_list(zone, DisplayErrorContext(&e).to_string()))?;

            records.extend(
                response
                    .resource_record_sets()
                    .iter()
                    .map(convert::to_record),
            );

            if !response.is_truncated() {
                break;
            }
            match response.next_record_name() {
                Some(name) => {
                    next = Some((
                        name.to_string(),
                        response.next_record_type().cloned(),
                        response.next_record_identifier().map(str::to_string),
                    ));
                }
                None => break,
            }
        }

        tracing::debug!("Listed {} record sets in hosted zone {}", records.len(), zone);
        Ok(records)
    }

    async fn upsert_record(&self, zone: &str, record: &Record) -> Result<()> {
        self.change(zone, ChangeAction::Upsert, record).await
    }

    async fn delete_record(&self, zone: &str, record: &Record) -> Result<()> {
        self.change(zone, ChangeAction::Delete, record).await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Factory for creating Route53 providers
pub struct Route53Factory;

#[async_trait]
impl DnsProviderFactory for Route53Factory {
    async fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Route53 { region } => {
                Ok(Box::new(Route53Provider::from_env(region.clone()).await))
            }
            _ => Err(Error::config("Invalid config for Route53 provider")),
        }
    }
}

/// Register the Route53 provider with a registry
pub fn register(registry: &dnsmig_core::ProviderRegistry) {
    registry.register_provider(PROVIDER, Box::new(Route53Factory));
}
