// # DNS Provider Trait
//
// Defines the interface the ownership engine uses to read and change a zone.
//
// ## Implementations
//
// - Cloudflare: `dnsmig-provider-cloudflare` crate
// - AWS Route53: `dnsmig-provider-route53` crate
// - Google Cloud DNS: `dnsmig-provider-gcp` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsmig_core::DnsProvider;
//
// async fn dump(provider: &dyn DnsProvider) -> dnsmig_core::Result<()> {
//     for record in provider.list_records("example.com").await? {
//         println!("{}", record);
//     }
//     Ok(())
// }
// ```

use crate::record::Record;
use async_trait::async_trait;

/// Trait for DNS provider implementations
///
/// Adapters translate between their native record sets and [`Record`].
/// They are single-shot: no retries, no caching between calls, and no
/// dry-run handling. The engine decides what to change and whether to
/// change it at all.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every record set in `zone`
    ///
    /// Implementations follow the provider's pagination to the end before
    /// returning; the engine relies on a complete snapshot.
    async fn list_records(&self, zone: &str) -> Result<Vec<Record>, crate::Error>;

    /// Create or replace one record set
    ///
    /// `record` is a snapshot record with its values replaced; adapters
    /// use its `id` and `extra` to address and preserve provider state.
    async fn upsert_record(&self, zone: &str, record: &Record) -> Result<(), crate::Error>;

    /// Delete one record set exactly as it appeared in the snapshot
    async fn delete_record(&self, zone: &str, record: &Record) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    ///
    /// # Returns
    ///
    /// A static string identifying the provider (e.g., "cloudflare", "route53")
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
///
/// Creation is async because some providers resolve credentials or
/// region settings over the network before they can be used.
#[async_trait]
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    async fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
