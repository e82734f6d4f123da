//! Ownership reconciliation engine
//!
//! The OwnershipEngine is responsible for:
//! - Taking one complete snapshot of the zone through a DnsProvider
//! - Planning ownership rewrites for live hostnames (migration)
//! - Deleting owned records that no live hostname declares (deletion)
//! - Reporting every decision, and suppressing mutations under dry-run
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐   list_records    ┌────────────────┐
//! │ DnsProvider │ ────────────────▶ │ OwnershipEngine│ ◀── HostnameSet
//! └─────────────┘                   └────────────────┘
//!        ▲                                   │
//!        │   upsert_record / delete_record   │
//!        └───────────────────────────────────┘ (skipped under dry-run)
//! ```
//!
//! Calls are strictly sequential. The snapshot is never refreshed within
//! a run, so every decision is made against the same view of the zone.

mod delete;
mod migrate;
mod report;

pub use migrate::{PlannedUpdate, plan_migration};
pub use report::{EngineEvent, RunReport};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::record::Record;
use crate::traits::DnsProvider;
use tracing::info;

/// Core ownership engine
///
/// One engine is bound to one provider and one zone. Both entry points
/// list the zone afresh, so a migrate followed by a delete sees the
/// migrated state.
pub struct OwnershipEngine {
    /// DNS provider for reading and changing records
    provider: Box<dyn DnsProvider>,

    /// Zone, prefix and dry-run settings
    config: EngineConfig,
}

impl OwnershipEngine {
    /// Create a new engine
    ///
    /// Fails if the configuration does not validate.
    pub fn new(provider: Box<dyn DnsProvider>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    /// The engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// List the zone once; failures abort the run before any mutation
    async fn snapshot(&self) -> Result<Vec<Record>> {
        let records = self.provider.list_records(&self.config.zone).await?;
        info!(
            provider = self.provider.provider_name(),
            zone = %self.config.zone,
            records = records.len(),
            "Fetched zone snapshot"
        );
        Ok(records)
    }

    fn dry_run_suffix(&self) -> &'static str {
        if self.config.dry_run { " (dry run)" } else { "" }
    }
}
