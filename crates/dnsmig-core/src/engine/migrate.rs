//! Owner migration
//!
//! The whole rewrite plan is computed from the snapshot before the first
//! upsert, so a malformed ownership entry aborts the run with nothing
//! changed.

use super::{EngineEvent, OwnershipEngine, RunReport};
use crate::config::Mode;
use crate::error::{Error, Result};
use crate::hostnames::HostnameSet;
use crate::ownership::{lookup_ownership_records, parse_owner, rewrite_owner};
use crate::record::Record;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// One TXT registry record whose owner entries will be rewritten
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate<'a> {
    /// Live hostname the record was reached from
    pub hostname: String,
    /// The record as listed
    pub before: &'a Record,
    /// The record to upsert: same name, type, TTL and provider data
    pub after: Record,
    /// Number of value entries that changed owner
    pub rewritten: usize,
}

/// Compute every owner rewrite for the live hostnames
///
/// Hostnames are visited in sorted order. A TXT record reached from more
/// than one hostname is planned once. Entries owned by someone else are
/// carried over untouched.
///
/// Fails with [`Error::OwnerKeyMissing`] if any ownership entry on a
/// visited TXT record has no owner key.
pub fn plan_migration<'a>(
    records: &'a [Record],
    live: &HostnameSet,
    prefix: &str,
    old_owner: &str,
    new_owner: &str,
) -> Result<Vec<PlannedUpdate<'a>>> {
    let mut seen = HashSet::new();
    let mut plan = Vec::new();

    for hostname in live.iter() {
        let ownership = lookup_ownership_records(hostname, prefix, records);
        if ownership.is_empty() {
            debug!("No ownership records for live hostname {}", hostname);
            continue;
        }

        for txt in ownership {
            if !seen.insert(txt.key()) {
                continue;
            }

            let mut rewritten = 0;
            let mut values = Vec::with_capacity(txt.values.len());
            for entry in &txt.values {
                let owner = parse_owner(entry).map_err(|_| {
                    warn!("Ownership entry on {} has no owner key: {}", txt, entry);
                    Error::OwnerKeyMissing(entry.clone())
                })?;

                if owner == old_owner {
                    values.push(rewrite_owner(entry, new_owner)?);
                    rewritten += 1;
                } else {
                    values.push(entry.clone());
                }
            }

            if rewritten > 0 {
                plan.push(PlannedUpdate {
                    hostname: hostname.to_string(),
                    before: txt,
                    after: txt.with_values(values),
                    rewritten,
                });
            }
        }
    }

    Ok(plan)
}

impl OwnershipEngine {
    /// Move the TXT registry entries of live hostnames from `old_owner`
    /// to `new_owner`
    ///
    /// Listing failures and malformed ownership entries abort the run
    /// before anything is written. Individual upsert failures are logged,
    /// counted in the report, and the run continues.
    pub async fn migrate(
        &self,
        live: &HostnameSet,
        old_owner: &str,
        new_owner: &str,
    ) -> Result<RunReport> {
        if old_owner == new_owner {
            return Err(Error::config("New owner ID must differ from the old owner ID"));
        }

        let mut report = RunReport::new(Mode::Migrate, self.config.dry_run);
        info!(
            live_hostnames = live.len(),
            old_owner, new_owner, "Starting owner migration"
        );

        let records = self.snapshot().await?;
        let plan = plan_migration(&records, live, &self.config.prefix, old_owner, new_owner)?;
        info!("Planned {} ownership record update(s)", plan.len());

        for update in plan {
            let record = &update.after;
            info!(
                "Updating record: {} with values: {}{}",
                record,
                record.values.join(","),
                self.dry_run_suffix()
            );

            if self.config.dry_run {
                report.record(EngineEvent::updated(record));
                continue;
            }

            match self.provider.upsert_record(&self.config.zone, record).await {
                Ok(()) => {
                    debug!(
                        "Rewrote {} entr(ies) on {} for {}",
                        update.rewritten, record, update.hostname
                    );
                    report.record(EngineEvent::updated(record));
                }
                Err(e) => {
                    let err = Error::provider_mutation("upsert", &record.name, e.to_string());
                    error!("{}", err);
                    report.record(EngineEvent::failed(record, "upsert", &err));
                }
            }
        }

        info!("{}", report);
        Ok(report)
    }
}
