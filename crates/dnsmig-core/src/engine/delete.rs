//! Safe deletion of stale owned records

use super::{EngineEvent, OwnershipEngine, RunReport};
use crate::config::Mode;
use crate::error::{Error, Result};
use crate::hostnames::HostnameSet;
use crate::ownership::{lookup_ownership_records, owned_records};
use crate::record::Record;
use std::collections::HashSet;
use tracing::{debug, error, info};

type RecordKey = (String, String, Option<String>);

impl OwnershipEngine {
    /// Delete every record owned by `owner` whose hostname is not live,
    /// together with its TXT registry records
    ///
    /// TXT records are only ever deleted as the companions of an owned
    /// record. When deleting the owned record fails, its TXT records are
    /// left in place so that the record stays claimed.
    pub async fn delete_owned(&self, live: &HostnameSet, owner: &str) -> Result<RunReport> {
        let mut report = RunReport::new(Mode::Delete, self.config.dry_run);
        info!(
            live_hostnames = live.len(),
            owner, "Starting deletion of stale owned records"
        );

        let records = self.snapshot().await?;
        let owned = owned_records(&records, &self.config.prefix, owner);
        info!("Found {} record(s) owned by {}", owned.len(), owner);

        let mut deleted: HashSet<RecordKey> = HashSet::new();
        for record in owned {
            if let Some(source) = live.source_of(&record.name) {
                info!("Skipping record: {} {}", record.name, source.reason());
                report.record(EngineEvent::skipped(record, source.reason()));
                continue;
            }

            if !self.delete_one(record, &mut deleted, &mut report).await {
                continue;
            }

            for txt in lookup_ownership_records(&record.name, &self.config.prefix, &records) {
                self.delete_one(txt, &mut deleted, &mut report).await;
            }
        }

        info!("{}", report);
        Ok(report)
    }

    /// Delete one record unless it was already handled in this run
    ///
    /// Returns `false` only when the provider call failed.
    async fn delete_one(
        &self,
        record: &Record,
        deleted: &mut HashSet<RecordKey>,
        report: &mut RunReport,
    ) -> bool {
        if !deleted.insert(record.key()) {
            debug!("Record {} already deleted in this run", record);
            return true;
        }

        info!("Deleting record: {}{}", record, self.dry_run_suffix());
        if self.config.dry_run {
            report.record(EngineEvent::deleted(record));
            return true;
        }

        match self.provider.delete_record(&self.config.zone, record).await {
            Ok(()) => {
                report.record(EngineEvent::deleted(record));
                true
            }
            Err(e) => {
                let err = Error::provider_mutation("delete", &record.name, e.to_string());
                error!("{}", err);
                report.record(EngineEvent::failed(record, "delete", &err));
                false
            }
        }
    }
}
