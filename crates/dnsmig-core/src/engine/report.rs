//! Run events and the per-run report

use crate::config::Mode;
use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Events emitted by the OwnershipEngine
///
/// Under dry-run the `RecordUpdated` and `RecordDeleted` events describe
/// the change that would have been made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// TXT registry record rewritten to the new owner
    RecordUpdated {
        name: String,
        record_type: String,
        values: Vec<String>,
    },

    /// Record removed from the zone
    RecordDeleted { name: String, record_type: String },

    /// Owned record kept because its hostname is still live
    RecordSkipped {
        name: String,
        record_type: String,
        reason: String,
    },

    /// A single upsert or delete call failed; the run continued
    MutationFailed {
        name: String,
        record_type: String,
        action: String,
        error: String,
    },
}

impl EngineEvent {
    pub(crate) fn updated(record: &Record) -> Self {
        Self::RecordUpdated {
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            values: record.values.clone(),
        }
    }

    pub(crate) fn deleted(record: &Record) -> Self {
        Self::RecordDeleted {
            name: record.name.clone(),
            record_type: record.record_type.clone(),
        }
    }

    pub(crate) fn skipped(record: &Record, reason: impl Into<String>) -> Self {
        Self::RecordSkipped {
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn failed(record: &Record, action: &str, error: &crate::Error) -> Self {
        Self::MutationFailed {
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            action: action.to_string(),
            error: error.to_string(),
        }
    }

    /// Name of the record the event is about
    pub fn record_name(&self) -> &str {
        match self {
            Self::RecordUpdated { name, .. }
            | Self::RecordDeleted { name, .. }
            | Self::RecordSkipped { name, .. }
            | Self::MutationFailed { name, .. } => name,
        }
    }
}

/// Outcome of one migrate or delete run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: Mode,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub events: Vec<EngineEvent>,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn new(mode: Mode, dry_run: bool) -> Self {
        Self {
            mode,
            dry_run,
            started_at: Utc::now(),
            events: Vec::new(),
            updated: 0,
            deleted: 0,
            skipped: 0,
            failed: 0,
        }
    }

    /// Append an event and bump the matching counter
    pub fn record(&mut self, event: EngineEvent) {
        match &event {
            EngineEvent::RecordUpdated { .. } => self.updated += 1,
            EngineEvent::RecordDeleted { .. } => self.deleted += 1,
            EngineEvent::RecordSkipped { .. } => self.skipped += 1,
            EngineEvent::MutationFailed { .. } => self.failed += 1,
        }
        self.events.push(event);
    }

    /// Whether every intended mutation went through
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Events of one kind, e.g. `report.names(|e| matches!(e, EngineEvent::RecordDeleted { .. }))`
    pub fn names(&self, filter: impl Fn(&EngineEvent) -> bool) -> Vec<&str> {
        self.events
            .iter()
            .filter(|event| filter(event))
            .map(EngineEvent::record_name)
            .collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} finished{}: {} updated, {} deleted, {} skipped, {} failed",
            self.mode,
            if self.dry_run { " (dry run)" } else { "" },
            self.updated,
            self.deleted,
            self.skipped,
            self.failed
        )
    }
}
