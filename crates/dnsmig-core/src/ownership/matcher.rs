//! Ownership matching over a record snapshot
//!
//! All functions here are pure: they take the zone snapshot returned by
//! [`DnsProvider::list_records`](crate::traits::DnsProvider::list_records)
//! and never call the provider themselves.

use super::codec;
use super::naming::TxtNames;
use crate::record::Record;

/// One TXT record evaluated against an owner
#[derive(Debug, Clone, PartialEq)]
pub struct OwnershipClaim<'a> {
    /// The ownership TXT record
    pub record: &'a Record,
    /// The owner that was tested
    pub owner: String,
    /// Whether the record matched the type-suffixed TXT name
    pub matched_by_type_suffix: bool,
}

/// The first record in the snapshot answering for `hostname`
///
/// When several record types share a name the first one encountered wins;
/// its type decides the type-suffixed TXT name.
pub fn managed_record<'a>(hostname: &str, records: &'a [Record]) -> Option<&'a Record> {
    records.iter().find(|record| record.has_name(hostname))
}

fn lookup<'a>(hostname: &str, prefix: &str, records: &'a [Record]) -> Vec<(&'a Record, bool)> {
    let Some(managed) = managed_record(hostname, records) else {
        return Vec::new();
    };
    let names = TxtNames::new(prefix, &managed.record_type, hostname);

    records
        .iter()
        .filter(|record| record.is_txt())
        .filter_map(|record| {
            names
                .matches(&record.name)
                .map(|typed| (record, typed))
        })
        .collect()
}

/// All ownership TXT records for `hostname`
///
/// Empty when the hostname has no record in the snapshot.
pub fn lookup_ownership_records<'a>(
    hostname: &str,
    prefix: &str,
    records: &'a [Record],
) -> Vec<&'a Record> {
    lookup(hostname, prefix, records)
        .into_iter()
        .map(|(record, _)| record)
        .collect()
}

/// Whether any value entry of `record` names `owner`
pub fn owner_claims(record: &Record, owner: &str) -> bool {
    record.values.iter().any(|entry| codec::claims(entry, owner))
}

/// The ownership TXT records for `hostname` that claim `owner`
pub fn ownership_claims<'a>(
    hostname: &str,
    prefix: &str,
    records: &'a [Record],
    owner: &str,
) -> Vec<OwnershipClaim<'a>> {
    lookup(hostname, prefix, records)
        .into_iter()
        .filter(|(record, _)| owner_claims(record, owner))
        .map(|(record, typed)| OwnershipClaim {
            record,
            owner: owner.to_string(),
            matched_by_type_suffix: typed,
        })
        .collect()
}

/// Every non-TXT record whose ownership TXT records claim `owner`
pub fn owned_records<'a>(records: &'a [Record], prefix: &str, owner: &str) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| !record.is_txt())
        .filter(|record| !ownership_claims(&record.name, prefix, records, owner).is_empty())
        .collect()
}
