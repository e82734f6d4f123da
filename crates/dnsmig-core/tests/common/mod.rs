//! Test doubles and common utilities for engine contract tests
//!
//! This module provides an in-memory DnsProvider that applies upserts and
//! deletes to a shared zone, counts every call, and can be told to fail.

#![allow(dead_code)]

use dnsmig_core::error::{Error, Result};
use dnsmig_core::traits::DnsProvider;
use dnsmig_core::{HostnameSet, HostnameSource, Record};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const PREFIX: &str = "ext";
pub const ZONE: &str = "example.com";

/// An ownership entry exactly as external-dns writes it
pub fn marker(owner: &str) -> String {
    format!(
        "heritage=external-dns,external-dns/owner={},external-dns/resource=ingress/default/foo",
        owner
    )
}

/// `foo.example.com` A record with plain and typed TXT registry records
/// owned by `owner`, plus an unrelated record owned by someone else
pub fn scenario_zone(owner: &str) -> Vec<Record> {
    vec![
        Record::new("foo.example.com.", "A", 300, vec!["10.0.0.1".into()]),
        Record::new("ext-foo.example.com.", "TXT", 300, vec![marker(owner)]),
        Record::new("ext-a-foo.example.com.", "TXT", 300, vec![marker(owner)]),
        Record::new("bar.example.com.", "CNAME", 300, vec!["lb.example.net.".into()]),
        Record::new("ext-cname-bar.example.com.", "TXT", 300, vec![marker("elsewhere")]),
    ]
}

/// Two weighted `foo.example.com` A sets, "blue" and "green", each with
/// its own typed TXT registry record owned by `owner`
pub fn weighted_zone(owner: &str) -> Vec<Record> {
    ["blue", "green"]
        .into_iter()
        .flat_map(|id| {
            [
                Record::new("foo.example.com.", "A", 60, vec!["10.0.0.1".into()]).with_id(id),
                Record::new("ext-a-foo.example.com.", "TXT", 60, vec![marker(owner)])
                    .with_id(id),
            ]
        })
        .collect()
}

/// Hostnames declared by Ingresses
pub fn live(hosts: &[&str]) -> HostnameSet {
    hosts.iter().map(|h| (*h, HostnameSource::Ingress)).collect()
}

/// An in-memory provider that tracks calls
pub struct InMemoryProvider {
    /// Current zone content
    zone: Arc<Mutex<Vec<Record>>>,
    /// Call counter for list_records()
    list_call_count: Arc<AtomicUsize>,
    /// Call counter for upsert_record()
    upsert_call_count: Arc<AtomicUsize>,
    /// Call counter for delete_record()
    delete_call_count: Arc<AtomicUsize>,
    /// Names passed to upsert_record(), in call order
    upserted: Arc<Mutex<Vec<String>>>,
    /// Names passed to delete_record(), in call order
    deleted: Arc<Mutex<Vec<String>>>,
    /// Record names whose mutations fail
    failing: Arc<Mutex<HashSet<String>>>,
    /// Whether list_records() fails
    fail_list: Arc<AtomicBool>,
}

impl InMemoryProvider {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            zone: Arc::new(Mutex::new(records)),
            list_call_count: Arc::new(AtomicUsize::new(0)),
            upsert_call_count: Arc::new(AtomicUsize::new(0)),
            delete_call_count: Arc::new(AtomicUsize::new(0)),
            upserted: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
            fail_list: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a new provider that shares zone and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            zone: Arc::clone(&other.zone),
            list_call_count: Arc::clone(&other.list_call_count),
            upsert_call_count: Arc::clone(&other.upsert_call_count),
            delete_call_count: Arc::clone(&other.delete_call_count),
            upserted: Arc::clone(&other.upserted),
            deleted: Arc::clone(&other.deleted),
            failing: Arc::clone(&other.failing),
            fail_list: Arc::clone(&other.fail_list),
        }
    }

    /// Make every upsert or delete of `name` fail
    pub fn fail_mutations_for(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    /// Make list_records() fail
    pub fn fail_listing(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    pub fn upsert_call_count(&self) -> usize {
        self.upsert_call_count.load(Ordering::SeqCst)
    }

    pub fn delete_call_count(&self) -> usize {
        self.delete_call_count.load(Ordering::SeqCst)
    }

    pub fn mutation_count(&self) -> usize {
        self.upsert_call_count() + self.delete_call_count()
    }

    pub fn upserted(&self) -> Vec<String> {
        self.upserted.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// Current zone content
    pub fn records(&self) -> Vec<Record> {
        self.zone.lock().unwrap().clone()
    }

    /// First record with the given name and type
    pub fn find(&self, name: &str, record_type: &str) -> Option<Record> {
        self.records()
            .into_iter()
            .find(|r| r.name == name && r.record_type == record_type)
    }

    fn check_failure(&self, action: &'static str, record: &Record) -> Result<()> {
        if self.failing.lock().unwrap().contains(&record.name) {
            return Err(Error::provider("memory", format!("injected {} failure", action)));
        }
        Ok(())
    }
}

fn same_record(a: &Record, b: &Record) -> bool {
    a.name == b.name && a.record_type == b.record_type && a.id == b.id
}

#[async_trait::async_trait]
impl DnsProvider for InMemoryProvider {
    async fn list_records(&self, zone: &str) -> Result<Vec<Record>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::provider_list(zone, "injected list failure"));
        }
        Ok(self.records())
    }

    async fn upsert_record(&self, _zone: &str, record: &Record) -> Result<()> {
        self.upsert_call_count.fetch_add(1, Ordering::SeqCst);
        self.upserted.lock().unwrap().push(record.name.clone());
        self.check_failure("upsert", record)?;

        let mut zone = self.zone.lock().unwrap();
        match zone.iter_mut().find(|r| same_record(r, record)) {
            Some(existing) => *existing = record.clone(),
            None => zone.push(record.clone()),
        }
        Ok(())
    }

    async fn delete_record(&self, _zone: &str, record: &Record) -> Result<()> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);
        self.deleted.lock().unwrap().push(record.name.clone());
        self.check_failure("delete", record)?;

        self.zone.lock().unwrap().retain(|r| !same_record(r, record));
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
