//! Mapping between Route53 record sets and [`Record`]
//!
//! Route53 deletes only match a record set that is identical to the stored
//! one, so routing-policy attributes and alias targets travel in
//! [`Record::extra`]:
//!
//! ```text
//! set_identifier, weight, region, failover, multi_value_answer,
//! health_check_id, alias_target { hosted_zone_id, dns_name, evaluate_target_health }
//! ```
//!
//! The set identifier doubles as [`Record::id`]: weighted, latency and
//! failover sets share a name and type and differ only by it.
//!
//! Route53 returns names with special characters escaped as `\ddd` octal
//! codes (`\052.example.com.` for a wildcard); [`to_record`] decodes them.

use aws_sdk_route53::error::BuildError;
use aws_sdk_route53::types::{
    AliasTarget, ResourceRecord, ResourceRecordSet, ResourceRecordSetFailover,
    ResourceRecordSetRegion, RrType,
};
use dnsmig_core::{Error, Record, Result};
use serde_json::{Map, Value, json};

fn build_error(e: BuildError) -> Error {
    Error::provider("route53", format!("Invalid record set: {}", e))
}

fn octal_escape(bytes: &[u8]) -> Option<u8> {
    match bytes {
        [b'\\', a @ b'0'..=b'3', b @ b'0'..=b'7', c @ b'0'..=b'7', ..] => {
            Some((*a - b'0') * 64 + (*b - b'0') * 8 + (*c - b'0'))
        }
        _ => None,
    }
}

/// Decode the `\ddd` octal escapes Route53 uses in record names
pub fn decode_name(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match octal_escape(&bytes[i..]) {
            Some(byte) => {
                decoded.push(byte);
                i += 4;
            }
            None => {
                decoded.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

/// Project a Route53 record set onto a [`Record`]
pub fn to_record(set: &ResourceRecordSet) -> Record {
    let values = set
        .resource_records()
        .iter()
        .map(|r| r.value().to_string())
        .collect();

    let mut extra = Map::new();
    if let Some(id) = set.set_identifier() {
        extra.insert("set_identifier".into(), json!(id));
    }
    if let Some(weight) = set.weight() {
        extra.insert("weight".into(), json!(weight));
    }
    if let Some(region) = set.region() {
        extra.insert("region".into(), json!(region.as_str()));
    }
    if let Some(failover) = set.failover() {
        extra.insert("failover".into(), json!(failover.as_str()));
    }
    if let Some(multi) = set.multi_value_answer() {
        extra.insert("multi_value_answer".into(), json!(multi));
    }
    if let Some(check) = set.health_check_id() {
        extra.insert("health_check_id".into(), json!(check));
    }
    if let Some(alias) = set.alias_target() {
        extra.insert(
            "alias_target".into(),
            json!({
                "hosted_zone_id": alias.hosted_zone_id(),
                "dns_name": alias.dns_name(),
                "evaluate_target_health": alias.evaluate_target_health(),
            }),
        );
    }

    let ttl = set
        .ttl()
        .and_then(|ttl| u32::try_from(ttl).ok())
        .unwrap_or(0);
    let extra = if extra.is_empty() {
        Value::Null
    } else {
        Value::Object(extra)
    };

    let record = Record::new(decode_name(set.name()), set.r#type().as_str(), ttl, values)
        .with_extra(extra);
    match set.set_identifier() {
        Some(id) => record.with_id(id),
        None => record,
    }
}

fn alias_target(alias: &Value) -> Result<AliasTarget> {
    let field = |key: &str| alias.get(key).and_then(Value::as_str).unwrap_or_default();
    AliasTarget::builder()
        .hosted_zone_id(field("hosted_zone_id"))
        .dns_name(field("dns_name"))
        .evaluate_target_health(
            alias
                .get("evaluate_target_health")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        )
        .build()
        .map_err(build_error)
}

/// Rebuild the Route53 record set for a [`Record`]
pub fn to_record_set(record: &Record) -> Result<ResourceRecordSet> {
    let extra = &record.extra;
    let mut builder = ResourceRecordSet::builder()
        .name(&record.name)
        .r#type(RrType::from(record.record_type.as_str()));

    match extra.get("alias_target") {
        Some(alias) => builder = builder.alias_target(alias_target(alias)?),
        None => {
            builder = builder.ttl(i64::from(record.ttl));
            for value in &record.values {
                builder = builder.resource_records(
                    ResourceRecord::builder()
                        .value(value)
                        .build()
                        .map_err(build_error)?,
                );
            }
        }
    }

    if let Some(id) = extra.get("set_identifier").and_then(Value::as_str) {
        builder = builder.set_identifier(id);
    }
    if let Some(weight) = extra.get("weight").and_then(Value::as_i64) {
        builder = builder.weight(weight);
    }
    if let Some(region) = extra.get("region").and_then(Value::as_str) {
        builder = builder.region(ResourceRecordSetRegion::from(region));
    }
    if let Some(failover) = extra.get("failover").and_then(Value::as_str) {
        builder = builder.failover(ResourceRecordSetFailover::from(failover));
    }
    if let Some(multi) = extra.get("multi_value_answer").and_then(Value::as_bool) {
        builder = builder.multi_value_answer(multi);
    }
    if let Some(check) = extra.get("health_check_id").and_then(Value::as_str) {
        builder = builder.health_check_id(check);
    }

    builder.build().map_err(build_error)
}
