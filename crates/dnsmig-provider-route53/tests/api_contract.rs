//! Contract Test: Route53 API usage
//!
//! Constraints verified:
//! - Listing follows NextRecordName/NextRecordType until not truncated
//! - Quoted TXT values are returned unchanged
//! - Upserts and deletes go through ChangeResourceRecordSets
//! - Escaped wildcard names and weighted sets reach the engine intact

use aws_sdk_route53::Client;
use aws_sdk_route53::config::{BehaviorVersion, Credentials, Region};
use dnsmig_core::traits::DnsProvider;
use dnsmig_core::{EngineConfig, HostnameSet, HostnameSource, OwnershipEngine, Record};
use dnsmig_provider_route53::Route53Provider;
use wiremock::matchers::{body_string_contains, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RRSET_PATH: &str = "/2013-04-01/hostedzone/Z123/rrset";

fn provider(server: &MockServer) -> Route53Provider {
    let config = aws_sdk_route53::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
        .endpoint_url(server.uri())
        .build();
    Route53Provider::new(Client::from_conf(config))
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/xml")
        .set_body_string(body.to_string())
}

const FIRST_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListResourceRecordSetsResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
  <ResourceRecordSets>
    <ResourceRecordSet>
      <Name>foo.example.com.</Name>
      <Type>A</Type>
      <TTL>300</TTL>
      <ResourceRecords><ResourceRecord><Value>10.0.0.1</Value></ResourceRecord></ResourceRecords>
    </ResourceRecordSet>
  </ResourceRecordSets>
  <IsTruncated>true</IsTruncated>
  <NextRecordName>ext-foo.example.com.</NextRecordName>
  <NextRecordType>TXT</NextRecordType>
  <MaxItems>300</MaxItems>
</ListResourceRecordSetsResponse>"#;

const SECOND_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListResourceRecordSetsResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
  <ResourceRecordSets>
    <ResourceRecordSet>
      <Name>ext-foo.example.com.</Name>
      <Type>TXT</Type>
      <TTL>300</TTL>
      <ResourceRecords><ResourceRecord><Value>"heritage=external-dns,external-dns/owner=infra"</Value></ResourceRecord></ResourceRecords>
    </ResourceRecordSet>
  </ResourceRecordSets>
  <IsTruncated>false</IsTruncated>
  <MaxItems>300</MaxItems>
</ListResourceRecordSetsResponse>"#;

const CHANGE_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ChangeResourceRecordSetsResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
  <ChangeInfo>
    <Id>/change/C2682N5HXP0BZ4</Id>
    <Status>PENDING</Status>
    <SubmittedAt>2024-01-01T00:00:00Z</SubmittedAt>
  </ChangeInfo>
</ChangeResourceRecordSetsResponse>"#;

#[tokio::test]
async fn list_follows_next_record_markers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RRSET_PATH))
        .and(query_param_is_missing("name"))
        .respond_with(xml(FIRST_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(RRSET_PATH))
        .and(query_param("name", "ext-foo.example.com."))
        .and(query_param("type", "TXT"))
        .respond_with(xml(SECOND_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let records = provider(&server).list_records("Z123").await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "foo.example.com.");
    assert_eq!(records[0].values, vec!["10.0.0.1".to_string()]);
    assert_eq!(
        records[1].values,
        vec!["\"heritage=external-dns,external-dns/owner=infra\"".to_string()]
    );
}

#[tokio::test]
async fn upsert_sends_upsert_change() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RRSET_PATH))
        .and(body_string_contains("<Action>UPSERT</Action>"))
        .and(body_string_contains("external-dns/owner=infra2"))
        .respond_with(xml(CHANGE_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let record = Record::new(
        "ext-foo.example.com.",
        "TXT",
        300,
        vec!["\"heritage=external-dns,external-dns/owner=infra2\"".into()],
    );
    provider(&server).upsert_record("Z123", &record).await.unwrap();
}

#[tokio::test]
async fn delete_sends_delete_change() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RRSET_PATH))
        .and(body_string_contains("<Action>DELETE</Action>"))
        .and(body_string_contains("<Name>foo.example.com.</Name>"))
        .respond_with(xml(CHANGE_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let record = Record::new("foo.example.com.", "A", 300, vec!["10.0.0.1".into()]);
    provider(&server).delete_record("Z123", &record).await.unwrap();
}

const WEIGHTED_AND_WILDCARD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListResourceRecordSetsResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
  <ResourceRecordSets>
    <ResourceRecordSet>
      <Name>\052.example.com.</Name>
      <Type>A</Type>
      <TTL>300</TTL>
      <ResourceRecords><ResourceRecord><Value>10.0.0.9</Value></ResourceRecord></ResourceRecords>
    </ResourceRecordSet>
    <ResourceRecordSet>
      <Name>ext-a-\052.example.com.</Name>
      <Type>TXT</Type>
      <TTL>300</TTL>
      <ResourceRecords><ResourceRecord><Value>"heritage=external-dns,external-dns/owner=infra"</Value></ResourceRecord></ResourceRecords>
    </ResourceRecordSet>
    <ResourceRecordSet>
      <Name>foo.example.com.</Name>
      <Type>A</Type>
      <SetIdentifier>blue</SetIdentifier>
      <Weight>50</Weight>
      <TTL>60</TTL>
      <ResourceRecords><ResourceRecord><Value>10.0.0.1</Value></ResourceRecord></ResourceRecords>
    </ResourceRecordSet>
    <ResourceRecordSet>
      <Name>foo.example.com.</Name>
      <Type>A</Type>
      <SetIdentifier>green</SetIdentifier>
      <Weight>50</Weight>
      <TTL>60</TTL>
      <ResourceRecords><ResourceRecord><Value>10.0.0.2</Value></ResourceRecord></ResourceRecords>
    </ResourceRecordSet>
    <ResourceRecordSet>
      <Name>ext-a-foo.example.com.</Name>
      <Type>TXT</Type>
      <SetIdentifier>blue</SetIdentifier>
      <Weight>50</Weight>
      <TTL>60</TTL>
      <ResourceRecords><ResourceRecord><Value>"heritage=external-dns,external-dns/owner=infra"</Value></ResourceRecord></ResourceRecords>
    </ResourceRecordSet>
    <ResourceRecordSet>
      <Name>ext-a-foo.example.com.</Name>
      <Type>TXT</Type>
      <SetIdentifier>green</SetIdentifier>
      <Weight>50</Weight>
      <TTL>60</TTL>
      <ResourceRecords><ResourceRecord><Value>"heritage=external-dns,external-dns/owner=infra"</Value></ResourceRecord></ResourceRecords>
    </ResourceRecordSet>
  </ResourceRecordSets>
  <IsTruncated>false</IsTruncated>
  <MaxItems>300</MaxItems>
</ListResourceRecordSetsResponse>"#;

#[tokio::test]
async fn list_decodes_names_and_keeps_set_identifiers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RRSET_PATH))
        .respond_with(xml(WEIGHTED_AND_WILDCARD))
        .mount(&server)
        .await;

    let records = provider(&server).list_records("Z123").await.unwrap();

    assert_eq!(records[0].name, "*.example.com.");
    assert_eq!(records[1].name, "ext-a-*.example.com.");
    let ids: Vec<_> = records[2..].iter().map(|r| r.id.as_deref()).collect();
    assert_eq!(ids, vec![Some("blue"), Some("green"), Some("blue"), Some("green")]);
}

#[tokio::test]
async fn deletion_skips_live_wildcard_and_removes_every_weighted_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RRSET_PATH))
        .respond_with(xml(WEIGHTED_AND_WILDCARD))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RRSET_PATH))
        .and(body_string_contains("<Action>DELETE</Action>"))
        .respond_with(xml(CHANGE_RESPONSE))
        .expect(4)
        .mount(&server)
        .await;

    let engine = OwnershipEngine::new(
        Box::new(provider(&server)),
        EngineConfig::new("Z123", "ext", false),
    )
    .unwrap();
    let mut live = HostnameSet::new();
    live.insert("*.example.com", HostnameSource::Ingress);

    let report = engine.delete_owned(&live, "infra").await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.deleted, 4);
    assert_eq!(report.failed, 0);

    let bodies: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.method.as_str() == "POST")
        .map(|request| String::from_utf8_lossy(&request.body).into_owned())
        .collect();
    assert!(bodies.iter().all(|body| !body.contains("*.example.com")));
    assert_eq!(
        bodies.iter().filter(|body| body.contains("<SetIdentifier>blue</SetIdentifier>")).count(),
        2
    );
    assert_eq!(
        bodies.iter().filter(|body| body.contains("<SetIdentifier>green</SetIdentifier>")).count(),
        2
    );
}
