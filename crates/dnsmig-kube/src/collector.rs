//! Live hostname collectors
//!
//! Each collector lists one kind of resource across all namespaces and
//! returns the hostnames it declares. The list-to-hostname projections are
//! plain functions over the fetched objects so they can be tested without a
//! cluster.

use crate::pagination::list_all_paginated;
use crate::rules::extract_hosts;
use dnsmig_core::config::Mode;
use dnsmig_core::{Error, HostnameSet, HostnameSource, Result};
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{ApiResource, DynamicObject, ListParams};
use kube::core::GroupVersionKind;
use kube::{Api, Client, ResourceExt};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Annotation prefix that marks a resource as managed by external-dns
pub const EXTERNAL_DNS_ANNOTATION_PREFIX: &str = "external-dns.alpha.kubernetes.io/";

fn has_external_dns_annotation<K: ResourceExt>(object: &K) -> bool {
    object
        .annotations()
        .keys()
        .any(|key| key.starts_with(EXTERNAL_DNS_ANNOTATION_PREFIX))
}

fn traefik_ingress_route() -> ApiResource {
    let gvk = GroupVersionKind::gvk("traefik.io", "v1alpha1", "IngressRoute");
    ApiResource::from_gvk_with_plural(&gvk, "ingressroutes")
}

/// Rule hosts of the given Ingresses
///
/// With `annotated_only`, Ingresses without any external-dns annotation are
/// ignored.
pub fn hosts_from_ingresses(ingresses: &[Ingress], annotated_only: bool) -> Vec<String> {
    ingresses
        .iter()
        .filter(|ingress| !annotated_only || has_external_dns_annotation(*ingress))
        .filter_map(|ingress| ingress.spec.as_ref())
        .filter_map(|spec| spec.rules.as_ref())
        .flatten()
        .filter_map(|rule| rule.host.clone())
        .filter(|host| !host.is_empty())
        .collect()
}

/// ``Host(...)`` hostnames of the given IngressRoutes
///
/// Match rules without a usable ``Host(...)`` matcher are logged and skipped.
pub fn hosts_from_ingress_routes(routes: &[DynamicObject]) -> Vec<String> {
    let mut hosts = Vec::new();
    for route in routes {
        let Some(entries) = route
            .data
            .get("spec")
            .and_then(|spec| spec.get("routes"))
            .and_then(Value::as_array)
        else {
            continue;
        };

        for rule in entries
            .iter()
            .filter_map(|entry| entry.get("match").and_then(Value::as_str))
            .filter(|rule| !rule.is_empty())
        {
            match extract_hosts(rule) {
                Some(found) => hosts.extend(found),
                None => warn!(
                    "Cannot extract hostname from IngressRoute match rule: {} ({}/{})",
                    rule,
                    route.namespace().unwrap_or_default(),
                    route.name_any()
                ),
            }
        }
    }
    hosts
}

/// Hostnames carried by external-dns annotations of the given Services
///
/// An annotation value may list several hostnames separated by commas.
pub fn hosts_from_services(services: &[Service]) -> Vec<String> {
    services
        .iter()
        .flat_map(|service| service.annotations().iter())
        .filter(|(key, _)| key.starts_with(EXTERNAL_DNS_ANNOTATION_PREFIX))
        .flat_map(|(_, value)| value.split(','))
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect()
}

/// Hostnames of all Ingresses in the cluster
pub async fn ingress_hostnames(client: &Client, annotated_only: bool) -> Result<Vec<String>> {
    let api: Api<Ingress> = Api::all(client.clone());
    let ingresses = list_all_paginated(&api, ListParams::default())
        .await
        .map_err(|e| Error::hostname_collection(format!("Cannot list Ingresses: {}", e)))?;

    let hosts = hosts_from_ingresses(&ingresses, annotated_only);
    debug!(
        "Collected {} hostnames from {} Ingresses",
        hosts.len(),
        ingresses.len()
    );
    Ok(hosts)
}

/// Hostnames of all Traefik IngressRoutes in the cluster
///
/// A cluster without the IngressRoute CRD yields no hostnames.
pub async fn ingress_route_hostnames(client: &Client) -> Result<Vec<String>> {
    let api: Api<DynamicObject> = Api::all_with(client.clone(), &traefik_ingress_route());
    let routes = match list_all_paginated(&api, ListParams::default()).await {
        Ok(routes) => routes,
        Err(kube::Error::Api(response)) if response.code == 404 => {
            warn!("IngressRoute resource not available in the cluster, skipping");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(Error::hostname_collection(format!(
                "Cannot list IngressRoutes: {}",
                e
            )));
        }
    };

    let hosts = hosts_from_ingress_routes(&routes);
    debug!(
        "Collected {} hostnames from {} IngressRoutes",
        hosts.len(),
        routes.len()
    );
    Ok(hosts)
}

/// Hostnames declared through external-dns annotations on Services
pub async fn service_hostnames(client: &Client) -> Result<Vec<String>> {
    let api: Api<Service> = Api::all(client.clone());
    let services = list_all_paginated(&api, ListParams::default())
        .await
        .map_err(|e| Error::hostname_collection(format!("Cannot list Services: {}", e)))?;

    let hosts = hosts_from_services(&services);
    debug!(
        "Collected {} hostnames from {} Services",
        hosts.len(),
        services.len()
    );
    Ok(hosts)
}

/// The live hostname set for a run mode
///
/// Migration only considers Ingresses that external-dns manages (they carry
/// one of its annotations); deletion keeps every Ingress host, annotated or
/// not. Both add IngressRoute and Service hostnames.
pub async fn live_hostnames(client: &Client, mode: Mode) -> Result<HostnameSet> {
    let annotated_only = mode == Mode::Migrate;

    let mut live = HostnameSet::new();
    live.extend(
        ingress_hostnames(client, annotated_only).await?,
        HostnameSource::Ingress,
    );
    live.extend(
        ingress_route_hostnames(client).await?,
        HostnameSource::IngressRoute,
    );
    live.extend(service_hostnames(client).await?, HostnameSource::Service);

    info!("Found {} live hostnames for {}", live.len(), mode);
    Ok(live)
}
