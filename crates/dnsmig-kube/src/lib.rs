// # dnsmig-kube
//
// Collects the hostnames a cluster currently declares, so that the
// ownership engine knows which records are live.
//
// ## Sources
//
// - `Ingress` (`networking.k8s.io/v1`): `spec.rules[].host`
// - `IngressRoute` (`traefik.io/v1alpha1`): ``Host(`...`)`` terms of
//   `spec.routes[].match`
// - `Service` (`v1`): values of `external-dns.alpha.kubernetes.io/*`
//   annotations
//
// ## Behavior
//
// - All namespaces are listed, page by page
// - Any list failure is fatal, except a missing IngressRoute CRD
// - The collector never writes to the cluster

pub mod client;
pub mod collector;
pub mod pagination;
pub mod rules;

pub use client::client;
pub use collector::{
    EXTERNAL_DNS_ANNOTATION_PREFIX, ingress_hostnames, ingress_route_hostnames, live_hostnames,
    service_hostnames,
};
pub use rules::extract_hosts;
