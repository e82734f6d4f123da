// # dnsmig-core
//
// Core library for migrating and cleaning up external-dns TXT registry
// ownership across DNS providers.
//
// ## Architecture Overview
//
// - **Record**: Provider-neutral view of one DNS record set
// - **ownership**: Marker codec, TXT registry naming and owner matching
// - **HostnameSet**: Hostnames currently declared in the cluster
// - **DnsProvider**: Trait for listing and changing records via provider APIs
// - **OwnershipEngine**: Migration and safe-deletion over one zone snapshot
// - **ProviderRegistry**: Plugin-based registry for DNS providers
//
// ## Design Principles
//
// 1. **Snapshot first**: Every decision is taken against one complete listing
// 2. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 3. **Library-First**: The CLI is a thin layer over this crate
// 4. **Dry-run by the engine**: Providers never decide whether to mutate

pub mod config;
pub mod engine;
pub mod error;
pub mod hostnames;
pub mod ownership;
pub mod record;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{EngineConfig, KubeConfig, MigratorConfig, Mode, ProviderConfig};
pub use engine::{EngineEvent, OwnershipEngine, RunReport};
pub use error::{Error, Result};
pub use hostnames::{HostnameSet, HostnameSource};
pub use record::Record;
pub use registry::ProviderRegistry;
pub use traits::{DnsProvider, DnsProviderFactory};
