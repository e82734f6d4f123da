//! Plugin-based provider registry
//!
//! The registry allows DNS providers to be registered dynamically at
//! runtime, avoiding hardcoded if-else chains in the CLI.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dnsmig_core::registry::ProviderRegistry;
//! use dnsmig_core::config::ProviderConfig;
//!
//! let registry = ProviderRegistry::new();
//! dnsmig_provider_cloudflare::register(&registry);
//!
//! let config = ProviderConfig::Cloudflare { api_token: Some(token), api_key: None, email: None };
//! let provider = registry.create_provider(&config).await?;
//! ```
//!
//! ## Registration
//!
//! Each provider crate exposes a `register` function:
//!
//! ```rust,ignore
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_provider("cloudflare", Box::new(CloudflareFactory));
//! }
//! ```

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsProviderFactory};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

fn poisoned<T>(_: PoisonError<T>) -> Error {
    Error::Other("Provider registry lock poisoned".to_string())
}

/// Provider registry for plugin-based DNS provider creation
///
/// The registry maintains a map of provider type names to factory objects,
/// allowing dynamic instantiation of providers based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn DnsProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory under a type name
    ///
    /// Registering the same name twice replaces the earlier factory.
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let name = name.into();
        match self.providers.write() {
            Ok(mut providers) => {
                providers.insert(name, Arc::from(factory));
            }
            Err(_) => tracing::error!("Provider registry lock poisoned, cannot register {}", name),
        }
    }

    /// Create a DNS provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error)`: If provider type is not registered or creation fails
    pub async fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        let provider_type = config.type_name();

        // Release the lock before calling async create
        let factory = {
            let providers = self.providers.read().map_err(poisoned)?;
            providers
                .get(provider_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?
        };

        factory.create(config).await
    }

    /// List all registered provider types, sorted
    pub fn list_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = match self.providers.read() {
            Ok(providers) => providers.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        self.providers
            .read()
            .map(|providers| providers.contains_key(name))
            .unwrap_or(false)
    }
}
