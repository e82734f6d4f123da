//! Configuration types for the ownership migrator
//!
//! This module defines all configuration structures used throughout the
//! workspace. The CLI builds a [`MigratorConfig`] from flags and environment
//! variables; nothing here reads the environment itself.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete configuration for one migrator run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigratorConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Zone, prefix and dry-run settings shared by both operations
    pub engine: EngineConfig,

    /// Owner identifier currently written in the TXT registry
    pub owner_old: String,

    /// Owner identifier to migrate to (required for [`Mode::Migrate`])
    #[serde(default)]
    pub owner_new: Option<String>,

    /// Operations to run, in order
    pub modes: Vec<Mode>,

    /// Kubernetes client settings
    #[serde(default)]
    pub kube: KubeConfig,
}

impl MigratorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.engine.validate()?;
        self.kube.validate()?;

        if self.owner_old.is_empty() {
            return Err(crate::Error::config("Old owner ID cannot be empty"));
        }

        if self.modes.is_empty() {
            return Err(crate::Error::config(
                "Nothing to do: enable migrate, delete or both",
            ));
        }

        if self.modes.contains(&Mode::Migrate) {
            match self.owner_new.as_deref() {
                None | Some("") => {
                    return Err(crate::Error::config(
                        "New owner ID is required for migration",
                    ));
                }
                Some(new) if new == self.owner_old => {
                    return Err(crate::Error::config(
                        "New owner ID must differ from the old owner ID",
                    ));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Modes in execution order: migrate always runs before delete
    pub fn ordered_modes(&self) -> Vec<Mode> {
        let mut modes = self.modes.clone();
        modes.sort();
        modes.dedup();
        modes
    }
}

/// Operation performed by a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Rewrite the owner of live hostnames' TXT registry entries
    Migrate,
    /// Delete owned records no longer declared in the cluster
    Delete,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Migrate => f.write_str("migrate"),
            Mode::Delete => f.write_str("delete"),
        }
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    ///
    /// Either `api_token`, or `api_key` together with `email`.
    Cloudflare {
        /// Scoped API token (Bearer auth)
        #[serde(default)]
        api_token: Option<String>,
        /// Legacy global API key
        #[serde(default)]
        api_key: Option<String>,
        /// Account email paired with the legacy key
        #[serde(default)]
        email: Option<String>,
    },

    /// AWS Route53 provider; credentials come from the default AWS chain
    Route53 {
        /// Region override
        #[serde(default)]
        region: Option<String>,
    },

    /// Google Cloud DNS provider
    Gcp {
        /// GCP project that owns the managed zone
        project: String,
        /// OAuth2 access token; the metadata server is used when absent
        #[serde(default)]
        access_token: Option<String>,
    },
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                api_token,
                api_key,
                email,
            } => {
                if !is_blank(api_token) {
                    return Ok(());
                }
                if is_blank(api_key) || is_blank(email) {
                    return Err(crate::Error::config(
                        "Cloudflare needs an API token, or an API key together with an email",
                    ));
                }
                Ok(())
            }
            ProviderConfig::Route53 { .. } => Ok(()),
            ProviderConfig::Gcp { project, .. } => {
                if project.is_empty() {
                    return Err(crate::Error::config("GCP project cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
            ProviderConfig::Route53 { .. } => "route53",
            ProviderConfig::Gcp { .. } => "gcp",
        }
    }
}

/// Settings shared by migration and deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Provider-specific zone: Route53 hosted zone ID, Cloudflare zone name
    /// or Cloud DNS managed zone name
    pub zone: String,

    /// external-dns TXT registry prefix
    pub prefix: String,

    /// Report intended changes without calling the provider
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
}

fn default_dry_run() -> bool {
    true
}

impl EngineConfig {
    pub fn new(zone: impl Into<String>, prefix: impl Into<String>, dry_run: bool) -> Self {
        Self {
            zone: zone.into(),
            prefix: prefix.into(),
            dry_run,
        }
    }

    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone.is_empty() {
            return Err(crate::Error::config("DNS zone cannot be empty"));
        }
        if self.prefix.is_empty() {
            return Err(crate::Error::config("external-dns prefix cannot be empty"));
        }
        Ok(())
    }
}

/// Kubernetes client settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubeConfig {
    /// Explicit kubeconfig path; in-cluster or `~/.kube/config` when absent
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,

    /// Context to use from the kubeconfig
    #[serde(default)]
    pub context: Option<String>,
}

impl KubeConfig {
    /// Validate the Kubernetes settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if let Some(path) = &self.kubeconfig
            && !path.is_file()
        {
            return Err(crate::Error::config(format!(
                "Kubeconfig file not found: {}",
                path.display()
            )));
        }
        Ok(())
    }
}
