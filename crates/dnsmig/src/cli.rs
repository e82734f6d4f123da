//! Command-line interface
//!
//! Every flag has a `MIGRATOR_*` environment fallback. Provider credentials
//! are only read from the environment and never accepted as flags.

use clap::{ArgAction, Parser, ValueEnum};
use dnsmig_core::{EngineConfig, Error, KubeConfig, MigratorConfig, Mode, ProviderConfig};
use std::path::PathBuf;

/// DNS provider hosting the zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// AWS Route53
    Aws,
    /// Cloudflare
    Cloudflare,
    /// Google Cloud DNS
    Gcp,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "dnsmig", version)]
#[command(about = "Migrate or clean up external-dns TXT ownership records", long_about = None)]
pub struct Cli {
    /// The cloud provider of the DNS zone to manage records in
    #[arg(long, value_enum, env = "MIGRATOR_PROVIDER")]
    pub provider: ProviderKind,

    /// AWS Route53 hosted zone ID
    #[arg(long, env = "MIGRATOR_AWS_ZONE_ID")]
    pub aws_zone_id: Option<String>,

    /// AWS region override (the default AWS chain applies otherwise)
    #[arg(long, env = "MIGRATOR_AWS_REGION")]
    pub aws_region: Option<String>,

    /// Cloudflare DNS zone name
    #[arg(long, env = "MIGRATOR_CF_ZONE_NAME")]
    pub cloudflare_zone_name: Option<String>,

    /// GCP project that owns the managed zone
    #[arg(long, env = "MIGRATOR_GCP_PROJECT")]
    pub gcp_project: Option<String>,

    /// Cloud DNS managed zone name
    #[arg(long, env = "MIGRATOR_GCP_MANAGED_ZONE")]
    pub gcp_managed_zone: Option<String>,

    /// Prefix of external-dns TXT records
    #[arg(long, env = "MIGRATOR_EXTERNAL_DNS_PREFIX")]
    pub external_dns_prefix: Option<String>,

    /// external-dns owner ID to be replaced (migrate) or cleaned up (delete)
    #[arg(long, env = "MIGRATOR_EXTERNAL_DNS_OWNER_ID_OLD")]
    pub external_dns_owner_id_old: Option<String>,

    /// New external-dns owner ID, required for migration
    #[arg(long, env = "MIGRATOR_EXTERNAL_DNS_OWNER_ID_NEW")]
    pub external_dns_owner_id_new: Option<String>,

    /// Move ownership of live hostnames to the new owner ID
    #[arg(long, env = "MIGRATOR_MIGRATE")]
    pub migrate: bool,

    /// Delete records of the old owner that no cluster resource declares anymore
    #[arg(long, env = "MIGRATOR_DELETE")]
    pub delete: bool,

    /// Report changes without applying them
    #[arg(long, env = "MIGRATOR_DRY_RUN", default_value_t = true, action = ArgAction::Set)]
    pub dry_run: bool,

    /// Path to a kubeconfig file (in-cluster or ~/.kube/config otherwise)
    #[arg(long, env = "MIGRATOR_KUBE_CONFIG")]
    pub kube_config: Option<PathBuf>,

    /// Kubernetes context to look for external-dns resources in
    #[arg(long, env = "MIGRATOR_KUBE_CONTEXT")]
    pub kube_context: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MIGRATOR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, env = "MIGRATOR_LOG_FORMAT", default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Provider credentials taken from the environment
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose any secret.
#[derive(Clone, Default)]
pub struct Credentials {
    pub cloudflare_api_token: Option<String>,
    pub cloudflare_api_key: Option<String>,
    pub cloudflare_email: Option<String>,
    pub gcp_access_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<REDACTED>");
        f.debug_struct("Credentials")
            .field("cloudflare_api_token", &redact(&self.cloudflare_api_token))
            .field("cloudflare_api_key", &redact(&self.cloudflare_api_key))
            .field("cloudflare_email", &self.cloudflare_email)
            .field("gcp_access_token", &redact(&self.gcp_access_token))
            .finish()
    }
}

impl Credentials {
    /// Read `CLOUDFLARE_API_TOKEN`, `CLOUDFLARE_API_KEY`, `CLOUDFLARE_EMAIL`
    /// and `GCP_ACCESS_TOKEN`; empty variables count as unset
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            cloudflare_api_token: var("CLOUDFLARE_API_TOKEN"),
            cloudflare_api_key: var("CLOUDFLARE_API_KEY"),
            cloudflare_email: var("CLOUDFLARE_EMAIL"),
            gcp_access_token: var("GCP_ACCESS_TOKEN"),
        }
    }
}

fn required(value: &Option<String>, flag: &str, provider: &str) -> Result<String, Error> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::config(format!(
            "--{} is required for the {} provider",
            flag, provider
        ))),
    }
}

impl Cli {
    /// Requested operations; migrate always runs before delete
    pub fn modes(&self) -> Vec<Mode> {
        let mut modes = Vec::new();
        if self.migrate {
            modes.push(Mode::Migrate);
        }
        if self.delete {
            modes.push(Mode::Delete);
        }
        modes
    }

    /// Build and validate the run configuration
    pub fn to_config(&self, credentials: Credentials) -> Result<MigratorConfig, Error> {
        let (provider, zone) = match self.provider {
            ProviderKind::Aws => (
                ProviderConfig::Route53 {
                    region: self.aws_region.clone(),
                },
                required(&self.aws_zone_id, "aws-zone-id", "aws")?,
            ),
            ProviderKind::Cloudflare => (
                ProviderConfig::Cloudflare {
                    api_token: credentials.cloudflare_api_token,
                    api_key: credentials.cloudflare_api_key,
                    email: credentials.cloudflare_email,
                },
                required(&self.cloudflare_zone_name, "cloudflare-zone-name", "cloudflare")?,
            ),
            ProviderKind::Gcp => (
                ProviderConfig::Gcp {
                    project: required(&self.gcp_project, "gcp-project", "gcp")?,
                    access_token: credentials.gcp_access_token,
                },
                required(&self.gcp_managed_zone, "gcp-managed-zone", "gcp")?,
            ),
        };

        let config = MigratorConfig {
            provider,
            engine: EngineConfig::new(
                zone,
                self.external_dns_prefix.clone().unwrap_or_default(),
                self.dry_run,
            ),
            owner_old: self.external_dns_owner_id_old.clone().unwrap_or_default(),
            owner_new: self.external_dns_owner_id_new.clone(),
            modes: self.modes(),
            kube: KubeConfig {
                kubeconfig: self.kube_config.clone(),
                context: self.kube_context.clone(),
            },
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dnsmig").chain(args.iter().copied())).unwrap()
    }

    fn cloudflare_token() -> Credentials {
        Credentials {
            cloudflare_api_token: Some("cf-token".into()),
            ..Default::default()
        }
    }

    const MIGRATE_AWS: &[&str] = &[
        "--provider",
        "aws",
        "--aws-zone-id",
        "Z123",
        "--external-dns-prefix",
        "ext",
        "--external-dns-owner-id-old",
        "infra",
        "--external-dns-owner-id-new",
        "infra2",
        "--migrate",
    ];

    const DELETE_AWS: &[&str] = &[
        "--provider",
        "aws",
        "--aws-zone-id",
        "Z123",
        "--external-dns-prefix",
        "ext",
        "--external-dns-owner-id-old",
        "infra",
        "--delete",
    ];

    #[test]
    fn dry_run_defaults_to_true() {
        let cli = parse(MIGRATE_AWS);
        assert!(cli.dry_run);

        let config = cli.to_config(Credentials::default()).unwrap();
        assert!(config.engine.dry_run);
        assert_eq!(config.engine.zone, "Z123");
        assert_eq!(config.modes, vec![Mode::Migrate]);
        assert_eq!(config.provider.type_name(), "route53");
    }

    #[test]
    fn dry_run_can_be_disabled() {
        let mut args = MIGRATE_AWS.to_vec();
        args.extend(["--dry-run", "false"]);
        let config = parse(&args).to_config(Credentials::default()).unwrap();
        assert!(!config.engine.dry_run);
    }

    #[test]
    fn migrate_requires_new_owner() {
        let cli = parse(&[
            "--provider",
            "aws",
            "--aws-zone-id",
            "Z123",
            "--external-dns-prefix",
            "ext",
            "--external-dns-owner-id-old",
            "infra",
            "--migrate",
        ]);
        assert!(matches!(
            cli.to_config(Credentials::default()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn delete_only_needs_old_owner() {
        let cli = parse(&[
            "--provider",
            "cloudflare",
            "--cloudflare-zone-name",
            "example.com",
            "--external-dns-prefix",
            "ext",
            "--external-dns-owner-id-old",
            "infra",
            "--delete",
        ]);
        let config = cli.to_config(cloudflare_token()).unwrap();
        assert_eq!(config.modes, vec![Mode::Delete]);
        assert_eq!(config.engine.zone, "example.com");
        assert!(config.owner_new.is_none());
    }

    #[test]
    fn nothing_to_do_is_rejected() {
        let cli = parse(&[
            "--provider",
            "aws",
            "--aws-zone-id",
            "Z123",
            "--external-dns-prefix",
            "ext",
            "--external-dns-owner-id-old",
            "infra",
        ]);
        assert!(cli.to_config(Credentials::default()).is_err());
    }

    #[test]
    fn provider_zone_is_required() {
        let cli = parse(&[
            "--provider",
            "cloudflare",
            "--external-dns-prefix",
            "ext",
            "--external-dns-owner-id-old",
            "infra",
            "--delete",
        ]);
        let err = cli.to_config(cloudflare_token()).unwrap_err();
        assert!(err.to_string().contains("--cloudflare-zone-name"));
    }

    #[test]
    fn cloudflare_needs_credentials() {
        let cli = parse(&[
            "--provider",
            "cloudflare",
            "--cloudflare-zone-name",
            "example.com",
            "--external-dns-prefix",
            "ext",
            "--external-dns-owner-id-old",
            "infra",
            "--delete",
        ]);
        assert!(cli.to_config(Credentials::default()).is_err());

        let legacy = Credentials {
            cloudflare_api_key: Some("key".into()),
            cloudflare_email: Some("ops@example.com".into()),
            ..Default::default()
        };
        assert!(cli.to_config(legacy).is_ok());
    }

    #[test]
    fn gcp_needs_project_and_zone() {
        let base = [
            "--provider",
            "gcp",
            "--external-dns-prefix",
            "ext",
            "--external-dns-owner-id-old",
            "infra",
            "--delete",
        ];
        assert!(parse(&base).to_config(Credentials::default()).is_err());

        let mut args = base.to_vec();
        args.extend(["--gcp-project", "acme", "--gcp-managed-zone", "example-zone"]);
        let config = parse(&args).to_config(Credentials::default()).unwrap();
        assert_eq!(config.engine.zone, "example-zone");
        assert_eq!(config.provider.type_name(), "gcp");
    }

    #[test]
    fn kubeconfig_must_exist() {
        let mut args = DELETE_AWS.to_vec();
        args.extend(["--kube-config", "/nonexistent/kubeconfig"]);
        assert!(parse(&args).to_config(Credentials::default()).is_err());

        let kubeconfig = tempfile::NamedTempFile::new().unwrap();
        let path = kubeconfig.path().to_str().unwrap();
        let mut args = DELETE_AWS.to_vec();
        args.extend(["--kube-config", path, "--kube-context", "staging"]);
        let config = parse(&args).to_config(Credentials::default()).unwrap();
        assert_eq!(config.kube.kubeconfig.as_deref(), Some(kubeconfig.path()));
        assert_eq!(config.kube.context.as_deref(), Some("staging"));
    }

    #[test]
    fn both_modes_run_migrate_first() {
        let mut args = MIGRATE_AWS.to_vec();
        args.push("--delete");
        let config = parse(&args).to_config(Credentials::default()).unwrap();
        assert_eq!(config.ordered_modes(), vec![Mode::Migrate, Mode::Delete]);
    }

    #[test]
    fn unknown_provider_is_a_usage_error() {
        let err = Cli::try_parse_from(["dnsmig", "--provider", "azure"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn help_is_not_a_usage_error() {
        let err = Cli::try_parse_from(["dnsmig", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let debug = format!("{:?}", cloudflare_token());
        assert!(!debug.contains("cf-token"));
        assert!(debug.contains("<REDACTED>"));
    }
}
