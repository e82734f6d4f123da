// # dnsmig - external-dns ownership migrator
//
// This binary is a THIN integration layer:
// - All ownership logic lives in dnsmig-core
// - Cluster access lives in dnsmig-kube
// - Provider APIs live in the dnsmig-provider-* crates
//
// The binary is responsible for:
// 1. Parsing flags (with `MIGRATOR_*` environment fallbacks)
// 2. Initializing logging and the runtime
// 3. Registering providers and creating the configured one
// 4. Running migrate and/or delete and reporting the outcome
//
// ## Credentials
//
// Read from the environment only:
// - `CLOUDFLARE_API_TOKEN`, or `CLOUDFLARE_API_KEY` + `CLOUDFLARE_EMAIL`
// - `GCP_ACCESS_TOKEN` (the metadata server is asked when unset)
// - AWS: the default credential chain
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_TOKEN=your_token
//
// dnsmig --provider cloudflare \
//     --cloudflare-zone-name example.com \
//     --external-dns-prefix ext \
//     --external-dns-owner-id-old infra \
//     --external-dns-owner-id-new infra2 \
//     --migrate --delete --dry-run false
// ```

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Credentials};
use dnsmig_core::{MigratorConfig, Mode, OwnershipEngine, ProviderRegistry, RunReport};
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Exit codes for different termination scenarios
///
/// - 0: Every requested operation completed
/// - 1: Configuration or usage error
/// - 2: Runtime error, or at least one record change failed
#[derive(Debug, Clone, Copy)]
enum MigratorExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<MigratorExitCode> for ExitCode {
    fn from(code: MigratorExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if let Err(print_err) = e.print() {
                eprintln!("Failed to print usage: {}", print_err);
            }
            return if e.use_stderr() {
                MigratorExitCode::ConfigError.into()
            } else {
                MigratorExitCode::Success.into()
            };
        }
    };

    let config = match cli.to_config(Credentials::from_env()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return MigratorExitCode::ConfigError.into();
        }
    };

    if let Err(e) = logging::init(&cli.log_level, cli.log_format) {
        eprintln!("{}", e);
        return MigratorExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return MigratorExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(config).await {
            Ok(reports) if reports.iter().all(RunReport::is_success) => MigratorExitCode::Success,
            Ok(_) => {
                error!("Some record changes failed, see the log above");
                MigratorExitCode::RuntimeError
            }
            Err(e) => {
                error!("{:#}", e);
                match e.downcast_ref::<dnsmig_core::Error>() {
                    Some(dnsmig_core::Error::Config(_)) => MigratorExitCode::ConfigError,
                    _ => MigratorExitCode::RuntimeError,
                }
            }
        }
    })
    .into()
}

fn register_providers(registry: &ProviderRegistry) {
    #[cfg(feature = "cloudflare")]
    dnsmig_provider_cloudflare::register(registry);

    #[cfg(feature = "route53")]
    dnsmig_provider_route53::register(registry);

    #[cfg(feature = "gcp")]
    dnsmig_provider_gcp::register(registry);

    info!("Registered providers: {}", registry.list_providers().join(", "));
}

/// Run every requested operation against one provider and cluster
async fn run(config: MigratorConfig) -> Result<Vec<RunReport>> {
    let registry = ProviderRegistry::new();
    register_providers(&registry);

    let provider = registry.create_provider(&config.provider).await?;
    info!(
        "Using {} provider for zone {}",
        provider.provider_name(),
        config.engine.zone
    );
    if config.engine.dry_run {
        warn!("Dry run enabled: no record will be changed");
    }

    let engine = OwnershipEngine::new(provider, config.engine.clone())?;
    let kube = dnsmig_kube::client(&config.kube)
        .await
        .context("Cannot create Kubernetes client")?;

    let mut reports = Vec::new();
    for mode in config.ordered_modes() {
        let live = dnsmig_kube::live_hostnames(&kube, mode).await?;
        let report = match mode {
            Mode::Migrate => {
                let new_owner = config
                    .owner_new
                    .as_deref()
                    .context("New owner ID is required for migration")?;
                engine.migrate(&live, &config.owner_old, new_owner).await?
            }
            Mode::Delete => engine.delete_owned(&live, &config.owner_old).await?,
        };
        info!("{}", report);
        reports.push(report);
    }

    Ok(reports)
}
