//! Kubernetes client construction

use dnsmig_core::config::KubeConfig;
use dnsmig_core::{Error, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Build a client from the migrator's Kubernetes settings
///
/// With an explicit kubeconfig path the file is read and the optional
/// context selected. A context alone selects from the default kubeconfig.
/// Otherwise the usual inference applies (in-cluster service account, then
/// `~/.kube/config`).
pub async fn client(config: &KubeConfig) -> Result<Client> {
    let options = KubeConfigOptions {
        context: config.context.clone(),
        ..Default::default()
    };

    let kube_config = match (&config.kubeconfig, &config.context) {
        (Some(path), _) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::config(format!("Cannot read kubeconfig {}: {}", path.display(), e))
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|e| Error::config(format!("Invalid kubeconfig: {}", e)))?
        }
        (None, Some(_)) => Config::from_kubeconfig(&options)
            .await
            .map_err(|e| Error::config(format!("Invalid kubeconfig: {}", e)))?,
        (None, None) => Config::infer()
            .await
            .map_err(|e| Error::config(format!("Failed to get Kubernetes client config: {}", e)))?,
    };

    tracing::debug!("Kubernetes API server: {}", kube_config.cluster_url);

    Client::try_from(kube_config)
        .map_err(|e| Error::config(format!("Failed to build Kubernetes client: {}", e)))
}
