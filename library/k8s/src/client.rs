use error::*;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;

/// Raised when neither an explicit kubeconfig path nor in-cluster/local discovery
/// produces a usable client configuration. This is the one fatal startup error;
/// everything past this point runs forever until told to stop.
#[derive(Error, SchedulerError, Kind, Debug)]
#[error("could not load a cluster client configuration")]
pub struct ConfigLoadError {
    #[source]
    cause: StringError,
}

/// Builds a client either from an explicit kubeconfig file or, absent one, from
/// the usual in-cluster/local inference chain (see [`kube::Config::infer`]).
pub async fn client<P: AsRef<Path>>(
    kubeconfig: Option<P>,
) -> std::result::Result<Client, ConfigLoadError> {
    let config = match kubeconfig {
        Some(path) => {
            let raw = Kubeconfig::read_from(path.as_ref())
                .map_err(|err| ConfigLoadError { cause: err.to_string().into() })?;
            Config::from_custom_kubeconfig(raw, &KubeConfigOptions::default())
                .await
                .map_err(|err| ConfigLoadError { cause: err.to_string().into() })?
        }
        None => Config::infer()
            .await
            .map_err(|err| ConfigLoadError { cause: err.to_string().into() })?,
    };
    Client::try_from(config).map_err(|err| ConfigLoadError { cause: err.to_string().into() })
}
