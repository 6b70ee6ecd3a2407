mod cli;
mod placement;

use clap::Parser;
use cli::Config;
use error::SchedulerError;
use k8s::{client, Cluster};
use log::{error, info};
use placement::watch_loop::WatchLoop;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Sets the logger to use terminal colors, matching how the pod/node names
    // this process prints at debug/trace are colorized.
    std::env::set_var("RUST_LOG_STYLE", "always");
    let config = Config::parse();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.log_level);
    }
    env_logger::init();

    let kube_client = match client::client(config.kubeconfig.as_deref()).await {
        Ok(client) => client,
        Err(err) => {
            error!("{}", err.log_line());
            std::process::exit(1);
        }
    };

    let cluster = Cluster::new(kube_client);
    let shutdown = Arc::new(AtomicBool::new(false));
    install_signal_handlers(shutdown.clone());

    info!(
        "scheduler starting, owning pods with scheduler_name={}",
        config.scheduler_name
    );

    let mut watch_loop = WatchLoop::new(cluster, &config, shutdown);
    watch_loop.run().await;

    info!("scheduler shut down cleanly");
}

/// INT and TERM both trigger the same cooperative shutdown flag; in-flight RPCs
/// are allowed to finish, and the current event is abandoned cleanly.
fn install_signal_handlers(shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
        shutdown.store(true, Ordering::SeqCst);
    });
}
