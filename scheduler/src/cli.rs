use clap::Parser;

/// Flags the constants named throughout the placement design are pulled from,
/// so they're operator-tunable rather than literals buried in the core.
#[derive(Parser, Debug, Clone)]
#[command(name = "scheduler", about = "Custom workload placement controller")]
pub struct Config {
    /// The identity pods must name in `spec.schedulerName` to be owned by this controller.
    #[arg(long, default_value = "my-scheduler")]
    pub scheduler_name: String,

    /// Path to a kubeconfig file. When unset, in-cluster/local discovery is used.
    #[arg(long)]
    pub kubeconfig: Option<String>,

    /// Verbosity passed to the logging facade: error, warn, info, debug, or trace.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Seconds the orchestrator holds a single watch call open before closing it.
    #[arg(long, default_value_t = 60)]
    pub watch_timeout_secs: u32,

    /// Seconds a rejection mark suppresses re-scheduling of a pod.
    #[arg(long, default_value_t = 300)]
    pub rejection_timeout_secs: i64,

    /// Maximum bind attempts per placement before giving up until the next event.
    #[arg(long, default_value_t = 3)]
    pub bind_retries: u32,

    /// Delay, in seconds, between bind attempts.
    #[arg(long, default_value_t = 2)]
    pub bind_retry_delay_secs: u64,
}
