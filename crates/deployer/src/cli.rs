use clap::{Parser, Subcommand};
use url::Url;

/// Reconciles a deployment document (or deletes a group) against a running
/// orchestrator: creating missing applications, updating changed ones,
/// restarting unchanged ones, and polling until each converges.
#[derive(Debug, Parser)]
#[command(name = "deployer", version)]
pub struct Cli {
    /// Base URL of the orchestrator service.
    #[arg(short = 'b', long = "baseurl", env = "DEPLOYER_BASE_URL")]
    pub base_url: Url,

    /// Access token, sent as the `access_token` cookie.
    #[arg(short = 'a', long = "access-token", env = "DEPLOYER_ACCESS_TOKEN")]
    pub access_token: String,

    /// Requires a valid TLS certificate chain. Off by default, matching the
    /// self-signed clusters this tool historically targets; pass this flag
    /// to harden against a production cluster.
    #[arg(long = "verify-tls", global = true)]
    pub verify_tls: bool,

    /// Upper bound, in seconds, on each convergence poll loop.
    #[arg(long = "poll-timeout-secs", default_value_t = 600, global = true)]
    pub poll_timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub log: cli_common::LogArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read a JSON deployment document and reconcile it against the orchestrator.
    Deploy {
        /// Path to the application or group document produced by config-producer.
        file: std::path::PathBuf,
    },
    /// Recursively empty and delete a group and all its subgroups.
    Delete {
        /// Name (slash-path id) of the group to delete.
        group_name: String,
    },
}
