use clap::{Args, Parser, Subcommand, ValueEnum};
use pve_model::{Compression, RaidLevel, VmId};

#[derive(Parser)]
#[command(name = "pvetask")]
#[command(about = "Submit node operations and follow their tasks")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub conn: Connection,

    #[command(flatten)]
    pub log: Logging,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct Connection {
    /// Base URL of a cluster node
    #[arg(long, env = "PVE_ENDPOINT", default_value = "https://localhost:8006")]
    pub endpoint: String,

    /// Authorization header value, e.g. `PVEAPIToken=root@pam!ops=<secret>`
    #[arg(long, env = "PVE_AUTHORIZATION", hide_env_values = true)]
    pub authorization: Option<String>,

    /// Accept self-signed node certificates
    #[arg(long, env = "PVE_INSECURE")]
    pub insecure: bool,

    #[arg(long, default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Delay between status polls, at least 100 ms
    #[arg(long, default_value_t = 1_000, value_parser = clap::value_parser!(u64).range(100..))]
    pub interval_ms: u64,

    /// Failed polls in a row before giving up on a task
    #[arg(long, default_value_t = 5)]
    pub max_failures: u32,

    /// Print collected metrics on exit
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Args)]
pub struct Logging {
    /// text, json or journald
    #[arg(long, env = "PVE_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    #[arg(long, env = "PVE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Grow a container mount point
    Resize {
        #[arg(long)]
        node: String,
        #[arg(long)]
        vmid: VmId,
        /// Mount point, e.g. rootfs or mp0
        #[arg(long, default_value = "rootfs")]
        disk: String,
        /// Increment in GiB
        #[arg(long)]
        gib: f64,
    },
    /// Start, stop or migrate guests of a node
    Bulk {
        #[arg(long)]
        node: String,
        #[arg(value_enum)]
        action: BulkVerb,
        /// Migration target node
        #[arg(long, required_if_eq("action", "migrate"))]
        target: Option<String>,
        #[arg(long, default_value_t = 1)]
        max_workers: u32,
        #[arg(long)]
        no_local_disks: bool,
        /// Guests to act on
        #[arg(long = "vm", value_name = "VMID", required = true)]
        vms: Vec<VmId>,
    },
    /// Create a ZFS pool from unused disks
    ZfsCreate {
        #[arg(long)]
        node: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "single")]
        raid: RaidLevel,
        #[arg(long, default_value = "on")]
        compression: Compression,
        #[arg(long, default_value_t = 12)]
        ashift: u8,
        /// Do not register the pool as a storage
        #[arg(long)]
        no_storage: bool,
        #[arg(required = true)]
        devices: Vec<String>,
    },
    /// Follow an already running task
    Status {
        upid: String,
        /// Node to query when the id names none
        #[arg(long)]
        node: Option<String>,
    },
    /// Show the parameters a retention change would send
    Retention {
        storage: String,
        /// Property string, e.g. keep-last=3,keep-daily=7; empty clears the policy
        #[arg(long, default_value = "")]
        keep: String,
        /// Storage type when creating instead of editing
        #[arg(long)]
        create: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BulkVerb {
    Start,
    Stop,
    Migrate,
}
