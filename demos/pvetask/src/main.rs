mod cli;

use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use tracing::{info, warn};

use pve_client::{ClientConfig, HttpTransport};
use pve_core::{CancelHandle, MonitorConfig, OperationGate, SubmitError, TaskSupervisor};
use pve_model::{
    BulkAction, BulkActionKind, DiskResize, NodeOperation, RetentionPolicy,
    StorageRetentionUpdate, TaskHandle, TaskState, ZfsPoolCreate,
};
use pve_observe::{LoggerConfig, LoggerFormat, log_state, logger_init, message_for};
use pve_prometheus::{Encoder, PrometheusMetrics, TextEncoder};

use cli::{BulkVerb, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1) Logger
    let log = LoggerConfig {
        format: cli.log.log_format.parse::<LoggerFormat>()?,
        level: cli.log.log_level.clone(),
        ..Default::default()
    };
    logger_init(&log)?;

    // 2) Transport + supervisor
    let transport = Arc::new(HttpTransport::new(&ClientConfig {
        endpoint: cli.conn.endpoint.clone(),
        authorization: cli.conn.authorization.clone(),
        timeout_ms: cli.conn.timeout_ms,
        accept_invalid_certs: cli.conn.insecure,
    })?);
    let monitor_cfg = MonitorConfig {
        interval_ms: cli.conn.interval_ms,
        max_consecutive_failures: cli.conn.max_failures,
        ..Default::default()
    };
    let metrics = PrometheusMetrics::new()?;
    let supervisor =
        TaskSupervisor::new(transport, monitor_cfg).with_metrics(Arc::new(metrics.clone()));
    info!(endpoint = %cli.conn.endpoint, "client ready");

    // 3) Run the command
    let result = match cli.command {
        Command::Resize {
            node,
            vmid,
            disk,
            gib,
        } => {
            let op = DiskResize {
                node,
                vmid,
                disk,
                increment_gib: gib,
            };
            submit(&supervisor, &op).await
        }
        Command::Bulk {
            node,
            action,
            target,
            max_workers,
            no_local_disks,
            vms,
        } => {
            let action = match action {
                BulkVerb::Start => BulkActionKind::StartAll,
                BulkVerb::Stop => BulkActionKind::StopAll,
                BulkVerb::Migrate => BulkActionKind::MigrateAll {
                    target: target.context("--target is required for migrate")?,
                    max_workers,
                    with_local_disks: !no_local_disks,
                },
            };
            submit(&supervisor, &BulkAction { node, action, vms }).await
        }
        Command::ZfsCreate {
            node,
            name,
            raid,
            compression,
            ashift,
            no_storage,
            devices,
        } => {
            let op = ZfsPoolCreate {
                raidlevel: raid,
                compression,
                ashift,
                add_storage: !no_storage,
                ..ZfsPoolCreate::new(node, name, devices)
            };
            submit(&supervisor, &op).await
        }
        Command::Status { upid, node } => {
            let handle = TaskHandle::new(upid, node.as_deref(), std::time::SystemTime::now());
            follow(&supervisor, handle).await
        }
        Command::Retention {
            storage,
            keep,
            create,
        } => retention(storage, &keep, create),
    };

    if cli.conn.metrics {
        let mut out = Vec::new();
        TextEncoder::new().encode(&metrics.gather(), &mut out)?;
        print!("{}", String::from_utf8_lossy(&out));
    }
    result
}

async fn submit<O: NodeOperation>(supervisor: &TaskSupervisor, op: &O) -> anyhow::Result<()> {
    let gate = OperationGate::new();
    let handle = supervisor
        .submit_operation(&gate, op, |state: &TaskState| {
            info!(state = state.as_str(), "{}", message_for(state));
        })
        .await
        .map_err(|e| match e {
            SubmitError::Submission(refused) => anyhow!(refused.detail()),
            other => other.into(),
        })?;
    info!(upid = %handle.task(), "tracking task");
    wait(handle).await
}

async fn wait(handle: CancelHandle) -> anyhow::Result<()> {
    let token = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted; the task keeps running on the node");
            token.cancel();
        }
    });

    match handle.wait().await? {
        TaskState::Failed(reason) => bail!("task failed: {reason}"),
        state => {
            info!(state = state.as_str(), "done");
            Ok(())
        }
    }
}

async fn follow(supervisor: &TaskSupervisor, handle: TaskHandle) -> anyhow::Result<()> {
    let mut tracking = supervisor.monitor().track(handle.clone());
    let token = tracking.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    while let Some(state) = tracking.next().await {
        log_state(&handle, &state);
    }
    match tracking.finish().await? {
        TaskState::Failed(reason) => bail!("task failed: {reason}"),
        _ => Ok(()),
    }
}

fn retention(storage: String, keep: &str, create: Option<String>) -> anyhow::Result<()> {
    let policy = RetentionPolicy::parse(keep)?;
    let update = match create {
        Some(storage_type) => StorageRetentionUpdate::create(storage, storage_type, policy),
        None => StorageRetentionUpdate::edit(storage, policy),
    };
    let request = update.to_request()?;

    println!("{} {}", request.method, request.endpoint);
    for (key, value) in request.params.to_pairs() {
        println!("  {key}={value}");
    }
    Ok(())
}
