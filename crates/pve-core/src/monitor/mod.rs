use std::sync::Arc;

use pve_model::{TaskHandle, TaskPhase, TaskState};
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinHandle},
    time::{Duration, sleep},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{MonitorConfig, NodeTransport, TrackingError};

/// Polls a task until the node reports a terminal state.
///
/// The first poll is issued immediately, later ones after
/// [`MonitorConfig::interval`]. A failed poll is retried with backoff; once
/// [`MonitorConfig::failure_budget`] consecutive polls have failed the task is
/// reported as [`TaskState::Unknown`].
///
/// Notifications only move forward along `Pending → Running → terminal`:
/// repeats of the current phase and regressions are swallowed.
#[derive(Clone)]
pub struct TaskMonitor {
    transport: Arc<dyn NodeTransport>,
    cfg: MonitorConfig,
}

impl TaskMonitor {
    pub fn new(transport: Arc<dyn NodeTransport>, cfg: MonitorConfig) -> Self {
        Self { transport, cfg }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.cfg
    }

    /// Track `handle` in the current task, calling `on_state` for every
    /// forward transition.
    ///
    /// Returns the terminal state, or `None` if `cancel` fired first. After
    /// cancellation no further status query is issued.
    #[instrument(level = "debug", skip_all, fields(upid = %handle))]
    pub async fn run<F>(
        &self,
        handle: &TaskHandle,
        cancel: &CancellationToken,
        mut on_state: F,
    ) -> Option<TaskState>
    where
        F: FnMut(&TaskState) + Send,
    {
        let budget = self.cfg.failure_budget();
        let mut seen: Option<TaskPhase> = None;
        let mut failures = 0u32;
        let mut delay = Duration::ZERO;

        loop {
            if !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = sleep(delay) => {}
                }
            }
            if cancel.is_cancelled() {
                break;
            }

            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                polled = self.transport.task_status(handle) => polled,
            };

            match polled {
                Ok(state) => {
                    failures = 0;
                    let phase = state.phase();
                    match seen {
                        Some(prev) if phase <= prev => {
                            if phase < prev {
                                debug!(state = state.as_str(), "ignoring state regression");
                            }
                        }
                        _ => {
                            seen = Some(phase);
                            debug!(state = state.as_str(), "task state changed");
                            on_state(&state);
                            if state.is_terminal() {
                                info!(state = state.as_str(), "task finished");
                                return Some(state);
                            }
                        }
                    }
                    delay = self.cfg.interval();
                }
                Err(e) => {
                    failures += 1;
                    warn!(error = %e, failures, budget, "status poll failed");
                    if failures >= budget {
                        warn!("giving up on task; outcome unknown");
                        let state = TaskState::Unknown;
                        on_state(&state);
                        return Some(state);
                    }
                    delay = self.cfg.backoff(failures);
                }
            }
        }

        debug!("tracking cancelled");
        None
    }

    /// Track `handle` on a spawned task and stream its transitions.
    ///
    /// Polling stops once the returned [`Tracking`] is dropped.
    pub fn track(&self, handle: TaskHandle) -> Tracking {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let monitor = self.clone();
        let token = cancel.clone();
        let upid = handle.upid().to_string();

        let join = tokio::spawn(async move {
            tokio::select! {
                biased;
                outcome = monitor.run(&handle, &token, |state| {
                    let _ = tx.send(state.clone());
                }) => outcome,
                _ = tx.closed() => {
                    debug!(upid = %handle, "tracking dropped; stop polling");
                    None
                }
            }
        });

        Tracking {
            upid,
            rx,
            cancel,
            join,
        }
    }
}

/// Transitions of one tracked task, in observation order.
///
/// The stream ends after the terminal state or after cancellation.
pub struct Tracking {
    upid: String,
    rx: mpsc::UnboundedReceiver<TaskState>,
    cancel: CancellationToken,
    join: JoinHandle<Option<TaskState>>,
}

impl Tracking {
    pub fn upid(&self) -> &str {
        &self.upid
    }

    pub async fn next(&mut self) -> Option<TaskState> {
        self.rx.recv().await
    }

    /// Stop polling. The remote task is left alone.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for tracking to end and report how it ended.
    pub async fn finish(self) -> Result<TaskState, TrackingError> {
        settle(&self.upid, self.join.await)
    }
}

pub(crate) fn settle(
    upid: &str,
    joined: Result<Option<TaskState>, JoinError>,
) -> Result<TaskState, TrackingError> {
    match joined {
        Ok(Some(TaskState::Unknown)) => Err(TrackingError::Unknown {
            upid: upid.to_string(),
        }),
        Ok(Some(state)) => Ok(state),
        Ok(None) => Err(TrackingError::Cancelled {
            upid: upid.to_string(),
        }),
        Err(e) => Err(TrackingError::Aborted {
            upid: upid.to_string(),
            reason: e.to_string(),
        }),
    }
}
