use std::{sync::Arc, time::Instant};

use pve_model::{NodeOperation, NodeRequest, TaskHandle, TaskState};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::{
    MonitorConfig, NodeTransport, OperationGate, SubmitError, TaskDispatcher, TaskMonitor,
    TrackingError,
    metrics::{MetricsHandle, NoopMetrics},
    monitor::settle,
};

/// Outcome label recorded when tracking was cancelled.
const CANCELLED: &str = "cancelled";

/// Composes gate, dispatcher and monitor for a dialog.
#[derive(Clone)]
pub struct TaskSupervisor {
    dispatcher: TaskDispatcher,
    monitor: TaskMonitor,
    metrics: MetricsHandle,
}

impl TaskSupervisor {
    pub fn new(transport: Arc<dyn NodeTransport>, cfg: MonitorConfig) -> Self {
        Self {
            dispatcher: TaskDispatcher::new(Arc::clone(&transport)),
            monitor: TaskMonitor::new(transport, cfg),
            metrics: NoopMetrics::handle(),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.dispatcher = self.dispatcher.with_metrics(Arc::clone(&metrics));
        self.metrics = metrics;
        self
    }

    pub fn dispatcher(&self) -> &TaskDispatcher {
        &self.dispatcher
    }

    pub fn monitor(&self) -> &TaskMonitor {
        &self.monitor
    }

    /// Validate `op`, then [`submit_and_track`](Self::submit_and_track) it.
    ///
    /// Invalid input is reported before the gate is touched.
    pub async fn submit_operation<O, F>(
        &self,
        gate: &OperationGate,
        op: &O,
        on_state: F,
    ) -> Result<CancelHandle, SubmitError>
    where
        O: NodeOperation + ?Sized,
        F: FnMut(&TaskState) + Send + 'static,
    {
        let request = op.to_request()?;
        self.submit_and_track(gate, request, on_state).await
    }

    /// Submit `request` under `gate` and track the resulting task.
    ///
    /// Fails with [`SubmitError::Busy`] while `gate` is in flight. If the node
    /// refuses the request the gate is back to idle when this returns. Once
    /// accepted, the gate is released right before `on_state` sees the terminal
    /// state, or when tracking is cancelled.
    #[instrument(level = "debug", skip_all, fields(gate = %gate.id(), endpoint = %request.endpoint))]
    pub async fn submit_and_track<F>(
        &self,
        gate: &OperationGate,
        request: NodeRequest,
        mut on_state: F,
    ) -> Result<CancelHandle, SubmitError>
    where
        F: FnMut(&TaskState) + Send + 'static,
    {
        let Some(permit) = gate.acquire() else {
            debug!("gate busy; submission refused");
            return Err(SubmitError::Busy);
        };
        let ticket = permit.ticket();

        let handle = self.dispatcher.dispatch(&request).await?;

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let monitor = self.monitor.clone();
        let metrics = Arc::clone(&self.metrics);
        let task = handle.clone();

        let join = tokio::spawn(async move {
            let started = Instant::now();
            let mut permit = Some(permit);

            let outcome = monitor
                .run(&task, &token, |state| {
                    if state.is_terminal() {
                        if let Some(permit) = permit.take() {
                            permit.release();
                        }
                    }
                    on_state(state);
                })
                .await;
            drop(permit);

            let label = outcome.as_ref().map_or(CANCELLED, TaskState::as_str);
            metrics.record_finished(label, started.elapsed());
            outcome
        });

        Ok(CancelHandle {
            handle,
            cancel,
            gate: gate.clone(),
            ticket,
            join,
        })
    }
}

/// Control over one tracked submission.
///
/// Dropping the handle leaves tracking running; call
/// [`cancel`](CancelHandle::cancel) to stop it.
pub struct CancelHandle {
    handle: TaskHandle,
    cancel: CancellationToken,
    gate: OperationGate,
    ticket: u64,
    join: JoinHandle<Option<TaskState>>,
}

impl CancelHandle {
    pub fn task(&self) -> &TaskHandle {
        &self.handle
    }

    /// Stop tracking and free the gate. The remote task keeps running.
    ///
    /// Only this submission's hold on the gate is released; a newer
    /// submission under the same gate is unaffected.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.gate.release_ticket(self.ticket);
    }

    /// Token that stops tracking when cancelled. The gate is freed once the
    /// tracker notices.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for tracking to end.
    ///
    /// `Ok` carries a state confirmed by the node, which may be
    /// [`TaskState::Failed`].
    pub async fn wait(self) -> Result<TaskState, TrackingError> {
        settle(self.handle.upid(), self.join.await)
    }
}
