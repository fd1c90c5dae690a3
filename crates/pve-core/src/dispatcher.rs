use std::{sync::Arc, time::SystemTime};

use pve_model::{Endpoint, Method, NodeRequest, RequestParams, TaskHandle};
use tracing::{info, instrument, warn};

use crate::{
    NodeTransport,
    error::SubmissionError,
    metrics::{MetricsHandle, NoopMetrics},
};

/// Sends requests and turns accepted ones into task handles.
///
/// Holds no per-submission state; every call is independent and nothing is
/// retried.
#[derive(Clone)]
pub struct TaskDispatcher {
    transport: Arc<dyn NodeTransport>,
    metrics: MetricsHandle,
}

impl TaskDispatcher {
    pub fn new(transport: Arc<dyn NodeTransport>) -> Self {
        Self {
            transport,
            metrics: NoopMetrics::handle(),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub async fn submit(
        &self,
        endpoint: &Endpoint,
        method: Method,
        params: &RequestParams,
    ) -> Result<TaskHandle, SubmissionError> {
        let request = NodeRequest::new(endpoint.clone(), method, params.clone());
        self.dispatch(&request).await
    }

    #[instrument(level = "debug", skip(self, request), fields(endpoint = %request.endpoint, method = %request.method))]
    pub async fn dispatch(&self, request: &NodeRequest) -> Result<TaskHandle, SubmissionError> {
        let submitted_at = SystemTime::now();

        let data = match self.transport.submit(request).await {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "submission failed");
                self.metrics.record_rejected(request.method);
                return Err(e);
            }
        };

        let Some(upid) = data.filter(|d| !d.trim().is_empty()) else {
            warn!("node accepted the request but returned no task id");
            self.metrics.record_rejected(request.method);
            return Err(SubmissionError::MissingHandle);
        };

        let handle = TaskHandle::new(upid, request.endpoint.node(), submitted_at);
        self.metrics.record_submitted(request.method);
        info!(upid = %handle, "task accepted");
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RESIZE_UPID, ScriptedTransport};

    fn endpoint() -> Endpoint {
        Endpoint::new("/nodes/n1/lxc/100/resize").unwrap()
    }

    #[tokio::test]
    async fn accepted_submission_yields_handle() {
        let transport = ScriptedTransport::states(vec![]).arc();
        let dispatcher = TaskDispatcher::new(transport.clone());

        let params = RequestParams::new().with("disk", "rootfs").with("size", "+4G");
        let handle = dispatcher
            .submit(&endpoint(), Method::Put, &params)
            .await
            .unwrap();

        assert_eq!(handle.upid(), RESIZE_UPID);
        assert_eq!(handle.node(), Some("n1"));

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].params, params);
        assert_eq!(sent[0].method, Method::Put);
    }

    #[tokio::test]
    async fn rejection_text_is_passed_through_once() {
        let status = "unable to parse volume ID 'rootfs'";
        let transport = ScriptedTransport::states(vec![])
            .with_submit(Err(SubmissionError::rejected(Some(400), status)))
            .arc();
        let dispatcher = TaskDispatcher::new(transport.clone());

        let err = dispatcher
            .submit(&endpoint(), Method::Put, &RequestParams::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), status);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn empty_payload_is_not_a_handle() {
        let transport = ScriptedTransport::states(vec![])
            .with_submit(Ok(None))
            .with_submit(Ok(Some("  ".into())))
            .arc();
        let dispatcher = TaskDispatcher::new(transport);
        let params = RequestParams::new();

        for _ in 0..2 {
            let err = dispatcher
                .submit(&endpoint(), Method::Put, &params)
                .await
                .unwrap_err();
            assert_eq!(err, SubmissionError::MissingHandle);
        }
    }

    #[tokio::test]
    async fn opaque_token_takes_node_from_endpoint() {
        let transport = ScriptedTransport::states(vec![])
            .with_submit(Ok(Some("task-9".into())))
            .arc();
        let dispatcher = TaskDispatcher::new(transport);

        let handle = dispatcher
            .submit(&endpoint(), Method::Put, &RequestParams::new())
            .await
            .unwrap();
        assert_eq!(handle.upid(), "task-9");
        assert_eq!(handle.node(), Some("n1"));
    }

    #[tokio::test]
    async fn resubmission_produces_a_new_handle() {
        let transport = ScriptedTransport::states(vec![])
            .with_submit(Ok(Some("UPID:n1:1:1:1:resize:100:root@pam:".into())))
            .with_submit(Ok(Some("UPID:n1:2:2:2:resize:100:root@pam:".into())))
            .arc();
        let dispatcher = TaskDispatcher::new(transport);
        let params = RequestParams::new();

        let first = dispatcher.submit(&endpoint(), Method::Put, &params).await.unwrap();
        let second = dispatcher.submit(&endpoint(), Method::Put, &params).await.unwrap();
        assert_ne!(first.upid(), second.upid());
    }
}
