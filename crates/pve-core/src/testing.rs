//! Scripted in-memory transport for unit tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use pve_model::{NodeRequest, TaskHandle, TaskState};

use crate::{NodeTransport, SubmissionError, TransportError};

pub(crate) const RESIZE_UPID: &str = "UPID:n1:00001A2B:0003C4D5:65F1E2A0:resize:100:root@pam:";

/// Replays canned answers in order.
///
/// Once the status script is exhausted every poll returns `fallback`.
pub(crate) struct ScriptedTransport {
    submits: Mutex<VecDeque<Result<Option<String>, SubmissionError>>>,
    statuses: Mutex<VecDeque<Result<TaskState, TransportError>>>,
    fallback: Result<TaskState, TransportError>,
    requests: Mutex<Vec<NodeRequest>>,
    polls: AtomicUsize,
}

impl ScriptedTransport {
    pub(crate) fn new(statuses: Vec<Result<TaskState, TransportError>>) -> Self {
        Self {
            submits: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(statuses.into()),
            fallback: Err(TransportError::Request("script exhausted".into())),
            requests: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn states(states: Vec<TaskState>) -> Self {
        Self::new(states.into_iter().map(Ok).collect())
    }

    pub(crate) fn with_fallback(mut self, fallback: Result<TaskState, TransportError>) -> Self {
        self.fallback = fallback;
        self
    }

    pub(crate) fn with_submit(self, answer: Result<Option<String>, SubmissionError>) -> Self {
        self.submits.lock().unwrap().push_back(answer);
        self
    }

    pub(crate) fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub(crate) fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<NodeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeTransport for ScriptedTransport {
    async fn submit(&self, request: &NodeRequest) -> Result<Option<String>, SubmissionError> {
        self.requests.lock().unwrap().push(request.clone());
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Some(RESIZE_UPID.to_string())))
    }

    async fn task_status(&self, _handle: &TaskHandle) -> Result<TaskState, TransportError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}
