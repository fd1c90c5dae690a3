use std::collections::BTreeMap;

use pve_core::{SubmissionError, TransportError};
use pve_model::{PropertyValue, RequestParams, TaskState};
use serde::Deserialize;
use serde_json::{Map, Value};

const DELETE: &str = "delete";

/// Envelope of every API answer.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, String>>,
}

impl Envelope {
    pub(crate) fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

#[derive(Debug, Deserialize)]
struct TaskStatus {
    status: String,
    #[serde(default)]
    exitstatus: Option<String>,
}

/// JSON body for a mutating request.
///
/// Booleans go out as `1`/`0`; the deletion list is a comma-joined `delete`
/// field next to the values.
pub fn body_for(params: &RequestParams) -> Map<String, Value> {
    let mut body = Map::new();
    for (key, value) in params.values().iter() {
        let value = match value {
            PropertyValue::Int(v) => Value::from(*v),
            PropertyValue::Bool(v) => Value::from(u8::from(*v)),
            PropertyValue::Str(v) => Value::from(v.as_str()),
        };
        body.insert(key.to_string(), value);
    }
    let deletes: Vec<&str> = params.deletes().collect();
    if !deletes.is_empty() {
        body.insert(DELETE.to_string(), Value::from(deletes.join(",")));
    }
    body
}

/// Map a non-success answer to a rejection carrying the node's own words.
pub(crate) fn rejection(code: u16, reason: Option<&str>, body: &str) -> SubmissionError {
    let envelope = Envelope::parse(body).unwrap_or_default();
    let message = envelope
        .message
        .as_deref()
        .or(reason)
        .unwrap_or("request failed");
    SubmissionError::rejected(Some(code), message)
        .with_field_errors(envelope.errors.unwrap_or_default())
}

/// Task id of an accepted submission, if the node returned one.
pub(crate) fn submitted_upid(body: &str) -> Result<Option<String>, SubmissionError> {
    let envelope = Envelope::parse(body)
        .ok_or_else(|| SubmissionError::Transport(format!("unparsable response: {body}")))?;
    Ok(match envelope.data {
        Some(Value::String(upid)) => Some(upid),
        _ => None,
    })
}

pub(crate) fn task_state(body: &str) -> Result<TaskState, TransportError> {
    let envelope = Envelope::parse(body)
        .ok_or_else(|| TransportError::InvalidResponse(format!("unparsable response: {body}")))?;
    let data = envelope
        .data
        .ok_or_else(|| TransportError::InvalidResponse("status response carries no data".into()))?;
    let status: TaskStatus = serde_json::from_value(data)
        .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
    Ok(TaskState::from_remote(&status.status, status.exitstatus.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_keeps_native_types_and_delete_list() {
        let params = RequestParams::new()
            .with("ashift", 12i64)
            .with("add_storage", true)
            .with("devices", "sdb;sdc")
            .delete("maxfiles");

        let body = body_for(&params);

        assert_eq!(body["ashift"], Value::from(12));
        assert_eq!(body["add_storage"], Value::from(1));
        assert_eq!(body["devices"], Value::from("sdb;sdc"));
        assert_eq!(body["delete"], Value::from("maxfiles"));
    }

    #[test]
    fn delete_value_lands_in_delete_field() {
        let params = RequestParams::new()
            .with("delete", "comment")
            .delete("maxfiles");

        let body = body_for(&params);

        assert_eq!(body.len(), 1);
        assert_eq!(body["delete"], Value::from("comment,maxfiles"));
    }

    #[test]
    fn rejection_keeps_field_errors_apart() {
        let body = r#"{"data":null,"message":"Parameter verification failed.\n","errors":{"size":"value must be positive\n"}}"#;
        let err = rejection(400, Some("Bad Request"), body);

        assert_eq!(err.to_string(), "Parameter verification failed.\n");
        match &err {
            SubmissionError::Rejected { field_errors, .. } => {
                assert_eq!(field_errors["size"], "value must be positive\n");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejection_prefers_body_message() {
        let body = r#"{"data":null,"message":"storage 'local' does not exist\n"}"#;
        let err = rejection(500, Some("Internal Server Error"), body);
        assert_eq!(
            err,
            SubmissionError::rejected(Some(500), "storage 'local' does not exist\n")
        );

        let err = rejection(403, Some("Forbidden"), "");
        assert_eq!(err.to_string(), "Forbidden");
    }

    #[test]
    fn submitted_upid_reads_string_data() {
        let body = r#"{"data":"UPID:n1:00001A2B:0003C4D5:65F1E2A0:resize:100:root@pam:"}"#;
        assert_eq!(
            submitted_upid(body).unwrap().as_deref(),
            Some("UPID:n1:00001A2B:0003C4D5:65F1E2A0:resize:100:root@pam:")
        );
        assert_eq!(submitted_upid(r#"{"data":null}"#).unwrap(), None);
        assert!(submitted_upid("<html>").is_err());
    }

    #[test]
    fn task_state_maps_remote_status() {
        let running = r#"{"data":{"status":"running","pid":1234}}"#;
        assert_eq!(task_state(running).unwrap(), TaskState::Running);

        let done = r#"{"data":{"status":"stopped","exitstatus":"WARNINGS: 1"}}"#;
        assert_eq!(task_state(done).unwrap(), TaskState::Succeeded);

        let failed = r#"{"data":{"status":"stopped","exitstatus":"zfs error: pool busy"}}"#;
        assert_eq!(
            task_state(failed).unwrap(),
            TaskState::Failed("zfs error: pool busy".into())
        );

        assert!(matches!(
            task_state(r#"{"data":null}"#),
            Err(TransportError::InvalidResponse(_))
        ));
    }
}
