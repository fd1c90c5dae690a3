use serde::{Deserialize, Serialize};

/// Observed lifecycle state of a node task.
///
/// `Succeeded` and `Failed` are confirmed by the node. `Unknown` means the
/// observer lost contact; it ends observation but says nothing about how the
/// task itself ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "camelCase")]
pub enum TaskState {
    /// Accepted but not yet reported as running.
    Pending,
    /// Executing on the node.
    Running,
    /// Finished successfully (possibly with warnings).
    Succeeded,
    /// Finished with an error; carries the node's exit status text.
    Failed(String),
    /// Observation stopped without a confirmed outcome.
    Unknown,
}

/// Coarse position of a state in the `Pending → Running → terminal` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskPhase {
    Pending,
    Running,
    Terminal,
}

impl TaskState {
    /// Map the node's `status` / `exitstatus` pair.
    ///
    /// `stopped` with `OK` or `WARNINGS: n` is success, any other exit status is
    /// a failure carrying that text. Statuses other than `running`/`stopped`
    /// count as not started yet.
    pub fn from_remote(status: &str, exitstatus: Option<&str>) -> Self {
        match status {
            "running" => TaskState::Running,
            "stopped" => match exitstatus {
                Some(exit) if exit == "OK" || exit.starts_with("WARNINGS") => TaskState::Succeeded,
                Some(exit) => TaskState::Failed(exit.to_string()),
                None => TaskState::Failed("stopped without exit status".to_string()),
            },
            _ => TaskState::Pending,
        }
    }

    /// Returns `true` once no further transition will be observed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::Failed(_) | TaskState::Unknown
        )
    }

    /// Returns `true` for terminal states reported by the node itself.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed(_))
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TaskState::Pending | TaskState::Running)
    }

    pub fn phase(&self) -> TaskPhase {
        match self {
            TaskState::Pending => TaskPhase::Pending,
            TaskState::Running => TaskPhase::Running,
            _ => TaskPhase::Terminal,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            TaskState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Short symbolic name for logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed(_) => "failed",
            TaskState::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(TaskState::Succeeded.is_terminal());
        assert!(TaskState::Failed("boom".into()).is_terminal());
        assert!(TaskState::Unknown.is_terminal());

        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::Running.is_terminal());
    }

    #[test]
    fn unknown_is_not_confirmed() {
        assert!(TaskState::Succeeded.is_confirmed());
        assert!(TaskState::Failed("x".into()).is_confirmed());
        assert!(!TaskState::Unknown.is_confirmed());
    }

    #[test]
    fn phases_are_ordered() {
        assert!(TaskState::Pending.phase() < TaskState::Running.phase());
        assert!(TaskState::Running.phase() < TaskState::Unknown.phase());
        assert_eq!(TaskState::Succeeded.phase(), TaskPhase::Terminal);
    }

    #[test]
    fn remote_status_mapping() {
        assert_eq!(TaskState::from_remote("running", None), TaskState::Running);
        assert_eq!(
            TaskState::from_remote("stopped", Some("OK")),
            TaskState::Succeeded
        );
        assert_eq!(
            TaskState::from_remote("stopped", Some("WARNINGS: 2")),
            TaskState::Succeeded
        );
        assert_eq!(
            TaskState::from_remote("stopped", Some("command 'zpool create' failed: exit code 1")),
            TaskState::Failed("command 'zpool create' failed: exit code 1".into())
        );
        assert_eq!(TaskState::from_remote("queued", None), TaskState::Pending);
    }

    #[test]
    fn serde_adjacent_tagging() {
        let json = serde_json::to_string(&TaskState::Running).unwrap();
        assert_eq!(json, r#"{"state":"running"}"#);

        let json = serde_json::to_string(&TaskState::Failed("no space".into())).unwrap();
        assert_eq!(json, r#"{"state":"failed","reason":"no space"}"#);

        let back: TaskState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskState::Failed("no space".into()));
    }
}
