use std::{fmt, time::SystemTime};

use serde::{Deserialize, Serialize};

use super::Upid;
use crate::NodeName;

/// Identity of one accepted node task.
///
/// The token is opaque; node and start time are only read from it when it
/// follows the UPID layout. A handle is built once per accepted submission and
/// has no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
    upid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    node: Option<NodeName>,
    #[serde(with = "time_serde")]
    submitted_at: SystemTime,
}

impl TaskHandle {
    /// Build a handle from a token returned by a node.
    ///
    /// The node named inside the token wins over `fallback_node`, which is
    /// usually taken from the request path.
    pub fn new(upid: impl Into<String>, fallback_node: Option<&str>, submitted_at: SystemTime) -> Self {
        let upid = upid.into();
        let node = Upid::parse(&upid)
            .map(|u| u.node)
            .or_else(|| fallback_node.map(str::to_string));
        Self {
            upid,
            node,
            submitted_at,
        }
    }

    pub fn upid(&self) -> &str {
        &self.upid
    }

    /// Node the task runs on, if known.
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    pub fn submitted_at(&self) -> SystemTime {
        self.submitted_at
    }

    pub fn parsed(&self) -> Option<Upid> {
        Upid::parse(&self.upid)
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.upid)
    }
}

mod time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let since_epoch = time
            .duration_since(UNIX_EPOCH)
            .map_err(serde::ser::Error::custom)?;
        since_epoch.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + std::time::Duration::from_secs(secs))
    }
}
