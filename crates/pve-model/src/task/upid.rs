use std::time::{Duration, SystemTime, UNIX_EPOCH};

const PREFIX: &str = "UPID:";

/// Fields of a node task identifier.
///
/// Layout: `UPID:{node}:{pid}:{pstart}:{starttime}:{type}:{id}:{user}:` with
/// the numeric fields in upper-case hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upid {
    pub node: String,
    pub pid: u32,
    pub pstart: u64,
    pub starttime: u64,
    pub task_type: String,
    pub task_id: String,
    pub user: String,
}

impl Upid {
    /// Parse a token; `None` if it does not follow the layout.
    pub fn parse(token: &str) -> Option<Self> {
        let mut parts = token.strip_prefix(PREFIX)?.split(':');

        let node = parts.next().filter(|n| !n.is_empty())?.to_string();
        let pid = u32::from_str_radix(parts.next()?, 16).ok()?;
        let pstart = u64::from_str_radix(parts.next()?, 16).ok()?;
        let starttime = u64::from_str_radix(parts.next()?, 16).ok()?;
        let task_type = parts.next()?.to_string();
        let task_id = parts.next()?.to_string();
        let user = parts.next()?.to_string();

        Some(Self {
            node,
            pid,
            pstart,
            starttime,
            task_type,
            task_id,
            user,
        })
    }

    /// Wall-clock start time recorded by the node.
    pub fn started_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.starttime)
    }
}
