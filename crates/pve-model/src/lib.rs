//! Domain types shared by the node task crates.
//!
//! - [`PropertySet`] and [`PropertyStringCodec`]: flat `key=value,...` property strings.
//! - [`TaskHandle`] and [`TaskState`]: identity and lifecycle of a remote node task.
//! - [`NodeRequest`]: a validated mutating call against a node-scoped endpoint.
//! - Typed operations ([`DiskResize`], [`BulkAction`], ...) that build those requests.

mod error;
pub use error::ValidationError;

mod property;
pub use property::{
    MalformedPropertyError, MalformedReason, PropertyKind, PropertySchema, PropertySet,
    PropertyStringCodec, PropertyValue, decode, encode,
};

mod policy;
pub use policy::{LEGACY_MAXFILES, PRUNE_BACKUPS, RetentionPolicy, STARTUP, StartupOrder};

mod task;
pub use task::{TaskHandle, TaskPhase, TaskState, Upid};

mod request;
pub use request::{Endpoint, Method, NodeRequest, RequestParams};

mod ops;
pub use ops::{
    BulkAction, BulkActionKind, Compression, DiskResize, NodeOperation, QemuCreate, RaidLevel,
    StorageRetentionUpdate, ZfsPoolCreate,
};

/// Node name as used in `/nodes/{node}/...` paths.
pub type NodeName = String;

/// Guest identifier (VM or container).
pub type VmId = u32;
