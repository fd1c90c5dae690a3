mod handle;
pub use handle::TaskHandle;

mod state;
pub use state::{TaskPhase, TaskState};

mod upid;
pub use upid::Upid;
