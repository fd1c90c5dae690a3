mod logger;
pub use logger::*;

mod task;
pub use task::{log_state, message_for, state_logger};
