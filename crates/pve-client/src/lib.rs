//! HTTP transport for the node management API.

mod config;
pub use config::ClientConfig;

mod errors;
pub use errors::ClientError;

mod http;
pub use http::HttpTransport;

mod response;
pub use response::body_for;
