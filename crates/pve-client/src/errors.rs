use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("authorization is not a valid header value")]
    InvalidAuthorization,
}
