use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of a cluster node, e.g. `https://pve1:8006`.
    pub endpoint: String,
    /// Sent verbatim as the `Authorization` header, e.g.
    /// `PVEAPIToken=root@pam!ops=<secret>`.
    pub authorization: Option<String>,
    pub timeout_ms: u64,
    /// Skip certificate verification for self-signed node certificates.
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://localhost:8006".to_string(),
            authorization: None,
            timeout_ms: 30_000,
            accept_invalid_certs: false,
        }
    }
}
