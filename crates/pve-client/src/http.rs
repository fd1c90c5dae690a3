use std::time::Duration;

use async_trait::async_trait;
use pve_core::{NodeTransport, SubmissionError, TransportError};
use pve_model::{Method, NodeRequest, TaskHandle, TaskState};
use reqwest::{
    Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use tracing::{debug, instrument};

use crate::{
    config::ClientConfig,
    errors::ClientError,
    response::{body_for, rejection, submitted_upid, task_state},
};

const API_ROOT: [&str; 2] = ["api2", "json"];

/// [`NodeTransport`] over the JSON management API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(cfg: &ClientConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&cfg.endpoint).map_err(|e| ClientError::InvalidEndpoint {
            endpoint: cfg.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidEndpoint {
                endpoint: cfg.endpoint.clone(),
                reason: "not a base url".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        if let Some(auth) = &cfg.authorization {
            let mut value =
                HeaderValue::from_str(auth).map_err(|_| ClientError::InvalidAuthorization)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .danger_accept_invalid_certs(cfg.accept_invalid_certs)
            .build()?;

        Ok(Self { client, base })
    }

    /// `{endpoint}/api2/json/{segments...}`, each segment percent-encoded.
    fn url<'a, I>(&self, segments: I) -> Result<Url, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| format!("{} cannot carry a path", self.base))?
            .pop_if_empty()
            .extend(API_ROOT)
            .extend(segments);
        Ok(url)
    }

    fn request_for(&self, request: &NodeRequest) -> Result<reqwest::RequestBuilder, String> {
        let mut url = self.url(request.endpoint.as_str().split('/').skip(1))?;
        let builder = match request.method {
            Method::Get | Method::Delete => {
                let pairs = request.params.to_pairs();
                if !pairs.is_empty() {
                    url.query_pairs_mut().extend_pairs(pairs);
                }
                self.client.request(verb(request.method), url)
            }
            Method::Post | Method::Put => self
                .client
                .request(verb(request.method), url)
                .json(&body_for(&request.params)),
        };
        Ok(builder)
    }
}

fn verb(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl NodeTransport for HttpTransport {
    #[instrument(level = "debug", skip_all, fields(endpoint = %request.endpoint))]
    async fn submit(&self, request: &NodeRequest) -> Result<Option<String>, SubmissionError> {
        let builder = self.request_for(request).map_err(SubmissionError::Transport)?;
        let response = builder
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;
        debug!(status = status.as_u16(), "submission answered");

        if !status.is_success() {
            return Err(rejection(status.as_u16(), status.canonical_reason(), &body));
        }
        submitted_upid(&body)
    }

    async fn task_status(&self, handle: &TaskHandle) -> Result<TaskState, TransportError> {
        let node = handle
            .node()
            .ok_or_else(|| TransportError::Unroutable(handle.upid().to_string()))?;
        let url = self
            .url(["nodes", node, "tasks", handle.upid(), "status"])
            .map_err(TransportError::Request)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("status query refused");
            return Err(TransportError::Request(format!("{}: {reason}", status.as_u16())));
        }
        task_state(&body)
    }
}

#[cfg(test)]
mod tests {
    use pve_model::{Endpoint, RequestParams};

    use super::*;

    fn transport(endpoint: &str) -> HttpTransport {
        HttpTransport::new(&ClientConfig {
            endpoint: endpoint.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn urls_live_under_api_root() {
        let t = transport("https://pve1:8006/");
        let url = t.url(["nodes", "n1", "lxc", "100", "resize"]).unwrap();
        assert_eq!(url.as_str(), "https://pve1:8006/api2/json/nodes/n1/lxc/100/resize");
    }

    #[test]
    fn task_status_url_escapes_upid() {
        let t = transport("https://pve1:8006");
        let url = t
            .url(["nodes", "n1", "tasks", "UPID:n1:1:2:3:resize:100:root@pam!ops:", "status"])
            .unwrap();
        assert!(url.path().starts_with("/api2/json/nodes/n1/tasks/UPID:n1:"));
        assert!(url.path().ends_with("/status"));
    }

    #[test]
    fn get_params_go_to_the_query() {
        let t = transport("https://pve1:8006");
        let request = NodeRequest::new(
            Endpoint::new("/nodes/n1/tasks").unwrap(),
            Method::Get,
            RequestParams::new().with("limit", 50i64),
        );
        let built = t.request_for(&request).unwrap().build().unwrap();
        assert_eq!(built.method(), reqwest::Method::GET);
        assert_eq!(built.url().query(), Some("limit=50"));
    }

    #[test]
    fn put_params_go_to_a_json_body() {
        let t = transport("https://pve1:8006");
        let request = NodeRequest::new(
            Endpoint::new("/nodes/n1/lxc/100/resize").unwrap(),
            Method::Put,
            RequestParams::new().with("disk", "rootfs").with("size", "+4G"),
        );
        let built = t.request_for(&request).unwrap().build().unwrap();
        assert_eq!(built.url().query(), None);

        let body = built.body().and_then(|b| b.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json, serde_json::json!({"disk": "rootfs", "size": "+4G"}));
    }

    #[test]
    fn rejects_bad_configuration() {
        let err = HttpTransport::new(&ClientConfig {
            endpoint: "not a url".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidEndpoint { .. }));

        let err = HttpTransport::new(&ClientConfig {
            authorization: Some("bad\nvalue".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidAuthorization));
    }
}
