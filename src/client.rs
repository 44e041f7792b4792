//! HTTP client for the Akita backend.
//!
//! One client instance is bound to a single backend host (via
//! [`domain_to_host`]) and carries the stored credentials plus the
//! per-install client id on every request. All requests share the timeout
//! given at construction; the timer is owned by the client and released
//! with it on every exit path.
//!
//! [`domain_to_host`]: crate::domain::domain_to_host

use crate::cfg::Credentials;
use crate::ci::PullRequest;
use crate::domain;
use crate::error::{ApiError, ApiResult};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Client for the backend's front API.
pub struct FrontClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct PrEnabledResponse {
    enabled: bool,
}

/// Error body shape used by the backend for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Spec-creation request: thin argument marshalling for `akita apispec`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSpecRequest {
    pub service: String,
    pub traces: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub trace_tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSpecResponse {
    pub id: String,
}

impl FrontClient {
    /// Build a client bound to the host for `domain`, with a fixed
    /// per-request timeout.
    pub fn new(
        domain: &str,
        client_id: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        let id_value = HeaderValue::from_str(client_id)
            .map_err(|_| ApiError::Config(format!("invalid client id {client_id:?}")))?;
        headers.insert("x-akita-client-id", id_value);

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("akita-cli/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url_for(domain),
            credentials,
        })
    }

    /// Ask the backend whether the PR's opening user is a member of the
    /// given team in the PR's owning organization. Exactly one request.
    pub fn get_github_pr_enabled_state(&self, pr: &PullRequest, team: &str) -> ApiResult<bool> {
        let path = format!(
            "/v1/github/repos/{}/{}/pulls/{}/enabled",
            pr.owner, pr.repo, pr.num
        );
        let resp: PrEnabledResponse = self.get(&path, &[("team", team)])?;
        Ok(resp.enabled)
    }

    /// Submit a spec-creation request.
    pub fn create_spec(&self, req: &CreateSpecRequest) -> ApiResult<CreateSpecResponse> {
        self.post("/v1/specs", req)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<T> {
        let req = self.http.get(format!("{}{}", self.base_url, path)).query(query);
        Self::handle(self.authorize(req).send()?)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let req = self.http.post(format!("{}{}", self.base_url, path)).json(body);
        Self::handle(self.authorize(req).send()?)
    }

    /// Attach whichever credential kind is configured. Akita key pairs use
    /// basic auth; Postman keys use the `x-api-key` header.
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        if let Some((id, secret)) = self.credentials.api_key_pair() {
            req.basic_auth(id, Some(secret))
        } else if let Some(ref key) = self.credentials.postman_api_key {
            req.header("x-api-key", key)
        } else {
            req
        }
    }

    fn handle<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json()?);
        }
        let body = resp.text().unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Base URL for a backend domain. Loopback development targets are plain
/// HTTP; everything else is HTTPS.
pub fn base_url_for(domain: &str) -> String {
    let host = domain::domain_to_host(domain);
    // Only the name part decides the scheme; "localhost.example.com" is a
    // real remote host and stays on HTTPS.
    let name = host.split(':').next().unwrap_or("");
    let scheme = if name == "localhost" || name == "127.0.0.1" {
        "http"
    } else {
        "https"
    };
    format!("{scheme}://{host}")
}
