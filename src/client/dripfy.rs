//! HTTP client for the Dripfy dashboard API

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::api::{ApprovalApi, AuditApi};
use super::models::{
    ApprovalFlowSummary, AuditLogPage, AuditQuery, DecisionRequest, FlowType,
};
use crate::error::{ApiError, ConfigError, Result};

/// Default dashboard API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:3000";

const AUDIT_FALLBACK_ERROR: &str = "Failed to load audit log";
const FLOWS_FALLBACK_ERROR: &str = "Failed to load approval flows";
const DECISION_FALLBACK_ERROR: &str = "Failed to submit approval decision";

/// How strictly the body's `ok` flag is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OkFlag {
    /// The body must carry `ok: true`
    Required,
    /// Only an explicit `ok: false` marks a failure
    RejectFalse,
}

/// Dripfy dashboard API client
pub struct DripfyClient {
    http: HttpClient,
    base_url: Url,
    token: Option<String>,
}

impl DripfyClient {
    /// Create a client for the given base URL with an optional bearer token
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            ConfigError::Invalid(format!("Invalid API base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "API base URL '{}' cannot carry a path",
                base_url
            ))
            .into());
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("dripfy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Build an endpoint URL from path segments, escaping each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConfigError::Invalid("API base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return its JSON body once the status and `ok` flag
    /// say it succeeded
    async fn send(&self, request: RequestBuilder, fallback: &str, ok_flag: OkFlag) -> Result<Value> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::from)?;
        let body = parse_body(&text);
        debug!("Response status {} ({} bytes)", status, text.len());

        let message = body
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(fallback)
            .to_string();

        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden(message).into()),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(message).into()),
            StatusCode::CONFLICT => Err(ApiError::Conflict(message).into()),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ApiError::BadRequest(message).into())
            }
            status if !status.is_success() => Err(ApiError::Server(message).into()),
            _ => {
                let ok = body.get("ok");
                let failed = match ok_flag {
                    OkFlag::Required => ok != Some(&Value::Bool(true)),
                    OkFlag::RejectFalse => ok == Some(&Value::Bool(false)),
                };
                if failed {
                    Err(ApiError::Server(message).into())
                } else {
                    Ok(body)
                }
            }
        }
    }
}

/// Parse a response body, treating empty or malformed JSON as an empty object
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Object(Default::default());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::Object(Default::default()),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| {
        ApiError::InvalidResponse(format!("Failed to parse response: {}", e)).into()
    })
}

#[async_trait]
impl AuditApi for DripfyClient {
    async fn list_audit_logs(&self, query: &AuditQuery) -> Result<AuditLogPage> {
        let url = self.endpoint(&["api", "audit", "logs"])?;
        let params = query.to_query_params();
        debug!("GET {} {:?}", url, params);

        let request = self.http.get(url).query(&params);
        let body = self.send(request, AUDIT_FALLBACK_ERROR, OkFlag::Required).await?;
        decode(body)
    }
}

#[async_trait]
impl ApprovalApi for DripfyClient {
    async fn list_approval_flows(
        &self,
        flow_type: Option<FlowType>,
    ) -> Result<Vec<ApprovalFlowSummary>> {
        #[derive(Deserialize)]
        struct FlowsResponse {
            #[serde(default)]
            flows: Vec<ApprovalFlowSummary>,
        }

        let mut url = self.endpoint(&["api", "approvals", "flows"])?;
        if let Some(flow_type) = flow_type {
            url.query_pairs_mut().append_pair("type", flow_type.as_str());
        }
        debug!("GET {}", url);

        let request = self.http.get(url);
        let body = self.send(request, FLOWS_FALLBACK_ERROR, OkFlag::RejectFalse).await?;
        let response: FlowsResponse = decode(body)?;
        Ok(response.flows)
    }

    async fn submit_decision(
        &self,
        flow_type: FlowType,
        entity_id: &str,
        step_id: &str,
        request: &DecisionRequest,
    ) -> Result<ApprovalFlowSummary> {
        #[derive(Deserialize)]
        struct DecisionResponse {
            flow: Option<ApprovalFlowSummary>,
        }

        let url = self.endpoint(&[
            "api",
            "approvals",
            "flows",
            flow_type.as_str(),
            entity_id,
            "steps",
            step_id,
            "decision",
        ])?;
        debug!("POST {} decision={}", url, request.decision);

        let builder = self.http.post(url).json(request);
        let body = self.send(builder, DECISION_FALLBACK_ERROR, OkFlag::RejectFalse).await?;
        let response: DecisionResponse = decode(body)?;
        response.flow.ok_or_else(|| {
            ApiError::InvalidResponse("Server did not return the approval flow".to_string()).into()
        })
    }
}
