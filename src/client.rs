//! HTTP client for the analysis agents.
//!
//! `call` is a total function: network failures, timeouts, non-2xx
//! statuses, and malformed payloads are all normalized into a failed
//! `AgentResponse`, so callers never special-case "no response".

use std::time::Duration;
use tracing::{debug, warn};

use crate::models::{AgentError, AgentResponse, AnalysisRequest};

/// Client for one-shot agent analysis calls.
#[derive(Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl AgentClient {
    /// Create a client with the given per-call timeout.
    pub fn new(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { http, timeout }
    }

    /// Issue one analysis request to one agent endpoint.
    ///
    /// Never returns an error and never panics; every failure mode
    /// becomes a failed response with a populated `AgentError`.
    pub async fn call(&self, endpoint: &str, request: &AnalysisRequest) -> AgentResponse {
        match self.try_call(endpoint, request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    "Agent {} call failed for request {}: {}",
                    request.agent_type, request.request_id, error
                );
                AgentResponse::failure(request.request_id.clone(), request.agent_type, error)
            }
        }
    }

    async fn try_call(
        &self,
        endpoint: &str,
        request: &AnalysisRequest,
    ) -> Result<AgentResponse, AgentError> {
        let url = format!("{}/analyze", endpoint.trim_end_matches('/'));
        debug!("POST {} for request {}", url, request.request_id);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::timeout(format!(
                        "no response from {} within {}s",
                        endpoint,
                        self.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    AgentError::unreachable(format!("cannot connect to {}", endpoint))
                } else {
                    AgentError::unreachable(format!("request to {} failed: {}", endpoint, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::bad_response(format!(
                "HTTP {}: {}",
                status,
                truncate(&body, 200)
            )));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AgentError::timeout(format!(
                    "response body from {} stalled past {}s",
                    endpoint,
                    self.timeout.as_secs()
                ))
            } else {
                AgentError::bad_response(format!("failed to read response body: {}", e))
            }
        })?;

        serde_json::from_str::<AgentResponse>(&body)
            .map_err(|e| AgentError::bad_response(format!("malformed payload: {}", e)))
    }

    /// Probe an agent's health endpoint.
    pub async fn probe(&self, endpoint: &str) -> Result<(), AgentError> {
        let url = format!("{}/health", endpoint.trim_end_matches('/'));

        let response = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                AgentError::timeout(format!("no health response from {}", endpoint))
            } else {
                AgentError::unreachable(format!("cannot connect to {}", endpoint))
            }
        })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AgentError::bad_response(format!(
                "health check returned HTTP {}",
                response.status()
            )))
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
