//! Concurrent fan-out of one analysis request to the agent roster.
//!
//! One tokio task per enabled agent, a single absolute deadline over the
//! whole batch. The result map always carries exactly one response per
//! roster agent: completed analyses, recovered failures, and synthesized
//! timeouts alike. Partial completion never blocks the others and no
//! agent failure aborts the batch.

use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::client::AgentClient;
use crate::config::AgentsConfig;
use crate::models::{AgentError, AgentKind, AgentResponse, Submission};

/// One agent's resolved address.
#[derive(Debug, Clone)]
pub struct AgentEndpoint {
    pub kind: AgentKind,
    pub url: String,
}

/// Build the dispatch roster from configuration.
///
/// `only` addresses a single agent, regardless of the enabled set.
pub fn roster(agents: &AgentsConfig, only: Option<AgentKind>) -> Vec<AgentEndpoint> {
    match only {
        Some(kind) => vec![AgentEndpoint {
            kind,
            url: agents.endpoint_for(kind).to_string(),
        }],
        None => agents
            .enabled
            .iter()
            .map(|&kind| AgentEndpoint {
                kind,
                url: agents.endpoint_for(kind).to_string(),
            })
            .collect(),
    }
}

/// Fans one submission out to all roster agents concurrently.
pub struct Dispatcher {
    client: AgentClient,
    deadline: Duration,
}

impl Dispatcher {
    pub fn new(client: AgentClient, deadline: Duration) -> Self {
        Self { client, deadline }
    }

    /// Dispatch to every roster agent and collect one response each.
    ///
    /// An agent whose call has not completed when the global deadline
    /// elapses is recorded as timed out and its in-flight call aborted
    /// (best-effort; the remote side may keep working, but the result is
    /// discarded). The map is complete before this returns; downstream
    /// components never see partial results mid-flight.
    pub async fn dispatch(
        &self,
        submission: &Submission,
        roster: &[AgentEndpoint],
    ) -> BTreeMap<AgentKind, AgentResponse> {
        let deadline = Instant::now() + self.deadline;

        let mut tasks = Vec::with_capacity(roster.len());
        for endpoint in roster {
            let client = self.client.clone();
            let request = submission.request_for(endpoint.kind);
            let url = endpoint.url.clone();
            debug!("Dispatching request {} to {} agent", submission.request_id, endpoint.kind);
            let handle = tokio::spawn(async move { client.call(&url, &request).await });
            tasks.push((endpoint.kind, handle));
        }

        let mut results = BTreeMap::new();
        for (kind, mut handle) in tasks {
            let response = match timeout_at(deadline, &mut handle).await {
                Ok(Ok(response)) => verify_echo(submission, kind, response),
                Ok(Err(join_error)) => {
                    warn!("Agent {} task aborted: {}", kind, join_error);
                    AgentResponse::failure(
                        submission.request_id.clone(),
                        kind,
                        AgentError::bad_response(format!("agent task failed: {}", join_error)),
                    )
                }
                Err(_) => {
                    handle.abort();
                    warn!(
                        "Agent {} exceeded the global deadline of {}ms",
                        kind,
                        self.deadline.as_millis()
                    );
                    AgentResponse::failure(
                        submission.request_id.clone(),
                        kind,
                        AgentError::timeout(format!(
                            "global deadline of {}ms elapsed",
                            self.deadline.as_millis()
                        )),
                    )
                }
            };
            results.insert(kind, response);
        }

        results
    }
}

/// Enforce the echo invariant: a response must carry the originating
/// request id and the addressed agent kind.
fn verify_echo(
    submission: &Submission,
    kind: AgentKind,
    response: AgentResponse,
) -> AgentResponse {
    if response.request_id != submission.request_id {
        return AgentResponse::failure(
            submission.request_id.clone(),
            kind,
            AgentError::bad_response(format!(
                "response echoed request id '{}', expected '{}'",
                response.request_id, submission.request_id
            )),
        );
    }
    if response.agent_type != kind {
        return AgentResponse::failure(
            submission.request_id.clone(),
            kind,
            AgentError::bad_response(format!(
                "response came back as {} agent, expected {}",
                response.agent_type, kind
            )),
        );
    }
    response
}
