//! Final response assembly.

use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::consensus::aggregator::Consensus;
use crate::models::{AgentKind, AgentResponse, OrchestratorResponse, Verdict};

/// Compose the final orchestrator response.
///
/// Pure composition: no business logic beyond field population.
/// `processing_time_ms` is the wall-clock duration from dispatch start;
/// `timestamp` is assembly time. The response is the last thing built
/// for a request; nothing mutates it afterwards.
pub fn assemble(
    request_id: String,
    responses: BTreeMap<AgentKind, AgentResponse>,
    consensus: Consensus,
    verdict: Verdict,
    reasons: Vec<String>,
    started: Instant,
) -> OrchestratorResponse {
    OrchestratorResponse {
        request_id,
        verdict,
        risk_score: consensus.risk_score,
        confidence: consensus.confidence,
        reasons,
        agent_breakdown: responses.into_values().collect(),
        processing_time_ms: started.elapsed().as_millis() as u64,
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentError, AgentOutcome};

    #[test]
    fn test_breakdown_contains_every_dispatched_agent() {
        let mut responses = BTreeMap::new();
        responses.insert(
            AgentKind::Visual,
            AgentResponse {
                request_id: "req-1".to_string(),
                agent_type: AgentKind::Visual,
                outcome: AgentOutcome::Success {
                    risk_score: 0.4,
                    signals: vec![],
                },
                processing_time_ms: Some(12),
                metadata: None,
            },
        );
        responses.insert(
            AgentKind::Metadata,
            AgentResponse::failure("req-1", AgentKind::Metadata, AgentError::timeout("slow")),
        );

        let response = assemble(
            "req-1".to_string(),
            responses,
            Consensus {
                risk_score: 0.4,
                confidence: 0.45,
            },
            Verdict::Suspicious,
            vec!["visual: artifact detected".to_string()],
            Instant::now(),
        );

        assert_eq!(response.request_id, "req-1");
        assert_eq!(response.verdict, Verdict::Suspicious);
        assert_eq!(response.agent_breakdown.len(), 2);
        // Breakdown follows the stable agent order.
        assert_eq!(response.agent_breakdown[0].agent_type, AgentKind::Visual);
        assert_eq!(response.agent_breakdown[1].agent_type, AgentKind::Metadata);
        assert_eq!(response.reasons.len(), 1);
    }
}
