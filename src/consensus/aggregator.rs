//! Weighted consensus aggregation.
//!
//! Combines the collected agent responses with the configured weights
//! into one risk score and a confidence figure. Weights are renormalized
//! over the agents actually contributing, so a disabled or failed agent
//! never silently under-weights the result.

use std::collections::BTreeMap;

use crate::models::{AgentKind, AgentResponse, AgentWeights};

/// Aggregate outcome of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Consensus {
    /// Weighted aggregate risk in [0.0, 1.0].
    pub risk_score: f64,
    /// Agreement and coverage in [0.0, 1.0]; 0.0 means the verdict
    /// cannot be trusted (no contributing agent, or total disagreement).
    pub confidence: f64,
}

/// Combine responses and weights into a consensus.
///
/// An agent contributes when its analysis scored (success or partial;
/// partial only means the agent's own analysis was incomplete) and its
/// configured weight is positive. With no contributing agent at all the
/// result is the explicit indeterminate state (0.0, 0.0) rather than a
/// divide-by-zero.
pub fn aggregate(
    responses: &BTreeMap<AgentKind, AgentResponse>,
    weights: &AgentWeights,
) -> Consensus {
    let contributing: Vec<(f64, f64)> = responses
        .iter()
        .filter_map(|(&kind, response)| {
            let weight = weights.weight_of(kind);
            match response.outcome.risk_score() {
                Some(risk) if weight > 0.0 => Some((weight, risk)),
                _ => None,
            }
        })
        .collect();

    if contributing.is_empty() {
        return Consensus {
            risk_score: 0.0,
            confidence: 0.0,
        };
    }

    let contributing_weight: f64 = contributing.iter().map(|(w, _)| w).sum();
    let risk_score = contributing
        .iter()
        .map(|(w, r)| w / contributing_weight * r)
        .sum::<f64>()
        .clamp(0.0, 1.0);

    // Weighted spread of the contributing scores around the aggregate.
    let variance: f64 = contributing
        .iter()
        .map(|(w, r)| w / contributing_weight * (r - risk_score).powi(2))
        .sum();
    let spread = variance.sqrt();

    // Share of the dispatched, positively-weighted roster that actually
    // contributed.
    let dispatched_weight: f64 = responses
        .keys()
        .map(|&kind| weights.weight_of(kind))
        .filter(|w| *w > 0.0)
        .sum();
    let coverage = if dispatched_weight > 0.0 {
        contributing_weight / dispatched_weight
    } else {
        0.0
    };

    let agreement = 1.0 - (spread * 2.0).min(1.0);
    let confidence = (coverage * agreement).clamp(0.0, 1.0);

    Consensus {
        risk_score,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::verdict::classify;
    use crate::models::{AgentError, AgentOutcome, Verdict};

    fn scored(kind: AgentKind, risk_score: f64) -> AgentResponse {
        AgentResponse {
            request_id: "req-1".to_string(),
            agent_type: kind,
            outcome: AgentOutcome::Success {
                risk_score,
                signals: vec![],
            },
            processing_time_ms: None,
            metadata: None,
        }
    }

    fn partial(kind: AgentKind, risk_score: f64) -> AgentResponse {
        AgentResponse {
            outcome: AgentOutcome::Partial {
                risk_score,
                signals: vec![],
            },
            ..scored(kind, risk_score)
        }
    }

    fn failed(kind: AgentKind) -> AgentResponse {
        AgentResponse::failure("req-1", kind, AgentError::unreachable("down"))
    }

    fn collect(responses: Vec<AgentResponse>) -> BTreeMap<AgentKind, AgentResponse> {
        responses.into_iter().map(|r| (r.agent_type, r)).collect()
    }

    #[test]
    fn test_risk_score_stays_in_range() {
        let weights = AgentWeights::default();
        for (visual, metadata) in [(0.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.33, 0.77)] {
            let responses = collect(vec![
                scored(AgentKind::Visual, visual),
                scored(AgentKind::Metadata, metadata),
            ]);
            let consensus = aggregate(&responses, &weights);
            assert!((0.0..=1.0).contains(&consensus.risk_score));
            assert!((0.0..=1.0).contains(&consensus.confidence));
        }
    }

    #[test]
    fn test_single_contributor_passes_through() {
        let weights = AgentWeights::default();
        let responses = collect(vec![
            scored(AgentKind::Visual, 0.8),
            failed(AgentKind::Metadata),
        ]);

        let consensus = aggregate(&responses, &weights);
        // Effective weight renormalizes to 1.0, so the score is the
        // agent's own; confidence is exactly its coverage share.
        assert!((consensus.risk_score - 0.8).abs() < 1e-9);
        assert!((consensus.confidence - 0.45).abs() < 1e-9);
        assert_eq!(classify(consensus.risk_score), Verdict::HighRisk);
    }

    #[test]
    fn test_all_agents_failed_is_indeterminate() {
        let weights = AgentWeights::default();
        let responses = collect(vec![
            failed(AgentKind::Visual),
            failed(AgentKind::Metadata),
            failed(AgentKind::Audio),
        ]);

        let consensus = aggregate(&responses, &weights);
        assert_eq!(consensus.risk_score, 0.0);
        assert_eq!(consensus.confidence, 0.0);
    }

    #[test]
    fn test_weight_scale_invariance() {
        let responses = collect(vec![
            scored(AgentKind::Visual, 0.4),
            scored(AgentKind::Metadata, 0.9),
        ]);

        let full = AgentWeights::default();
        let halved = AgentWeights {
            visual: full.visual / 2.0,
            metadata: full.metadata / 2.0,
            audio: full.audio / 2.0,
            lipsync: full.lipsync / 2.0,
        };

        let a = aggregate(&responses, &full);
        let b = aggregate(&responses, &halved);
        assert!((a.risk_score - b.risk_score).abs() < 1e-12);
        assert!((a.confidence - b.confidence).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_agreement_gives_full_confidence() {
        let weights = AgentWeights::default();
        let responses = collect(vec![
            scored(AgentKind::Visual, 0.2),
            scored(AgentKind::Metadata, 0.2),
        ]);

        let consensus = aggregate(&responses, &weights);
        assert!((consensus.risk_score - 0.2).abs() < 1e-9);
        assert!((consensus.confidence - 1.0).abs() < 1e-9);
        assert_eq!(classify(consensus.risk_score), Verdict::Authentic);
    }

    #[test]
    fn test_disagreement_erodes_confidence() {
        let weights = AgentWeights::default();
        let responses = collect(vec![
            scored(AgentKind::Visual, 0.0),
            scored(AgentKind::Metadata, 1.0),
        ]);

        let consensus = aggregate(&responses, &weights);
        assert!(consensus.confidence < 0.1);
        assert!(consensus.confidence >= 0.0);
    }

    #[test]
    fn test_zero_weight_agent_never_contributes() {
        let weights = AgentWeights::default();
        let baseline = collect(vec![
            scored(AgentKind::Visual, 0.2),
            scored(AgentKind::Metadata, 0.2),
        ]);
        let with_lipsync = collect(vec![
            scored(AgentKind::Visual, 0.2),
            scored(AgentKind::Metadata, 0.2),
            // Collected but weighted 0.0; must not move the score.
            scored(AgentKind::Lipsync, 1.0),
        ]);

        let a = aggregate(&baseline, &weights);
        let b = aggregate(&with_lipsync, &weights);
        assert!((a.risk_score - b.risk_score).abs() < 1e-12);
        assert!((a.confidence - b.confidence).abs() < 1e-12);
    }

    #[test]
    fn test_only_zero_weight_agents_is_indeterminate() {
        let weights = AgentWeights::default();
        let responses = collect(vec![scored(AgentKind::Lipsync, 0.9)]);

        let consensus = aggregate(&responses, &weights);
        assert_eq!(consensus.risk_score, 0.0);
        assert_eq!(consensus.confidence, 0.0);
    }

    #[test]
    fn test_partial_contributes_like_success() {
        let weights = AgentWeights::default();
        let with_success = collect(vec![
            scored(AgentKind::Visual, 0.6),
            scored(AgentKind::Metadata, 0.4),
        ]);
        let with_partial = collect(vec![
            partial(AgentKind::Visual, 0.6),
            scored(AgentKind::Metadata, 0.4),
        ]);

        let a = aggregate(&with_success, &weights);
        let b = aggregate(&with_partial, &weights);
        assert!((a.risk_score - b.risk_score).abs() < 1e-12);
        assert!((a.confidence - b.confidence).abs() < 1e-12);
    }

    #[test]
    fn test_three_agent_weighted_mean() {
        let weights = AgentWeights::default();
        let responses = collect(vec![
            scored(AgentKind::Visual, 0.9),
            scored(AgentKind::Metadata, 0.1),
            scored(AgentKind::Audio, 0.5),
        ]);

        let consensus = aggregate(&responses, &weights);
        // (0.45*0.9 + 0.55*0.1 + 0.30*0.5) / 1.30
        let expected = (0.45 * 0.9 + 0.55 * 0.1 + 0.30 * 0.5) / 1.30;
        assert!((consensus.risk_score - expected).abs() < 1e-12);
    }
}
