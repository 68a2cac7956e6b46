//! Reason extraction from agent signals.
//!
//! Selects the most significant signals across all non-failed responses
//! into an ordered, bounded, deduplicated list of human-readable reasons.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::consensus::aggregator::Consensus;
use crate::consensus::verdict::SUSPICIOUS_THRESHOLD;
use crate::models::{AgentKind, AgentResponse, AgentWeights, Signal};

/// Extract the top reasons for the verdict.
///
/// Signals are ordered by confidence descending, ties broken by the
/// agent's configured weight descending and then by original signal
/// order; duplicates per `(signal_type, agent)` keep the
/// highest-confidence occurrence; the list is truncated to `max_reasons`.
pub fn extract_reasons(
    responses: &BTreeMap<AgentKind, AgentResponse>,
    weights: &AgentWeights,
    consensus: Consensus,
    max_reasons: usize,
) -> Vec<String> {
    let mut candidates: Vec<(AgentKind, f64, &Signal)> = Vec::new();
    for (&kind, response) in responses {
        let weight = weights.weight_of(kind);
        for signal in response.outcome.signals() {
            candidates.push((kind, weight, signal));
        }
    }

    // Stable sort keeps original signal order for fully tied entries.
    candidates.sort_by(|a, b| {
        b.2.confidence
            .partial_cmp(&a.2.confidence)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal))
    });

    let mut seen: HashSet<(String, AgentKind)> = HashSet::new();
    let mut reasons = Vec::new();
    for (kind, _, signal) in candidates {
        if reasons.len() >= max_reasons {
            break;
        }
        if !seen.insert((signal.signal_type.clone(), kind)) {
            continue;
        }
        reasons.push(render(kind, signal));
    }

    if reasons.is_empty() {
        reasons.push(fallback_reason(consensus).to_string());
    }

    reasons
}

fn render(kind: AgentKind, signal: &Signal) -> String {
    match signal.severity {
        Some(severity) => format!("{}: {} ({} severity)", kind, signal.description, severity),
        None => format!("{}: {}", kind, signal.description),
    }
}

fn fallback_reason(consensus: Consensus) -> &'static str {
    if consensus.confidence == 0.0 {
        "Insufficient agent data to determine cause"
    } else if consensus.risk_score < SUSPICIOUS_THRESHOLD {
        "No significant indicators detected"
    } else {
        "Elevated risk reported without detailed signals"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentError, AgentOutcome, AgentResponse};

    fn signal(signal_type: &str, confidence: f64) -> Signal {
        Signal {
            signal_type: signal_type.to_string(),
            confidence,
            description: format!("{} detected", signal_type),
            severity: None,
            metadata: None,
        }
    }

    fn scored(kind: AgentKind, signals: Vec<Signal>) -> AgentResponse {
        AgentResponse {
            request_id: "req-1".to_string(),
            agent_type: kind,
            outcome: AgentOutcome::Success {
                risk_score: 0.5,
                signals,
            },
            processing_time_ms: None,
            metadata: None,
        }
    }

    fn collect(responses: Vec<AgentResponse>) -> BTreeMap<AgentKind, AgentResponse> {
        responses.into_iter().map(|r| (r.agent_type, r)).collect()
    }

    fn consensus(risk_score: f64, confidence: f64) -> Consensus {
        Consensus {
            risk_score,
            confidence,
        }
    }

    #[test]
    fn test_ordered_by_confidence_descending() {
        let responses = collect(vec![
            scored(
                AgentKind::Visual,
                vec![signal("blur", 0.4), signal("face_swap", 0.95)],
            ),
            scored(AgentKind::Metadata, vec![signal("exif_missing", 0.7)]),
        ]);

        let reasons = extract_reasons(
            &responses,
            &AgentWeights::default(),
            consensus(0.5, 0.9),
            5,
        );

        assert_eq!(reasons[0], "visual: face_swap detected");
        assert_eq!(reasons[1], "metadata: exif_missing detected");
        assert_eq!(reasons[2], "visual: blur detected");
    }

    #[test]
    fn test_confidence_tie_broken_by_agent_weight() {
        // metadata (0.55) outweighs visual (0.45) at equal confidence.
        let responses = collect(vec![
            scored(AgentKind::Visual, vec![signal("artifact", 0.8)]),
            scored(AgentKind::Metadata, vec![signal("timestamp_skew", 0.8)]),
        ]);

        let reasons = extract_reasons(
            &responses,
            &AgentWeights::default(),
            consensus(0.5, 0.9),
            5,
        );

        assert_eq!(reasons[0], "metadata: timestamp_skew detected");
        assert_eq!(reasons[1], "visual: artifact detected");
    }

    #[test]
    fn test_cap_and_dedup() {
        let responses = collect(vec![scored(
            AgentKind::Visual,
            vec![
                signal("blur", 0.9),
                signal("blur", 0.6), // same type, lower confidence: dropped
                signal("color_shift", 0.8),
                signal("edge_halo", 0.7),
            ],
        )]);

        let reasons = extract_reasons(
            &responses,
            &AgentWeights::default(),
            consensus(0.5, 0.9),
            2,
        );

        assert_eq!(reasons.len(), 2);
        assert_eq!(reasons[0], "visual: blur detected");
        assert_eq!(reasons[1], "visual: color_shift detected");
    }

    #[test]
    fn test_same_signal_type_from_different_agents_both_kept() {
        let responses = collect(vec![
            scored(AgentKind::Visual, vec![signal("compression", 0.9)]),
            scored(AgentKind::Metadata, vec![signal("compression", 0.8)]),
        ]);

        let reasons = extract_reasons(
            &responses,
            &AgentWeights::default(),
            consensus(0.5, 0.9),
            5,
        );

        assert_eq!(reasons.len(), 2);
    }

    #[test]
    fn test_failed_agents_carry_no_reasons() {
        let responses = collect(vec![
            scored(AgentKind::Visual, vec![signal("blur", 0.9)]),
            AgentResponse::failure("req-1", AgentKind::Metadata, AgentError::timeout("slow")),
        ]);

        let reasons = extract_reasons(
            &responses,
            &AgentWeights::default(),
            consensus(0.5, 0.45),
            5,
        );

        assert_eq!(reasons, vec!["visual: blur detected".to_string()]);
    }

    #[test]
    fn test_severity_is_rendered_when_present() {
        let mut sig = signal("face_swap", 0.9);
        sig.severity = Some(crate::models::Severity::High);
        let responses = collect(vec![scored(AgentKind::Visual, vec![sig])]);

        let reasons = extract_reasons(
            &responses,
            &AgentWeights::default(),
            consensus(0.8, 0.9),
            5,
        );

        assert_eq!(reasons[0], "visual: face_swap detected (high severity)");
    }

    #[test]
    fn test_fallback_reasons() {
        let empty = collect(vec![scored(AgentKind::Visual, vec![])]);
        let weights = AgentWeights::default();

        let indeterminate = extract_reasons(&empty, &weights, consensus(0.0, 0.0), 5);
        assert_eq!(
            indeterminate,
            vec!["Insufficient agent data to determine cause".to_string()]
        );

        let clean = extract_reasons(&empty, &weights, consensus(0.1, 0.9), 5);
        assert_eq!(
            clean,
            vec!["No significant indicators detected".to_string()]
        );

        let silent_risk = extract_reasons(&empty, &weights, consensus(0.7, 0.9), 5);
        assert_eq!(
            silent_risk,
            vec!["Elevated risk reported without detailed signals".to_string()]
        );
    }
}
