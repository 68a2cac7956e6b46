//! Weighted consensus over the collected agent responses.
//!
//! Everything in this module is pure, synchronous computation: the
//! dispatcher's result map is complete before any of it runs.

pub mod aggregator;
pub mod assembler;
pub mod reasons;
pub mod verdict;

pub use aggregator::{aggregate, Consensus};
pub use assembler::assemble;
pub use reasons::extract_reasons;
pub use verdict::classify;

use std::collections::BTreeMap;
use std::time::Instant;

use crate::models::{AgentKind, AgentResponse, AgentWeights, OrchestratorResponse};

/// Run the full consensus pipeline over one dispatch's responses.
pub fn resolve(
    request_id: String,
    responses: BTreeMap<AgentKind, AgentResponse>,
    weights: &AgentWeights,
    max_reasons: usize,
    started: Instant,
) -> OrchestratorResponse {
    let consensus = aggregate(&responses, weights);
    let verdict = classify(consensus.risk_score);
    let reasons = extract_reasons(&responses, weights, consensus, max_reasons);

    assemble(request_id, responses, consensus, verdict, reasons, started)
}
