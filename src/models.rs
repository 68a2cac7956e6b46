//! Contract types shared between the orchestrator and the analysis agents.
//!
//! Everything that crosses the agent boundary lives here: the analysis
//! request, the agent response, signals, weights, and the final
//! orchestrator response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::error::codes;

/// Kind of media under analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Image,
    Audio,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Video => write!(f, "video"),
            MediaType::Image => write!(f, "image"),
            MediaType::Audio => write!(f, "audio"),
        }
    }
}

/// An analysis agent modality.
///
/// `Ord` so that response maps and the agent breakdown iterate in a
/// stable order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Visual,
    Metadata,
    Audio,
    Lipsync,
}

impl AgentKind {
    /// All agent kinds, in breakdown order.
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Visual,
        AgentKind::Metadata,
        AgentKind::Audio,
        AgentKind::Lipsync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Visual => "visual",
            AgentKind::Metadata => "metadata",
            AgentKind::Audio => "audio",
            AgentKind::Lipsync => "lipsync",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion status an agent reports for its own analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Success,
    Partial,
    Failed,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStatus::Success => write!(f, "success"),
            AgentStatus::Partial => write!(f, "partial"),
            AgentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Severity of a detected signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Final categorical assessment of the media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "AUTHENTIC")]
    Authentic,
    #[serde(rename = "SUSPICIOUS")]
    Suspicious,
    #[serde(rename = "HIGH_RISK")]
    HighRisk,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Authentic => write!(f, "AUTHENTIC"),
            Verdict::Suspicious => write!(f, "SUSPICIOUS"),
            Verdict::HighRisk => write!(f, "HIGH_RISK"),
        }
    }
}

/// A single detected manipulation indicator.
///
/// The aggregation core treats signals as opaque except for `confidence`
/// and `severity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Free-form tag identifying what was detected.
    pub signal_type: String,
    /// Detection confidence in [0.0, 1.0].
    pub confidence: f64,
    /// Human-readable description of the indicator.
    pub description: String,
    /// Optional severity assessment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Agent-specific context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Structured error reported for a failed agent analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentError {
    /// Stable error code (see `error::codes`).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl AgentError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// The agent endpoint could not be reached.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(codes::AGENT_UNREACHABLE, message)
    }

    /// The agent did not answer before a timeout or deadline.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(codes::AGENT_TIMEOUT, message)
    }

    /// The agent answered with a non-2xx status or a malformed payload.
    pub fn bad_response(message: impl Into<String>) -> Self {
        Self::new(codes::AGENT_BAD_RESPONSE, message)
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A contract payload failed construction-time validation.
#[derive(Debug, Error)]
#[error("invalid contract payload: {0}")]
pub struct ContractError(pub String);

/// One client-initiated analysis. Immutable once dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Caller-supplied id, unique per analysis, echoed by every agent.
    pub request_id: String,
    /// Absolute path to the media file.
    pub media_path: String,
    pub media_type: MediaType,
}

impl Submission {
    /// Build the wire request addressed to a single agent.
    pub fn request_for(&self, agent_type: AgentKind) -> AnalysisRequest {
        AnalysisRequest {
            request_id: self.request_id.clone(),
            media_path: self.media_path.clone(),
            media_type: self.media_type,
            agent_type,
            options: None,
        }
    }
}

/// The per-agent wire request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub request_id: String,
    pub media_path: String,
    pub media_type: MediaType,
    /// The agent this request is addressed to.
    pub agent_type: AgentKind,
    /// Agent-specific configuration, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

/// What an agent's analysis produced.
///
/// A response is either scored (success or partial, carrying signals) or
/// failed (carrying a structured error), mutually exclusive by
/// construction. The flat wire shape is converted at the serde boundary.
#[derive(Debug, Clone)]
pub enum AgentOutcome {
    Success { risk_score: f64, signals: Vec<Signal> },
    Partial { risk_score: f64, signals: Vec<Signal> },
    Failed(AgentError),
}

impl AgentOutcome {
    pub fn status(&self) -> AgentStatus {
        match self {
            AgentOutcome::Success { .. } => AgentStatus::Success,
            AgentOutcome::Partial { .. } => AgentStatus::Partial,
            AgentOutcome::Failed(_) => AgentStatus::Failed,
        }
    }

    /// Declared risk score; `None` for failed analyses.
    pub fn risk_score(&self) -> Option<f64> {
        match self {
            AgentOutcome::Success { risk_score, .. }
            | AgentOutcome::Partial { risk_score, .. } => Some(*risk_score),
            AgentOutcome::Failed(_) => None,
        }
    }

    /// Detected signals; empty for failed analyses.
    pub fn signals(&self) -> &[Signal] {
        match self {
            AgentOutcome::Success { signals, .. } | AgentOutcome::Partial { signals, .. } => {
                signals
            }
            AgentOutcome::Failed(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&AgentError> {
        match self {
            AgentOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AgentOutcome::Failed(_))
    }
}

/// One agent's reply to one analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "WireAgentResponse", into = "WireAgentResponse")]
pub struct AgentResponse {
    /// Must equal the originating request's id.
    pub request_id: String,
    pub agent_type: AgentKind,
    pub outcome: AgentOutcome,
    /// Agent-reported processing time.
    pub processing_time_ms: Option<u64>,
    /// Agent-specific output metadata.
    pub metadata: Option<Map<String, Value>>,
}

impl AgentResponse {
    /// Synthesize a failed response, used when the agent never produced a
    /// well-formed one itself.
    pub fn failure(
        request_id: impl Into<String>,
        agent_type: AgentKind,
        error: AgentError,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            agent_type,
            outcome: AgentOutcome::Failed(error),
            processing_time_ms: None,
            metadata: None,
        }
    }
}

/// Flat wire shape of an agent response, as agents serialize it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireAgentResponse {
    request_id: String,
    agent_type: AgentKind,
    status: AgentStatus,
    risk_score: f64,
    #[serde(default)]
    signals: Vec<Signal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    processing_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<AgentError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Map<String, Value>>,
}

fn check_unit_interval(name: &str, value: f64) -> Result<(), ContractError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ContractError(format!(
            "{} must be within [0.0, 1.0], got {}",
            name, value
        )));
    }
    Ok(())
}

impl TryFrom<WireAgentResponse> for AgentResponse {
    type Error = ContractError;

    fn try_from(wire: WireAgentResponse) -> Result<Self, ContractError> {
        let outcome = match wire.status {
            AgentStatus::Failed => {
                let error = wire.error.ok_or_else(|| {
                    ContractError("failed response is missing the error field".to_string())
                })?;
                if !wire.signals.is_empty() {
                    return Err(ContractError(
                        "failed response must not carry signals".to_string(),
                    ));
                }
                // risk_score is meaningless on failure and discarded.
                AgentOutcome::Failed(error)
            }
            AgentStatus::Success | AgentStatus::Partial => {
                if let Some(error) = wire.error {
                    return Err(ContractError(format!(
                        "{} response carries an error ({})",
                        wire.status, error.code
                    )));
                }
                check_unit_interval("risk_score", wire.risk_score)?;
                for signal in &wire.signals {
                    check_unit_interval("signal confidence", signal.confidence)?;
                }
                match wire.status {
                    AgentStatus::Success => AgentOutcome::Success {
                        risk_score: wire.risk_score,
                        signals: wire.signals,
                    },
                    _ => AgentOutcome::Partial {
                        risk_score: wire.risk_score,
                        signals: wire.signals,
                    },
                }
            }
        };

        Ok(AgentResponse {
            request_id: wire.request_id,
            agent_type: wire.agent_type,
            outcome,
            processing_time_ms: wire.processing_time_ms,
            metadata: wire.metadata,
        })
    }
}

impl From<AgentResponse> for WireAgentResponse {
    fn from(response: AgentResponse) -> Self {
        let status = response.outcome.status();
        let (risk_score, signals, error) = match response.outcome {
            AgentOutcome::Success { risk_score, signals }
            | AgentOutcome::Partial { risk_score, signals } => (risk_score, signals, None),
            AgentOutcome::Failed(err) => (0.0, Vec::new(), Some(err)),
        };

        WireAgentResponse {
            request_id: response.request_id,
            agent_type: response.agent_type,
            status,
            risk_score,
            signals,
            processing_time_ms: response.processing_time_ms,
            error,
            metadata: response.metadata,
        }
    }
}

/// Per-agent weights for the consensus calculation.
///
/// Weights are not required to sum to 1.0; the aggregator renormalizes
/// over the agents actually contributing. A weight of 0.0 means the
/// agent's output is collected but never influences the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentWeights {
    #[serde(default = "default_visual_weight")]
    pub visual: f64,
    #[serde(default = "default_metadata_weight")]
    pub metadata: f64,
    #[serde(default = "default_audio_weight")]
    pub audio: f64,
    #[serde(default = "default_lipsync_weight")]
    pub lipsync: f64,
}

fn default_visual_weight() -> f64 {
    0.45
}

fn default_metadata_weight() -> f64 {
    0.55
}

fn default_audio_weight() -> f64 {
    0.30
}

fn default_lipsync_weight() -> f64 {
    0.00
}

impl Default for AgentWeights {
    fn default() -> Self {
        Self {
            visual: default_visual_weight(),
            metadata: default_metadata_weight(),
            audio: default_audio_weight(),
            lipsync: default_lipsync_weight(),
        }
    }
}

impl AgentWeights {
    pub fn weight_of(&self, agent: AgentKind) -> f64 {
        match agent {
            AgentKind::Visual => self.visual,
            AgentKind::Metadata => self.metadata,
            AgentKind::Audio => self.audio,
            AgentKind::Lipsync => self.lipsync,
        }
    }

    /// Reject out-of-range weights at load time.
    pub fn validate(&self) -> Result<(), ContractError> {
        for agent in AgentKind::ALL {
            let weight = self.weight_of(agent);
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(ContractError(format!(
                    "weight for {} must be within [0.0, 1.0], got {}",
                    agent, weight
                )));
            }
        }
        Ok(())
    }
}

/// The final aggregated response emitted to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorResponse {
    pub request_id: String,
    pub verdict: Verdict,
    /// Weighted aggregate risk in [0.0, 1.0].
    pub risk_score: f64,
    /// Confidence in the verdict in [0.0, 1.0]; 0.0 means indeterminate.
    pub confidence: f64,
    /// Top reasons, ordered, bounded by the configured cap.
    pub reasons: Vec<String>,
    /// One entry per dispatched agent, regardless of outcome.
    pub agent_breakdown: Vec<AgentResponse>,
    /// Wall-clock duration from dispatch start to assembly.
    pub processing_time_ms: u64,
    /// Assembly time.
    pub timestamp: DateTime<Utc>,
}
