//! Markdown and JSON report generation.
//!
//! Renders the final orchestrator response for human and machine
//! consumption. Rendering never alters the response itself.

use anyhow::Result;

use crate::models::{AgentResponse, OrchestratorResponse, Verdict};

/// Serialize the orchestrator response as pretty-printed JSON.
pub fn generate_json_report(response: &OrchestratorResponse) -> Result<String> {
    let json = serde_json::to_string_pretty(response)?;
    Ok(json)
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(response: &OrchestratorResponse) -> String {
    let mut output = String::new();

    output.push_str("# Veridict Analysis Report\n\n");
    output.push_str(&generate_verdict_section(response));
    output.push_str(&generate_reasons_section(&response.reasons));
    output.push_str(&generate_breakdown_section(&response.agent_breakdown));
    output.push_str(&generate_footer(response));

    output
}

fn verdict_badge(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Authentic => "🟢 **AUTHENTIC**",
        Verdict::Suspicious => "🟡 **SUSPICIOUS**",
        Verdict::HighRisk => "🔴 **HIGH_RISK**",
    }
}

/// Generate the verdict summary section.
fn generate_verdict_section(response: &OrchestratorResponse) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Verdict: {}\n\n", verdict_badge(response.verdict)));
    section.push_str("| Request | Risk Score | Confidence |\n");
    section.push_str("|:---|:---:|:---:|\n");
    section.push_str(&format!(
        "| `{}` | {:.2} | {:.2} |\n\n",
        response.request_id, response.risk_score, response.confidence
    ));

    if response.confidence == 0.0 {
        section.push_str(
            "> ⚠️ Confidence is 0.0: no agent contributed to this verdict. Do not trust it.\n\n",
        );
    }

    section
}

/// Generate the reasons section.
fn generate_reasons_section(reasons: &[String]) -> String {
    let mut section = String::new();

    section.push_str("## Reasons\n\n");
    for (i, reason) in reasons.iter().enumerate() {
        section.push_str(&format!("{}. {}\n", i + 1, reason));
    }
    section.push('\n');

    section
}

/// Generate the per-agent breakdown section.
fn generate_breakdown_section(breakdown: &[AgentResponse]) -> String {
    let mut section = String::new();

    section.push_str("## Agent Breakdown\n\n");

    for response in breakdown {
        section.push_str(&generate_agent_block(response));
    }

    section
}

fn generate_agent_block(response: &AgentResponse) -> String {
    let mut block = String::new();

    block.push_str(&format!("### {} agent\n\n", response.agent_type));

    let timing = response
        .processing_time_ms
        .map(|ms| format!(" | Time: {}ms", ms))
        .unwrap_or_default();

    match response.outcome.risk_score() {
        Some(risk_score) => {
            block.push_str(&format!(
                "*Status: {} | Risk: {:.2}{}*\n\n",
                response.outcome.status(),
                risk_score,
                timing
            ));

            let signals = response.outcome.signals();
            if signals.is_empty() {
                block.push_str("No signals reported.\n\n");
            } else {
                block.push_str("| Signal | Confidence | Severity | Description |\n");
                block.push_str("|:---|:---:|:---:|:---|\n");
                for signal in signals {
                    let severity = signal
                        .severity
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    block.push_str(&format!(
                        "| `{}` | {:.2} | {} | {} |\n",
                        signal.signal_type, signal.confidence, severity, signal.description
                    ));
                }
                block.push('\n');
            }
        }
        None => {
            block.push_str(&format!("*Status: {}{}*\n\n", response.outcome.status(), timing));
            if let Some(error) = response.outcome.error() {
                block.push_str(&format!("> ❌ **{}**: {}\n\n", error.code, error.message));
            }
        }
    }

    block
}

/// Generate the report footer.
fn generate_footer(response: &OrchestratorResponse) -> String {
    format!(
        "---\n\n*Analyzed at {} in {}ms.*\n",
        response.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        response.processing_time_ms
    )
}
