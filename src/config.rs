//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.veridict.toml` files. All values are read at startup and immutable
//! thereafter.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::{AgentKind, AgentWeights};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Agent endpoints and the enabled set.
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Consensus weights per agent.
    #[serde(default)]
    pub weights: AgentWeights,

    /// Dispatch timing.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Media intake limits.
    #[serde(default)]
    pub media: MediaConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Agent endpoint addresses and the enabled roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default = "default_visual_endpoint")]
    pub visual: String,

    #[serde(default = "default_metadata_endpoint")]
    pub metadata: String,

    #[serde(default = "default_audio_endpoint")]
    pub audio: String,

    #[serde(default = "default_lipsync_endpoint")]
    pub lipsync: String,

    /// Agents that participate in a full dispatch.
    #[serde(default = "default_enabled")]
    pub enabled: Vec<AgentKind>,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            visual: default_visual_endpoint(),
            metadata: default_metadata_endpoint(),
            audio: default_audio_endpoint(),
            lipsync: default_lipsync_endpoint(),
            enabled: default_enabled(),
        }
    }
}

fn default_visual_endpoint() -> String {
    "http://localhost:8001".to_string()
}

fn default_metadata_endpoint() -> String {
    "http://localhost:8002".to_string()
}

fn default_audio_endpoint() -> String {
    "http://localhost:8003".to_string()
}

fn default_lipsync_endpoint() -> String {
    "http://localhost:8004".to_string()
}

fn default_enabled() -> Vec<AgentKind> {
    vec![AgentKind::Visual, AgentKind::Metadata]
}

impl AgentsConfig {
    pub fn endpoint_for(&self, agent: AgentKind) -> &str {
        match agent {
            AgentKind::Visual => &self.visual,
            AgentKind::Metadata => &self.metadata,
            AgentKind::Audio => &self.audio,
            AgentKind::Lipsync => &self.lipsync,
        }
    }
}

/// Dispatch timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Per-agent call timeout in seconds.
    #[serde(default = "default_agent_timeout")]
    pub agent_timeout_seconds: u64,

    /// Global deadline for the whole dispatch in seconds. Agents still
    /// pending when it elapses are recorded as timed out.
    #[serde(default = "default_deadline")]
    pub deadline_seconds: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            agent_timeout_seconds: default_agent_timeout(),
            deadline_seconds: default_deadline(),
        }
    }
}

fn default_agent_timeout() -> u64 {
    30
}

fn default_deadline() -> u64 {
    45
}

/// Media intake limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Maximum media file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024 // 100MB
}

/// Report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum number of reasons in the final response.
    #[serde(default = "default_max_reasons")]
    pub max_reasons: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_reasons: default_max_reasons(),
        }
    }
}

fn default_max_reasons() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".veridict.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.visual_url {
            self.agents.visual = url.clone();
        }
        if let Some(ref url) = args.metadata_url {
            self.agents.metadata = url.clone();
        }
        if let Some(ref url) = args.audio_url {
            self.agents.audio = url.clone();
        }
        if let Some(ref url) = args.lipsync_url {
            self.agents.lipsync = url.clone();
        }

        if let Some(timeout) = args.timeout {
            self.dispatch.agent_timeout_seconds = timeout;
        }
        if let Some(deadline) = args.deadline {
            self.dispatch.deadline_seconds = deadline;
        }
        if let Some(max_reasons) = args.max_reasons {
            self.report.max_reasons = max_reasons;
        }
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;

        if self.agents.enabled.is_empty() {
            anyhow::bail!("At least one agent must be enabled");
        }
        if self.dispatch.agent_timeout_seconds == 0 {
            anyhow::bail!("Agent timeout must be at least 1 second");
        }
        if self.dispatch.deadline_seconds == 0 {
            anyhow::bail!("Dispatch deadline must be at least 1 second");
        }
        if self.report.max_reasons == 0 {
            anyhow::bail!("max_reasons must be at least 1");
        }

        for agent in &self.agents.enabled {
            let endpoint = self.agents.endpoint_for(*agent);
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                anyhow::bail!(
                    "Endpoint for {} must start with 'http://' or 'https://': {}",
                    agent,
                    endpoint
                );
            }
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
