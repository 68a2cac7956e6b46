//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

use crate::models::{AgentKind, MediaType, Verdict};

/// Veridict - multi-agent media forensics orchestrator
///
/// Analyze a media file for manipulation by dispatching it to the
/// configured analysis agents and combining their findings into a
/// weighted consensus verdict.
///
/// Examples:
///   veridict --media suspect_clip.mp4
///   veridict --media photo.jpg --format markdown --output verdict.md
///   veridict --media clip.mp4 --agent visual
///   veridict --media clip.mp4 --fail-on suspicious
///   veridict --check
///   veridict --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the media file to analyze
    ///
    /// Not required when using --init-config or --check.
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present_any = ["init_config", "check"]
    )]
    pub media: Option<PathBuf>,

    /// Declared media type (video, image, audio)
    ///
    /// Overrides extension-based detection. The file must still exist
    /// and fit the size cap.
    #[arg(long, value_name = "TYPE")]
    pub media_type: Option<MediaTypeArg>,

    /// Address the request to a single agent instead of the full roster
    #[arg(long, value_name = "AGENT")]
    pub agent: Option<AgentArg>,

    /// Request id to propagate to agents
    ///
    /// A UUIDv4 is generated when not provided.
    #[arg(long, value_name = "ID")]
    pub request_id: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .veridict.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Visual agent endpoint URL
    #[arg(long, value_name = "URL", env = "VERIDICT_VISUAL_URL")]
    pub visual_url: Option<String>,

    /// Metadata agent endpoint URL
    #[arg(long, value_name = "URL", env = "VERIDICT_METADATA_URL")]
    pub metadata_url: Option<String>,

    /// Audio agent endpoint URL
    #[arg(long, value_name = "URL", env = "VERIDICT_AUDIO_URL")]
    pub audio_url: Option<String>,

    /// Lip-sync agent endpoint URL
    #[arg(long, value_name = "URL", env = "VERIDICT_LIPSYNC_URL")]
    pub lipsync_url: Option<String>,

    /// Per-agent call timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Global dispatch deadline in seconds
    ///
    /// Agents still pending when the deadline elapses are recorded as
    /// timed out; their in-flight calls are cancelled.
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Maximum number of reasons in the final response
    #[arg(long, value_name = "COUNT")]
    pub max_reasons: Option<usize>,

    /// Output format (json, markdown)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Fail if the verdict is at or above this level
    ///
    /// Useful for CI pipelines. Exit code 2 when the threshold is met.
    /// Values: suspicious, high-risk
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<FailOnVerdict>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Validate the media file and print the roster without calling any agent
    #[arg(long)]
    pub dry_run: bool,

    /// Probe the health endpoint of every enabled agent and exit
    #[arg(long)]
    pub check: bool,

    /// Generate a default .veridict.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// Markdown format
    Markdown,
}

/// Media type as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MediaTypeArg {
    Video,
    Image,
    Audio,
}

impl From<MediaTypeArg> for MediaType {
    fn from(arg: MediaTypeArg) -> Self {
        match arg {
            MediaTypeArg::Video => MediaType::Video,
            MediaTypeArg::Image => MediaType::Image,
            MediaTypeArg::Audio => MediaType::Audio,
        }
    }
}

/// Agent selector as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AgentArg {
    Visual,
    Metadata,
    Audio,
    Lipsync,
}

impl From<AgentArg> for AgentKind {
    fn from(arg: AgentArg) -> Self {
        match arg {
            AgentArg::Visual => AgentKind::Visual,
            AgentArg::Metadata => AgentKind::Metadata,
            AgentArg::Audio => AgentKind::Audio,
            AgentArg::Lipsync => AgentKind::Lipsync,
        }
    }
}

/// Verdict threshold for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FailOnVerdict {
    Suspicious,
    HighRisk,
}

impl From<FailOnVerdict> for Verdict {
    fn from(level: FailOnVerdict) -> Self {
        match level {
            FailOnVerdict::Suspicious => Verdict::Suspicious,
            FailOnVerdict::HighRisk => Verdict::HighRisk,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(deadline) = self.deadline {
            if deadline == 0 {
                return Err("Deadline must be at least 1 second".to_string());
            }
        }

        if let Some(max_reasons) = self.max_reasons {
            if max_reasons == 0 {
                return Err("max_reasons must be at least 1".to_string());
            }
        }

        if let Some(ref request_id) = self.request_id {
            if request_id.trim().is_empty() {
                return Err("Request id must not be empty".to_string());
            }
        }

        for url in [
            &self.visual_url,
            &self.metadata_url,
            &self.audio_url,
            &self.lipsync_url,
        ]
        .into_iter()
        .flatten()
        {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!(
                    "Agent URL must start with 'http://' or 'https://': {}",
                    url
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
