//! Veridict - Multi-Agent Media Forensics Orchestrator
//!
//! A CLI tool that dispatches a media file to independent analysis
//! agents (visual, metadata, audio, lip-sync) and combines their
//! findings into one weighted consensus verdict.
//!
//! Exit codes:
//!   0 - Success (verdict below --fail-on, or no --fail-on set)
//!   1 - Runtime error (bad media, config failure, unhealthy agents)
//!   2 - Verdict at or above the --fail-on threshold

mod cli;
mod client;
mod config;
mod consensus;
mod dispatch;
mod error;
mod media;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use client::AgentClient;
use config::Config;
use dispatch::{AgentEndpoint, Dispatcher};
use indicatif::{ProgressBar, ProgressStyle};
use models::{OrchestratorResponse, Submission, Verdict};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Veridict v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .veridict.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".veridict.toml");

    if path.exists() {
        eprintln!("⚠️  .veridict.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .veridict.toml")?;

    println!("✅ Created .veridict.toml with default settings.");
    println!("   Edit it to customize endpoints, weights, timeouts, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete analysis workflow. Returns exit code (0 or 2).
async fn run(args: Args) -> Result<i32> {
    let started = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let client = AgentClient::new(Duration::from_secs(config.dispatch.agent_timeout_seconds));
    let roster = dispatch::roster(&config.agents, args.agent.map(Into::into));

    // Handle --check: probe agent health endpoints and exit
    if args.check {
        return run_health_check(&client, &roster).await;
    }

    let Some(media_path) = args.media.clone() else {
        anyhow::bail!("--media is required");
    };

    // Step 1: Pre-dispatch validation. Failures here never reach an agent.
    let media_type = media::validate_media(
        &media_path,
        config.media.max_file_size,
        args.media_type.map(Into::into),
    )
    .map_err(|e| anyhow::anyhow!("{} [{}]", e, e.code()))?;

    let request_id = args
        .request_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    // Agents resolve the path themselves, so hand them an absolute one.
    let absolute = media_path.canonicalize().unwrap_or_else(|_| media_path.clone());
    let submission = Submission {
        request_id: request_id.clone(),
        media_path: absolute.to_string_lossy().into_owned(),
        media_type,
    };

    println!("🔍 Request: {}", request_id);
    println!("📁 Media: {} ({})", media_path.display(), media_type);
    println!(
        "🤖 Agents: {}",
        roster
            .iter()
            .map(|e| e.kind.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Handle --dry-run: validate and show the roster, no agent calls
    if args.dry_run {
        println!();
        for endpoint in &roster {
            println!("   {} → {}", endpoint.kind, endpoint.url);
        }
        println!("\n✅ Dry run complete. No agents were called.");
        return Ok(0);
    }

    // Step 2: Dispatch to all roster agents concurrently
    let spinner = make_spinner(&args, roster.len());
    let dispatcher = Dispatcher::new(
        client,
        Duration::from_secs(config.dispatch.deadline_seconds),
    );
    let responses = dispatcher.dispatch(&submission, &roster).await;
    spinner.finish_and_clear();

    let failed = responses.values().filter(|r| r.outcome.is_failed()).count();
    if failed > 0 {
        warn!("{} of {} agents failed", failed, responses.len());
    }

    // Step 3: Consensus pipeline
    let response = consensus::resolve(
        request_id,
        responses,
        &config.weights,
        config.report.max_reasons,
        started,
    );

    if response.confidence == 0.0 {
        warn!(
            "{}: no agent contributed; do not trust this verdict",
            error::codes::AGGREGATION_INDETERMINATE
        );
    }

    // Step 4: Emit the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&response)?,
        OutputFormat::Markdown => report::generate_markdown_report(&response),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("\n📝 Report saved to: {}", path.display());
        }
        None => println!("\n{}", output),
    }

    print_summary(&response);

    // Check --fail-on threshold
    if let Some(fail_level) = args.fail_on {
        let threshold: Verdict = fail_level.into();
        if response.verdict >= threshold {
            eprintln!(
                "\n⛔ Verdict {} is at or above {}. Failing (exit code 2).",
                response.verdict, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Probe the health endpoint of every roster agent.
async fn run_health_check(client: &AgentClient, roster: &[AgentEndpoint]) -> Result<i32> {
    println!("🩺 Probing {} agent(s)...\n", roster.len());

    let probes = roster.iter().map(|endpoint| {
        let client = client.clone();
        async move {
            let result = client.probe(&endpoint.url).await;
            (endpoint.kind, endpoint.url.clone(), result)
        }
    });
    let results = futures::future::join_all(probes).await;

    let mut healthy = true;
    for (kind, url, result) in results {
        match result {
            Ok(()) => println!("   ✅ {} ({})", kind, url),
            Err(e) => {
                healthy = false;
                println!("   ❌ {} ({}): {}", kind, url, e);
            }
        }
    }

    if healthy {
        println!("\n✅ All agents healthy.");
        Ok(0)
    } else {
        eprintln!("\n⛔ One or more agents are unhealthy.");
        Ok(1)
    }
}

/// Spinner shown while the dispatch is in flight.
fn make_spinner(args: &Args, agent_count: usize) -> ProgressBar {
    if args.quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Analyzing with {} agent(s)...", agent_count));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print the consensus summary.
fn print_summary(response: &OrchestratorResponse) {
    let badge = match response.verdict {
        Verdict::Authentic => "🟢",
        Verdict::Suspicious => "🟡",
        Verdict::HighRisk => "🔴",
    };

    println!("\n📊 Consensus:");
    println!(
        "   {} Verdict: {} (risk {:.2}, confidence {:.2})",
        badge, response.verdict, response.risk_score, response.confidence
    );
    for reason in &response.reasons {
        println!("   • {}", reason);
    }
    println!("   Duration: {}ms", response.processing_time_ms);
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .veridict.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
