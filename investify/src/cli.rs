//! CLI argument parsing for the investify binary

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncReadExt;

use crate::config::LlmConfig;
use crate::orchestrator::{AnalyzeOptions, OrchestratorConfig};
use crate::types::CombinedResult;

/// Investify CLI Arguments
#[derive(Parser, Debug, Clone)]
#[command(
    name = "investify",
    about = "Multi-agent investment analysis: investment, founder and market agents plus a scoring synthesis"
)]
pub struct Args {
    /// Read the investment description from a file
    #[arg(short, long, conflicts_with = "content")]
    pub file: Option<PathBuf>,

    /// Investment description text (stdin is read when neither --file nor --content is given)
    #[arg(short, long)]
    pub content: Option<String>,

    /// Request id to report in the result metadata (default: investment-<uuid>)
    #[arg(long)]
    pub request_id: Option<String>,

    #[arg(long)]
    pub skip_investment: bool,

    #[arg(long)]
    pub skip_founder: bool,

    #[arg(long)]
    pub skip_market: bool,

    #[arg(long)]
    pub skip_scoring: bool,

    /// Run the investment, founder and market agents concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Time limit for each agent, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Completion model (overrides OPENAI_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not mirror analysis events to stderr
    #[arg(long)]
    pub quiet: bool,
}

impl Args {
    /// Investment description from `--file`, `--content` or stdin
    pub async fn read_content(&self) -> Result<String> {
        if let Some(path) = &self.file {
            return tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()));
        }

        if let Some(content) = &self.content {
            return Ok(content.clone());
        }

        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("Failed to read investment description from stdin")?;
        Ok(content)
    }

    pub fn analyze_options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            request_id: self.request_id.clone(),
            run_investment: !self.skip_investment,
            run_founder: !self.skip_founder,
            run_market: !self.skip_market,
            run_scoring: !self.skip_scoring,
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            concurrent_upstream: self.parallel,
            step_timeout: self.timeout_secs.map(Duration::from_secs),
            emit_events: !self.quiet,
        }
    }

    pub fn apply_overrides(&self, config: &mut LlmConfig) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn render(&self, result: &CombinedResult) -> Result<String> {
        match self {
            OutputFormat::Json => {
                serde_json::to_string_pretty(result).context("Failed to serialize result as JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(result).context("Failed to serialize result as YAML")
            }
        }
    }
}

pub async fn write_output(path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, rendered)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
