use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use investify::cli::{write_output, Args};
use investify::{LlmConfig, OpenAiClient, Orchestrator, ResearchClient, ResearchConfig};
use investify_sdk::{log_file_saved, log_info, log_summary, log_warning};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let content = args.read_content().await?;
    if content.trim().is_empty() {
        log_warning!("Investment description is empty; every agent will reject it");
    }

    let mut llm = LlmConfig::from_env().context("Failed to load completion settings")?;
    args.apply_overrides(&mut llm);
    let model = llm.model.clone();
    let client = OpenAiClient::new(llm).context("Failed to create completion client")?;

    let research = ResearchConfig::from_env();
    if research.is_offline() {
        log_warning!("PERPLEXITY_API_KEY not set, research tools use offline summaries");
    }

    let orchestrator = Orchestrator::new(Arc::new(client), Arc::new(ResearchClient::new(research)))
        .with_config(args.orchestrator_config());

    log_info!("Analyzing {} characters with {}", content.len(), model);
    let result = orchestrator.analyze(&content, args.analyze_options()).await;

    for error in &result.errors {
        log_warning!(error);
    }

    let rendered = args.format.render(&result)?;
    match &args.output {
        Some(path) => {
            write_output(path, &rendered).await?;
            log_file_saved!(path.display());
        }
        None => println!("{}", rendered),
    }

    log_summary!(
        result.meta.agents_run.len(),
        result.errors.len(),
        result.meta.execution_time_ms
    );
    Ok(())
}
