use anyhow::Context;
use clap::Parser;
use sitemap_insight::{AnalyzerConfig, WebsiteAnalyzer};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::from_env()?,
    };
    if let Some(concurrency) = args.concurrency.filter(|n| *n > 0) {
        config.max_concurrency = concurrency;
    }
    if let Some(timeout_ms) = args.timeout_ms.filter(|ms| *ms > 0) {
        config.request_timeout_ms = timeout_ms;
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if args.no_cache {
        config.cache_dir = None;
    } else if let Some(dir) = &args.cache_dir {
        config.cache_dir = Some(dir.clone());
    }

    let sitemap_path = args.sitemap_path();
    let sitemap = tokio::fs::read_to_string(&sitemap_path)
        .await
        .with_context(|| format!("could not read sitemap {}", sitemap_path.display()))?;

    let output = args.output_path();
    ::log::info!("Starting analysis for {}", args.site);
    let start_time = std::time::Instant::now();

    let summaries = WebsiteAnalyzer::new(config)
        .with_progress(!args.quiet)
        .analyze(&sitemap, Some(&output), args.limit)
        .await
        .with_context(|| format!("analysis of {} failed", args.site))?;

    ::log::info!(
        "Analysis complete - {} pages in {:.2} seconds",
        summaries.len(),
        start_time.elapsed().as_secs_f64()
    );
    println!("{} summaries written to {}", summaries.len(), output.display());
    Ok(())
}
