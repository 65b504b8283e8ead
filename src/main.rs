//! page-reader-rs: article summarizer and speech reader service for Linux.

mod bridge;
mod clipboard;
mod config;
mod controller;
mod credentials;
mod errors;
mod keys;
mod pane;
mod speech;
mod summarizer;

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "page-reader-rs", about = "Article summarizer and speech reader")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial summary type: brief, detailed, or bullets
    #[arg(short = 't', long = "type", default_value = "brief")]
    summary_type: String,

    /// Summarize the current page immediately on startup
    #[arg(long)]
    summarize_on_start: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("page-reader-rs starting");

    let config = config::Config::load(args.config.as_deref());
    info!(
        "Config loaded: model {}, bridge {}",
        config.gemini.model, config.bridge.host
    );

    let summary_type = summarizer::SummaryType::from_name(&args.summary_type);

    let mut controller = controller::ReaderController::new(config, summary_type);
    controller.run(args.summarize_on_start).await;
}
