use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use synergx::loader;
use synergx::{
    Analyzer, EngineConfig, MatchEngine, MatchFilter, MatchType, RunOptions, SynergyPolicy,
    SynergyPredictor, Vectorizer,
};

/// Rank merger candidates for a subject company and print the report as JSON
#[derive(Parser, Debug)]
#[command(name = "synergx")]
#[command(about = "Explainable M&A candidate matching and synergy analysis", long_about = None)]
struct Args {
    /// Path to the taxonomy spec (JSON)
    #[arg(long)]
    taxonomy: PathBuf,

    /// Path to the candidate catalog (JSON)
    #[arg(long)]
    catalog: PathBuf,

    /// Path to the subject company record (JSON)
    #[arg(long)]
    subject: PathBuf,

    /// Minimum match score to keep
    #[arg(long, default_value_t = 0.3)]
    min_score: f32,

    /// Minimum confidence score to keep
    #[arg(long, default_value_t = 0.0)]
    min_confidence: f32,

    /// Keep only this match type (horizontal | vertical)
    #[arg(long)]
    match_type: Option<String>,

    /// Keep only candidates in this sector
    #[arg(long)]
    sector: Option<String>,

    /// Maximum number of results
    #[arg(long, default_value_t = 50)]
    max_results: usize,

    /// Abort candidate scoring after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Size of the scoring worker pool (defaults to the number of cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Pretty-print the report
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting synergx v{}", env!("CARGO_PKG_VERSION"));

    let taxonomy = Arc::new(loader::load_taxonomy(&args.taxonomy)?);
    let snapshot = loader::load_catalog(&args.catalog)?;
    let (subject, subject_financials) = loader::load_subject(&args.subject)?;
    info!(
        taxonomy_version = taxonomy.version(),
        catalog_version = snapshot.version(),
        candidates = snapshot.len(),
        subject = %subject.id,
        "inputs loaded"
    );

    let match_types = match &args.match_type {
        Some(raw) => {
            let parsed: MatchType = raw.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            Some(vec![parsed])
        }
        None => None,
    };
    let filter = MatchFilter {
        min_match_score: args.min_score,
        min_confidence: args.min_confidence,
        match_types,
        sector: args.sector.clone(),
        max_results: Some(args.max_results),
    };
    let options = RunOptions {
        deadline: args
            .timeout_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms)),
        threads: args.threads,
    };

    let vectorizer = Vectorizer::new(Arc::clone(&taxonomy), &snapshot);
    let engine = MatchEngine::new(taxonomy, EngineConfig::default())
        .map_err(|e| anyhow::anyhow!("engine configuration: {e}"))?;
    let predictor = SynergyPredictor::new(SynergyPolicy::default())
        .map_err(|e| anyhow::anyhow!("synergy policy: {e}"))?;
    let analyzer = Analyzer::new(engine, predictor);

    let report = analyzer.analyze(
        &subject,
        subject_financials.as_ref(),
        &snapshot,
        &vectorizer,
        &filter,
        &options,
    )?;
    info!(
        results = report.results.len(),
        skipped = report.skipped.len(),
        "report ready"
    );

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{rendered}");
    Ok(())
}
