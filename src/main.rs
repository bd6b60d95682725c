use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use hoops_features::config::{PipelineConfig, parse_list};
use hoops_features::horizon::Horizon;
use hoops_features::logging::LoggingConfig;
use hoops_features::outcome::TiePolicy;
use hoops_features::persist::DirSink;
use hoops_features::pipeline;

/// Builds per-team running-average features from per-season box score CSVs.
#[derive(Debug, Parser)]
#[command(name = "hoops_features", version)]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long, env = "HOOPS_CONFIG")]
    config: Option<PathBuf>,

    /// Season ids such as 2024-25. Repeat or separate with commas.
    #[arg(long = "season", env = "HOOPS_SEASONS", value_delimiter = ',')]
    seasons: Vec<String>,

    /// Smoothing horizons as SPAN or SPAN:SHIFT.
    #[arg(long = "horizon", env = "HOOPS_HORIZONS", value_delimiter = ',')]
    horizons: Vec<Horizon>,

    /// Keep winner and home/away team codes in the feature table.
    #[arg(long, env = "HOOPS_FULL")]
    full: bool,

    #[arg(long, env = "HOOPS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[arg(long, env = "HOOPS_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// `no_winner` or `error`.
    #[arg(long, env = "HOOPS_TIE_POLICY")]
    tie_policy: Option<TiePolicy>,

    #[arg(long, env = "HOOPS_PLAYOFF_THRESHOLD")]
    playoff_threshold: Option<u32>,

    #[arg(long, env = "HOOPS_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// `pretty` or `json`.
    #[arg(long, env = "HOOPS_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cli = Cli::parse();
    LoggingConfig {
        level: cli.log_level.clone(),
        format: cli.log_format.clone(),
    }
    .init();

    let cfg = resolve_config(cli)?;
    cfg.validate().context("invalid pipeline configuration")?;

    let output = pipeline::run(&cfg).context("feature pipeline failed")?;
    let sink = DirSink::new(&cfg.output_dir);
    let written = pipeline::persist_output(&output, &sink).context("saving output tables")?;

    let report = &output.report;
    println!("Processing complete");
    for season in &report.seasons {
        println!(
            "season {}: games={} merged_rows={}",
            season.season, season.games, season.merged_rows
        );
    }
    println!(
        "Features: {} rows x {} columns (joined on {})",
        report.feature_rows,
        report.feature_columns,
        report.join_columns.join(", ")
    );
    println!("Games: {}", written.games_path.display());
    println!("Averages: {}", written.features_path.display());
    if !report.warnings.is_empty() {
        println!("Warnings: {}", report.warnings.len());
        for warning in report.warnings.iter().take(8) {
            println!(" - {warning}");
        }
    }

    Ok(())
}

fn resolve_config(cli: Cli) -> Result<PipelineConfig> {
    let mut cfg = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let seasons = parse_list(&cli.seasons.join(","));
    if !seasons.is_empty() {
        cfg.seasons = seasons;
    }
    if !cli.horizons.is_empty() {
        cfg.horizons = cli.horizons;
    }
    if cli.full {
        cfg.full = true;
    }
    if let Some(dir) = cli.data_dir {
        cfg.data_dir = dir;
    }
    if let Some(dir) = cli.output_dir {
        cfg.output_dir = dir;
    }
    if let Some(policy) = cli.tie_policy {
        cfg.tie_policy = policy;
    }
    if let Some(threshold) = cli.playoff_threshold {
        cfg.playoff_threshold = threshold;
    }
    Ok(cfg)
}
