//! End-to-end run: load and merge each season, build one feature table per
//! horizon, combine horizons, persist.

use std::path::PathBuf;

use polars::prelude::*;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::features::generate_team_features;
use crate::horizon::combine_horizons;
use crate::loader;
use crate::merge::merge_season;
use crate::outcome::{self, GameRecord};
use crate::persist::{self, OutputSink};
use crate::schema::StatCategory;

/// One season after loading and merging.
#[derive(Debug, Clone)]
pub struct SeasonData {
    pub season: String,
    pub games: Vec<GameRecord>,
    pub merged: DataFrame,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SeasonSummary {
    pub season: String,
    pub games: usize,
    pub merged_rows: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub seasons: Vec<SeasonSummary>,
    pub feature_rows: usize,
    pub feature_columns: usize,
    pub join_columns: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub games: DataFrame,
    pub features: DataFrame,
    pub report: RunReport,
}

#[derive(Debug, Clone)]
pub struct PersistReport {
    pub games_path: PathBuf,
    pub features_path: PathBuf,
}

/// Loads all six files for `season`, derives winners, and merges categories.
pub fn prepare_season(cfg: &PipelineConfig, season: &str) -> Result<SeasonData> {
    let dir = cfg.data_dir.as_path();
    let mut games = loader::load_games(dir, season)?;
    outcome::derive_winners(&mut games, cfg.tie_policy)?;

    let categories = StatCategory::ALL
        .iter()
        .map(|&category| loader::load_category(dir, season, category).map(|t| (category, t)))
        .collect::<Result<Vec<_>>>()?;

    let merged = merge_season(season, &categories, &games, cfg.full)?;
    info!(
        season,
        games = games.len(),
        rows = merged.frame.height(),
        "season merged"
    );
    Ok(SeasonData {
        season: season.to_string(),
        games,
        merged: merged.frame,
        warnings: merged.warnings,
    })
}

/// Runs every configured season and horizon in memory.
pub fn run(cfg: &PipelineConfig) -> Result<PipelineOutput> {
    cfg.validate()?;

    let seasons = cfg
        .seasons
        .iter()
        .try_fold(Vec::new(), |mut acc, season| {
            acc.push(prepare_season(cfg, season)?);
            Ok::<_, PipelineError>(acc)
        })?;
    build_output(cfg, seasons)
}

/// Feature generation and horizon combination over already merged seasons.
pub fn build_output(cfg: &PipelineConfig, seasons: Vec<SeasonData>) -> Result<PipelineOutput> {
    let mut report = RunReport::default();

    let mut horizon_tables = Vec::with_capacity(cfg.horizons.len());
    for &horizon in &cfg.horizons {
        let per_season = seasons
            .iter()
            .map(|s| {
                generate_team_features(&s.merged, horizon, cfg.playoff_threshold).map(|df| df.lazy())
            })
            .collect::<Result<Vec<_>>>()?;
        let table = polars::prelude::concat(per_season, UnionArgs::default())?.collect()?;
        info!(%horizon, rows = table.height(), "horizon features");
        horizon_tables.push(table);
    }
    let combined = combine_horizons(horizon_tables)?;

    let mut all_games = Vec::new();
    for season in seasons {
        report.seasons.push(SeasonSummary {
            season: season.season.clone(),
            games: season.games.len(),
            merged_rows: season.merged.height(),
        });
        report.warnings.extend(season.warnings);
        all_games.extend(season.games);
    }
    report.warnings.extend(combined.warnings);
    report.feature_rows = combined.frame.height();
    report.feature_columns = combined.frame.width();
    report.join_columns = combined.join_columns;

    Ok(PipelineOutput {
        games: outcome::games_table(&all_games)?,
        features: combined.frame,
        report,
    })
}

/// Writes `all_games.csv` and `all_team_averages.csv`, each falling back to
/// its `backup_` name on a permission failure.
pub fn persist_output(output: &PipelineOutput, sink: &dyn OutputSink) -> Result<PersistReport> {
    let games_path = persist::write_with_fallback(sink, persist::GAMES_FILE, &output.games)?;
    let features_path =
        persist::write_with_fallback(sink, persist::FEATURES_FILE, &output.features)?;
    Ok(PersistReport {
        games_path,
        features_path,
    })
}
