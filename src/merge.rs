//! Joins the five statistic categories of one season into a single
//! per-(game, team) table and attaches game metadata.

use polars::prelude::*;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::frame;
use crate::outcome::{self, GameRecord};
use crate::schema::{self, StatCategory};

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub frame: DataFrame,
    pub warnings: Vec<String>,
}

/// Inner-joins the category tables on (game, team) in [`StatCategory::ALL`]
/// order, then left-joins date and outcome columns from `games`.
///
/// A (game, team) pair missing from any category is excluded. Rows whose
/// game is unknown to `games` have no date and are dropped as well.
/// Outcome columns are kept only when `full` is set. A season that ends up
/// with no rows always carries a [`PipelineError::JoinEmptyResult`] warning.
pub fn merge_season(
    season: &str,
    categories: &[(StatCategory, DataFrame)],
    games: &[GameRecord],
    full: bool,
) -> Result<MergeOutcome> {
    let mut warnings = Vec::new();
    let mut reported_empty = false;
    let key = || [col(schema::GAME_ID), col(schema::TEAM_CODE)];

    let mut merged: Option<DataFrame> = None;
    for category in StatCategory::ALL {
        let df = categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, df)| df.clone())
            .ok_or_else(|| {
                PipelineError::Shape(format!("{season}: no table supplied for {category}"))
            })?;
        let df = frame::keep_first(df.lazy(), schema::MERGE_KEY);

        merged = Some(match merged {
            None => df.collect()?,
            Some(acc) => {
                let had_rows = acc.height() > 0;
                let joined = acc
                    .lazy()
                    .join(df, key(), key(), JoinArgs::new(JoinType::Inner))
                    .collect()?;
                if joined.height() == 0 && had_rows {
                    reported_empty = true;
                    push_warning(
                        &mut warnings,
                        PipelineError::JoinEmptyResult {
                            context: format!("season {season}: merge with {category}"),
                        },
                    );
                }
                joined
            }
        });
    }
    let merged = merged.ok_or_else(|| PipelineError::Shape(format!("{season}: no categories")))?;
    debug!(season, rows = merged.height(), "merged statistic categories");

    let metadata = outcome::game_metadata_table(games)?;
    let with_games = merged
        .clone()
        .lazy()
        .join(
            metadata.lazy(),
            [col(schema::GAME_ID)],
            [col(schema::GAME_ID)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;

    let undated = with_games.column(schema::DATE)?.null_count();
    if undated > 0 {
        let msg = format!("season {season}: dropped {undated} team rows with no matching game");
        warn!("{msg}");
        warnings.push(msg);
    }

    let keep = if full {
        frame::column_names(&with_games)
    } else {
        frame::without_columns(&with_games, schema::OUTCOME_COLUMNS)
    };
    let dated = with_games.lazy().filter(col(schema::DATE).is_not_null());
    let table = frame::select_columns(frame::keep_first(dated, schema::MERGE_KEY), &keep).collect()?;

    if table.height() == 0 && !reported_empty {
        let context = if merged.height() > 0 {
            format!("season {season}: join with games")
        } else {
            format!("season {season}: merge of statistic categories")
        };
        push_warning(&mut warnings, PipelineError::JoinEmptyResult { context });
    }

    Ok(MergeOutcome {
        frame: table,
        warnings,
    })
}

fn push_warning(warnings: &mut Vec<String>, err: PipelineError) {
    let msg = err.to_string();
    warn!("{msg}");
    warnings.push(msg);
}
