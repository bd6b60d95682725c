//! Per-team running averages.
//!
//! Rows are ordered by team code and date, and every statistic is replaced by
//! an exponentially weighted mean lagged by the horizon's shift, evaluated
//! over each team's rows. With `shift >= 1` the value on a game only depends
//! on that team's earlier games; `shift == 0` includes the game itself.

use polars::prelude::*;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::frame;
use crate::horizon::Horizon;
use crate::schema;

pub const REGULAR_SEASON_GAMES: u32 = 82;

const DERIVED_COLUMNS: [&str; 3] = [schema::GAME_COUNT, schema::TIME_BETWEEN_GAMES, schema::PLAYOFF];

/// Adjusted exponential weighting with `alpha = 2 / (span + 1)`.
///
/// Missing observations still decay the weight of earlier ones and carry the
/// last mean forward. A value is produced as soon as one observation has
/// been seen.
pub fn ewm_options(span: u32) -> EWMOptions {
    EWMOptions {
        alpha: 2.0 / (f64::from(span) + 1.0),
        adjust: true,
        min_periods: 1,
        ignore_nulls: false,
        ..Default::default()
    }
}

/// Lagged running average of `stat` within each team.
pub fn running_average(stat: &str, horizon: Horizon) -> Expr {
    col(stat)
        .ewm_mean(ewm_options(horizon.span))
        .shift(lit(horizon.shift as i64))
        .over([col(schema::TEAM_CODE)])
        .alias(schema::running_avg_column(stat, horizon.span))
}

/// Number of earlier games on each row, lagged like the averages.
pub fn lagged_game_count(shift: usize) -> Expr {
    col(schema::TEAM_CODE)
        .cum_count(false)
        .cast(DataType::Int64)
        .shift(lit(shift as i64))
        .fill_null(lit(0i64))
        .over([col(schema::TEAM_CODE)])
}

/// Days since the team's previous game; null on its first.
pub fn days_since_previous_game() -> Expr {
    let day = col(schema::DATE).cast(DataType::Int32);
    (day.clone() - day.shift(lit(1i64)))
        .over([col(schema::TEAM_CODE)])
        .cast(DataType::Float64)
}

/// Statistic columns of `df` that get smoothed.
pub fn averaging_columns(df: &DataFrame) -> Vec<String> {
    frame::column_names(df)
        .into_iter()
        .filter(|c| !schema::NON_AVERAGED_COLUMNS.contains(&c.as_str()))
        .filter(|c| !schema::is_percentage_column(c))
        .collect()
}

/// Builds one horizon's feature rows from a merged season table.
///
/// Output columns: the pass-through identifier columns present in `merged`,
/// then `game_count`, `time_between_games`, `playoff`, then one
/// `running_avg_<stat>_last_<span>` column per smoothed statistic.
/// Percentage columns are dropped. Rows come out grouped by team, ordered by
/// date; same-day games keep their input order.
pub fn generate_team_features(
    merged: &DataFrame,
    horizon: Horizon,
    playoff_threshold: u32,
) -> Result<DataFrame> {
    frame::require_columns(
        merged,
        "merged season",
        &[schema::GAME_ID, schema::TEAM_CODE, schema::DATE],
    )?;
    let averaged = averaging_columns(merged);
    for stat in &averaged {
        reject_text(merged, stat)?;
    }

    let mut exprs = frame::column_names(merged)
        .iter()
        .filter(|c| {
            schema::NON_AVERAGED_COLUMNS.contains(&c.as_str())
                && !DERIVED_COLUMNS.contains(&c.as_str())
        })
        .map(|c| col(c.as_str()))
        .collect::<Vec<_>>();
    exprs.push(lagged_game_count(horizon.shift).alias(schema::GAME_COUNT));
    exprs.push(days_since_previous_game().alias(schema::TIME_BETWEEN_GAMES));
    exprs.push(
        lagged_game_count(horizon.shift)
            .gt(lit(i64::from(playoff_threshold)))
            .cast(DataType::Int64)
            .alias(schema::PLAYOFF),
    );
    exprs.extend(averaged.iter().map(|stat| running_average(stat, horizon)));

    let out = merged
        .clone()
        .lazy()
        .sort(
            [schema::TEAM_CODE, schema::DATE],
            SortMultipleOptions::new().with_maintain_order(true),
        )
        .select(exprs)
        .collect()?;
    debug!(
        rows = out.height(),
        stats = averaged.len(),
        span = horizon.span,
        shift = horizon.shift,
        "team features"
    );
    Ok(out)
}

// Statistics are numeric once loaded; a text column means a bad merge input.
fn reject_text(df: &DataFrame, column: &str) -> Result<()> {
    let values = df.column(column)?;
    if values.dtype() != &DataType::String {
        return Ok(());
    }
    let (row, value) = values
        .str()?
        .into_iter()
        .enumerate()
        .find_map(|(i, v)| v.map(|v| (i, v.to_string())))
        .unwrap_or_default();
    Err(PipelineError::InvalidValue {
        table: "merged season".to_string(),
        column: column.to_string(),
        row: row + 1,
        value,
    })
}
