use chrono::{Datelike, NaiveDate};
use polars::df;
use polars::prelude::*;
use serde::Deserialize;
use tracing::warn;

use crate::error::{PipelineError, Result};
use crate::schema;

/// What to do when a completed game has equal scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// Leave the winner empty and keep going.
    #[default]
    NoWinner,
    /// Abort with [`PipelineError::TiedGame`].
    Error,
}

impl std::str::FromStr for TiePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "no_winner" | "none" => Ok(TiePolicy::NoWinner),
            "error" | "raise" => Ok(TiePolicy::Error),
            other => Err(format!("unknown tie policy `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub season: String,
    pub game_id: String,
    pub date: NaiveDate,
    pub home_team: String,
    pub home_points: i32,
    pub away_team: String,
    pub away_points: i32,
    pub winner: Option<String>,
}

impl GameRecord {
    /// Team code of the side that scored more, `None` on a tie.
    pub fn outcome(&self) -> Option<&str> {
        if self.home_points > self.away_points {
            Some(self.home_team.as_str())
        } else if self.home_points < self.away_points {
            Some(self.away_team.as_str())
        } else {
            None
        }
    }
}

/// Fills `winner` on every record.
pub fn derive_winners(games: &mut [GameRecord], policy: TiePolicy) -> Result<()> {
    for game in games.iter_mut() {
        let winner = game.outcome().map(str::to_string);
        if winner.is_none() {
            match policy {
                TiePolicy::Error => {
                    return Err(PipelineError::TiedGame {
                        game_id: game.game_id.clone(),
                        points: game.home_points,
                    });
                }
                TiePolicy::NoWinner => {
                    warn!(
                        game_id = %game.game_id,
                        points = game.home_points,
                        "tied game has no winner"
                    );
                }
            }
        }
        game.winner = winner;
    }
    Ok(())
}

/// Rows for `all_games.csv`.
pub fn games_table(games: &[GameRecord]) -> Result<DataFrame> {
    let df = df!(
        schema::SEASON => games.iter().map(|g| g.season.as_str()).collect::<Vec<_>>(),
        schema::GAME_ID => games.iter().map(|g| g.game_id.as_str()).collect::<Vec<_>>(),
        schema::GAME_DATE => games.iter().map(|g| epoch_days(g.date)).collect::<Vec<_>>(),
        schema::HOME_TEAM => games.iter().map(|g| g.home_team.as_str()).collect::<Vec<_>>(),
        schema::HOME_POINTS => games.iter().map(|g| g.home_points).collect::<Vec<_>>(),
        schema::AWAY_TEAM => games.iter().map(|g| g.away_team.as_str()).collect::<Vec<_>>(),
        schema::AWAY_POINTS => games.iter().map(|g| g.away_points).collect::<Vec<_>>(),
        schema::WINNER => games.iter().map(|g| g.winner.as_deref()).collect::<Vec<_>>(),
    )?;
    Ok(df
        .lazy()
        .with_column(col(schema::GAME_DATE).cast(DataType::Date))
        .collect()?)
}

/// Per-game metadata joined onto team rows: date plus outcome columns.
pub fn game_metadata_table(games: &[GameRecord]) -> Result<DataFrame> {
    let df = df!(
        schema::GAME_ID => games.iter().map(|g| g.game_id.as_str()).collect::<Vec<_>>(),
        schema::DATE => games.iter().map(|g| epoch_days(g.date)).collect::<Vec<_>>(),
        schema::WINNER => games.iter().map(|g| g.winner.as_deref()).collect::<Vec<_>>(),
        schema::HOME_TEAM => games.iter().map(|g| g.home_team.as_str()).collect::<Vec<_>>(),
        schema::AWAY_TEAM => games.iter().map(|g| g.away_team.as_str()).collect::<Vec<_>>(),
    )?;
    Ok(df
        .lazy()
        .with_column(col(schema::DATE).cast(DataType::Date))
        .collect()?)
}

// Physical representation of a polars `Date`.
fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
