//! Column allow-lists and file naming for the per-season input tables.

use std::fmt;
use std::path::{Path, PathBuf};

pub const GAME_ID: &str = "gameId";
pub const TEAM_CODE: &str = "teamTricode";
pub const DATE: &str = "date";

pub const GAME_COUNT: &str = "game_count";
pub const TIME_BETWEEN_GAMES: &str = "time_between_games";
pub const PLAYOFF: &str = "playoff";

pub const WINNER: &str = "winner";
pub const HOME_TEAM: &str = "HOME_TEAM_ABBREVIATION";
pub const AWAY_TEAM: &str = "AWAY_TEAM_ABBREVIATION";
pub const HOME_POINTS: &str = "HOME_TEAM_PTS";
pub const AWAY_POINTS: &str = "AWAY_TEAM_PTS";
pub const GAME_DATE: &str = "GAME_DATE";
pub const SEASON: &str = "season";

/// Composite key shared by every statistic category.
pub const MERGE_KEY: &[&str] = &[GAME_ID, TEAM_CODE];

/// Columns needed from `{season}_all_games.csv`.
pub const GAMES_COLUMNS: &[&str] = &[
    GAME_ID,
    GAME_DATE,
    HOME_TEAM,
    HOME_POINTS,
    AWAY_TEAM,
    AWAY_POINTS,
];

/// Outcome columns attached in full mode.
pub const OUTCOME_COLUMNS: &[&str] = &[WINNER, HOME_TEAM, AWAY_TEAM];

/// Columns that are never smoothed and survive into every horizon table.
pub const NON_AVERAGED_COLUMNS: &[&str] = &[
    TEAM_CODE,
    GAME_ID,
    DATE,
    GAME_COUNT,
    TIME_BETWEEN_GAMES,
    PLAYOFF,
    WINNER,
    HOME_TEAM,
    AWAY_TEAM,
];

/// Columns read back as text regardless of content.
pub const TEXT_COLUMNS: &[&str] = &[GAME_ID, TEAM_CODE, WINNER, HOME_TEAM, AWAY_TEAM, SEASON];

/// Rate-style statistics. These are dropped from the feature table, not smoothed.
pub const PERCENTAGE_COLUMNS: &[&str] = &[
    "assistPercentage",
    "assistToTurnover",
    "assistRatio",
    "offensiveReboundPercentage",
    "defensiveReboundPercentage",
    "reboundPercentage",
    "turnoverRatio",
    "effectiveFieldGoalPercentage",
    "trueShootingPercentage",
    "usagePercentage",
    "estimatedUsagePercentage",
    "fieldGoalsPercentage",
    "threePointersPercentage",
    "freeThrowsPercentage",
    "contestedFieldGoalPercentage",
    "uncontestedFieldGoalsPercentage",
    "defendedAtRimFieldGoalPercentage",
];

pub const ADVANCED_STATS: &[&str] = &[
    "estimatedOffensiveRating",
    "offensiveRating",
    "estimatedDefensiveRating",
    "defensiveRating",
    "estimatedNetRating",
    "netRating",
    "assistPercentage",
    "assistToTurnover",
    "assistRatio",
    "offensiveReboundPercentage",
    "defensiveReboundPercentage",
    "reboundPercentage",
    "turnoverRatio",
    "effectiveFieldGoalPercentage",
    "trueShootingPercentage",
    "usagePercentage",
    "estimatedUsagePercentage",
    "estimatedPace",
    "pace",
    "pacePer40",
    "possessions",
    "PIE",
];

pub const TRADITIONAL_STATS: &[&str] = &[
    "fieldGoalsMade",
    "fieldGoalsAttempted",
    "fieldGoalsPercentage",
    "threePointersMade",
    "threePointersAttempted",
    "threePointersPercentage",
    "freeThrowsMade",
    "freeThrowsAttempted",
    "freeThrowsPercentage",
    "reboundsOffensive",
    "reboundsDefensive",
    "reboundsTotal",
    "assists",
    "steals",
    "blocks",
    "turnovers",
    "foulsPersonal",
    "points",
    "plusMinusPoints",
];

pub const HUSTLE_STATS: &[&str] = &[
    "contestedShots",
    "contestedShots2pt",
    "contestedShots3pt",
    "deflections",
    "chargesDrawn",
    "screenAssists",
    "screenAssistPoints",
    "looseBallsRecoveredOffensive",
    "looseBallsRecoveredDefensive",
    "looseBallsRecoveredTotal",
    "offensiveBoxOuts",
    "defensiveBoxOuts",
    "boxOutPlayerTeamRebounds",
    "boxOutPlayerRebounds",
    "boxOuts",
];

pub const MISC_STATS: &[&str] = &[
    "pointsOffTurnovers",
    "pointsSecondChance",
    "pointsFastBreak",
    "pointsPaint",
    "oppPointsOffTurnovers",
    "oppPointsSecondChance",
    "oppPointsFastBreak",
    "oppPointsPaint",
    "blocksAgainst",
    "foulsDrawn",
];

pub const TRACKING_STATS: &[&str] = &[
    "distance",
    "reboundChancesOffensive",
    "reboundChancesDefensive",
    "reboundChancesTotal",
    "touches",
    "secondaryAssists",
    "freeThrowAssists",
    "passes",
    "contestedFieldGoalsMade",
    "contestedFieldGoalsAttempted",
    "contestedFieldGoalPercentage",
    "uncontestedFieldGoalsMade",
    "uncontestedFieldGoalsAttempted",
    "uncontestedFieldGoalsPercentage",
    "defendedAtRimFieldGoalsMade",
    "defendedAtRimFieldGoalsAttempted",
    "defendedAtRimFieldGoalPercentage",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCategory {
    Advanced,
    Traditional,
    Hustle,
    Misc,
    Tracking,
}

impl StatCategory {
    /// Merge order.
    pub const ALL: [StatCategory; 5] = [
        StatCategory::Advanced,
        StatCategory::Traditional,
        StatCategory::Hustle,
        StatCategory::Misc,
        StatCategory::Tracking,
    ];

    pub fn file_suffix(self) -> &'static str {
        match self {
            StatCategory::Advanced => "advanced_stats",
            StatCategory::Traditional => "traditional_stats",
            StatCategory::Hustle => "hustle_stats",
            StatCategory::Misc => "misc_stats",
            StatCategory::Tracking => "track_stats",
        }
    }

    pub fn stat_columns(self) -> &'static [&'static str] {
        match self {
            StatCategory::Advanced => ADVANCED_STATS,
            StatCategory::Traditional => TRADITIONAL_STATS,
            StatCategory::Hustle => HUSTLE_STATS,
            StatCategory::Misc => MISC_STATS,
            StatCategory::Tracking => TRACKING_STATS,
        }
    }

    /// Key columns followed by the category's statistics.
    pub fn columns(self) -> Vec<&'static str> {
        let mut out = MERGE_KEY.to_vec();
        out.extend_from_slice(self.stat_columns());
        out
    }
}

impl fmt::Display for StatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_suffix())
    }
}

pub fn games_file(dir: &Path, season: &str) -> PathBuf {
    dir.join(format!("{season}_all_games.csv"))
}

pub fn category_file(dir: &Path, season: &str, category: StatCategory) -> PathBuf {
    dir.join(format!("{season}_{}.csv", category.file_suffix()))
}

pub fn is_percentage_column(name: &str) -> bool {
    PERCENTAGE_COLUMNS.contains(&name)
}

pub fn running_avg_column(stat: &str, span: u32) -> String {
    format!("running_avg_{stat}_last_{span}")
}
