#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use polars::df;
use polars::prelude::*;

use hoops_features::schema::{self, StatCategory};

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn approx(actual: Option<f64>, expected: f64) {
    let value = actual.unwrap_or_else(|| panic!("expected {expected}, got null"));
    assert!(
        (value - expected).abs() < 1e-9,
        "expected {expected}, got {value}"
    );
}

/// Numeric cell at `row`, whatever the column's numeric type.
pub fn num(df: &DataFrame, row: usize, column: &str) -> Option<f64> {
    let values = df
        .column(column)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap();
    values.f64().unwrap().get(row)
}

/// Value at `row` rendered as text; dates come out as `YYYY-MM-DD`.
pub fn text(df: &DataFrame, row: usize, column: &str) -> Option<String> {
    let values = df.column(column).unwrap().cast(&DataType::String).unwrap();
    values.str().unwrap().get(row).map(str::to_string)
}

pub fn texts(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    (0..df.height()).map(|row| text(df, row, column)).collect()
}

pub fn names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|c| c.to_string())
        .collect()
}

/// Row positions of `team`, in frame order.
pub fn rows_for(df: &DataFrame, team: &str) -> Vec<usize> {
    (0..df.height())
        .filter(|&row| text(df, row, schema::TEAM_CODE).as_deref() == Some(team))
        .collect()
}

/// Position of the (game, team) row.
pub fn row_of(df: &DataFrame, game: &str, team: &str) -> usize {
    (0..df.height())
        .find(|&row| {
            text(df, row, schema::GAME_ID).as_deref() == Some(game)
                && text(df, row, schema::TEAM_CODE).as_deref() == Some(team)
        })
        .unwrap_or_else(|| panic!("no row for game {game} team {team}"))
}

/// Days since the Unix epoch, the physical value of a polars `Date`.
pub fn epoch_days(day: &str) -> i32 {
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").expect("valid test date");
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Merged-style frame: gameId, teamTricode, date, points, fieldGoalsPercentage.
pub fn merged_table(rows: &[(&str, &str, &str, f64)]) -> DataFrame {
    merged_with_days(
        &rows
            .iter()
            .map(|&(game, team, day, points)| (game, team, epoch_days(day), points))
            .collect::<Vec<_>>(),
    )
}

/// Same as [`merged_table`] with dates given as days since the epoch.
pub fn merged_with_days(rows: &[(&str, &str, i32, f64)]) -> DataFrame {
    df!(
        schema::GAME_ID => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        schema::TEAM_CODE => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        schema::DATE => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
        "points" => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
        "fieldGoalsPercentage" => vec![0.5; rows.len()],
    )
    .unwrap()
    .lazy()
    .with_column(col(schema::DATE).cast(DataType::Date))
    .collect()
    .unwrap()
}

/// In-memory category frame where every statistic equals `value`.
pub fn category_table(category: StatCategory, rows: &[(&str, &str, f64)]) -> DataFrame {
    let mut df = df!(
        schema::GAME_ID => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        schema::TEAM_CODE => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
    )
    .unwrap();
    for stat in category.stat_columns() {
        let values = rows.iter().map(|r| r.2).collect::<Vec<_>>();
        df.with_column(Column::new((*stat).into(), values)).unwrap();
    }
    df
}

/// (gameId, GAME_DATE, home, home points, away, away points)
pub type GameLine<'a> = (&'a str, &'a str, &'a str, i32, &'a str, i32);

pub fn write_games(dir: &Path, season: &str, games: &[GameLine<'_>]) {
    let mut out = String::from(
        "gameId,GAME_DATE,HOME_TEAM_ABBREVIATION,HOME_TEAM_PTS,AWAY_TEAM_ABBREVIATION,AWAY_TEAM_PTS,MATCHUP\n",
    );
    for (id, day, home, hp, away, ap) in games {
        out.push_str(&format!("{id},{day},{home},{hp},{away},{ap},{home} vs. {away}\n"));
    }
    fs::write(schema::games_file(dir, season), out).unwrap();
}

/// Writes a category file with an extra column the loader must ignore.
pub fn write_category(dir: &Path, season: &str, category: StatCategory, rows: &[(&str, &str, f64)]) {
    let mut header = category.columns();
    header.push("teamName");
    let mut out = header.join(",");
    out.push('\n');
    for (game, team, value) in rows {
        let mut fields = vec![game.to_string(), team.to_string()];
        fields.extend(category.stat_columns().iter().map(|_| value.to_string()));
        fields.push(format!("{team} Club"));
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    fs::write(schema::category_file(dir, season, category), out).unwrap();
}

/// Writes games plus all five categories with one row per team per game.
/// Each team row carries `value` = index of the game (1-based) times 10.
pub fn write_season(dir: &Path, season: &str, games: &[GameLine<'_>]) {
    write_games(dir, season, games);
    let mut rows = Vec::new();
    for (i, (id, _, home, _, away, _)) in games.iter().enumerate() {
        let value = (i as f64 + 1.0) * 10.0;
        rows.push((*id, *home, value));
        rows.push((*id, *away, value));
    }
    for category in StatCategory::ALL {
        write_category(dir, season, category, &rows);
    }
}
