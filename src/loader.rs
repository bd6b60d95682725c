//! Reads the per-season CSV tables produced by the fetch step.

use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::frame;
use crate::outcome::GameRecord;
use crate::schema::{self, StatCategory};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Loads one statistic category for `season`, keeping only its allow-listed
/// columns. Key columns are text, statistics `Float64`.
pub fn load_category(dir: &Path, season: &str, category: StatCategory) -> Result<DataFrame> {
    let path = schema::category_file(dir, season, category);
    let table = file_label(&path);
    let raw = read_text_columns(&path, &category.columns())?;
    for stat in category.stat_columns() {
        check_numeric(&raw, &table, stat)?;
    }

    let mut exprs = vec![game_id_key()];
    exprs.extend(
        category
            .stat_columns()
            .iter()
            .map(|stat| col(*stat).cast(DataType::Float64)),
    );
    let df = raw.lazy().with_columns(exprs).collect()?;
    debug!(
        season,
        category = %category,
        rows = df.height(),
        "loaded category table"
    );
    Ok(df)
}

/// Loads `{season}_all_games.csv` into game records, one per game id.
pub fn load_games(dir: &Path, season: &str) -> Result<Vec<GameRecord>> {
    let path = schema::games_file(dir, season);
    let table = file_label(&path);
    let raw = read_text_columns(&path, schema::GAMES_COLUMNS)?;
    let before = raw.height();
    let games = frame::keep_first(raw.lazy().with_column(game_id_key()), &[schema::GAME_ID])
        .collect()?;
    if games.height() < before {
        debug!(
            season,
            dropped = before - games.height(),
            "dropped duplicate game rows"
        );
    }

    let ids = text_column(&games, schema::GAME_ID)?;
    let dates = text_column(&games, schema::GAME_DATE)?;
    let home_teams = text_column(&games, schema::HOME_TEAM)?;
    let away_teams = text_column(&games, schema::AWAY_TEAM)?;
    let home_points = points_column(&games, &table, schema::HOME_POINTS)?;
    let away_points = points_column(&games, &table, schema::AWAY_POINTS)?;

    let mut out = Vec::with_capacity(games.height());
    for row in 0..games.height() {
        let raw_date = required_text(dates, &table, schema::GAME_DATE, row)?;
        let date = parse_date(raw_date)
            .ok_or_else(|| invalid(&table, schema::GAME_DATE, row, raw_date))?;
        out.push(GameRecord {
            season: season.to_string(),
            game_id: required_text(ids, &table, schema::GAME_ID, row)?.to_string(),
            date,
            home_team: required_text(home_teams, &table, schema::HOME_TEAM, row)?.to_string(),
            home_points: home_points[row],
            away_team: required_text(away_teams, &table, schema::AWAY_TEAM, row)?.to_string(),
            away_points: away_points[row],
            winner: None,
        });
    }
    Ok(out)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

/// Digit-only game ids lose their zero padding so the games log and the box
/// score files agree. Other ids pass through untouched.
pub fn game_id_key() -> Expr {
    let numeric = col(schema::GAME_ID).cast(DataType::UInt64);
    when(numeric.clone().is_not_null())
        .then(numeric.cast(DataType::String))
        .otherwise(col(schema::GAME_ID))
        .alias(schema::GAME_ID)
}

/// Lazily scans a CSV with a header row. Without `infer_types` every column
/// is read as text.
pub(crate) fn scan_csv(path: &Path, infer_types: bool) -> PolarsResult<LazyFrame> {
    let reader = LazyCsvReader::new(PlPath::new(&path.to_string_lossy())).with_has_header(true);
    let reader = if infer_types {
        reader.with_try_parse_dates(true)
    } else {
        reader.with_infer_schema_length(Some(0))
    };
    reader.finish()
}

fn read_text_columns(path: &Path, columns: &[&str]) -> Result<DataFrame> {
    if !path.exists() {
        return Err(PipelineError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let read_err = |source: PolarsError| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut lf = scan_csv(path, false).map_err(read_err)?;
    let schema = lf.collect_schema().map_err(read_err)?;
    if let Some(missing) = columns.iter().find(|c| !schema.contains(c)) {
        return Err(PipelineError::schema(file_label(path), *missing));
    }
    frame::select_columns(lf, columns)
        .collect()
        .map_err(read_err)
}

// First non-empty field that does not parse as a number.
fn check_numeric(raw: &DataFrame, table: &str, column: &str) -> Result<()> {
    let text = text_column(raw, column)?;
    let parsed = raw.column(column)?.cast(&DataType::Float64)?;
    let bad = text
        .into_iter()
        .zip(parsed.f64()?)
        .position(|(field, value)| field.is_some_and(|f| !f.trim().is_empty()) && value.is_none());
    match bad {
        Some(row) => Err(invalid(table, column, row, text.get(row).unwrap_or_default())),
        None => Ok(()),
    }
}

fn points_column(df: &DataFrame, table: &str, column: &str) -> Result<Vec<i32>> {
    text_column(df, column)?
        .into_iter()
        .enumerate()
        .map(|(row, raw)| {
            let raw = raw.unwrap_or_default();
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.round() as i32)
                .ok_or_else(|| invalid(table, column, row, raw))
        })
        .collect()
}

fn required_text<'a>(
    values: &'a StringChunked,
    table: &str,
    column: &str,
    row: usize,
) -> Result<&'a str> {
    values
        .get(row)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| invalid(table, column, row, ""))
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    Ok(df.column(name)?.str()?)
}

fn invalid(table: &str, column: &str, row: usize, value: &str) -> PipelineError {
    PipelineError::InvalidValue {
        table: table.to_string(),
        column: column.to_string(),
        row: row + 1,
        value: value.to_string(),
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use polars::df;

    use super::*;

    #[test]
    fn game_ids_lose_zero_padding() {
        let df = df!(schema::GAME_ID => ["0022400061", "22400061", "000", "G-01"]).unwrap();
        let out = df.lazy().with_column(game_id_key()).collect().unwrap();
        let ids = text_column(&out, schema::GAME_ID)
            .unwrap()
            .into_iter()
            .map(|id| id.unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["22400061", "22400061", "0", "G-01"]);
    }

    #[test]
    fn dates_accept_time_suffix() {
        let expected = NaiveDate::from_ymd_opt(2024, 10, 22);
        assert_eq!(parse_date("2024-10-22"), expected);
        assert_eq!(parse_date("2024-10-22T00:00:00"), expected);
        assert_eq!(parse_date("2024-10-22 19:30"), expected);
        assert_eq!(parse_date("22/10/2024"), None);
    }

    #[test]
    fn text_in_a_statistic_column_is_rejected_with_its_row() {
        let dir = tempfile::tempdir().unwrap();
        let category = StatCategory::Misc;
        let header = category.columns().join(",");
        let good = ["1", "BOS"]
            .into_iter()
            .chain(category.stat_columns().iter().map(|_| "3"))
            .collect::<Vec<_>>()
            .join(",");
        let bad = ["2", "BOS"]
            .into_iter()
            .chain(category.stat_columns().iter().map(|_| "n/a"))
            .collect::<Vec<_>>()
            .join(",");
        fs::write(
            schema::category_file(dir.path(), "2024-25", category),
            format!("{header}\n{good}\n{bad}\n"),
        )
        .unwrap();

        let err = load_category(dir.path(), "2024-25", category).unwrap_err();
        assert!(
            matches!(err, PipelineError::InvalidValue { row: 2, ref value, .. } if value == "n/a"),
            "{err}"
        );
    }

    #[test]
    fn empty_fields_load_as_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let category = StatCategory::Misc;
        let header = category.columns().join(",");
        let row = ["0022400001", "BOS"]
            .into_iter()
            .chain(category.stat_columns().iter().map(|_| ""))
            .collect::<Vec<_>>()
            .join(",");
        fs::write(
            schema::category_file(dir.path(), "2024-25", category),
            format!("{header}\n{row}\n"),
        )
        .unwrap();

        let df = load_category(dir.path(), "2024-25", category).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.column("foulsDrawn").unwrap().null_count(), 1);
        assert_eq!(df.column("foulsDrawn").unwrap().dtype(), &DataType::Float64);
        assert_eq!(
            text_column(&df, schema::GAME_ID).unwrap().get(0),
            Some("22400001")
        );
    }

    #[test]
    fn game_fields_are_found_by_header_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            schema::games_file(dir.path(), "2024-25"),
            "AWAY_TEAM_PTS,MATCHUP,HOME_TEAM_ABBREVIATION,GAME_DATE,AWAY_TEAM_ABBREVIATION,gameId,HOME_TEAM_PTS\n\
             109,BOS vs. NYK,BOS,2024-10-22,NYK,0022400001,132\n\
             109,BOS vs. NYK,BOS,2024-10-22,NYK,22400001,132\n",
        )
        .unwrap();

        let games = load_games(dir.path(), "2024-25").unwrap();
        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert_eq!(game.game_id, "22400001");
        assert_eq!((game.home_team.as_str(), game.home_points), ("BOS", 132));
        assert_eq!((game.away_team.as_str(), game.away_points), ("NYK", 109));
    }

    #[test]
    fn blank_team_code_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            schema::games_file(dir.path(), "2024-25"),
            "gameId,GAME_DATE,HOME_TEAM_ABBREVIATION,HOME_TEAM_PTS,AWAY_TEAM_ABBREVIATION,AWAY_TEAM_PTS\n\
             1,2024-10-22,BOS,100,,98\n",
        )
        .unwrap();

        let err = load_games(dir.path(), "2024-25").unwrap_err();
        assert!(
            matches!(err, PipelineError::InvalidValue { ref column, row: 1, .. } if column == schema::AWAY_TEAM),
            "{err}"
        );
    }
}
