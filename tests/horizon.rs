mod common;

use common::{approx, merged_table, names, num, row_of, text};
use hoops_features::PipelineError;
use hoops_features::features::generate_team_features;
use hoops_features::frame;
use hoops_features::horizon::{Horizon, combine_horizons};
use hoops_features::schema;
use polars::prelude::*;

fn season() -> DataFrame {
    merged_table(&[
        ("1", "AAA", "2024-10-22", 10.0),
        ("1", "BBB", "2024-10-22", 12.0),
        ("2", "AAA", "2024-10-24", 20.0),
        ("2", "BBB", "2024-10-24", 22.0),
        ("3", "AAA", "2024-10-27", 30.0),
        ("3", "BBB", "2024-10-27", 32.0),
    ])
}

fn horizon_tables(spans: &[u32]) -> Vec<DataFrame> {
    let merged = season();
    spans
        .iter()
        .map(|&span| generate_team_features(&merged, Horizon::new(span, 1), 82).unwrap())
        .collect()
}

fn is_game_team(game: &str, team: &str) -> Expr {
    col(schema::GAME_ID)
        .eq(lit(game))
        .and(col(schema::TEAM_CODE).eq(lit(team)))
}

#[test]
fn combines_on_shared_identifier_columns() {
    let out = combine_horizons(horizon_tables(&[50, 25, 10])).unwrap();
    assert_eq!(
        out.join_columns,
        vec![
            schema::GAME_ID,
            schema::TEAM_CODE,
            schema::DATE,
            schema::GAME_COUNT,
            schema::TIME_BETWEEN_GAMES,
            schema::PLAYOFF,
        ]
    );
    assert_eq!(out.frame.height(), 6);
    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    for span in [50, 25, 10] {
        assert!(frame::has_column(
            &out.frame,
            &schema::running_avg_column("points", span)
        ));
    }
    assert_eq!(out.frame.width(), 6 + 3);
    assert!(!names(&out.frame).iter().any(|c| c.ends_with("_right")));
    let row = row_of(&out.frame, "2", "AAA");
    approx(num(&out.frame, row, "running_avg_points_last_10"), 10.0);
}

#[test]
fn first_game_nulls_still_match_across_horizons() {
    let out = combine_horizons(horizon_tables(&[10, 5])).unwrap();
    let opener = row_of(&out.frame, "1", "BBB");
    assert_eq!(num(&out.frame, opener, schema::TIME_BETWEEN_GAMES), None);
    assert_eq!(num(&out.frame, opener, "running_avg_points_last_5"), None);
}

#[test]
fn output_is_ordered_by_team_then_date() {
    let out = combine_horizons(horizon_tables(&[10, 5])).unwrap();
    let order = (0..out.frame.height())
        .map(|i| {
            (
                text(&out.frame, i, schema::TEAM_CODE).unwrap(),
                text(&out.frame, i, schema::GAME_ID).unwrap(),
            )
        })
        .collect::<Vec<_>>();
    let expected = [("AAA", "1"), ("AAA", "2"), ("AAA", "3"), ("BBB", "1"), ("BBB", "2"), ("BBB", "3")]
        .iter()
        .map(|(t, g)| (t.to_string(), g.to_string()))
        .collect::<Vec<_>>();
    assert_eq!(order, expected);
}

#[test]
fn row_missing_from_one_horizon_is_missing_from_result() {
    let mut tables = horizon_tables(&[10, 5]);
    tables[1] = tables[1]
        .clone()
        .lazy()
        .filter(is_game_team("2", "BBB").not())
        .collect()
        .unwrap();

    let out = combine_horizons(tables).unwrap();
    assert_eq!(out.frame.height(), 5);
    let survivors = (0..out.frame.height())
        .map(|i| {
            (
                text(&out.frame, i, schema::GAME_ID).unwrap(),
                text(&out.frame, i, schema::TEAM_CODE).unwrap(),
            )
        })
        .collect::<Vec<_>>();
    assert!(!survivors.contains(&("2".to_string(), "BBB".to_string())));
}

#[test]
fn disagreeing_identifier_value_drops_the_row_with_a_partial_warning() {
    let mut tables = horizon_tables(&[10, 5]);
    tables[1] = tables[1]
        .clone()
        .lazy()
        .with_column(
            when(is_game_team("3", "AAA"))
                .then(lit(1i64))
                .otherwise(col(schema::PLAYOFF))
                .alias(schema::PLAYOFF),
        )
        .collect()
        .unwrap();

    let out = combine_horizons(tables).unwrap();
    assert_eq!(out.frame.height(), 5);
    let expected = PipelineError::PartialJoin {
        context: "horizon combine".to_string(),
        kept: 5,
        expected: 6,
    }
    .to_string();
    assert_eq!(out.warnings, vec![expected]);
}

#[test]
fn derived_columns_that_differ_lose_rows_and_warn() {
    let merged = season();
    let lagged = generate_team_features(&merged, Horizon::new(10, 1), 82).unwrap();
    let current = generate_team_features(&merged, Horizon::new(5, 0), 82).unwrap();
    let out = combine_horizons(vec![lagged, current]).unwrap();
    assert_eq!(out.frame.height(), 0);
    assert_eq!(out.warnings.len(), 1);
    assert!(out.warnings[0].contains("join produced no rows"));
}

#[test]
fn single_horizon_passes_through() {
    let out = combine_horizons(horizon_tables(&[3])).unwrap();
    assert_eq!(out.frame.height(), 6);
    assert!(frame::has_column(&out.frame, "running_avg_points_last_3"));
}

#[test]
fn no_tables_is_a_shape_error() {
    let err = combine_horizons(Vec::new()).unwrap_err();
    assert!(matches!(err, PipelineError::Shape(_)), "{err}");
}
