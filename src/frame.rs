//! Helpers over polars frames shared by the pipeline stages.

use polars::frame::UniqueKeepStrategy;
use polars::prelude::*;

use crate::error::{PipelineError, Result};

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|c| c.to_string())
        .collect()
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Fails with a schema error naming the first absent column.
pub fn require_columns(df: &DataFrame, table: &str, columns: &[&str]) -> Result<()> {
    match columns.iter().find(|c| !has_column(df, c)) {
        Some(missing) => Err(PipelineError::schema(table, *missing)),
        None => Ok(()),
    }
}

/// Names present in every frame, in the first frame's order.
pub fn common_columns(frames: &[DataFrame]) -> Vec<String> {
    let Some((first, rest)) = frames.split_first() else {
        return Vec::new();
    };
    column_names(first)
        .into_iter()
        .filter(|c| rest.iter().all(|f| has_column(f, c)))
        .collect()
}

pub fn by_name(names: &[&str]) -> Selector {
    Selector::ByName {
        names: names.iter().map(|n| PlSmallStr::from(*n)).collect(),
        strict: true,
    }
}

/// Collapses repeated key combinations to their first row, keeping row order.
pub fn keep_first(lf: LazyFrame, keys: &[&str]) -> LazyFrame {
    lf.unique_stable(Some(by_name(keys)), UniqueKeepStrategy::First)
}

pub fn select_columns<S: AsRef<str>>(lf: LazyFrame, names: &[S]) -> LazyFrame {
    lf.select(names.iter().map(|n| col(n.as_ref())).collect::<Vec<_>>())
}

/// Every column of `df` except `dropped`.
pub fn without_columns(df: &DataFrame, dropped: &[&str]) -> Vec<String> {
    column_names(df)
        .into_iter()
        .filter(|c| !dropped.contains(&c.as_str()))
        .collect()
}
