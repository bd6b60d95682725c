use std::fmt;
use std::str::FromStr;

use polars::prelude::*;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::frame;
use crate::schema;

pub const DEFAULT_SHIFT: usize = 1;

/// One smoothing window: `span` sets the decay, `shift` the lag in games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct Horizon {
    pub span: u32,
    #[serde(default = "default_shift")]
    pub shift: usize,
}

fn default_shift() -> usize {
    DEFAULT_SHIFT
}

impl Horizon {
    pub fn new(span: u32, shift: usize) -> Self {
        Self { span, shift }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.span, self.shift)
    }
}

/// Parses `SPAN` or `SPAN:SHIFT`.
impl FromStr for Horizon {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let raw = raw.trim();
        let (span, shift) = match raw.split_once(':') {
            Some((span, shift)) => (span, Some(shift)),
            None => (raw, None),
        };
        let span = span
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid span in horizon `{raw}`"))?;
        let shift = match shift {
            Some(s) => s
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid shift in horizon `{raw}`"))?,
            None => DEFAULT_SHIFT,
        };
        Ok(Horizon { span, shift })
    }
}

#[derive(Debug, Clone)]
pub struct CombineOutcome {
    pub frame: DataFrame,
    pub join_columns: Vec<String>,
    pub warnings: Vec<String>,
}

const RIGHT_SUFFIX: &str = "_right";

/// Inner-joins per-horizon feature tables on the columns they all share.
///
/// Only rows present in every table survive; nulls in shared columns match
/// nulls. Rows lost relative to the smallest input are reported as a
/// warning. The result is ordered by team, then date.
pub fn combine_horizons(frames: Vec<DataFrame>) -> Result<CombineOutcome> {
    if frames.is_empty() {
        return Err(PipelineError::Shape("no horizon tables to combine".to_string()));
    }
    let join_columns = frame::common_columns(&frames);
    if let Some(missing) = schema::MERGE_KEY
        .iter()
        .find(|k| !join_columns.iter().any(|c| c.as_str() == **k))
    {
        return Err(PipelineError::Shape(format!(
            "horizon tables do not all carry `{missing}`"
        )));
    }
    let smallest = frames.iter().map(DataFrame::height).min().unwrap_or(0);

    let mut iter = frames.into_iter();
    let mut combined = iter
        .next()
        .ok_or_else(|| PipelineError::Shape("no horizon tables to combine".to_string()))?;
    for next in iter {
        combined = join_on_shared(combined, next, &join_columns)?;
    }

    let order = [schema::TEAM_CODE, schema::DATE, schema::GAME_ID]
        .into_iter()
        .filter(|c| join_columns.iter().any(|j| j.as_str() == *c))
        .collect::<Vec<_>>();
    let combined = combined
        .lazy()
        .sort(order, SortMultipleOptions::new().with_maintain_order(true))
        .collect()?;

    let mut warnings = Vec::new();
    if combined.height() < smallest {
        let err = if combined.height() == 0 {
            PipelineError::JoinEmptyResult {
                context: "horizon combine".to_string(),
            }
        } else {
            PipelineError::PartialJoin {
                context: "horizon combine".to_string(),
                kept: combined.height(),
                expected: smallest,
            }
        };
        let msg = err.to_string();
        warn!("{msg}; identifier columns differ between horizons");
        warnings.push(msg);
    }
    info!(
        rows = combined.height(),
        columns = combined.width(),
        "combined horizons"
    );

    Ok(CombineOutcome {
        frame: combined,
        join_columns,
        warnings,
    })
}

// Joins on the (game, team) key, then keeps only rows whose other shared
// columns agree, treating two nulls as equal.
fn join_on_shared(left: DataFrame, right: DataFrame, shared: &[String]) -> Result<DataFrame> {
    let key = || schema::MERGE_KEY.iter().map(|k| col(*k)).collect::<Vec<_>>();
    let mut keep = frame::column_names(&left);
    keep.extend(
        frame::column_names(&right)
            .into_iter()
            .filter(|c| !shared.contains(c)),
    );

    let mut joined = left
        .lazy()
        .join(right.lazy(), key(), key(), JoinArgs::new(JoinType::Inner));
    let agree = shared
        .iter()
        .filter(|c| !schema::MERGE_KEY.contains(&c.as_str()))
        .map(|c| col(c.as_str()).eq_missing(col(format!("{c}{RIGHT_SUFFIX}"))))
        .reduce(|acc, e| acc.and(e));
    if let Some(agree) = agree {
        joined = joined.filter(agree);
    }
    Ok(frame::select_columns(joined, &keep).collect()?)
}
