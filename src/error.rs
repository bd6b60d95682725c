use std::io;
use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("missing input file {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("{table}: missing required column `{column}`")]
    Schema { table: String, column: String },

    #[error("{table}: invalid value {value:?} in column `{column}` (row {row})")]
    InvalidValue {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    /// Only ever rendered into run warnings; merges never fail with it.
    #[error("{context}: join produced no rows")]
    JoinEmptyResult { context: String },

    /// Warning form as well: a join kept fewer rows than its smallest input.
    #[error("{context}: join kept {kept} of {expected} rows")]
    PartialJoin {
        context: String,
        kept: usize,
        expected: usize,
    },

    #[error("game {game_id} ended tied at {points}-{points}")]
    TiedGame { game_id: String, points: i32 },

    #[error(
        "could not write {} or fallback {}: {source}",
        .primary.display(),
        .fallback.display()
    )]
    PersistenceWrite {
        primary: PathBuf,
        fallback: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Frames handed to a stage do not have the shape it needs.
    #[error("table shape: {0}")]
    Shape(String),

    #[error("reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    pub fn schema(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            column: column.into(),
        }
    }

    /// True when the underlying io failure is a permission problem.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
