//! CSV persistence for the output tables, with a backup destination when the
//! primary file cannot be written.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::loader::scan_csv;
use crate::schema;

pub const GAMES_FILE: &str = "all_games.csv";
pub const FEATURES_FILE: &str = "all_team_averages.csv";

/// Where output files are created.
pub trait OutputSink {
    fn create(&self, file_name: &str) -> io::Result<Box<dyn Write>>;
    fn location(&self, file_name: &str) -> PathBuf;
}

/// Writes files into a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSink {
    root: PathBuf,
}

impl DirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl OutputSink for DirSink {
    fn create(&self, file_name: &str) -> io::Result<Box<dyn Write>> {
        fs::create_dir_all(&self.root)?;
        let file = File::create(self.root.join(file_name))?;
        Ok(Box::new(io::BufWriter::new(file)))
    }

    fn location(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }
}

pub fn backup_name(file_name: &str) -> String {
    format!("backup_{file_name}")
}

/// Writes `df` as `file_name`; on a permission failure retries once as
/// `backup_<file_name>`. Returns the path actually written.
pub fn write_with_fallback(sink: &dyn OutputSink, file_name: &str, df: &DataFrame) -> Result<PathBuf> {
    let primary = sink.location(file_name);
    match write_to_sink(sink, file_name, df) {
        Ok(()) => {
            info!(path = %primary.display(), rows = df.height(), "wrote table");
            Ok(primary)
        }
        Err(err) if err.is_permission_denied() => {
            let backup = backup_name(file_name);
            let fallback = sink.location(&backup);
            warn!(
                path = %primary.display(),
                fallback = %fallback.display(),
                "{err}; saving to backup file"
            );
            match write_to_sink(sink, &backup, df) {
                Ok(()) => {
                    info!(path = %fallback.display(), rows = df.height(), "wrote table");
                    Ok(fallback)
                }
                Err(fallback_err) => Err(PipelineError::PersistenceWrite {
                    primary,
                    fallback,
                    source: into_io(fallback_err),
                }),
            }
        }
        Err(err) => Err(err),
    }
}

/// Writes `df` to `path` with a header row. Nulls become empty fields.
pub fn write_table(path: &Path, df: &DataFrame) -> Result<()> {
    let sink = DirSink::new(path.parent().unwrap_or_else(|| Path::new(".")));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| PipelineError::Shape(format!("not a file path: {}", path.display())))?;
    write_to_sink(&sink, &name, df)
}

fn write_to_sink(sink: &dyn OutputSink, file_name: &str, df: &DataFrame) -> Result<()> {
    let path = sink.location(file_name);
    let io_err = |source: io::Error| PipelineError::Io {
        path: path.clone(),
        source,
    };

    let mut out = sink.create(file_name).map_err(io_err)?;
    let mut df = df.clone();
    CsvWriter::new(&mut out)
        .include_header(true)
        .finish(&mut df)?;
    out.flush().map_err(io_err)?;
    Ok(())
}

/// Reads a table written by [`write_table`]. Identifier columns stay text;
/// other columns get inferred number and date types.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(PipelineError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let read_err = |source: PolarsError| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut lf = scan_csv(path, true).map_err(read_err)?;
    let text = lf
        .collect_schema()
        .map_err(read_err)?
        .iter_names()
        .filter(|name| schema::TEXT_COLUMNS.contains(&name.as_str()))
        .map(|name| col(name.as_str()).cast(DataType::String))
        .collect::<Vec<_>>();
    let df = lf.with_columns(text).collect().map_err(read_err)?;
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read table"
    );
    Ok(df)
}

fn into_io(err: PipelineError) -> io::Error {
    match err {
        PipelineError::Io { source, .. } => source,
        other => io::Error::other(other.to_string()),
    }
}
