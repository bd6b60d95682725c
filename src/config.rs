//! Pipeline configuration.
//!
//! Values come from defaults, an optional JSON file, and command-line or
//! environment overrides applied by the binary.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::features::REGULAR_SEASON_GAMES;
use crate::horizon::{DEFAULT_SHIFT, Horizon};
use crate::outcome::TiePolicy;

pub const DEFAULT_SPANS: &[u32] = &[50, 25, 10];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub seasons: Vec<String>,
    pub horizons: Vec<Horizon>,
    /// Keep winner and home/away codes in the feature table.
    pub full: bool,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tie_policy: TiePolicy,
    pub playoff_threshold: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seasons: Vec::new(),
            horizons: DEFAULT_SPANS
                .iter()
                .map(|&span| Horizon::new(span, DEFAULT_SHIFT))
                .collect(),
            full: false,
            data_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            tie_policy: TiePolicy::default(),
            playoff_threshold: REGULAR_SEASON_GAMES,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw)
            .map_err(|err| PipelineError::Config(format!("{}: {err}", path.display())))
    }

    pub fn validate(&self) -> Result<()> {
        if self.seasons.is_empty() {
            return Err(PipelineError::Config("no seasons configured".to_string()));
        }
        if let Some(blank) = self.seasons.iter().find(|s| s.trim().is_empty()) {
            return Err(PipelineError::Config(format!("blank season id {blank:?}")));
        }
        let Some(first) = self.horizons.first() else {
            return Err(PipelineError::Config("no horizons configured".to_string()));
        };
        let mut spans = HashSet::new();
        for horizon in &self.horizons {
            if horizon.span == 0 {
                return Err(PipelineError::Config("span must be at least 1".to_string()));
            }
            if !spans.insert(horizon.span) {
                return Err(PipelineError::Config(format!(
                    "span {} configured twice; feature columns would collide",
                    horizon.span
                )));
            }
            // game_count depends on shift and is a join column across horizons.
            if horizon.shift != first.shift {
                return Err(PipelineError::Config(format!(
                    "horizon {horizon} uses shift {} but {first} uses {}; all horizons must share one shift",
                    horizon.shift, first.shift
                )));
            }
        }
        Ok(())
    }
}

/// Splits a comma/semicolon/space separated list, dropping blanks and repeats.
pub fn parse_list(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split([',', ';', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(str::to_string)
        .collect()
}
