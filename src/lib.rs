pub mod config;
pub mod error;
pub mod frame;
pub mod features;
pub mod horizon;
pub mod loader;
pub mod logging;
pub mod merge;
pub mod outcome;
pub mod persist;
pub mod pipeline;
pub mod schema;

pub use error::{PipelineError, Result};
