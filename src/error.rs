//! Classified failures and their process exit statuses
//!
//! Configuration and precondition failures stop the run before (or between)
//! measurements. Each one has its own exit status so calling automation can
//! tell "install the tool" apart from "re-run elevated".

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for failures that are not classified below
pub const EXIT_UNEXPECTED: u8 = 70;

/// Exit status for command-line usage errors
pub const EXIT_USAGE: u8 = 64;

/// Failures that terminate `iterbench run` or `iterbench summary`
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("please provide at least one iteration strategy")]
    NoStrategy,

    #[error("file iterator executable not found (searched: {searched})")]
    ExecutableNotFound { searched: String },

    #[error("{tool} not found, {hint}")]
    FlushToolNotFound { tool: String, hint: String },

    #[error("{tool} requires elevation for flushing the page cache")]
    InsufficientPrivilege { tool: String },

    #[error("corpora {first:?} and {second:?} both map to artifact prefix {slug:?}")]
    SlugCollision {
        first: String,
        second: String,
        slug: String,
    },

    #[error("input folder not found: {}", .0.display())]
    ReportFolderMissing(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl BenchError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            BenchError::NoStrategy | BenchError::ReportFolderMissing(_) => 1,
            BenchError::ExecutableNotFound { .. } => 2,
            BenchError::FlushToolNotFound { .. } => 3,
            BenchError::InsufficientPrivilege { .. } => 4,
            BenchError::SlugCollision { .. } => 5,
            BenchError::InvalidConfig(_) => 6,
            BenchError::Spawn { .. } => EXIT_UNEXPECTED,
        }
    }
}

/// Exit status for any error surfaced from a subcommand
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<BenchError>())
        .map_or(EXIT_UNEXPECTED, BenchError::exit_code)
}
