//! Iteration strategies understood by the file iterator

use clap::ValueEnum;
use std::fmt;

/// Suffix marking strategies that only read the first 64kB of each file
pub const TRUNCATED_SUFFIX: &str = "64";

/// Order and scope in which the file iterator visits a corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Strategy {
    /// Entire files in alphabetic order
    #[value(name = "a")]
    Alphabetic,
    /// First 64kB of files in alphabetic order
    #[value(name = "a64")]
    Alphabetic64,
    /// Entire files in random order
    #[value(name = "r")]
    Random,
    /// First 64kB of files in random order
    #[value(name = "r64")]
    Random64,
    /// Entire files in filesystem order
    #[value(name = "f")]
    Filesystem,
    /// First 64kB of files in filesystem order
    #[value(name = "f64")]
    Filesystem64,
    /// Entire files in cluster order
    #[value(name = "c")]
    Cluster,
    /// First 64kB of files in cluster order
    #[value(name = "c64")]
    Cluster64,
}

impl Strategy {
    pub const ALL: [Strategy; 8] = [
        Strategy::Alphabetic,
        Strategy::Alphabetic64,
        Strategy::Random,
        Strategy::Random64,
        Strategy::Filesystem,
        Strategy::Filesystem64,
        Strategy::Cluster,
        Strategy::Cluster64,
    ];

    /// Identifier used in artifact names and reports
    pub fn id(self) -> &'static str {
        match self {
            Strategy::Alphabetic => "a",
            Strategy::Alphabetic64 => "a64",
            Strategy::Random => "r",
            Strategy::Random64 => "r64",
            Strategy::Filesystem => "f",
            Strategy::Filesystem64 => "f64",
            Strategy::Cluster => "c",
            Strategy::Cluster64 => "c64",
        }
    }

    /// Command-line flag passed to the file iterator
    pub fn flag(self) -> String {
        format!("-{}", self.id())
    }

    pub fn from_id(id: &str) -> Option<Strategy> {
        Strategy::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn is_truncated(self) -> bool {
        is_truncated_id(self.id())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Whether a strategy identifier read back from disk denotes a truncated run
///
/// Works on raw identifiers so that artifacts written by other versions of
/// the tool still land in the right report column.
pub fn is_truncated_id(id: &str) -> bool {
    id.ends_with(TRUNCATED_SUFFIX)
}
