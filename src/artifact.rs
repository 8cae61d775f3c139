//! Corpus identity and artifact file naming
//!
//! Artifact names are the only index of the benchmark results: the summary
//! phase rebuilds everything from `<corpusSlug>_<strategyId>_<repetition>`.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::strategy::Strategy;

/// Characters that may not appear in a corpus slug
pub const RESERVED_CHARS: [char; 10] = [' ', '\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Replacement for each reserved character
pub const SLUG_PLACEHOLDER: char = '_';

/// Replace every reserved character one-for-one with the placeholder
///
/// Distinct paths that differ only in reserved characters share a slug.
pub fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| {
            if RESERVED_CHARS.contains(&c) {
                SLUG_PLACEHOLDER
            } else {
                c
            }
        })
        .collect()
}

/// A folder of input files benchmarked as one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    name: String,
    slug: String,
}

impl Corpus {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { name, slug }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(path.to_string_lossy().into_owned())
    }

    /// Folder path as given by the caller
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.name)
    }
}

/// Identity of one run, encoded in its artifact file name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactId {
    pub corpus: String,
    pub strategy: String,
    /// 1-based; leading zeros in a file name are not preserved
    pub repetition: u32,
}

fn artifact_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)_([^_]+)_([0-9]+)$").expect("artifact name pattern is valid"))
}

impl ArtifactId {
    pub fn new(corpus: &Corpus, strategy: Strategy, repetition: u32) -> Self {
        Self {
            corpus: corpus.slug().to_string(),
            strategy: strategy.id().to_string(),
            repetition,
        }
    }

    /// Decode an artifact file name; `None` for anything else in the folder
    ///
    /// The repetition must be ASCII digits that fit a `u32`.
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = artifact_name_regex().captures(file_name)?;
        Some(Self {
            corpus: caps[1].to_string(),
            strategy: caps[2].to_string(),
            repetition: caps[3].parse().ok()?,
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}_{}_{}", self.corpus, self.strategy, self.repetition)
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}
