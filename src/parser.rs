//! Sample extraction from run artifacts
//!
//! The file iterator has no structured output format. A run counts when some
//! line of its captured output reads `hashing <anything> took <seconds>s`;
//! everything else in the folder is ignored.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::artifact::ArtifactId;

/// Duration of one run, in seconds
pub type Sample = f64;

fn duration_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^hashing .* took (\d*\.?\d+)s").expect("duration line pattern is valid")
    })
}

/// First duration reported in `output`, if any
///
/// Later matching lines are ignored so that a retried or duplicated report
/// does not produce a second sample.
pub fn parse_output(output: &str) -> Option<Sample> {
    output.lines().find_map(|line| {
        duration_line_regex()
            .captures(line)
            .and_then(|caps| caps[1].parse::<f64>().ok())
    })
}

/// Sample held by the artifact at `path`
///
/// Unreadable files count as "no data", like artifacts without a duration.
pub fn parse_artifact(path: &Path) -> Option<Sample> {
    match std::fs::read(path) {
        Ok(bytes) => parse_output(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            tracing::warn!("Skipping unreadable artifact {}: {}", path.display(), e);
            None
        }
    }
}

/// Samples keyed by corpus slug, strategy id and repetition index
///
/// Repetitions are ordered numerically, so run 10 follows run 9.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    corpora: BTreeMap<String, BTreeMap<String, BTreeMap<u32, Sample>>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample; an existing sample for the same run is replaced
    pub fn insert(&mut self, id: ArtifactId, sample: Sample) {
        self.corpora
            .entry(id.corpus)
            .or_default()
            .entry(id.strategy)
            .or_default()
            .insert(id.repetition, sample);
    }

    pub fn is_empty(&self) -> bool {
        self.corpora.is_empty()
    }

    /// Total number of samples
    pub fn len(&self) -> usize {
        self.corpora
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    pub fn corpora(&self) -> impl Iterator<Item = &str> {
        self.corpora.keys().map(String::as_str)
    }

    /// Strategy groups of one corpus
    pub fn strategies(
        &self,
        corpus: &str,
    ) -> impl Iterator<Item = (&str, &BTreeMap<u32, Sample>)> {
        self.corpora
            .get(corpus)
            .into_iter()
            .flat_map(|groups| groups.iter().map(|(s, runs)| (s.as_str(), runs)))
    }

    pub fn runs(&self, corpus: &str, strategy: &str) -> Option<&BTreeMap<u32, Sample>> {
        self.corpora.get(corpus)?.get(strategy)
    }

    /// Sample values of one group, in repetition key order
    pub fn samples(&self, corpus: &str, strategy: &str) -> Vec<Sample> {
        self.runs(corpus, strategy)
            .map(|runs| runs.values().copied().collect())
            .unwrap_or_default()
    }

    /// `(corpus, strategy, repetition, sample)` for every sample
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, u32, Sample)> {
        self.corpora.iter().flat_map(|(corpus, groups)| {
            groups.iter().flat_map(move |(strategy, runs)| {
                runs.iter().map(move |(rep, &sample)| {
                    (corpus.as_str(), strategy.as_str(), *rep, sample)
                })
            })
        })
    }
}

/// Rebuild the result set from every artifact in `dir`
///
/// Files whose names are not artifact names, and artifacts without a
/// duration line, are skipped.
pub fn scan_directory(dir: &Path) -> Result<ResultSet> {
    let mut results = ResultSet::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read result folder {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let file_name = entry.file_name();
        let Some(id) = file_name.to_str().and_then(ArtifactId::parse) else {
            tracing::debug!("Ignoring {:?}", file_name);
            continue;
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        match parse_artifact(&path) {
            Some(sample) => results.insert(id, sample),
            None => tracing::debug!("No duration in {}", path.display()),
        }
    }

    tracing::info!(samples = results.len(), folder = %dir.display(), "scanned results");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_parse_output_no_match() {
        assert_eq!(parse_output("listing files took 1.0s\n"), None);
        assert_eq!(parse_output(""), None);
    }

    #[test]
    fn test_parse_output_single_match() {
        assert_eq!(parse_output("hashing x took 1.500s"), Some(1.5));
    }

    #[test]
    fn test_parse_output_first_match_wins() {
        let text = "start\nhashing x took 2.25s\nhashing y took 9.0s\n";
        assert_eq!(parse_output(text), Some(2.25));
    }

    #[test]
    fn test_parse_output_line_must_start_with_hashing() {
        assert_eq!(parse_output("rehashing x took 1.0s"), None);
        assert_eq!(parse_output("  hashing x took 1.0s"), None);
    }

    #[test]
    fn test_parse_output_integer_and_crlf() {
        assert_eq!(parse_output("hashing 1204 files took 3s\r\n"), Some(3.0));
        assert_eq!(parse_output("hashing x took .5s"), Some(0.5));
    }

    #[test]
    fn test_parse_output_tolerates_trailing_text() {
        assert_eq!(
            parse_output("hashing all files took 0.75s (12 MB/s)"),
            Some(0.75)
        );
    }

    #[test]
    fn test_parse_artifact_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p_a_1");
        std::fs::write(&path, b"\xff\xfe garbage\nhashing x took 4.0s\n").unwrap();
        assert_eq!(parse_artifact(&path), Some(4.0));
    }

    #[test]
    fn test_parse_artifact_missing_file() {
        assert_eq!(parse_artifact(Path::new("/nonexistent/p_a_1")), None);
    }

    #[test]
    fn test_scan_directory_groups_samples() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "proj_a_1", "hashing x took 1.0s\n");
        write(dir.path(), "proj_a_2", "hashing x took 3.0s\n");
        write(dir.path(), "proj_r64_1", "hashing x took 0.5s\n");

        let results = scan_directory(dir.path()).unwrap();
        assert_eq!(results.corpora().collect::<Vec<_>>(), vec!["proj"]);
        let a = results.runs("proj", "a").unwrap();
        assert_eq!(a.get(&1), Some(&1.0));
        assert_eq!(a.get(&2), Some(&3.0));
        assert_eq!(results.samples("proj", "r64"), vec![0.5]);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_scan_directory_skips_foreign_and_empty() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "proj_a_1", "hashing x took 1.0s\n");
        write(dir.path(), "proj_a_2", "Segmentation fault\n");
        write(dir.path(), "summary_stats.json", "{}");
        write(dir.path(), "notes.txt", "hashing x took 1.0s\n");
        std::fs::create_dir(dir.path().join("nested_a_3")).unwrap();

        let results = scan_directory(dir.path()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results.samples("proj", "a"), vec![1.0]);
    }

    #[test]
    fn test_scan_directory_empty_group_is_absent() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "proj_c_1", "crashed\n");

        let results = scan_directory(dir.path()).unwrap();
        assert!(results.is_empty());
        assert!(results.runs("proj", "c").is_none());
    }

    #[test]
    fn test_scan_directory_is_idempotent() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "p_f_1", "hashing x took 1.0s\n");
        write(dir.path(), "p_f64_7", "hashing x took 0.1s\n");

        let first = scan_directory(dir.path()).unwrap();
        let second = scan_directory(dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        assert!(scan_directory(Path::new("/nonexistent/results")).is_err());
    }

    #[test]
    fn test_iter_visits_every_sample() {
        let mut results = ResultSet::new();
        results.insert(ArtifactId::parse("b_a_1").unwrap(), 2.0);
        results.insert(ArtifactId::parse("a_a64_2").unwrap(), 1.0);

        let all: Vec<_> = results.iter().collect();
        assert_eq!(all, vec![("a", "a64", 2, 1.0), ("b", "a", 1, 2.0)]);
    }

    #[test]
    fn test_repetitions_in_numeric_order() {
        let mut results = ResultSet::new();
        for (name, secs) in [("p_a_10", 10.0), ("p_a_2", 2.0), ("p_a_1", 1.0)] {
            results.insert(ArtifactId::parse(name).unwrap(), secs);
        }

        let reps: Vec<u32> = results.iter().map(|(_, _, rep, _)| rep).collect();
        assert_eq!(reps, vec![1, 2, 10]);
        assert_eq!(results.samples("p", "a"), vec![1.0, 2.0, 10.0]);
    }
}
