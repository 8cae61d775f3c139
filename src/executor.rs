//! Invocation of the benchmarked file iterator
//!
//! The file iterator is a black box: it takes a strategy flag and a folder,
//! and reports `hashing <...> took <seconds>s` somewhere in its output.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::artifact::{ArtifactId, Corpus};
use crate::error::BenchError;
use crate::strategy::Strategy;

/// Flag for the untimed pass that warms filesystem metadata
pub const PRIME_FLAG: &str = "-f";

/// Something that can be benchmarked against a corpus
pub trait BenchmarkTarget {
    /// Untimed pass over `corpus`, output discarded
    fn prime(&mut self, corpus: &Corpus) -> Result<()>;

    /// One timed run, output captured to its artifact file
    fn run(
        &mut self,
        corpus: &Corpus,
        strategy: Strategy,
        repetition: u32,
        out_dir: &Path,
    ) -> Result<PathBuf>;
}

/// The external file iterator executable
#[derive(Debug, Clone)]
pub struct FileIterator {
    exe: PathBuf,
}

impl FileIterator {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    fn spawn_error(&self, source: std::io::Error) -> BenchError {
        BenchError::Spawn {
            program: self.exe.display().to_string(),
            source,
        }
    }
}

impl BenchmarkTarget for FileIterator {
    fn prime(&mut self, corpus: &Corpus) -> Result<()> {
        tracing::debug!(exe = %self.exe.display(), corpus = corpus.name(), "priming");

        let status = Command::new(&self.exe)
            .arg(PRIME_FLAG)
            .arg(corpus.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.spawn_error(e))?;

        if !status.success() {
            tracing::warn!("priming {} exited with {}", corpus.name(), status);
        }
        Ok(())
    }

    fn run(
        &mut self,
        corpus: &Corpus,
        strategy: Strategy,
        repetition: u32,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        let artifact = ArtifactId::new(corpus, strategy, repetition).path_in(out_dir);
        let stdout = File::create(&artifact)
            .with_context(|| format!("Failed to create artifact {}", artifact.display()))?;
        // Both streams share one file description so their lines stay in order
        let stderr = stdout
            .try_clone()
            .context("Failed to duplicate artifact handle")?;

        tracing::info!(
            "{} {} {}",
            self.exe.display(),
            strategy.flag(),
            corpus.name()
        );

        let status = Command::new(&self.exe)
            .arg(strategy.flag())
            .arg(corpus.path())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .map_err(|e| self.spawn_error(e))?;

        if !status.success() {
            tracing::warn!(
                "{} exited with {}; {} will likely hold no sample",
                self.exe.display(),
                status,
                artifact.display()
            );
        }
        Ok(artifact)
    }
}

/// Resolve the file iterator: an explicit path must exist, otherwise the
/// first existing candidate wins
///
/// The result is absolute. `Command::new` looks bare names up on `PATH`, not
/// in the working directory where the candidate was found.
pub fn locate_executable(
    explicit: Option<&Path>,
    candidates: &[PathBuf],
) -> Result<PathBuf, BenchError> {
    if let Some(path) = explicit {
        return if path.is_file() {
            absolute(path)
        } else {
            Err(BenchError::ExecutableNotFound {
                searched: path.display().to_string(),
            })
        };
    }

    match candidates.iter().find(|p| p.is_file()) {
        Some(found) => absolute(found),
        None => Err(BenchError::ExecutableNotFound {
            searched: candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

fn absolute(path: &Path) -> Result<PathBuf, BenchError> {
    std::path::absolute(path).map_err(|e| {
        tracing::debug!("Cannot make {} absolute: {}", path.display(), e);
        BenchError::ExecutableNotFound {
            searched: path.display().to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_locate_first_existing_candidate() {
        let dir = TempDir::new().unwrap();
        let second = dir.path().join("second");
        let third = dir.path().join("third");
        std::fs::write(&second, b"").unwrap();
        std::fs::write(&third, b"").unwrap();

        let candidates = vec![dir.path().join("first"), second.clone(), third];
        assert_eq!(locate_executable(None, &candidates).unwrap(), second);
    }

    #[test]
    fn test_locate_relative_candidate_is_made_absolute() {
        // Tests run from the package root
        let found = locate_executable(None, &[PathBuf::from("Cargo.toml")]).unwrap();
        assert!(found.is_absolute());
        assert_eq!(found, std::env::current_dir().unwrap().join("Cargo.toml"));
    }

    #[test]
    fn test_locate_none_found() {
        let err = locate_executable(None, &[PathBuf::from("/nonexistent/iter")]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("/nonexistent/iter"));
    }

    #[test]
    fn test_locate_explicit_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("iter");
        assert!(locate_executable(Some(missing.as_path()), &[]).is_err());

        std::fs::write(&missing, b"").unwrap();
        assert_eq!(locate_executable(Some(missing.as_path()), &[]).unwrap(), missing);
    }

    #[cfg(unix)]
    fn script(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake_iter.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_both_streams() {
        let dir = TempDir::new().unwrap();
        let exe = script(
            dir.path(),
            "echo \"args $1 $2\"\necho oops >&2\necho \"hashing files took 0.25s\"",
        );
        let mut target = FileIterator::new(exe);

        let corpus = Corpus::new("some dir");
        let artifact = target
            .run(&corpus, Strategy::Random64, 2, dir.path())
            .unwrap();

        assert_eq!(artifact, dir.path().join("some_dir_r64_2"));
        let text = std::fs::read_to_string(&artifact).unwrap();
        assert_eq!(text, "args -r64 some dir\noops\nhashing files took 0.25s\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_overwrites_existing_artifact() {
        let dir = TempDir::new().unwrap();
        let exe = script(dir.path(), "echo fresh");
        let corpus = Corpus::new("proj");
        let existing = dir.path().join("proj_a_1");
        std::fs::write(&existing, "stale output that is much longer\n").unwrap();

        FileIterator::new(exe)
            .run(&corpus, Strategy::Alphabetic, 1, dir.path())
            .unwrap();
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "fresh\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_prime_passes_prime_flag() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("primed");
        let exe = script(dir.path(), &format!("echo \"$1 $2\" > {}", marker.display()));

        FileIterator::new(exe).prime(&Corpus::new("proj")).unwrap();
        assert_eq!(std::fs::read_to_string(&marker).unwrap(), "-f proj\n");
    }

    #[test]
    fn test_missing_exe_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let mut target = FileIterator::new(dir.path().join("missing"));
        let err = target.prime(&Corpus::new("proj")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BenchError>(),
            Some(BenchError::Spawn { .. })
        ));
    }
}
