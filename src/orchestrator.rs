//! Benchmark sweep over corpora × strategies × repetitions
//!
//! Runs are strictly sequential. Each timed run must own the disk and the
//! CPU, and its cache flush happens immediately before it with nothing in
//! between.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::artifact::Corpus;
use crate::cache::CacheFlush;
use crate::error::BenchError;
use crate::executor::BenchmarkTarget;
use crate::strategy::Strategy;

/// A validated benchmark sweep
#[derive(Debug, Clone)]
pub struct BenchmarkPlan {
    corpora: Vec<Corpus>,
    strategies: Vec<Strategy>,
    repetitions: u32,
    out_dir: PathBuf,
}

impl BenchmarkPlan {
    /// Validate a sweep before anything is executed
    ///
    /// Rejects an empty strategy list, a zero repetition count and distinct
    /// corpora whose artifacts would share a name prefix.
    pub fn new(
        corpora: Vec<Corpus>,
        strategies: Vec<Strategy>,
        repetitions: u32,
        out_dir: impl Into<PathBuf>,
    ) -> Result<Self, BenchError> {
        if strategies.is_empty() {
            return Err(BenchError::NoStrategy);
        }

        if repetitions == 0 {
            return Err(BenchError::InvalidConfig(
                "repetition count must be a positive integer".to_string(),
            ));
        }

        for (i, first) in corpora.iter().enumerate() {
            if let Some(second) = corpora[i + 1..]
                .iter()
                .find(|c| c.slug() == first.slug() && c.name() != first.name())
            {
                return Err(BenchError::SlugCollision {
                    first: first.name().to_string(),
                    second: second.name().to_string(),
                    slug: first.slug().to_string(),
                });
            }
        }

        Ok(Self {
            corpora,
            strategies,
            repetitions,
            out_dir: out_dir.into(),
        })
    }

    pub fn corpora(&self) -> &[Corpus] {
        &self.corpora
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Number of timed runs the sweep performs
    pub fn total_runs(&self) -> usize {
        self.corpora.len() * self.strategies.len() * self.repetitions as usize
    }
}

/// Drives the cache flusher and the benchmarked target through a plan
#[derive(Debug)]
pub struct Orchestrator<C, T> {
    cache: C,
    target: T,
}

impl<C: CacheFlush, T: BenchmarkTarget> Orchestrator<C, T> {
    pub fn new(cache: C, target: T) -> Self {
        Self { cache, target }
    }

    /// Execute every run of `plan`, writing progress markers to `progress`
    ///
    /// Any cache flush failure aborts the sweep. Returns the artifact paths
    /// in execution order.
    pub fn run_all(
        &mut self,
        plan: &BenchmarkPlan,
        progress: &mut dyn Write,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(plan.out_dir()).with_context(|| {
            format!(
                "Failed to create output directory {}",
                plan.out_dir().display()
            )
        })?;

        self.cache.preflight()?;

        tracing::info!(
            corpora = plan.corpora().len(),
            strategies = plan.strategies().len(),
            repetitions = plan.repetitions(),
            "starting benchmark sweep"
        );

        // Priming only touches filesystem metadata, which a cache flush keeps
        for corpus in plan.corpora() {
            writeln!(progress, "priming {}", corpus.name())?;
            self.target
                .prime(corpus)
                .with_context(|| format!("Failed to prime {}", corpus.name()))?;
        }

        let mut artifacts = Vec::with_capacity(plan.total_runs());
        for corpus in plan.corpora() {
            writeln!(progress, "processing {}", corpus.name())?;
            for &strategy in plan.strategies() {
                writeln!(progress, "strategy: {}", strategy)?;
                for repetition in 1..=plan.repetitions() {
                    self.cache.clear()?;
                    let artifact =
                        self.target
                            .run(corpus, strategy, repetition, plan.out_dir())?;
                    artifacts.push(artifact);

                    write!(progress, ".")?;
                    progress.flush()?;
                }
                writeln!(progress)?;
            }
        }

        tracing::info!(runs = artifacts.len(), "benchmark sweep finished");
        Ok(artifacts)
    }
}
