//! Descriptive statistics per corpus and strategy

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::parser::{ResultSet, Sample};

#[derive(Error, Debug, PartialEq)]
pub enum StatsError {
    #[error("cannot compute statistics over an empty sample")]
    EmptySample,
}

/// Summary of one (corpus, strategy) group, in seconds
///
/// Serialized field names match the statistics files written by earlier
/// versions of the summary tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two samples
    #[serde(rename = "std")]
    pub std_dev: Option<f64>,
    pub median: f64,
    #[serde(rename = "amin")]
    pub min: f64,
    #[serde(rename = "amax")]
    pub max: f64,
}

/// Corpus → strategy → statistics
pub type StatisticsTable = BTreeMap<String, BTreeMap<String, Statistics>>;

impl Statistics {
    pub fn from_samples(samples: &[Sample]) -> Result<Self, StatsError> {
        if samples.is_empty() {
            return Err(StatsError::EmptySample);
        }

        let count = samples.len();
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std_dev = (count > 1).then(|| {
            let sum_sq: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (count - 1) as f64).sqrt()
        });

        Ok(Self {
            count,
            mean,
            std_dev,
            median: percentile(&sorted, 50.0),
            min: sorted[0],
            max: sorted[count - 1],
        })
    }
}

/// Linear-interpolated percentile of already sorted, non-empty data
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let index = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = index - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Statistics for every group holding at least one sample
///
/// Groups without samples are left out rather than reported as zero.
pub fn compute_statistics(results: &ResultSet) -> StatisticsTable {
    let mut table = StatisticsTable::new();

    for corpus in results.corpora() {
        for (strategy, runs) in results.strategies(corpus) {
            let samples: Vec<Sample> = runs.values().copied().collect();
            match Statistics::from_samples(&samples) {
                Ok(stats) => {
                    table
                        .entry(corpus.to_string())
                        .or_default()
                        .insert(strategy.to_string(), stats);
                }
                Err(e) => tracing::debug!("Skipping {}/{}: {}", corpus, strategy, e),
            }
        }
    }

    table
}
