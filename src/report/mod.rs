//! Report generation for a folder of run artifacts
//!
//! Writes `<base>_runs.svg`, `<base>_box.svg`, `<base>_stats.json` and
//! `<base>_samples.csv` next to the artifacts, then prints the ranking.
//! None of these names can be mistaken for an artifact on the next scan.

mod ranking;
mod svg;

pub use ranking::{rank, write_rankings, CorpusRanking, Ranking};
pub use svg::{box_svg, scatter_svg, BoxSummary};

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::aggregate::StatisticsTable;
use crate::parser::ResultSet;
use crate::strategy::is_truncated_id;

/// Split labelled items into (truncated, full file), keeping their order
pub fn split_by_truncation<'a, T>(
    items: impl IntoIterator<Item = (&'a str, T)>,
) -> (Vec<(&'a str, T)>, Vec<(&'a str, T)>) {
    items
        .into_iter()
        .partition(|(strategy, _)| is_truncated_id(strategy))
}

/// Files written by [`render`]
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPaths {
    pub runs: PathBuf,
    pub boxes: PathBuf,
    pub stats: PathBuf,
    pub samples: PathBuf,
}

impl ReportPaths {
    pub fn new(dir: &Path, base: &str) -> Self {
        Self {
            runs: dir.join(format!("{base}_runs.svg")),
            boxes: dir.join(format!("{base}_box.svg")),
            stats: dir.join(format!("{base}_stats.json")),
            samples: dir.join(format!("{base}_samples.csv")),
        }
    }
}

/// Statistics as JSON, indented by four spaces
pub fn stats_json(stats: &StatisticsTable) -> Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    stats
        .serialize(&mut ser)
        .context("Failed to serialize statistics")?;
    String::from_utf8(buf).context("Statistics JSON is not UTF-8")
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Raw samples, one row per run
pub fn samples_csv(results: &ResultSet) -> String {
    let mut out = String::from("corpus,strategy,run,seconds\n");
    for (corpus, strategy, run, secs) in results.iter() {
        out.push_str(&format!(
            "{},{},{},{}\n",
            escape_csv_field(corpus),
            escape_csv_field(strategy),
            run,
            secs
        ));
    }
    out
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write every report file into `out_dir` and print the ranking to `console`
pub fn render(
    results: &ResultSet,
    stats: &StatisticsTable,
    out_dir: &Path,
    base: &str,
    console: &mut dyn Write,
) -> Result<ReportPaths> {
    let paths = ReportPaths::new(out_dir, base);

    if results.is_empty() {
        tracing::warn!("No samples found in {}", out_dir.display());
    }

    write_file(&paths.runs, &scatter_svg(results))?;
    write_file(&paths.boxes, &box_svg(results))?;
    write_file(&paths.stats, &stats_json(stats)?)?;
    write_file(&paths.samples, &samples_csv(results))?;
    tracing::info!(stats = %paths.stats.display(), "report written");

    write_rankings(console, &rank(stats)).context("Failed to print ranking")?;
    Ok(paths)
}
