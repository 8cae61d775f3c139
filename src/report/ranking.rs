//! Console ranking of strategies by mean duration

use std::io::{self, Write};

use crate::aggregate::StatisticsTable;
use crate::report::split_by_truncation;

/// Strategies of one group, fastest first
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    entries: Vec<(String, f64)>,
}

impl Ranking {
    /// Sort `(strategy, mean)` pairs by mean
    ///
    /// The sort is stable, so equal means keep their incoming order.
    pub fn new(mut entries: Vec<(String, f64)>) -> Self {
        entries.sort_by(|a, b| a.1.total_cmp(&b.1));
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fastest(&self) -> Option<(&str, f64)> {
        self.entries.first().map(|(s, m)| (s.as_str(), *m))
    }

    /// Every other strategy with its slowdown relative to the fastest
    pub fn slowdowns(&self) -> impl Iterator<Item = (&str, f64, f64)> {
        let base = self.fastest().map_or(f64::NAN, |(_, mean)| mean);
        self.entries
            .iter()
            .skip(1)
            .map(move |(s, mean)| (s.as_str(), *mean, mean / base))
    }

    pub fn write_to(&self, w: &mut dyn Write) -> io::Result<()> {
        let Some((strategy, mean)) = self.fastest() else {
            return Ok(());
        };
        writeln!(w, "fastest: {}, {:.2}s", strategy, mean)?;
        for (strategy, mean, factor) in self.slowdowns() {
            writeln!(w, "{}: {:.2}s, {:.2}x slower", strategy, mean, factor)?;
        }
        Ok(())
    }
}

/// Truncated and full-file rankings of one corpus
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusRanking {
    pub corpus: String,
    pub truncated: Ranking,
    pub full: Ranking,
}

pub fn rank(stats: &StatisticsTable) -> Vec<CorpusRanking> {
    stats
        .iter()
        .map(|(corpus, groups)| {
            let (truncated, full) = split_by_truncation(
                groups
                    .iter()
                    .map(|(strategy, s)| (strategy.as_str(), s.mean)),
            );
            let owned = |group: Vec<(&str, f64)>| {
                Ranking::new(group.into_iter().map(|(s, m)| (s.to_string(), m)).collect())
            };
            CorpusRanking {
                corpus: corpus.clone(),
                truncated: owned(truncated),
                full: owned(full),
            }
        })
        .collect()
}

/// Print every corpus ranking, corpora separated by a blank line
pub fn write_rankings(w: &mut dyn Write, rankings: &[CorpusRanking]) -> io::Result<()> {
    for ranking in rankings {
        writeln!(w, "{}:", ranking.corpus)?;
        ranking.truncated.write_to(w)?;
        ranking.full.write_to(w)?;
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::compute_statistics;
    use crate::artifact::ArtifactId;
    use crate::parser::ResultSet;

    fn table(entries: &[(&str, f64)]) -> StatisticsTable {
        let mut results = ResultSet::new();
        for (name, secs) in entries {
            results.insert(ArtifactId::parse(name).unwrap(), *secs);
        }
        compute_statistics(&results)
    }

    fn render(stats: &StatisticsTable) -> String {
        let mut out: Vec<u8> = Vec::new();
        write_rankings(&mut out, &rank(stats)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_strategy_per_group() {
        let stats = table(&[("proj_a_1", 1.0), ("proj_a_2", 3.0), ("proj_r64_1", 0.5)]);
        assert_eq!(
            render(&stats),
            "proj:\nfastest: r64, 0.50s\nfastest: a, 2.00s\n\n"
        );
    }

    #[test]
    fn test_slowdown_factors() {
        let stats = table(&[
            ("p_a_1", 4.0),
            ("p_r_1", 2.0),
            ("p_c_1", 3.0),
            ("p_f64_1", 1.0),
        ]);
        assert_eq!(
            render(&stats),
            "p:\nfastest: f64, 1.00s\nfastest: r, 2.00s\nc: 3.00s, 1.50x slower\na: 4.00s, 2.00x slower\n\n"
        );
    }

    #[test]
    fn test_ties_keep_key_order() {
        let ranking = Ranking::new(vec![
            ("r".to_string(), 1.0),
            ("a".to_string(), 1.0),
            ("c".to_string(), 0.5),
        ]);
        let order: Vec<&str> = std::iter::once(ranking.fastest().unwrap().0)
            .chain(ranking.slowdowns().map(|(s, _, _)| s))
            .collect();
        assert_eq!(order, vec!["c", "r", "a"]);
    }

    #[test]
    fn test_empty_group_prints_nothing() {
        let ranking = Ranking::new(Vec::new());
        let mut out: Vec<u8> = Vec::new();
        ranking.write_to(&mut out).unwrap();
        assert!(out.is_empty());
        assert!(ranking.is_empty());
    }

    #[test]
    fn test_corpora_in_key_order() {
        let stats = table(&[("zeta_a_1", 1.0), ("alpha_a_1", 1.0)]);
        let rankings = rank(&stats);
        assert_eq!(rankings[0].corpus, "alpha");
        assert_eq!(rankings[1].corpus, "zeta");
    }
}
