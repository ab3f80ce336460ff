//! Weighted similarity engine.

use std::collections::BTreeMap;

use marcsim_core::{AppConfig, Record};
use rayon::prelude::*;
use serde::Serialize;

use crate::checkers::{CheckOutcome, CheckerKind, Verdict};
use crate::error::Result;
use crate::strategy::{Strategy, StrategyEntry};

/// One checker's contribution to a comparison.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    #[serde(rename = "name")]
    pub checker: CheckerKind,
    pub weight: f64,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
}

impl CheckResult {
    pub fn verdict(&self) -> Verdict {
        self.outcome.verdict
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub results: Vec<CheckResult>,
    /// Weighted mean of the evidence, `-1` when vetoed, `None` when every
    /// checker skipped.
    pub similarity: Option<f64>,
}

impl Comparison {
    fn from_results(results: Vec<CheckResult>) -> Self {
        let similarity = aggregate(&results);
        Self {
            results,
            similarity,
        }
    }

    /// Checker name to similarity, for feeding a classifier.
    pub fn feature_vector(&self) -> BTreeMap<&'static str, Option<f64>> {
        self.results
            .iter()
            .map(|r| (r.checker.name(), r.verdict().similarity()))
            .collect()
    }

    pub fn is_vetoed(&self) -> bool {
        self.results.iter().any(|r| r.verdict().is_veto())
    }
}

/// Combine checker verdicts: any veto wins, otherwise the weighted mean of
/// the evidence.
pub fn aggregate(results: &[CheckResult]) -> Option<f64> {
    if results.iter().any(|r| r.verdict().is_veto()) {
        return Some(-1.0);
    }

    let (weighted, total_weight) = results
        .iter()
        .filter_map(|r| match r.verdict() {
            Verdict::Evidence(score) => Some((score * r.weight, r.weight)),
            Verdict::Skip | Verdict::Veto => None,
        })
        .fold((0.0, 0.0), |(sum, weights), (score, weight)| (sum + score, weights + weight));

    (total_weight > 0.0).then(|| weighted / total_weight)
}

/// Runs a strategy over record pairs. Holds no per-comparison state and can
/// be shared between threads.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    strategy: Strategy,
    parallel: bool,
}

impl SimilarityEngine {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            parallel: false,
        }
    }

    /// Run the checkers of one comparison on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Strategy from the config: the inline `[[strategy]]` list, else the
    /// strategy file, else the built-in default.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let strategy = if !config.strategy.is_empty() {
            Strategy::resolve(&config.strategy)?
        } else if let Some(path) = &config.engine.strategy_file {
            Strategy::load(path)?
        } else {
            Strategy::builtin()?
        };
        Ok(Self::new(strategy).with_parallel(config.engine.parallel_checkers))
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Run every checker of the strategy on the pair. Errors are fatal for
    /// the whole comparison.
    pub fn compare_records(&self, record1: &Record, record2: &Record) -> Result<Comparison> {
        let run = |entry: &StrategyEntry| run_checker(entry, record1, record2);

        let results = if self.parallel {
            self.strategy
                .entries()
                .par_iter()
                .map(run)
                .collect::<Result<Vec<_>>>()?
        } else {
            self.strategy
                .entries()
                .iter()
                .map(run)
                .collect::<Result<Vec<_>>>()?
        };

        Ok(Comparison::from_results(results))
    }
}

fn run_checker(entry: &StrategyEntry, record1: &Record, record2: &Record) -> Result<CheckResult> {
    let outcome = entry.checker.check(record1, record2)?;
    tracing::debug!(
        checker = entry.checker.name(),
        similarity = ?outcome.verdict.similarity(),
        "checker done"
    );
    Ok(CheckResult {
        checker: entry.checker,
        weight: entry.weight,
        outcome,
    })
}
