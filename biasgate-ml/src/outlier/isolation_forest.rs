//! Isolation forest: outliers are the samples that random axis-aligned
//! partitioning separates from the rest in the fewest steps.
//!
//! Each tree is grown on a random subsample of at most `max_samples` rows by
//! repeatedly picking a feature and a uniform split value between that
//! feature's bounds in the node. A sample's anomaly score is
//! `2^(-E[h(x)] / c(ψ))`, where `h(x)` is the depth at which it lands (plus the
//! expected remaining depth of the leaf) and `c(ψ)` is the average path length
//! of an unsuccessful BST search over `ψ` samples. Scores close to 1 are
//! anomalous; scores well below 0.5 are normal.
//!
//! The decision cutoff is the `1 - contamination` quantile of the training
//! scores (linear interpolation). Samples scoring above the cutoff are
//! outliers. When the cutoff lands inside a block of tied scores that extends
//! past the quantile position, the whole block is labelled outlying; tied
//! samples always share one label.

use super::{OutlierDetector, OutlierLabel, validate_features};
use crate::error::MlError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Hyperparameters for [`IsolationForest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForestConfig {
    /// Number of isolation trees.
    pub n_estimators: usize,
    /// Upper bound on rows drawn (without replacement) to grow each tree.
    pub max_samples: usize,
    /// Expected fraction of outliers, in `(0, 0.5]`.
    pub contamination: f64,
    /// Seed for the tree-growing RNG.
    pub seed: u64,
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.1,
            seed: 42,
        }
    }
}

impl IsolationForestConfig {
    pub fn validate(&self) -> Result<(), MlError> {
        if self.n_estimators == 0 {
            return Err(MlError::config("n_estimators must be at least 1"));
        }
        if self.max_samples < 2 {
            return Err(MlError::config("max_samples must be at least 2"));
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(MlError::config(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }
        Ok(())
    }
}

/// Unfitted isolation forest. Every call to [`IsolationForest::fit`] grows a
/// fresh set of trees from the configured seed.
#[derive(Debug, Clone, Default)]
pub struct IsolationForest {
    config: IsolationForestConfig,
}

impl IsolationForest {
    pub fn new(config: IsolationForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IsolationForestConfig {
        &self.config
    }

    /// Grow the forest on `features` and derive the decision cutoff from the
    /// training scores.
    pub fn fit(&self, features: &[Vec<f64>]) -> Result<FittedForest, MlError> {
        self.config.validate()?;
        let width = validate_features(features)?;
        let n = features.len();
        if n < 2 {
            return Err(MlError::invalid_input(format!(
                "at least 2 samples are required to fit, got {}",
                n
            )));
        }

        let sample_size = self.config.max_samples.min(n);
        let height_limit = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let mut trees = Vec::with_capacity(self.config.n_estimators);
        for _ in 0..self.config.n_estimators {
            let indices: Vec<usize> = if sample_size == n {
                (0..n).collect()
            } else {
                rand::seq::index::sample(&mut rng, n, sample_size).into_vec()
            };
            trees.push(grow(features, indices, 0, height_limit, width, &mut rng));
        }

        let mut forest = FittedForest {
            trees,
            sample_size,
            cutoff: Cutoff::Above(f64::INFINITY),
        };
        let scores = forest.score_samples(features);
        forest.cutoff = Cutoff::from_scores(&scores, self.config.contamination);

        debug!(
            samples = n,
            sample_size,
            height_limit,
            trees = forest.trees.len(),
            cutoff = ?forest.cutoff,
            "Isolation forest fitted"
        );
        Ok(forest)
    }
}

impl OutlierDetector for IsolationForest {
    fn name(&self) -> &str {
        "isolation_forest"
    }

    fn fit_predict(&self, features: &[Vec<f64>]) -> Result<Vec<OutlierLabel>, MlError> {
        self.config.validate()?;
        if features.len() < 2 {
            validate_features(features)?;
            return Ok(vec![OutlierLabel::Inlier; features.len()]);
        }
        let forest = self.fit(features)?;
        Ok(forest.predict(features))
    }
}

/// Decision rule derived from the training score distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cutoff {
    Above(f64),
    AtOrAbove(f64),
}

impl Cutoff {
    fn from_scores(scores: &[f64], contamination: f64) -> Self {
        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let pos = (1.0 - contamination) * (sorted.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let threshold = sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo]);

        // Tie block straddling the quantile, and not simply the whole sample.
        let next = lo + 1;
        let straddles = next < sorted.len() && sorted[next] == threshold;
        if straddles && threshold > sorted[0] {
            Self::AtOrAbove(threshold)
        } else {
            Self::Above(threshold)
        }
    }

    fn is_outlier(self, score: f64) -> bool {
        match self {
            Self::Above(t) => score > t,
            Self::AtOrAbove(t) => score >= t,
        }
    }

    fn threshold(self) -> f64 {
        match self {
            Self::Above(t) | Self::AtOrAbove(t) => t,
        }
    }
}

/// A grown forest together with its decision cutoff.
#[derive(Debug, Clone)]
pub struct FittedForest {
    trees: Vec<Node>,
    sample_size: usize,
    cutoff: Cutoff,
}

impl FittedForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Score at or beyond which samples are labelled outliers.
    pub fn threshold(&self) -> f64 {
        self.cutoff.threshold()
    }

    /// Anomaly score in `(0, 1]` for each row; higher is more anomalous.
    pub fn score_samples(&self, features: &[Vec<f64>]) -> Vec<f64> {
        let normalizer = average_path_length(self.sample_size);
        features
            .iter()
            .map(|row| {
                let total: f64 = self.trees.iter().map(|t| t.path_length(row)).sum();
                let mean = total / self.trees.len() as f64;
                2f64.powf(-mean / normalizer)
            })
            .collect()
    }

    pub fn predict(&self, features: &[Vec<f64>]) -> Vec<OutlierLabel> {
        self.score_samples(features)
            .into_iter()
            .map(|score| {
                if self.cutoff.is_outlier(score) {
                    OutlierLabel::Outlier
                } else {
                    OutlierLabel::Inlier
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn path_length(&self, row: &[f64]) -> f64 {
        let mut node = self;
        let mut depth = 0.0;
        loop {
            match node {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    feature,
                    value,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *value { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

fn grow(
    features: &[Vec<f64>],
    indices: Vec<usize>,
    depth: usize,
    height_limit: usize,
    width: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= height_limit || indices.len() <= 1 {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let candidates: Vec<(usize, f64, f64)> = (0..width)
        .filter_map(|f| {
            let (lo, hi) = indices.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), &i| (lo.min(features[i][f]), hi.max(features[i][f])),
            );
            (lo < hi).then_some((f, lo, hi))
        })
        .collect();
    if candidates.is_empty() {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
    let value = split_value(lo, hi, rng);
    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| features[i][feature] <= value);

    Node::Split {
        feature,
        value,
        left: Box::new(grow(features, left, depth + 1, height_limit, width, rng)),
        right: Box::new(grow(features, right, depth + 1, height_limit, width, rng)),
    }
}

/// Uniform split point in `[lo, hi)`. Interpolates instead of sampling over
/// `hi - lo`, which overflows to infinity for finite bounds near `f64::MAX`.
fn split_value(lo: f64, hi: f64, rng: &mut StdRng) -> f64 {
    let u: f64 = rng.gen_range(0.0..1.0);
    let value = (lo * (1.0 - u) + hi * u).max(lo);
    if value < hi { value } else { lo }
}

/// Average path length of an unsuccessful search in a BST of `n` nodes.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}
