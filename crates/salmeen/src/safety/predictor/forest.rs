use super::tree::{DecisionTree, TreeParams, CLASS_COUNT};
use crate::safety::features::FEATURE_COUNT;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub trees: usize,
    pub max_depth: usize,
    pub seed: u64,
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 10,
            seed: 42,
            min_samples_split: 2,
        }
    }
}

/// Bagged ensemble of CART trees. Class probabilities are the mean of the
/// per-tree leaf distributions.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(rows: &[[f64; FEATURE_COUNT]], labels: &[usize], params: &ForestParams) -> Self {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split.max(2),
            max_features: ((FEATURE_COUNT as f64).sqrt() as usize).max(1),
        };

        let count = rows.len();
        if count == 0 {
            return Self { trees: Vec::new() };
        }

        let trees = (0..params.trees)
            .map(|_| {
                let bootstrap: Vec<usize> =
                    (0..count).map(|_| rng.gen_range(0..count)).collect();
                DecisionTree::fit(rows, labels, bootstrap, tree_params, &mut rng)
            })
            .collect();

        Self { trees }
    }

    pub fn predict_proba(&self, row: &[f64; FEATURE_COUNT]) -> [f64; CLASS_COUNT] {
        let mut proba = [0.0; CLASS_COUNT];
        if self.trees.is_empty() {
            return proba;
        }

        for tree in &self.trees {
            for (total, value) in proba.iter_mut().zip(tree.predict_proba(row)) {
                *total += value;
            }
        }
        let count = self.trees.len() as f64;
        for value in &mut proba {
            *value /= count;
        }
        proba
    }

    /// Most probable class with its probability; ties resolve to the lower class.
    pub fn predict(&self, row: &[f64; FEATURE_COUNT]) -> (usize, f64) {
        let proba = self.predict_proba(row);
        let mut class = 0;
        for candidate in 1..CLASS_COUNT {
            if proba[candidate] > proba[class] {
                class = candidate;
            }
        }
        (class, proba[class])
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn max_tree_depth(&self) -> usize {
        self.trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
    }
}
