use crate::safety::features::FEATURE_COUNT;
use rand::seq::SliceRandom;
use rand::Rng;

pub(crate) const CLASS_COUNT: usize = 2;

#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        proba: [f64; CLASS_COUNT],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// CART classifier over Gini impurity, stored as a flat node arena.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl DecisionTree {
    /// `samples` holds indices into `rows`; repeated indices act as bootstrap weights.
    pub(crate) fn fit<R: Rng>(
        rows: &[[f64; FEATURE_COUNT]],
        labels: &[usize],
        samples: Vec<usize>,
        params: TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut builder = TreeBuilder {
            rows,
            labels,
            params,
            nodes: Vec::new(),
        };
        builder.build(samples, 0, rng);
        Self {
            nodes: builder.nodes,
        }
    }

    pub fn predict_proba(&self, row: &[f64; FEATURE_COUNT]) -> [f64; CLASS_COUNT] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { proba } => return *proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        walk(&self.nodes, 0)
    }
}

struct TreeBuilder<'a> {
    rows: &'a [[f64; FEATURE_COUNT]],
    labels: &'a [usize],
    params: TreeParams,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn build<R: Rng>(&mut self, samples: Vec<usize>, depth: usize, rng: &mut R) -> usize {
        let counts = self.class_counts(&samples);
        let pure = counts.iter().filter(|count| **count > 0).count() <= 1;

        if depth >= self.params.max_depth || samples.len() < self.params.min_samples_split || pure
        {
            return self.push_leaf(&counts, samples.len());
        }

        let Some(split) = self.best_split(&samples, rng) else {
            return self.push_leaf(&counts, samples.len());
        };

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&sample| self.rows[sample][split.feature] <= split.threshold);

        let index = self.nodes.len();
        // placeholder until both children exist
        self.nodes.push(Node::Leaf {
            proba: [0.0; CLASS_COUNT],
        });
        let left = self.build(left_samples, depth + 1, rng);
        let right = self.build(right_samples, depth + 1, rng);
        self.nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    fn push_leaf(&mut self, counts: &[usize; CLASS_COUNT], total: usize) -> usize {
        let mut proba = [0.0; CLASS_COUNT];
        if total > 0 {
            for (probability, count) in proba.iter_mut().zip(counts) {
                *probability = *count as f64 / total as f64;
            }
        }
        self.nodes.push(Node::Leaf { proba });
        self.nodes.len() - 1
    }

    fn class_counts(&self, samples: &[usize]) -> [usize; CLASS_COUNT] {
        let mut counts = [0; CLASS_COUNT];
        for &sample in samples {
            counts[self.labels[sample]] += 1;
        }
        counts
    }

    /// Draws features in random order and evaluates `max_features` of the
    /// non-constant ones, continuing past that budget until a valid split exists.
    fn best_split<R: Rng>(&self, samples: &[usize], rng: &mut R) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
        features.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        let mut evaluated = 0;
        let mut ordered = samples.to_vec();

        for feature in features {
            if evaluated >= self.params.max_features && best.is_some() {
                break;
            }

            ordered.sort_by(|a, b| self.rows[*a][feature].total_cmp(&self.rows[*b][feature]));
            let first = self.rows[ordered[0]][feature];
            let last = self.rows[ordered[ordered.len() - 1]][feature];
            if last <= first {
                continue;
            }
            evaluated += 1;

            if let Some(candidate) = self.scan_feature(&ordered, feature) {
                let better = best
                    .as_ref()
                    .map(|current| candidate.impurity < current.impurity)
                    .unwrap_or(true);
                if better {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    fn scan_feature(&self, ordered: &[usize], feature: usize) -> Option<SplitCandidate> {
        let total = ordered.len();
        let total_counts = self.class_counts(ordered);
        let mut left_counts = [0usize; CLASS_COUNT];
        let mut best: Option<SplitCandidate> = None;

        for position in 0..total - 1 {
            let sample = ordered[position];
            left_counts[self.labels[sample]] += 1;

            let current = self.rows[sample][feature];
            let next = self.rows[ordered[position + 1]][feature];
            if next <= current {
                continue;
            }

            let left_total = position + 1;
            let right_total = total - left_total;
            let mut right_counts = [0usize; CLASS_COUNT];
            for class in 0..CLASS_COUNT {
                right_counts[class] = total_counts[class] - left_counts[class];
            }

            let impurity = (left_total as f64 * gini(&left_counts, left_total)
                + right_total as f64 * gini(&right_counts, right_total))
                / total as f64;

            if best
                .as_ref()
                .map(|current| impurity < current.impurity)
                .unwrap_or(true)
            {
                let mut threshold = (current + next) / 2.0;
                if threshold >= next {
                    threshold = current;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }

        best
    }
}

fn gini(counts: &[usize; CLASS_COUNT], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|count| {
            let share = *count as f64 / total;
            share * share
        })
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn row(first: f64, second: f64) -> [f64; FEATURE_COUNT] {
        [first, second, 0.0, 0.0, 0.0, 0.0, 0.0]
    }

    fn params(max_depth: usize) -> TreeParams {
        TreeParams {
            max_depth,
            min_samples_split: 2,
            max_features: FEATURE_COUNT,
        }
    }

    #[test]
    fn separates_linearly_separable_classes() {
        let rows = vec![row(-2.0, 0.3), row(-1.0, 0.1), row(1.0, 0.2), row(2.0, 0.4)];
        let labels = vec![0, 0, 1, 1];
        let mut rng = StdRng::seed_from_u64(7);

        let tree = DecisionTree::fit(&rows, &labels, vec![0, 1, 2, 3], params(10), &mut rng);

        assert_eq!(tree.predict_proba(&row(-1.5, 0.0)), [1.0, 0.0]);
        assert_eq!(tree.predict_proba(&row(1.5, 0.0)), [0.0, 1.0]);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn depth_limit_produces_mixed_leaves() {
        let rows = vec![row(0.0, 0.0), row(1.0, 0.0), row(2.0, 0.0), row(3.0, 0.0)];
        let labels = vec![0, 1, 0, 1];
        let mut rng = StdRng::seed_from_u64(7);

        let tree = DecisionTree::fit(&rows, &labels, vec![0, 1, 2, 3], params(0), &mut rng);

        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_proba(&row(0.0, 0.0)), [0.5, 0.5]);
    }

    #[test]
    fn constant_features_become_a_leaf() {
        let rows = vec![row(1.0, 1.0), row(1.0, 1.0)];
        let labels = vec![0, 1];
        let mut rng = StdRng::seed_from_u64(7);

        let tree = DecisionTree::fit(&rows, &labels, vec![0, 1], params(10), &mut rng);

        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_proba(&row(1.0, 1.0)), [0.5, 0.5]);
    }
}
