//! Supervised risk tiering.
//!
//! Training examples are synthesized from the `driver_profile` tag: each
//! profile partition is cut into fixed-size chunks and every chunk becomes one
//! labelled feature vector. The fitted scaler and forest live in an immutable
//! [`RiskModel`] that prediction borrows; nothing is cached globally.

mod forest;
mod scaler;
mod tree;
mod verdict;

pub use forest::{ForestParams, RandomForest};
pub use scaler::StandardScaler;
pub use tree::DecisionTree;
pub use verdict::{RiskLevel, RiskVerdict, RiskVerdictView, UnknownReason};

use super::features::{FeatureVector, FEATURE_COUNT};
use super::records::{DriverProfile, DrivingRecord};
use super::score::round_one_decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub chunk_size: usize,
    pub min_chunk_records: usize,
    pub min_training_samples: usize,
    pub min_batch_records: usize,
    pub forest: ForestParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 20,
            min_chunk_records: 10,
            min_training_samples: 10,
            min_batch_records: 10,
            forest: ForestParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainingOutcome {
    Trained(RiskModel),
    Skipped { samples: usize },
}

/// Fitted scaler and forest. Immutable once trained.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskModel {
    scaler: StandardScaler,
    forest: RandomForest,
    training_samples: usize,
    min_batch_records: usize,
}

impl RiskModel {
    pub fn train(dataset: &[DrivingRecord], config: &TrainingConfig) -> TrainingOutcome {
        let (rows, labels) = training_examples(dataset, config);

        if rows.len() < config.min_training_samples {
            warn!(
                samples = rows.len(),
                required = config.min_training_samples,
                "not enough labelled chunks to train the risk model"
            );
            return TrainingOutcome::Skipped {
                samples: rows.len(),
            };
        }

        let Some(scaler) = StandardScaler::fit(&rows) else {
            return TrainingOutcome::Skipped { samples: 0 };
        };
        let scaled: Vec<[f64; FEATURE_COUNT]> =
            rows.iter().map(|row| scaler.transform(row)).collect();
        let forest = RandomForest::fit(&scaled, &labels, &config.forest);

        info!(
            samples = rows.len(),
            risky = labels.iter().filter(|label| **label == 1).count(),
            trees = forest.tree_count(),
            "risk model trained"
        );

        TrainingOutcome::Trained(Self {
            scaler,
            forest,
            training_samples: rows.len(),
            min_batch_records: config.min_batch_records,
        })
    }

    pub fn predict(&self, records: &[DrivingRecord]) -> RiskVerdict {
        let insufficient = RiskVerdict::Unknown(UnknownReason::InsufficientData {
            records: records.len(),
            required: self.min_batch_records,
        });
        if records.len() < self.min_batch_records {
            return insufficient;
        }
        let Some(features) = FeatureVector::from_batch(records) else {
            return insufficient;
        };

        let scaled = self.scaler.transform(&features.to_array());
        let (class, probability) = self.forest.predict(&scaled);

        RiskVerdict::Assessed {
            high_risk: class == 1,
            confidence: round_one_decimal(probability * 100.0),
        }
    }

    pub fn training_samples(&self) -> usize {
        self.training_samples
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }
}

/// Optional model handle shared by every prediction caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskPredictor {
    model: Option<RiskModel>,
}

impl RiskPredictor {
    pub fn untrained() -> Self {
        Self { model: None }
    }

    pub fn train(dataset: &[DrivingRecord], config: &TrainingConfig) -> Self {
        match RiskModel::train(dataset, config) {
            TrainingOutcome::Trained(model) => Self { model: Some(model) },
            TrainingOutcome::Skipped { .. } => Self::untrained(),
        }
    }

    pub fn from_model(model: RiskModel) -> Self {
        Self { model: Some(model) }
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&RiskModel> {
        self.model.as_ref()
    }

    pub fn predict(&self, records: &[DrivingRecord]) -> RiskVerdict {
        match &self.model {
            Some(model) => model.predict(records),
            None => RiskVerdict::Unknown(UnknownReason::Untrained),
        }
    }
}

/// Chunks each profile partition into labelled feature rows. Records without a
/// profile tag are ignored; partitions are visited in order of first appearance.
pub(crate) fn training_examples(
    dataset: &[DrivingRecord],
    config: &TrainingConfig,
) -> (Vec<[f64; FEATURE_COUNT]>, Vec<usize>) {
    let mut profiles: Vec<DriverProfile> = Vec::new();
    for profile in dataset.iter().filter_map(|record| record.driver_profile) {
        if !profiles.contains(&profile) {
            profiles.push(profile);
        }
    }

    let chunk_size = config.chunk_size.max(1);
    let mut rows = Vec::new();
    let mut labels = Vec::new();

    for profile in profiles {
        let partition: Vec<&DrivingRecord> = dataset
            .iter()
            .filter(|record| record.driver_profile == Some(profile))
            .collect();

        for chunk in partition.chunks(chunk_size) {
            if chunk.len() < config.min_chunk_records {
                continue;
            }
            if let Some(features) = FeatureVector::from_records(chunk.iter().copied()) {
                rows.push(features.to_array());
                labels.push(usize::from(profile == DriverProfile::Risky));
            }
        }
    }

    (rows, labels)
}
