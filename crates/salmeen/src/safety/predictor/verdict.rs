use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Safe,
    Unknown,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High Risk",
            Self::Safe => "Safe",
            Self::Unknown => "Unknown",
        }
    }
}

/// Why the predictor declined to classify a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownReason {
    Untrained,
    InsufficientData { records: usize, required: usize },
}

impl UnknownReason {
    pub fn summary(&self) -> String {
        match self {
            UnknownReason::Untrained => "risk model has not been trained".to_string(),
            UnknownReason::InsufficientData { records, required } => {
                format!("{records} record(s) supplied, at least {required} required")
            }
        }
    }
}

/// Predictor output. Callers must handle `Unknown` before trusting the level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiskVerdict {
    Assessed { high_risk: bool, confidence: f64 },
    Unknown(UnknownReason),
}

impl RiskVerdict {
    pub fn risk_level(&self) -> RiskLevel {
        match self {
            RiskVerdict::Assessed {
                high_risk: true, ..
            } => RiskLevel::High,
            RiskVerdict::Assessed { .. } => RiskLevel::Safe,
            RiskVerdict::Unknown(_) => RiskLevel::Unknown,
        }
    }

    /// Percentage in [0, 100]; 0 when unknown.
    pub fn confidence(&self) -> f64 {
        match self {
            RiskVerdict::Assessed { confidence, .. } => *confidence,
            RiskVerdict::Unknown(_) => 0.0,
        }
    }

    pub fn is_high_risk(&self) -> bool {
        matches!(
            self,
            RiskVerdict::Assessed {
                high_risk: true,
                ..
            }
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, RiskVerdict::Unknown(_))
    }

    pub fn view(&self) -> RiskVerdictView {
        let level = self.risk_level();
        RiskVerdictView {
            risk_level: level,
            risk_level_label: level.label(),
            confidence: self.confidence(),
            is_high_risk: self.is_high_risk(),
            reason: match self {
                RiskVerdict::Unknown(reason) => Some(reason.summary()),
                RiskVerdict::Assessed { .. } => None,
            },
        }
    }
}

impl Serialize for RiskVerdict {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.view().serialize(serializer)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskVerdictView {
    pub risk_level: RiskLevel,
    pub risk_level_label: &'static str,
    pub confidence: f64,
    pub is_high_risk: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
