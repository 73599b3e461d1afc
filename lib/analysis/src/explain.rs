//! Explainability types for synergy estimates.
//!
//! Every number a caller sees ships with the drivers it came from. A record
//! may never leave the engine without these fields.

use serde::{Deserialize, Serialize};
use synergx_core::ProfileId;

/// Named contributors to a synergy estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriverKind {
    CrossSell,
    GeographyExpansion,
    OperationalOverlap,
    IntegrationRisk,
}

impl std::fmt::Display for DriverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DriverKind::CrossSell => "cross-sell",
            DriverKind::GeographyExpansion => "geography-expansion",
            DriverKind::OperationalOverlap => "operational-overlap",
            DriverKind::IntegrationRisk => "integration-risk",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
}

/// One itemized value driver. `magnitude` is in USD and absent on
/// qualitative-only estimates, which carry direction only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueDriver {
    pub kind: DriverKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f64>,
    pub direction: Direction,
}

impl ValueDriver {
    pub fn quantified(kind: DriverKind, magnitude: f64, direction: Direction) -> Self {
        Self {
            kind,
            magnitude: Some(magnitude),
            direction,
        }
    }

    pub fn directional(kind: DriverKind, direction: Direction) -> Self {
        Self {
            kind,
            magnitude: None,
            direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

/// An itemized integration risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub severity: RiskSeverity,
}

impl RiskFactor {
    pub fn new(name: impl Into<String>, severity: RiskSeverity) -> Self {
        Self {
            name: name.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateQuality {
    /// Enough financial data to quantify; all monetary fields populated.
    Quantitative,
    /// Directional signals only; no monetary fields populated.
    QualitativeOnly,
}

/// Bounded, explainable synergy estimate attached to a match candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyEstimate {
    pub source_id: ProfileId,
    pub candidate_id: ProfileId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_synergy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_synergy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_adjusted_value: Option<f64>,
    pub confidence_score: f32,
    pub drivers: Vec<ValueDriver>,
    pub risk_factors: Vec<RiskFactor>,
    #[serde(rename = "estimate_quality")]
    pub quality: EstimateQuality,
}

impl SynergyEstimate {
    pub fn is_quantitative(&self) -> bool {
        self.quality == EstimateQuality::Quantitative
    }
}
