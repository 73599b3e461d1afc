//! Synergy policy.
//!
//! Every rate, cap and blend the predictor consults is a named field here.
//! Defaults are deliberately conservative; deployments tune them per
//! engagement and validate the result before use.

use serde::{Deserialize, Serialize};

/// Tunable parameters of the synergy predictor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SynergyPolicy {
    /// Revenue uplift per unit of cross-sell proxy, as a share of combined revenue.
    pub cross_sell_rate: f64,
    /// Revenue uplift per unit of market-expansion proxy.
    pub market_expansion_rate: f64,
    /// Lower bound of revenue synergy as a share of combined revenue.
    pub revenue_floor_pct: f64,
    /// Upper bound of revenue synergy as a share of combined revenue.
    pub revenue_cap_pct: f64,
    /// Cost savings per unit of operational-overlap proxy, as a share of
    /// combined operating cost.
    pub operational_overlap_rate: f64,
    /// Lower bound of cost synergy as a share of combined operating cost.
    pub cost_floor_pct: f64,
    /// Upper bound of cost synergy as a share of combined operating cost.
    pub cost_cap_pct: f64,
    /// Operating cost assumed when neither cost nor margin is reported,
    /// as a share of revenue.
    pub default_cost_ratio: f64,
    /// Risk-discount contribution of geographic/cultural distance.
    pub geo_risk_weight: f64,
    /// Risk-discount contribution of size disparity.
    pub size_risk_weight: f64,
    /// Hard cap on the total risk discount.
    pub max_risk_discount: f64,
    /// Confidence blend: weight of the match score.
    pub confidence_match_weight: f32,
    /// Confidence blend: weight of pair data coverage.
    pub confidence_coverage_weight: f32,
    /// Confidence multiplier applied to qualitative-only estimates.
    pub qualitative_confidence_scale: f32,
}

impl Default for SynergyPolicy {
    fn default() -> Self {
        Self {
            cross_sell_rate: 0.02,
            market_expansion_rate: 0.015,
            revenue_floor_pct: 0.0,
            revenue_cap_pct: 0.05,
            operational_overlap_rate: 0.03,
            cost_floor_pct: 0.0,
            cost_cap_pct: 0.08,
            default_cost_ratio: 0.7,
            geo_risk_weight: 0.3,
            size_risk_weight: 0.3,
            max_risk_discount: 0.6,
            confidence_match_weight: 0.5,
            confidence_coverage_weight: 0.5,
            qualitative_confidence_scale: 0.5,
        }
    }
}

impl SynergyPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        let rates = [
            ("cross_sell_rate", self.cross_sell_rate),
            ("market_expansion_rate", self.market_expansion_rate),
            ("operational_overlap_rate", self.operational_overlap_rate),
            ("geo_risk_weight", self.geo_risk_weight),
            ("size_risk_weight", self.size_risk_weight),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(PolicyError::NegativeRate { name, value });
            }
        }
        for (name, floor, cap) in [
            ("revenue", self.revenue_floor_pct, self.revenue_cap_pct),
            ("cost", self.cost_floor_pct, self.cost_cap_pct),
        ] {
            if !(0.0..=1.0).contains(&floor) || !(0.0..=1.0).contains(&cap) || floor > cap {
                return Err(PolicyError::InvalidCapRange { name, floor, cap });
            }
        }
        if !(0.0..1.0).contains(&self.max_risk_discount) {
            return Err(PolicyError::OutOfRange {
                name: "max_risk_discount",
                value: self.max_risk_discount,
            });
        }
        if !(0.0..=1.0).contains(&self.default_cost_ratio) {
            return Err(PolicyError::OutOfRange {
                name: "default_cost_ratio",
                value: self.default_cost_ratio,
            });
        }
        let confidence_mass = self.confidence_match_weight + self.confidence_coverage_weight;
        if self.confidence_match_weight < 0.0
            || self.confidence_coverage_weight < 0.0
            || confidence_mass <= 0.0
        {
            return Err(PolicyError::InvalidConfidenceBlend);
        }
        if !(0.0..=1.0).contains(&self.qualitative_confidence_scale) {
            return Err(PolicyError::OutOfRange {
                name: "qualitative_confidence_scale",
                value: self.qualitative_confidence_scale as f64,
            });
        }
        Ok(())
    }
}

/// Errors raised while validating a synergy policy.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PolicyError {
    #[error("rate '{name}' must be a non-negative finite number, got {value}")]
    NegativeRate { name: &'static str, value: f64 },

    #[error("{name} caps invalid: floor {floor} / cap {cap} must satisfy 0 <= floor <= cap <= 1")]
    InvalidCapRange {
        name: &'static str,
        floor: f64,
        cap: f64,
    },

    #[error("'{name}' out of range: {value}")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("confidence weights must be non-negative with a positive sum")]
    InvalidConfidenceBlend,
}
