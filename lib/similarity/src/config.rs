//! Engine configuration.
//!
//! Every weight and threshold the scoring algorithm consults lives here, so
//! policy can be tuned and tested without touching the algorithm itself.

use serde::{Deserialize, Serialize};
use synergx_core::DimensionGroup;

/// One weight per dimension group. Weights are relative; the engine
/// normalizes them to sum to 1.0 at construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MatchWeights {
    pub industry: f32,
    pub business_model: f32,
    pub geography: f32,
    pub size: f32,
    pub strategic: f32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            industry: 0.3,
            business_model: 0.2,
            geography: 0.2,
            size: 0.1,
            strategic: 0.2,
        }
    }
}

impl MatchWeights {
    pub fn get(&self, group: DimensionGroup) -> f32 {
        match group {
            DimensionGroup::Industry => self.industry,
            DimensionGroup::BusinessModel => self.business_model,
            DimensionGroup::Geography => self.geography,
            DimensionGroup::Size => self.size,
            DimensionGroup::StrategicAlignment => self.strategic,
        }
    }

    fn set(&mut self, group: DimensionGroup, value: f32) {
        match group {
            DimensionGroup::Industry => self.industry = value,
            DimensionGroup::BusinessModel => self.business_model = value,
            DimensionGroup::Geography => self.geography = value,
            DimensionGroup::Size => self.size = value,
            DimensionGroup::StrategicAlignment => self.strategic = value,
        }
    }

    /// Reject negative/zero configurations and normalize to sum 1.0.
    pub fn validate_and_normalize(&mut self) -> Result<(), ConfigError> {
        for group in DimensionGroup::ALL {
            if self.get(group) < 0.0 {
                return Err(ConfigError::NegativeWeight(group));
            }
        }
        let total: f32 = DimensionGroup::ALL.iter().map(|g| self.get(*g)).sum();
        if total <= 0.0 {
            return Err(ConfigError::ZeroTotalWeight);
        }
        if (total - 1.0).abs() > 0.001 {
            for group in DimensionGroup::ALL {
                self.set(group, self.get(group) / total);
            }
        }
        Ok(())
    }
}

/// Classification thresholds. All distances live in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClassifyThresholds {
    /// Industry distance at or below which a pair can be horizontal.
    pub horizontal_industry_max: f32,
    /// Business-model distance at or below which a pair can be horizontal.
    pub horizontal_business_model_max: f32,
    /// Industry distance at or above which a value-chain-adjacent pair is vertical.
    pub vertical_industry_min: f32,
    /// Distance assigned to two different codes within the same sector.
    pub same_sector_distance: f32,
    /// Scores closer than this are ties, broken by coverage then name.
    pub score_epsilon: f32,
}

impl Default for ClassifyThresholds {
    fn default() -> Self {
        Self {
            horizontal_industry_max: 0.35,
            horizontal_business_model_max: 0.5,
            vertical_industry_min: 0.6,
            same_sector_distance: 0.3,
            score_epsilon: 1e-4,
        }
    }
}

impl ClassifyThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_bounded = [
            ("horizontal_industry_max", self.horizontal_industry_max),
            ("horizontal_business_model_max", self.horizontal_business_model_max),
            ("vertical_industry_min", self.vertical_industry_min),
            ("same_sector_distance", self.same_sector_distance),
        ];
        for (name, value) in unit_bounded {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        if !(0.0..=0.1).contains(&self.score_epsilon) {
            return Err(ConfigError::ThresholdOutOfRange {
                name: "score_epsilon",
                value: self.score_epsilon,
            });
        }
        if self.vertical_industry_min < self.horizontal_industry_max {
            return Err(ConfigError::InvertedThresholds);
        }
        Ok(())
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub weights: MatchWeights,
    #[serde(default)]
    pub thresholds: ClassifyThresholds,
    /// Stamped onto every MatchCandidate; bump when scoring policy changes.
    #[serde(default = "default_analysis_version")]
    pub analysis_version: u32,
    /// Skip full scoring for candidates the taxonomy-bucket test already
    /// rules out. Semantics-preserving; exists purely to save work.
    #[serde(default = "default_prefilter")]
    pub prefilter: bool,
}

fn default_analysis_version() -> u32 {
    1
}

fn default_prefilter() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: MatchWeights::default(),
            thresholds: ClassifyThresholds::default(),
            analysis_version: 1,
            prefilter: true,
        }
    }
}

impl EngineConfig {
    pub fn validate_and_normalize(&mut self) -> Result<(), ConfigError> {
        self.weights.validate_and_normalize()?;
        self.thresholds.validate()
    }
}

/// Errors raised while validating an engine configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("weight for '{0}' is negative")]
    NegativeWeight(DimensionGroup),

    #[error("at least one dimension weight must be positive")]
    ZeroTotalWeight,

    #[error("threshold '{name}' out of range: {value}")]
    ThresholdOutOfRange { name: &'static str, value: f32 },

    #[error("vertical_industry_min must not be below horizontal_industry_max")]
    InvertedThresholds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_already_normalized() {
        let mut weights = MatchWeights::default();
        weights.validate_and_normalize().unwrap();
        let total: f32 = DimensionGroup::ALL.iter().map(|g| weights.get(*g)).sum();
        assert!((total - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_weights_normalize() {
        let mut weights = MatchWeights {
            industry: 3.0,
            business_model: 1.0,
            geography: 1.0,
            size: 0.0,
            strategic: 0.0,
        };
        weights.validate_and_normalize().unwrap();
        assert!((weights.industry - 0.6).abs() < 1e-6);
        assert_eq!(weights.size, 0.0);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut weights = MatchWeights {
            size: -0.1,
            ..MatchWeights::default()
        };
        assert!(matches!(
            weights.validate_and_normalize(),
            Err(ConfigError::NegativeWeight(DimensionGroup::Size))
        ));
    }

    #[test]
    fn test_zero_total_rejected() {
        let mut weights = MatchWeights {
            industry: 0.0,
            business_model: 0.0,
            geography: 0.0,
            size: 0.0,
            strategic: 0.0,
        };
        assert!(matches!(
            weights.validate_and_normalize(),
            Err(ConfigError::ZeroTotalWeight)
        ));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let thresholds = ClassifyThresholds {
            horizontal_industry_max: 0.8,
            vertical_industry_min: 0.4,
            ..ClassifyThresholds::default()
        };
        assert!(matches!(
            thresholds.validate(),
            Err(ConfigError::InvertedThresholds)
        ));
    }

    #[test]
    fn test_threshold_range_checked() {
        let thresholds = ClassifyThresholds {
            horizontal_industry_max: 1.5,
            ..ClassifyThresholds::default()
        };
        assert!(matches!(
            thresholds.validate(),
            Err(ConfigError::ThresholdOutOfRange { .. })
        ));
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.prefilter);
        assert_eq!(config.analysis_version, 1);
    }
}
