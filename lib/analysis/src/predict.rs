//! Synergy prediction.
//!
//! Synergy values come from explicit, named drivers rather than an opaque
//! model. Revenue synergy blends a cross-sell proxy (inverse geography
//! overlap, tempered by strategic complementarity) with a market-expansion
//! proxy; cost synergy follows operational overlap (business-model
//! similarity). Both are clipped to policy caps, and after clipping the
//! driver magnitudes are rescaled so they still sum to the reported totals.

use crate::explain::{
    Direction, DriverKind, EstimateQuality, RiskFactor, RiskSeverity, SynergyEstimate, ValueDriver,
};
use crate::policy::{PolicyError, SynergyPolicy};
use synergx_core::{jaccard, Error, FeatureVector, FinancialMetrics, Result};
use synergx_similarity::MatchCandidate;
use tracing::warn;

/// Overlap proxies derived from the two feature vectors. `None` means the
/// underlying attribute was unknown on at least one side.
#[derive(Debug, Clone, Copy)]
struct Proxies {
    geo_overlap: Option<f64>,
    market_expansion: Option<f64>,
    business_model_overlap: Option<f64>,
    strategic_complement: Option<f64>,
}

fn proxies(subject: &FeatureVector, candidate: &FeatureVector) -> Proxies {
    let geo = subject.geo_markets().zip(candidate.geo_markets());
    Proxies {
        geo_overlap: geo.map(|(a, b)| jaccard(a, b) as f64),
        market_expansion: geo.map(|(a, b)| {
            let union = a.union(b).count();
            if union == 0 {
                0.0
            } else {
                b.difference(a).count() as f64 / union as f64
            }
        }),
        business_model_overlap: match (subject.business_model(), candidate.business_model()) {
            (Some(a), Some(b)) => Some(if a == b { 1.0 } else { 0.0 }),
            _ => None,
        },
        strategic_complement: subject
            .strategic_tags()
            .zip(candidate.strategic_tags())
            .map(|(a, b)| 1.0 - jaccard(a, b) as f64),
    }
}

/// Computes bounded, explainable synergy estimates for classified pairs.
pub struct SynergyPredictor {
    policy: SynergyPolicy,
}

impl SynergyPredictor {
    pub fn new(policy: SynergyPolicy) -> std::result::Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &SynergyPolicy {
        &self.policy
    }

    /// Predict synergies for one pair. Never fails: when mandatory financial
    /// data is missing the estimate degrades to qualitative-only signals
    /// instead of fabricating numbers.
    pub fn predict(
        &self,
        candidate: &MatchCandidate,
        subject_vector: &FeatureVector,
        candidate_vector: &FeatureVector,
        subject_financials: Option<&FinancialMetrics>,
        candidate_financials: Option<&FinancialMetrics>,
    ) -> SynergyEstimate {
        match self.quantitative(
            candidate,
            subject_vector,
            candidate_vector,
            subject_financials,
            candidate_financials,
        ) {
            Ok(estimate) => estimate,
            Err(err) => {
                warn!(
                    pair = %candidate.candidate_id,
                    %err,
                    "falling back to qualitative-only synergy signals"
                );
                self.qualitative(candidate, subject_vector, candidate_vector)
            }
        }
    }

    /// Strict quantitative path. Fails with `InsufficientFinancialData` when
    /// revenue is missing for either party.
    pub fn quantitative(
        &self,
        candidate: &MatchCandidate,
        subject_vector: &FeatureVector,
        candidate_vector: &FeatureVector,
        subject_financials: Option<&FinancialMetrics>,
        candidate_financials: Option<&FinancialMetrics>,
    ) -> Result<SynergyEstimate> {
        let policy = &self.policy;
        let subject_revenue = subject_financials
            .and_then(FinancialMetrics::sanitized_revenue)
            .ok_or_else(|| Error::InsufficientFinancialData {
                id: candidate.source_id.clone(),
            })?;
        let candidate_revenue = candidate_financials
            .and_then(FinancialMetrics::sanitized_revenue)
            .ok_or_else(|| Error::InsufficientFinancialData {
                id: candidate.candidate_id.clone(),
            })?;

        let combined_revenue = subject_revenue + candidate_revenue;
        let p = proxies(subject_vector, candidate_vector);

        // Revenue drivers. Unknown proxies fall back to neutral 0.5 so that
        // sparse data shrinks confidence, not the estimate itself.
        let cross_sell_proxy = 1.0 - p.geo_overlap.unwrap_or(0.5);
        let complement = p.strategic_complement.unwrap_or(0.5);
        let cross_sell =
            combined_revenue * policy.cross_sell_rate * (0.7 * cross_sell_proxy + 0.3 * complement);
        let expansion_proxy = p.market_expansion.unwrap_or(0.5);
        let expansion = combined_revenue * policy.market_expansion_rate * expansion_proxy;

        let raw_revenue = cross_sell + expansion;
        let revenue_synergy = raw_revenue.clamp(
            combined_revenue * policy.revenue_floor_pct,
            combined_revenue * policy.revenue_cap_pct,
        );
        let revenue_scale = if raw_revenue > 0.0 {
            revenue_synergy / raw_revenue
        } else {
            0.0
        };

        // Cost driver.
        let subject_cost = subject_financials
            .and_then(|f| f.operating_cost_estimate(policy.default_cost_ratio))
            .unwrap_or(0.0);
        let candidate_cost = candidate_financials
            .and_then(|f| f.operating_cost_estimate(policy.default_cost_ratio))
            .unwrap_or(0.0);
        let combined_cost = subject_cost + candidate_cost;
        let overlap = p.business_model_overlap.unwrap_or(0.5);
        let raw_cost = combined_cost * policy.operational_overlap_rate * overlap;
        let cost_synergy = raw_cost.clamp(
            combined_cost * policy.cost_floor_pct,
            combined_cost * policy.cost_cap_pct,
        );

        // Risk discount from integration-complexity factors.
        let geo_distance = 1.0 - p.geo_overlap.unwrap_or(0.5);
        let larger = subject_revenue.max(candidate_revenue);
        let smaller = subject_revenue.min(candidate_revenue);
        let size_disparity = 1.0 - smaller.ln_1p() / larger.ln_1p();
        let risk_discount = (policy.geo_risk_weight * geo_distance
            + policy.size_risk_weight * size_disparity)
            .clamp(0.0, policy.max_risk_discount);

        let gross = revenue_synergy + cost_synergy;
        let risk_adjusted_value = gross * (1.0 - risk_discount);

        let drivers = vec![
            ValueDriver::quantified(
                DriverKind::CrossSell,
                cross_sell * revenue_scale,
                Direction::Positive,
            ),
            ValueDriver::quantified(
                DriverKind::GeographyExpansion,
                expansion * revenue_scale,
                Direction::Positive,
            ),
            ValueDriver::quantified(DriverKind::OperationalOverlap, cost_synergy, Direction::Positive),
            ValueDriver::quantified(
                DriverKind::IntegrationRisk,
                gross * risk_discount,
                Direction::Negative,
            ),
        ];

        let mut risk_factors = self.shared_risk_factors(geo_distance, candidate.coverage);
        if size_disparity > 0.6 {
            risk_factors.push(RiskFactor::new(
                "size-disparity",
                if size_disparity > 0.85 {
                    RiskSeverity::High
                } else {
                    RiskSeverity::Medium
                },
            ));
        }

        let confidence_score = self.confidence(candidate);

        debug_assert!(revenue_synergy <= combined_revenue * policy.revenue_cap_pct + 1e-6);
        debug_assert!(cost_synergy <= combined_cost * policy.cost_cap_pct + 1e-6);
        debug_assert!((0.0..=1.0).contains(&confidence_score));

        Ok(SynergyEstimate {
            source_id: candidate.source_id.clone(),
            candidate_id: candidate.candidate_id.clone(),
            revenue_synergy: Some(revenue_synergy),
            cost_synergy: Some(cost_synergy),
            risk_discount: Some(risk_discount),
            risk_adjusted_value: Some(risk_adjusted_value),
            confidence_score,
            drivers,
            risk_factors,
            quality: EstimateQuality::Quantitative,
        })
    }

    fn qualitative(
        &self,
        candidate: &MatchCandidate,
        subject_vector: &FeatureVector,
        candidate_vector: &FeatureVector,
    ) -> SynergyEstimate {
        let p = proxies(subject_vector, candidate_vector);
        let mut drivers = Vec::new();
        if p.geo_overlap.map_or(true, |overlap| overlap < 1.0) {
            drivers.push(ValueDriver::directional(
                DriverKind::CrossSell,
                Direction::Positive,
            ));
        }
        if p.market_expansion.map_or(true, |expansion| expansion > 0.0) {
            drivers.push(ValueDriver::directional(
                DriverKind::GeographyExpansion,
                Direction::Positive,
            ));
        }
        if p.business_model_overlap.map_or(true, |overlap| overlap > 0.0) {
            drivers.push(ValueDriver::directional(
                DriverKind::OperationalOverlap,
                Direction::Positive,
            ));
        }
        drivers.push(ValueDriver::directional(
            DriverKind::IntegrationRisk,
            Direction::Negative,
        ));

        let geo_distance = 1.0 - p.geo_overlap.unwrap_or(0.5);
        let mut risk_factors = self.shared_risk_factors(geo_distance, candidate.coverage);
        risk_factors.push(RiskFactor::new("insufficient-financial-data", RiskSeverity::High));

        let confidence_score =
            (self.confidence(candidate) * self.policy.qualitative_confidence_scale).clamp(0.0, 1.0);

        SynergyEstimate {
            source_id: candidate.source_id.clone(),
            candidate_id: candidate.candidate_id.clone(),
            revenue_synergy: None,
            cost_synergy: None,
            risk_discount: None,
            risk_adjusted_value: None,
            confidence_score,
            drivers,
            risk_factors,
            quality: EstimateQuality::QualitativeOnly,
        }
    }

    fn shared_risk_factors(&self, geo_distance: f64, coverage: f32) -> Vec<RiskFactor> {
        let mut factors = Vec::new();
        if geo_distance > 0.5 {
            factors.push(RiskFactor::new(
                "geographic-integration",
                if geo_distance > 0.8 {
                    RiskSeverity::High
                } else {
                    RiskSeverity::Medium
                },
            ));
        }
        if coverage < 0.5 {
            factors.push(RiskFactor::new("data-completeness", RiskSeverity::Low));
        }
        factors
    }

    /// Blend of match score and pair coverage. Low completeness lowers
    /// confidence but never suppresses the estimate.
    fn confidence(&self, candidate: &MatchCandidate) -> f32 {
        let policy = &self.policy;
        let mass = policy.confidence_match_weight + policy.confidence_coverage_weight;
        ((policy.confidence_match_weight * candidate.match_score
            + policy.confidence_coverage_weight * candidate.coverage)
            / mass)
            .clamp(0.0, 1.0)
    }
}
