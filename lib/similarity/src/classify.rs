//! Match-type classification.
//!
//! A pair is horizontal when both industry and business-model distances fall
//! below their thresholds, vertical when the industries are far apart but
//! the taxonomy's value-chain table relates the two sectors, and unrelated
//! otherwise. Unrelated pairs are dropped before ranking.

use crate::config::ClassifyThresholds;
use serde::{Deserialize, Serialize};
use synergx_core::{ChainRelation, FeatureVector, Taxonomy};

/// Kind of merger a candidate pair represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Horizontal,
    Vertical,
    Unrelated,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchType::Horizontal => "horizontal",
            MatchType::Vertical => "vertical",
            MatchType::Unrelated => "unrelated",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(MatchType::Horizontal),
            "vertical" => Ok(MatchType::Vertical),
            "unrelated" => Ok(MatchType::Unrelated),
            other => Err(format!("unknown match type '{}'", other)),
        }
    }
}

/// Outcome of classifying one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub match_type: MatchType,
    pub industry_distance: f32,
    pub business_model_distance: f32,
    /// Position of the subject relative to the candidate, for vertical pairs.
    pub chain_relation: Option<ChainRelation>,
}

/// Distance between two resolved industries: 0 for the same code, the
/// configured same-sector distance for siblings, 1 across sectors or when
/// either side is unknown.
fn industry_distance(
    thresholds: &ClassifyThresholds,
    subject: &FeatureVector,
    candidate: &FeatureVector,
) -> f32 {
    match (subject.sector(), candidate.sector()) {
        (Some(a), Some(b)) if a == b => match (subject.code(), candidate.code()) {
            (Some(ca), Some(cb)) if ca == cb => 0.0,
            _ => thresholds.same_sector_distance,
        },
        (Some(_), Some(_)) => 1.0,
        _ => 1.0,
    }
}

/// Business-model distance: 0 when equal, 1 when different, neutral 0.5
/// when unknown on either side.
fn business_model_distance(subject: &FeatureVector, candidate: &FeatureVector) -> f32 {
    match (subject.business_model(), candidate.business_model()) {
        (Some(a), Some(b)) => {
            if a == b {
                0.0
            } else {
                1.0
            }
        }
        _ => 0.5,
    }
}

/// Classify a pair. Deterministic: identical inputs and thresholds always
/// produce the identical result.
pub fn classify(
    taxonomy: &Taxonomy,
    thresholds: &ClassifyThresholds,
    subject: &FeatureVector,
    candidate: &FeatureVector,
) -> Classification {
    let industry = industry_distance(thresholds, subject, candidate);
    let business_model = business_model_distance(subject, candidate);
    let chain_relation = subject
        .sector()
        .zip(candidate.sector())
        .and_then(|(a, b)| taxonomy.chain_relation(a, b));

    let match_type = if industry <= thresholds.horizontal_industry_max
        && business_model <= thresholds.horizontal_business_model_max
    {
        MatchType::Horizontal
    } else if industry >= thresholds.vertical_industry_min && chain_relation.is_some() {
        MatchType::Vertical
    } else {
        MatchType::Unrelated
    };

    Classification {
        match_type,
        industry_distance: industry,
        business_model_distance: business_model,
        chain_relation: if match_type == MatchType::Vertical {
            chain_relation
        } else {
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use synergx_core::{CatalogSnapshot, CompanyProfile, Provenance, Vectorizer};

    fn setup() -> (Arc<Taxonomy>, Vectorizer) {
        let taxonomy = Arc::new(
            Taxonomy::builder(1)
                .sector("fintech")
                .sector("ecommerce")
                .sector("healthcare")
                .code("fintech-payments", "fintech")
                .code("fintech-lending", "fintech")
                .code("ecommerce-platform", "ecommerce")
                .code("healthcare-clinics", "healthcare")
                .business_model("saas")
                .business_model("marketplace")
                .upstream_of("fintech", "ecommerce")
                .build()
                .unwrap(),
        );
        let snapshot = CatalogSnapshot::build(1, Utc::now(), Vec::new());
        let vectorizer = Vectorizer::new(Arc::clone(&taxonomy), &snapshot);
        (taxonomy, vectorizer)
    }

    fn vec_for(vz: &Vectorizer, id: &str, industry: &str, model: Option<&str>) -> Arc<FeatureVector> {
        let mut profile =
            CompanyProfile::new(id, id.to_uppercase(), Provenance::DocumentDerived).with_industry(industry);
        if let Some(model) = model {
            profile = profile.with_business_model(model);
        }
        vz.vectorize(&profile).unwrap()
    }

    #[test]
    fn test_identical_industry_is_horizontal() {
        let (taxonomy, vz) = setup();
        let a = vec_for(&vz, "a", "fintech-payments", Some("saas"));
        let b = vec_for(&vz, "b", "fintech-payments", Some("saas"));
        let cls = classify(&taxonomy, &ClassifyThresholds::default(), &a, &b);
        assert_eq!(cls.match_type, MatchType::Horizontal);
        assert_eq!(cls.industry_distance, 0.0);
        assert_eq!(cls.chain_relation, None);
    }

    #[test]
    fn test_sibling_codes_are_horizontal() {
        let (taxonomy, vz) = setup();
        let a = vec_for(&vz, "a", "fintech-payments", Some("saas"));
        let b = vec_for(&vz, "b", "fintech-lending", None);
        let cls = classify(&taxonomy, &ClassifyThresholds::default(), &a, &b);
        assert_eq!(cls.match_type, MatchType::Horizontal);
        assert_eq!(cls.industry_distance, 0.3);
        assert_eq!(cls.business_model_distance, 0.5);
    }

    #[test]
    fn test_adjacent_sectors_are_vertical() {
        let (taxonomy, vz) = setup();
        let a = vec_for(&vz, "a", "fintech-payments", Some("saas"));
        let b = vec_for(&vz, "b", "ecommerce-platform", Some("marketplace"));
        let cls = classify(&taxonomy, &ClassifyThresholds::default(), &a, &b);
        assert_eq!(cls.match_type, MatchType::Vertical);
        assert_eq!(cls.chain_relation, Some(ChainRelation::Upstream));

        // And the candidate sees the subject as its supplier.
        let back = classify(&taxonomy, &ClassifyThresholds::default(), &b, &a);
        assert_eq!(back.match_type, MatchType::Vertical);
        assert_eq!(back.chain_relation, Some(ChainRelation::Downstream));
    }

    #[test]
    fn test_distant_sectors_without_adjacency_are_unrelated() {
        let (taxonomy, vz) = setup();
        let a = vec_for(&vz, "a", "fintech-payments", Some("saas"));
        let b = vec_for(&vz, "b", "healthcare-clinics", Some("saas"));
        let cls = classify(&taxonomy, &ClassifyThresholds::default(), &a, &b);
        assert_eq!(cls.match_type, MatchType::Unrelated);
    }

    #[test]
    fn test_different_models_block_horizontal() {
        let (taxonomy, vz) = setup();
        let a = vec_for(&vz, "a", "fintech-payments", Some("saas"));
        let b = vec_for(&vz, "b", "fintech-payments", Some("marketplace"));
        let cls = classify(&taxonomy, &ClassifyThresholds::default(), &a, &b);
        assert_eq!(cls.match_type, MatchType::Unrelated);
        assert_eq!(cls.business_model_distance, 1.0);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let (taxonomy, vz) = setup();
        let a = vec_for(&vz, "a", "fintech-payments", Some("saas"));
        let b = vec_for(&vz, "b", "ecommerce-platform", None);
        let first = classify(&taxonomy, &ClassifyThresholds::default(), &a, &b);
        for _ in 0..10 {
            let again = classify(&taxonomy, &ClassifyThresholds::default(), &a, &b);
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_match_type_round_trips_serde_and_fromstr() {
        let json = serde_json::to_string(&MatchType::Horizontal).unwrap();
        assert_eq!(json, "\"horizontal\"");
        assert_eq!("vertical".parse::<MatchType>().unwrap(), MatchType::Vertical);
        assert!("diagonal".parse::<MatchType>().is_err());
    }
}
