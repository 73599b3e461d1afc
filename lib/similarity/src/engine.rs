//! Catalog scoring engine.
//!
//! Scores a subject vector against a catalog of candidate vectors. Scoring
//! is embarrassingly parallel per candidate and runs on a bounded rayon
//! pool over immutable data; per-item failures are collected, never allowed
//! to abort the rest of a run.

use crate::classify::{classify, MatchType};
use crate::config::{ConfigError, EngineConfig};
use crate::score::{score_pair, GroupScore};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use synergx_core::{ChainRelation, Error, FeatureVector, ProfileId, Result, Taxonomy};
use tracing::{debug, info};

/// A scored, classified candidate pair. Unique per
/// (source id, candidate id, analysis version).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub source_id: ProfileId,
    pub candidate_id: ProfileId,
    pub candidate_name: String,
    pub match_score: f32,
    pub match_type: MatchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_relation: Option<ChainRelation>,
    /// Per-group similarity breakdown, for explainability.
    pub breakdown: Vec<GroupScore>,
    /// Mean presence-mask coverage of the two vectors; tie-break key.
    pub coverage: f32,
    pub analysis_version: u32,
    pub created_at: DateTime<Utc>,
}

/// A candidate excluded from a run, with the reason it was excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub id: ProfileId,
    pub name: String,
    pub reason: String,
}

/// Per-run options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Candidates not yet started by this instant are abandoned; completed
    /// results are kept.
    pub deadline: Option<Instant>,
    /// Size of the scoring worker pool. `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

/// Outcome of scoring one subject against a catalog.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub matches: Vec<MatchCandidate>,
    pub skipped: Vec<SkippedCandidate>,
    pub timed_out: bool,
    pub considered: usize,
}

enum Scored {
    Match(Box<MatchCandidate>),
    Skipped(SkippedCandidate),
    Filtered,
    TimedOut,
}

/// The similarity engine: weight configuration + classification thresholds
/// bound to one taxonomy.
pub struct MatchEngine {
    taxonomy: Arc<Taxonomy>,
    config: EngineConfig,
}

impl MatchEngine {
    pub fn new(taxonomy: Arc<Taxonomy>, mut config: EngineConfig) -> std::result::Result<Self, ConfigError> {
        config.validate_and_normalize()?;
        Ok(Self { taxonomy, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    /// Score and classify one pair.
    ///
    /// Returns `Ok(None)` for self-pairs and for pairs that classify as
    /// unrelated; those never reach ranking.
    pub fn score_pair(
        &self,
        subject: &FeatureVector,
        candidate: &FeatureVector,
    ) -> Result<Option<MatchCandidate>> {
        if subject.schema_version() != candidate.schema_version() {
            return Err(Error::DimensionMismatch {
                left: subject.schema_version(),
                right: candidate.schema_version(),
            });
        }
        if subject.profile_id() == candidate.profile_id() {
            return Ok(None);
        }
        let classification = classify(&self.taxonomy, &self.config.thresholds, subject, candidate);
        if classification.match_type == MatchType::Unrelated {
            debug!(candidate = %candidate.profile_id(), "classified unrelated, dropped");
            return Ok(None);
        }
        let pair = score_pair(&self.config.weights, subject, candidate)?;
        Ok(Some(MatchCandidate {
            source_id: subject.profile_id().clone(),
            candidate_id: candidate.profile_id().clone(),
            candidate_name: candidate.name().to_string(),
            match_score: pair.score,
            match_type: classification.match_type,
            chain_relation: classification.chain_relation,
            breakdown: pair.breakdown.into_vec(),
            coverage: pair.coverage,
            analysis_version: self.config.analysis_version,
            created_at: Utc::now(),
        }))
    }

    /// Coarse taxonomy-bucket test: a candidate can only classify horizontal
    /// in the subject's own sector, or vertical in an adjacent one. Anything
    /// else would be dropped as unrelated after full scoring anyway.
    fn admits(&self, subject: &FeatureVector, candidate: &FeatureVector) -> bool {
        if self.config.thresholds.horizontal_industry_max >= 1.0 {
            return true;
        }
        match (subject.sector(), candidate.sector()) {
            (Some(a), Some(b)) => a == b || self.taxonomy.adjacent(a, b),
            _ => false,
        }
    }

    /// Score the subject against every candidate vector in parallel.
    ///
    /// The schema-version check runs per candidate, so one stale vector
    /// surfaces as a skip while the rest of the run proceeds.
    pub fn score_catalog(
        &self,
        subject: &FeatureVector,
        candidates: &[Arc<FeatureVector>],
        options: &RunOptions,
    ) -> RunOutcome {
        let run = || -> Vec<Scored> {
            candidates
                .par_iter()
                .map(|candidate| {
                    if let Some(deadline) = options.deadline {
                        if Instant::now() >= deadline {
                            return Scored::TimedOut;
                        }
                    }
                    if self.config.prefilter && !self.admits(subject, candidate) {
                        return Scored::Filtered;
                    }
                    match self.score_pair(subject, candidate) {
                        Ok(Some(candidate)) => Scored::Match(Box::new(candidate)),
                        Ok(None) => Scored::Filtered,
                        Err(err) => Scored::Skipped(SkippedCandidate {
                            id: candidate.profile_id().clone(),
                            name: candidate.name().to_string(),
                            reason: err.to_string(),
                        }),
                    }
                })
                .collect()
        };

        let scored = match options.threads {
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(run),
                Err(_) => run(),
            },
            None => run(),
        };

        let mut outcome = RunOutcome {
            considered: candidates.len(),
            ..RunOutcome::default()
        };
        for item in scored {
            match item {
                Scored::Match(m) => outcome.matches.push(*m),
                Scored::Skipped(s) => outcome.skipped.push(s),
                Scored::Filtered => {}
                Scored::TimedOut => outcome.timed_out = true,
            }
        }
        info!(
            subject = %subject.profile_id(),
            considered = outcome.considered,
            matched = outcome.matches.len(),
            skipped = outcome.skipped.len(),
            timed_out = outcome.timed_out,
            "catalog scoring finished"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifyThresholds;
    use synergx_core::{CatalogSnapshot, CompanyProfile, Provenance, Vectorizer};

    fn taxonomy() -> Arc<Taxonomy> {
        Arc::new(
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
        )
    }

    fn profile(id: &str, industry: &str, model: &str, revenue: f64) -> CompanyProfile {
        CompanyProfile::new(id, id.to_uppercase(), Provenance::MarketData)
            .with_industry(industry)
            .with_business_model(model)
            .with_revenue(revenue)
            .with_markets(["us"])
    }

    fn fixture() -> (MatchEngine, Vectorizer, Vec<CompanyProfile>) {
        let taxonomy = taxonomy();
        let profiles = vec![
            profile("peer", "fintech-payments", "saas", 4_000_000.0),
            profile("sibling", "fintech-lending", "saas", 9_000_000.0),
            profile("downstream", "ecommerce-platform", "marketplace", 500_000_000.0),
            profile("far", "healthcare-clinics", "saas", 20_000_000.0),
        ];
        let snapshot = CatalogSnapshot::build(
            1,
            Utc::now(),
            profiles.iter().cloned().map(|p| (p, None)).collect(),
        );
        let vectorizer = Vectorizer::new(Arc::clone(&taxonomy), &snapshot);
        let engine = MatchEngine::new(taxonomy, EngineConfig::default()).unwrap();
        (engine, vectorizer, profiles)
    }

    fn subject_vector(vz: &Vectorizer) -> Arc<FeatureVector> {
        vz.vectorize(&profile("subject", "fintech-payments", "saas", 3_000_000.0))
            .unwrap()
    }

    fn candidate_vectors(vz: &Vectorizer, profiles: &[CompanyProfile]) -> Vec<Arc<FeatureVector>> {
        profiles.iter().map(|p| vz.vectorize(p).unwrap()).collect()
    }

    #[test]
    fn test_scores_bounded_and_unrelated_dropped() {
        let (engine, vz, profiles) = fixture();
        let subject = subject_vector(&vz);
        let candidates = candidate_vectors(&vz, &profiles);
        let outcome = engine.score_catalog(&subject, &candidates, &RunOptions::default());

        assert_eq!(outcome.considered, 4);
        assert!(outcome.skipped.is_empty());
        assert!(!outcome.timed_out);
        // "far" is unrelated and dropped.
        assert_eq!(outcome.matches.len(), 3);
        for m in &outcome.matches {
            assert!((0.0..=1.0).contains(&m.match_score));
            assert_ne!(m.match_type, MatchType::Unrelated);
            assert!(!m.breakdown.is_empty());
        }
        let downstream = outcome
            .matches
            .iter()
            .find(|m| m.candidate_id == ProfileId::from("downstream"))
            .unwrap();
        assert_eq!(downstream.match_type, MatchType::Vertical);
        assert_eq!(downstream.chain_relation, Some(ChainRelation::Upstream));
    }

    #[test]
    fn test_self_pair_is_skipped() {
        let (engine, vz, _) = fixture();
        let subject = subject_vector(&vz);
        assert!(engine.score_pair(&subject, &subject).unwrap().is_none());
    }

    #[test]
    fn test_prefilter_preserves_semantics() {
        let (engine, vz, profiles) = fixture();
        let subject = subject_vector(&vz);
        let candidates = candidate_vectors(&vz, &profiles);

        let filtered = engine.score_catalog(&subject, &candidates, &RunOptions::default());

        let mut unfiltered_config = EngineConfig::default();
        unfiltered_config.prefilter = false;
        let unfiltered_engine = MatchEngine::new(taxonomy(), unfiltered_config).unwrap();
        let unfiltered = unfiltered_engine.score_catalog(&subject, &candidates, &RunOptions::default());

        let key = |m: &MatchCandidate| {
            (m.candidate_id.clone(), m.match_type.to_string(), m.match_score.to_bits())
        };
        let mut a: Vec<_> = filtered.matches.iter().map(key).collect();
        let mut b: Vec<_> = unfiltered.matches.iter().map(key).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stale_vector_is_a_per_item_skip() {
        let (engine, vz, profiles) = fixture();
        let subject = subject_vector(&vz);
        let mut candidates = candidate_vectors(&vz, &profiles);

        // One candidate vectorized under a newer snapshot version.
        let stale_snapshot = CatalogSnapshot::build(2, Utc::now(), Vec::new());
        let other_vz = Vectorizer::new(Arc::clone(engine.taxonomy()), &stale_snapshot);
        candidates.push(
            other_vz
                .vectorize(&profile("stale", "fintech-payments", "saas", 1_000_000.0))
                .unwrap(),
        );

        let outcome = engine.score_catalog(&subject, &candidates, &RunOptions::default());
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].id, ProfileId::from("stale"));
        assert!(outcome.skipped[0].reason.contains("different schemas"));
        // The rest of the run still completed.
        assert_eq!(outcome.matches.len(), 3);
    }

    #[test]
    fn test_expired_deadline_aborts_without_corruption() {
        let (engine, vz, profiles) = fixture();
        let subject = subject_vector(&vz);
        let candidates = candidate_vectors(&vz, &profiles);
        let options = RunOptions {
            deadline: Some(Instant::now() - std::time::Duration::from_millis(1)),
            threads: Some(2),
        };
        let outcome = engine.score_catalog(&subject, &candidates, &options);
        assert!(outcome.timed_out);
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.considered, 4);
    }

    #[test]
    fn test_loose_thresholds_disable_bucket_filter() {
        let (_, vz, profiles) = fixture();
        let subject = subject_vector(&vz);
        let candidates = candidate_vectors(&vz, &profiles);
        // horizontal_industry_max of 1.0 admits every sector combination.
        let config = EngineConfig {
            thresholds: ClassifyThresholds {
                horizontal_industry_max: 1.0,
                vertical_industry_min: 1.0,
                horizontal_business_model_max: 1.0,
                ..ClassifyThresholds::default()
            },
            ..EngineConfig::default()
        };
        let engine = MatchEngine::new(taxonomy(), config).unwrap();
        let outcome = engine.score_catalog(&subject, &candidates, &RunOptions::default());
        // Everything classifies horizontal now, including "far".
        assert_eq!(outcome.matches.len(), 4);
    }
}
