//! End-to-end analysis runs and report assembly.
//!
//! `Analyzer::analyze` is the orchestration callers use: it validates the
//! snapshot, vectorizes the subject and every candidate, scores, predicts
//! synergies and ranks. Per-item failures become itemized skips; only an
//! unusable catalog or an unmatchable subject aborts the run.

use crate::explain::SynergyEstimate;
use crate::policy::SynergyPolicy;
use crate::predict::SynergyPredictor;
use crate::rank::{feature_importance, rank_matches, GroupImportance, MatchFilter, RankedMatch};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use synergx_core::{
    CatalogPolicy, CatalogSnapshot, CompanyProfile, FeatureVector, FinancialMetrics, ProfileId,
    Result, SchemaVersion, Vectorizer,
};
use synergx_similarity::{MatchEngine, RunOptions, SkippedCandidate};
use tracing::info;

/// Ranked output of one analysis run. Every result carries its full
/// explainability payload; no record leaves the engine without it.
#[derive(Debug, Clone, Serialize)]
pub struct RankedReport {
    pub subject_id: ProfileId,
    pub subject_name: String,
    pub analysis_version: u32,
    pub schema_version: SchemaVersion,
    pub generated_at: DateTime<Utc>,
    pub candidates_considered: usize,
    pub timed_out: bool,
    pub results: Vec<RankedMatch>,
    pub skipped: Vec<SkippedCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<Vec<GroupImportance>>,
}

/// Full analysis pipeline: similarity engine + synergy predictor + catalog
/// staleness policy.
pub struct Analyzer {
    engine: MatchEngine,
    predictor: SynergyPredictor,
    catalog_policy: CatalogPolicy,
}

impl Analyzer {
    pub fn new(engine: MatchEngine, predictor: SynergyPredictor) -> Self {
        Self {
            engine,
            predictor,
            catalog_policy: CatalogPolicy::default(),
        }
    }

    /// Convenience constructor with default policies everywhere.
    pub fn with_defaults(engine: MatchEngine) -> Self {
        let predictor = SynergyPredictor::new(SynergyPolicy::default())
            .expect("default synergy policy validates");
        Self::new(engine, predictor)
    }

    #[must_use]
    pub fn with_catalog_policy(mut self, policy: CatalogPolicy) -> Self {
        self.catalog_policy = policy;
        self
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Rank every catalog candidate against the subject.
    pub fn analyze(
        &self,
        subject: &CompanyProfile,
        subject_financials: Option<&FinancialMetrics>,
        snapshot: &CatalogSnapshot,
        vectorizer: &Vectorizer,
        filter: &MatchFilter,
        options: &RunOptions,
    ) -> Result<RankedReport> {
        snapshot.ensure_usable(&self.catalog_policy, Utc::now())?;
        // An unmatchable subject aborts the whole run; there is nothing to rank.
        let subject_vector = vectorizer.vectorize(subject)?;

        // Vectorize candidates; the cache coalesces repeated profiles.
        let vectorized: Vec<_> = snapshot
            .entries()
            .par_iter()
            .map(|entry| (entry, vectorizer.vectorize(&entry.profile)))
            .collect();
        let mut skipped = Vec::new();
        let mut candidates: Vec<Arc<FeatureVector>> = Vec::with_capacity(vectorized.len());
        let mut financials: Vec<(Arc<FeatureVector>, Option<FinancialMetrics>)> = Vec::new();
        for (entry, outcome) in vectorized {
            match outcome {
                Ok(vector) => {
                    financials.push((Arc::clone(&vector), entry.financials));
                    candidates.push(vector);
                }
                Err(err) => skipped.push(SkippedCandidate {
                    id: entry.profile.id.clone(),
                    name: entry.profile.name.clone(),
                    reason: err.to_string(),
                }),
            }
        }

        let outcome = self.engine.score_catalog(&subject_vector, &candidates, options);
        skipped.extend(outcome.skipped);

        let by_id: ahash::AHashMap<&ProfileId, &(Arc<FeatureVector>, Option<FinancialMetrics>)> =
            financials.iter().map(|row| (row.0.profile_id(), row)).collect();
        let taxonomy = self.engine.taxonomy();
        let enriched: Vec<RankedMatch> = outcome
            .matches
            .into_par_iter()
            .map(|matched| {
                let (vector, candidate_financials) = by_id
                    .get(&matched.candidate_id)
                    .expect("scored candidate has a vector");
                let estimate: SynergyEstimate = self.predictor.predict(
                    &matched,
                    &subject_vector,
                    vector,
                    subject_financials,
                    candidate_financials.as_ref(),
                );
                let sector = vector
                    .sector()
                    .map(|index| taxonomy.sector_name(index).to_string());
                RankedMatch {
                    candidate: matched,
                    estimate,
                    sector,
                }
            })
            .collect();

        let epsilon = self.engine.config().thresholds.score_epsilon;
        let results = rank_matches(enriched, filter, epsilon);
        let importance = feature_importance(&results);

        info!(
            subject = %subject.id,
            results = results.len(),
            skipped = skipped.len(),
            timed_out = outcome.timed_out,
            "analysis run finished"
        );

        Ok(RankedReport {
            subject_id: subject.id.clone(),
            subject_name: subject.name.clone(),
            analysis_version: self.engine.config().analysis_version,
            schema_version: vectorizer.schema_version(),
            generated_at: Utc::now(),
            candidates_considered: outcome.considered,
            timed_out: outcome.timed_out,
            results,
            skipped,
            feature_importance: importance,
        })
    }
}
