//! # synergX
//!
//! An explainable M&A candidate matching and synergy-analysis engine.
//!
//! synergX ranks candidate organizations against a subject organization as
//! potential merger/acquisition partners and quantifies the expected value
//! of each pairing. Profiles arrive as already-structured records from
//! external collaborators; the engine turns them into comparable feature
//! vectors, scores and classifies candidate pairs, and produces bounded,
//! driver-itemized synergy estimates.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use synergx::prelude::*;
//! use std::sync::Arc;
//!
//! let taxonomy = Arc::new(
//!     Taxonomy::builder(1)
//!         .sector("fintech")
//!         .sector("ecommerce")
//!         .code("fintech-payments", "fintech")
//!         .business_model("saas")
//!         .upstream_of("fintech", "ecommerce")
//!         .build()
//!         .unwrap(),
//! );
//!
//! let subject = CompanyProfile::new("subject", "Subject Co", Provenance::DocumentDerived)
//!     .with_industry("fintech-payments")
//!     .with_business_model("saas")
//!     .with_revenue(3_000_000.0);
//! let snapshot = CatalogSnapshot::build(1, chrono::Utc::now(), vec![/* catalog rows */]);
//!
//! let vectorizer = Vectorizer::new(Arc::clone(&taxonomy), &snapshot);
//! let engine = MatchEngine::new(taxonomy, EngineConfig::default()).unwrap();
//! let analyzer = Analyzer::with_defaults(engine);
//! let report = analyzer
//!     .analyze(&subject, None, &snapshot, &vectorizer, &MatchFilter::default(), &RunOptions::default())
//!     .unwrap();
//! for result in &report.results {
//!     println!("{} {:.2} {}", result.candidate.candidate_name, result.candidate.match_score, result.candidate.match_type);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! synergX is composed of several crates:
//!
//! - `synergx-core` - data model: profiles, taxonomy, feature vectors,
//!   catalog snapshots, the coalescing vector cache
//! - `synergx-similarity` - masked weighted scoring, classification,
//!   parallel catalog runs
//! - `synergx-analysis` - synergy prediction, ranking, report assembly
//!
//! The root crate re-exports the public surface and adds JSON loaders for
//! collaborator-delivered files plus a small CLI.

pub mod loader;

// Re-export core types
pub use synergx_core::{
    CatalogEntry, CatalogPolicy, CatalogSnapshot, CatalogStats, ChainRelation, CompanyProfile,
    DimensionGroup, Error, FeatureVector, FinancialMetrics, ProfileId, Provenance, Result,
    SchemaVersion, Taxonomy, TaxonomySpec, Vectorizer,
};

// Re-export the similarity engine
pub use synergx_similarity::{
    ClassifyThresholds, Classification, ConfigError, EngineConfig, GroupScore, MatchCandidate,
    MatchEngine, MatchType, MatchWeights, RunOptions, RunOutcome, SkippedCandidate,
};

// Re-export analysis
pub use synergx_analysis::{
    Analyzer, Direction, DriverKind, EstimateQuality, GroupImportance, MatchFilter, PolicyError,
    RankedMatch, RankedReport, RiskFactor, RiskSeverity, SynergyEstimate, SynergyPolicy,
    SynergyPredictor, ValueDriver,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Analyzer, CatalogPolicy, CatalogSnapshot, ChainRelation, CompanyProfile, DimensionGroup,
        EngineConfig, Error, EstimateQuality, FeatureVector, FinancialMetrics, MatchCandidate,
        MatchEngine, MatchFilter, MatchType, MatchWeights, ProfileId, Provenance, RankedMatch,
        RankedReport, Result, RunOptions, SynergyEstimate, SynergyPolicy, SynergyPredictor,
        Taxonomy, Vectorizer,
    };
}
