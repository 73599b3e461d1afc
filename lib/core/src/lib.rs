//! # synergx Core
//!
//! Core library for the synergx matching and synergy-analysis engine.
//!
//! This crate provides the data model and the first pipeline stage:
//!
//! - [`CompanyProfile`] - structured attribute record for one organization
//! - [`Taxonomy`] - versioned industry taxonomy with value-chain adjacency
//! - [`FeatureVector`] - fixed-schema numeric representation with presence mask
//! - [`CatalogSnapshot`] - immutable, versioned candidate catalog
//! - [`Vectorizer`] - profile-to-vector conversion with a coalescing cache
//!
//! ## Example
//!
//! ```rust
//! use synergx_core::{CatalogSnapshot, CompanyProfile, Provenance, Taxonomy, Vectorizer};
//! use std::sync::Arc;
//!
//! let taxonomy = Arc::new(
//!     Taxonomy::builder(1)
//!         .sector("fintech")
//!         .code("fintech-payments", "fintech")
//!         .business_model("saas")
//!         .build()
//!         .unwrap(),
//! );
//!
//! let candidate = CompanyProfile::new("acme", "Acme Corp", Provenance::MarketData)
//!     .with_industry("fintech-payments")
//!     .with_revenue(12_000_000.0);
//! let snapshot = CatalogSnapshot::build(1, chrono::Utc::now(), vec![(candidate.clone(), None)]);
//!
//! let vectorizer = Vectorizer::new(taxonomy, &snapshot);
//! let vector = vectorizer.vectorize(&candidate).unwrap();
//! assert!(vector.coverage() > 0.0);
//! ```

pub mod catalog;
pub mod error;
pub mod profile;
pub mod taxonomy;
pub mod vector;
pub mod vectorizer;

pub use catalog::{CatalogEntry, CatalogPolicy, CatalogSnapshot, CatalogStats, ReferenceStats};
pub use error::{Error, Result};
pub use profile::{CompanyProfile, FinancialMetrics, ProfileId, Provenance};
pub use taxonomy::{ChainRelation, ChainSpec, CodeSpec, ResolvedIndustry, Taxonomy, TaxonomyBuilder, TaxonomySpec};
pub use vector::{jaccard, DimensionGroup, FeatureVector, SchemaVersion, VectorLayout};
pub use vectorizer::Vectorizer;
