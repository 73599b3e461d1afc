//! # synergx Similarity
//!
//! The similarity engine for synergx: scores and classifies candidate pairs
//! from their feature vectors.
//!
//! ## Features
//!
//! - **Explicit configuration**: every weight and threshold lives in
//!   [`EngineConfig`], swappable without touching the algorithm
//! - **Masked scoring**: similarity is computed only over dimensions present
//!   in both vectors, so missing data never silently penalizes a pair
//! - **Classification**: horizontal / vertical / unrelated, driven by
//!   taxonomy distance and value-chain adjacency
//! - **Parallel runs**: bounded rayon pool over an immutable snapshot, with
//!   per-item failure isolation and cooperative deadlines
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ FeatureVector│────>│  score_pair  │────>│MatchCandidate│
//! │   (+ mask)   │     │  + classify  │     │ (+ breakdown)│
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             │
//!                      ┌──────────────┐
//!                      │ score_catalog│  (parallel, deadline-aware)
//!                      └──────────────┘
//! ```

pub mod classify;
pub mod config;
pub mod engine;
pub mod score;

pub use classify::{classify, Classification, MatchType};
pub use config::{ClassifyThresholds, ConfigError, EngineConfig, MatchWeights};
pub use engine::{MatchCandidate, MatchEngine, RunOptions, RunOutcome, SkippedCandidate};
pub use score::{score_pair, GroupScore, PairScore};
