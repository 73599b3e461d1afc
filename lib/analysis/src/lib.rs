//! # synergx Analysis
//!
//! Synergy prediction, ranking and report assembly on top of the synergx
//! similarity engine.
//!
//! - [`SynergyPredictor`] turns classified matches plus financial metrics
//!   into bounded, explainable [`SynergyEstimate`]s
//! - [`rank_matches`] orders and filters (match, estimate) pairs into a
//!   deterministic total order
//! - [`Analyzer`] runs the whole pipeline for one subject against one
//!   catalog snapshot and assembles the [`RankedReport`]
//!
//! Every exported result carries its full explainability payload: per-group
//! score breakdown, itemized value drivers, risk factors and estimate
//! quality.

pub mod explain;
pub mod policy;
pub mod predict;
pub mod rank;
pub mod report;

pub use explain::{
    Direction, DriverKind, EstimateQuality, RiskFactor, RiskSeverity, SynergyEstimate, ValueDriver,
};
pub use policy::{PolicyError, SynergyPolicy};
pub use predict::SynergyPredictor;
pub use rank::{feature_importance, rank_matches, GroupImportance, MatchFilter, RankedMatch};
pub use report::{Analyzer, RankedReport};
