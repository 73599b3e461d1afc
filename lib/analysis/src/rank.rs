//! Ranking and filtering.
//!
//! Produces a deterministic total order over (match, estimate) pairs:
//! match score descending, then risk-adjusted value, then the coverage /
//! name / id tie-break. Re-running on unchanged inputs reproduces the
//! identical ordering.

use crate::explain::SynergyEstimate;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use synergx_core::DimensionGroup;
use synergx_similarity::{MatchCandidate, MatchType};

/// One ranked result: the match, its synergy estimate, and the candidate's
/// resolved sector for display/filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    #[serde(flatten)]
    pub candidate: MatchCandidate,
    pub estimate: SynergyEstimate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

/// Filter configuration for a ranking run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchFilter {
    pub min_match_score: f32,
    pub min_confidence: f32,
    /// Keep only these match types; `None` keeps all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_types: Option<Vec<MatchType>>,
    /// Keep only candidates resolved to this sector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
}

impl Default for MatchFilter {
    fn default() -> Self {
        Self {
            min_match_score: 0.3,
            min_confidence: 0.0,
            match_types: None,
            sector: None,
            max_results: Some(50),
        }
    }
}

impl MatchFilter {
    /// A filter that keeps everything, for diagnostics and tests.
    pub fn permissive() -> Self {
        Self {
            min_match_score: 0.0,
            min_confidence: 0.0,
            match_types: None,
            sector: None,
            max_results: None,
        }
    }

    fn keeps(&self, item: &RankedMatch) -> bool {
        if item.candidate.match_score < self.min_match_score {
            return false;
        }
        if item.estimate.confidence_score < self.min_confidence {
            return false;
        }
        if let Some(types) = &self.match_types {
            if !types.contains(&item.candidate.match_type) {
                return false;
            }
        }
        if let Some(sector) = &self.sector {
            let matches_sector = item
                .sector
                .as_deref()
                .map(|s| s.eq_ignore_ascii_case(sector))
                .unwrap_or(false);
            if !matches_sector {
                return false;
            }
        }
        true
    }
}

fn compare(a: &RankedMatch, b: &RankedMatch, epsilon: f32) -> Ordering {
    let (sa, sb) = (a.candidate.match_score, b.candidate.match_score);
    if (sa - sb).abs() > epsilon {
        return OrderedFloat(sb).cmp(&OrderedFloat(sa));
    }
    // Qualitative estimates sort below any quantitative value.
    let value = |m: &RankedMatch| m.estimate.risk_adjusted_value.unwrap_or(f64::NEG_INFINITY);
    let (va, vb) = (value(a), value(b));
    if va != vb {
        return OrderedFloat(vb).cmp(&OrderedFloat(va));
    }
    OrderedFloat(b.candidate.coverage)
        .cmp(&OrderedFloat(a.candidate.coverage))
        .then_with(|| a.candidate.candidate_name.cmp(&b.candidate.candidate_name))
        .then_with(|| a.candidate.candidate_id.cmp(&b.candidate.candidate_id))
}

/// Filter, order and truncate results. Idempotent for unchanged inputs.
pub fn rank_matches(
    mut items: Vec<RankedMatch>,
    filter: &MatchFilter,
    epsilon: f32,
) -> Vec<RankedMatch> {
    items.retain(|item| filter.keeps(item));
    items.sort_by(|a, b| compare(a, b, epsilon));
    if let Some(max) = filter.max_results {
        items.truncate(max);
    }
    items
}

/// Relative importance of each dimension group across a result set:
/// absolute correlation of the group's similarity with the final scores,
/// normalized to sum 1. `None` below two results. An equal split is
/// reported when no group correlates at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupImportance {
    pub group: DimensionGroup,
    pub importance: f32,
}

pub fn feature_importance(items: &[RankedMatch]) -> Option<Vec<GroupImportance>> {
    if items.len() < 2 {
        return None;
    }
    let scores: Vec<f32> = items.iter().map(|m| m.candidate.match_score).collect();
    let mut correlations = Vec::with_capacity(DimensionGroup::ALL.len());
    for group in DimensionGroup::ALL {
        let sims: Vec<f32> = items
            .iter()
            .map(|m| {
                m.candidate
                    .breakdown
                    .iter()
                    .find(|g| g.group == group)
                    .map(|g| g.similarity)
                    .unwrap_or(0.0)
            })
            .collect();
        correlations.push((group, correlation(&sims, &scores).abs()));
    }
    let total: f32 = correlations.iter().map(|(_, c)| c).sum();
    let result = correlations
        .into_iter()
        .map(|(group, c)| GroupImportance {
            group,
            importance: if total > 0.0 {
                c / total
            } else {
                1.0 / DimensionGroup::ALL.len() as f32
            },
        })
        .collect();
    Some(result)
}

fn correlation(xs: &[f32], ys: &[f32]) -> f32 {
    let n = xs.len() as f32;
    let mean_x = xs.iter().sum::<f32>() / n;
    let mean_y = ys.iter().sum::<f32>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    let denom = (var_x * var_y).sqrt();
    if denom > 0.0 {
        cov / denom
    } else {
        0.0
    }
}
