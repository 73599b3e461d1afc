//! Pairwise similarity scoring.
//!
//! Each dimension group is compared with the comparison its shape calls for:
//! masked cosine over the one-hot industry and business-model blocks,
//! bounded absolute similarity over the normalized size block, and Jaccard
//! overlap for the set-valued groups. Groups with no commonly-present data
//! are excluded and the weight mass renormalized, so missing data never
//! silently penalizes a pair.

use crate::config::MatchWeights;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use synergx_core::{jaccard, DimensionGroup, Error, FeatureVector, Result};

/// Similarity of one dimension group, with the (normalized) weight it
/// carried in the blend. Kept on every match for explainability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupScore {
    pub group: DimensionGroup,
    pub similarity: f32,
    pub weight: f32,
}

/// Result of scoring one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairScore {
    /// Renormalized weighted blend of the contributing groups, in `[0, 1]`.
    pub score: f32,
    /// Mean presence-mask coverage of the two vectors.
    pub coverage: f32,
    pub breakdown: SmallVec<[GroupScore; 5]>,
}

/// Score a pair of feature vectors. Symmetric in its arguments.
pub fn score_pair(
    weights: &MatchWeights,
    a: &FeatureVector,
    b: &FeatureVector,
) -> Result<PairScore> {
    if a.schema_version() != b.schema_version() {
        return Err(Error::DimensionMismatch {
            left: a.schema_version(),
            right: b.schema_version(),
        });
    }

    let layout = a.layout();
    let industry_range = layout.sector.start..layout.code.end;
    let mut breakdown: SmallVec<[GroupScore; 5]> = SmallVec::new();
    let mut weighted = 0.0f32;
    let mut mass = 0.0f32;

    let mut blend = |group: DimensionGroup, similarity: Option<f32>| {
        if let Some(similarity) = similarity {
            let weight = weights.get(group);
            weighted += weight * similarity;
            mass += weight;
            breakdown.push(GroupScore {
                group,
                similarity,
                weight,
            });
        }
    };

    blend(DimensionGroup::Industry, a.masked_cosine(b, &industry_range));
    blend(
        DimensionGroup::BusinessModel,
        a.masked_cosine(b, &layout.business_model),
    );
    blend(
        DimensionGroup::Geography,
        a.geo_markets()
            .zip(b.geo_markets())
            .map(|(x, y)| jaccard(x, y)),
    );
    blend(DimensionGroup::Size, a.masked_absolute(b, &layout.size));
    blend(
        DimensionGroup::StrategicAlignment,
        a.strategic_tags()
            .zip(b.strategic_tags())
            .map(|(x, y)| jaccard(x, y)),
    );

    let score = if mass > 0.0 {
        (weighted / mass).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Ok(PairScore {
        score,
        coverage: (a.coverage() + b.coverage()) / 2.0,
        breakdown,
    })
}
