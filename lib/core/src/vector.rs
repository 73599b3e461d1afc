use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;

use crate::profile::ProfileId;

/// Version pair a feature vector was built under. Vectors disagreeing on
/// either component are never comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Taxonomy version (fixes the one-hot layout).
    pub taxonomy: u32,
    /// Catalog snapshot version (fixes the normalization reference).
    pub reference: u64,
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.taxonomy, self.reference)
    }
}

/// Dimension ranges of the scalar part of a feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorLayout {
    pub sector: Range<usize>,
    pub code: Range<usize>,
    pub business_model: Range<usize>,
    pub size: Range<usize>,
}

/// The five weighted dimension groups of a pair comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DimensionGroup {
    Industry,
    BusinessModel,
    Geography,
    Size,
    StrategicAlignment,
}

impl DimensionGroup {
    pub const ALL: [DimensionGroup; 5] = [
        DimensionGroup::Industry,
        DimensionGroup::BusinessModel,
        DimensionGroup::Geography,
        DimensionGroup::Size,
        DimensionGroup::StrategicAlignment,
    ];
}

impl std::fmt::Display for DimensionGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DimensionGroup::Industry => "industry",
            DimensionGroup::BusinessModel => "business-model",
            DimensionGroup::Geography => "geography",
            DimensionGroup::Size => "size",
            DimensionGroup::StrategicAlignment => "strategic-alignment",
        };
        write!(f, "{}", name)
    }
}

/// Fixed-schema numeric representation of one profile.
///
/// Scalar dimensions (one-hot industry/business-model blocks plus two
/// normalized size dimensions) carry a parallel presence mask recording
/// which dimensions were actually derivable from source data. Set-valued
/// attributes are retained as sets, not collapsed into scalars; `None`
/// means the attribute was unknown rather than empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    profile_id: ProfileId,
    name: String,
    schema_version: SchemaVersion,
    values: Vec<f32>,
    mask: Vec<bool>,
    layout: VectorLayout,
    sector: Option<usize>,
    code: Option<usize>,
    business_model: Option<usize>,
    geo_markets: Option<BTreeSet<String>>,
    strategic_tags: Option<BTreeSet<String>>,
}

#[allow(clippy::too_many_arguments)]
impl FeatureVector {
    pub(crate) fn new(
        profile_id: ProfileId,
        name: String,
        schema_version: SchemaVersion,
        values: Vec<f32>,
        mask: Vec<bool>,
        layout: VectorLayout,
        sector: Option<usize>,
        code: Option<usize>,
        business_model: Option<usize>,
        geo_markets: Option<BTreeSet<String>>,
        strategic_tags: Option<BTreeSet<String>>,
    ) -> Self {
        debug_assert_eq!(values.len(), mask.len());
        Self {
            profile_id,
            name,
            schema_version,
            values,
            mask,
            layout,
            sector,
            code,
            business_model,
            geo_markets,
            strategic_tags,
        }
    }

    #[inline]
    #[must_use]
    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn layout(&self) -> &VectorLayout {
        &self.layout
    }

    #[inline]
    pub fn sector(&self) -> Option<usize> {
        self.sector
    }

    #[inline]
    pub fn code(&self) -> Option<usize> {
        self.code
    }

    #[inline]
    pub fn business_model(&self) -> Option<usize> {
        self.business_model
    }

    #[inline]
    pub fn geo_markets(&self) -> Option<&BTreeSet<String>> {
        self.geo_markets.as_ref()
    }

    #[inline]
    pub fn strategic_tags(&self) -> Option<&BTreeSet<String>> {
        self.strategic_tags.as_ref()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Fraction of dimensions (scalar dims plus the two set attributes)
    /// actually derived from source data.
    pub fn coverage(&self) -> f32 {
        let present = self.mask.iter().filter(|m| **m).count()
            + usize::from(self.geo_markets.is_some())
            + usize::from(self.strategic_tags.is_some());
        present as f32 / (self.mask.len() + 2) as f32
    }

    /// Cosine similarity over the given dimension range, restricted to
    /// dimensions present in both vectors. `None` when no dimension in the
    /// range is present on both sides.
    pub fn masked_cosine(&self, other: &FeatureVector, range: &Range<usize>) -> Option<f32> {
        let mut dot = 0.0f32;
        let mut norm_a = 0.0f32;
        let mut norm_b = 0.0f32;
        let mut any = false;
        for i in range.clone() {
            if self.mask[i] && other.mask[i] {
                any = true;
                let (a, b) = (self.values[i], other.values[i]);
                dot += a * b;
                norm_a += a * a;
                norm_b += b * b;
            }
        }
        if !any {
            return None;
        }
        if norm_a == 0.0 || norm_b == 0.0 {
            return Some(0.0);
        }
        Some((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0))
    }

    /// Bounded absolute similarity (mean of `1 - |a - b|`) over dimensions
    /// present in both vectors. Values are expected in `[0, 1]`, which holds
    /// for the min-max normalized size block.
    pub fn masked_absolute(&self, other: &FeatureVector, range: &Range<usize>) -> Option<f32> {
        let mut sum = 0.0f32;
        let mut count = 0usize;
        for i in range.clone() {
            if self.mask[i] && other.mask[i] {
                sum += 1.0 - (self.values[i] - other.values[i]).abs();
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some((sum / count as f32).clamp(0.0, 1.0))
        }
    }
}

/// Jaccard overlap of two sets. Two empty sets count as identical.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> VectorLayout {
        VectorLayout {
            sector: 0..2,
            code: 2..4,
            business_model: 4..6,
            size: 6..8,
        }
    }

    fn vector(values: Vec<f32>, mask: Vec<bool>) -> FeatureVector {
        FeatureVector::new(
            ProfileId::from("p"),
            "P".to_string(),
            SchemaVersion {
                taxonomy: 1,
                reference: 1,
            },
            values,
            mask,
            layout(),
            Some(0),
            None,
            None,
            None,
            None,
        )
    }

    #[test]
    fn test_masked_cosine_identical_block() {
        let a = vector(vec![1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.5, 0.5], vec![true; 8]);
        let b = a.clone();
        let sim = a.masked_cosine(&b, &(0..4)).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_masked_cosine_skips_absent_dims() {
        let mut mask_a = vec![true; 8];
        mask_a[2] = false;
        mask_a[3] = false;
        let a = vector(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], mask_a);
        let b = vector(vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0], vec![true; 8]);
        // Code block absent on `a`, so only the sector block is compared.
        let sim = a.masked_cosine(&b, &(0..4)).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_masked_cosine_no_common_dims() {
        let a = vector(vec![0.0; 8], vec![false; 8]);
        let b = vector(vec![0.0; 8], vec![true; 8]);
        assert_eq!(a.masked_cosine(&b, &(0..4)), None);
    }

    #[test]
    fn test_masked_cosine_is_symmetric() {
        let a = vector(vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.2, 0.9], vec![true; 8]);
        let b = vector(vec![0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.7, 0.1], vec![true; 8]);
        let ab = a.masked_cosine(&b, &(0..6)).unwrap();
        let ba = b.masked_cosine(&a, &(0..6)).unwrap();
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn test_masked_absolute_distinguishes_magnitudes() {
        let a = vector(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1, 0.1], vec![true; 8]);
        let b = vector(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.9, 0.9], vec![true; 8]);
        let sim = a.masked_absolute(&b, &(6..8)).unwrap();
        assert!((sim - 0.2).abs() < 1e-6);
        // Cosine over the same block would have been 1.0 - the reason this
        // block uses absolute similarity.
    }

    #[test]
    fn test_coverage_counts_sets() {
        let full = FeatureVector::new(
            ProfileId::from("p"),
            "P".into(),
            SchemaVersion {
                taxonomy: 1,
                reference: 1,
            },
            vec![1.0; 8],
            vec![true; 8],
            layout(),
            Some(0),
            None,
            None,
            Some(BTreeSet::from(["us".to_string()])),
            Some(BTreeSet::from(["growth".to_string()])),
        );
        assert!((full.coverage() - 1.0).abs() < 1e-6);

        let sparse = vector(vec![0.0; 8], vec![false; 8]);
        assert!(sparse.coverage() < 0.01);
    }

    #[test]
    fn test_jaccard() {
        let us: BTreeSet<String> = BTreeSet::from(["us".to_string()]);
        let us_eu: BTreeSet<String> = BTreeSet::from(["us".to_string(), "eu".to_string()]);
        assert!((jaccard(&us, &us_eu) - 0.5).abs() < 1e-6);
        assert!((jaccard(&us, &us) - 1.0).abs() < 1e-6);
        let disjoint: BTreeSet<String> = BTreeSet::from(["apac".to_string()]);
        assert_eq!(jaccard(&us, &disjoint), 0.0);
    }
}
