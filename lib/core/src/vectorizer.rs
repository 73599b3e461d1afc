//! Profile-to-vector conversion with a coalescing cache.
//!
//! Vectorization is a pure function of (profile, taxonomy version, reference
//! distribution), which makes the result cacheable by (profile id, schema
//! version). The cache guarantees at-most-one computation per key under
//! concurrent callers: all callers for the same key coalesce onto a single
//! `OnceLock` slot and block until the one computation finishes.

use crate::catalog::{CatalogSnapshot, ReferenceStats};
use crate::error::{Error, Result};
use crate::profile::CompanyProfile;
use crate::profile::ProfileId;
use crate::taxonomy::Taxonomy;
use crate::vector::{FeatureVector, SchemaVersion};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::warn;

type CacheKey = (ProfileId, SchemaVersion);
type CacheSlot = std::result::Result<Arc<FeatureVector>, Error>;

/// Keyed vector cache with single-writer-per-key semantics.
///
/// Slots are inserted under a short write lock and initialized outside it,
/// so a slow computation never blocks unrelated keys. Invalidation removes
/// the slot; in-flight readers keep the `Arc` they already hold
/// (copy-on-write replacement, never in-place mutation).
#[derive(Default)]
struct VectorCache {
    slots: RwLock<AHashMap<CacheKey, Arc<OnceLock<CacheSlot>>>>,
}

impl VectorCache {
    fn slot(&self, key: &CacheKey) -> Arc<OnceLock<CacheSlot>> {
        if let Some(slot) = self.slots.read().get(key) {
            return slot.clone();
        }
        self.slots
            .write()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceLock::new()))
            .clone()
    }

    fn invalidate(&self, id: &ProfileId) {
        self.slots.write().retain(|(pid, _), _| pid != id);
    }

    fn invalidate_all(&self) {
        self.slots.write().clear();
    }
}

/// Converts [`CompanyProfile`] records into [`FeatureVector`]s.
pub struct Vectorizer {
    taxonomy: Arc<Taxonomy>,
    reference: ReferenceStats,
    schema_version: SchemaVersion,
    cache: VectorCache,
    computed: AtomicU64,
}

impl Vectorizer {
    /// Build a vectorizer bound to one taxonomy and one catalog snapshot.
    /// The snapshot supplies the normalization reference, so its version is
    /// folded into the schema version.
    pub fn new(taxonomy: Arc<Taxonomy>, snapshot: &CatalogSnapshot) -> Self {
        let schema_version = SchemaVersion {
            taxonomy: taxonomy.version(),
            reference: snapshot.version(),
        };
        Self {
            taxonomy,
            reference: snapshot.reference().clone(),
            schema_version,
            cache: VectorCache::default(),
            computed: AtomicU64::new(0),
        }
    }

    #[inline]
    #[must_use]
    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    /// Number of vectors actually computed (cache misses). Coalesced and
    /// cached calls do not increment this.
    pub fn computed_count(&self) -> u64 {
        self.computed.load(Ordering::Relaxed)
    }

    /// Vectorize a profile, serving repeated requests from the cache.
    ///
    /// Failures are cached too: a profile that cannot be vectorized yields
    /// the same error until it is re-ingested and invalidated.
    pub fn vectorize(&self, profile: &CompanyProfile) -> Result<Arc<FeatureVector>> {
        let key = (profile.id.clone(), self.schema_version);
        let slot = self.cache.slot(&key);
        slot.get_or_init(|| {
            self.computed.fetch_add(1, Ordering::Relaxed);
            self.compute(profile).map(Arc::new)
        })
        .clone()
    }

    /// Drop cached vectors for one profile (call on re-ingestion).
    pub fn invalidate(&self, id: &ProfileId) {
        self.cache.invalidate(id);
    }

    /// Drop the whole cache (call on taxonomy or snapshot replacement).
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    fn compute(&self, profile: &CompanyProfile) -> Result<FeatureVector> {
        let industry = profile
            .industry
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let resolved = match industry {
            Some(code) => match self.taxonomy.resolve_industry(code) {
                Ok(resolved) => Some(resolved),
                Err(err @ Error::UnrecognizedTaxonomyCode { .. }) => {
                    // Recoverable: substitute the nearest known parent,
                    // which bottoms out at the catch-all sector.
                    warn!(profile = %profile.id, %err, "falling back to catch-all sector");
                    Some(self.taxonomy.fallback())
                }
                Err(err) => return Err(err),
            },
            None => None,
        };

        let business_model = profile
            .business_model
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|model| {
                let index = self.taxonomy.resolve_business_model(model);
                if index.is_none() {
                    warn!(profile = %profile.id, model, "unknown business model, treated as absent");
                }
                index
            });

        if resolved.is_none() && business_model.is_none() {
            return Err(Error::IncompleteProfile {
                id: profile.id.clone(),
            });
        }

        let layout = self.taxonomy.layout();
        let dim = self.taxonomy.dim();
        let mut values = vec![0.0f32; dim];
        let mut mask = vec![false; dim];

        if let Some(resolved) = resolved {
            values[layout.sector.start + resolved.sector] = 1.0;
            mask[layout.sector.clone()].fill(true);
            if let Some(code) = resolved.code {
                values[layout.code.start + code] = 1.0;
                mask[layout.code.clone()].fill(true);
            }
        }
        if let Some(model) = business_model {
            values[layout.business_model.start + model] = 1.0;
            mask[layout.business_model.clone()].fill(true);
        }
        if let Some(revenue) = profile.sanitized_revenue() {
            values[layout.size.start] = self.reference.normalize_revenue(revenue);
            mask[layout.size.start] = true;
        } else if profile.revenue.is_some() {
            warn!(profile = %profile.id, "revenue failed validation, treated as absent");
        }
        if let Some(count) = profile.employee_count {
            values[layout.size.start + 1] = self.reference.normalize_employees(count);
            mask[layout.size.start + 1] = true;
        }

        let geo_markets = normalized_set(&profile.geographic_markets);
        let strategic_tags = normalized_set(&profile.strategic_objectives);

        Ok(FeatureVector::new(
            profile.id.clone(),
            profile.name.clone(),
            self.schema_version,
            values,
            mask,
            layout,
            resolved.map(|r| r.sector),
            resolved.and_then(|r| r.code),
            business_model,
            geo_markets,
            strategic_tags,
        ))
    }
}

/// Lowercase/trim a set; an empty input means "unknown", not "none".
fn normalized_set(set: &BTreeSet<String>) -> Option<BTreeSet<String>> {
    if set.is_empty() {
        return None;
    }
    Some(
        set.iter()
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}
