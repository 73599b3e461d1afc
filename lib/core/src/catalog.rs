//! Immutable candidate-catalog snapshots.
//!
//! A ranking run always scores against one consistent snapshot. The snapshot
//! also fixes the reference distribution used to normalize numeric profile
//! fields, which is why its version is part of [`SchemaVersion`].
//!
//! [`SchemaVersion`]: crate::vector::SchemaVersion

use crate::error::{Error, Result};
use crate::profile::{CompanyProfile, FinancialMetrics, ProfileId};
use ahash::AHashMap;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One catalog row: a profile plus whatever financials the market-data
/// collaborator could supply for it.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub profile: Arc<CompanyProfile>,
    pub financials: Option<FinancialMetrics>,
}

/// Staleness policy for catalog snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogPolicy {
    /// A snapshot older than this is refused.
    pub max_age_hours: i64,
    /// Minimum number of candidates required to score at all.
    pub min_candidates: usize,
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        Self {
            max_age_hours: 168,
            min_candidates: 1,
        }
    }
}

impl CatalogPolicy {
    pub fn max_age(&self) -> Duration {
        Duration::hours(self.max_age_hours)
    }
}

/// Reference distribution of the catalog, used to min-max normalize
/// log-scaled numeric fields so large companies cannot dominate the scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStats {
    revenue_log_min: f64,
    revenue_log_max: f64,
    employees_log_min: f64,
    employees_log_max: f64,
}

impl ReferenceStats {
    fn from_entries(entries: &[CatalogEntry]) -> Self {
        let revenues: Vec<f64> = entries
            .iter()
            .filter_map(|e| e.profile.sanitized_revenue())
            .map(|r| (1.0 + r).ln())
            .collect();
        let employees: Vec<f64> = entries
            .iter()
            .filter_map(|e| e.profile.employee_count)
            .map(|c| (1.0 + c as f64).ln())
            .collect();
        let bounds = |values: &[f64]| {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if values.is_empty() {
                (0.0, 0.0)
            } else {
                (min, max)
            }
        };
        let (revenue_log_min, revenue_log_max) = bounds(&revenues);
        let (employees_log_min, employees_log_max) = bounds(&employees);
        Self {
            revenue_log_min,
            revenue_log_max,
            employees_log_min,
            employees_log_max,
        }
    }

    /// Log-scale and min-max normalize a revenue figure into `[0, 1]`.
    /// A degenerate reference (single-valued or empty) maps to the midpoint.
    pub fn normalize_revenue(&self, revenue: f64) -> f32 {
        normalize_log(revenue, self.revenue_log_min, self.revenue_log_max)
    }

    /// Log-scale and min-max normalize an employee count into `[0, 1]`.
    pub fn normalize_employees(&self, count: u64) -> f32 {
        normalize_log(count as f64, self.employees_log_min, self.employees_log_max)
    }
}

fn normalize_log(value: f64, log_min: f64, log_max: f64) -> f32 {
    let log = (1.0 + value.max(0.0)).ln();
    if log_max > log_min {
        (((log - log_min) / (log_max - log_min)).clamp(0.0, 1.0)) as f32
    } else {
        0.5
    }
}

/// Summary statistics over a snapshot, for the reporting layer.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub companies: usize,
    pub with_financials: usize,
    pub revenue_min: Option<f64>,
    pub revenue_mean: Option<f64>,
    pub revenue_max: Option<f64>,
    pub industries: BTreeMap<String, usize>,
}

/// An immutable, versioned view of the candidate catalog.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    version: u64,
    taken_at: DateTime<Utc>,
    entries: Vec<CatalogEntry>,
    by_id: AHashMap<ProfileId, usize>,
    reference: ReferenceStats,
}

impl CatalogSnapshot {
    pub fn build(
        version: u64,
        taken_at: DateTime<Utc>,
        rows: Vec<(CompanyProfile, Option<FinancialMetrics>)>,
    ) -> Self {
        let entries: Vec<CatalogEntry> = rows
            .into_iter()
            .map(|(profile, financials)| CatalogEntry {
                profile: Arc::new(profile),
                financials,
            })
            .collect();
        let by_id = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.profile.id.clone(), i))
            .collect();
        let reference = ReferenceStats::from_entries(&entries);
        Self {
            version,
            taken_at,
            entries,
            by_id,
            reference,
        }
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: &ProfileId) -> Option<&CatalogEntry> {
        self.by_id.get(id).map(|&i| &self.entries[i])
    }

    pub fn financials(&self, id: &ProfileId) -> Option<&FinancialMetrics> {
        self.get(id).and_then(|e| e.financials.as_ref())
    }

    pub fn reference(&self) -> &ReferenceStats {
        &self.reference
    }

    /// Refuse to score against an empty or stale snapshot.
    pub fn ensure_usable(&self, policy: &CatalogPolicy, now: DateTime<Utc>) -> Result<()> {
        if self.entries.len() < policy.min_candidates {
            return Err(Error::CatalogUnavailable {
                reason: format!(
                    "snapshot v{} holds {} candidates, policy requires {}",
                    self.version,
                    self.entries.len(),
                    policy.min_candidates
                ),
            });
        }
        let age = now - self.taken_at;
        if age > policy.max_age() {
            return Err(Error::CatalogUnavailable {
                reason: format!(
                    "snapshot v{} is {}h old, policy allows {}h",
                    self.version,
                    age.num_hours(),
                    policy.max_age_hours
                ),
            });
        }
        Ok(())
    }

    pub fn stats(&self) -> CatalogStats {
        let revenues: Vec<f64> = self
            .entries
            .iter()
            .filter_map(|e| e.profile.sanitized_revenue())
            .collect();
        let mut industries = BTreeMap::new();
        for entry in &self.entries {
            if let Some(industry) = &entry.profile.industry {
                *industries.entry(industry.clone()).or_insert(0) += 1;
            }
        }
        CatalogStats {
            companies: self.entries.len(),
            with_financials: self.entries.iter().filter(|e| e.financials.is_some()).count(),
            revenue_min: revenues.iter().copied().reduce(f64::min),
            revenue_mean: if revenues.is_empty() {
                None
            } else {
                Some(revenues.iter().sum::<f64>() / revenues.len() as f64)
            },
            revenue_max: revenues.iter().copied().reduce(f64::max),
            industries,
        }
    }
}
