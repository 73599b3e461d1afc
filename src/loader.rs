//! JSON loaders for collaborator-supplied records.
//!
//! This is the only module that touches the filesystem. It defines the file
//! formats the document-extraction and market-data collaborators deliver:
//! a taxonomy spec, a versioned catalog of companies with optional
//! financials, and a single subject record. Nothing here runs inside the
//! scoring path.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use synergx_core::{
    CatalogSnapshot, CompanyProfile, FinancialMetrics, Taxonomy, TaxonomySpec,
};

/// One company row in a catalog file: a profile with optional financials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(flatten)]
    pub profile: CompanyProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financials: Option<FinancialMetrics>,
}

impl CompanyRecord {
    /// Financials with the profile's own revenue as a fallback, so a
    /// catalog row without a separate financial record still quantifies.
    pub fn effective_financials(&self) -> Option<FinancialMetrics> {
        match self.financials {
            Some(financials) if financials.revenue.is_some() => Some(financials),
            Some(mut financials) => {
                financials.revenue = self.profile.sanitized_revenue();
                Some(financials)
            }
            None => self
                .profile
                .sanitized_revenue()
                .map(FinancialMetrics::from_revenue),
        }
    }
}

/// Catalog file delivered by the market-data collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<DateTime<Utc>>,
    pub companies: Vec<CompanyRecord>,
}

pub fn load_taxonomy(path: &Path) -> Result<Taxonomy> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading taxonomy file {}", path.display()))?;
    let spec: TaxonomySpec = serde_json::from_str(&raw)
        .with_context(|| format!("parsing taxonomy file {}", path.display()))?;
    Taxonomy::try_from(spec).context("building taxonomy")
}

pub fn load_catalog(path: &Path) -> Result<CatalogSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading catalog file {}", path.display()))?;
    let file: CatalogFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing catalog file {}", path.display()))?;
    let taken_at = file.taken_at.unwrap_or_else(Utc::now);
    let rows = file
        .companies
        .iter()
        .map(|record| (record.profile.clone(), record.effective_financials()))
        .collect();
    Ok(CatalogSnapshot::build(file.version, taken_at, rows))
}

pub fn load_subject(path: &Path) -> Result<(CompanyProfile, Option<FinancialMetrics>)> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading subject file {}", path.display()))?;
    let record: CompanyRecord = serde_json::from_str(&raw)
        .with_context(|| format!("parsing subject file {}", path.display()))?;
    let financials = record.effective_financials();
    Ok((record.profile, financials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use synergx_core::{ProfileId, Provenance};

    #[test]
    fn test_company_record_flattens_profile() {
        let json = r#"{
            "id": "acme",
            "name": "Acme Corp",
            "industry": "fintech-payments",
            "revenue": 2000000.0,
            "provenance": "market-data",
            "financials": {"operating_cost": 1400000.0}
        }"#;
        let record: CompanyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.profile.id, ProfileId::from("acme"));
        assert_eq!(record.profile.provenance, Provenance::MarketData);
        // Revenue backfilled from the profile into the financial record.
        let financials = record.effective_financials().unwrap();
        assert_eq!(financials.revenue, Some(2_000_000.0));
        assert_eq!(financials.operating_cost, Some(1_400_000.0));
    }

    #[test]
    fn test_record_without_any_revenue_has_no_financials() {
        let json = r#"{"id": "x", "name": "X", "provenance": "document-derived"}"#;
        let record: CompanyRecord = serde_json::from_str(json).unwrap();
        assert!(record.effective_financials().is_none());
    }
}
