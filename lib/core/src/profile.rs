use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Identifier of a company profile.
///
/// Collaborator records arrive with string keys, UUIDs, or plain integers
/// depending on the source system, so all three shapes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileId {
    String(String),
    Uuid(Uuid),
    Integer(u64),
}

impl ProfileId {
    /// Generate a fresh random identifier for records that arrive without one.
    #[must_use]
    pub fn generate() -> Self {
        ProfileId::Uuid(Uuid::new_v4())
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileId::String(s) => write!(f, "{}", s),
            ProfileId::Uuid(u) => write!(f, "{}", u),
            ProfileId::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for ProfileId {
    fn from(s: String) -> Self {
        ProfileId::String(s)
    }
}

impl From<&str> for ProfileId {
    fn from(s: &str) -> Self {
        ProfileId::String(s.to_string())
    }
}

impl From<u64> for ProfileId {
    fn from(i: u64) -> Self {
        ProfileId::Integer(i)
    }
}

impl From<Uuid> for ProfileId {
    fn from(u: Uuid) -> Self {
        ProfileId::Uuid(u)
    }
}

/// Where a profile's attributes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Extracted from uploaded documents by the feature-extraction collaborator.
    DocumentDerived,
    /// Fetched from the market-data collaborator.
    MarketData,
}

/// Structured attribute record for one organization.
///
/// Profiles are immutable once committed: a re-ingestion produces a new
/// record with a bumped `revision`, never an in-place edit. All fields other
/// than `id`, `name` and `provenance` are optional because collaborator
/// extraction is best-effort; the vectorizer decides whether enough survives
/// to make the profile matchable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: ProfileId,
    pub name: String,
    /// Hierarchical industry code, e.g. `"fintech-payments"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_model: Option<String>,
    /// Annual revenue in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u64>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub geographic_markets: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub strategic_objectives: BTreeSet<String>,
    pub provenance: Provenance,
    /// Taxonomy version the record was ingested under.
    #[serde(default = "default_taxonomy_version")]
    pub taxonomy_version: u32,
    /// Bumped on every re-ingestion of the same organization.
    #[serde(default)]
    pub revision: u32,
}

fn default_taxonomy_version() -> u32 {
    1
}

impl CompanyProfile {
    pub fn new(id: impl Into<ProfileId>, name: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            industry: None,
            business_model: None,
            revenue: None,
            employee_count: None,
            geographic_markets: BTreeSet::new(),
            strategic_objectives: BTreeSet::new(),
            provenance,
            taxonomy_version: 1,
            revision: 0,
        }
    }

    #[must_use]
    pub fn with_industry(mut self, code: impl Into<String>) -> Self {
        self.industry = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_business_model(mut self, model: impl Into<String>) -> Self {
        self.business_model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_revenue(mut self, revenue: f64) -> Self {
        self.revenue = Some(revenue);
        self
    }

    #[must_use]
    pub fn with_employee_count(mut self, count: u64) -> Self {
        self.employee_count = Some(count);
        self
    }

    #[must_use]
    pub fn with_markets<I, S>(mut self, markets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.geographic_markets = markets.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_objectives<I, S>(mut self, objectives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strategic_objectives = objectives.into_iter().map(Into::into).collect();
        self
    }

    /// Revenue after boundary sanitation: collaborator input is untrusted,
    /// so non-finite or negative values are treated as absent.
    pub fn sanitized_revenue(&self) -> Option<f64> {
        self.revenue.filter(|r| r.is_finite() && *r >= 0.0)
    }

    /// Start a re-ingested copy of this profile with the next revision.
    #[must_use]
    pub fn next_revision(&self) -> Self {
        let mut copy = self.clone();
        copy.revision += 1;
        copy
    }
}

/// Financial metrics for one party, supplied by the market-data collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancialMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_cost: Option<f64>,
    /// Gross margin as a fraction in (0, 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_margin: Option<f64>,
}

impl FinancialMetrics {
    pub fn from_revenue(revenue: f64) -> Self {
        Self {
            revenue: Some(revenue),
            operating_cost: None,
            gross_margin: None,
        }
    }

    /// Revenue after boundary sanitation.
    pub fn sanitized_revenue(&self) -> Option<f64> {
        self.revenue.filter(|r| r.is_finite() && *r > 0.0)
    }

    /// Best available operating-cost figure: the reported cost, else revenue
    /// scaled by the reported margin, else revenue scaled by a default ratio.
    pub fn operating_cost_estimate(&self, default_cost_ratio: f64) -> Option<f64> {
        if let Some(cost) = self.operating_cost.filter(|c| c.is_finite() && *c >= 0.0) {
            return Some(cost);
        }
        let revenue = self.sanitized_revenue()?;
        let ratio = match self.gross_margin.filter(|m| m.is_finite() && (0.0..1.0).contains(m)) {
            Some(margin) => 1.0 - margin,
            None => default_cost_ratio,
        };
        Some(revenue * ratio)
    }
}
