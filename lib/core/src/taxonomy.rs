//! Versioned industry taxonomy.
//!
//! The taxonomy fixes the one-hot layout of feature vectors: sectors and
//! industry codes occupy stable positions for a given version, so vectors
//! built under different versions are never comparable. It also carries the
//! value-chain adjacency table used to classify vertical matches.

use crate::error::{Error, Result};
use crate::vector::VectorLayout;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Position of one party in a value chain relative to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainRelation {
    /// The first party supplies the second.
    Upstream,
    /// The first party is supplied by the second.
    Downstream,
}

/// An industry code resolved against the taxonomy.
///
/// `code` is `None` when the exact code was unknown and the resolution fell
/// back to a parent sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedIndustry {
    pub sector: usize,
    pub code: Option<usize>,
}

/// Immutable, versioned registry of sectors, industry codes, business models
/// and value-chain adjacencies.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    version: u32,
    sectors: Vec<String>,
    sector_index: AHashMap<String, usize>,
    codes: Vec<String>,
    code_index: AHashMap<String, usize>,
    code_sector: Vec<usize>,
    business_models: Vec<String>,
    business_model_index: AHashMap<String, usize>,
    fallback_sector: usize,
    value_chain: AHashMap<(usize, usize), ChainRelation>,
}

impl Taxonomy {
    pub fn builder(version: u32) -> TaxonomyBuilder {
        TaxonomyBuilder::new(version)
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    #[inline]
    pub fn code_count(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    pub fn business_model_count(&self) -> usize {
        self.business_models.len()
    }

    pub fn sector_name(&self, index: usize) -> &str {
        &self.sectors[index]
    }

    pub fn sector_named(&self, name: &str) -> Option<usize> {
        self.sector_index.get(&normalize(name)).copied()
    }

    /// The catch-all sector substituted when no parent of a code is known.
    pub fn fallback(&self) -> ResolvedIndustry {
        ResolvedIndustry {
            sector: self.fallback_sector,
            code: None,
        }
    }

    /// Resolve a hierarchical industry code.
    ///
    /// Tries the exact code first, then the sector of the same name, then
    /// each `-`-delimited parent prefix. An exact hit yields a code index;
    /// every fallback yields only a sector.
    pub fn resolve_industry(&self, code: &str) -> Result<ResolvedIndustry> {
        let normalized = normalize(code);
        if let Some(&ci) = self.code_index.get(&normalized) {
            return Ok(ResolvedIndustry {
                sector: self.code_sector[ci],
                code: Some(ci),
            });
        }
        if let Some(&si) = self.sector_index.get(&normalized) {
            return Ok(ResolvedIndustry {
                sector: si,
                code: None,
            });
        }
        let mut prefix = normalized.as_str();
        while let Some(pos) = prefix.rfind('-') {
            prefix = &prefix[..pos];
            if let Some(&ci) = self.code_index.get(prefix) {
                return Ok(ResolvedIndustry {
                    sector: self.code_sector[ci],
                    code: None,
                });
            }
            if let Some(&si) = self.sector_index.get(prefix) {
                return Ok(ResolvedIndustry {
                    sector: si,
                    code: None,
                });
            }
        }
        Err(Error::UnrecognizedTaxonomyCode {
            code: normalized,
            version: self.version,
        })
    }

    /// Resolve a business-model descriptor; unknown models are simply absent.
    pub fn resolve_business_model(&self, model: &str) -> Option<usize> {
        self.business_model_index.get(&normalize(model)).copied()
    }

    pub fn business_model_name(&self, index: usize) -> &str {
        &self.business_models[index]
    }

    /// Value-chain relation of sector `a` relative to sector `b`.
    pub fn chain_relation(&self, a: usize, b: usize) -> Option<ChainRelation> {
        self.value_chain.get(&(a, b)).copied()
    }

    pub fn adjacent(&self, a: usize, b: usize) -> bool {
        self.value_chain.contains_key(&(a, b))
    }

    /// Vector layout for this taxonomy version: sector block, code block,
    /// business-model block, then two size dimensions.
    pub fn layout(&self) -> VectorLayout {
        let s = self.sectors.len();
        let c = self.codes.len();
        let b = self.business_models.len();
        VectorLayout {
            sector: 0..s,
            code: s..s + c,
            business_model: s + c..s + c + b,
            size: s + c + b..s + c + b + 2,
        }
    }

    pub fn dim(&self) -> usize {
        self.sectors.len() + self.codes.len() + self.business_models.len() + 2
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}

/// Builder for [`Taxonomy`].
#[derive(Debug, Clone)]
pub struct TaxonomyBuilder {
    version: u32,
    sectors: Vec<String>,
    codes: Vec<(String, String)>,
    business_models: Vec<String>,
    adjacency: Vec<(String, String)>,
    fallback: String,
}

impl TaxonomyBuilder {
    fn new(version: u32) -> Self {
        Self {
            version,
            sectors: Vec::new(),
            codes: Vec::new(),
            business_models: Vec::new(),
            adjacency: Vec::new(),
            fallback: "other".to_string(),
        }
    }

    #[must_use]
    pub fn sector(mut self, name: impl Into<String>) -> Self {
        self.sectors.push(normalize(&name.into()));
        self
    }

    /// Register an industry code under a sector.
    #[must_use]
    pub fn code(mut self, code: impl Into<String>, sector: impl Into<String>) -> Self {
        self.codes
            .push((normalize(&code.into()), normalize(&sector.into())));
        self
    }

    #[must_use]
    pub fn business_model(mut self, name: impl Into<String>) -> Self {
        self.business_models.push(normalize(&name.into()));
        self
    }

    /// Declare `upstream` as a supplier sector of `downstream`.
    #[must_use]
    pub fn upstream_of(mut self, upstream: impl Into<String>, downstream: impl Into<String>) -> Self {
        self.adjacency
            .push((normalize(&upstream.into()), normalize(&downstream.into())));
        self
    }

    /// Override the catch-all sector name (default `"other"`).
    #[must_use]
    pub fn fallback_sector(mut self, name: impl Into<String>) -> Self {
        self.fallback = normalize(&name.into());
        self
    }

    pub fn build(mut self) -> Result<Taxonomy> {
        if !self.sectors.contains(&self.fallback) {
            self.sectors.push(self.fallback.clone());
        }

        let mut sectors = Vec::new();
        let mut sector_index = AHashMap::new();
        for name in self.sectors {
            if !sector_index.contains_key(&name) {
                sector_index.insert(name.clone(), sectors.len());
                sectors.push(name);
            }
        }

        let mut codes = Vec::new();
        let mut code_index = AHashMap::new();
        let mut code_sector = Vec::new();
        for (code, sector) in self.codes {
            let &si = sector_index.get(&sector).ok_or_else(|| {
                Error::InvalidConfig(format!("code '{}' references unknown sector '{}'", code, sector))
            })?;
            if code_index.contains_key(&code) {
                return Err(Error::InvalidConfig(format!("duplicate industry code '{}'", code)));
            }
            code_index.insert(code.clone(), codes.len());
            codes.push(code);
            code_sector.push(si);
        }

        let mut business_models = Vec::new();
        let mut business_model_index = AHashMap::new();
        for name in self.business_models {
            if !business_model_index.contains_key(&name) {
                business_model_index.insert(name.clone(), business_models.len());
                business_models.push(name);
            }
        }

        let mut value_chain = AHashMap::new();
        for (up, down) in self.adjacency {
            let &ui = sector_index.get(&up).ok_or_else(|| {
                Error::InvalidConfig(format!("value chain references unknown sector '{}'", up))
            })?;
            let &di = sector_index.get(&down).ok_or_else(|| {
                Error::InvalidConfig(format!("value chain references unknown sector '{}'", down))
            })?;
            value_chain.insert((ui, di), ChainRelation::Upstream);
            value_chain.insert((di, ui), ChainRelation::Downstream);
        }

        let fallback_sector = sector_index[&self.fallback];

        Ok(Taxonomy {
            version: self.version,
            sectors,
            sector_index,
            codes,
            code_index,
            code_sector,
            business_models,
            business_model_index,
            fallback_sector,
            value_chain,
        })
    }
}

/// Serde-facing taxonomy description, the format the collaborator ships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomySpec {
    pub version: u32,
    pub sectors: Vec<String>,
    #[serde(default)]
    pub codes: Vec<CodeSpec>,
    #[serde(default)]
    pub business_models: Vec<String>,
    #[serde(default)]
    pub value_chain: Vec<ChainSpec>,
    #[serde(default = "default_fallback")]
    pub fallback_sector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSpec {
    pub code: String,
    pub sector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSpec {
    pub upstream: String,
    pub downstream: String,
}

fn default_fallback() -> String {
    "other".to_string()
}

impl TryFrom<TaxonomySpec> for Taxonomy {
    type Error = Error;

    fn try_from(spec: TaxonomySpec) -> Result<Taxonomy> {
        let mut builder = Taxonomy::builder(spec.version).fallback_sector(spec.fallback_sector);
        for sector in spec.sectors {
            builder = builder.sector(sector);
        }
        for code in spec.codes {
            builder = builder.code(code.code, code.sector);
        }
        for model in spec.business_models {
            builder = builder.business_model(model);
        }
        for chain in spec.value_chain {
            builder = builder.upstream_of(chain.upstream, chain.downstream);
        }
        builder.build()
    }
}
