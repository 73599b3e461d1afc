// Integration tests for synergx
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;
use synergx::loader;
use synergx::{
    Analyzer, CatalogSnapshot, ChainRelation, CompanyProfile, DriverKind, EngineConfig,
    EstimateQuality, FinancialMetrics, MatchEngine, MatchFilter, MatchType, MatchWeights,
    ProfileId, Provenance, RunOptions, Taxonomy, Vectorizer,
};
use synergx_similarity::score_pair;

fn taxonomy() -> Arc<Taxonomy> {
    Arc::new(
        Taxonomy::builder(1)
            .sector("fintech")
            .sector("ecommerce")
            .sector("healthcare")
            .code("fintech-payments", "fintech")
            .code("fintech-lending", "fintech")
            .code("ecommerce-platform", "ecommerce")
            .code("healthcare-clinics", "healthcare")
            .business_model("saas")
            .business_model("marketplace")
            .business_model("transaction-fees")
            .upstream_of("fintech", "ecommerce")
            .build()
            .unwrap(),
    )
}

fn subject() -> CompanyProfile {
    CompanyProfile::new("subject", "Subject Payments Inc", Provenance::DocumentDerived)
        .with_industry("fintech-payments")
        .with_business_model("transaction-fees")
        .with_revenue(3_000_000.0)
        .with_markets(["us"])
}

fn ecommerce_candidate() -> CompanyProfile {
    CompanyProfile::new("shopco", "ShopCo", Provenance::MarketData)
        .with_industry("ecommerce-platform")
        .with_business_model("marketplace")
        .with_revenue(500_000_000.0)
        .with_markets(["us", "eu"])
}

fn analyzer() -> Analyzer {
    let engine = MatchEngine::new(taxonomy(), EngineConfig::default()).unwrap();
    Analyzer::with_defaults(engine)
}

#[test]
fn test_scenario_vertical_match_with_quantitative_estimate() {
    // Payments subject vs. a much larger ecommerce candidate the adjacency
    // table marks as downstream, with cost data present.
    let snapshot = CatalogSnapshot::build(
        1,
        Utc::now(),
        vec![(
            ecommerce_candidate(),
            Some(FinancialMetrics {
                revenue: Some(500_000_000.0),
                operating_cost: Some(420_000_000.0),
                gross_margin: None,
            }),
        )],
    );
    let vectorizer = Vectorizer::new(taxonomy(), &snapshot);
    let report = analyzer()
        .analyze(
            &subject(),
            Some(&FinancialMetrics::from_revenue(3_000_000.0)),
            &snapshot,
            &vectorizer,
            &MatchFilter::permissive(),
            &RunOptions::default(),
        )
        .unwrap();

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.candidate.match_type, MatchType::Vertical);
    assert_eq!(result.candidate.chain_relation, Some(ChainRelation::Upstream));

    let estimate = &result.estimate;
    assert_eq!(estimate.quality, EstimateQuality::Quantitative);
    let kinds: Vec<DriverKind> = estimate.drivers.iter().map(|d| d.kind).collect();
    assert!(kinds.contains(&DriverKind::GeographyExpansion));
    assert!(kinds.contains(&DriverKind::CrossSell));
    // Bounded by the policy caps.
    let combined = 503_000_000.0;
    assert!(estimate.revenue_synergy.unwrap() <= combined * 0.05 + 1e-6);
}

#[test]
fn test_scenario_identical_attributes_are_horizontal() {
    let tax = taxonomy();
    let twin_a = CompanyProfile::new("twin-a", "Twin A", Provenance::DocumentDerived)
        .with_industry("fintech-payments")
        .with_business_model("saas")
        .with_markets(["us", "eu"]);
    let twin_b = CompanyProfile::new("twin-b", "Twin B", Provenance::MarketData)
        .with_industry("fintech-payments")
        .with_business_model("saas")
        .with_markets(["us", "eu"]);
    let snapshot = CatalogSnapshot::build(1, Utc::now(), vec![(twin_b.clone(), None)]);
    let vectorizer = Vectorizer::new(Arc::clone(&tax), &snapshot);
    let engine = MatchEngine::new(tax, EngineConfig::default()).unwrap();

    let va = vectorizer.vectorize(&twin_a).unwrap();
    let vb = vectorizer.vectorize(&twin_b).unwrap();
    let matched = engine.score_pair(&va, &vb).unwrap().unwrap();
    assert_eq!(matched.match_type, MatchType::Horizontal);
    assert!((matched.match_score - 1.0).abs() < 1e-5, "got {}", matched.match_score);
}

#[test]
fn test_scenario_unknown_taxonomy_code_recovers() {
    // Candidate carries a code absent from the taxonomy; the vectorizer
    // falls back to the catch-all sector instead of failing the run.
    let odd = CompanyProfile::new("odd", "Odd Co", Provenance::DocumentDerived)
        .with_industry("xyz-999")
        .with_revenue(1_000_000.0);
    let snapshot = CatalogSnapshot::build(1, Utc::now(), vec![(odd.clone(), None)]);
    let vectorizer = Vectorizer::new(taxonomy(), &snapshot);
    let vector = vectorizer.vectorize(&odd).unwrap();
    assert_eq!(
        vectorizer.taxonomy().sector_name(vector.sector().unwrap()),
        "other"
    );
    // And a full run over it completes with the candidate dropped as
    // unrelated rather than skipped as an error.
    let report = analyzer()
        .analyze(
            &subject(),
            None,
            &snapshot,
            &vectorizer,
            &MatchFilter::permissive(),
            &RunOptions::default(),
        )
        .unwrap();
    assert!(report.skipped.is_empty());
    assert!(report.results.is_empty());
}

#[test]
fn test_match_scores_symmetric_and_bounded_for_random_profiles() {
    let industries = [
        "fintech-payments",
        "fintech-lending",
        "ecommerce-platform",
        "healthcare-clinics",
    ];
    let models = ["saas", "marketplace", "transaction-fees"];
    let markets = ["us", "eu", "uk", "apac", "latam"];

    let mut rng = StdRng::seed_from_u64(7);
    let mut profiles = Vec::new();
    for i in 0..24 {
        let mut profile = CompanyProfile::new(
            format!("p{i}"),
            format!("Company {i}"),
            Provenance::MarketData,
        )
        .with_industry(industries[rng.random_range(0..industries.len())]);
        if rng.random::<f64>() < 0.8 {
            profile = profile.with_business_model(models[rng.random_range(0..models.len())]);
        }
        if rng.random::<f64>() < 0.8 {
            profile = profile.with_revenue(10f64.powf(rng.random_range(4.0..11.0)));
        }
        if rng.random::<f64>() < 0.7 {
            let count = rng.random_range(1..=markets.len());
            profile = profile.with_markets(markets[..count].iter().copied());
        }
        profiles.push(profile);
    }

    let snapshot = CatalogSnapshot::build(
        1,
        Utc::now(),
        profiles.iter().cloned().map(|p| (p, None)).collect(),
    );
    let vectorizer = Vectorizer::new(taxonomy(), &snapshot);
    let vectors: Vec<_> = profiles
        .iter()
        .map(|p| vectorizer.vectorize(p).unwrap())
        .collect();

    let weights = MatchWeights::default();
    for a in &vectors {
        for b in &vectors {
            let ab = score_pair(&weights, a, b).unwrap();
            let ba = score_pair(&weights, b, a).unwrap();
            assert!((0.0..=1.0).contains(&ab.score));
            assert!(
                (ab.score - ba.score).abs() < 1e-6,
                "asymmetric: {} vs {}",
                ab.score,
                ba.score
            );
        }
    }
}

#[test]
fn test_repeated_runs_reproduce_identical_ordering() {
    let mut rows = Vec::new();
    for i in 0..12 {
        let profile = CompanyProfile::new(
            format!("c{i}"),
            format!("Candidate {i}"),
            Provenance::MarketData,
        )
        .with_industry(if i % 3 == 0 {
            "fintech-lending"
        } else {
            "fintech-payments"
        })
        .with_business_model("transaction-fees")
        .with_revenue(1_000_000.0 * (i + 1) as f64)
        .with_markets(["us"]);
        let financials = FinancialMetrics::from_revenue(1_000_000.0 * (i + 1) as f64);
        rows.push((profile, Some(financials)));
    }
    let snapshot = CatalogSnapshot::build(1, Utc::now(), rows);
    let vectorizer = Vectorizer::new(taxonomy(), &snapshot);
    let analyzer = analyzer();

    let order = |report: &synergx::RankedReport| -> Vec<String> {
        report
            .results
            .iter()
            .map(|r| r.candidate.candidate_id.to_string())
            .collect()
    };

    let first = analyzer
        .analyze(
            &subject(),
            Some(&FinancialMetrics::from_revenue(3_000_000.0)),
            &snapshot,
            &vectorizer,
            &MatchFilter::permissive(),
            &RunOptions::default(),
        )
        .unwrap();
    for _ in 0..3 {
        let again = analyzer
            .analyze(
                &subject(),
                Some(&FinancialMetrics::from_revenue(3_000_000.0)),
                &snapshot,
                &vectorizer,
                &MatchFilter::permissive(),
                &RunOptions::default(),
            )
            .unwrap();
        assert_eq!(order(&first), order(&again));
    }
}

#[test]
fn test_candidate_without_financials_degrades_gracefully() {
    let peer = CompanyProfile::new("peer", "Peer Co", Provenance::MarketData)
        .with_industry("fintech-payments")
        .with_business_model("transaction-fees")
        .with_markets(["us"]);
    let snapshot = CatalogSnapshot::build(1, Utc::now(), vec![(peer, None)]);
    let vectorizer = Vectorizer::new(taxonomy(), &snapshot);
    let report = analyzer()
        .analyze(
            &subject(),
            Some(&FinancialMetrics::from_revenue(3_000_000.0)),
            &snapshot,
            &vectorizer,
            &MatchFilter::permissive(),
            &RunOptions::default(),
        )
        .unwrap();

    assert_eq!(report.results.len(), 1);
    let estimate = &report.results[0].estimate;
    assert_eq!(estimate.quality, EstimateQuality::QualitativeOnly);
    assert!(estimate.revenue_synergy.is_none());
    assert!(estimate.risk_adjusted_value.is_none());
    assert!(estimate.drivers.iter().all(|d| d.magnitude.is_none()));
    assert!(!estimate.drivers.is_empty());
}

#[test]
fn test_expired_deadline_reports_timeout() {
    let snapshot = CatalogSnapshot::build(
        1,
        Utc::now(),
        vec![(ecommerce_candidate(), None)],
    );
    let vectorizer = Vectorizer::new(taxonomy(), &snapshot);
    let options = RunOptions {
        deadline: Some(Instant::now() - std::time::Duration::from_millis(1)),
        threads: None,
    };
    let report = analyzer()
        .analyze(
            &subject(),
            None,
            &snapshot,
            &vectorizer,
            &MatchFilter::permissive(),
            &options,
        )
        .unwrap();
    assert!(report.timed_out);
    assert!(report.results.is_empty());
}

#[test]
fn test_loader_end_to_end() {
    let dir = tempfile::tempdir().unwrap();

    let taxonomy_path = dir.path().join("taxonomy.json");
    std::fs::write(
        &taxonomy_path,
        r#"{
            "version": 1,
            "sectors": ["fintech", "ecommerce"],
            "codes": [
                {"code": "fintech-payments", "sector": "fintech"},
                {"code": "ecommerce-platform", "sector": "ecommerce"}
            ],
            "business_models": ["saas", "marketplace"],
            "value_chain": [{"upstream": "fintech", "downstream": "ecommerce"}]
        }"#,
    )
    .unwrap();

    let catalog_path = dir.path().join("catalog.json");
    std::fs::write(
        &catalog_path,
        r#"{
            "version": 4,
            "companies": [
                {
                    "id": "shopco",
                    "name": "ShopCo",
                    "industry": "ecommerce-platform",
                    "business_model": "marketplace",
                    "revenue": 500000000.0,
                    "geographic_markets": ["us", "eu"],
                    "provenance": "market-data",
                    "financials": {"operating_cost": 420000000.0}
                },
                {
                    "id": "peer",
                    "name": "Peer Payments",
                    "industry": "fintech-payments",
                    "business_model": "saas",
                    "revenue": 4000000.0,
                    "geographic_markets": ["us"],
                    "provenance": "market-data"
                }
            ]
        }"#,
    )
    .unwrap();

    let subject_path = dir.path().join("subject.json");
    std::fs::write(
        &subject_path,
        r#"{
            "id": "subject",
            "name": "Subject Payments Inc",
            "industry": "fintech-payments",
            "business_model": "saas",
            "revenue": 3000000.0,
            "geographic_markets": ["us"],
            "provenance": "document-derived"
        }"#,
    )
    .unwrap();

    let taxonomy = Arc::new(loader::load_taxonomy(&taxonomy_path).unwrap());
    let snapshot = loader::load_catalog(&catalog_path).unwrap();
    let (subject, subject_financials) = loader::load_subject(&subject_path).unwrap();

    assert_eq!(snapshot.version(), 4);
    assert_eq!(snapshot.len(), 2);
    assert_eq!(subject.id, ProfileId::from("subject"));
    // Catalog revenue backfills the financial record.
    assert_eq!(
        snapshot
            .financials(&ProfileId::from("shopco"))
            .unwrap()
            .revenue,
        Some(500_000_000.0)
    );

    let vectorizer = Vectorizer::new(Arc::clone(&taxonomy), &snapshot);
    let engine = MatchEngine::new(taxonomy, EngineConfig::default()).unwrap();
    let report = Analyzer::with_defaults(engine)
        .analyze(
            &subject,
            subject_financials.as_ref(),
            &snapshot,
            &vectorizer,
            &MatchFilter::permissive(),
            &RunOptions::default(),
        )
        .unwrap();

    assert_eq!(report.results.len(), 2);
    let by_id = |id: &str| {
        report
            .results
            .iter()
            .find(|r| r.candidate.candidate_id == ProfileId::from(id))
            .unwrap()
    };
    assert_eq!(by_id("peer").candidate.match_type, MatchType::Horizontal);
    assert_eq!(by_id("shopco").candidate.match_type, MatchType::Vertical);
    assert!(by_id("shopco").estimate.is_quantitative());
}
