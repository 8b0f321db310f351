/// Property-based tests using proptest
/// Tests invariants that should hold for every valid estimation input
use campaign_budget_api::catalog::{normalize_objective_name, ObjectiveCatalog};
use campaign_budget_api::engine::EstimationEngine;
use campaign_budget_api::models::EstimationInput;
use proptest::prelude::*;
use std::sync::Arc;

fn engine() -> EstimationEngine {
    EstimationEngine::new(Arc::new(ObjectiveCatalog::builtin()))
}

fn objective() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["awareness", "engagement", "traffic", "lead_generation"])
}

// Property: impressions follow directly from budget and CPM
proptest! {
    #[test]
    fn impressions_match_budget_over_cpm(
        objective in objective(),
        budget in 1.0f64..1_000_000.0,
        cpm in 0.01f64..500.0
    ) {
        let input = EstimationInput::new(objective, budget).with_cpm(cpm);
        let result = engine().estimate(&input).unwrap();
        prop_assert_eq!(result.estimated_impressions, (budget / (cpm / 1000.0)).round() as u64);
    }
}

// Property: huge budgets are rejected rather than saturating the counts
proptest! {
    #[test]
    fn counts_never_saturate(
        objective in objective(),
        budget in 1.0f64..1e30,
        cpm in 0.000001f64..1_000_000.0
    ) {
        let input = EstimationInput::new(objective, budget).with_cpm(cpm);
        match engine().estimate(&input) {
            Ok(result) => {
                prop_assert!(result.estimated_impressions < u64::MAX);
                prop_assert!(result.estimated_clicks <= result.estimated_impressions);
            }
            Err(err) => prop_assert_eq!(err.field(), Some("budget")),
        }
    }
}

// Property: funnel counts never grow downstream
proptest! {
    #[test]
    fn funnel_is_monotonic(
        objective in objective(),
        budget in 1.0f64..1_000_000.0,
        cpm in 0.01f64..500.0,
        ctr in 0.0f64..=100.0,
        conversion_rate in 0.0f64..=100.0
    ) {
        let input = EstimationInput::new(objective, budget)
            .with_cpm(cpm)
            .with_ctr(ctr)
            .with_conversion_rate(conversion_rate);
        let result = engine().estimate(&input).unwrap();

        prop_assert!(result.estimated_reach <= result.estimated_impressions);
        prop_assert!(result.estimated_clicks <= result.estimated_impressions);
        prop_assert!(result.estimated_conversions <= result.estimated_clicks);
        prop_assert!(result.cost_per_click >= 0.0);
        prop_assert!(result.cost_per_conversion >= 0.0);
    }

    #[test]
    fn estimate_is_deterministic(
        objective in objective(),
        budget in 0.01f64..1_000_000.0,
        ctr in 0.0f64..50.0
    ) {
        let input = EstimationInput::new(objective, budget).with_ctr(ctr);
        let first = engine().estimate(&input).unwrap();
        let second = engine().estimate(&input).unwrap();

        prop_assert_eq!(first.cost_per_click.to_bits(), second.cost_per_click.to_bits());
        prop_assert_eq!(first.cost_per_conversion.to_bits(), second.cost_per_conversion.to_bits());
        prop_assert_eq!(first, second);
    }
}

// Property: invalid inputs are rejected with the offending field
proptest! {
    #[test]
    fn non_positive_budget_rejected(objective in objective(), budget in -1_000_000.0f64..=0.0) {
        let err = engine().estimate(&EstimationInput::new(objective, budget)).unwrap_err();
        prop_assert_eq!(err.field(), Some("budget"));
    }

    #[test]
    fn negative_ctr_rejected(objective in objective(), ctr in -100.0f64..-0.0001) {
        let input = EstimationInput::new(objective, 100.0).with_ctr(ctr);
        let err = engine().estimate(&input).unwrap_err();
        prop_assert_eq!(err.field(), Some("ctr"));
    }
}

// Property: name normalization is idempotent and never panics
proptest! {
    #[test]
    fn normalization_never_panics(name in "\\PC*") {
        let _ = normalize_objective_name(&name);
    }

    #[test]
    fn normalization_is_idempotent(name in "[A-Za-z][A-Za-z0-9 _-]{0,30}") {
        let once = normalize_objective_name(&name);
        prop_assert_eq!(normalize_objective_name(&once), once.clone());
    }
}
