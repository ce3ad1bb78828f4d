//! Integration tests for the RaptorAlloc annealing optimizer.

use raptoralloc::model::ConstraintSet;
use raptoralloc::optimizer::diagnostics::is_monotone_best;
use raptoralloc::{
    optimize, AllocError, ConstraintSpec, ExecutionMode, HyperparamOverrides, MarketStats,
    ModelSpec, ObjectiveSpec, Translator,
};

fn four_asset_market() -> MarketStats {
    MarketStats::new(
        vec![0.06, 0.08, 0.04, 0.10],
        vec![
            vec![0.06, 0.02, 0.01, 0.015],
            vec![0.02, 0.08, 0.015, 0.02],
            vec![0.01, 0.015, 0.05, 0.01],
            vec![0.015, 0.02, 0.01, 0.09],
        ],
    )
}

fn four_asset_spec() -> ModelSpec {
    ModelSpec::from_ids(["equity", "credit", "govt", "growth"])
        .with_objective(ObjectiveSpec::expected_return(1.0))
        .with_objective(ObjectiveSpec::variance(0.8))
        .with_objective(ObjectiveSpec::sharpe(0.4))
        .with_constraint(ConstraintSpec::budget())
        .with_constraint(ConstraintSpec::LongOnly)
        .with_hyperparams(HyperparamOverrides {
            states: Some(24),
            iterations: Some(800),
            initial_temp: Some(0.9),
            entanglement_gamma: Some(0.7),
            seed: Some(1337),
            ..Default::default()
        })
}

#[test]
fn test_four_asset_run() {
    let market = four_asset_market();
    let result = optimize(four_asset_spec(), &market).unwrap();

    assert_eq!(result.allocation.len(), 4);
    assert!((result.total_weight() - 1.0).abs() < 1e-6);
    assert!(result.allocation.iter().all(|&w| w >= 0.0));
    assert!(result.score >= result.stats.initial_best_score);
    assert_eq!(result.diagnostics.len(), 800);
    assert_eq!(result.hyperparams.states, 24);
    assert!(result.is_fully_feasible());
}

#[test]
fn test_score_matches_utility() {
    let market = four_asset_market();
    let translator = Translator::new(four_asset_spec()).unwrap();
    let result = translator.translate(&market).unwrap();
    let utility = translator.utility(&market).unwrap();

    assert!((utility.evaluate(&result.allocation) - result.score).abs() < 1e-10);
}

#[test]
fn test_single_asset_degenerate() {
    let spec = ModelSpec::from_ids(["only"])
        .with_objective(ObjectiveSpec::expected_return(1.0))
        .with_objective(ObjectiveSpec::variance(1.0))
        .with_objective(ObjectiveSpec::sharpe(1.0))
        .with_constraint(ConstraintSpec::budget())
        .with_iterations(50);
    let market = MarketStats::new(vec![0.05], vec![vec![0.04]]);

    let result = optimize(spec, &market).unwrap();
    assert_eq!(result.allocation.len(), 1);
    assert!((result.allocation[0] - 1.0).abs() < 1e-12);
    assert!(result.score.is_finite());
}

#[test]
fn test_zero_variance_asset() {
    let spec = ModelSpec::from_ids(["cash"])
        .with_objective(ObjectiveSpec::sharpe(1.0))
        .with_iterations(20);
    let market = MarketStats::new(vec![0.03], vec![vec![0.0]]);

    let result = optimize(spec, &market).unwrap();
    assert!((result.allocation[0] - 1.0).abs() < 1e-12);
    assert!(result.score.is_finite());
}

#[test]
fn test_single_iteration() {
    let spec = four_asset_spec().with_iterations(1);
    let result = optimize(spec, &four_asset_market()).unwrap();

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].iteration, 0);
    assert!(result.diagnostics[0].best_score.is_finite());
    // interaction runs at t = 0
    assert_eq!(result.stats.interaction_steps, 1);
}

#[test]
fn test_zero_vector_enforcement() {
    let set = ConstraintSet::new(&[ConstraintSpec::budget(), ConstraintSpec::LongOnly]);
    let enforced = set.enforce(&[0.0; 5]);
    assert_eq!(enforced.len(), 5);
    for w in enforced {
        assert!((w - 0.2).abs() < 1e-12);
    }
}

#[test]
fn test_deterministic_with_seed() {
    let market = four_asset_market();
    let translator = Translator::new(four_asset_spec().with_iterations(200)).unwrap();

    let first = translator.translate(&market).unwrap();
    let second = translator.translate(&market).unwrap();

    assert_eq!(first.allocation, second.allocation);
    assert_eq!(first.score, second.score);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn test_different_seeds_differ() {
    let market = four_asset_market();
    let a = optimize(four_asset_spec().with_iterations(100).with_seed(1), &market).unwrap();
    let b = optimize(four_asset_spec().with_iterations(100).with_seed(2), &market).unwrap();

    assert_ne!(a.diagnostics, b.diagnostics);
}

#[test]
fn test_best_trace_monotone() {
    let result = optimize(four_asset_spec().with_iterations(300), &four_asset_market()).unwrap();
    assert!(is_monotone_best(&result.diagnostics));

    let last = result.diagnostics.last().unwrap();
    assert!((last.best_score - result.score).abs() < 1e-12);
}

#[test]
fn test_long_only_non_negative() {
    // Negative expected returns push the search toward short positions.
    let spec = ModelSpec::from_ids(["a", "b", "c"])
        .with_objective(ObjectiveSpec::expected_return(1.0))
        .with_constraint(ConstraintSpec::budget())
        .with_constraint(ConstraintSpec::LongOnly)
        .with_iterations(300)
        .with_seed(9);
    let market = MarketStats::new(
        vec![-0.05, -0.02, 0.01],
        vec![
            vec![0.04, 0.0, 0.0],
            vec![0.0, 0.02, 0.0],
            vec![0.0, 0.0, 0.01],
        ],
    );

    let result = optimize(spec, &market).unwrap();
    assert!(result.allocation.iter().all(|&w| w >= 0.0));
    assert!((result.total_weight() - 1.0).abs() < 1e-9);
}

#[test]
fn test_sequential_matches_parallel() {
    let market = four_asset_market();
    let sequential = optimize(
        four_asset_spec()
            .with_iterations(200)
            .with_execution(ExecutionMode::Sequential),
        &market,
    )
    .unwrap();
    let parallel = optimize(
        four_asset_spec()
            .with_iterations(200)
            .with_execution(ExecutionMode::Parallel),
        &market,
    )
    .unwrap();

    assert_eq!(sequential.allocation, parallel.allocation);
    assert_eq!(sequential.diagnostics, parallel.diagnostics);
    assert_eq!(sequential.stats, parallel.stats);
}

#[test]
fn test_budget_target() {
    let spec = ModelSpec::from_ids(["a", "b"])
        .with_objective(ObjectiveSpec::expected_return(1.0))
        .with_constraint(ConstraintSpec::Budget { target: 2.5 })
        .with_constraint(ConstraintSpec::LongOnly)
        .with_iterations(50);
    let market = MarketStats::new(vec![0.05, 0.07], vec![vec![0.04, 0.0], vec![0.0, 0.05]]);

    let result = optimize(spec, &market).unwrap();
    assert!((result.total_weight() - 2.5).abs() < 1e-9);
}

#[test]
fn test_custom_objective() {
    // Reward weight on the second asset only.
    let spec = ModelSpec::from_ids(["a", "b"])
        .with_objective(ObjectiveSpec::custom(1.0, |w, _| w[1]))
        .with_constraint(ConstraintSpec::budget())
        .with_constraint(ConstraintSpec::LongOnly)
        .with_iterations(400)
        .with_seed(3);
    let market = MarketStats::new(vec![0.0, 0.0], vec![vec![0.01, 0.0], vec![0.0, 0.01]]);

    let result = optimize(spec, &market).unwrap();
    assert!(result.allocation[1] > result.allocation[0]);
}

#[test]
fn test_invalid_inputs_rejected() {
    let spec = four_asset_spec();

    let short_means = MarketStats::new(vec![0.05; 3], four_asset_market().cov);
    assert!(matches!(
        optimize(spec.clone(), &short_means),
        Err(AllocError::LengthMismatch { .. })
    ));

    let mut asymmetric = four_asset_market();
    asymmetric.cov[0][1] = 0.5;
    assert!(matches!(
        optimize(spec.clone(), &asymmetric),
        Err(AllocError::NonSymmetricMatrix { .. })
    ));

    let mut negative = four_asset_market();
    negative.cov[2][2] = -0.01;
    assert!(matches!(
        optimize(spec.clone(), &negative),
        Err(AllocError::NegativeVariance { .. })
    ));

    let bad_box = spec.with_constraint(ConstraintSpec::box_bounds(vec![0.0; 2], vec![1.0; 2]));
    assert!(Translator::new(bad_box).is_err());
}

#[test]
fn test_max_weight_reports_violation() {
    // Cap on the dominant asset; renormalization can push it back above.
    let spec = ModelSpec::from_ids(["a", "b"])
        .with_objective(ObjectiveSpec::expected_return(1.0))
        .with_constraint(ConstraintSpec::max_weight(1, 0.3))
        .with_constraint(ConstraintSpec::budget())
        .with_constraint(ConstraintSpec::LongOnly)
        .with_iterations(200)
        .with_seed(11);
    let market = MarketStats::new(vec![0.01, 0.20], vec![vec![0.01, 0.0], vec![0.0, 0.01]]);

    let result = optimize(spec, &market).unwrap();
    let over_cap = result.allocation[1] > 0.3 + 1e-9;
    assert_eq!(over_cap, !result.violations.is_empty());
}
