mod common;

use common::*;
use float_eq::*;
use ndarray::{array, Array1};
use rlsp::envs::*;
use rlsp::*;

fn observe_three(p_0: &Array1<f64>) -> Observation<'_> {
    Observation {
        s_current: 3,
        p_0: p_0.view(),
    }
}

#[test]
fn converges_with_gaussian_prior() {
    let mdp = toy_irreversibility().unwrap();
    let config = EstimatorConfig {
        horizon: 3,
        learning_rate: 0.2,
        epochs: 200,
        threshold: 1e-3,
        ..Default::default()
    };
    let prior = RewardPrior::gaussian(Array1::zeros(4), 1.).unwrap();
    let estimator = RewardEstimator::new(&mdp, config)
        .unwrap()
        .with_prior(prior)
        .unwrap();
    let p_0 = one_hot(4, 0);

    let est = estimator
        .estimate(observe_three(&p_0), Some(Array1::zeros(4)))
        .unwrap();

    assert!(est.converged);
    assert!(est.grad_norm < 1e-3);
    assert!(est.epochs() <= 200);
    assert!(est.reward[3] > est.reward[1]);
    assert!(est.reward[3] > 0.);
}

#[test]
fn converges_without_prior() {
    let mdp = toy_irreversibility().unwrap();
    let config = EstimatorConfig {
        horizon: 3,
        learning_rate: 1.0,
        epochs: 500,
        threshold: 1e-3,
        ..Default::default()
    };
    let estimator = RewardEstimator::new(&mdp, config).unwrap();
    let p_0 = one_hot(4, 0);

    let est = estimator
        .estimate(observe_three(&p_0), Some(Array1::zeros(4)))
        .unwrap();

    assert!(est.converged);
    assert!(est.reward[3] > est.reward[1]);
    let first = est.history.first().unwrap().p_current;
    let last = est.history.last().unwrap().p_current;
    assert!(last > first);
}

#[test]
fn likelihood_rises_along_the_ascent() {
    let mdp = toy_irreversibility().unwrap();
    let config = EstimatorConfig {
        horizon: 3,
        epochs: 20,
        ..Default::default()
    };
    let estimator = RewardEstimator::new(&mdp, config).unwrap();
    let p_0 = one_hot(4, 0);

    let est = estimator
        .estimate(observe_three(&p_0), Some(Array1::zeros(4)))
        .unwrap();

    for w in est.history.windows(2) {
        assert!(w[1].p_current >= w[0].p_current);
    }
    // From zero reward, 5 of the 8 action sequences end in state 3.
    assert_float_eq!(est.history[0].p_current, 0.625, abs <= 1e-12);
}

#[test]
fn learned_reward_prefers_staying_in_the_irreversible_state() {
    let mdp = toy_irreversibility().unwrap();
    let config = EstimatorConfig {
        horizon: 3,
        learning_rate: 0.2,
        epochs: 200,
        ..Default::default()
    };
    let estimator = RewardEstimator::new(&mdp, config.clone())
        .unwrap()
        .with_prior(RewardPrior::gaussian(Array1::zeros(4), 1.).unwrap())
        .unwrap();
    let p_0 = one_hot(4, 0);
    let est = estimator
        .estimate(observe_three(&p_0), Some(Array1::zeros(4)))
        .unwrap();

    let r_s = mdp.feature_matrix().dot(&est.reward);
    let policies = soft_value_iteration(
        mdp.transition_model(),
        r_s.view(),
        1.,
        config.horizon,
        config.temperature,
    )
    .unwrap();

    // First decision from state 0 leans towards the jump into state 3.
    assert!(policies.action_probabilities(0, 0)[1] > 0.5);
}

#[test]
fn spread_initial_distribution_is_accepted() {
    let mdp = toy_irreversibility().unwrap();
    let estimator = RewardEstimator::new(
        &mdp,
        EstimatorConfig {
            horizon: 2,
            epochs: 3,
            ..Default::default()
        },
    )
    .unwrap();
    let p_0 = array![0.5, 0.25, 0.25, 0.];

    let eval = estimator
        .gradient(array![0., 0., 0., 0.].view(), observe_three(&p_0))
        .unwrap();
    assert!(eval.p_current > 0.);
    assert!(eval.grad.iter().all(|g| g.is_finite()));
}
