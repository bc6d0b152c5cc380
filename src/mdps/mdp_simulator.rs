use super::solvers::soft_value_iteration::PolicySequence;
use super::transition_model::TransitionModel;
use crate::error::{IrlError, Result};
use crate::{Continous, Discrete};
use rand::distributions::WeightedIndex;
use rand::prelude::*;

pub trait Weighted<S> {
    fn s(&self) -> S;

    fn p(&self) -> Continous;
}

impl Weighted<Discrete> for (Discrete, Continous) {
    fn s(&self) -> Discrete {
        self.0
    }

    fn p(&self) -> Continous {
        self.1
    }
}

pub fn pick_next<T, S, R>(rng: &mut R, ts: &[T]) -> Result<S>
where
    T: Weighted<S>,
    R: Rng + ?Sized,
{
    let dist = WeightedIndex::new(ts.iter().map(|item| item.p()))
        .map_err(|e| IrlError::invalid("weights", e.to_string()))?;

    Ok(ts[dist.sample(rng)].s())
}

/// Roll out one trajectory of `policies.len() + 1` states starting at `s0`.
pub fn sample_trajectory<R: Rng + ?Sized>(
    model: &TransitionModel,
    policies: &PolicySequence,
    s0: Discrete,
    rng: &mut R,
) -> Result<Vec<Discrete>> {
    if s0 >= model.n_s() {
        return Err(IrlError::invalid(
            "start state",
            format!("{s0} is outside 0..{}", model.n_s()),
        ));
    }

    let mut trajectory = Vec::with_capacity(policies.len() + 1);
    trajectory.push(s0);
    let mut s = s0;
    for t in 0..policies.len() {
        let actions = policies
            .action_probabilities(t, s)
            .iter()
            .enumerate()
            .map(|(a, &p)| (a, p))
            .collect::<Vec<_>>();
        let a: Discrete = pick_next(rng, &actions)?;

        let next_states = (0..model.n_s())
            .map(|s_prime| (s_prime, model.p(s, a, s_prime)))
            .collect::<Vec<_>>();
        s = pick_next(rng, &next_states)?;
        trajectory.push(s);
    }

    Ok(trajectory)
}
