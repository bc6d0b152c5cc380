use crate::error::{IrlError, Result};
use crate::mdps::transition_model::TransitionModel;
use crate::Continous;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Rationality of the modelled agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Temperature {
    /// Boltzmann-rational with temperature `tau > 0`.
    Soft(Continous),
    /// The `tau -> 0` limit: deterministic argmax, ties to the lowest action.
    HardMax,
}

impl Default for Temperature {
    fn default() -> Self {
        Temperature::Soft(1.)
    }
}

impl Temperature {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Temperature::Soft(tau) if !(tau.is_finite() && tau > 0.) => Err(IrlError::invalid(
                "temperature",
                format!("must be positive and finite, got {tau}"),
            )),
            _ => Ok(()),
        }
    }
}

/// Time-indexed stochastic policies, first decision first.
///
/// Element `t` has shape `(n_s, n_a)` and gives `p(a | s)` at time `t`.
#[derive(Debug, Clone, Default)]
pub struct PolicySequence(Vec<Array2<Continous>>);

impl PolicySequence {
    pub fn new(policies: Vec<Array2<Continous>>) -> Self {
        Self(policies)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Array2<Continous>> {
        self.0.iter()
    }

    pub fn action_probabilities(&self, t: usize, s: usize) -> ArrayView1<'_, Continous> {
        self.0[t].row(s)
    }
}

impl Index<usize> for PolicySequence {
    type Output = Array2<Continous>;

    fn index(&self, t: usize) -> &Self::Output {
        &self.0[t]
    }
}

/// Finite-horizon value iteration with the soft max-ent Bellman backup:
///
/// `Q[s,a] = r[s] + gamma * sum_s' p(s'|s,a) V[s']`,
/// `V[s] = tau * log(sum_a exp(Q[s,a] / tau))`,
/// `pi[s,a] = exp((Q[s,a] - V[s]) / tau)`.
///
/// Returns the Boltzmann-rational policies in chronological order.
pub fn soft_value_iteration(
    model: &TransitionModel,
    r: ArrayView1<Continous>,
    gamma: Continous,
    horizon: usize,
    temperature: Temperature,
) -> Result<PolicySequence> {
    backward_induction(model, r, gamma, horizon, temperature, true)
}

pub(crate) fn backward_induction(
    model: &TransitionModel,
    r: ArrayView1<Continous>,
    gamma: Continous,
    horizon: usize,
    temperature: Temperature,
    translate_undiscounted: bool,
) -> Result<PolicySequence> {
    let (n_s, n_a) = (model.n_s(), model.n_a());
    if r.len() != n_s {
        return Err(IrlError::DimensionMismatch {
            what: "state reward",
            expected: n_s,
            actual: r.len(),
        });
    }
    if !(0. ..=1.).contains(&gamma) {
        return Err(IrlError::invalid(
            "gamma",
            format!("must lie in [0, 1], got {gamma}"),
        ));
    }
    temperature.validate()?;

    let mut policies = Vec::with_capacity(horizon);
    let mut v = r.to_owned();
    for _ in 0..horizon {
        let future = model
            .matrix()
            .dot(&v)
            .into_shape((n_s, n_a))
            .map_err(|e| IrlError::invalid("future values", e.to_string()))?;

        let mut q = future * gamma;
        for (mut row, &r_s) in q.axis_iter_mut(Axis(0)).zip(r.iter()) {
            row += r_s;
        }

        let (v_next, policy) = match temperature {
            Temperature::HardMax => hard_backup(q.view()),
            Temperature::Soft(tau) => soft_backup(q.view(), tau),
        };
        if v_next.iter().chain(policy.iter()).any(|x| !x.is_finite()) {
            return Err(IrlError::NumericalInstability {
                what: "value iteration",
                epoch: None,
            });
        }

        policies.push(policy);
        v = v_next;

        // With gamma = 1 the backup is equivariant under adding a constant to
        // V; pinning min(V) at 0 stops log(n_a) from piling up each step.
        if translate_undiscounted && gamma == 1. {
            let v_min = v.fold(Continous::INFINITY, |m, &x| m.min(x));
            v -= v_min;
        }
    }

    policies.reverse();
    Ok(PolicySequence::new(policies))
}

fn hard_backup(q: ArrayView2<Continous>) -> (Array1<Continous>, Array2<Continous>) {
    let mut v = Array1::zeros(q.nrows());
    let mut policy = Array2::zeros(q.raw_dim());
    for (s, row) in q.axis_iter(Axis(0)).enumerate() {
        // Strict comparison keeps the first maximizer.
        let (best, q_max) = row
            .iter()
            .enumerate()
            .fold((0, Continous::NEG_INFINITY), |(ba, bq), (a, &q)| {
                if q > bq {
                    (a, q)
                } else {
                    (ba, bq)
                }
            });
        v[s] = q_max;
        policy[[s, best]] = 1.;
    }

    (v, policy)
}

fn soft_backup(q: ArrayView2<Continous>, tau: Continous) -> (Array1<Continous>, Array2<Continous>) {
    let mut v = Array1::zeros(q.nrows());
    let mut policy = Array2::zeros(q.raw_dim());
    for (s, row) in q.axis_iter(Axis(0)).enumerate() {
        let q_max = row.fold(Continous::NEG_INFINITY, |m, &x| m.max(x));
        let z: Continous = row.iter().map(|&x| ((x - q_max) / tau).exp()).sum();
        v[s] = q_max + tau * z.ln();
        for (p, &x) in policy.row_mut(s).iter_mut().zip(row.iter()) {
            *p = ((x - v[s]) / tau).exp();
        }
    }

    (v, policy)
}
