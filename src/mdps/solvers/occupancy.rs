use super::soft_value_iteration::PolicySequence;
use crate::error::{IrlError, Result};
use crate::mdps::transition_model::TransitionModel;
use crate::Continous;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// State occupancies `[D_0, ..., D_horizon]` together with the feature
/// sensitivity of the last step.
#[derive(Debug, Clone)]
pub struct OccupancyTrace {
    pub occupancies: Vec<Array1<Continous>>,
    /// `G[s]`: feature mass accumulated along all paths that end in `s` at the
    /// last step, shape `(n_s, num_features)`.
    pub sensitivity: Array2<Continous>,
}

impl OccupancyTrace {
    pub fn last_step(&self) -> ArrayView1<'_, Continous> {
        // `occupancies` always holds at least D_0.
        self.occupancies[self.occupancies.len() - 1].view()
    }

    /// `sum_t D_t @ F`.
    pub fn feature_expectation(&self, f: ArrayView2<Continous>) -> Array1<Continous> {
        self.occupancies
            .iter()
            .fold(Array1::zeros(f.ncols()), |acc, d| acc + d.dot(&f))
    }
}

/// Forward propagation of state occupancy under a policy sequence.
///
/// `D_t[s'] = sum_{s,a} D_{t-1}[s] * pi_{t-1}[s,a] * p(s'|s,a)`, one step per
/// policy. Returns `[D_0, ..., D_horizon]`.
pub fn occupancy_measures(
    model: &TransitionModel,
    policies: &PolicySequence,
    p_0: ArrayView1<Continous>,
) -> Result<Vec<Array1<Continous>>> {
    check_inputs(model, policies, p_0)?;

    let mut d_list = Vec::with_capacity(policies.len() + 1);
    d_list.push(p_0.to_owned());
    for policy in policies.iter() {
        let d_next = step_occupancy(model, policy.view(), d_list[d_list.len() - 1].view());
        d_list.push(d_next);
    }

    Ok(d_list)
}

/// Occupancy propagation fused with the feature-sensitivity recurrence:
///
/// `G_0[s] = p_0[s] F[s]`,
/// `G_t = (T2' (D_{t-1} x pi_{t-1})) * F + T2' (pi_{t-1} x G_{t-1})`.
pub fn occupancy_with_sensitivity(
    model: &TransitionModel,
    policies: &PolicySequence,
    p_0: ArrayView1<Continous>,
    f: ArrayView2<Continous>,
) -> Result<OccupancyTrace> {
    check_inputs(model, policies, p_0)?;
    if f.nrows() != model.n_s() {
        return Err(IrlError::DimensionMismatch {
            what: "feature matrix rows",
            expected: model.n_s(),
            actual: f.nrows(),
        });
    }

    let (n_s, n_a, n_f) = (model.n_s(), model.n_a(), f.ncols());
    let mut d_list = Vec::with_capacity(policies.len() + 1);
    d_list.push(p_0.to_owned());
    let mut g = scale_rows(f, p_0);

    for policy in policies.iter() {
        let d_prev = d_list[d_list.len() - 1].view();
        let d_next = step_occupancy(model, policy.view(), d_prev);

        // tmp[s * n_a + a, k] = pi[s, a] * G[s, k]
        let mut tmp = Array2::<Continous>::zeros((n_s * n_a, n_f));
        for (sa, mut row) in tmp.axis_iter_mut(Axis(0)).enumerate() {
            let (s, a) = (sa / n_a, sa % n_a);
            row.scaled_add(policy[[s, a]], &g.row(s));
        }

        g = scale_rows(f, d_next.view()) + model.matrix_transpose().dot(&tmp);
        d_list.push(d_next);
    }

    Ok(OccupancyTrace {
        occupancies: d_list,
        sensitivity: g,
    })
}

fn step_occupancy(
    model: &TransitionModel,
    policy: ArrayView2<Continous>,
    d_prev: ArrayView1<Continous>,
) -> Array1<Continous> {
    let n_a = model.n_a();
    // M[s * n_a + a] = D[s] * pi[s, a]
    let state_action = Array1::from_shape_fn(model.n_s() * n_a, |sa| {
        d_prev[sa / n_a] * policy[[sa / n_a, sa % n_a]]
    });

    model.matrix_transpose().dot(&state_action)
}

fn scale_rows(f: ArrayView2<Continous>, w: ArrayView1<Continous>) -> Array2<Continous> {
    let mut out = f.to_owned();
    for (mut row, &x) in out.axis_iter_mut(Axis(0)).zip(w.iter()) {
        row *= x;
    }
    out
}

fn check_inputs(
    model: &TransitionModel,
    policies: &PolicySequence,
    p_0: ArrayView1<Continous>,
) -> Result<()> {
    if p_0.len() != model.n_s() {
        return Err(IrlError::DimensionMismatch {
            what: "initial distribution",
            expected: model.n_s(),
            actual: p_0.len(),
        });
    }
    if p_0.iter().any(|&p| !p.is_finite() || p < 0.) {
        return Err(IrlError::invalid(
            "initial distribution",
            "entries must be finite and non-negative",
        ));
    }
    if let Some(policy) = policies.iter().find(|p| p.dim() != (model.n_s(), model.n_a())) {
        return Err(IrlError::invalid(
            "policy",
            format!(
                "expected shape ({}, {}), got {:?}",
                model.n_s(),
                model.n_a(),
                policy.dim()
            ),
        ));
    }

    Ok(())
}
