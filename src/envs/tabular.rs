use crate::error::{IrlError, Result};
use crate::mdps::{mdp::*, transition_model::TransitionModel};
use crate::{Continous, Discrete};
use ndarray::Array2;
use std::rc::Rc;

/// An MDP given directly by its transition table and state features.
#[derive(Debug, Clone)]
pub struct TabularMdp {
    n_s: usize,
    n_a: usize,
    transitions: Rc<Transitions>,
    model: TransitionModel,
    f_matrix: Array2<Continous>,
}

impl TabularMdp {
    pub fn new(
        n_s: usize,
        n_a: usize,
        transitions: Transitions,
        f_matrix: Array2<Continous>,
    ) -> Result<Self> {
        let model = TransitionModel::new(n_s, n_a, &transitions)?;
        if f_matrix.nrows() != n_s {
            return Err(IrlError::DimensionMismatch {
                what: "feature matrix rows",
                expected: n_s,
                actual: f_matrix.nrows(),
            });
        }
        if f_matrix.ncols() == 0 {
            return Err(IrlError::invalid("feature matrix", "needs at least one feature"));
        }

        Ok(Self {
            n_s,
            n_a,
            transitions: Rc::new(transitions),
            model,
            f_matrix,
        })
    }

    /// One indicator feature per state.
    pub fn with_identity_features(n_s: usize, n_a: usize, transitions: Transitions) -> Result<Self> {
        Self::new(n_s, n_a, transitions, Array2::eye(n_s))
    }
}

impl Mdp for TabularMdp {
    fn n_s(&self) -> usize {
        self.n_s
    }

    fn n_a(&self) -> usize {
        self.n_a
    }

    fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }

    fn transition_model(&self) -> &TransitionModel {
        &self.model
    }

    fn feature_matrix(&self) -> &Array2<Continous> {
        &self.f_matrix
    }
}

/// Table for an MDP where every action has a single successor.
/// `rows[s][a] = (next_state, reward)`.
pub fn deterministic_transitions<const N_A: usize>(
    rows: &[[(Discrete, Continous); N_A]],
) -> Transitions {
    rows.iter()
        .enumerate()
        .flat_map(|(s, row)| {
            row.iter()
                .enumerate()
                .map(move |(a, &(next_state, reward))| {
                    ((s, a), vec![Transition::new(1.0, next_state, reward)])
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertor::*;
    use ndarray::array;

    #[test]
    fn deterministic_table_has_one_entry_per_pair() {
        let ts = deterministic_transitions(&[[(1, 0.), (0, 1.)], [(1, 2.), (0, 0.)]]);

        assert_that!(ts.len()).is_equal_to(4);
        assert_that!(ts[&(0, 1)].clone()).is_equal_to(vec![Transition::new(1.0, 0, 1.)]);
    }

    #[test]
    fn feature_rows_must_match_states() {
        let ts = deterministic_transitions(&[[(1, 0.)], [(0, 0.)]]);

        let e = TabularMdp::new(2, 1, ts, array![[1., 0.]]).unwrap_err();
        assert!(matches!(
            e,
            IrlError::DimensionMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn transitions_are_shared() {
        let ts = deterministic_transitions(&[[(1, 0.)], [(0, 0.)]]);
        let mdp = TabularMdp::with_identity_features(2, 1, ts).unwrap();

        let a = mdp.transitions();
        let b = mdp.transitions();
        assert!(Rc::ptr_eq(&a, &b));
        assert_that!(mdp.num_features()).is_equal_to(2);
    }
}
