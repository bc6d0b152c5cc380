use super::mdp::Transitions;
use crate::error::{IrlError, Result};
use crate::{Continous, Discrete};
use itertools::iproduct;
use ndarray::{Array2, Array3, ArrayView2};

const ROW_SUM_TOLERANCE: Continous = 1e-6;

/// Dense form of an MDP's transition table.
///
/// `t[[s, a, s']] = p(s' | s, a)`. The flattened `t_matrix` has one row per
/// `(s, a)` pair at index `s * n_a + a`; `t_matrix_t` is its transpose and is
/// what forward propagation multiplies with.
#[derive(Debug, Clone)]
pub struct TransitionModel {
    n_s: usize,
    n_a: usize,
    t: Array3<Continous>,
    t_matrix: Array2<Continous>,
    t_matrix_t: Array2<Continous>,
}

impl TransitionModel {
    pub fn new(n_s: usize, n_a: usize, transitions: &Transitions) -> Result<Self> {
        if n_s == 0 || n_a == 0 {
            return Err(IrlError::EmptyMdp { n_s, n_a });
        }

        let mut t = Array3::<Continous>::zeros((n_s, n_a, n_s));
        for (s, a) in iproduct!(0..n_s, 0..n_a) {
            let ts = transitions
                .get(&(s, a))
                .ok_or(IrlError::MissingTransitions { s, a })?;

            for tr in ts {
                if tr.next_state >= n_s {
                    return Err(IrlError::StateOutOfRange {
                        s,
                        a,
                        next_state: tr.next_state,
                        n_s,
                    });
                }
                if !tr.probability.is_finite() || tr.probability < 0. {
                    return Err(IrlError::InvalidProbability {
                        s,
                        a,
                        next_state: tr.next_state,
                        probability: tr.probability,
                    });
                }
                t[[s, a, tr.next_state]] += tr.probability;
            }

            let sum: Continous = (0..n_s).map(|s_prime| t[[s, a, s_prime]]).sum();
            if (sum - 1.).abs() > ROW_SUM_TOLERANCE {
                return Err(IrlError::NotStochastic { s, a, sum });
            }
        }

        let t_matrix = t
            .clone()
            .into_shape((n_s * n_a, n_s))
            .map_err(|e| IrlError::invalid("transition matrix", e.to_string()))?;
        let t_matrix_t = t_matrix.t().to_owned();

        Ok(Self {
            n_s,
            n_a,
            t,
            t_matrix,
            t_matrix_t,
        })
    }

    pub fn n_s(&self) -> usize {
        self.n_s
    }

    pub fn n_a(&self) -> usize {
        self.n_a
    }

    pub fn p(&self, s: Discrete, a: Discrete, s_prime: Discrete) -> Continous {
        self.t[[s, a, s_prime]]
    }

    /// Shape `(n_s * n_a, n_s)`.
    pub fn matrix(&self) -> ArrayView2<'_, Continous> {
        self.t_matrix.view()
    }

    /// Shape `(n_s, n_s * n_a)`.
    pub fn matrix_transpose(&self) -> ArrayView2<'_, Continous> {
        self.t_matrix_t.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdps::mdp::Transition;
    use float_eq::*;
    use rstest::rstest;

    fn two_state_table() -> Transitions {
        Transitions::from([
            ((0, 0), vec![Transition::new(1.0, 1, 0.)]),
            (
                (0, 1),
                vec![Transition::new(0.25, 0, 0.), Transition::new(0.75, 1, 0.)],
            ),
            ((1, 0), vec![Transition::new(1.0, 1, 1.)]),
            ((1, 1), vec![Transition::new(1.0, 0, 0.)]),
        ])
    }

    #[test]
    fn dense_tensor_matches_table() {
        let m = TransitionModel::new(2, 2, &two_state_table()).unwrap();

        assert_float_eq!(m.p(0, 0, 0), 0., abs <= 1e-12);
        assert_float_eq!(m.p(0, 0, 1), 1., abs <= 1e-12);
        assert_float_eq!(m.p(0, 1, 0), 0.25, abs <= 1e-12);
        assert_float_eq!(m.p(0, 1, 1), 0.75, abs <= 1e-12);
        assert_float_eq!(m.p(1, 1, 0), 1., abs <= 1e-12);
    }

    #[test]
    fn flattened_rows_follow_state_major_order() {
        let m = TransitionModel::new(2, 2, &two_state_table()).unwrap();

        assert_eq!(m.matrix().dim(), (4, 2));
        assert_eq!(m.matrix_transpose().dim(), (2, 4));
        assert_float_eq!(
            m.matrix().row(1).to_vec(),
            vec![0.25, 0.75],
            abs_all <= 1e-12
        );
        assert_float_eq!(
            m.matrix_transpose().row(0).to_vec(),
            vec![0., 0.25, 0., 1.],
            abs_all <= 1e-12
        );
    }

    #[test]
    fn duplicate_destinations_are_summed() {
        let mut ts = two_state_table();
        ts.insert(
            (0, 0),
            vec![Transition::new(0.5, 1, 0.), Transition::new(0.5, 1, 0.)],
        );

        let m = TransitionModel::new(2, 2, &ts).unwrap();
        assert_float_eq!(m.p(0, 0, 1), 1., abs <= 1e-12);
    }

    #[test]
    fn missing_pair_is_rejected() {
        let mut ts = two_state_table();
        ts.remove(&(1, 0));

        let e = TransitionModel::new(2, 2, &ts).unwrap_err();
        assert!(matches!(e, IrlError::MissingTransitions { s: 1, a: 0 }));
    }

    #[rstest]
    #[case(vec![Transition::new(0.5, 1, 0.)], "sum")]
    #[case(vec![Transition::new(1.0, 2, 0.)], "range")]
    #[case(vec![Transition::new(-0.5, 0, 0.), Transition::new(1.5, 1, 0.)], "probability")]
    #[case(vec![Transition::new(f64::NAN, 1, 0.)], "probability")]
    fn malformed_rows_are_rejected(#[case] row: Vec<Transition>, #[case] kind: &str) {
        let mut ts = two_state_table();
        ts.insert((0, 1), row);

        let e = TransitionModel::new(2, 2, &ts).unwrap_err();
        match kind {
            "sum" => assert!(matches!(e, IrlError::NotStochastic { s: 0, a: 1, .. })),
            "range" => assert!(matches!(e, IrlError::StateOutOfRange { next_state: 2, .. })),
            _ => assert!(matches!(e, IrlError::InvalidProbability { .. })),
        }
    }

    #[test]
    fn empty_mdp_is_rejected() {
        let e = TransitionModel::new(0, 2, &Transitions::new()).unwrap_err();
        assert!(matches!(e, IrlError::EmptyMdp { n_s: 0, n_a: 2 }));
    }
}
