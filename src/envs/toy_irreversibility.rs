use super::tabular::{deterministic_transitions, TabularMdp};
use crate::error::Result;

/// Four states, two actions. Leaving state 0 via action 1 lands in the
/// absorbing state 3 and can never be undone.
///
/// ```text
/// 0: a0 -> 1 (-0.1)   a1 -> 3 (1)
/// 1: a0 -> 2 (1)      a1 -> 0 (0)
/// 2: a0 -> 2 (1)      a1 -> 1 (-0.1)
/// 3: a0 -> 3 (1)      a1 -> 3 (1)
/// ```
pub fn toy_irreversibility() -> Result<TabularMdp> {
    let transitions = deterministic_transitions(&[
        [(1, -0.1), (3, 1.)],
        [(2, 1.), (0, 0.)],
        [(2, 1.), (1, -0.1)],
        [(3, 1.), (3, 1.)],
    ]);

    TabularMdp::with_identity_features(4, 2, transitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdps::mdp::Mdp;
    use float_eq::*;

    #[test]
    fn state_three_is_absorbing() {
        let mdp = toy_irreversibility().unwrap();
        let m = mdp.transition_model();

        for a in 0..mdp.n_a() {
            assert_float_eq!(m.p(3, a, 3), 1., abs <= 1e-12);
        }
        assert_float_eq!(m.p(0, 1, 3), 1., abs <= 1e-12);
        assert_float_eq!(mdp.transitions()[&(0, 0)][0].reward, -0.1, abs <= 1e-12);
    }
}
