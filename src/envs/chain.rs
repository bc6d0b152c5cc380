use super::tabular::{deterministic_transitions, TabularMdp};
use crate::error::Result;

/// Eight states, three actions: stay, jump, step right. States 0..=3 form the
/// chain, 4..=6 are side states reached by jumping, 7 is absorbing.
pub fn chain() -> Result<TabularMdp> {
    let transitions = deterministic_transitions(&[
        [(0, 1.), (7, 1.), (1, 1.)],
        [(1, 1.), (4, 1.), (2, 1.)],
        [(2, 1.), (5, 1.), (3, 1.)],
        [(3, 1.), (6, 1.), (3, 1.)],
        [(4, 1.), (1, 1.), (4, 1.)],
        [(5, 1.), (2, 1.), (5, 1.)],
        [(6, 1.), (3, 1.), (6, 1.)],
        [(7, 1.), (7, 1.), (7, 1.)],
    ]);

    TabularMdp::with_identity_features(8, 3, transitions)
}
