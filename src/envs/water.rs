use super::tabular::{deterministic_transitions, TabularMdp};
use crate::error::Result;

/// Seven states, three actions; states 4..=6 form a closed loop that the
/// agent cannot leave once entered.
pub fn water() -> Result<TabularMdp> {
    let transitions = deterministic_transitions(&[
        [(0, 1.), (1, 1.), (3, 1.)],
        [(4, 1.), (4, 1.), (5, 1.)],
        [(2, 1.), (4, 1.), (6, 1.)],
        [(6, 1.), (5, 1.), (6, 1.)],
        [(4, 1.), (4, 1.), (5, 1.)],
        [(5, 1.), (4, 1.), (6, 1.)],
        [(6, 1.), (5, 1.), (6, 1.)],
    ]);

    TabularMdp::with_identity_features(7, 3, transitions)
}
