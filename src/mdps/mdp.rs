use super::transition_model::TransitionModel;
use crate::{Continous, Discrete};
use ndarray::Array2;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next_state: Discrete,
    pub probability: Continous,
    pub reward: Continous,
}

impl Transition {
    pub fn new(probability: Continous, next_state: Discrete, reward: Continous) -> Self {
        Self {
            next_state,
            probability,
            reward,
        }
    }
}

/// Keyed by `(state, action)`.
pub type Transitions = HashMap<(Discrete, Discrete), Vec<Transition>>;

/// Markov Decision Process - Sutton & Barto 2018.
///
/// Read-only during inference. The dense transition model is derived once
/// from [`Mdp::transitions`] and cached by the implementor.
pub trait Mdp {
    fn n_s(&self) -> usize;

    fn n_a(&self) -> usize;

    fn transitions(&self) -> Rc<Transitions>;

    fn transition_model(&self) -> &TransitionModel;

    /// Shape `(n_s, num_features)`.
    fn feature_matrix(&self) -> &Array2<Continous>;

    fn num_features(&self) -> usize {
        self.feature_matrix().ncols()
    }
}
