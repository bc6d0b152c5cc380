use crate::Discrete;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IrlError>;

#[derive(Debug, Error)]
pub enum IrlError {
    #[error("MDP must have at least one state and one action, got n_s = {n_s}, n_a = {n_a}")]
    EmptyMdp { n_s: usize, n_a: usize },

    #[error("no transitions given for state {s}, action {a}")]
    MissingTransitions { s: Discrete, a: Discrete },

    #[error("transition ({s}, {a}) -> {next_state} leaves the state space of size {n_s}")]
    StateOutOfRange {
        s: Discrete,
        a: Discrete,
        next_state: Discrete,
        n_s: usize,
    },

    #[error("transition ({s}, {a}) -> {next_state} has invalid probability {probability}")]
    InvalidProbability {
        s: Discrete,
        a: Discrete,
        next_state: Discrete,
        probability: f64,
    },

    #[error("transition probabilities for ({s}, {a}) sum to {sum}, expected 1")]
    NotStochastic { s: Discrete, a: Discrete, sum: f64 },

    #[error("{what}: expected length {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The observed state has zero last-step occupancy: no gradient exists.
    #[error("no feasible trajectory reaches state {state} (epoch {epoch})")]
    InfeasibleTrajectory { state: Discrete, epoch: usize },

    #[error("non-finite value in {what} (epoch {epoch:?})")]
    NumericalInstability {
        what: &'static str,
        epoch: Option<usize>,
    },

    #[error("invalid prior: {0}")]
    InvalidPrior(String),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IrlError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Attach the epoch in which a numerical problem surfaced.
    pub(crate) fn at_epoch(self, epoch: usize) -> Self {
        match self {
            Self::NumericalInstability { what, .. } => Self::NumericalInstability {
                what,
                epoch: Some(epoch),
            },
            e => e,
        }
    }
}
