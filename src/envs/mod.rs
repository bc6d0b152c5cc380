pub mod chain;
pub mod tabular;
pub mod toy_irreversibility;
pub mod water;

pub use chain::chain;
pub use tabular::TabularMdp;
pub use toy_irreversibility::toy_irreversibility;
pub use water::water;
