pub mod occupancy;
pub mod soft_value_iteration;
