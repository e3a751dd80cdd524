pub mod average;
pub mod plan;
