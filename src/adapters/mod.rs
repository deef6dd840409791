pub mod audit;
pub mod tracking;
