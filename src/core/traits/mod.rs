pub mod audit;
pub mod change_tracker;
pub mod entity;
