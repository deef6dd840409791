pub mod log;
pub mod status;
