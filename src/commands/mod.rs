pub mod analyze;
pub mod batch;
mod records;
pub mod status;
mod store;
