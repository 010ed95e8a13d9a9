pub mod metrics;
pub mod supervisor;
