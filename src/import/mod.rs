pub mod category;
pub mod orchestrator;
pub mod stats;
