pub mod approval;
pub mod constraints;
pub mod engine;
pub mod loop_detection;
pub mod risk;
pub mod scope;

pub use engine::decide;
