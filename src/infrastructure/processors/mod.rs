// Processors module
pub mod js_processor;

pub use js_processor::*;
