// Core domain layer
pub mod models;
pub mod interfaces;
pub mod asset;
pub mod graph;
pub mod emitter;
pub mod services;

pub use models::*;
pub use interfaces::*;
pub use asset::*;
pub use graph::*;
pub use emitter::*;
pub use services::*;
