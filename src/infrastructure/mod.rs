// Infrastructure layer
pub mod file_system;
pub mod path_resolver;
pub mod processors;

pub use file_system::*;
pub use path_resolver::*;
pub use processors::*;
