// tinypack - dependency graph builder and bundle emitter for ES modules

pub mod cli;
pub mod core;
pub mod infrastructure;
pub mod utils;

pub use crate::core::{
    Asset, AssetBuilder, AssetId, BuildConfig, BuildResult, BuildService, BundleBuildService,
    BundleEmitter, Graph, GraphBuilder, IdAllocator,
};
pub use crate::utils::{BundleError, Result};
