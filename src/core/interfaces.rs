use crate::core::models::{BuildConfig, BuildResult, TransformOutput};
use crate::utils::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// File system operations interface
#[async_trait]
pub trait SourceReader: Send + Sync {
    async fn read_source(&self, path: &Path) -> Result<String>;
    async fn write_file(&self, path: &Path, content: &str) -> Result<()>;
    fn file_exists(&self, path: &Path) -> bool;
}

/// Turns one source text into its static import specifiers and a body
/// runnable inside a `(require, module, exports)` function.
pub trait ModuleTransformer: Send + Sync {
    fn transform(&self, path: &Path, source: &str) -> Result<TransformOutput>;
}

/// Pure path arithmetic. Never touches the file system.
pub trait PathResolver: Send + Sync {
    fn dir_of(&self, path: &Path) -> PathBuf;

    /// Lexically collapse `.` and `..` so equal files get equal keys.
    fn normalize(&self, path: &Path) -> PathBuf;

    /// Join `specifier` onto `base_dir`. `importer` is only used for errors.
    fn resolve(&self, base_dir: &Path, specifier: &str, importer: &Path) -> Result<PathBuf>;

    /// Paths to probe, in order, for an already resolved base path.
    fn candidates(&self, resolved: &Path) -> Vec<PathBuf>;
}

/// Build service interface
#[async_trait]
pub trait BuildService: Send + Sync {
    async fn build(&self, config: &BuildConfig) -> Result<BuildResult>;
}
