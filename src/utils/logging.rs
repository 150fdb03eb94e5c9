use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub struct Logger;

impl Logger {
    /// Install the global subscriber. `RUST_LOG` wins over the verbosity flag.
    pub fn init(verbose: bool) {
        let default_filter = if verbose { "tinypack=debug" } else { "tinypack=info" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        // A second init (tests, embedding) is not an error.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    }

    pub fn build_start(entry: &Path, outdir: &Path) {
        info!("📦 tinypack - bundling");
        info!("📁 Entry: {}", entry.display());
        info!("📦 Output: {}", outdir.display());
    }

    pub fn asset_built(id: usize, path: &Path, dependency_count: usize) {
        debug!("🔍 Asset #{} {} ({} deps)", id, path.display(), dependency_count);
    }

    pub fn edge_reused(specifier: &str, importer: &Path, id: usize) {
        debug!("🔁 '{}' from {} -> existing asset #{}", specifier, importer.display(), id);
    }

    pub fn graph_complete(asset_count: usize) {
        info!("🌳 Module graph: {} assets", asset_count);
    }

    pub fn bundle_written(path: &Path, size: usize) {
        info!("✅ Wrote {} ({} bytes)", path.display(), size);
    }

    pub fn debug(msg: &str) {
        debug!("{}", msg);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!("⏱️  Completed: {} in {:.2?}", self.name, self.elapsed());
    }
}
