use crate::core::{emitter::*, graph::*, interfaces::*, models::*};
use crate::utils::{BundleError, Logger, Result, Timer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Main build service: graph, then bundle text, then one file on disk.
pub struct BundleBuildService {
    fs_service: Arc<dyn SourceReader>,
    graph_builder: GraphBuilder,
}

impl BundleBuildService {
    pub fn new(
        fs_service: Arc<dyn SourceReader>,
        transformer: Arc<dyn ModuleTransformer>,
        resolver: Arc<dyn PathResolver>,
    ) -> Self {
        Self {
            graph_builder: GraphBuilder::new(fs_service.clone(), transformer, resolver),
            fs_service,
        }
    }

    /// Absolute entry path: `entry` joined onto `root`, then onto the cwd.
    pub fn entry_path(&self, config: &BuildConfig) -> Result<PathBuf> {
        let joined = config.root.join(&config.entry);
        std::path::absolute(&joined).map_err(|e| BundleError::io(joined, e))
    }

    pub async fn build_graph(&self, config: &BuildConfig) -> Result<Graph> {
        let entry = self.entry_path(config)?;
        self.graph_builder.build_graph(&entry).await
    }

    /// Graph and bundle text, nothing written.
    pub async fn bundle(&self, config: &BuildConfig) -> Result<(Graph, String)> {
        let graph = self.build_graph(config).await?;
        let code = BundleEmitter::new()
            .with_banner(config.banner.clone())
            .emit(&graph)?;
        Ok((graph, code))
    }
}

#[async_trait::async_trait]
impl BuildService for BundleBuildService {
    async fn build(&self, config: &BuildConfig) -> Result<BuildResult> {
        let _timer = Timer::start("Build");
        let start = Instant::now();

        Logger::build_start(&config.entry, &config.outdir);

        let (graph, code) = self.bundle(config).await?;

        let path = config.root.join(config.output_path());
        self.fs_service.write_file(&path, &code).await?;
        Logger::bundle_written(&path, code.len());

        Ok(BuildResult {
            module_count: graph.len(),
            build_time: start.elapsed(),
            content_hash: blake3::hash(code.as_bytes()).to_hex().to_string(),
            output_file: OutputFile {
                path,
                size: code.len(),
                content: code,
            },
        })
    }
}
