use crate::core::{interfaces::*, models::*, services::*};
use crate::infrastructure::{OxcJsProcessor, RelativePathResolver, TokioFileSystemService};
use crate::utils::{graph_to_json, BuildUI, CliOverrides, ConfigLoader, Logger, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "tinypack")]
#[command(version, about = "tinypack - bundle an ES module graph into one script")]
pub struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bundle an entry module and write the result
    Build {
        /// Entry module, relative to the root (falls back to the config file)
        entry: Option<String>,
        /// Project root, where tinypack.config.json is looked up
        #[arg(short, long, default_value = ".")]
        root: String,
        /// Output directory
        #[arg(short, long)]
        outdir: Option<String>,
        /// Bundle file name
        #[arg(short, long)]
        filename: Option<String>,
    },
    /// Print the module graph as JSON without writing anything
    Graph {
        /// Entry module, relative to the root (falls back to the config file)
        entry: Option<String>,
        /// Project root
        #[arg(short, long, default_value = ".")]
        root: String,
    },
    /// Show bundler information
    Info,
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self) -> Result<()> {
        let cli = Cli::parse();
        Logger::init(cli.verbose);

        match cli.command {
            Commands::Build {
                entry,
                root,
                outdir,
                filename,
            } => {
                let overrides = CliOverrides {
                    entry,
                    outdir,
                    filename,
                };
                self.handle_build_command(&root, overrides).await
            }
            Commands::Graph { entry, root } => {
                let overrides = CliOverrides {
                    entry,
                    ..Default::default()
                };
                self.handle_graph_command(&root, overrides).await
            }
            Commands::Info => self.handle_info_command(),
        }
    }

    fn load_config(&self, root: &str, overrides: CliOverrides) -> Result<BuildConfig> {
        let root = PathBuf::from(root);
        let file_config = ConfigLoader::load_from_file(&root)?;
        ConfigLoader::merge_with_cli(file_config, root, overrides)
    }

    fn build_service(&self, config: &BuildConfig) -> BundleBuildService {
        BundleBuildService::new(
            Arc::new(TokioFileSystemService),
            Arc::new(OxcJsProcessor::new()),
            Arc::new(RelativePathResolver::new(config.extensions.clone())),
        )
    }

    async fn handle_build_command(&self, root: &str, overrides: CliOverrides) -> Result<()> {
        let config = self.load_config(root, overrides)?;

        BuildUI::show_banner();
        let result = self.build_service(&config).build(&config).await?;
        BuildUI::show_completion(&result);

        Ok(())
    }

    async fn handle_graph_command(&self, root: &str, overrides: CliOverrides) -> Result<()> {
        let config = self.load_config(root, overrides)?;
        let service = self.build_service(&config);

        let graph = service.build_graph(&config).await?;
        let root = std::path::absolute(&config.root).unwrap_or_else(|_| config.root.clone());
        println!("{}", graph_to_json(&graph, &root)?);

        Ok(())
    }

    fn handle_info_command(&self) -> Result<()> {
        tracing::info!("🦀 tinypack v{}", env!("CARGO_PKG_VERSION"));
        tracing::info!("  • ES module graph discovery from a single entry");
        tracing::info!("  • Relative and absolute specifiers, extension and index probing");
        tracing::info!("  • One self-contained script with a caching module loader");
        tracing::info!("  • Circular imports and shared modules evaluate once");
        tracing::info!("  • Config file: {}", crate::utils::CONFIG_FILE_NAME);
        tracing::info!("Example config:\n{}", ConfigLoader::generate_example());

        Ok(())
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}
