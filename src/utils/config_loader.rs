use crate::core::models::{default_extensions, BuildConfig};
use crate::utils::{BundleError, Logger, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "tinypack.config.json";

/// Configuration file format (tinypack.config.json)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    /// Entry point file (e.g., "src/main.js")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    /// Output directory (default: "dist")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outdir: Option<String>,

    /// Bundle file name (default: "bundle.js")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Extensions probed for extensionless specifiers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,

    /// Comment placed at the top of the bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

/// Values given on the command line. `None` defers to the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub entry: Option<String>,
    pub outdir: Option<String>,
    pub filename: Option<String>,
}

/// Config loader that supports config files with CLI override
pub struct ConfigLoader;

impl ConfigLoader {
    /// Searches for tinypack.config.json in the project root
    pub fn load_from_file(root: &Path) -> Result<Option<FileConfig>> {
        let config_path = root.join(CONFIG_FILE_NAME);

        if !config_path.is_file() {
            Logger::debug(&format!("No {} found, using defaults", CONFIG_FILE_NAME));
            return Ok(None);
        }

        Logger::debug(&format!("Loading config from {}", config_path.display()));

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| BundleError::io(&config_path, e))?;

        let config: FileConfig = serde_json::from_str(&content).map_err(|e| {
            BundleError::config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;

        Ok(Some(config))
    }

    /// CLI > config file > defaults.
    pub fn merge_with_cli(
        file_config: Option<FileConfig>,
        root: PathBuf,
        cli: CliOverrides,
    ) -> Result<BuildConfig> {
        let base = file_config.unwrap_or_default();

        let entry = cli.entry.or(base.entry).ok_or_else(|| {
            BundleError::config(format!(
                "no entry given; pass one on the command line or set \"entry\" in {}",
                CONFIG_FILE_NAME
            ))
        })?;

        let outdir = cli
            .outdir
            .or(base.outdir)
            .unwrap_or_else(|| "dist".to_string());

        let filename = cli
            .filename
            .or(base.filename)
            .unwrap_or_else(|| "bundle.js".to_string());

        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(BundleError::config(format!(
                "filename must be a plain file name, got '{}'",
                filename
            )));
        }

        Ok(BuildConfig {
            root,
            entry: PathBuf::from(entry),
            outdir: PathBuf::from(outdir),
            filename,
            extensions: base.extensions.unwrap_or_else(default_extensions),
            banner: base.banner,
        })
    }

    /// Generate example config file
    pub fn generate_example() -> String {
        let example = FileConfig {
            entry: Some("src/main.js".to_string()),
            outdir: Some("dist".to_string()),
            filename: Some("bundle.js".to_string()),
            extensions: Some(default_extensions()),
            banner: None,
        };
        serde_json::to_string_pretty(&example).unwrap_or_default()
    }
}
