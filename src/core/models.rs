use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Identity of an asset within one build. The entry is always `AssetId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub usize);

impl AssetId {
    pub const ENTRY: AssetId = AssetId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One parsed and transformed module plus its dependency metadata.
#[derive(Debug, Clone)]
pub struct Asset {
    pub id: AssetId,
    pub path: PathBuf,
    /// Raw specifiers in source order, as written.
    pub dependencies: Vec<String>,
    /// Function body expecting `require`, `module` and `exports`.
    pub code: String,
    /// Literal specifier -> identity. Filled by the graph builder.
    pub mapping: BTreeMap<String, AssetId>,
}

impl Asset {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
    }
}

/// Assets indexed by identity: `assets[i].id == AssetId(i)`.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    assets: Vec<Asset>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, asset: Asset) {
        debug_assert_eq!(asset.id.index(), self.assets.len());
        self.assets.push(asset);
    }

    pub(crate) fn get_mut(&mut self, id: AssetId) -> Option<&mut Asset> {
        self.assets.get_mut(id.index())
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(id.index())
    }

    pub fn entry(&self) -> Option<&Asset> {
        self.get(AssetId::ENTRY)
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }
}

/// What the parse/transform collaborator hands back for one source text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOutput {
    pub specifiers: Vec<String>,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    pub entry: PathBuf,
    #[serde(default = "default_outdir")]
    pub outdir: PathBuf,
    #[serde(default = "default_filename")]
    pub filename: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub banner: Option<String>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_outdir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_filename() -> String {
    "bundle.js".to_string()
}

pub fn default_extensions() -> Vec<String> {
    vec!["js".to_string(), "mjs".to_string(), "cjs".to_string()]
}

impl BuildConfig {
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        Self {
            root: default_root(),
            entry: entry.into(),
            outdir: default_outdir(),
            filename: default_filename(),
            extensions: default_extensions(),
            banner: None,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.outdir.join(&self.filename)
    }
}

#[derive(Debug)]
pub struct BuildResult {
    pub module_count: usize,
    pub build_time: std::time::Duration,
    pub output_file: OutputFile,
    /// blake3 of the bundle text, hex encoded.
    pub content_hash: String,
}

#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub content: String,
    pub size: usize,
}
