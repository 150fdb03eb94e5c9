use crate::core::{asset::*, interfaces::*, models::*};
use crate::utils::{BundleError, Logger, Result, Timer};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Breadth-first discovery of every module reachable from an entry.
///
/// A single `path -> identity` table is consulted before any asset is
/// built. It covers both shared dependencies (built once) and cycles (an
/// ancestor is already in the table, so the edge points back at it).
pub struct GraphBuilder {
    assets: AssetBuilder,
    reader: Arc<dyn SourceReader>,
    resolver: Arc<dyn PathResolver>,
}

impl GraphBuilder {
    pub fn new(
        reader: Arc<dyn SourceReader>,
        transformer: Arc<dyn ModuleTransformer>,
        resolver: Arc<dyn PathResolver>,
    ) -> Self {
        Self {
            assets: AssetBuilder::new(reader.clone(), transformer),
            reader,
            resolver,
        }
    }

    pub async fn build_graph(&self, entry: &Path) -> Result<Graph> {
        let _timer = Timer::start("Building module graph");

        let mut ids = IdAllocator::new();
        let mut graph = Graph::new();
        let mut known: HashMap<PathBuf, AssetId> = HashMap::new();
        let mut queue: VecDeque<AssetId> = VecDeque::new();

        let entry = self.resolver.normalize(entry);
        let root = self.assets.build(&entry, &mut ids).await?;
        known.insert(root.path.clone(), root.id);
        queue.push_back(root.id);
        graph.push(root);

        while let Some(id) = queue.pop_front() {
            let (importer, dependencies) = match graph.get(id) {
                Some(asset) => (asset.path.clone(), asset.dependencies.clone()),
                None => return Err(BundleError::Build(format!("asset #{} missing from graph", id))),
            };
            let base_dir = self.resolver.dir_of(&importer);
            let mut mapping = BTreeMap::new();

            for specifier in &dependencies {
                let path = self.locate(&base_dir, specifier, &importer)?;

                let child = match known.get(&path) {
                    Some(&existing) => {
                        Logger::edge_reused(specifier, &importer, existing.index());
                        existing
                    }
                    None => {
                        let asset = self.assets.build(&path, &mut ids).await?;
                        let child = asset.id;
                        known.insert(path, child);
                        queue.push_back(child);
                        graph.push(asset);
                        child
                    }
                };

                mapping.insert(specifier.clone(), child);
            }

            if let Some(asset) = graph.get_mut(id) {
                asset.mapping = mapping;
            }
        }

        Logger::graph_complete(graph.len());
        Ok(graph)
    }

    /// First existing candidate for `specifier`, or a resolution error.
    fn locate(&self, base_dir: &Path, specifier: &str, importer: &Path) -> Result<PathBuf> {
        let resolved = self.resolver.resolve(base_dir, specifier, importer)?;

        self.resolver
            .candidates(&resolved)
            .into_iter()
            .find(|candidate| self.reader.file_exists(candidate))
            .ok_or_else(|| {
                BundleError::resolution(
                    specifier,
                    importer,
                    format!("no such file: {}", resolved.display()),
                )
            })
    }
}
