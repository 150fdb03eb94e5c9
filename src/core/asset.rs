use crate::core::{interfaces::*, models::*};
use crate::utils::{Logger, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Hands out identities in discovery order. One allocator per build.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> AssetId {
        let id = AssetId(self.next);
        self.next += 1;
        id
    }

    pub fn allocated(&self) -> usize {
        self.next
    }
}

/// Reads one file and runs it through the transformer.
pub struct AssetBuilder {
    reader: Arc<dyn SourceReader>,
    transformer: Arc<dyn ModuleTransformer>,
}

impl AssetBuilder {
    pub fn new(reader: Arc<dyn SourceReader>, transformer: Arc<dyn ModuleTransformer>) -> Self {
        Self {
            reader,
            transformer,
        }
    }

    /// Allocates an identity only once read and parse have succeeded.
    pub async fn build(&self, path: &Path, ids: &mut IdAllocator) -> Result<Asset> {
        let source = self.reader.read_source(path).await?;
        let output = self.transformer.transform(path, &source)?;
        let id = ids.allocate();

        Logger::asset_built(id.index(), path, output.specifiers.len());

        Ok(Asset {
            id,
            path: path.to_path_buf(),
            dependencies: output.specifiers,
            code: output.code,
            mapping: BTreeMap::new(),
        })
    }
}
