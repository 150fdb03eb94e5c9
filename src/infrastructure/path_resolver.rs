use crate::core::{interfaces::PathResolver, models::default_extensions};
use crate::utils::{BundleError, Result};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Resolves `./`, `../` and absolute specifiers by lexical path arithmetic.
/// Bare specifiers (package names) are rejected.
#[derive(Debug, Clone)]
pub struct RelativePathResolver {
    extensions: Vec<String>,
}

impl Default for RelativePathResolver {
    fn default() -> Self {
        Self::new(default_extensions())
    }
}

impl RelativePathResolver {
    pub fn new(extensions: Vec<String>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    fn with_suffix(path: &Path, ext: &str) -> PathBuf {
        let mut raw: OsString = path.as_os_str().to_owned();
        raw.push(".");
        raw.push(ext);
        PathBuf::from(raw)
    }
}

fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

impl PathResolver for RelativePathResolver {
    fn dir_of(&self, path: &Path) -> PathBuf {
        path.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"))
    }

    fn normalize(&self, path: &Path) -> PathBuf {
        let mut normalized = PathBuf::new();

        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match normalized.components().next_back() {
                    Some(Component::Normal(_)) => {
                        normalized.pop();
                    }
                    // `/..` is `/`
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => normalized.push(".."),
                },
                other => normalized.push(other.as_os_str()),
            }
        }

        normalized
    }

    fn resolve(&self, base_dir: &Path, specifier: &str, importer: &Path) -> Result<PathBuf> {
        if is_relative_specifier(specifier) {
            return Ok(self.normalize(&base_dir.join(specifier)));
        }

        if specifier.starts_with('/') {
            return Ok(self.normalize(Path::new(specifier)));
        }

        Err(BundleError::resolution(
            specifier,
            importer,
            "bare specifier not supported; use a relative path",
        ))
    }

    fn candidates(&self, resolved: &Path) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(1 + self.extensions.len() * 2);
        candidates.push(resolved.to_path_buf());

        for ext in &self.extensions {
            candidates.push(Self::with_suffix(resolved, ext));
        }

        for ext in &self.extensions {
            candidates.push(resolved.join(format!("index.{}", ext)));
        }

        candidates
    }
}
