use crate::core::models::*;
use crate::utils::{BundleError, Result, Timer};
use std::fmt::Write as _;

/// Loader prepended to every bundle. Caches each module record by identity
/// before running its factory, so a re-entrant `require` during a cycle
/// sees the live, partially filled `exports`.
pub const RUNTIME: &str = include_str!("runtime.js");

/// Serializes a finished graph into one self-invoking script.
#[derive(Debug, Clone, Default)]
pub struct BundleEmitter {
    banner: Option<String>,
}

impl BundleEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    pub fn emit(&self, graph: &Graph) -> Result<String> {
        let _timer = Timer::start("Emitting bundle");

        if graph.is_empty() {
            return Err(BundleError::Build("cannot emit an empty graph".to_string()));
        }

        let mut bundle = String::new();
        if let Some(banner) = &self.banner {
            for line in banner.lines() {
                let _ = writeln!(bundle, "// {}", line);
            }
        }

        bundle.push_str(RUNTIME.trim_end());
        bundle.push_str("({\n");

        for asset in graph.iter() {
            for target in asset.mapping.values() {
                if graph.get(*target).is_none() {
                    return Err(BundleError::Build(format!(
                        "{} maps to unknown asset #{}",
                        asset.path.display(),
                        target
                    )));
                }
            }

            let mapping = serde_json::to_string(&asset.mapping)?;
            let _ = write!(
                bundle,
                "  {}: [\n    function (require, module, exports) {{\n{}\n    }},\n    {}\n  ],\n",
                asset.id,
                asset.code.trim_end(),
                mapping
            );
        }

        bundle.push_str("});\n");
        Ok(bundle)
    }
}
