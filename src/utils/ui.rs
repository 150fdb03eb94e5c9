use crate::core::models::{BuildResult, Graph};
use colored::*;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

pub struct BuildUI;

impl BuildUI {
    pub fn show_banner() {
        println!(
            "\n  {} {}",
            "TINYPACK".bright_cyan().bold(),
            concat!("v", env!("CARGO_PKG_VERSION")).bright_white()
        );
        println!();
    }

    pub fn show_completion(result: &BuildResult) {
        let file = &result.output_file;
        let name = file
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("bundle.js");
        let dir = file
            .path
            .parent()
            .map(|p| format!("{}/", p.display()))
            .unwrap_or_default();

        println!(
            "  {}{} {} {}",
            dir.bright_black(),
            name.bright_cyan(),
            format!("({})", format_size(file.size)).bright_black(),
            format!("gzip: {}", format_size(gzip_size(&file.content))).bright_black()
        );
        println!(
            "  {} modules, hash {}",
            result.module_count.to_string().bright_cyan().bold(),
            &result.content_hash[..12]
        );

        println!();
        println!(
            "  {} built in {}",
            "✓".bright_green(),
            format!("{:.0}ms", result.build_time.as_secs_f64() * 1000.0)
                .bright_white()
                .bold()
        );
    }
}

pub fn format_size(bytes: usize) -> String {
    let size_kb = bytes as f64 / 1024.0;
    if size_kb < 1.0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} kB", size_kb)
    }
}

pub fn gzip_size(content: &str) -> usize {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    if encoder.write_all(content.as_bytes()).is_err() {
        return 0;
    }
    encoder.finish().map(|bytes| bytes.len()).unwrap_or(0)
}

#[derive(Serialize)]
struct GraphNode<'g> {
    id: usize,
    path: String,
    dependencies: &'g BTreeMap<String, crate::core::models::AssetId>,
}

/// Module graph as pretty JSON, paths shown relative to `root` when possible.
pub fn graph_to_json(graph: &Graph, root: &Path) -> serde_json::Result<String> {
    let nodes: Vec<GraphNode> = graph
        .iter()
        .map(|asset| GraphNode {
            id: asset.id.index(),
            path: asset
                .path
                .strip_prefix(root)
                .unwrap_or(&asset.path)
                .display()
                .to_string(),
            dependencies: &asset.mapping,
        })
        .collect();

    serde_json::to_string_pretty(&nodes)
}
