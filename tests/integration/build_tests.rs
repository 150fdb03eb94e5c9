use std::path::{Path, PathBuf};
use std::sync::Arc;
use tinypack::core::interfaces::BuildService;
use tinypack::core::models::{AssetId, BuildConfig};
use tinypack::core::services::BundleBuildService;
use tinypack::infrastructure::{OxcJsProcessor, RelativePathResolver, TokioFileSystemService};
use tinypack::utils::{graph_to_json, CliOverrides, ConfigLoader};
use tinypack::BundleError;

fn service() -> BundleBuildService {
    BundleBuildService::new(
        Arc::new(TokioFileSystemService),
        Arc::new(OxcJsProcessor::new()),
        Arc::new(RelativePathResolver::default()),
    )
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn config(root: &Path, entry: &str) -> BuildConfig {
    let mut config = BuildConfig::new(entry);
    config.root = root.to_path_buf();
    config
}

#[tokio::test]
async fn test_fixture_project_build() -> anyhow::Result<()> {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/hello");
    let outdir = tempfile::tempdir()?;

    let file_config = ConfigLoader::load_from_file(&fixture)?;
    let config = ConfigLoader::merge_with_cli(
        file_config,
        fixture.clone(),
        CliOverrides {
            outdir: Some(outdir.path().display().to_string()),
            ..Default::default()
        },
    )?;

    let result = service().build(&config).await?;

    assert_eq!(result.module_count, 2);
    let bundle_path = outdir.path().join("bundle.js");
    assert_eq!(result.output_file.path, bundle_path);
    let bundle = std::fs::read_to_string(&bundle_path)?;
    assert!(bundle.contains("console.log('message: ' + __tinypack_dep0.message);"));
    assert!(bundle.contains(r#"{"./message.js":1}"#));
    assert!(!bundle.contains(&fixture.display().to_string()));
    Ok(())
}

#[tokio::test]
async fn test_builds_are_deterministic() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "src/main.js", "import './b.js';\nimport { a } from './a.js';\nconsole.log(a);\n");
    write(dir.path(), "src/a.js", "import { b } from './b.js';\nexport const a = b + 1;\n");
    write(dir.path(), "src/b.js", "export const b = 1;\n");

    let first = service().build(&config(dir.path(), "src/main.js")).await?;
    let second = service().build(&config(dir.path(), "src/main.js")).await?;

    assert_eq!(first.output_file.content, second.output_file.content);
    assert_eq!(first.content_hash, second.content_hash);
    Ok(())
}

#[tokio::test]
async fn test_every_reachable_module_appears_once() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "main.js", "import './a.js';\nimport './b.js';\nimport './a.js';\n");
    write(dir.path(), "a.js", "import { s } from './shared';\n");
    write(dir.path(), "b.js", "import { s } from './shared/../shared.js';\n");
    write(dir.path(), "shared.js", "export const s = 1;\n");

    let graph = service().build_graph(&config(dir.path(), "main.js")).await?;

    assert_eq!(graph.len(), 4);
    let mut paths: Vec<_> = graph.iter().map(|a| a.path.clone()).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 4);

    for asset in graph.iter() {
        for (specifier, id) in &asset.mapping {
            assert!(asset.dependencies.contains(specifier));
            assert!(graph.get(*id).is_some());
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_extension_and_index_probing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "main.js", "import { x } from './util';\nimport { y } from './lib';\n");
    write(dir.path(), "util.mjs", "export const x = 1;\n");
    write(dir.path(), "lib/index.js", "export const y = 2;\n");

    let graph = service().build_graph(&config(dir.path(), "main.js")).await?;

    let entry = graph.entry().unwrap();
    assert!(graph.get(entry.mapping["./util"]).unwrap().path.ends_with("util.mjs"));
    assert!(graph.get(entry.mapping["./lib"]).unwrap().path.ends_with("lib/index.js"));
    Ok(())
}

#[tokio::test]
async fn test_missing_import_fails_without_artifact() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "main.js", "import { nothing } from './does-not-exist.js';\n");

    let config = config(dir.path(), "main.js");
    let err = service().build(&config).await.unwrap_err();

    match err {
        BundleError::Resolution { specifier, importer, reason } => {
            assert_eq!(specifier, "./does-not-exist.js");
            assert!(importer.ends_with("main.js"));
            assert!(reason.contains("does-not-exist.js"));
        }
        other => panic!("expected resolution error, got {:?}", other),
    }
    assert!(!dir.path().join("dist/bundle.js").exists());
    Ok(())
}

#[tokio::test]
async fn test_parse_error_names_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "main.js", "import './broken.js';\n");
    write(dir.path(), "broken.js", "export const = 1;\n");

    let err = service().build(&config(dir.path(), "main.js")).await.unwrap_err();

    assert!(matches!(err, BundleError::Parse { ref path, .. } if path.ends_with("broken.js")));
    assert!(!dir.path().join("dist").exists());
    Ok(())
}

#[tokio::test]
async fn test_graph_json_uses_relative_paths() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "src/main.js", "import './dep.js';\n");
    write(dir.path(), "src/dep.js", "export default 1;\n");

    let graph = service().build_graph(&config(dir.path(), "src/main.js")).await?;
    assert_eq!(graph.entry().unwrap().mapping["./dep.js"], AssetId(1));

    let json: serde_json::Value = serde_json::from_str(&graph_to_json(&graph, dir.path())?)?;
    assert_eq!(json[0]["path"], "src/main.js");
    assert_eq!(json[0]["dependencies"]["./dep.js"], 1);
    assert_eq!(json[1]["path"], "src/dep.js");
    Ok(())
}
