//! Executes emitted bundles with `node`.
//!
//! Without `node` on PATH each test prints a `SKIPPED` line and returns.
//! Set `TINYPACK_REQUIRE_NODE=1` to turn a missing `node` into a failure.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tinypack::core::interfaces::BuildService;
use tinypack::core::models::BuildConfig;
use tinypack::core::services::BundleBuildService;
use tinypack::infrastructure::{OxcJsProcessor, RelativePathResolver, TokioFileSystemService};

fn node_available() -> bool {
    Command::new("node")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// True when the test should not run. Panics instead when node is required.
fn skip_without_node(test: &str) -> bool {
    if node_available() {
        return false;
    }
    if std::env::var_os("TINYPACK_REQUIRE_NODE").is_some() {
        panic!("{}: node not found on PATH and TINYPACK_REQUIRE_NODE is set", test);
    }
    eprintln!("SKIPPED {}: node not found on PATH", test);
    true
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Builds `entry` under `root` and returns what the bundle prints.
async fn bundle_and_run(root: &Path, entry: &str) -> String {
    let service = BundleBuildService::new(
        Arc::new(TokioFileSystemService),
        Arc::new(OxcJsProcessor::new()),
        Arc::new(RelativePathResolver::default()),
    );
    let mut config = BuildConfig::new(entry);
    config.root = root.to_path_buf();

    let result = service.build(&config).await.unwrap();

    let output = Command::new("node")
        .arg(&result.output_file.path)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "bundle failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[tokio::test]
async fn test_hello_world_round_trip() {
    if skip_without_node("test_hello_world_round_trip") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "entry.js",
        "import { message } from './message.js';\nconsole.log('message: ' + message);\n",
    );
    write(dir.path(), "message.js", "export const message = 'hello world';\n");

    let stdout = bundle_and_run(dir.path(), "entry.js").await;
    assert_eq!(stdout, "message: hello world\n");
}

#[tokio::test]
async fn test_shared_module_evaluates_once() {
    if skip_without_node("test_shared_module_evaluates_once") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "entry.js",
        "import { fromA } from './a.js';\nimport { fromB } from './b.js';\nconsole.log(fromA === fromB);\n",
    );
    write(dir.path(), "a.js", "import { state } from './shared.js';\nexport const fromA = state;\n");
    write(dir.path(), "b.js", "import { state } from './shared.js';\nexport const fromB = state;\n");
    write(
        dir.path(),
        "shared.js",
        "console.log('shared evaluated');\nexport const state = {};\n",
    );

    let stdout = bundle_and_run(dir.path(), "entry.js").await;
    assert_eq!(stdout, "shared evaluated\ntrue\n");
}

#[tokio::test]
async fn test_cycle_completes_with_partial_exports() {
    if skip_without_node("test_cycle_completes_with_partial_exports") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "a.js",
        "import { b, readA } from './b.js';\nexport const a = 'a';\nconsole.log('a sees ' + b);\nconsole.log('later b sees ' + readA());\n",
    );
    write(
        dir.path(),
        "b.js",
        "import * as ns from './a.js';\nexport const b = 'b';\nexport function readA() { return ns.a; }\nconsole.log('b sees ' + ns.a);\n",
    );

    let stdout = bundle_and_run(dir.path(), "a.js").await;
    assert_eq!(stdout, "b sees undefined\na sees b\nlater b sees a\n");
}

#[tokio::test]
async fn test_default_exports_and_reexports() {
    if skip_without_node("test_default_exports_and_reexports") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "entry.js",
        "import greet, { name, shout } from './lib/index.js';\nconsole.log(shout(greet(name)));\n",
    );
    write(
        dir.path(),
        "lib/index.js",
        "export { default } from './greet.js';\nexport * from './names.js';\nexport { shout } from './text.js';\n",
    );
    write(dir.path(), "lib/greet.js", "export default function greet(who) { return 'hello ' + who; }\n");
    write(dir.path(), "lib/names.js", "export const name = 'tinypack';\nexport default 'ignored';\n");
    write(dir.path(), "lib/text.js", "export const shout = (s) => s.toUpperCase() + '!';\n");

    let stdout = bundle_and_run(dir.path(), "entry.js").await;
    assert_eq!(stdout, "HELLO TINYPACK!\n");
}

#[tokio::test]
async fn test_local_export_wins_over_export_star() {
    if skip_without_node("test_local_export_wins_over_export_star") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "entry.js", "import { x, y } from './lib.js';\nconsole.log(x, y);\n");
    write(
        dir.path(),
        "lib.js",
        "export * from './a.js';\nexport const x = 'local';\nexport { y } from './b.js';\n",
    );
    write(dir.path(), "a.js", "export const x = 'from a';\nexport const y = 'from a';\n");
    write(dir.path(), "b.js", "export const y = 'from b';\n");

    let stdout = bundle_and_run(dir.path(), "entry.js").await;
    assert_eq!(stdout, "local from b\n");
}

#[tokio::test]
async fn test_named_import_cycle_sees_later_value() {
    if skip_without_node("test_named_import_cycle_sees_later_value") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "a.js",
        "import { readA } from './b.js';\nexport const a = 'a';\nconsole.log(readA());\n",
    );
    write(
        dir.path(),
        "b.js",
        "import { a } from './a.js';\nexport function readA() { return a; }\n",
    );

    let stdout = bundle_and_run(dir.path(), "a.js").await;
    assert_eq!(stdout, "a\n");
}

#[tokio::test]
async fn test_imported_let_reflects_exporter_updates() {
    if skip_without_node("test_imported_let_reflects_exporter_updates") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "entry.js",
        "import { count, inc } from './counter.js';\nimport * as counter from './counter.js';\ninc();\ninc();\nconsole.log(count, counter.count);\n",
    );
    write(
        dir.path(),
        "counter.js",
        "export let count = 0;\nexport function inc() { count++; }\n",
    );

    let stdout = bundle_and_run(dir.path(), "entry.js").await;
    assert_eq!(stdout, "2 2\n");
}
