//! Unit tests for CLI commands.

use super::*;
use pluck_resolver::TopLevelGroup;
use std::fs;
use tempfile::TempDir;

const TESTNPM_TREE: &str =
    include_str!("../../../pluck-resolver/tests/fixtures/testnpm/packageTree.txt");
const TESTNPM_LIST: &str =
    include_str!("../../../pluck-resolver/tests/fixtures/testnpm/directoryList.txt");

/// Create a temporary directory for testing
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create a test command context in a temporary directory
fn create_test_context(temp_dir: &TempDir) -> CommandContext {
    CommandContext {
        cwd: Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).unwrap(),
        config_path: None,
        output: crate::output::OutputHandler::new(),
    }
}

#[test]
fn test_package_overrides() {
    let config = package_overrides(&[]).apply(PluckToml::default()).unwrap();
    assert!(config.extract.packages.is_empty());

    let config = package_overrides(&["uglify-js".to_string(), "async@0.2.10".to_string()])
        .apply(PluckToml::default())
        .unwrap();
    assert_eq!(config.extract.packages, vec!["uglify-js", "async@0.2.10"]);
}

#[test]
fn test_render_groups() {
    let groups = vec![
        TopLevelGroup {
            path: "/srv/app/node_modules/async".to_string(),
            name: "async".to_string(),
        },
        TopLevelGroup {
            path: "/srv/app/node_modules/@types/node".to_string(),
            name: "@types/node".to_string(),
        },
    ];

    assert_eq!(
        resolve::render(&groups, false).unwrap(),
        "/srv/app/node_modules/async\n/srv/app/node_modules/@types/node"
    );

    let json: serde_json::Value =
        serde_json::from_str(&resolve::render(&groups, true).unwrap()).unwrap();
    assert_eq!(json[1]["name"], "@types/node");
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_resolve_from_saved_reports() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);
    fs::write(temp_dir.path().join("tree.txt"), TESTNPM_TREE).unwrap();
    fs::write(temp_dir.path().join("list.txt"), TESTNPM_LIST).unwrap();

    let saved = Some((PathBuf::from("tree.txt"), PathBuf::from("list.txt")));
    let result = resolve::execute(vec!["uglify-js".to_string()], saved, false, &ctx).await;
    assert!(result.is_ok());

    let saved = Some((PathBuf::from("tree.txt"), PathBuf::from("list.txt")));
    let result = resolve::execute(vec!["left-pad".to_string()], saved, true, &ctx).await;
    assert!(matches!(result, Err(PluckError::PackageNotFound { .. })));
}

#[tokio::test]
async fn test_resolve_requires_packages() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);

    let saved = Some((PathBuf::from("tree.txt"), PathBuf::from("list.txt")));
    let result = resolve::execute(Vec::new(), saved, false, &ctx).await;
    assert!(matches!(result, Err(PluckError::ConfigValidation { .. })));
}

#[tokio::test]
async fn test_missing_saved_report() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);

    let saved = Some((PathBuf::from("tree.txt"), PathBuf::from("list.txt")));
    let result = resolve::execute(vec!["async".to_string()], saved, false, &ctx).await;
    assert!(matches!(result, Err(PluckError::Io { .. })));
}

#[tokio::test]
async fn test_explicit_config_must_exist() {
    let temp_dir = create_temp_dir();
    let mut ctx = create_test_context(&temp_dir);
    ctx.config_path = Some(Utf8PathBuf::from("missing.toml"));

    assert!(ctx.load_config(ConfigLayering::new()).await.is_err());
}

#[tokio::test]
async fn test_extract_requires_target_dir() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);

    let args = extract::ExtractArgs {
        packages: vec!["async".to_string()],
        target_dir: None,
        build_dir: None,
        hardlink: false,
    };
    assert!(matches!(
        extract::execute(args, &ctx).await,
        Err(PluckError::ConfigValidation { .. })
    ));
}

/// Lay out a small install plus a stand-in npm that prints its reports
#[cfg(unix)]
fn fake_install(root: &Utf8Path) {
    use std::os::unix::fs::PermissionsExt;

    let modules = root.join("node_modules");
    for package in ["uglify-js", "async", "left-pad"] {
        fs::create_dir_all(modules.join(package)).unwrap();
        fs::write(modules.join(package).join("index.js"), package).unwrap();
    }

    let tree = format!(
        "app@1.0.0 {root}\n├─┬ uglify-js@2.4.24\n│ └── async@0.2.10\n└── left-pad@1.3.0\n"
    );
    let list = format!(
        "{root}\n{modules}/uglify-js\n{modules}/async\n{modules}/left-pad\n"
    );
    fs::write(root.join("tree.txt"), tree).unwrap();
    fs::write(root.join("list.txt"), list).unwrap();

    let script = root.join("fake-npm");
    fs::write(
        &script,
        "#!/bin/sh\ndir=$(dirname \"$0\")\ncase \"$*\" in\n  *\"--parseable true\"*) cat \"$dir/list.txt\" ;;\n  *) cat \"$dir/tree.txt\" ;;\nesac\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    fs::write(
        root.join("pluck.toml"),
        format!("[extract]\ntarget-dir = \"web\"\n\n[npm]\nexecutable = \"{script}\"\n"),
    )
    .unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn test_extract_copies_dependency_closure() {
    let temp_dir = create_temp_dir();
    let ctx = create_test_context(&temp_dir);
    fake_install(&ctx.cwd);

    let args = extract::ExtractArgs {
        packages: vec!["uglify-js".to_string()],
        target_dir: None,
        build_dir: None,
        hardlink: false,
    };
    extract::execute(args, &ctx).await.unwrap();

    let web = ctx.cwd.join("target").join("web");
    assert!(web.join("uglify-js").join("index.js").is_file());
    assert!(web.join("async").join("index.js").is_file());
    assert!(!web.join("left-pad").exists());
}
