use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn setup_site() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();

    write(
        root,
        "src/index.html",
        r#"<html><head><link rel="stylesheet" href="assets/scss/theme/main.scss"></head>
<body><main class="hero"><h1 class="title">Hello</h1></main>
<script src="assets/js/app.js"></script></body></html>"#,
    );
    write(
        root,
        "src/assets/scss/theme/main.scss",
        "$gap: 4px;\n.hero { padding: $gap; .title { margin: 0; } }\n.sidebar { width: 10px; }\n",
    );
    write(root, "src/assets/css/site.css", ".site { color: black; }");
    write(root, "src/assets/css/magic-cursor.css", ".cursor { color: red; }");
    write(
        root,
        "src/assets/js/app.js",
        "// entry\nfunction start(node) { console.log(node); return node; }\nwindow.start = start;\n",
    );
    write(root, "src/assets/js/vendor/lib.min.js", "/*! lib */var l=1;");
    write(root, "src/assets/js/app-head.js", "var head = true;");
    write(root, "src/assets/fonts/inter.woff2", "woff2");
    write(root, "src/favicon.ico", "ico");

    dir
}

fn site_build(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("site-build").unwrap();
    cmd.current_dir(dir).env("RUST_LOG", "info");
    cmd
}

#[test]
fn test_default_build_references_min_css() {
    let dir = setup_site();

    site_build(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Build successful"));

    let dist = dir.path().join("dist");
    let index = fs::read_to_string(dist.join("index.html")).unwrap();
    assert!(index.contains("assets/css/theme/main.min.css"));
    assert!(dist.join("assets/css/theme/main.min.css").exists());
    assert!(dist.join("assets/css/site.css").exists());
    assert!(dist.join("assets/fonts/inter.woff2").exists());
    assert!(dist.join("favicon.ico").exists());
}

#[test]
fn test_purge_build_references_purge_css() {
    let dir = setup_site();

    site_build(dir.path()).arg("--purge-css").assert().success();

    let theme = dir.path().join("dist/assets/css/theme");
    let index = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
    assert!(index.contains("assets/css/theme/main.purge.css"));
    assert!(!theme.join("main.min.css").exists());

    let purged = fs::read_to_string(theme.join("main.purge.css")).unwrap();
    assert!(purged.contains(".hero"));
    assert!(!purged.contains(".sidebar"));
}

#[test]
fn test_clean_only_empties_dist() {
    let dir = setup_site();
    write(dir.path(), "dist/old/stale.txt", "stale");

    site_build(dir.path())
        .arg("--clean-only")
        .assert()
        .success()
        .stderr(predicate::str::contains("Cleaning dist folder"))
        .stderr(predicate::str::contains("Processing").not());

    let dist = dir.path().join("dist");
    assert!(!dist.exists() || fs::read_dir(&dist).unwrap().next().is_none());
}

#[test]
fn test_blacklisted_files_never_reach_dist() {
    let dir = setup_site();
    write(dir.path(), "src/assets/css/legacy/old.css", ".old { color: red; }");
    write(
        dir.path(),
        "build.config.toml",
        "[assetsBlacklist.css]\nfolders = [\"legacy/**\"]\n",
    );

    site_build(dir.path())
        .arg("--minify")
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded external build configuration"));

    let dist = dir.path().join("dist/assets");
    assert!(!dist.join("css/magic-cursor.css").exists());
    assert!(!dist.join("css/legacy").exists());
    assert!(!dist.join("js/app-head.js").exists());
    assert_eq!(
        fs::read_to_string(dist.join("js/vendor/lib.min.js")).unwrap(),
        "/*! lib */var l=1;"
    );
}

#[test]
fn test_missing_images_directory_is_skipped() {
    let dir = setup_site();

    site_build(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("No images directory found"));

    assert!(!dir.path().join("dist/assets/images").exists());
}

#[test]
fn test_malformed_config_falls_back_to_defaults() {
    let dir = setup_site();
    write(dir.path(), "build.config.toml", "assetsBlacklist = [[[");

    site_build(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Falling back to default build configuration"));

    assert!(!dir.path().join("dist/assets/css/magic-cursor.css").exists());
}

#[test]
fn test_compile_error_exits_with_failure() {
    let dir = setup_site();
    write(dir.path(), "src/assets/scss/theme/broken.scss", ".a { color: $nope; }");

    site_build(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Build failed"))
        .stderr(predicate::str::contains("broken.scss"));
}

#[test]
fn test_repeated_builds_are_byte_identical() {
    let dir = setup_site();
    let snapshot = |root: &Path| {
        let mut files: Vec<_> = walk(&root.join("dist"))
            .into_iter()
            .map(|p| (p.clone(), fs::read(&p).unwrap()))
            .collect();
        files.sort();
        files
    };

    site_build(dir.path()).arg("--lite").assert().success();
    let first = snapshot(dir.path());
    site_build(dir.path()).arg("--lite").assert().success();
    assert_eq!(first, snapshot(dir.path()));
}

fn walk(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            out.extend(walk(&path));
        } else {
            out.push(path);
        }
    }
    out
}
