//! End-to-end runs of the fingerprinting engine against temporary trees.

use std::fs;
use std::path::{Path, PathBuf};

use cachekill_core::hash::ContentHash;
use cachekill_core::{fingerprint, CachekillError, FingerprintOptions, MatchMode, NamePattern};
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn pat(root: &Path, rel: &str) -> String {
    root.join(rel).display().to_string()
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

fn fingerprint_of(content: &str, length: usize) -> String {
    ContentHash::compute(content.as_bytes())
        .truncated(length)
        .to_string()
}

// ============================================================================
// Copy Mode
// ============================================================================

#[test]
fn copy_end_to_end() {
    let temp = TempDir::new().unwrap();
    let styles = write(temp.path(), "styles.css", "body{}");
    let index = write(temp.path(), "index.html", "<link href=\"styles.css\">");

    let options = FingerprintOptions::new([pat(temp.path(), "styles.css")])
        .targets([pat(temp.path(), "index.html")])
        .hash_length(8);
    let report = fingerprint(&options).unwrap();

    let hash = fingerprint_of("body{}", 8);
    let new_path = temp.path().join(format!("styles-{}.css", hash));

    assert_eq!(report.source_paths.len(), 1);
    assert_eq!(report.source_paths[0].path, styles);
    assert_eq!(report.source_paths[0].new_path, new_path);
    assert_eq!(report.target_paths, Some(vec![index.clone()]));
    assert_eq!(report.replacements, 1);

    assert_eq!(read(&index), format!("<link href=\"styles-{}.css\">", hash));
    assert_eq!(read(&styles), "body{}");
    assert_eq!(fs::read(&new_path).unwrap(), fs::read(&styles).unwrap());
}

#[test]
fn copy_without_targets_reports_none() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "app.js", "app()");

    let options = FingerprintOptions::new([pat(temp.path(), "app.js")]);
    let report = fingerprint(&options).unwrap();

    assert_eq!(report.target_paths, None);
    assert!(report.source_paths[0].new_path.exists());
}

#[test]
fn copy_naming_is_stable_across_runs() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "app.js", "app()");

    let options = FingerprintOptions::new([pat(temp.path(), "app.js")]).hash_length(12);
    let first = fingerprint(&options).unwrap();
    let second = fingerprint(&options).unwrap();

    assert_eq!(first.source_paths, second.source_paths);
}

#[test]
fn copy_rewrites_self_reference_in_new_copy() {
    let temp = TempDir::new().unwrap();
    let a = write(temp.path(), "a.css", "@import \"b.css\";");
    write(temp.path(), "b.css", "b{}");
    let index = write(temp.path(), "index.html", "a.css b.css");

    let options = FingerprintOptions::new([pat(temp.path(), "a.css"), pat(temp.path(), "b.css")])
        .targets([pat(temp.path(), "*.css"), pat(temp.path(), "index.html")]);
    let report = fingerprint(&options).unwrap();

    let new_of = |name: &str| {
        report
            .source_paths
            .iter()
            .find(|s| s.path.file_name().unwrap() == name)
            .map(|s| s.new_path.clone())
            .unwrap()
    };
    let a_new = new_of("a.css");
    let b_new = new_of("b.css");
    let b_base = b_new.file_name().unwrap().to_str().unwrap().to_string();
    let a_base = a_new.file_name().unwrap().to_str().unwrap().to_string();

    // The original keeps its stale reference; the copy gets the new one.
    assert_eq!(read(&a), "@import \"b.css\";");
    assert_eq!(read(&a_new), format!("@import \"{}\";", b_base));
    assert_eq!(read(&index), format!("{} {}", a_base, b_base));

    let targets = report.target_paths.unwrap();
    assert!(targets.contains(&a_new));
    assert!(targets.contains(&b_new));
    assert!(!targets.contains(&a));
}

#[test]
fn copy_rerun_rewrites_each_copy_once() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.css", "@import \"b.css\";");
    write(temp.path(), "b.css", "b{}");

    let options = FingerprintOptions::new([pat(temp.path(), "a.css"), pat(temp.path(), "b.css")])
        .targets([pat(temp.path(), "*.css")])
        .hash_length(4)
        .pattern(NamePattern::new("{hash}-{name}{ext}").unwrap());
    fingerprint(&options).unwrap();
    let report = fingerprint(&options).unwrap();

    let a_new = temp
        .path()
        .join(format!("{}-a.css", fingerprint_of("@import \"b.css\";", 4)));
    let b_new = temp.path().join(format!("{}-b.css", fingerprint_of("b{}", 4)));

    let targets = report.target_paths.unwrap();
    assert_eq!(targets.len(), 2, "{:?}", targets);
    assert!(targets.contains(&a_new));
    assert!(targets.contains(&b_new));
    assert_eq!(
        read(&a_new),
        format!("@import \"{}-b.css\";", fingerprint_of("b{}", 4))
    );
}

// ============================================================================
// Rename Mode
// ============================================================================

#[test]
fn rename_moves_sources_and_rewrites_targets() {
    let temp = TempDir::new().unwrap();
    let app = write(temp.path(), "js/app.js", "app()");
    let index = write(temp.path(), "index.html", "<script src=\"js/app.js\"></script>");

    let options = FingerprintOptions::new([pat(temp.path(), "js/*.js")])
        .targets([pat(temp.path(), "index.html")])
        .hash_length(10)
        .rename(true);
    let report = fingerprint(&options).unwrap();

    let hash = fingerprint_of("app()", 10);
    let new_path = temp.path().join(format!("js/app-{}.js", hash));
    assert!(!app.exists());
    assert_eq!(read(&new_path), "app()");
    assert_eq!(report.source_paths[0].new_path, new_path);
    assert_eq!(
        read(&index),
        format!("<script src=\"js/app-{}.js\"></script>", hash)
    );
}

#[test]
fn rename_rewrites_source_that_is_also_target() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.css", "@import \"b.css\";");
    write(temp.path(), "b.css", "b{}");

    let options = FingerprintOptions::new([pat(temp.path(), "*.css")])
        .targets([pat(temp.path(), "a.css")])
        .rename(true);
    let report = fingerprint(&options).unwrap();

    let a_new = &report
        .source_paths
        .iter()
        .find(|s| s.path.ends_with("a.css"))
        .unwrap()
        .new_path;
    let b_new = &report
        .source_paths
        .iter()
        .find(|s| s.path.ends_with("b.css"))
        .unwrap()
        .new_path;
    let b_base = b_new.file_name().unwrap().to_str().unwrap();

    assert!(!temp.path().join("a.css").exists());
    assert_eq!(read(a_new), format!("@import \"{}\";", b_base));
}

// ============================================================================
// Ordering And Matching
// ============================================================================

#[test]
fn longer_names_are_not_clobbered_by_suffixes() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "button.js", "button()");
    write(temp.path(), "nav-button.js", "nav()");
    let index = write(
        temp.path(),
        "index.html",
        "<script src=\"nav-button.js\"></script><script src=\"button.js\"></script>",
    );

    let options = FingerprintOptions::new([
        pat(temp.path(), "button.js"),
        pat(temp.path(), "nav-button.js"),
    ])
    .targets([pat(temp.path(), "index.html")])
    .hash_length(6);
    let report = fingerprint(&options).unwrap();

    let order: Vec<_> = report
        .source_paths
        .iter()
        .map(|s| s.path.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(order, vec!["nav-button.js", "button.js"]);

    assert_eq!(
        read(&index),
        format!(
            "<script src=\"nav-button-{}.js\"></script><script src=\"button-{}.js\"></script>",
            fingerprint_of("nav()", 6),
            fingerprint_of("button()", 6)
        )
    );
}

#[test]
fn boundary_mode_leaves_unrelated_tokens() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "app.js", "app()");
    let index = write(temp.path(), "index.html", "myapp.js app.js");

    let options = FingerprintOptions::new([pat(temp.path(), "app.js")])
        .targets([pat(temp.path(), "index.html")])
        .hash_length(4)
        .match_mode(MatchMode::Boundary);
    fingerprint(&options).unwrap();

    assert_eq!(
        read(&index),
        format!("myapp.js app-{}.js", fingerprint_of("app()", 4))
    );
}

#[test]
fn custom_pattern_names_files() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "logo.svg", "<svg/>");

    let options = FingerprintOptions::new([pat(temp.path(), "logo.svg")])
        .hash_length(5)
        .pattern(NamePattern::new("{hash}.{name}{ext}").unwrap());
    let report = fingerprint(&options).unwrap();

    assert_eq!(
        report.source_paths[0].new_path,
        temp.path()
            .join(format!("{}.logo.svg", fingerprint_of("<svg/>", 5)))
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn missing_literal_source_fails_without_changes() {
    let temp = TempDir::new().unwrap();
    let index = write(temp.path(), "index.html", "app.js");

    let options = FingerprintOptions::new([pat(temp.path(), "app.js")])
        .targets([pat(temp.path(), "index.html")]);
    let err = fingerprint(&options).unwrap_err();

    assert!(matches!(err, CachekillError::Resolution { .. }));
    assert_eq!(read(&index), "app.js");
}

#[test]
fn required_match_rejects_empty_glob() {
    let temp = TempDir::new().unwrap();
    let options = FingerprintOptions::new([pat(temp.path(), "*.js")]).require_sources(true);
    assert!(matches!(
        fingerprint(&options),
        Err(CachekillError::Resolution { .. })
    ));
}

#[test]
fn directories_are_never_targets() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "app.js", "app()");
    fs::create_dir_all(temp.path().join("broken.html")).unwrap();

    let options = FingerprintOptions::new([pat(temp.path(), "app.js")])
        .targets([pat(temp.path(), "*.html")]);
    let report = fingerprint(&options).unwrap();

    assert_eq!(report.target_paths, None);
    assert!(report.source_paths[0].new_path.exists());
}
