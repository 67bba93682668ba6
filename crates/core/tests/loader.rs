use std::fs;
use std::path::Path;

use tempfile::tempdir;
use testgen_core::loader::{LoadError, SourceLoader};

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, text).expect("write source");
}

/// Only non-test `.go` files outside skipped directories are loaded, in path order.
#[test]
fn loads_sources_and_skips_tests_and_ignored_dirs() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "account/account.go", "package account\n\nfunc Validate() {}\n");
    write(root, "account/account_test.go", "package account\n");
    write(root, "billing/invoice.go", "package billing\n");
    write(root, "vendor/lib/lib.go", "package lib\n");
    write(root, ".cache/x.go", "package x\n");
    write(root, "_scratch/y.go", "package y\n");
    write(root, "testdata/z.go", "this is not go");
    write(root, "notes.txt", "hello");

    let set = SourceLoader::new(root).load().expect("load");
    let names: Vec<String> = set
        .iter()
        .map(|u| u.path.strip_prefix(set.root()).expect("under root").display().to_string())
        .collect();
    assert_eq!(names, vec!["account/account.go", "billing/invoice.go"]);

    let account = set.iter().next().expect("account unit");
    assert_eq!(account.package(), "account");
    assert!(account.find_function(None, "Validate").is_some());
}

/// A single unparsable file fails the whole load.
#[test]
fn syntax_error_fails_the_load() {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), "ok.go", "package ok\n");
    write(dir.path(), "broken.go", "package broken\n\nfunc Oops( {\n");

    let err = SourceLoader::new(dir.path()).load().expect_err("load should fail");
    match err {
        LoadError::Syntax { path, .. } => assert!(path.ends_with("broken.go")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_root_is_reported() {
    let dir = tempdir().expect("tempdir");
    let err = SourceLoader::new(dir.path().join("nope")).load().expect_err("missing root");
    assert!(matches!(err, LoadError::MissingRoot(_)));
}

/// Comments are kept by default so directives can be read, and can be dropped.
#[test]
fn comment_retention_is_configurable() {
    let dir = tempdir().expect("tempdir");
    write(
        dir.path(),
        "repo.go",
        "// +mockgen -source=repo.go -destination=mock/repo.go\npackage repo\n",
    );

    let kept = SourceLoader::new(dir.path()).load().expect("load");
    let unit = kept.iter().next().expect("unit");
    assert!(unit.leading_comment_text().expect("comment").contains("-destination=mock/repo.go"));

    let dropped = SourceLoader::new(dir.path()).retain_comments(false).load().expect("load");
    assert!(dropped.iter().next().expect("unit").leading_comment_text().is_none());
}

#[test]
fn custom_skip_dirs_replace_the_defaults() {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), "vendor/lib/lib.go", "package lib\n");
    write(dir.path(), "gen/out.go", "package gen\n");

    let set =
        SourceLoader::new(dir.path()).skip_dirs(vec!["gen".to_string()]).load().expect("load");
    assert_eq!(set.len(), 1);
    assert_eq!(set.iter().next().expect("unit").package(), "lib");
}
