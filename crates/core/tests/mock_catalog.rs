use std::fs;
use std::path::Path;

use tempfile::tempdir;
use testgen_core::loader::SourceLoader;
use testgen_core::mock::{MockCatalog, MockDirective};

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, text).expect("write source");
}

const REPO_SOURCE: &str = "// +mockgen -source=repo.go -destination=mock/repo.go\npackage repo\n\nimport \"context\"\n\ntype Repository interface {\n\tSave(ctx context.Context, name string) error\n\tFind(ctx context.Context, id int) (string, error)\n}\n";

#[test]
fn directive_reads_source_and_destination() {
    let dir = tempdir().expect("tempdir");
    write(
        dir.path(),
        "foo/foo.go",
        "// +mockgen -source=foo.go -destination=mock/foo.go\npackage foo\n",
    );

    let set = SourceLoader::new(dir.path()).load().expect("load");
    let unit = set.iter().next().expect("unit");
    let directive = MockDirective::extract(unit);

    assert!(directive.has_mock_comment());
    assert_eq!(directive.source.as_deref(), Some("foo.go"));
    assert_eq!(directive.destination.as_deref(), Some("mock/foo.go"));
    assert!(!directive.generated);
    assert_eq!(directive.destination_path(&unit.path), Some(set.root().join("foo/mock/foo.go")));
}

#[test]
fn file_without_leading_comment_has_no_directive() {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), "plain.go", "package plain\n\nfunc A() {}\n");

    let set = SourceLoader::new(dir.path()).load().expect("load");
    let directive = MockDirective::extract(set.iter().next().expect("unit"));
    assert!(!directive.has_mock_comment());
    assert_eq!(directive, MockDirective::default());
}

/// The catalog lists declared interfaces and notices when the mock already exists.
#[test]
fn catalog_collects_interfaces_and_generated_state() {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), "repo/repo.go", REPO_SOURCE);

    let set = SourceLoader::new(dir.path()).load().expect("load");
    let catalog = MockCatalog::build(&set);
    assert_eq!(catalog.entries().len(), 1);

    let entry = &catalog.entries()[0];
    assert_eq!(entry.source, set.root().join("repo/repo.go"));
    assert_eq!(entry.destination, set.root().join("repo/mock/repo.go"));
    assert_eq!(entry.package, "mock_repo");
    assert!(!entry.generated);
    let names: Vec<&str> = entry.interfaces.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Repository"]);
    assert!(entry.interfaces[0].has_method("Find"));

    // Once the mock is written, its own header must not register a second entry.
    write(
        dir.path(),
        "repo/mock/repo.go",
        "// Code generated by MockGen. DO NOT EDIT.\n// Source: repo.go\n\npackage mock_repo\n",
    );
    let set = SourceLoader::new(dir.path()).load().expect("reload");
    let catalog = MockCatalog::build(&set);
    assert_eq!(catalog.entries().len(), 1);
    let entry = catalog
        .entry_for_destination(&set.root().join("repo/mock/repo.go"))
        .expect("entry by destination");
    assert!(entry.generated);
}

#[test]
fn explicit_package_flag_overrides_default_name() {
    let dir = tempdir().expect("tempdir");
    write(
        dir.path(),
        "store/doc.go",
        "// +mockgen -source=store.go -destination=../mocks/store.go -package=mocks\npackage store\n",
    );
    write(
        dir.path(),
        "store/store.go",
        "package store\n\ntype Store interface {\n\tGet(key string) string\n}\n",
    );

    let set = SourceLoader::new(dir.path()).load().expect("load");
    let catalog = MockCatalog::build(&set);
    assert_eq!(catalog.entries().len(), 1);

    let entry = &catalog.entries()[0];
    assert_eq!(entry.package, "mocks");
    assert_eq!(entry.directive_file, set.root().join("store/doc.go"));
    assert_eq!(entry.source, set.root().join("store/store.go"));
    assert_eq!(entry.destination, set.root().join("mocks/store.go"));
    assert_eq!(entry.interfaces[0].name, "Store");
}
