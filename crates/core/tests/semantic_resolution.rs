use std::fs;
use std::path::Path;

use tempfile::tempdir;
use testgen_core::loader::{SourceLoader, SourceSet};
use testgen_core::mock::DependencyAnalyzer;
use testgen_core::model::FunctionSignature;
use testgen_core::semantic::{ModuleInfo, ResolutionContext, ResolutionFilter};

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, text).expect("write source");
}

fn load_with_module(root: &Path) -> (SourceSet, ResolutionContext) {
    let set = SourceLoader::new(root).load().expect("load");
    let module = ModuleInfo::discover(set.root()).expect("module lookup");
    let ctx = ResolutionContext::build(&set, module);
    (set, ctx)
}

const SERVICE: &str = r#"package service

import (
	"context"
	"errors"
)

type Repository interface {
	Save(ctx context.Context, name string) error
}

type Service struct {
	repo Repository
}

func (s *Service) Create(ctx context.Context, name string) error {
	if name == "" {
		return errors.New("empty name")
	}
	return s.repo.Save(ctx, name)
}

func (s *Service) Register(ctx context.Context, name string) error {
	err := s.repo.Save(ctx, name)
	return err
}

func (s *Service) Nested(ctx context.Context, name string) {
	if name != "" {
		s.repo.Save(ctx, name)
	}
}

func (s *Service) Guarded(ctx context.Context, name string) error {
	if err := s.repo.Save(ctx, name); err != nil {
		return err
	}
	return nil
}

func Plain(a, b int) int {
	return a + b
}
"#;

/// A method calling through an interface-typed field reports a dependency
/// when the call shape is scanned.
#[test]
fn interface_field_calls_are_detected_per_statement_shape() {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), "service/service.go", SERVICE);
    let (set, ctx) = load_with_module(dir.path());
    let unit = set.iter().next().expect("unit");
    let analyzer = DependencyAnalyzer::new(&ctx, ResolutionFilter::default());

    // `return s.repo.Save(...)` is not one of the scanned shapes.
    assert!(!analyzer.has_interface_dependency(unit, "Create"));
    assert!(analyzer.has_interface_dependency(unit, "Register"));
    assert!(analyzer.has_interface_dependency(unit, "Guarded"));
    // Calls inside nested blocks are not walked.
    assert!(!analyzer.has_interface_dependency(unit, "Nested"));
    assert!(!analyzer.has_interface_dependency(unit, "Plain"));
    assert!(!analyzer.has_interface_dependency(unit, "Missing"));

    let sig = FunctionSignature::new("service", Some("Service".into()), "Register");
    let sites = analyzer.call_sites(unit, &sig);
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].call, "s.repo.Save(ctx, name)");
    let receiver = sites[0].target.receiver.as_ref().expect("receiver");
    assert_eq!(receiver.type_name, "Repository");
    assert!(receiver.is_interface);
    assert_eq!(sites[0].target.package.as_deref(), Some("service"));
    assert_eq!(sites[0].target.file.as_deref(), Some(unit.path.as_path()));
}

/// The common receiver-method form: an expression statement
/// calling a repository method.
#[test]
fn expression_statement_call_through_receiver_field() {
    let dir = tempdir().expect("tempdir");
    write(
        dir.path(),
        "user/user.go",
        "package user\n\ntype Repo interface {\n\tSave(name string)\n}\n\ntype Service struct {\n\trepo Repo\n}\n\nfunc (s *Service) Create(name string) {\n\ts.repo.Save(name)\n}\n",
    );
    let (set, ctx) = load_with_module(dir.path());
    let analyzer = DependencyAnalyzer::new(&ctx, ResolutionFilter::default());
    assert!(analyzer.has_interface_dependency(set.iter().next().expect("unit"), "Create"));
}

/// With a `go.mod`, package identities are import paths and the module
/// qualifier filters on them.
#[test]
fn module_path_identities_and_qualifier() {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), "go.mod", "module github.com/acme/shop\n\ngo 1.21\n");
    write(
        dir.path(),
        "repo/repo.go",
        "package repo\n\ntype Store interface {\n\tPut(key string) error\n}\n",
    );
    write(
        dir.path(),
        "orders/orders.go",
        "package orders\n\nimport \"github.com/acme/shop/repo\"\n\ntype Orders struct {\n\tstore repo.Store\n}\n\nfunc (o Orders) Place(key string) error {\n\terr := o.store.Put(key)\n\treturn err\n}\n",
    );
    let (set, ctx) = load_with_module(dir.path());
    let orders = set.get(&set.root().join("orders/orders.go")).expect("orders unit");

    assert_eq!(ctx.module().map(|m| m.path.as_str()), Some("github.com/acme/shop"));
    assert_eq!(ctx.package_of_file(&orders.path), Some("github.com/acme/shop/orders"));
    assert!(ctx.package("github.com/acme/shop/repo").is_some_and(|p| p.has_type("Store")));

    let matching =
        DependencyAnalyzer::new(&ctx, ResolutionFilter::new(Some("github.com/acme/shop".into())));
    assert!(matching.has_interface_dependency(orders, "Place"));

    let other =
        DependencyAnalyzer::new(&ctx, ResolutionFilter::new(Some("github.com/other".into())));
    assert!(!other.has_interface_dependency(orders, "Place"));
}

/// Without a module, an import path is matched to a loaded directory by suffix.
#[test]
fn imports_resolve_by_directory_suffix_without_module() {
    let dir = tempdir().expect("tempdir");
    write(
        dir.path(),
        "repo/repo.go",
        "package repo\n\ntype Store interface {\n\tPut(key string) error\n}\n",
    );
    write(
        dir.path(),
        "orders/orders.go",
        "package orders\n\nimport store \"example.com/shop/repo\"\n\nfunc Place(s store.Store) {\n\ts.Put(\"k\")\n}\n",
    );
    let set = SourceLoader::new(dir.path()).load().expect("load");
    let ctx = ResolutionContext::build(&set, None);
    let orders = set.get(&set.root().join("orders/orders.go")).expect("orders unit");

    assert!(ctx.package_for_import("example.com/shop/repo").is_some());
    let analyzer = DependencyAnalyzer::new(&ctx, ResolutionFilter::default());
    assert!(analyzer.has_interface_dependency(orders, "Place"));
}

/// Calls into packages outside the loaded sources are resolution misses.
#[test]
fn external_package_calls_are_not_dependencies() {
    let dir = tempdir().expect("tempdir");
    write(
        dir.path(),
        "drain/drain.go",
        "package drain\n\nimport \"io\"\n\nfunc Drain(r io.Reader) {\n\tbuf := make([]byte, 8)\n\tr.Read(buf)\n}\n",
    );
    let (set, ctx) = load_with_module(dir.path());
    let analyzer = DependencyAnalyzer::new(&ctx, ResolutionFilter::default());
    assert!(!analyzer.has_interface_dependency(set.iter().next().expect("unit"), "Drain"));
}

/// `err.Error()` targets the predeclared `error` interface, which only counts
/// when universe targets are included.
#[test]
fn universe_error_method_needs_opt_in() {
    let dir = tempdir().expect("tempdir");
    write(
        dir.path(),
        "msg/msg.go",
        "package msg\n\nfunc Describe(err error) string {\n\ttext := err.Error()\n\treturn text\n}\n",
    );
    let (set, ctx) = load_with_module(dir.path());
    let unit = set.iter().next().expect("unit");

    let default = DependencyAnalyzer::new(&ctx, ResolutionFilter::default());
    assert!(!default.has_interface_dependency(unit, "Describe"));

    let universe =
        DependencyAnalyzer::new(&ctx, ResolutionFilter::default().include_universe(true));
    assert!(universe.has_interface_dependency(unit, "Describe"));
    let sig = FunctionSignature::new("msg", None, "Describe");
    let sites = universe.call_sites(unit, &sig);
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].target.package, None);
}

/// Methods promoted from embedded interfaces and locals typed by earlier
/// statements both resolve.
#[test]
fn embedded_interfaces_and_local_bindings_resolve() {
    let dir = tempdir().expect("tempdir");
    write(
        dir.path(),
        "cache/cache.go",
        r#"package cache

type Getter interface {
	Get(key string) (string, bool)
}

type Cache interface {
	Getter
	Set(key, value string)
}

type Layer struct {
	Cache
}

func NewCache() Cache {
	return nil
}

func Warm(keys []string) {
	c := NewCache()
	c.Set("a", "b")
}

func Lookup(l *Layer) {
	l.Get("a")
}

func Concrete(l Layer) {
	var n int
	n = len("x")
	_ = n
}
"#,
    );
    let (set, ctx) = load_with_module(dir.path());
    let unit = set.iter().next().expect("unit");
    let analyzer = DependencyAnalyzer::new(&ctx, ResolutionFilter::default());

    assert!(analyzer.has_interface_dependency(unit, "Warm"));
    assert!(analyzer.has_interface_dependency(unit, "Lookup"));
    assert!(!analyzer.has_interface_dependency(unit, "Concrete"));

    let sites = analyzer.call_sites(unit, &FunctionSignature::new("cache", None, "Lookup"));
    let receiver = sites[0].target.receiver.as_ref().expect("receiver");
    assert_eq!(receiver.type_name, "Getter");
}

/// Concrete method calls are resolved but are not interface dependencies.
#[test]
fn concrete_method_calls_are_not_dependencies() {
    let dir = tempdir().expect("tempdir");
    write(
        dir.path(),
        "clock/clock.go",
        "package clock\n\ntype Clock struct{}\n\nfunc (c Clock) Now() int {\n\treturn 0\n}\n\nfunc Stamp(c Clock) {\n\tc.Now()\n}\n",
    );
    let (set, ctx) = load_with_module(dir.path());
    let analyzer = DependencyAnalyzer::new(&ctx, ResolutionFilter::default());
    assert!(!analyzer.has_interface_dependency(set.iter().next().expect("unit"), "Stamp"));
}
