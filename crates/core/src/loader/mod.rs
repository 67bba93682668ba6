//! Syntax tree loader.
//!
//! Walks a source root, parses every non-test `.go` file, and indexes the
//! resulting trees by absolute path. A single unparsable file fails the whole
//! load; there is no partial result.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::model::FunctionSignature;
use crate::syntax::{parse_source, FuncDecl, ParseError, SourceFile};

/// Directory names never descended into, on top of `.`/`_`-prefixed ones.
pub const DEFAULT_SKIP_DIRS: &[&str] = &["vendor", "testdata", "node_modules"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Source root does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Syntax {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to read module file {path}: {source}")]
    Module {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One parsed source file. Immutable after load.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub file: SourceFile,
}

impl SourceUnit {
    pub fn package(&self) -> &str {
        &self.file.package
    }

    /// Directory holding the file; Go packages are one directory each.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Every top-level function and method with its signature, in source order.
    pub fn functions(&self) -> impl Iterator<Item = (FunctionSignature, &FuncDecl)> {
        self.file.funcs().map(|func| (FunctionSignature::from_decl(self.package(), func), func))
    }

    /// Find a declaration by receiver type and name.
    pub fn find_function(&self, receiver: Option<&str>, name: &str) -> Option<&FuncDecl> {
        self.file.funcs().find(|f| f.name == name && f.receiver_type_name() == receiver)
    }

    /// Text of the first comment group, when comments were retained.
    pub fn leading_comment_text(&self) -> Option<String> {
        self.file.leading_comment().map(|group| group.text())
    }

    /// Whether the file carries Go's `Code generated ... DO NOT EDIT.` marker.
    pub fn is_generated(&self) -> bool {
        self.file.comments.iter().flat_map(|group| group.comments.iter()).any(|raw| {
            raw.strip_prefix("//").is_some_and(|line| {
                let line = line.trim();
                line.starts_with("Code generated ") && line.ends_with("DO NOT EDIT.")
            })
        })
    }
}

/// Parsed sources indexed by absolute path.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    root: PathBuf,
    units: BTreeMap<PathBuf, SourceUnit>,
}

impl SourceSet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), units: BTreeMap::new() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn insert(&mut self, unit: SourceUnit) {
        self.units.insert(unit.path.clone(), unit);
    }

    pub fn get(&self, path: &Path) -> Option<&SourceUnit> {
        self.units.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.units.contains_key(path)
    }

    /// Units in lexical path order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceUnit> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Add every unit of `other` not already present.
    pub fn merge(&mut self, other: &SourceSet) {
        for unit in other.iter() {
            if !self.contains(&unit.path) {
                self.insert(unit.clone());
            }
        }
    }
}

/// Configurable loader for a source root.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    root: PathBuf,
    retain_comments: bool,
    skip_dirs: Vec<String>,
}

impl SourceLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            retain_comments: true,
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Keep comment groups in the loaded trees (on by default). Directive
    /// extraction needs them.
    pub fn retain_comments(mut self, retain: bool) -> Self {
        self.retain_comments = retain;
        self
    }

    pub fn skip_dirs(mut self, dirs: Vec<String>) -> Self {
        self.skip_dirs = dirs;
        self
    }

    pub fn load(&self) -> Result<SourceSet, LoadError> {
        let root =
            self.root.canonicalize().map_err(|_| LoadError::MissingRoot(self.root.clone()))?;
        let mut set = SourceSet::new(&root);

        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_skipped_dir(entry));

        for entry in walker {
            let entry = entry.map_err(|source| LoadError::Walk { path: root.clone(), source })?;
            if !entry.file_type().is_file() || !is_go_source(entry.path()) {
                continue;
            }
            let mut unit = load_file(entry.path())?;
            if !self.retain_comments {
                unit.file.comments.clear();
            }
            debug!(path = %unit.path.display(), package = %unit.package(), "loaded source");
            set.insert(unit);
        }

        Ok(set)
    }

    fn is_skipped_dir(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        name.starts_with('.') || name.starts_with('_') || self.skip_dirs.iter().any(|d| *d == name)
    }
}

/// `.go` files that are not themselves tests.
pub fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go")
}

/// Read and parse a single file.
pub fn load_file(path: &Path) -> Result<SourceUnit, LoadError> {
    let text = fs::read_to_string(path)
        .map_err(|source| LoadError::Read { path: path.to_path_buf(), source })?;
    let file = parse_source(&text)
        .map_err(|source| LoadError::Syntax { path: path.to_path_buf(), source })?;
    Ok(SourceUnit { path: path.to_path_buf(), file })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_source_filter_excludes_tests_and_other_files() {
        assert!(is_go_source(Path::new("pkg/user.go")));
        assert!(!is_go_source(Path::new("pkg/user_test.go")));
        assert!(!is_go_source(Path::new("pkg/README.md")));
        assert!(!is_go_source(Path::new("pkg/go")));
    }
}
