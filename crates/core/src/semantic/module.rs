use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::loader::LoadError;

pub const MODULE_FILE: &str = "go.mod";

/// A Go module: the directory holding `go.mod` and its declared path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub root: PathBuf,
    pub path: String,
}

impl ModuleInfo {
    pub fn new(root: impl Into<PathBuf>, path: impl Into<String>) -> Self {
        Self { root: root.into(), path: path.into() }
    }

    /// Look for `go.mod` in `start` and then in each ancestor directory.
    ///
    /// Returns `Ok(None)` when no module file exists or it has no `module`
    /// line. An unreadable module file is an error.
    pub fn discover(start: &Path) -> Result<Option<Self>, LoadError> {
        for dir in start.ancestors() {
            let candidate = dir.join(MODULE_FILE);
            if !candidate.is_file() {
                continue;
            }
            let text = fs::read_to_string(&candidate)
                .map_err(|source| LoadError::Module { path: candidate.clone(), source })?;
            return Ok(parse_module_path(&text).map(|path| {
                debug!(root = %dir.display(), module = %path, "found go module");
                Self::new(dir, path)
            }));
        }
        Ok(None)
    }

    /// Import path of the package in `dir`, or `None` when `dir` lies outside
    /// the module.
    pub fn import_path(&self, dir: &Path) -> Option<String> {
        let rel = dir.strip_prefix(&self.root).ok()?;
        let rel = slash_path(rel);
        if rel.is_empty() {
            Some(self.path.clone())
        } else {
            Some(format!("{}/{}", self.path, rel))
        }
    }
}

/// Value of the `module` directive in a `go.mod` file.
pub fn parse_module_path(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches('"');
        (!path.is_empty()).then(|| path.to_string())
    })
}

/// Forward-slash rendering of a relative path.
pub(crate) fn slash_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// The name an import gets when it has no explicit alias and the package is
/// not loaded: the last path element, skipping a `vN` major-version suffix.
pub fn default_import_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_major_version =
        last.len() > 1 && last.starts_with('v') && last[1..].chars().all(|c| c.is_ascii_digit());
    if is_major_version {
        if let Some(prev) = segments.next() {
            return prev;
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_line_is_found_among_other_directives() {
        let text = "// comment\nmodule github.com/acme/shop // trailing\n\ngo 1.22\n";
        assert_eq!(parse_module_path(text).as_deref(), Some("github.com/acme/shop"));
        assert_eq!(parse_module_path("go 1.22\n"), None);
        assert_eq!(parse_module_path("modules x\n"), None);
    }

    #[test]
    fn import_path_joins_relative_dir() {
        let module = ModuleInfo::new("/src/shop", "github.com/acme/shop");
        assert_eq!(
            module.import_path(Path::new("/src/shop/internal/order")).as_deref(),
            Some("github.com/acme/shop/internal/order")
        );
        let root = module.import_path(Path::new("/src/shop"));
        assert_eq!(root.as_deref(), Some("github.com/acme/shop"));
        assert_eq!(module.import_path(Path::new("/elsewhere")), None);
    }

    #[test]
    fn default_import_name_drops_major_version() {
        assert_eq!(default_import_name("github.com/labstack/echo/v4"), "echo");
        assert_eq!(default_import_name("context"), "context");
        assert_eq!(default_import_name("net/http"), "http");
    }
}
