//! Semantic resolution over the loaded sources.
//!
//! A [`ResolutionContext`] is built once per run from every loaded package and
//! then shared read-only by all call-site checks. Resolution is best-effort:
//! anything it cannot follow (external packages, generics, closures stored in
//! fields) comes back as a [`ResolutionMiss`] rather than an error.

mod context;
mod module;
mod scope;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::syntax::Expr;

pub use context::{PackageInfo, ResolutionContext};
pub use module::{default_import_name, parse_module_path, ModuleInfo, MODULE_FILE};
pub use scope::LocalScope;

/// Why a reference could not be resolved. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionMiss {
    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("no field or method `{member}` on `{ty}`")]
    UnknownMember { ty: String, member: String },

    #[error("package `{0}` is not part of the loaded sources")]
    ExternalPackage(String),

    #[error("unsupported expression: {0}")]
    Unsupported(String),
}

/// Static type of an expression, as far as resolution can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    /// A declared type. `package` is `None` for predeclared types.
    Named { package: Option<String>, name: String },
    Pointer(Box<Ty>),
    /// A type literal, kept as written together with where it was written.
    Literal { package: String, file: PathBuf, expr: Expr },
}

impl Ty {
    pub fn named(package: Option<&str>, name: impl Into<String>) -> Self {
        Ty::Named { package: package.map(str::to_string), name: name.into() }
    }

    /// Strip one level of pointer indirection.
    pub fn deref(&self) -> &Ty {
        match self {
            Ty::Pointer(inner) => inner,
            other => other,
        }
    }

    /// Short human-readable form for logs.
    pub fn describe(&self) -> String {
        match self {
            Ty::Named { package: Some(pkg), name } => format!("{pkg}.{name}"),
            Ty::Named { package: None, name } => name.clone(),
            Ty::Pointer(inner) => format!("*{}", inner.describe()),
            Ty::Literal { expr, .. } => crate::syntax::print_expr(expr),
        }
    }
}

/// The receiver of a resolved method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverInfo {
    /// Name of the receiver's named type; empty for anonymous interface literals.
    pub type_name: String,
    /// The receiver's underlying type is an interface.
    pub is_interface: bool,
}

/// What a call expression invokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTarget {
    /// Identity of the declaring package; `None` for predeclared objects.
    pub package: Option<String>,
    pub receiver: Option<ReceiverInfo>,
    pub name: String,
    /// File declaring the function, method, or interface.
    pub file: Option<PathBuf>,
}

impl CallTarget {
    pub fn is_interface_method(&self) -> bool {
        self.receiver.as_ref().is_some_and(|recv| recv.is_interface)
    }
}

/// Which resolved targets count.
///
/// With a module qualifier, only targets whose package identity contains it
/// are considered. Without one, targets that have no package (predeclared
/// objects such as `error.Error`) are skipped unless `include_universe` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionFilter {
    pub module: Option<String>,
    pub include_universe: bool,
}

impl ResolutionFilter {
    pub fn new(module: Option<String>) -> Self {
        Self { module, include_universe: false }
    }

    pub fn include_universe(mut self, include: bool) -> Self {
        self.include_universe = include;
        self
    }

    pub fn accepts(&self, target: &CallTarget) -> bool {
        match (&self.module, &target.package) {
            (Some(qualifier), Some(package)) => package.contains(qualifier.as_str()),
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => self.include_universe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(package: Option<&str>) -> CallTarget {
        CallTarget {
            package: package.map(str::to_string),
            receiver: Some(ReceiverInfo { type_name: "Repo".into(), is_interface: true }),
            name: "Save".into(),
            file: None,
        }
    }

    #[test]
    fn filter_without_module_skips_universe_targets() {
        let filter = ResolutionFilter::default();
        assert!(filter.accepts(&target(Some("shop/repo"))));
        assert!(!filter.accepts(&target(None)));
        assert!(filter.include_universe(true).accepts(&target(None)));
    }

    #[test]
    fn filter_with_module_requires_matching_identity() {
        let filter = ResolutionFilter::new(Some("github.com/acme/shop".into()));
        assert!(filter.accepts(&target(Some("github.com/acme/shop/repo"))));
        assert!(!filter.accepts(&target(Some("github.com/other/lib"))));
        assert!(!filter.accepts(&target(None)));
    }
}
