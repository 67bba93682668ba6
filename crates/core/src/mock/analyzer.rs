use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::loader::SourceUnit;
use crate::model::FunctionSignature;
use crate::semantic::{CallTarget, LocalScope, ResolutionContext, ResolutionFilter};
use crate::syntax::{print_expr, Expr, FuncDecl, Stmt};

/// A call inside a function body that goes through an interface-typed receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyCallSite {
    pub function: FunctionSignature,
    /// The call as Go text, e.g. `s.repo.Save(ctx, user)`.
    pub call: String,
    pub target: CallTarget,
}

/// Finds interface-typed dependencies of functions.
///
/// Only the top-level statements of a body are scanned, and only three shapes
/// of them: expression statements, right-hand sides of assignments, and the
/// right-hand sides of an `if` statement's initializer. Calls nested in inner
/// blocks are not considered.
#[derive(Debug, Clone)]
pub struct DependencyAnalyzer<'c> {
    ctx: &'c ResolutionContext,
    filter: ResolutionFilter,
}

impl<'c> DependencyAnalyzer<'c> {
    pub fn new(ctx: &'c ResolutionContext, filter: ResolutionFilter) -> Self {
        Self { ctx, filter }
    }

    /// Whether any function or method named `name` in `unit` calls through an
    /// interface. Resolution gaps count as "no".
    pub fn has_interface_dependency(&self, unit: &SourceUnit, name: &str) -> bool {
        unit.functions()
            .filter(|(sig, _)| sig.name == name)
            .any(|(sig, decl)| self.first_call_site(unit, &sig, decl).is_some())
    }

    /// Every qualifying call site of `function`, in statement order.
    pub fn call_sites(
        &self,
        unit: &SourceUnit,
        function: &FunctionSignature,
    ) -> Vec<DependencyCallSite> {
        let Some(decl) = unit.find_function(function.receiver.as_deref(), &function.name) else {
            return Vec::new();
        };
        let sites = self.scan(unit, function, decl, false);
        if !sites.is_empty() {
            info!(function = %function.key(), sites = sites.len(), "found interface dependency");
        }
        sites
    }

    fn first_call_site(
        &self,
        unit: &SourceUnit,
        function: &FunctionSignature,
        decl: &FuncDecl,
    ) -> Option<DependencyCallSite> {
        self.scan(unit, function, decl, true).into_iter().next()
    }

    fn scan(
        &self,
        unit: &SourceUnit,
        function: &FunctionSignature,
        decl: &FuncDecl,
        first_only: bool,
    ) -> Vec<DependencyCallSite> {
        let Some(body) = &decl.body else {
            return Vec::new();
        };
        let mut scope = match LocalScope::for_function(self.ctx, &unit.path, decl) {
            Ok(scope) => scope,
            Err(miss) => {
                debug!(function = %function.key(), %miss, "skipping dependency scan");
                return Vec::new();
            }
        };

        let mut sites = Vec::new();
        for stmt in &body.stmts {
            for call in scanned_calls(stmt) {
                if let Some(site) = self.check_call(&scope, function, call) {
                    sites.push(site);
                    if first_only {
                        return sites;
                    }
                }
            }
            scope.bind(stmt);
        }
        sites
    }

    fn check_call(
        &self,
        scope: &LocalScope<'_>,
        function: &FunctionSignature,
        call: &Expr,
    ) -> Option<DependencyCallSite> {
        let (fun, _) = call.as_call()?;
        let target = match scope.resolve_call(fun) {
            Ok(target) => target,
            Err(miss) => {
                let call = print_expr(call);
                debug!(function = %function.key(), %call, %miss, "unresolved call");
                return None;
            }
        };
        if !target.is_interface_method() || !self.filter.accepts(&target) {
            return None;
        }
        Some(DependencyCallSite { function: function.clone(), call: print_expr(call), target })
    }
}

/// The call expressions a statement contributes to the scan.
fn scanned_calls(stmt: &Stmt) -> Vec<&Expr> {
    let rhs: &[Expr] = match stmt {
        Stmt::Expr(expr) => std::slice::from_ref(expr),
        Stmt::Assign { rhs, .. } => rhs,
        Stmt::If { init: Some(init), .. } => match init.as_ref() {
            Stmt::Assign { rhs, .. } => rhs,
            _ => &[],
        },
        _ => &[],
    };
    rhs.iter().filter(|expr| expr.as_call().is_some()).collect()
}

/// Whether `unit` imports a package under the explicit local name `alias`.
/// Imports relying on the package's default name do not count.
pub fn is_mock_package_imported(unit: &SourceUnit, alias: &str) -> bool {
    unit.file.imports().any(|import| import.name.as_deref() == Some(alias))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;
    use std::path::PathBuf;

    #[test]
    fn mock_import_requires_explicit_alias() {
        let unit = SourceUnit {
            path: PathBuf::from("/src/svc/user.go"),
            file: parse_source(
                "package svc\n\nimport (\n\tmock_repo \"example.com/app/mock/repo\"\n\t\"example.com/app/mock_store\"\n)\n",
            )
            .expect("parse"),
        };
        assert!(is_mock_package_imported(&unit, "mock_repo"));
        assert!(!is_mock_package_imported(&unit, "mock_store"));
    }
}
