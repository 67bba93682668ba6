//! Test-case count estimation.
//!
//! The pipeline only depends on the [`CaseEstimator`] contract: a syntax tree
//! in, a `package.[Receiver.]Name -> count` mapping out. [`BranchCountEstimator`]
//! is the default heuristic.

use crate::loader::SourceUnit;
use crate::model::{CaseEstimate, FunctionSignature};
use crate::syntax::{Block, CaseHeader, Expr, Stmt};

/// Anything that can say how many cases each function in a file warrants.
pub trait CaseEstimator: Send + Sync {
    fn estimate(&self, unit: &SourceUnit) -> CaseEstimate;

    fn name(&self) -> &'static str;
}

/// One case per branch point, and one for straight-line code.
///
/// Branch points are `if` statements, non-default `case` clauses of
/// `switch`/`select`, and loops. Function literals inside the body count
/// toward the enclosing function. Declarations without a body get zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchCountEstimator;

impl CaseEstimator for BranchCountEstimator {
    fn estimate(&self, unit: &SourceUnit) -> CaseEstimate {
        unit.file
            .funcs()
            .map(|func| {
                let key = FunctionSignature::from_decl(unit.package(), func).key();
                let count = match &func.body {
                    Some(body) => branch_points(body).max(1),
                    None => 0,
                };
                (key, count)
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "branch-count"
    }
}

/// Number of branch points in a block, nested blocks included.
pub fn branch_points(block: &Block) -> usize {
    block.stmts.iter().map(stmt_points).sum()
}

fn stmt_points(stmt: &Stmt) -> usize {
    match stmt {
        Stmt::If { init, cond, then, els } => {
            1 + init.as_deref().map_or(0, stmt_points)
                + expr_points(cond)
                + branch_points(then)
                + els.as_deref().map_or(0, stmt_points)
        }
        Stmt::For { init, cond, post, body } => {
            1 + init.as_deref().map_or(0, stmt_points)
                + cond.as_ref().map_or(0, expr_points)
                + post.as_deref().map_or(0, stmt_points)
                + branch_points(body)
        }
        Stmt::Range { x, body, .. } => 1 + expr_points(x) + branch_points(body),
        Stmt::Switch { init, tag, clauses, .. } => {
            init.as_deref().map_or(0, stmt_points)
                + tag.as_ref().map_or(0, expr_points)
                + clauses
                    .iter()
                    .map(|clause| {
                        let own = usize::from(!matches!(clause.header, CaseHeader::Default));
                        own + clause.body.iter().map(stmt_points).sum::<usize>()
                    })
                    .sum::<usize>()
        }
        Stmt::Select(clauses) => clauses
            .iter()
            .map(|clause| {
                let own = usize::from(!matches!(clause.header, CaseHeader::Default));
                own + clause.body.iter().map(stmt_points).sum::<usize>()
            })
            .sum(),
        Stmt::Block(block) => branch_points(block),
        Stmt::Labeled { stmt, .. } => stmt_points(stmt),
        Stmt::Expr(expr) | Stmt::Go(expr) | Stmt::Defer(expr) => expr_points(expr),
        Stmt::Assign { rhs, .. } | Stmt::Return(rhs) => rhs.iter().map(expr_points).sum(),
        Stmt::Var(specs) | Stmt::Const(specs) => {
            specs.iter().flat_map(|s| s.values.iter()).map(expr_points).sum()
        }
        Stmt::Type(_)
        | Stmt::IncDec { .. }
        | Stmt::Send { .. }
        | Stmt::Branch { .. }
        | Stmt::Empty
        | Stmt::Raw(_) => 0,
    }
}

/// Branch points hidden inside function literals.
fn expr_points(expr: &Expr) -> usize {
    match expr {
        Expr::FuncLit { body, .. } => branch_points(body),
        Expr::Call { fun, args, .. } => {
            expr_points(fun) + args.iter().map(expr_points).sum::<usize>()
        }
        Expr::CompositeLit { elts, .. } => elts.iter().map(expr_points).sum(),
        Expr::KeyValue { value, .. } => expr_points(value),
        Expr::Paren(x) | Expr::Unary { x, .. } | Expr::Star(x) => expr_points(x),
        Expr::Binary { x, y, .. } => expr_points(x) + expr_points(y),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;
    use std::path::PathBuf;

    fn unit(src: &str) -> SourceUnit {
        SourceUnit { path: PathBuf::from("/src/x.go"), file: parse_source(src).expect("parse") }
    }

    #[test]
    fn two_ifs_need_two_cases() {
        let estimate = BranchCountEstimator.estimate(&unit(
            "package account\n\nfunc Validate(n int) error {\n\tif n < 0 {\n\t\treturn nil\n\t}\n\tif n > 10 {\n\t\treturn nil\n\t}\n\treturn nil\n}\n",
        ));
        assert_eq!(estimate.get("account.Validate"), Some(2));
    }

    #[test]
    fn straight_line_code_needs_one_case() {
        let estimate = BranchCountEstimator
            .estimate(&unit("package p\n\nfunc (s *Store) Len() int {\n\treturn 0\n}\n"));
        assert_eq!(estimate.get("p.Store.Len"), Some(1));
    }

    #[test]
    fn switch_cases_and_loops_count() {
        let estimate = BranchCountEstimator.estimate(&unit(
            "package p\n\nfunc Kind(v int) string {\n\tfor i := 0; i < v; i++ {\n\t}\n\tswitch v {\n\tcase 1:\n\t\treturn \"one\"\n\tcase 2, 3:\n\t\treturn \"few\"\n\tdefault:\n\t\treturn \"many\"\n\t}\n}\n",
        ));
        assert_eq!(estimate.get("p.Kind"), Some(3));
    }
}
