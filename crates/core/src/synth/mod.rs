//! Table-driven test skeleton synthesis.
//!
//! Trees are assembled bottom-up from the constructor helpers in
//! [`crate::syntax`]; nothing here produces text directly.

use tracing::{debug, warn};

use crate::emit::{test_file_path, test_package_name};
use crate::loader::SourceUnit;
use crate::model::{CaseEstimate, FunctionSignature, GeneratedTestUnit};
use crate::syntax::{AssignTok, Block, Decl, Expr, Field, FuncDecl, FuncType, Stmt};

/// Message printed by every generated sub-test.
pub const PLACEHOLDER_MESSAGE: &str = "write your unit test!";

const CASES: &str = "testcases";
const CASE: &str = "testcase";

/// `t *testing.T`
fn testing_param() -> Field {
    Field::named("t", Expr::star(Expr::selector(Expr::ident("testing"), "T")))
}

/// `{name: ""}`
fn placeholder_case() -> Expr {
    Expr::composite(None, vec![Expr::key_value(Expr::ident("name"), Expr::string_lit(""))])
}

/// `testcases := []struct{ name string }{ {name: ""}, ... }`
fn cases_decl(count: usize) -> Stmt {
    let record = Expr::StructType(vec![Field::named("name", Expr::ident("string"))]);
    let cases = Expr::composite(Some(Expr::slice_of(record)), vec![placeholder_case(); count]);
    Stmt::Assign { lhs: vec![Expr::ident(CASES)], tok: AssignTok::Define, rhs: vec![cases] }
}

/// `for _, testcase := range testcases { t.Run(testcase.name, func(t *testing.T) { ... }) }`
fn run_loop() -> Stmt {
    let print = Stmt::Expr(Expr::call(
        Expr::selector(Expr::ident("fmt"), "Println"),
        vec![Expr::string_lit(PLACEHOLDER_MESSAGE)],
    ));
    let subtest = Expr::FuncLit {
        ty: FuncType { params: vec![testing_param()], results: Vec::new() },
        body: Block::new(vec![print]),
    };
    let run = Stmt::Expr(Expr::call(
        Expr::selector(Expr::ident("t"), "Run"),
        vec![Expr::selector(Expr::ident(CASE), "name"), subtest],
    ));
    Stmt::Range {
        key: Some(Expr::ident("_")),
        value: Some(Expr::ident(CASE)),
        tok: Some(AssignTok::Define),
        x: Expr::ident(CASES),
        body: Block::new(vec![run]),
    }
}

/// Test function for `target` with `count` placeholder cases.
///
/// Returns `None` for unexported targets and for a count of zero.
pub fn build_test_function(target: &FunctionSignature, count: usize) -> Option<FuncDecl> {
    if count == 0 || !target.is_exported() {
        return None;
    }
    Some(FuncDecl {
        recv: None,
        name: target.test_function_name(),
        ty: FuncType { params: vec![testing_param()], results: Vec::new() },
        body: Some(Block::new(vec![cases_decl(count), run_loop()])),
    })
}

/// Test declarations for every qualifying function of `unit`, in source order.
///
/// `None` when no function qualifies.
pub fn synthesize_unit(unit: &SourceUnit, estimate: &CaseEstimate) -> Option<GeneratedTestUnit> {
    let mut decls = Vec::new();
    let mut functions = Vec::new();

    for (signature, _) in unit.functions() {
        let key = signature.key();
        let Some(count) = estimate.get(&key) else {
            warn!(function = %key, path = %unit.path.display(), "no case estimate for function");
            continue;
        };
        match build_test_function(&signature, count) {
            Some(func) => {
                decls.push(Decl::Func(func));
                functions.push(key);
            }
            None => debug!(function = %key, count, "no test for function"),
        }
    }

    if decls.is_empty() {
        return None;
    }
    let output_path = test_file_path(&unit.path)?;
    Some(GeneratedTestUnit {
        source_path: unit.path.clone(),
        output_path,
        package: test_package_name(unit.package()),
        decls,
        functions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::print_file;

    #[test]
    fn case_count_sets_literal_length() {
        let target = FunctionSignature::new("account", None, "Validate");
        let func = build_test_function(&target, 3).expect("exported with cases");
        let body = func.body.expect("body");
        let Stmt::Assign { rhs, .. } = &body.stmts[0] else {
            panic!("first statement should declare the cases");
        };
        let Expr::CompositeLit { elts, .. } = &rhs[0] else {
            panic!("cases should be a composite literal");
        };
        assert_eq!(elts.len(), 3);
    }

    #[test]
    fn zero_cases_or_unexported_yield_nothing() {
        assert!(build_test_function(&FunctionSignature::new("p", None, "Run"), 0).is_none());
        assert!(build_test_function(&FunctionSignature::new("p", None, "run"), 4).is_none());
    }

    #[test]
    fn method_test_renders_table_driven_skeleton() {
        let target = FunctionSignature::new("svc", Some("Service".into()), "Create");
        let unit = GeneratedTestUnit {
            source_path: "/x/service.go".into(),
            output_path: "/x/service_test.go".into(),
            package: "svc_test".into(),
            decls: vec![Decl::Func(build_test_function(&target, 1).expect("decl"))],
            functions: vec![target.key()],
        };
        let text = print_file(&unit.to_source_file());
        let expected = "package svc_test\n\nimport (\n\t\"fmt\"\n\t\"testing\"\n)\n\n\
func TestService_Create(t *testing.T) {\n\
\ttestcases := []struct {\n\t\tname string\n\t}{\n\t\t{name: \"\"},\n\t}\n\
\tfor _, testcase := range testcases {\n\
\t\tt.Run(testcase.name, func(t *testing.T) {\n\
\t\t\tfmt.Println(\"write your unit test!\")\n\t\t})\n\t}\n}\n";
        assert_eq!(text, expected);
    }
}
