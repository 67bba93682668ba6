//! Parse Go source with tree-sitter-go and lower it into the owned tree.
//!
//! tree-sitter recovers from syntax errors; we do not. Any ERROR or MISSING
//! node fails the parse so callers never see a half-understood file.

use thiserror::Error;
use tree_sitter::{Node, Parser};

use super::ast::*;

#[derive(Debug, Error)]
pub enum ParseError {
    /// The Go grammar could not be installed into the parser.
    #[error("Failed to load Go grammar: {0}")]
    Grammar(String),

    #[error("Parser produced no syntax tree")]
    NoTree,

    #[error("Syntax error at {line}:{column} near `{snippet}`")]
    Syntax { line: usize, column: usize, snippet: String },

    #[error("Missing package clause")]
    MissingPackage,
}

/// Build a tree-sitter parser configured for Go.
pub fn go_parser() -> Result<Parser, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| ParseError::Grammar(e.to_string()))?;
    Ok(parser)
}

/// Parse a complete Go source file.
pub fn parse_source(source: &str) -> Result<SourceFile, ParseError> {
    let mut parser = go_parser()?;
    let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(first_error(root, source));
    }
    Lowerer { src: source }.file(root)
}

fn first_error(root: Node, src: &str) -> ParseError {
    fn find(node: Node<'_>) -> Option<Node<'_>> {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            return None;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        children.into_iter().find_map(find)
    }

    let at = find(root).unwrap_or(root);
    let pos = at.start_position();
    let snippet: String = src
        .get(at.byte_range())
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .chars()
        .take(40)
        .collect();
    ParseError::Syntax { line: pos.row + 1, column: pos.column + 1, snippet }
}

struct Lowerer<'s> {
    src: &'s str,
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: Node) -> &'s str {
        self.src.get(node.byte_range()).unwrap_or("")
    }

    /// Named children, comments excluded.
    fn named<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor).filter(|c| c.kind() != "comment").collect()
    }

    fn field_nodes<'t>(&self, node: Node<'t>, field: &str) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.children_by_field_name(field, &mut cursor).collect()
    }

    fn field_text(&self, node: Node, field: &str) -> String {
        node.child_by_field_name(field).map(|n| self.text(n).to_string()).unwrap_or_default()
    }

    /// The first anonymous child token matching one of `tokens`.
    fn token(&self, node: Node, tokens: &[&str]) -> Option<String> {
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .find(|c| !c.is_named() && tokens.contains(&c.kind()))
            .map(|c| c.kind().to_string());
        found
    }

    fn file(&self, root: Node) -> Result<SourceFile, ParseError> {
        let mut package = None;
        let mut decls = Vec::new();

        for child in self.named(root) {
            match child.kind() {
                "package_clause" => {
                    package = self.named(child).first().map(|n| self.text(*n).to_string());
                }
                "import_declaration" => decls.push(Decl::Import(self.import_specs(child))),
                "function_declaration" | "method_declaration" => {
                    decls.push(Decl::Func(self.func_decl(child)))
                }
                "type_declaration" => decls.push(Decl::Type(self.type_specs(child))),
                "var_declaration" => decls.push(Decl::Var(self.value_specs(child, "var_spec"))),
                "const_declaration" => {
                    decls.push(Decl::Const(self.value_specs(child, "const_spec")))
                }
                _ => {}
            }
        }

        let package = package.ok_or(ParseError::MissingPackage)?;
        Ok(SourceFile { package, decls, comments: self.comment_groups(root) })
    }

    fn import_specs(&self, node: Node) -> Vec<ImportSpec> {
        let mut specs = Vec::new();
        for child in self.named(node) {
            match child.kind() {
                "import_spec" => specs.extend(self.import_spec(child)),
                "import_spec_list" => {
                    for inner in self.named(child) {
                        if inner.kind() == "import_spec" {
                            specs.extend(self.import_spec(inner));
                        }
                    }
                }
                _ => {}
            }
        }
        specs
    }

    fn import_spec(&self, node: Node) -> Option<ImportSpec> {
        let path = node.child_by_field_name("path").map(|p| unquote(self.text(p)))?;
        let name = node.child_by_field_name("name").map(|n| self.text(n).to_string());
        Some(ImportSpec { name, path })
    }

    fn type_specs(&self, node: Node) -> Vec<TypeSpec> {
        self.named(node)
            .into_iter()
            .filter(|c| matches!(c.kind(), "type_spec" | "type_alias"))
            .map(|spec| TypeSpec {
                name: self.field_text(spec, "name"),
                alias: spec.kind() == "type_alias",
                ty: spec.child_by_field_name("type").map(|t| self.expr(t)).unwrap_or(Expr::Raw(
                    String::new(),
                )),
            })
            .collect()
    }

    fn value_specs(&self, node: Node, spec_kind: &str) -> Vec<ValueSpec> {
        let mut specs = Vec::new();
        for child in self.named(node) {
            if child.kind() == spec_kind {
                specs.push(self.value_spec(child));
            } else if child.kind().ends_with("_spec_list") {
                specs.extend(
                    self.named(child)
                        .into_iter()
                        .filter(|c| c.kind() == spec_kind)
                        .map(|c| self.value_spec(c)),
                );
            }
        }
        specs
    }

    fn value_spec(&self, node: Node) -> ValueSpec {
        ValueSpec {
            names: self
                .field_nodes(node, "name")
                .into_iter()
                .map(|n| self.text(n).to_string())
                .collect(),
            ty: node.child_by_field_name("type").map(|t| self.expr(t)),
            values: node
                .child_by_field_name("value")
                .map(|v| self.expr_list(v))
                .unwrap_or_default(),
        }
    }

    fn func_decl(&self, node: Node) -> FuncDecl {
        let recv = node
            .child_by_field_name("receiver")
            .and_then(|list| self.field_list(list).into_iter().next());
        FuncDecl {
            recv,
            name: self.field_text(node, "name"),
            ty: self.func_type(node),
            body: node.child_by_field_name("body").map(|b| self.block(b)),
        }
    }

    /// Parameters and results of any node with `parameters`/`result` fields.
    fn func_type(&self, node: Node) -> FuncType {
        FuncType {
            params: node
                .child_by_field_name("parameters")
                .map(|p| self.field_list(p))
                .unwrap_or_default(),
            results: match node.child_by_field_name("result") {
                Some(result) if result.kind() == "parameter_list" => self.field_list(result),
                Some(result) => vec![Field::anonymous(self.expr(result))],
                None => Vec::new(),
            },
        }
    }

    fn field_list(&self, node: Node) -> Vec<Field> {
        let mut fields = Vec::new();
        for child in self.named(node) {
            let names: Vec<String> = self
                .field_nodes(child, "name")
                .into_iter()
                .map(|n| self.text(n).to_string())
                .collect();
            let ty = child.child_by_field_name("type").map(|t| self.expr(t));
            match (child.kind(), ty) {
                ("parameter_declaration", Some(ty)) => fields.push(Field { names, ty }),
                ("variadic_parameter_declaration", Some(ty)) => {
                    fields.push(Field { names, ty: Expr::Ellipsis(Some(Box::new(ty))) })
                }
                _ => {}
            }
        }
        fields
    }

    fn block(&self, node: Node) -> Block {
        Block::new(self.stmt_children(node, &[]))
    }

    /// Statements among the named children of `node`, skipping header nodes
    /// (case values and the like) and flattening `statement_list` wrappers.
    fn stmt_children(&self, node: Node, skip: &[usize]) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        for child in self.named(node) {
            if skip.contains(&child.id()) {
                continue;
            }
            if child.kind() == "statement_list" {
                stmts.extend(self.stmt_children(child, &[]));
            } else {
                stmts.push(self.stmt(child));
            }
        }
        stmts
    }

    fn boxed_stmt(&self, node: Option<Node>) -> Option<Box<Stmt>> {
        node.map(|n| Box::new(self.stmt(n)))
    }

    fn stmt(&self, node: Node) -> Stmt {
        match node.kind() {
            "expression_statement" => match self.named(node).first() {
                Some(inner) => Stmt::Expr(self.expr(*inner)),
                None => Stmt::Empty,
            },
            "short_var_declaration" => Stmt::Assign {
                lhs: self.field_expr_list(node, "left"),
                tok: AssignTok::Define,
                rhs: self.field_expr_list(node, "right"),
            },
            "assignment_statement" => {
                let op = self.field_text(node, "operator");
                Stmt::Assign {
                    lhs: self.field_expr_list(node, "left"),
                    tok: if op == "=" { AssignTok::Assign } else { AssignTok::Compound(op) },
                    rhs: self.field_expr_list(node, "right"),
                }
            }
            "receive_statement" => {
                let right = node.child_by_field_name("right").map(|r| self.expr(r));
                let right = right.unwrap_or_else(|| Expr::Raw(self.text(node).to_string()));
                match node.child_by_field_name("left") {
                    Some(left) => Stmt::Assign {
                        lhs: self.expr_list(left),
                        tok: match self.token(node, &[":="]) {
                            Some(_) => AssignTok::Define,
                            None => AssignTok::Assign,
                        },
                        rhs: vec![right],
                    },
                    None => Stmt::Expr(right),
                }
            }
            "inc_statement" | "dec_statement" => match self.named(node).first() {
                Some(x) => Stmt::IncDec { x: self.expr(*x), inc: node.kind() == "inc_statement" },
                None => Stmt::Raw(self.text(node).to_string()),
            },
            "send_statement" => Stmt::Send {
                chan: self.field_expr(node, "channel"),
                value: self.field_expr(node, "value"),
            },
            "var_declaration" => Stmt::Var(self.value_specs(node, "var_spec")),
            "const_declaration" => Stmt::Const(self.value_specs(node, "const_spec")),
            "type_declaration" => Stmt::Type(self.type_specs(node)),
            "return_statement" => Stmt::Return(
                self.named(node).first().map(|list| self.expr_list(*list)).unwrap_or_default(),
            ),
            "go_statement" | "defer_statement" => {
                let call = self
                    .named(node)
                    .first()
                    .map(|n| self.expr(*n))
                    .unwrap_or_else(|| Expr::Raw(String::new()));
                if node.kind() == "go_statement" {
                    Stmt::Go(call)
                } else {
                    Stmt::Defer(call)
                }
            }
            "if_statement" => Stmt::If {
                init: self.boxed_stmt(node.child_by_field_name("initializer")),
                cond: self.field_expr(node, "condition"),
                then: node
                    .child_by_field_name("consequence")
                    .map(|b| self.block(b))
                    .unwrap_or_default(),
                els: node.child_by_field_name("alternative").map(|alt| {
                    Box::new(if alt.kind() == "block" {
                        Stmt::Block(self.block(alt))
                    } else {
                        self.stmt(alt)
                    })
                }),
            },
            "for_statement" => self.for_stmt(node),
            "expression_switch_statement" => Stmt::Switch {
                init: self.boxed_stmt(node.child_by_field_name("initializer")),
                tag: node.child_by_field_name("value").map(|v| self.expr(v)),
                binding: None,
                clauses: self.case_clauses(node),
            },
            "type_switch_statement" => Stmt::Switch {
                init: self.boxed_stmt(node.child_by_field_name("initializer")),
                tag: Some(Expr::TypeAssert {
                    x: Box::new(self.field_expr(node, "value")),
                    ty: None,
                }),
                binding: node.child_by_field_name("alias").map(|a| self.text(a).to_string()),
                clauses: self.case_clauses(node),
            },
            "select_statement" => Stmt::Select(self.case_clauses(node)),
            "labeled_statement" => {
                let label = node.child_by_field_name("label");
                let inner = self
                    .named(node)
                    .into_iter()
                    .find(|c| Some(c.id()) != label.map(|l| l.id()))
                    .map(|s| self.stmt(s))
                    .unwrap_or(Stmt::Empty);
                Stmt::Labeled {
                    label: label.map(|l| self.text(l).to_string()).unwrap_or_default(),
                    stmt: Box::new(inner),
                }
            }
            "break_statement"
            | "continue_statement"
            | "goto_statement"
            | "fallthrough_statement" => Stmt::Branch {
                keyword: node.kind().trim_end_matches("_statement").to_string(),
                label: self.named(node).first().map(|l| self.text(*l).to_string()),
            },
            "block" => Stmt::Block(self.block(node)),
            "empty_statement" => Stmt::Empty,
            _ => Stmt::Raw(self.text(node).to_string()),
        }
    }

    fn for_stmt(&self, node: Node) -> Stmt {
        let body = node.child_by_field_name("body");
        let body_block = body.map(|b| self.block(b)).unwrap_or_default();
        let header =
            self.named(node).into_iter().find(|c| Some(c.id()) != body.map(|b| b.id()));

        match header {
            Some(clause) if clause.kind() == "for_clause" => Stmt::For {
                init: self.boxed_stmt(clause.child_by_field_name("initializer")),
                cond: clause.child_by_field_name("condition").map(|c| self.expr(c)),
                post: self.boxed_stmt(clause.child_by_field_name("update")),
                body: body_block,
            },
            Some(clause) if clause.kind() == "range_clause" => {
                let mut left = clause
                    .child_by_field_name("left")
                    .map(|l| self.expr_list(l))
                    .unwrap_or_default()
                    .into_iter();
                let key = left.next();
                let value = left.next();
                let tok = if key.is_some() {
                    match self.token(clause, &[":="]) {
                        Some(_) => Some(AssignTok::Define),
                        None => Some(AssignTok::Assign),
                    }
                } else {
                    None
                };
                let x = self.field_expr(clause, "right");
                Stmt::Range { key, value, tok, x, body: body_block }
            }
            Some(cond) => {
                Stmt::For { init: None, cond: Some(self.expr(cond)), post: None, body: body_block }
            }
            None => Stmt::For { init: None, cond: None, post: None, body: body_block },
        }
    }

    fn case_clauses(&self, node: Node) -> Vec<CaseClause> {
        let mut clauses = Vec::new();
        for child in self.named(node) {
            let (header, skip) = match child.kind() {
                "default_case" => (CaseHeader::Default, Vec::new()),
                "expression_case" => {
                    let value = child.child_by_field_name("value");
                    (
                        CaseHeader::Exprs(value.map(|v| self.expr_list(v)).unwrap_or_default()),
                        value.map(|v| vec![v.id()]).unwrap_or_default(),
                    )
                }
                "type_case" => {
                    let types = self.field_nodes(child, "type");
                    (
                        CaseHeader::Exprs(types.iter().map(|t| self.expr(*t)).collect()),
                        types.iter().map(|t| t.id()).collect(),
                    )
                }
                "communication_case" => match child.child_by_field_name("communication") {
                    Some(comm) => (CaseHeader::Comm(Box::new(self.stmt(comm))), vec![comm.id()]),
                    None => (CaseHeader::Default, Vec::new()),
                },
                _ => continue,
            };
            clauses.push(CaseClause { header, body: self.stmt_children(child, &skip) });
        }
        clauses
    }

    fn field_expr(&self, node: Node, field: &str) -> Expr {
        node.child_by_field_name(field)
            .map(|n| self.expr(n))
            .unwrap_or_else(|| Expr::Raw(String::new()))
    }

    fn field_expr_list(&self, node: Node, field: &str) -> Vec<Expr> {
        node.child_by_field_name(field).map(|n| self.expr_list(n)).unwrap_or_default()
    }

    fn expr_list(&self, node: Node) -> Vec<Expr> {
        if node.kind() == "expression_list" {
            self.named(node).into_iter().map(|n| self.expr(n)).collect()
        } else {
            vec![self.expr(node)]
        }
    }

    fn boxed(&self, node: Node, field: &str) -> Box<Expr> {
        Box::new(self.field_expr(node, field))
    }

    /// Lower an expression or a type; Go's grammar lets them overlap.
    fn expr(&self, node: Node) -> Expr {
        let text = self.text(node);
        match node.kind() {
            "identifier" | "field_identifier" | "type_identifier" | "package_identifier"
            | "label_name" | "blank_identifier" | "nil" | "true" | "false" | "iota" => {
                Expr::Ident(text.to_string())
            }
            "int_literal" => Expr::BasicLit { kind: LitKind::Int, value: text.to_string() },
            "float_literal" => Expr::BasicLit { kind: LitKind::Float, value: text.to_string() },
            "imaginary_literal" => Expr::BasicLit { kind: LitKind::Imag, value: text.to_string() },
            "rune_literal" => Expr::BasicLit { kind: LitKind::Char, value: text.to_string() },
            "interpreted_string_literal" | "raw_string_literal" => {
                Expr::BasicLit { kind: LitKind::String, value: text.to_string() }
            }
            "selector_expression" => Expr::Selector {
                x: self.boxed(node, "operand"),
                sel: self.field_text(node, "field"),
            },
            "call_expression" => {
                let mut ellipsis = false;
                let args = node
                    .child_by_field_name("arguments")
                    .map(|list| {
                        self.named(list)
                            .into_iter()
                            .map(|arg| {
                                if arg.kind() == "variadic_argument" {
                                    ellipsis = true;
                                    self.named(arg)
                                        .first()
                                        .map(|inner| self.expr(*inner))
                                        .unwrap_or_else(|| Expr::Raw(self.text(arg).to_string()))
                                } else {
                                    self.expr(arg)
                                }
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                Expr::Call { fun: self.boxed(node, "function"), args, ellipsis }
            }
            "composite_literal" => Expr::CompositeLit {
                ty: node.child_by_field_name("type").map(|t| Box::new(self.expr(t))),
                elts: node
                    .child_by_field_name("body")
                    .map(|body| self.literal_elements(body))
                    .unwrap_or_default(),
            },
            "literal_value" => Expr::CompositeLit { ty: None, elts: self.literal_elements(node) },
            "literal_element" => match self.named(node).first() {
                Some(inner) => self.expr(*inner),
                None => Expr::Raw(text.to_string()),
            },
            "keyed_element" => {
                let parts = self.named(node);
                match parts.as_slice() {
                    [key, value] => Expr::key_value(self.expr(*key), self.expr(*value)),
                    _ => Expr::Raw(text.to_string()),
                }
            }
            "func_literal" => Expr::FuncLit {
                ty: self.func_type(node),
                body: node.child_by_field_name("body").map(|b| self.block(b)).unwrap_or_default(),
            },
            "unary_expression" => {
                let op = self.field_text(node, "operator");
                let x = self.boxed(node, "operand");
                if op == "*" {
                    Expr::Star(x)
                } else {
                    Expr::Unary { op, x }
                }
            }
            "binary_expression" => Expr::Binary {
                x: self.boxed(node, "left"),
                op: self.field_text(node, "operator"),
                y: self.boxed(node, "right"),
            },
            "parenthesized_expression" | "parenthesized_type" => match self.named(node).first() {
                Some(inner) => Expr::Paren(Box::new(self.expr(*inner))),
                None => Expr::Raw(text.to_string()),
            },
            "index_expression" => Expr::Index {
                x: self.boxed(node, "operand"),
                indices: vec![self.field_expr(node, "index")],
            },
            "type_assertion_expression" => Expr::TypeAssert {
                x: self.boxed(node, "operand"),
                ty: Some(self.boxed(node, "type")),
            },
            "type_conversion_expression" => Expr::Call {
                fun: self.boxed(node, "type"),
                args: vec![self.field_expr(node, "operand")],
                ellipsis: false,
            },
            "type_instantiation_expression" => {
                let mut parts = self.named(node).into_iter();
                match parts.next() {
                    Some(base) => Expr::Index {
                        x: Box::new(self.expr(base)),
                        indices: parts.map(|p| self.expr(p)).collect(),
                    },
                    None => Expr::Raw(text.to_string()),
                }
            }
            "generic_type" => Expr::Index {
                x: self.boxed(node, "type"),
                indices: node
                    .child_by_field_name("type_arguments")
                    .map(|args| self.named(args).into_iter().map(|a| self.expr(a)).collect())
                    .unwrap_or_default(),
            },
            "type_elem" | "constraint_elem" => match self.named(node).as_slice() {
                [single] => self.expr(*single),
                _ => Expr::Raw(text.to_string()),
            },
            "qualified_type" => Expr::selector(
                Expr::Ident(self.field_text(node, "package")),
                self.field_text(node, "name"),
            ),
            "pointer_type" => match self.named(node).first() {
                Some(inner) => Expr::star(self.expr(*inner)),
                None => Expr::Raw(text.to_string()),
            },
            "slice_type" => Expr::ArrayType { len: None, elt: self.boxed(node, "element") },
            "array_type" => Expr::ArrayType {
                len: Some(self.boxed(node, "length")),
                elt: self.boxed(node, "element"),
            },
            "implicit_length_array_type" => Expr::ArrayType {
                len: Some(Box::new(Expr::Ellipsis(None))),
                elt: self.boxed(node, "element"),
            },
            "map_type" => {
                Expr::MapType { key: self.boxed(node, "key"), value: self.boxed(node, "value") }
            }
            "channel_type" => {
                let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                let dir = if compact.starts_with("<-") {
                    ChanDir::Recv
                } else if compact.starts_with("chan<-") {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Expr::ChanType { dir, value: self.boxed(node, "value") }
            }
            "function_type" => Expr::FuncType(self.func_type(node)),
            "struct_type" => Expr::StructType(self.struct_fields(node)),
            "interface_type" => Expr::InterfaceType(self.interface_elems(node)),
            _ => Expr::Raw(text.to_string()),
        }
    }

    fn literal_elements(&self, node: Node) -> Vec<Expr> {
        self.named(node).into_iter().map(|n| self.expr(n)).collect()
    }

    fn struct_fields(&self, node: Node) -> Vec<Field> {
        let mut fields = Vec::new();
        let lists = self.named(node);
        for list in lists.into_iter().filter(|n| n.kind() == "field_declaration_list") {
            for decl in self.named(list) {
                if decl.kind() != "field_declaration" {
                    continue;
                }
                let names: Vec<String> = self
                    .field_nodes(decl, "name")
                    .into_iter()
                    .map(|n| self.text(n).to_string())
                    .collect();
                let Some(ty) = decl.child_by_field_name("type").map(|t| self.expr(t)) else {
                    continue;
                };
                let ty = if names.is_empty() && self.token(decl, &["*"]).is_some() {
                    Expr::star(ty)
                } else {
                    ty
                };
                fields.push(Field { names, ty });
            }
        }
        fields
    }

    fn interface_elems(&self, node: Node) -> Vec<Field> {
        self.named(node)
            .into_iter()
            .map(|elem| match elem.kind() {
                "method_elem" | "method_spec" => Field {
                    names: vec![self.field_text(elem, "name")],
                    ty: Expr::FuncType(self.func_type(elem)),
                },
                _ => Field::anonymous(self.expr(elem)),
            })
            .collect()
    }

    fn comment_groups(&self, root: Node) -> Vec<CommentGroup> {
        fn collect<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
            if node.kind() == "comment" {
                out.push(node);
                return;
            }
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            for child in children {
                collect(child, out);
            }
        }

        let mut nodes = Vec::new();
        collect(root, &mut nodes);

        let mut groups: Vec<CommentGroup> = Vec::new();
        let mut last_end_row: Option<usize> = None;
        for node in nodes {
            let start = node.start_position().row;
            let adjacent = last_end_row.is_some_and(|end| start <= end + 1);
            match groups.last_mut() {
                Some(group) if adjacent => group.comments.push(self.text(node).to_string()),
                _ => groups.push(CommentGroup {
                    comments: vec![self.text(node).to_string()],
                    line: start + 1,
                }),
            }
            last_end_row = Some(node.end_position().row);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowers_receiver_and_params() {
        let file = parse_source(
            "package svc\n\nfunc (s *Service) Create(ctx context.Context, names ...string) (int, error) {\n\treturn 0, nil\n}\n",
        )
        .expect("parse");
        let func = file.funcs().next().expect("func");
        assert_eq!(func.name, "Create");
        assert_eq!(func.receiver_type_name(), Some("Service"));
        assert_eq!(func.ty.params.len(), 2);
        assert_eq!(
            func.ty.params[0].ty,
            Expr::selector(Expr::ident("context"), "Context")
        );
        assert!(matches!(func.ty.params[1].ty, Expr::Ellipsis(Some(_))));
        assert_eq!(func.ty.results.len(), 2);
    }

    #[test]
    fn rejects_source_with_syntax_error() {
        let err = parse_source("package broken\n\nfunc Oops( {\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "unexpected error: {err}");
    }

    #[test]
    fn groups_adjacent_comments() {
        let file = parse_source(
            "// first\n// still first\n\n// second\npackage p\n",
        )
        .expect("parse");
        assert_eq!(file.comments.len(), 2);
        assert_eq!(file.comments[0].text(), "first\nstill first\n");
        assert_eq!(file.comments[1].line, 4);
    }
}
