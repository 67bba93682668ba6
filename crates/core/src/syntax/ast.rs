//! Owned Go syntax tree.
//!
//! Every node is a plain value: parsed trees are lowered into these types once
//! and never mutated afterwards, and synthesised trees are built bottom-up from
//! the constructor helpers below.

/// A parsed (or synthesised) Go source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub package: String,
    pub decls: Vec<Decl>,
    /// Comment groups in document order. Empty when comments were not retained.
    pub comments: Vec<CommentGroup>,
}

impl SourceFile {
    pub fn new(package: impl Into<String>) -> Self {
        Self { package: package.into(), decls: Vec::new(), comments: Vec::new() }
    }

    /// All import specs, across every import declaration.
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls.iter().flat_map(|decl| match decl {
            Decl::Import(specs) => specs.as_slice(),
            _ => &[][..],
        })
    }

    /// Top-level function and method declarations in source order.
    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }

    /// Top-level type specs in source order.
    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.decls.iter().flat_map(|decl| match decl {
            Decl::Type(specs) => specs.as_slice(),
            _ => &[][..],
        })
    }

    /// The first comment group of the file, if any.
    pub fn leading_comment(&self) -> Option<&CommentGroup> {
        self.comments.first()
    }
}

/// A single import spec: `name "path"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit local name (`.`, `_`, or an alias) when present.
    pub name: Option<String>,
    pub path: String,
}

impl ImportSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self { name: None, path: path.into() }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A run of adjacent comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentGroup {
    /// Raw comment texts including their `//` or `/* */` markers.
    pub comments: Vec<String>,
    /// 1-based line of the first comment.
    pub line: usize,
}

impl CommentGroup {
    /// Comment text with markers removed, one line per source line,
    /// surrounding blank lines dropped and a trailing newline appended.
    pub fn text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for raw in &self.comments {
            if let Some(rest) = raw.strip_prefix("//") {
                lines.push(rest.strip_prefix(' ').unwrap_or(rest).trim_end().to_string());
            } else if let Some(rest) = raw.strip_prefix("/*") {
                let body = rest.strip_suffix("*/").unwrap_or(rest);
                lines.extend(body.lines().map(|l| l.trim_end().to_string()));
            } else {
                lines.push(raw.trim_end().to_string());
            }
        }

        while lines.first().is_some_and(|l| l.trim().is_empty()) {
            lines.remove(0);
        }
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            return String::new();
        }

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

/// Top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Import(Vec<ImportSpec>),
    Type(Vec<TypeSpec>),
    Var(Vec<ValueSpec>),
    Const(Vec<ValueSpec>),
    Func(FuncDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    /// `type A = B` rather than `type A B`.
    pub alias: bool,
    pub ty: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSpec {
    pub names: Vec<String>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub recv: Option<Field>,
    pub name: String,
    pub ty: FuncType,
    pub body: Option<Block>,
}

impl FuncDecl {
    /// Base type name of the receiver, without pointer or type arguments.
    pub fn receiver_type_name(&self) -> Option<&str> {
        self.recv.as_ref().and_then(|field| field.ty.base_type_name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuncType {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

/// A parameter, result, struct field, or interface method.
///
/// Embedded struct fields and interface embeddings have no names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub names: Vec<String>,
    pub ty: Expr,
}

impl Field {
    pub fn named(name: impl Into<String>, ty: Expr) -> Self {
        Self { names: vec![name.into()], ty }
    }

    pub fn anonymous(ty: Expr) -> Self {
        Self { names: Vec::new(), ty }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

/// Assignment token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignTok {
    /// `:=`
    Define,
    /// `=`
    Assign,
    /// `+=`, `<<=`, ...
    Compound(String),
}

impl AssignTok {
    pub fn as_str(&self) -> &str {
        match self {
            AssignTok::Define => ":=",
            AssignTok::Assign => "=",
            AssignTok::Compound(op) => op,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseHeader {
    Default,
    Exprs(Vec<Expr>),
    Comm(Box<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseClause {
    pub header: CaseHeader,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Expr(Expr),
    Assign {
        lhs: Vec<Expr>,
        tok: AssignTok,
        rhs: Vec<Expr>,
    },
    Var(Vec<ValueSpec>),
    Const(Vec<ValueSpec>),
    Type(Vec<TypeSpec>),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        els: Option<Box<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        tok: Option<AssignTok>,
        x: Expr,
        body: Block,
    },
    Switch {
        init: Option<Box<Stmt>>,
        /// Tag expression; for type switches this is the `x.(type)` guard.
        tag: Option<Expr>,
        /// `v :=` binding of a type switch.
        binding: Option<String>,
        clauses: Vec<CaseClause>,
    },
    Select(Vec<CaseClause>),
    Return(Vec<Expr>),
    Go(Expr),
    Defer(Expr),
    Block(Block),
    IncDec {
        x: Expr,
        inc: bool,
    },
    Send {
        chan: Expr,
        value: Expr,
    },
    Labeled {
        label: String,
        stmt: Box<Stmt>,
    },
    /// `break`, `continue`, `goto`, `fallthrough` with an optional label.
    Branch {
        keyword: String,
        label: Option<String>,
    },
    Empty,
    Raw(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(String),
    BasicLit {
        kind: LitKind,
        /// Literal exactly as written, quotes included.
        value: String,
    },
    Selector {
        x: Box<Expr>,
        sel: String,
    },
    Call {
        fun: Box<Expr>,
        args: Vec<Expr>,
        ellipsis: bool,
    },
    CompositeLit {
        ty: Option<Box<Expr>>,
        elts: Vec<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    FuncLit {
        ty: FuncType,
        body: Block,
    },
    Star(Box<Expr>),
    Unary {
        op: String,
        x: Box<Expr>,
    },
    Binary {
        x: Box<Expr>,
        op: String,
        y: Box<Expr>,
    },
    Paren(Box<Expr>),
    /// Index expression or generic instantiation.
    Index {
        x: Box<Expr>,
        indices: Vec<Expr>,
    },
    /// `x.(T)`; `ty` is `None` for the `x.(type)` switch guard.
    TypeAssert {
        x: Box<Expr>,
        ty: Option<Box<Expr>>,
    },
    /// `[N]T` or, with `len` absent, `[]T`.
    ArrayType {
        len: Option<Box<Expr>>,
        elt: Box<Expr>,
    },
    Ellipsis(Option<Box<Expr>>),
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ChanType {
        dir: ChanDir,
        value: Box<Expr>,
    },
    FuncType(FuncType),
    StructType(Vec<Field>),
    /// Methods carry a `FuncType`; embedded interfaces are unnamed fields.
    InterfaceType(Vec<Field>),
    Raw(String),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn selector(x: Expr, sel: impl Into<String>) -> Self {
        Expr::Selector { x: Box::new(x), sel: sel.into() }
    }

    pub fn call(fun: Expr, args: Vec<Expr>) -> Self {
        Expr::Call { fun: Box::new(fun), args, ellipsis: false }
    }

    pub fn star(x: Expr) -> Self {
        Expr::Star(Box::new(x))
    }

    pub fn key_value(key: Expr, value: Expr) -> Self {
        Expr::KeyValue { key: Box::new(key), value: Box::new(value) }
    }

    pub fn composite(ty: Option<Expr>, elts: Vec<Expr>) -> Self {
        Expr::CompositeLit { ty: ty.map(Box::new), elts }
    }

    pub fn slice_of(elt: Expr) -> Self {
        Expr::ArrayType { len: None, elt: Box::new(elt) }
    }

    /// Interpreted string literal holding `value`.
    pub fn string_lit(value: &str) -> Self {
        Expr::BasicLit { kind: LitKind::String, value: quote(value) }
    }

    /// Name of the type this expression denotes once pointers, parentheses and
    /// type arguments are stripped: `*List[T]` -> `List`, `pkg.T` -> `T`.
    pub fn base_type_name(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            Expr::Star(inner) | Expr::Paren(inner) => inner.base_type_name(),
            Expr::Index { x, .. } => x.base_type_name(),
            Expr::Selector { sel, .. } => Some(sel),
            _ => None,
        }
    }

    /// Whether the expression is a call, looking through parentheses.
    pub fn as_call(&self) -> Option<(&Expr, &[Expr])> {
        match self {
            Expr::Call { fun, args, .. } => Some((fun, args)),
            Expr::Paren(inner) => inner.as_call(),
            _ => None,
        }
    }
}

/// Quote `value` as a Go interpreted string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Strip the quotes from an interpreted or raw string literal.
pub fn unquote(literal: &str) -> String {
    if let Some(raw) = literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return raw.to_string();
    }
    let inner = literal.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(literal);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_text_strips_markers_and_blank_edges() {
        let group = CommentGroup {
            comments: vec![
                "//".to_string(),
                "// +mockgen -source=foo.go".to_string(),
                "/* second\n   line */".to_string(),
            ],
            line: 1,
        };
        assert_eq!(group.text(), "+mockgen -source=foo.go\n second\n   line\n");
    }

    #[test]
    fn base_type_name_strips_pointer_and_type_args() {
        let ty = Expr::star(Expr::Index {
            x: Box::new(Expr::ident("List")),
            indices: vec![Expr::ident("T")],
        });
        assert_eq!(ty.base_type_name(), Some("List"));
    }

    #[test]
    fn quote_and_unquote_are_inverse_for_escapes() {
        let quoted = quote("say \"hi\"\n");
        assert_eq!(quoted, "\"say \\\"hi\\\"\\n\"");
        assert_eq!(unquote(&quoted), "say \"hi\"\n");
        assert_eq!(unquote("`raw\\n`"), "raw\\n");
    }
}
