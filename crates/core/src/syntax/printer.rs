//! Render the owned tree as Go source in gofmt's layout.
//!
//! The printer has no position information, so it applies fixed rules:
//! tabs for indentation, one blank line between top-level declarations,
//! multi-line composite literals whenever an element is itself composite,
//! and column-aligned struct fields.

use super::ast::*;

/// Render a complete file.
pub fn print_file(file: &SourceFile) -> String {
    let mut p = Printer::default();
    p.out.push_str("package ");
    p.out.push_str(&file.package);
    p.out.push('\n');
    for decl in &file.decls {
        p.out.push('\n');
        p.decl(decl);
        p.out.push('\n');
    }
    p.out
}

/// Render a single expression on one line where possible.
pub fn print_expr(expr: &Expr) -> String {
    let mut p = Printer::default();
    p.expr(expr);
    p.out
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Import(specs) => self.grouped("import", specs, |p, spec| p.import_spec(spec)),
            Decl::Type(specs) => self.grouped("type", specs, |p, spec| p.type_spec(spec)),
            Decl::Var(specs) => self.grouped("var", specs, |p, spec| p.value_spec(spec)),
            Decl::Const(specs) => self.grouped("const", specs, |p, spec| p.value_spec(spec)),
            Decl::Func(func) => self.func_decl(func),
        }
    }

    fn grouped<T>(&mut self, keyword: &str, items: &[T], mut each: impl FnMut(&mut Self, &T)) {
        self.out.push_str(keyword);
        if let [single] = items {
            self.out.push(' ');
            each(self, single);
            return;
        }
        self.out.push_str(" (");
        self.indent += 1;
        for item in items {
            self.newline();
            each(self, item);
        }
        self.indent -= 1;
        self.newline();
        self.out.push(')');
    }

    fn import_spec(&mut self, spec: &ImportSpec) {
        if let Some(name) = &spec.name {
            self.out.push_str(name);
            self.out.push(' ');
        }
        self.out.push_str(&quote(&spec.path));
    }

    fn type_spec(&mut self, spec: &TypeSpec) {
        self.out.push_str(&spec.name);
        self.out.push_str(if spec.alias { " = " } else { " " });
        self.expr(&spec.ty);
    }

    fn value_spec(&mut self, spec: &ValueSpec) {
        self.out.push_str(&spec.names.join(", "));
        if let Some(ty) = &spec.ty {
            self.out.push(' ');
            self.expr(ty);
        }
        if !spec.values.is_empty() {
            self.out.push_str(" = ");
            self.expr_list(&spec.values);
        }
    }

    fn func_decl(&mut self, func: &FuncDecl) {
        self.out.push_str("func ");
        if let Some(recv) = &func.recv {
            self.out.push('(');
            self.field(recv);
            self.out.push_str(") ");
        }
        self.out.push_str(&func.name);
        self.signature(&func.ty);
        if let Some(body) = &func.body {
            self.out.push(' ');
            self.block(body);
        }
    }

    fn signature(&mut self, ty: &FuncType) {
        self.out.push('(');
        self.fields(&ty.params);
        self.out.push(')');
        match ty.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                self.out.push(' ');
                self.expr(&single.ty);
            }
            results => {
                self.out.push_str(" (");
                self.fields(results);
                self.out.push(')');
            }
        }
    }

    fn fields(&mut self, fields: &[Field]) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.field(field);
        }
    }

    fn field(&mut self, field: &Field) {
        if !field.names.is_empty() {
            self.out.push_str(&field.names.join(", "));
            self.out.push(' ');
        }
        self.expr(&field.ty);
    }

    fn block(&mut self, block: &Block) {
        self.out.push('{');
        self.indent += 1;
        for stmt in &block.stmts {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => self.expr(expr),
            Stmt::Assign { lhs, tok, rhs } => {
                self.expr_list(lhs);
                self.out.push(' ');
                self.out.push_str(tok.as_str());
                self.out.push(' ');
                self.expr_list(rhs);
            }
            Stmt::Var(specs) => self.grouped("var", specs, |p, spec| p.value_spec(spec)),
            Stmt::Const(specs) => self.grouped("const", specs, |p, spec| p.value_spec(spec)),
            Stmt::Type(specs) => self.grouped("type", specs, |p, spec| p.type_spec(spec)),
            Stmt::If { init, cond, then, els } => {
                self.out.push_str("if ");
                if let Some(init) = init {
                    self.stmt(init);
                    self.out.push_str("; ");
                }
                self.expr(cond);
                self.out.push(' ');
                self.block(then);
                if let Some(els) = els {
                    self.out.push_str(" else ");
                    self.stmt(els);
                }
            }
            Stmt::For { init, cond, post, body } => {
                self.out.push_str("for ");
                if init.is_some() || post.is_some() {
                    if let Some(init) = init {
                        self.stmt(init);
                    }
                    self.out.push_str("; ");
                    if let Some(cond) = cond {
                        self.expr(cond);
                    }
                    self.out.push_str("; ");
                    if let Some(post) = post {
                        self.stmt(post);
                    }
                    self.out.push(' ');
                } else if let Some(cond) = cond {
                    self.expr(cond);
                    self.out.push(' ');
                }
                self.block(body);
            }
            Stmt::Range { key, value, tok, x, body } => {
                self.out.push_str("for ");
                if let Some(key) = key {
                    self.expr(key);
                    if let Some(value) = value {
                        self.out.push_str(", ");
                        self.expr(value);
                    }
                    self.out.push(' ');
                    self.out.push_str(tok.as_ref().map(AssignTok::as_str).unwrap_or(":="));
                    self.out.push(' ');
                }
                self.out.push_str("range ");
                self.expr(x);
                self.out.push(' ');
                self.block(body);
            }
            Stmt::Switch { init, tag, binding, clauses } => {
                self.out.push_str("switch ");
                if let Some(init) = init {
                    self.stmt(init);
                    self.out.push_str("; ");
                }
                if let Some(binding) = binding {
                    self.out.push_str(binding);
                    self.out.push_str(" := ");
                }
                if let Some(tag) = tag {
                    self.expr(tag);
                    self.out.push(' ');
                }
                self.clauses(clauses);
            }
            Stmt::Select(clauses) => {
                self.out.push_str("select ");
                self.clauses(clauses);
            }
            Stmt::Return(results) => {
                self.out.push_str("return");
                if !results.is_empty() {
                    self.out.push(' ');
                    self.expr_list(results);
                }
            }
            Stmt::Go(call) => {
                self.out.push_str("go ");
                self.expr(call);
            }
            Stmt::Defer(call) => {
                self.out.push_str("defer ");
                self.expr(call);
            }
            Stmt::Block(block) => self.block(block),
            Stmt::IncDec { x, inc } => {
                self.expr(x);
                self.out.push_str(if *inc { "++" } else { "--" });
            }
            Stmt::Send { chan, value } => {
                self.expr(chan);
                self.out.push_str(" <- ");
                self.expr(value);
            }
            Stmt::Labeled { label, stmt } => {
                self.out.push_str(label);
                self.out.push(':');
                self.newline();
                self.stmt(stmt);
            }
            Stmt::Branch { keyword, label } => {
                self.out.push_str(keyword);
                if let Some(label) = label {
                    self.out.push(' ');
                    self.out.push_str(label);
                }
            }
            Stmt::Empty => {}
            Stmt::Raw(text) => self.out.push_str(text),
        }
    }

    // gofmt keeps case labels at the switch's own indentation.
    fn clauses(&mut self, clauses: &[CaseClause]) {
        self.out.push('{');
        for clause in clauses {
            self.newline();
            match &clause.header {
                CaseHeader::Default => self.out.push_str("default:"),
                CaseHeader::Exprs(exprs) => {
                    self.out.push_str("case ");
                    self.expr_list(exprs);
                    self.out.push(':');
                }
                CaseHeader::Comm(stmt) => {
                    self.out.push_str("case ");
                    self.stmt(stmt);
                    self.out.push(':');
                }
            }
            self.indent += 1;
            for stmt in &clause.body {
                self.newline();
                self.stmt(stmt);
            }
            self.indent -= 1;
        }
        self.newline();
        self.out.push('}');
    }

    fn expr_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(expr);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(name) => self.out.push_str(name),
            Expr::BasicLit { value, .. } => self.out.push_str(value),
            Expr::Selector { x, sel } => {
                self.expr(x);
                self.out.push('.');
                self.out.push_str(sel);
            }
            Expr::Call { fun, args, ellipsis } => {
                self.expr(fun);
                self.out.push('(');
                self.expr_list(args);
                if *ellipsis {
                    self.out.push_str("...");
                }
                self.out.push(')');
            }
            Expr::CompositeLit { ty, elts } => self.composite(ty.as_deref(), elts),
            Expr::KeyValue { key, value } => {
                self.expr(key);
                self.out.push_str(": ");
                self.expr(value);
            }
            Expr::FuncLit { ty, body } => {
                self.out.push_str("func");
                self.signature(ty);
                self.out.push(' ');
                self.block(body);
            }
            Expr::Star(x) => {
                self.out.push('*');
                self.expr(x);
            }
            Expr::Unary { op, x } => {
                self.out.push_str(op);
                self.expr(x);
            }
            Expr::Binary { x, op, y } => {
                self.expr(x);
                self.out.push(' ');
                self.out.push_str(op);
                self.out.push(' ');
                self.expr(y);
            }
            Expr::Paren(x) => {
                self.out.push('(');
                self.expr(x);
                self.out.push(')');
            }
            Expr::Index { x, indices } => {
                self.expr(x);
                self.out.push('[');
                self.expr_list(indices);
                self.out.push(']');
            }
            Expr::TypeAssert { x, ty } => {
                self.expr(x);
                self.out.push_str(".(");
                match ty {
                    Some(ty) => self.expr(ty),
                    None => self.out.push_str("type"),
                }
                self.out.push(')');
            }
            Expr::ArrayType { len, elt } => {
                self.out.push('[');
                if let Some(len) = len {
                    self.expr(len);
                }
                self.out.push(']');
                self.expr(elt);
            }
            Expr::Ellipsis(elt) => {
                self.out.push_str("...");
                if let Some(elt) = elt {
                    self.expr(elt);
                }
            }
            Expr::MapType { key, value } => {
                self.out.push_str("map[");
                self.expr(key);
                self.out.push(']');
                self.expr(value);
            }
            Expr::ChanType { dir, value } => {
                self.out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.expr(value);
            }
            Expr::FuncType(ty) => {
                self.out.push_str("func");
                self.signature(ty);
            }
            Expr::StructType(fields) => self.member_block("struct", fields),
            Expr::InterfaceType(methods) => self.member_block("interface", methods),
            Expr::Raw(text) => self.out.push_str(text),
        }
    }

    fn composite(&mut self, ty: Option<&Expr>, elts: &[Expr]) {
        if let Some(ty) = ty {
            self.expr(ty);
        }
        if elts.is_empty() {
            self.out.push_str("{}");
            return;
        }

        let multiline = elts.iter().any(is_multiline_element);
        if !multiline {
            self.out.push('{');
            self.expr_list(elts);
            self.out.push('}');
            return;
        }

        self.out.push('{');
        self.indent += 1;
        for elt in elts {
            self.newline();
            self.expr(elt);
            self.out.push(',');
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    fn member_block(&mut self, keyword: &str, members: &[Field]) {
        self.out.push_str(keyword);
        if members.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str(" {");
        self.indent += 1;

        // Align the type column of named, non-method members.
        let width = members
            .iter()
            .filter(|m| !matches!(m.ty, Expr::FuncType(_)))
            .map(|m| m.names.join(", ").len())
            .max()
            .unwrap_or(0);

        for member in members {
            self.newline();
            match &member.ty {
                Expr::FuncType(sig) if !member.names.is_empty() => {
                    self.out.push_str(&member.names.join(", "));
                    self.signature(sig);
                }
                ty if member.names.is_empty() => self.expr(ty),
                ty => {
                    let names = member.names.join(", ");
                    self.out.push_str(&names);
                    for _ in names.len()..=width {
                        self.out.push(' ');
                    }
                    self.expr(ty);
                }
            }
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }
}

fn is_multiline_element(expr: &Expr) -> bool {
    match expr {
        Expr::CompositeLit { .. } | Expr::FuncLit { .. } => true,
        Expr::KeyValue { value, .. } => is_multiline_element(value),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_grouped_imports_and_single_import() {
        let mut file = SourceFile::new("demo");
        file.decls.push(Decl::Import(vec![ImportSpec::new("fmt"), ImportSpec::new("testing")]));
        assert_eq!(print_file(&file), "package demo\n\nimport (\n\t\"fmt\"\n\t\"testing\"\n)\n");

        let mut single = SourceFile::new("demo");
        single.decls.push(Decl::Import(vec![ImportSpec::new("os").with_name("system")]));
        assert_eq!(print_file(&single), "package demo\n\nimport system \"os\"\n");
    }

    #[test]
    fn aligns_struct_fields() {
        let ty = Expr::StructType(vec![
            Field::named("id", Expr::ident("int")),
            Field::named("displayName", Expr::ident("string")),
        ]);
        assert_eq!(print_expr(&ty), "struct {\n\tid          int\n\tdisplayName string\n}");
    }

    #[test]
    fn keeps_flat_literals_on_one_line() {
        let lit = Expr::composite(
            None,
            vec![Expr::key_value(Expr::ident("name"), Expr::string_lit(""))],
        );
        assert_eq!(print_expr(&lit), "{name: \"\"}");
    }
}
