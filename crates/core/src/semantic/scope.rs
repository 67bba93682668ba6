use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::context::{ImportTarget, Member, Signature, VarDecl, BUILTIN_FUNCS};
use super::{CallTarget, ResolutionContext, ResolutionMiss, Ty};
use crate::syntax::{print_expr, AssignTok, Expr, FuncDecl, LitKind, Stmt};

const MAX_VAR_DEPTH: usize = 8;

/// What a call expression's function operand denotes.
enum Callee {
    Func { target: CallTarget, sig: Signature },
    Conversion(Ty),
    Builtin(String),
}

/// Local bindings visible inside one function body.
///
/// Bindings are flat: a later declaration of the same name replaces the
/// earlier one. A name bound with an unknown type still shadows imports and
/// package-level objects.
#[derive(Debug, Clone)]
pub struct LocalScope<'c> {
    ctx: &'c ResolutionContext,
    package: String,
    file: PathBuf,
    vars: BTreeMap<String, Option<Ty>>,
    depth: usize,
}

impl<'c> LocalScope<'c> {
    /// Scope at the top of `func`, declared in `file`: receiver, parameters
    /// and named results are bound.
    pub fn for_function(
        ctx: &'c ResolutionContext,
        file: &Path,
        func: &FuncDecl,
    ) -> Result<Self, ResolutionMiss> {
        let mut scope = Self::package_level(ctx, file, 0)?;
        let fields = func.recv.iter().chain(&func.ty.params).chain(&func.ty.results);
        for field in fields {
            let ty = scope.resolve_type(&field.ty).ok();
            for name in &field.names {
                scope.declare(name, ty.clone());
            }
        }
        Ok(scope)
    }

    fn package_level(
        ctx: &'c ResolutionContext,
        file: &Path,
        depth: usize,
    ) -> Result<Self, ResolutionMiss> {
        let package = ctx.package_of_file(file).ok_or_else(|| {
            ResolutionMiss::Unsupported(format!("{} was not loaded", file.display()))
        })?;
        Ok(Self {
            ctx,
            package: package.to_string(),
            file: file.to_path_buf(),
            vars: BTreeMap::new(),
            depth,
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    fn resolve_type(&self, expr: &Expr) -> Result<Ty, ResolutionMiss> {
        self.ctx.resolve_type(&self.package, &self.file, expr)
    }

    pub fn declare(&mut self, name: &str, ty: Option<Ty>) {
        if name != "_" {
            self.vars.insert(name.to_string(), ty);
        }
    }

    /// Record the bindings a statement introduces into the enclosing block.
    pub fn bind(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { lhs, tok: AssignTok::Define, rhs } => {
                let types: Vec<Option<Ty>> = if lhs.len() == rhs.len() {
                    rhs.iter().map(|value| self.type_of(value).ok()).collect()
                } else if rhs.len() == 1 {
                    (0..lhs.len()).map(|i| self.call_result(&rhs[0], i).ok()).collect()
                } else {
                    vec![None; lhs.len()]
                };
                for (target, ty) in lhs.iter().zip(types) {
                    if let Expr::Ident(name) = target {
                        self.declare(name, ty);
                    }
                }
            }
            Stmt::Var(specs) => {
                for spec in specs {
                    for (i, name) in spec.names.iter().enumerate() {
                        let ty = match (&spec.ty, spec.values.len()) {
                            (Some(ty), _) => self.resolve_type(ty).ok(),
                            (None, n) if n == spec.names.len() => {
                                self.type_of(&spec.values[i]).ok()
                            }
                            (None, 1) => self.call_result(&spec.values[0], i).ok(),
                            _ => None,
                        };
                        self.declare(name, ty);
                    }
                }
            }
            Stmt::Labeled { stmt, .. } => self.bind(stmt),
            _ => {}
        }
    }

    fn is_local(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// An identifier that names an import in this file, unless shadowed.
    fn import_named(&self, name: &str) -> Option<ImportTarget> {
        if self.is_local(name) || self.ctx.var(&self.package, name).is_some() {
            return None;
        }
        self.ctx.import_target(&self.file, name)
    }

    /// Resolve what the function operand of a call invokes.
    pub fn resolve_call(&self, fun: &Expr) -> Result<CallTarget, ResolutionMiss> {
        match self.callee(fun)? {
            Callee::Func { target, .. } => Ok(target),
            Callee::Builtin(name) => {
                Ok(CallTarget { package: None, receiver: None, name, file: None })
            }
            Callee::Conversion(ty) => {
                Err(ResolutionMiss::Unsupported(format!("conversion to {}", ty.describe())))
            }
        }
    }

    fn callee(&self, fun: &Expr) -> Result<Callee, ResolutionMiss> {
        match fun {
            Expr::Paren(inner) | Expr::Index { x: inner, .. } => self.callee(inner),
            Expr::Ident(name) => {
                if self.is_local(name) || self.ctx.var(&self.package, name).is_some() {
                    let reason = format!("call through variable `{name}`");
                    return Err(ResolutionMiss::Unsupported(reason));
                }
                if let Some((target, sig)) = self.ctx.func(&self.package, name) {
                    return Ok(Callee::Func { target, sig });
                }
                if let Ok(ty) = self.resolve_type(fun) {
                    return Ok(Callee::Conversion(ty));
                }
                if BUILTIN_FUNCS.contains(&name.as_str()) {
                    return Ok(Callee::Builtin(name.clone()));
                }
                Err(ResolutionMiss::UnknownIdentifier(name.clone()))
            }
            Expr::Selector { x, sel } => {
                if let Expr::Ident(alias) = x.as_ref() {
                    match self.import_named(alias) {
                        Some(ImportTarget::Loaded(identity)) => {
                            if let Some((target, sig)) = self.ctx.func(&identity, sel) {
                                return Ok(Callee::Func { target, sig });
                            }
                            return self.resolve_type(fun).map(Callee::Conversion).map_err(|_| {
                                ResolutionMiss::UnknownIdentifier(format!("{alias}.{sel}"))
                            });
                        }
                        Some(ImportTarget::External(path)) => {
                            return Err(ResolutionMiss::ExternalPackage(path));
                        }
                        None => {}
                    }
                }
                let recv = self.type_of(x)?;
                match self.ctx.lookup_member(&recv, sel)? {
                    Member::Method { target, sig } => Ok(Callee::Func { target, sig }),
                    Member::Field(_) => {
                        let reason = format!("call through field {}", print_expr(fun));
                        Err(ResolutionMiss::Unsupported(reason))
                    }
                }
            }
            Expr::ArrayType { .. }
            | Expr::MapType { .. }
            | Expr::ChanType { .. }
            | Expr::FuncType(_) => self.resolve_type(fun).map(Callee::Conversion),
            Expr::Star(_) => {
                Err(ResolutionMiss::Unsupported(format!("conversion {}", print_expr(fun))))
            }
            Expr::FuncLit { .. } => {
                Err(ResolutionMiss::Unsupported("immediately invoked function literal".into()))
            }
            other => Err(ResolutionMiss::Unsupported(print_expr(other))),
        }
    }

    /// The `index`-th value produced by `expr`, which must be a call when
    /// `index > 0`.
    fn call_result(&self, expr: &Expr, index: usize) -> Result<Ty, ResolutionMiss> {
        let Some((fun, _)) = expr.as_call() else {
            return if index == 0 {
                self.type_of(expr)
            } else {
                Err(ResolutionMiss::Unsupported(format!("tuple value {}", print_expr(expr))))
            };
        };
        match self.callee(fun)? {
            Callee::Func { sig, .. } => self.ctx.result_type(&sig, index),
            _ => Err(ResolutionMiss::Unsupported(format!("tuple value {}", print_expr(expr)))),
        }
    }

    /// Static type of an expression.
    pub fn type_of(&self, expr: &Expr) -> Result<Ty, ResolutionMiss> {
        match expr {
            Expr::Ident(name) => {
                if let Some(bound) = self.vars.get(name) {
                    return bound.clone().ok_or_else(|| {
                        ResolutionMiss::Unsupported(format!("untyped local `{name}`"))
                    });
                }
                if self.ctx.var(&self.package, name).is_some() {
                    return self.package_var(&self.package, name);
                }
                Err(ResolutionMiss::UnknownIdentifier(name.clone()))
            }
            Expr::Selector { x, sel } => {
                if let Expr::Ident(alias) = x.as_ref() {
                    match self.import_named(alias) {
                        Some(ImportTarget::Loaded(identity)) => {
                            return self.package_var(&identity, sel);
                        }
                        Some(ImportTarget::External(path)) => {
                            return Err(ResolutionMiss::ExternalPackage(path));
                        }
                        None => {}
                    }
                }
                let base = self.type_of(x)?;
                match self.ctx.lookup_member(&base, sel)? {
                    Member::Field(ty) => Ok(ty),
                    Member::Method { .. } => {
                        let reason = format!("method value {}", print_expr(expr));
                        Err(ResolutionMiss::Unsupported(reason))
                    }
                }
            }
            Expr::Paren(inner) => self.type_of(inner),
            Expr::Star(inner) => match self.type_of(inner)? {
                Ty::Pointer(pointee) => Ok(*pointee),
                other => {
                    Err(ResolutionMiss::Unsupported(format!("dereference of {}", other.describe())))
                }
            },
            Expr::Unary { op, x } if op == "&" => Ok(Ty::Pointer(Box::new(self.type_of(x)?))),
            Expr::CompositeLit { ty: Some(ty), .. } => self.resolve_type(ty),
            Expr::TypeAssert { ty: Some(ty), .. } => self.resolve_type(ty),
            Expr::FuncLit { ty, .. } => Ok(Ty::Literal {
                package: self.package.clone(),
                file: self.file.clone(),
                expr: Expr::FuncType(ty.clone()),
            }),
            Expr::BasicLit { kind, .. } => Ok(Ty::named(None, basic_type(*kind))),
            Expr::Call { fun, args, .. } => match self.callee(fun)? {
                Callee::Func { sig, .. } => self.ctx.result_type(&sig, 0),
                Callee::Conversion(ty) => Ok(ty),
                Callee::Builtin(name) => {
                    let arg = args
                        .first()
                        .ok_or_else(|| ResolutionMiss::Unsupported(format!("{name}()")))?;
                    match name.as_str() {
                        "new" => Ok(Ty::Pointer(Box::new(self.resolve_type(arg)?))),
                        "make" => self.resolve_type(arg),
                        "append" => self.type_of(arg),
                        _ => Err(ResolutionMiss::Unsupported(format!("result of builtin {name}"))),
                    }
                }
            },
            Expr::Index { x, .. } => {
                let container = self.ctx.underlying(self.type_of(x)?.deref())?;
                match &container {
                    Ty::Literal { package, file, expr: Expr::ArrayType { elt, .. } } => {
                        self.ctx.resolve_type(package, file, elt)
                    }
                    Ty::Literal { package, file, expr: Expr::MapType { value, .. } } => {
                        self.ctx.resolve_type(package, file, value)
                    }
                    other => {
                        Err(ResolutionMiss::Unsupported(format!("index into {}", other.describe())))
                    }
                }
            }
            other => Err(ResolutionMiss::Unsupported(print_expr(other))),
        }
    }

    fn package_var(&self, identity: &str, name: &str) -> Result<Ty, ResolutionMiss> {
        let declared = self
            .ctx
            .var(identity, name)
            .ok_or_else(|| ResolutionMiss::UnknownIdentifier(name.to_string()))?;
        match &declared.item {
            VarDecl::Typed(ty) => self.ctx.resolve_type(identity, &declared.file, ty),
            VarDecl::Value { expr, index } => {
                if self.depth >= MAX_VAR_DEPTH {
                    let reason = format!("initializer of `{name}` nests too deep");
                    return Err(ResolutionMiss::Unsupported(reason));
                }
                let scope = Self::package_level(self.ctx, &declared.file, self.depth + 1)?;
                scope.call_result(expr, *index)
            }
        }
    }
}

fn basic_type(kind: LitKind) -> &'static str {
    match kind {
        LitKind::Int => "int",
        LitKind::Float => "float64",
        LitKind::Imag => "complex128",
        LitKind::Char => "rune",
        LitKind::String => "string",
    }
}
