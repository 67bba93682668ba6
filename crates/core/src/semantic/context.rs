use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::module::{default_import_name, slash_path, ModuleInfo};
use super::{CallTarget, ReceiverInfo, ResolutionMiss, Ty};
use crate::loader::{SourceSet, SourceUnit};
use crate::syntax::{print_expr, Decl, Expr, FuncType, ValueSpec};

/// Predeclared type names.
pub(crate) const PREDECLARED_TYPES: &[&str] = &[
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32", "float64",
    "int", "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8", "uint16", "uint32",
    "uint64", "uintptr",
];

/// Predeclared functions.
pub(crate) const BUILTIN_FUNCS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover",
];

const MAX_TYPE_CHAIN: usize = 16;

/// An item together with the file declaring it.
#[derive(Debug, Clone)]
pub(crate) struct Declared<T> {
    pub item: T,
    pub file: PathBuf,
}

/// How a package-level variable gets its type.
#[derive(Debug, Clone)]
pub(crate) enum VarDecl {
    /// `var x T`
    Typed(Expr),
    /// `var x = expr`, or the `index`-th result of `var a, b = call()`.
    Value { expr: Expr, index: usize },
}

/// Declarations of one package, merged across its files.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    /// Import path under a module, otherwise the directory relative to the scan root.
    pub identity: String,
    pub name: String,
    pub dir: PathBuf,
    pub(crate) types: BTreeMap<String, Declared<Expr>>,
    pub(crate) funcs: BTreeMap<String, Declared<FuncType>>,
    pub(crate) methods: BTreeMap<(String, String), Declared<FuncType>>,
    pub(crate) vars: BTreeMap<String, Declared<VarDecl>>,
}

impl PackageInfo {
    fn new(identity: String, name: &str, dir: &Path) -> Self {
        Self {
            identity,
            name: name.to_string(),
            dir: dir.to_path_buf(),
            types: BTreeMap::new(),
            funcs: BTreeMap::new(),
            methods: BTreeMap::new(),
            vars: BTreeMap::new(),
        }
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    fn collect(&mut self, unit: &SourceUnit) {
        for decl in &unit.file.decls {
            match decl {
                Decl::Type(specs) => {
                    for spec in specs {
                        self.types.insert(
                            spec.name.clone(),
                            Declared { item: spec.ty.clone(), file: unit.path.clone() },
                        );
                    }
                }
                Decl::Func(func) => {
                    let declared = Declared { item: func.ty.clone(), file: unit.path.clone() };
                    match func.receiver_type_name() {
                        Some(recv) => {
                            self.methods.insert((recv.to_string(), func.name.clone()), declared);
                        }
                        None => {
                            self.funcs.insert(func.name.clone(), declared);
                        }
                    }
                }
                Decl::Var(specs) => {
                    for spec in specs {
                        for (name, var) in var_decls(spec) {
                            self.vars.insert(name, Declared { item: var, file: unit.path.clone() });
                        }
                    }
                }
                Decl::Import(_) | Decl::Const(_) => {}
            }
        }
    }
}

/// Per-name typing of a `var` spec.
pub(crate) fn var_decls(spec: &ValueSpec) -> Vec<(String, VarDecl)> {
    spec.names
        .iter()
        .enumerate()
        .filter(|(_, name)| name.as_str() != "_")
        .filter_map(|(i, name)| {
            let var = if let Some(ty) = &spec.ty {
                VarDecl::Typed(ty.clone())
            } else if spec.values.len() == spec.names.len() {
                VarDecl::Value { expr: spec.values[i].clone(), index: 0 }
            } else if spec.values.len() == 1 {
                VarDecl::Value { expr: spec.values[0].clone(), index: i }
            } else {
                return None;
            };
            Some((name.clone(), var))
        })
        .collect()
}

/// Import bindings of one file.
#[derive(Debug, Clone, Default)]
pub(crate) struct FileScope {
    pub package: String,
    pub imports: BTreeMap<String, String>,
    pub dot_imports: Vec<String>,
}

/// Where an import name points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ImportTarget {
    Loaded(String),
    External(String),
}

/// A resolved member of a type.
#[derive(Debug, Clone)]
pub(crate) enum Member {
    Method { target: CallTarget, sig: Signature },
    Field(Ty),
}

/// A function or method signature and where its types are written.
#[derive(Debug, Clone)]
pub(crate) struct Signature {
    /// `None` for predeclared methods, whose result types are predeclared too.
    pub package: Option<String>,
    pub file: Option<PathBuf>,
    pub ty: FuncType,
}

/// Whole-run, read-only semantic view of the loaded sources.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    module: Option<ModuleInfo>,
    packages: BTreeMap<String, PackageInfo>,
    files: BTreeMap<PathBuf, FileScope>,
}

impl ResolutionContext {
    pub fn build(sources: &SourceSet, module: Option<ModuleInfo>) -> Self {
        let mut ctx = Self { module, ..Self::default() };

        let mut file_packages = Vec::with_capacity(sources.len());
        for unit in sources.iter() {
            let identity = ctx.identity_for_dir(sources.root(), unit.dir());
            ctx.packages
                .entry(identity.clone())
                .or_insert_with(|| PackageInfo::new(identity.clone(), unit.package(), unit.dir()))
                .collect(unit);
            file_packages.push((unit, identity));
        }

        for (unit, identity) in file_packages {
            let mut scope = FileScope { package: identity, ..FileScope::default() };
            for import in unit.file.imports() {
                match import.name.as_deref() {
                    Some("_") => {}
                    Some(".") => scope.dot_imports.push(import.path.clone()),
                    Some(alias) => {
                        scope.imports.insert(alias.to_string(), import.path.clone());
                    }
                    None => {
                        let name = match ctx.package_for_import(&import.path) {
                            Some(pkg) => pkg.name.clone(),
                            None => default_import_name(&import.path).to_string(),
                        };
                        scope.imports.insert(name, import.path.clone());
                    }
                }
            }
            ctx.files.insert(unit.path.clone(), scope);
        }

        debug!(packages = ctx.packages.len(), files = ctx.files.len(), "built resolution context");
        ctx
    }

    pub fn module(&self) -> Option<&ModuleInfo> {
        self.module.as_ref()
    }

    pub fn package(&self, identity: &str) -> Option<&PackageInfo> {
        self.packages.get(identity)
    }

    /// Package identity of a loaded file.
    pub fn package_of_file(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(|scope| scope.package.as_str())
    }

    fn identity_for_dir(&self, root: &Path, dir: &Path) -> String {
        if let Some(path) = self.module.as_ref().and_then(|m| m.import_path(dir)) {
            return path;
        }
        match dir.strip_prefix(root) {
            Ok(rel) if !rel.as_os_str().is_empty() => slash_path(rel),
            _ => root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| ".".to_string()),
        }
    }

    /// The loaded package an import path refers to. Without a module the
    /// identities are relative directories, so a suffix match is accepted.
    pub fn package_for_import(&self, import_path: &str) -> Option<&PackageInfo> {
        if let Some(pkg) = self.packages.get(import_path) {
            return Some(pkg);
        }
        if self.module.is_some() {
            return None;
        }
        self.packages.values().find(|pkg| import_path.ends_with(&format!("/{}", pkg.identity)))
    }

    pub(crate) fn import_target(&self, file: &Path, name: &str) -> Option<ImportTarget> {
        let path = self.files.get(file)?.imports.get(name)?;
        Some(match self.package_for_import(path) {
            Some(pkg) => ImportTarget::Loaded(pkg.identity.clone()),
            None => ImportTarget::External(path.clone()),
        })
    }

    /// Packages whose names are in scope unqualified in `file`: its own, then dot imports.
    fn unqualified_packages<'a>(&'a self, package: &str, file: &Path) -> Vec<&'a PackageInfo> {
        let mut found: Vec<&PackageInfo> = self.packages.get(package).into_iter().collect();
        if let Some(scope) = self.files.get(file) {
            found.extend(scope.dot_imports.iter().filter_map(|path| self.package_for_import(path)));
        }
        found
    }

    /// Resolve a type expression written in `file` of `package`.
    pub(crate) fn resolve_type(
        &self,
        package: &str,
        file: &Path,
        expr: &Expr,
    ) -> Result<Ty, ResolutionMiss> {
        match expr {
            Expr::Ident(name) => {
                let mut scope = self.unqualified_packages(package, file).into_iter();
                if let Some(pkg) = scope.find(|p| p.has_type(name)) {
                    return Ok(Ty::named(Some(pkg.identity.as_str()), name.clone()));
                }
                if PREDECLARED_TYPES.contains(&name.as_str()) {
                    return Ok(Ty::named(None, name.clone()));
                }
                Err(ResolutionMiss::UnknownType(name.clone()))
            }
            Expr::Star(inner) => {
                Ok(Ty::Pointer(Box::new(self.resolve_type(package, file, inner)?)))
            }
            Expr::Paren(inner) => self.resolve_type(package, file, inner),
            Expr::Index { x, .. } => self.resolve_type(package, file, x),
            Expr::Selector { x, sel } => {
                let Expr::Ident(alias) = x.as_ref() else {
                    return Err(ResolutionMiss::Unsupported(print_expr(expr)));
                };
                match self.import_target(file, alias) {
                    Some(ImportTarget::Loaded(identity)) => {
                        let known = self.packages.get(&identity).is_some_and(|p| p.has_type(sel));
                        if known {
                            Ok(Ty::named(Some(identity.as_str()), sel.clone()))
                        } else {
                            Err(ResolutionMiss::UnknownType(format!("{alias}.{sel}")))
                        }
                    }
                    Some(ImportTarget::External(path)) => {
                        Err(ResolutionMiss::ExternalPackage(path))
                    }
                    None => Err(ResolutionMiss::UnknownType(format!("{alias}.{sel}"))),
                }
            }
            Expr::Ellipsis(Some(elt)) => Ok(Ty::Literal {
                package: package.to_string(),
                file: file.to_path_buf(),
                expr: Expr::slice_of(elt.as_ref().clone()),
            }),
            Expr::StructType(_)
            | Expr::InterfaceType(_)
            | Expr::ArrayType { .. }
            | Expr::MapType { .. }
            | Expr::ChanType { .. }
            | Expr::FuncType(_) => Ok(Ty::Literal {
                package: package.to_string(),
                file: file.to_path_buf(),
                expr: expr.clone(),
            }),
            other => Err(ResolutionMiss::Unsupported(print_expr(other))),
        }
    }

    /// Follow declared types down to a literal or predeclared type.
    pub(crate) fn underlying(&self, ty: &Ty) -> Result<Ty, ResolutionMiss> {
        let mut current = ty.clone();
        for _ in 0..MAX_TYPE_CHAIN {
            let (identity, name) = match &current {
                Ty::Named { package: Some(identity), name } => (identity.clone(), name.clone()),
                _ => return Ok(current),
            };
            let pkg = self
                .packages
                .get(&identity)
                .ok_or_else(|| ResolutionMiss::ExternalPackage(identity.clone()))?;
            let declared = pkg
                .types
                .get(&name)
                .ok_or_else(|| ResolutionMiss::UnknownType(current.describe()))?;
            current = self.resolve_type(&identity, &declared.file, &declared.item)?;
        }
        Err(ResolutionMiss::Unsupported(format!("type chain too long at {}", ty.describe())))
    }

    /// Field or method `name` of `ty`, looking through one pointer and
    /// through embedded fields.
    pub(crate) fn lookup_member(&self, ty: &Ty, name: &str) -> Result<Member, ResolutionMiss> {
        self.lookup_member_at(ty, name, 0)
    }

    fn lookup_member_at(
        &self,
        ty: &Ty,
        name: &str,
        depth: usize,
    ) -> Result<Member, ResolutionMiss> {
        if depth > MAX_TYPE_CHAIN {
            let reason = format!("embedding too deep at {}", ty.describe());
            return Err(ResolutionMiss::Unsupported(reason));
        }
        let base = ty.deref();
        let missing =
            || ResolutionMiss::UnknownMember { ty: base.describe(), member: name.to_string() };

        match base {
            Ty::Named { package: None, name: type_name } => {
                if type_name == "error" && name == "Error" {
                    Ok(error_method())
                } else {
                    Err(missing())
                }
            }
            Ty::Named { package: Some(identity), name: type_name } => {
                let pkg = self
                    .packages
                    .get(identity)
                    .ok_or_else(|| ResolutionMiss::ExternalPackage(identity.clone()))?;
                if let Some(method) = pkg.methods.get(&(type_name.clone(), name.to_string())) {
                    return Ok(Member::Method {
                        target: CallTarget {
                            package: Some(identity.clone()),
                            receiver: Some(ReceiverInfo {
                                type_name: type_name.clone(),
                                is_interface: false,
                            }),
                            name: name.to_string(),
                            file: Some(method.file.clone()),
                        },
                        sig: Signature {
                            package: Some(identity.clone()),
                            file: Some(method.file.clone()),
                            ty: method.item.clone(),
                        },
                    });
                }
                let underlying = self.underlying(base)?;
                if let Ty::Named { .. } = underlying {
                    return self.lookup_member_at(&underlying, name, depth + 1);
                }
                self.literal_member(&underlying, Some(type_name), name, depth).ok_or_else(missing)
            }
            Ty::Literal { .. } => self.literal_member(base, None, name, depth).ok_or_else(missing),
            Ty::Pointer(_) => {
                Err(ResolutionMiss::Unsupported(format!("pointer to pointer {}", ty.describe())))
            }
        }
    }

    fn literal_member(
        &self,
        lit: &Ty,
        type_name: Option<&str>,
        name: &str,
        depth: usize,
    ) -> Option<Member> {
        let Ty::Literal { package, file, expr } = lit else {
            return None;
        };
        match expr {
            Expr::InterfaceType(elems) => {
                for elem in elems.iter().filter(|e| e.names.iter().any(|n| n == name)) {
                    let Expr::FuncType(sig) = &elem.ty else {
                        continue;
                    };
                    return Some(Member::Method {
                        target: CallTarget {
                            package: Some(package.clone()),
                            receiver: Some(ReceiverInfo {
                                type_name: type_name.unwrap_or_default().to_string(),
                                is_interface: true,
                            }),
                            name: name.to_string(),
                            file: Some(file.clone()),
                        },
                        sig: Signature {
                            package: Some(package.clone()),
                            file: Some(file.clone()),
                            ty: sig.clone(),
                        },
                    });
                }
                elems
                    .iter()
                    .filter(|e| e.names.is_empty())
                    .find_map(|e| self.embedded_member(package, file, &e.ty, name, depth))
            }
            Expr::StructType(fields) => {
                if let Some(field) = fields.iter().find(|f| f.names.iter().any(|n| n == name)) {
                    return self.resolve_type(package, file, &field.ty).ok().map(Member::Field);
                }
                let embedded: Vec<_> = fields.iter().filter(|f| f.names.is_empty()).collect();
                if let Some(field) = embedded.iter().find(|f| f.ty.base_type_name() == Some(name)) {
                    return self.resolve_type(package, file, &field.ty).ok().map(Member::Field);
                }
                embedded
                    .iter()
                    .find_map(|f| self.embedded_member(package, file, &f.ty, name, depth))
            }
            _ => None,
        }
    }

    fn embedded_member(
        &self,
        package: &str,
        file: &Path,
        ty: &Expr,
        name: &str,
        depth: usize,
    ) -> Option<Member> {
        let embedded = self.resolve_type(package, file, ty).ok()?;
        self.lookup_member_at(&embedded, name, depth + 1).ok()
    }

    /// A package-level function in a loaded package.
    pub(crate) fn func(&self, identity: &str, name: &str) -> Option<(CallTarget, Signature)> {
        let declared = self.packages.get(identity)?.funcs.get(name)?;
        Some((
            CallTarget {
                package: Some(identity.to_string()),
                receiver: None,
                name: name.to_string(),
                file: Some(declared.file.clone()),
            },
            Signature {
                package: Some(identity.to_string()),
                file: Some(declared.file.clone()),
                ty: declared.item.clone(),
            },
        ))
    }

    pub(crate) fn var(&self, identity: &str, name: &str) -> Option<&Declared<VarDecl>> {
        self.packages.get(identity)?.vars.get(name)
    }

    /// The `index`-th result type of a signature.
    pub(crate) fn result_type(&self, sig: &Signature, index: usize) -> Result<Ty, ResolutionMiss> {
        let expr = sig
            .ty
            .results
            .iter()
            .flat_map(|field| std::iter::repeat(&field.ty).take(field.names.len().max(1)))
            .nth(index)
            .ok_or_else(|| ResolutionMiss::Unsupported(format!("no result #{index}")))?;
        match (&sig.package, &sig.file) {
            (Some(package), Some(file)) => self.resolve_type(package, file, expr),
            _ => match expr.base_type_name() {
                Some(name) => Ok(Ty::named(None, name)),
                None => Err(ResolutionMiss::Unsupported(print_expr(expr))),
            },
        }
    }
}

/// `error.Error`, the one predeclared method.
fn error_method() -> Member {
    Member::Method {
        target: CallTarget {
            package: None,
            receiver: Some(ReceiverInfo { type_name: "error".to_string(), is_interface: true }),
            name: "Error".to_string(),
            file: None,
        },
        sig: Signature {
            package: None,
            file: None,
            ty: FuncType {
                params: Vec::new(),
                results: vec![crate::syntax::Field::anonymous(Expr::ident("string"))],
            },
        },
    }
}
