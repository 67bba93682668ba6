use serde::{Deserialize, Serialize};

use crate::syntax::{print_expr, Decl, Expr, FuncType};

/// A method of an interface, with its signature rendered as Go text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceMethod {
    pub name: String,
    pub signature: String,
}

/// A named interface type declared at the top level of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDeclaration {
    pub name: String,
    pub methods: Vec<InterfaceMethod>,
    /// Embedded interfaces and type-set terms, as written.
    pub embedded: Vec<String>,
}

impl InterfaceDeclaration {
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }
}

/// Interfaces among `decls`, in declaration order.
pub fn extract_interfaces(decls: &[Decl]) -> Vec<InterfaceDeclaration> {
    decls
        .iter()
        .filter_map(|decl| match decl {
            Decl::Type(specs) => Some(specs),
            _ => None,
        })
        .flatten()
        .filter_map(|spec| {
            let Expr::InterfaceType(elems) = &spec.ty else {
                return None;
            };
            let mut methods = Vec::new();
            let mut embedded = Vec::new();
            for elem in elems {
                match (&elem.ty, elem.names.as_slice()) {
                    (Expr::FuncType(sig), names) if !names.is_empty() => {
                        methods.extend(names.iter().map(|name| InterfaceMethod {
                            name: name.clone(),
                            signature: render_signature(sig),
                        }));
                    }
                    (ty, _) => embedded.push(print_expr(ty)),
                }
            }
            Some(InterfaceDeclaration { name: spec.name.clone(), methods, embedded })
        })
        .collect()
}

/// `(ctx context.Context) error` for a method's signature.
fn render_signature(sig: &FuncType) -> String {
    let rendered = print_expr(&Expr::FuncType(sig.clone()));
    rendered.strip_prefix("func").unwrap_or(&rendered).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;

    #[test]
    fn only_interface_types_are_extracted() {
        let file = parse_source(
            "package repo\n\ntype User interface {\n\tio.Closer\n\tSave(ctx context.Context, id int) error\n}\n\ntype row struct {\n\tid int\n}\n",
        )
        .expect("parse");
        let found = extract_interfaces(&file.decls);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "User");
        assert!(found[0].has_method("Save"));
        assert_eq!(found[0].methods[0].signature, "(ctx context.Context, id int) error");
        assert_eq!(found[0].embedded, vec!["io.Closer".to_string()]);
    }
}
