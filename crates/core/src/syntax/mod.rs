//! Go syntax: owned tree, tree-sitter lowering, and source rendering.
//!
//! - `ast`: tagged-variant node types shared by parsed and synthesised code.
//! - `parser`: parses Go text with tree-sitter-go and lowers the concrete
//!   tree into `ast` values.
//! - `printer`: renders `ast` values back to gofmt-style Go text.

pub mod ast;
pub mod parser;
pub mod printer;

pub use ast::*;
pub use parser::{parse_source, ParseError};
pub use printer::{print_expr, print_file};
