//! Mock-directive analysis.
//!
//! - `directive`: parse `-source=` / `-destination=` comments and generated
//!   mock headers.
//! - `interfaces`: list the interfaces a file declares.
//! - `analyzer`: detect calls through interface-typed receivers.
//! - `catalog`: tie directives, interfaces and mock destinations together.

pub mod analyzer;
pub mod catalog;
pub mod directive;
pub mod interfaces;

pub use analyzer::{is_mock_package_imported, DependencyAnalyzer, DependencyCallSite};
pub use catalog::{MockCatalog, MockEntry};
pub use directive::MockDirective;
pub use interfaces::{extract_interfaces, InterfaceDeclaration, InterfaceMethod};
