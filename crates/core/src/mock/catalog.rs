use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::directive::MockDirective;
use super::interfaces::{extract_interfaces, InterfaceDeclaration};
use crate::loader::SourceSet;
use crate::semantic::CallTarget;

/// One configured mock: which interfaces, from where, written to where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockEntry {
    /// File whose leading comment carries the directive.
    pub directive_file: PathBuf,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// `-package=` value, else `mock_<source package>`.
    pub package: String,
    pub interfaces: Vec<InterfaceDeclaration>,
    /// The destination file exists already.
    pub generated: bool,
}

impl MockEntry {
    /// Whether this entry mocks the interface behind `target`.
    pub fn covers(&self, target: &CallTarget) -> bool {
        let Some(receiver) = &target.receiver else {
            return false;
        };
        target.file.as_deref() == Some(self.source.as_path())
            && self.interfaces.iter().any(|iface| iface.name == receiver.type_name)
    }
}

/// Every mock directive found in a source set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockCatalog {
    entries: Vec<MockEntry>,
}

impl MockCatalog {
    /// Collect directives that name a destination. Interfaces come from the
    /// directive's source file when it was loaded, otherwise from the file
    /// carrying the directive.
    pub fn build(sources: &SourceSet) -> Self {
        let mut entries = Vec::new();
        for unit in sources.iter() {
            let directive = MockDirective::extract(unit);
            if directive.generated {
                continue;
            }
            let Some(destination) = directive.destination_path(&unit.path) else {
                continue;
            };
            let source_unit = directive
                .source_path(&unit.path)
                .and_then(|path| sources.get(&path))
                .unwrap_or(unit);
            let package = directive
                .package
                .clone()
                .unwrap_or_else(|| format!("mock_{}", source_unit.package()));
            let entry = MockEntry {
                directive_file: unit.path.clone(),
                source: source_unit.path.clone(),
                generated: destination.is_file(),
                destination,
                package,
                interfaces: extract_interfaces(&source_unit.file.decls),
            };
            debug!(
                source = %entry.source.display(),
                destination = %entry.destination.display(),
                interfaces = entry.interfaces.len(),
                "registered mock directive"
            );
            entries.push(entry);
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[MockEntry] {
        &self.entries
    }

    /// Entries that mock the interface a call goes through.
    pub fn entries_for(&self, target: &CallTarget) -> Vec<&MockEntry> {
        self.entries.iter().filter(|entry| entry.covers(target)).collect()
    }

    pub fn entry_for_destination(&self, destination: &Path) -> Option<&MockEntry> {
        self.entries.iter().find(|entry| entry.destination == destination)
    }
}
