//! Core data model shared by the analysis and synthesis stages.
//!
//! - `FunctionSignature`: identity of a function or method, keyed as
//!   `package.[Receiver.]Name`.
//! - `CaseEstimate`: required test-case count per function key.
//! - `GeneratedTestUnit`: the synthesised declarations for one source file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::syntax::{Decl, FuncDecl, ImportSpec, SourceFile};

/// Identity of a top-level function or method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub package: String,
    /// Receiver base type name for methods (`Service` for `(s *Service)`).
    pub receiver: Option<String>,
    pub name: String,
}

impl FunctionSignature {
    pub fn new(
        package: impl Into<String>,
        receiver: Option<String>,
        name: impl Into<String>,
    ) -> Self {
        Self { package: package.into(), receiver, name: name.into() }
    }

    pub fn from_decl(package: &str, decl: &FuncDecl) -> Self {
        Self::new(package, decl.receiver_type_name().map(str::to_string), decl.name.clone())
    }

    /// `package.Name` for functions, `package.Receiver.Name` for methods.
    pub fn key(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("{}.{}.{}", self.package, recv, self.name),
            None => format!("{}.{}", self.package, self.name),
        }
    }

    /// Go visibility: the name starts with an upper-case letter.
    pub fn is_exported(&self) -> bool {
        is_exported_name(&self.name)
    }

    /// `TestReceiver_Name` for methods, `TestName` for functions.
    pub fn test_function_name(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("Test{recv}_{}", self.name),
            None => format!("Test{}", self.name),
        }
    }
}

/// Whether a Go identifier is exported.
pub fn is_exported_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Required test-case count per function key.
///
/// Counts are non-negative by construction; zero means "no test".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseEstimate {
    counts: BTreeMap<String, usize>,
}

impl CaseEstimate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a count, keeping the first value seen for a key.
    pub fn insert(&mut self, key: impl Into<String>, count: usize) {
        self.counts.entry(key.into()).or_insert(count);
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.counts.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(String, usize)> for CaseEstimate {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        let mut estimate = CaseEstimate::new();
        for (key, count) in iter {
            estimate.insert(key, count);
        }
        estimate
    }
}

/// Synthesised test declarations for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTestUnit {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    /// Always `<package>_test`.
    pub package: String,
    pub decls: Vec<Decl>,
    /// Keys of the functions that received a test, in declaration order.
    pub functions: Vec<String>,
}

impl GeneratedTestUnit {
    /// The full file tree: package clause, the two imports, then the tests.
    pub fn to_source_file(&self) -> SourceFile {
        let mut file = SourceFile::new(self.package.clone());
        file.decls.push(Decl::Import(vec![ImportSpec::new("fmt"), ImportSpec::new("testing")]));
        file.decls.extend(self.decls.iter().cloned());
        file
    }
}
