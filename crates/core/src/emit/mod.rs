//! Write generated test files, never touching an existing one.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::model::GeneratedTestUnit;
use crate::syntax::{parse_source, print_file, ParseError};

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Rendered test file for {path} is not valid Go: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What happened to one generated unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "path", rename_all = "snake_case")]
pub enum EmitOutcome {
    Written(PathBuf),
    SkippedExisting(PathBuf),
    /// The unit has no declarations. [`crate::synth::synthesize_unit`] never
    /// produces such a unit, so only callers building units by hand see this.
    NothingToWrite,
}

/// `user.go` -> `user_test.go`, in the same directory.
pub fn test_file_path(source: &Path) -> Option<PathBuf> {
    let stem = source.file_stem()?.to_str()?;
    let ext = source.extension()?.to_str()?;
    Some(source.with_file_name(format!("{stem}_test.{ext}")))
}

/// External test package name: `widgets` -> `widgets_test`.
pub fn test_package_name(package: &str) -> String {
    format!("{package}_test")
}

/// Renders generated units and writes each to its output path.
#[derive(Debug, Clone, Copy, Default)]
pub struct Emitter {
    dry_run: bool,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render and check, but write nothing.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Render `unit` to Go text and make sure it parses back.
    pub fn render(&self, unit: &GeneratedTestUnit) -> Result<String, EmitError> {
        let text = print_file(&unit.to_source_file());
        parse_source(&text)
            .map_err(|source| EmitError::Render { path: unit.output_path.clone(), source })?;
        Ok(text)
    }

    /// Write `unit` unless its output path already exists. An existing file is
    /// never opened for writing, and a failed write leaves no file behind.
    pub fn emit(&self, unit: &GeneratedTestUnit) -> Result<EmitOutcome, EmitError> {
        if unit.decls.is_empty() {
            return Ok(EmitOutcome::NothingToWrite);
        }
        let path = &unit.output_path;
        if path.exists() {
            info!(path = %path.display(), "test file exists, skipping");
            return Ok(EmitOutcome::SkippedExisting(path.clone()));
        }

        let text = self.render(unit)?;
        if self.dry_run {
            return Ok(EmitOutcome::Written(path.clone()));
        }

        let file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                info!(path = %path.display(), "test file exists, skipping");
                return Ok(EmitOutcome::SkippedExisting(path.clone()));
            }
            Err(source) => return Err(EmitError::Write { path: path.clone(), source }),
        };
        write_or_remove(file, path, &text)?;

        info!(path = %path.display(), tests = unit.decls.len(), "wrote test file");
        Ok(EmitOutcome::Written(path.clone()))
    }
}

/// Write `text` to the freshly created `path` through `out`, removing the
/// partial file on failure.
fn write_or_remove(mut out: impl Write, path: &Path, text: &str) -> Result<(), EmitError> {
    let result = out.write_all(text.as_bytes()).and_then(|()| out.flush());
    drop(out);
    result.map_err(|source| {
        if let Err(err) = fs::remove_file(path) {
            warn!(path = %path.display(), %err, "could not remove partial test file");
        }
        EmitError::Write { path: path.to_path_buf(), source }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SourceUnit;
    use crate::model::CaseEstimate;
    use crate::synth::synthesize_unit;
    use crate::syntax::parse_source;
    use std::fs::File;
    use tempfile::tempdir;

    /// Accepts `budget` bytes, then fails every write.
    struct ShortWriter {
        file: File,
        budget: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "device full"));
            }
            let n = self.file.write(&buf[..buf.len().min(self.budget)])?;
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.file.flush()
        }
    }

    fn account_unit(dir: &Path) -> GeneratedTestUnit {
        let text = "package account\n\nfunc Validate(name string) bool {\n\treturn true\n}\n";
        let file = parse_source(text).expect("parse");
        let source = SourceUnit { path: dir.join("account.go"), file };
        let estimate: CaseEstimate =
            vec![("account.Validate".to_string(), 1)].into_iter().collect();
        synthesize_unit(&source, &estimate).expect("unit")
    }

    #[test]
    fn output_path_inserts_test_suffix() {
        assert_eq!(
            test_file_path(Path::new("/a/b/user.go")),
            Some(PathBuf::from("/a/b/user_test.go"))
        );
        assert_eq!(test_file_path(Path::new("/a/b/Makefile")), None);
    }

    #[test]
    fn writes_new_file_and_skips_existing_one() {
        let dir = tempdir().expect("tempdir");
        let unit = account_unit(dir.path());

        let first = Emitter::new().emit(&unit).expect("emit");
        assert_eq!(first, EmitOutcome::Written(unit.output_path.clone()));
        let text = fs::read_to_string(&unit.output_path).expect("written file");
        assert!(text.starts_with("package account_test\n"));

        let second = Emitter::new().emit(&unit).expect("emit again");
        assert_eq!(second, EmitOutcome::SkippedExisting(unit.output_path.clone()));
    }

    /// A missing output directory surfaces as a write error and creates nothing.
    #[test]
    fn missing_output_dir_is_a_write_error() {
        let dir = tempdir().expect("tempdir");
        let unit = account_unit(&dir.path().join("gone"));

        let err = Emitter::new().emit(&unit).expect_err("parent does not exist");
        assert!(matches!(&err, EmitError::Write { path, .. } if path == &unit.output_path));
        assert!(!unit.output_path.exists());
    }

    /// A write that fails part way removes the truncated file, so the next run
    /// writes it instead of skipping it.
    #[test]
    fn failed_write_removes_partial_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("account_test.go");
        let file = File::create(&path).expect("create");

        let err = write_or_remove(ShortWriter { file, budget: 4 }, &path, "package account_test\n")
            .expect_err("short write");
        assert!(matches!(err, EmitError::Write { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn unit_without_declarations_writes_nothing() {
        let dir = tempdir().expect("tempdir");
        let unit = GeneratedTestUnit { decls: Vec::new(), ..account_unit(dir.path()) };

        assert_eq!(Emitter::new().emit(&unit).expect("emit"), EmitOutcome::NothingToWrite);
        assert!(!unit.output_path.exists());
    }

    #[test]
    fn package_gets_external_test_suffix() {
        assert_eq!(test_package_name("widgets"), "widgets_test");
    }
}
