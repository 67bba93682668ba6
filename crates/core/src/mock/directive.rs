use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::loader::SourceUnit;

const SOURCE_FLAG: &str = "-source=";
const DESTINATION_FLAG: &str = "-destination=";
const PACKAGE_FLAG: &str = "-package=";
const GENERATED_SOURCE_PREFIX: &str = "Source: ";

/// Mock-generation settings read from a file's first comment block.
///
/// Both the `mockgen` invocation form (`-source=a.go -destination=mock/a.go`)
/// and the header of an already generated mock (`Source: a.go`) are
/// understood. An empty directive means the file configures no mocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockDirective {
    pub raw: String,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub package: Option<String>,
    /// The comment is the header of a generated mock rather than a directive.
    pub generated: bool,
}

impl MockDirective {
    pub fn parse(text: &str) -> Self {
        let mut directive = Self { raw: text.to_string(), ..Self::default() };
        for token in text.split_whitespace() {
            if directive.source.is_none() {
                directive.source = flag_value(token, SOURCE_FLAG);
            }
            if directive.destination.is_none() {
                directive.destination = flag_value(token, DESTINATION_FLAG);
            }
            if directive.package.is_none() {
                directive.package = flag_value(token, PACKAGE_FLAG);
            }
        }

        if directive.source.is_none() {
            let generated_from = text
                .lines()
                .find_map(|line| line.trim_start().strip_prefix(GENERATED_SOURCE_PREFIX))
                .map(|rest| rest.trim().to_string())
                .filter(|rest| !rest.is_empty());
            if generated_from.is_some() {
                directive.source = generated_from;
                directive.generated = true;
            }
        }
        directive
    }

    /// Directive of a loaded file; empty when it has no leading comment.
    pub fn extract(unit: &SourceUnit) -> Self {
        unit.leading_comment_text().map(|text| Self::parse(&text)).unwrap_or_default()
    }

    pub fn has_mock_comment(&self) -> bool {
        !self.raw.trim().is_empty()
    }

    /// `-source=` resolved against the directory of the file carrying the
    /// directive. `$GOFILE` names that file itself.
    pub fn source_path(&self, directive_file: &Path) -> Option<PathBuf> {
        let source = self.source.as_deref()?;
        if source == "$GOFILE" {
            return Some(directive_file.to_path_buf());
        }
        Some(resolve_relative(directive_file, source))
    }

    pub fn destination_path(&self, directive_file: &Path) -> Option<PathBuf> {
        self.destination.as_deref().map(|dest| resolve_relative(directive_file, dest))
    }
}

fn flag_value(token: &str, flag: &str) -> Option<String> {
    token
        .strip_prefix(flag)
        .map(|value| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Join `rel` onto the directory of `file` and drop `.` / `..` components
/// lexically.
fn resolve_relative(file: &Path, rel: &str) -> PathBuf {
    let rel = Path::new(rel);
    if rel.is_absolute() {
        return rel.to_path_buf();
    }
    let base = file.parent().unwrap_or_else(|| Path::new(""));
    let mut out = PathBuf::new();
    for component in base.join(rel).components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_flag_occurrence_wins() {
        let directive = MockDirective::parse(
            "go:generate mockgen -source=a.go -source=b.go -destination=mock/a.go\n",
        );
        assert_eq!(directive.source.as_deref(), Some("a.go"));
        assert_eq!(directive.destination.as_deref(), Some("mock/a.go"));
        assert!(!directive.generated);
    }

    #[test]
    fn generated_header_yields_source() {
        let directive = MockDirective::parse(
            "Code generated by MockGen. DO NOT EDIT.\nSource: user.go\n\nGenerated by this command:\n",
        );
        assert_eq!(directive.source.as_deref(), Some("user.go"));
        assert_eq!(directive.destination, None);
        assert!(directive.generated);
    }

    #[test]
    fn paths_resolve_against_directive_dir() {
        let directive =
            MockDirective::parse("mockgen -source=$GOFILE -destination=../mock/user.go");
        let file = Path::new("/src/app/usecase/user.go");
        assert_eq!(directive.source_path(file), Some(PathBuf::from("/src/app/usecase/user.go")));
        assert_eq!(directive.destination_path(file), Some(PathBuf::from("/src/app/mock/user.go")));
    }

    #[test]
    fn empty_comment_is_an_empty_directive() {
        let directive = MockDirective::parse("   \n");
        assert!(!directive.has_mock_comment());
        assert_eq!(directive.source, None);
    }
}
