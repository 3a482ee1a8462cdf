//! Per-record diagnostics collected during a run.
//!
//! A [`Diagnostic`] describes a problem with one file or one database entry.
//! Operations push diagnostics and keep going; the caller decides the exit
//! status once the whole batch has been examined.

use std::fmt;
use std::path::Path;

/// A problem found in a single file or entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What the problem concerns: a file path or an `[index]` label.
    pub subject: String,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Builds a diagnostic whose subject is a file path.
    pub fn for_path(path: &Path, message: impl Into<String>) -> Self {
        Self::new(path.display().to_string(), message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Appends `diag` unless an identical one is already present.
/// Returns whether it was added.
pub(crate) fn push_unique(list: &mut Vec<Diagnostic>, diag: Diagnostic) -> bool {
    if list.contains(&diag) {
        return false;
    }
    list.push(diag);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_subject_and_message() {
        let d = Diagnostic::new("[3]", "Entry must be an object.");
        assert_eq!(d.to_string(), "[3]: Entry must be an object.");
    }

    #[test]
    fn for_path_uses_display_form() {
        let d = Diagnostic::for_path(Path::new("src/mu/a.json"), "bad");
        assert_eq!(d.subject, "src/mu/a.json");
    }

    #[test]
    fn push_unique_skips_duplicates() {
        let mut list = Vec::new();
        assert!(push_unique(&mut list, Diagnostic::new("a", "x")));
        assert!(!push_unique(&mut list, Diagnostic::new("a", "x")));
        assert!(push_unique(&mut list, Diagnostic::new("a", "y")));
        assert_eq!(list.len(), 2);
    }
}
