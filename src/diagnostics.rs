//! Collection of recoverable issues raised while compiling one unit

use crate::error::{CompilerError, Issue, Location, Result};

/// Ordered record of every recoverable issue raised while reading and
/// reworking a unit. Issues are never dropped; they surface together
/// through [`Diagnostics::raise_if_any`] once the visit has finished.
#[derive(Debug, Default)]
pub struct Diagnostics {
    issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, issue: Issue) {
        log::warn!("{}", issue);
        self.issues.push(issue);
    }

    pub fn record_at(&mut self, message: impl Into<String>, location: Location) {
        self.record(Issue::at(message, location));
    }

    pub fn has_errors(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Turns the recorded issues into one aggregated error naming `filename`
    pub fn raise_if_any(self, filename: &str) -> Result<()> {
        if self.issues.is_empty() {
            return Ok(());
        }
        Err(CompilerError::Issues {
            filename: filename.to_string(),
            issues: self.issues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_diagnostics_pass() {
        let diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_errors());
        assert!(diagnostics.raise_if_any("a.css").is_ok());
    }

    #[test]
    fn test_issues_kept_in_arrival_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.record(Issue::new("one"));
        diagnostics.record_at("two", Location::new("a.css", 4, 1));
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.len(), 2);

        match diagnostics.raise_if_any("a.css") {
            Err(CompilerError::Issues { filename, issues }) => {
                assert_eq!(filename, "a.css");
                assert_eq!(issues[0].message, "one");
                assert_eq!(issues[1].message, "two");
                assert_eq!(issues[1].location.as_ref().map(|l| l.line), Some(4));
            }
            other => panic!("Expected aggregated issues, got {:?}", other),
        }
    }
}
