//! Error types for the stylesheet compiler

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Position of a construct in the (preprocessed) source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A recoverable problem found while reading or reworking a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub message: String,
    pub location: Option<Location>,
}

impl Issue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    pub fn at(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location: Some(location),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(l) = &self.location {
            write!(f, " (line {}, col {})", l.line, l.column)?;
        }
        Ok(())
    }
}

fn format_issues(issues: &[Issue]) -> String {
    let mut out = String::new();
    for issue in issues {
        out.push('\t');
        out.push_str(&issue.to_string());
        out.push('\n');
    }
    out
}

#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Unknown condition: [{value}] at {location}. The allowed conditions are: {allowed}")]
    UnknownCondition {
        value: String,
        allowed: String,
        location: Location,
    },

    #[error("Expression error at {location}: {message}")]
    Expression { location: Location, message: String },

    #[error("Node build error: {message}")]
    NodeBuild { message: String },

    #[error("Conditional structure error: {message}")]
    Structure { message: String },

    #[error("Issue(s) found by parser ({filename}):\n{}", format_issues(.issues))]
    Issues { filename: String, issues: Vec<Issue> },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("{failed} of {total} file(s) failed the check")]
    CheckFailed { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, CompilerError>;

impl CompilerError {
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure {
            message: message.into(),
        }
    }

    pub fn node_build(message: impl Into<String>) -> Self {
        Self::NodeBuild {
            message: message.into(),
        }
    }

    /// Recoverable issues carried by an aggregated failure; empty for fatal errors
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Issues { issues, .. } => issues,
            _ => &[],
        }
    }
}
