//! Condition expressions attached to conditional nodes

use crate::error::Location;
use serde::Serialize;
use std::fmt;

/// A property reference such as `$Browser.isIE7`, evaluated at render time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expression {
    pub root: String,
    pub path: Vec<String>,
    pub location: Location,
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.root)?;
        for segment in &self.path {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

/// Builds expression objects from raw expression text
pub trait ExpressionBuilder {
    fn build(&self, text: &str, location: &Location) -> Result<Expression, String>;
}

/// Accepts `$Root.segment[.segment...]` property references
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyReferenceBuilder;

impl ExpressionBuilder for PropertyReferenceBuilder {
    fn build(&self, text: &str, location: &Location) -> Result<Expression, String> {
        let body = text
            .trim()
            .strip_prefix('$')
            .ok_or_else(|| format!("Expression '{}' must start with '$'", text))?;

        let mut segments = body.split('.');
        let root = segments.next().unwrap_or_default();
        let path: Vec<String> = segments.map(str::to_string).collect();

        if path.is_empty() {
            return Err(format!("Expression '{}' has no property path", text));
        }
        for segment in std::iter::once(root).chain(path.iter().map(String::as_str)) {
            if !is_identifier(segment) {
                return Err(format!("Invalid segment '{}' in expression '{}'", segment, text));
            }
        }

        Ok(Expression {
            root: root.to_string(),
            path,
            location: location.clone(),
        })
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
