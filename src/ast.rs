//! Stylesheet syntax tree produced by the grammar reader
//!
//! The tree is read-only for the compiler: rework stages consume selectors
//! and declarations and produce replacements, they never edit nodes in place.

use crate::error::Location;

/// A whole parsed stylesheet, top-level rules in document order
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

/// Closed set of top-level constructs the visitor dispatches on
#[derive(Debug, Clone)]
pub enum Rule {
    Style(StyleRule),
    FontFace(AtRule),
    Keyframes(AtRule),
    Page(AtRule),
    Supports(AtRule),
    Viewport(AtRule),
    Media(MediaRule),
}

impl Rule {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Rule::Style(_) => "style",
            Rule::FontFace(_) => "font-face",
            Rule::Keyframes(_) => "keyframes",
            Rule::Page(_) => "page",
            Rule::Supports(_) => "supports",
            Rule::Viewport(_) => "viewport",
            Rule::Media(_) => "media",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub text: String,
    pub location: Location,
}

impl Selector {
    pub fn new(text: impl Into<String>, location: Location) -> Self {
        Self {
            text: text.into(),
            location,
        }
    }

    /// Same source position, different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: self.location.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
    pub location: Location,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>, location: Location) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
            location,
        }
    }

    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            property: self.property.clone(),
            value: value.into(),
            important: self.important,
            location: self.location.clone(),
        }
    }
}

/// An at-rule carried through verbatim (font-face, keyframes, page, ...)
#[derive(Debug, Clone)]
pub struct AtRule {
    pub name: String,
    pub prelude: String,
    pub block: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct MediaRule {
    pub queries: Vec<MediaQuery>,
    pub prelude: String,
    /// Raw block text, used when the rule is passed through verbatim
    pub block: String,
    pub rules: Vec<Rule>,
    pub location: Location,
}

#[derive(Debug, Clone, Default)]
pub struct MediaQuery {
    pub text: String,
    pub expressions: Vec<MediaExpression>,
}

/// `(feature)` or `(feature: value)`
#[derive(Debug, Clone)]
pub struct MediaExpression {
    pub feature: String,
    pub value: Option<String>,
    pub location: Location,
}
