//! Core types and constants for the stylesheet compiler

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// Media features the preprocessor rewrites conditional directives into
pub const CONDITIONAL_IF: &str = "stylec-if";
pub const CONDITIONAL_ELSEIF: &str = "stylec-elseif";
pub const CONDITIONAL_ELSE: &str = "stylec-else";

// Structural node descriptors
pub const DESCRIPTOR_CONDITIONAL: &str = "conditional";
pub const DESCRIPTOR_THEME: &str = "theme";

// Structural node attribute names
pub const ATTR_IS_TRUE: &str = "isTrue";
pub const ATTR_ELSE: &str = "else";
pub const ATTR_PROPERTY: &str = "property";
pub const ATTR_VALUE: &str = "value";
pub const ATTR_REFERENCES: &str = "references";
pub const ATTR_IMPORTANT: &str = "important";

/// Conditions are compiled into `$Browser.is<VALUE>` references
pub const CONDITION_EXPRESSION_PREFIX: &str = "$Browser.is";

/// Placeholder selectors use for the component's generated class
pub const THIS_PLACEHOLDER: &str = ".THIS";

pub const DEFAULT_RESOURCE_ROOT: &str = "/resources";

/// Output mode. `Prod` selects compact writer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Dev,
    Prod,
}

impl Mode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dev" => Some(Self::Dev),
            "prod" => Some(Self::Prod),
            _ => None,
        }
    }

    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Dev => write!(f, "dev"),
            Mode::Prod => write!(f, "prod"),
        }
    }
}

/// The namespace owning a unit, with the constants its stylesheets may reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    #[serde(default)]
    pub constants: BTreeMap<String, String>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constants: BTreeMap::new(),
        }
    }

    pub fn with_constant(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.constants.insert(name.into(), value.into());
        self
    }

    pub fn constant(&self, name: &str) -> Option<&str> {
        self.constants.get(name).map(String::as_str)
    }
}

/// One stylesheet source to compile. Immutable for the length of a compilation.
#[derive(Debug, Clone)]
pub struct StyleUnit {
    pub contents: String,
    pub filename: String,
    pub namespace: Namespace,
    pub component_class: String,
    pub validate_namespace: bool,
    allowed_conditions: BTreeSet<String>,
}

impl StyleUnit {
    pub fn new(
        contents: impl Into<String>,
        filename: impl Into<String>,
        namespace: Namespace,
        component_class: impl Into<String>,
    ) -> Self {
        Self {
            contents: contents.into(),
            filename: filename.into(),
            namespace,
            component_class: component_class.into(),
            validate_namespace: false,
            allowed_conditions: BTreeSet::new(),
        }
    }

    pub fn with_validate_namespace(mut self, validate: bool) -> Self {
        self.validate_namespace = validate;
        self
    }

    pub fn allow_condition(mut self, condition: impl AsRef<str>) -> Self {
        self.allowed_conditions
            .insert(condition.as_ref().to_uppercase());
        self
    }

    pub fn allow_conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for condition in conditions {
            self = self.allow_condition(condition);
        }
        self
    }

    /// Case-insensitive membership test
    pub fn is_condition_allowed(&self, condition: &str) -> bool {
        self.allowed_conditions.contains(&condition.to_uppercase())
    }

    /// Allowed set rendered as `[A, B]` for error messages
    pub fn allowed_conditions_display(&self) -> String {
        let names: Vec<&str> = self.allowed_conditions.iter().map(String::as_str).collect();
        format!("[{}]", names.join(", "))
    }
}

/// Camel-cased class for a component: `ui` + `button` -> `uiButton`
pub fn component_class_name(namespace: &str, component: &str) -> String {
    let mut class = namespace.to_string();
    let mut upper_next = true;
    for ch in component.chars() {
        if ch == '-' || ch == '_' || ch == '.' {
            upper_next = true;
            continue;
        }
        if upper_next {
            class.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            class.push(ch);
        }
    }
    class
}
