use super::{DynamicOutcome, DynamicRework};
use crate::ast::Declaration;
use crate::error::Issue;
use crate::lexer::{in_string, string_spans};
use crate::node::NodeBuilder;
use crate::types::{ATTR_IMPORTANT, ATTR_PROPERTY, ATTR_REFERENCES, ATTR_VALUE, DESCRIPTOR_THEME};
use regex::Regex;

/// Replaces declarations calling `theme(ns.theme.var)` with a `theme` node.
/// Theme values are resolved when the unit is rendered, not at compile time.
pub struct ThemeFunctionRework {
    call_regex: Regex,
    reference_regex: Regex,
}

impl ThemeFunctionRework {
    pub fn new() -> Self {
        Self {
            call_regex: Regex::new(r"\btheme\(([^)]*)\)").expect("valid theme() pattern"),
            reference_regex: Regex::new(r"^[A-Za-z_][\w-]*(\.[A-Za-z_][\w-]*)+$")
                .expect("valid theme reference pattern"),
        }
    }
}

impl Default for ThemeFunctionRework {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicRework<Declaration> for ThemeFunctionRework {
    fn name(&self) -> &'static str {
        "theme-function"
    }

    fn perform(&self, declaration: &Declaration) -> DynamicOutcome {
        let mut references = Vec::new();
        let strings = string_spans(&declaration.value);

        for caps in self.call_regex.captures_iter(&declaration.value) {
            if caps.get(0).map_or(false, |m| in_string(&strings, m.start())) {
                continue;
            }
            let reference = caps[1].trim().trim_matches(|c: char| c == '"' || c == '\'');
            if !self.reference_regex.is_match(reference) {
                return DynamicOutcome::Invalid(Issue::at(
                    format!(
                        "Invalid theme reference '{}' in '{}', expected namespace.theme.variable",
                        reference, declaration.property
                    ),
                    declaration.location.clone(),
                ));
            }
            references.push(reference.to_string());
        }

        if references.is_empty() {
            return DynamicOutcome::NoMatch;
        }

        let mut builder = NodeBuilder::new();
        builder
            .set_descriptor(DESCRIPTOR_THEME)
            .set_attribute(ATTR_PROPERTY, declaration.property.as_str())
            .set_attribute(ATTR_VALUE, declaration.value.as_str())
            .set_attribute(ATTR_REFERENCES, references)
            .set_attribute(ATTR_IMPORTANT, declaration.important);

        match builder.build() {
            Ok(node) => DynamicOutcome::Matched(node),
            Err(e) => DynamicOutcome::Invalid(Issue::at(e.to_string(), declaration.location.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;
    use crate::node::AttributeValue;

    fn declaration(value: &str) -> Declaration {
        Declaration::new("border", value, Location::new("t.css", 2, 4))
    }

    #[test]
    fn test_theme_call_matched() {
        let outcome = ThemeFunctionRework::new()
            .perform(&declaration("1px solid theme(ui.colors.border)"));

        let DynamicOutcome::Matched(node) = outcome else {
            panic!("Expected a theme node, got {:?}", outcome);
        };
        assert_eq!(node.descriptor, DESCRIPTOR_THEME);
        assert_eq!(node.attribute(ATTR_PROPERTY), Some(&AttributeValue::from("border")));
        assert_eq!(
            node.attribute(ATTR_VALUE),
            Some(&AttributeValue::from("1px solid theme(ui.colors.border)"))
        );
        assert_eq!(
            node.attribute(ATTR_REFERENCES),
            Some(&AttributeValue::List(vec!["ui.colors.border".to_string()]))
        );
        assert_eq!(node.attribute(ATTR_IMPORTANT), Some(&AttributeValue::Bool(false)));
    }

    #[test]
    fn test_multiple_and_quoted_references() {
        let outcome = ThemeFunctionRework::new()
            .perform(&declaration("theme('ui.spacing.small') theme(ui.spacing.large)"));
        let DynamicOutcome::Matched(node) = outcome else {
            panic!("Expected a theme node");
        };
        assert_eq!(
            node.attribute(ATTR_REFERENCES),
            Some(&AttributeValue::List(vec![
                "ui.spacing.small".to_string(),
                "ui.spacing.large".to_string()
            ]))
        );
    }

    #[test]
    fn test_plain_value_not_matched() {
        let outcome = ThemeFunctionRework::new().perform(&declaration("1px solid red"));
        assert_eq!(outcome, DynamicOutcome::NoMatch);

        let outcome = ThemeFunctionRework::new().perform(&declaration("mytheme(a.b)"));
        assert_eq!(outcome, DynamicOutcome::NoMatch);
    }

    #[test]
    fn test_theme_text_inside_string_ignored() {
        let rework = ThemeFunctionRework::new();
        let outcome = rework.perform(&declaration("\"see theme(border)\""));
        assert_eq!(outcome, DynamicOutcome::NoMatch);

        let outcome = rework.perform(&declaration("'theme(x)' theme(ui.c.x)"));
        let DynamicOutcome::Matched(node) = outcome else {
            panic!("Expected a theme node, got {:?}", outcome);
        };
        assert_eq!(
            node.attribute(ATTR_REFERENCES),
            Some(&AttributeValue::List(vec!["ui.c.x".to_string()]))
        );
    }

    #[test]
    fn test_malformed_reference() {
        let outcome = ThemeFunctionRework::new().perform(&declaration("theme(border)"));
        match outcome {
            DynamicOutcome::Invalid(issue) => {
                assert!(issue.message.contains("Invalid theme reference 'border'"));
                assert_eq!(issue.location.map(|l| l.line), Some(2));
            }
            other => panic!("Expected invalid outcome, got {:?}", other),
        }
    }
}
