use super::{Rework, ReworkResult};
use crate::ast::Selector;
use crate::error::Issue;
use crate::types::THIS_PLACEHOLDER;

/// Scopes selectors under the component's generated class.
///
/// `.THIS` is replaced with `.<class>`. Selectors that already name the class
/// are left alone, so running the stage twice changes nothing.
pub struct ClassNameRework {
    scoped_class: String,
    validate_namespace: bool,
}

impl ClassNameRework {
    pub fn new(component_class: &str, validate_namespace: bool) -> Self {
        Self {
            scoped_class: format!(".{}", component_class),
            validate_namespace,
        }
    }
}

impl Rework<Selector> for ClassNameRework {
    fn name(&self) -> &'static str {
        "class-name"
    }

    fn perform(&self, selector: &Selector) -> ReworkResult<Selector> {
        let text = selector.text.trim();

        if text.is_empty() {
            return ReworkResult::reject(Issue::at("Empty selector", selector.location.clone()));
        }

        if contains_class(text, THIS_PLACEHOLDER) {
            let replaced = replace_class(text, THIS_PLACEHOLDER, &self.scoped_class);
            return ReworkResult::keep(selector.with_text(replaced));
        }

        if contains_class(text, &self.scoped_class) {
            return ReworkResult::keep(selector.with_text(text));
        }

        if self.validate_namespace {
            return ReworkResult::reject(Issue::at(
                format!(
                    "CSS selector must include '{}' or '{}': {}",
                    self.scoped_class, THIS_PLACEHOLDER, text
                ),
                selector.location.clone(),
            ));
        }

        ReworkResult::keep(selector.with_text(format!("{} {}", self.scoped_class, text)))
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

/// Byte offsets where `class` occurs as a whole class token
fn class_positions<'a>(text: &'a str, class: &'a str) -> impl Iterator<Item = usize> + 'a {
    text.match_indices(class).filter_map(move |(idx, _)| {
        let end = idx + class.len();
        match text[end..].chars().next() {
            Some(next) if is_ident_char(next) => None,
            _ => Some(idx),
        }
    })
}

fn contains_class(text: &str, class: &str) -> bool {
    class_positions(text, class).next().is_some()
}

fn replace_class(text: &str, class: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() + replacement.len());
    let mut last = 0;
    for idx in class_positions(text, class) {
        out.push_str(&text[last..idx]);
        out.push_str(replacement);
        last = idx + class.len();
    }
    out.push_str(&text[last..]);
    out
}
