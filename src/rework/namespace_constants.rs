use super::{Rework, ReworkResult};
use crate::ast::Declaration;
use crate::types::Namespace;
use regex::Regex;

/// Substitutes upper-case namespace constants (`PRIMARY_COLOR`) with their values
pub struct NamespaceConstantsRework {
    namespace: Namespace,
    constant_regex: Regex,
}

impl NamespaceConstantsRework {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            constant_regex: Regex::new(r"\b[A-Z][A-Z0-9_]*\b").expect("valid constant pattern"),
        }
    }

    fn substitute(&self, value: &str) -> Option<String> {
        let mut out = String::with_capacity(value.len());
        let mut last = 0;
        let mut changed = false;

        for m in self.constant_regex.find_iter(value) {
            // hex colours, class names and vendor keywords are not constants
            let preceded_by = value[..m.start()].chars().next_back();
            if matches!(preceded_by, Some('#') | Some('.') | Some('-')) {
                continue;
            }
            if let Some(replacement) = self.namespace.constant(m.as_str()) {
                out.push_str(&value[last..m.start()]);
                out.push_str(replacement);
                last = m.end();
                changed = true;
            }
        }

        if !changed {
            return None;
        }
        out.push_str(&value[last..]);
        Some(out)
    }
}

impl Rework<Declaration> for NamespaceConstantsRework {
    fn name(&self) -> &'static str {
        "namespace-constants"
    }

    fn perform(&self, declaration: &Declaration) -> ReworkResult<Declaration> {
        match self.substitute(&declaration.value) {
            Some(value) => ReworkResult::keep(declaration.with_value(value)),
            None => ReworkResult::keep(declaration.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;

    fn rework() -> NamespaceConstantsRework {
        NamespaceConstantsRework::new(
            Namespace::new("ui")
                .with_constant("PRIMARY", "#336699")
                .with_constant("GUTTER", "12px")
                .with_constant("FFF", "nope"),
        )
    }

    fn value_of(rework: &NamespaceConstantsRework, value: &str) -> String {
        let decl = Declaration::new("border", value, Location::new("t.css", 1, 1));
        let result = rework.perform(&decl);
        assert!(result.issues.is_empty());
        result.items[0].value.clone()
    }

    #[test]
    fn test_constants_substituted() {
        let rework = rework();
        assert_eq!(value_of(&rework, "1px solid PRIMARY"), "1px solid #336699");
        assert_eq!(value_of(&rework, "GUTTER GUTTER 0"), "12px 12px 0");
    }

    #[test]
    fn test_unknown_and_partial_names_untouched() {
        let rework = rework();
        assert_eq!(value_of(&rework, "SECONDARY"), "SECONDARY");
        assert_eq!(value_of(&rework, "PRIMARY_DARK"), "PRIMARY_DARK");
        assert_eq!(value_of(&rework, "#FFF"), "#FFF");
        assert_eq!(value_of(&rework, "red"), "red");
    }
}
