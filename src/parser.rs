//! Tolerant stylesheet reader
//!
//! The compiler consumes the grammar reader only through [`StylesheetParser`].
//! [`CssReader`] is the default implementation: it recovers from malformed
//! input by recording an issue and resuming at the next rule boundary, so a
//! single bad construct never hides problems further down the file.

use crate::ast::*;
use crate::diagnostics::Diagnostics;
use crate::error::{Issue, Location};
use crate::lexer::{leading_whitespace, locate, split_top_level, Cursor};

pub trait StylesheetParser {
    /// Parse `text`, routing recoverable problems into `diagnostics`.
    /// Returns `None` only when nothing at all could be salvaged.
    fn parse(&self, text: &str, filename: &str, diagnostics: &mut Diagnostics) -> Option<Stylesheet>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CssReader;

impl CssReader {
    pub fn new() -> Self {
        Self
    }
}

impl StylesheetParser for CssReader {
    fn parse(&self, text: &str, filename: &str, diagnostics: &mut Diagnostics) -> Option<Stylesheet> {
        let mut cursor = Cursor::new(text, filename.to_string());
        let rules = Reader { diagnostics }.parse_rules(&mut cursor);
        log::trace!("Read {} top-level rules from {}", rules.len(), filename);
        Some(Stylesheet { rules })
    }
}

struct Reader<'d> {
    diagnostics: &'d mut Diagnostics,
}

impl Reader<'_> {
    fn parse_rules(&mut self, cursor: &mut Cursor) -> Vec<Rule> {
        let mut rules = Vec::new();

        loop {
            cursor.skip_whitespace_and_comments();
            self.drain(cursor);

            let Some(ch) = cursor.peek() else {
                break;
            };

            match ch {
                '}' => {
                    self.diagnostics.record_at("Unexpected '}'", cursor.location());
                    cursor.advance();
                }
                ';' => {
                    self.diagnostics.record_at("Unexpected ';'", cursor.location());
                    cursor.advance();
                }
                '@' => {
                    if let Some(rule) = self.parse_at_rule(cursor) {
                        rules.push(rule);
                    }
                }
                _ => {
                    if let Some(rule) = self.parse_style_rule(cursor) {
                        rules.push(Rule::Style(rule));
                    }
                }
            }
            self.drain(cursor);
        }

        rules
    }

    fn drain(&mut self, cursor: &mut Cursor) {
        for issue in cursor.take_issues() {
            self.diagnostics.record(issue);
        }
    }

    fn parse_style_rule(&mut self, cursor: &mut Cursor) -> Option<StyleRule> {
        let location = cursor.location();
        let prelude = cursor.read_until_any(&['{', '}', ';']);

        match cursor.peek() {
            Some('{') => {
                cursor.advance();
            }
            Some(_) => {
                self.diagnostics.record_at(
                    format!("Expected '{{' after selector '{}'", prelude.trim()),
                    location,
                );
                return None;
            }
            None => {
                self.diagnostics.record_at(
                    format!("Unexpected end of input after selector '{}'", prelude.trim()),
                    location,
                );
                return None;
            }
        }

        let block_location = cursor.location();
        let (block, terminated) = cursor.read_block();
        if !terminated {
            self.diagnostics
                .record_at("Unterminated declaration block, expected '}'", location.clone());
        }

        let selectors = split_top_level(&prelude, ',')
            .into_iter()
            .map(|(offset, piece)| {
                let start = offset + leading_whitespace(piece);
                Selector::new(piece.trim(), locate(&location, &prelude, start))
            })
            .collect();

        let declarations = self.parse_declarations(&block, &block_location);

        Some(StyleRule {
            selectors,
            declarations,
            location,
        })
    }

    fn parse_declarations(&mut self, block: &str, origin: &Location) -> Vec<Declaration> {
        let mut declarations = Vec::new();

        for (offset, piece) in split_top_level(block, ';') {
            let text = piece.trim();
            if text.is_empty() {
                continue;
            }
            let location = locate(origin, block, offset + leading_whitespace(piece));

            let Some((property, value)) = text.split_once(':') else {
                self.diagnostics
                    .record(Issue::at(format!("Expected ':' in declaration '{}'", text), location));
                continue;
            };

            let property = property.trim();
            if !is_valid_property(property) {
                self.diagnostics
                    .record(Issue::at(format!("Invalid property name '{}'", property), location));
                continue;
            }

            let (value, important) = strip_important(value.trim());
            if value.is_empty() {
                self.diagnostics.record(Issue::at(
                    format!("Missing value for property '{}'", property),
                    location,
                ));
                continue;
            }

            let mut declaration = Declaration::new(property, value, location);
            declaration.important = important;
            declarations.push(declaration);
        }

        declarations
    }

    fn parse_at_rule(&mut self, cursor: &mut Cursor) -> Option<Rule> {
        let location = cursor.location();
        cursor.advance(); // '@'
        let name = cursor.read_identifier();
        let prelude_location = cursor.location();
        let raw_prelude = cursor.read_until_any(&['{', ';', '}']);

        match cursor.peek() {
            Some('{') => {
                cursor.advance();
            }
            Some(';') => {
                cursor.advance();
                self.diagnostics
                    .record_at(format!("Unsupported at-rule '@{}'", name), location);
                return None;
            }
            _ => {
                self.diagnostics
                    .record_at(format!("Expected '{{' after '@{}'", name), location);
                return None;
            }
        }

        let block_location = cursor.location();
        let (block, terminated) = cursor.read_block();
        if !terminated {
            self.diagnostics.record_at(
                format!("Unterminated block for '@{}', expected '}}'", name),
                location.clone(),
            );
        }

        let prelude = raw_prelude.trim().to_string();
        let kind = unprefixed(&name).to_ascii_lowercase();

        if kind == "media" {
            let queries = parse_media_queries(&raw_prelude, &prelude_location);
            let mut inner = Cursor::at(&block, block_location);
            let rules = self.parse_rules(&mut inner);
            return Some(Rule::Media(MediaRule {
                queries,
                prelude,
                block,
                rules,
                location,
            }));
        }

        let wrap: fn(AtRule) -> Rule = match kind.as_str() {
            "font-face" => Rule::FontFace,
            "keyframes" => Rule::Keyframes,
            "page" => Rule::Page,
            "supports" => Rule::Supports,
            "viewport" => Rule::Viewport,
            _ => {
                self.diagnostics
                    .record_at(format!("Unsupported at-rule '@{}'", name), location);
                return None;
            }
        };

        Some(wrap(AtRule {
            name,
            prelude,
            block,
            location,
        }))
    }
}

/// `-webkit-keyframes` -> `keyframes`
fn unprefixed(name: &str) -> &str {
    if let Some(rest) = name.strip_prefix('-') {
        if let Some(idx) = rest.find('-') {
            return &rest[idx + 1..];
        }
    }
    name
}

fn is_valid_property(property: &str) -> bool {
    let body = property.strip_prefix('*').unwrap_or(property);
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn strip_important(value: &str) -> (&str, bool) {
    if let Some(idx) = value.rfind('!') {
        let flag = value[idx + 1..].trim();
        if flag.eq_ignore_ascii_case("important") {
            return (value[..idx].trim_end(), true);
        }
    }
    (value, false)
}

fn parse_media_queries(prelude: &str, origin: &Location) -> Vec<MediaQuery> {
    let mut queries = Vec::new();

    for (offset, piece) in split_top_level(prelude, ',') {
        let mut query = MediaQuery {
            text: piece.trim().to_string(),
            expressions: Vec::new(),
        };

        let mut depth = 0usize;
        let mut open = 0usize;
        for (i, ch) in piece.char_indices() {
            match ch {
                '(' => {
                    if depth == 0 {
                        open = i;
                    }
                    depth += 1;
                }
                ')' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = &piece[open + 1..i];
                        let (feature, value) = match inner.split_once(':') {
                            Some((f, v)) => (f.trim(), Some(v.trim())),
                            None => (inner.trim(), None),
                        };
                        query.expressions.push(MediaExpression {
                            feature: feature.to_string(),
                            value: value.filter(|v| !v.is_empty()).map(str::to_string),
                            location: locate(origin, prelude, offset + open),
                        });
                    }
                }
                _ => {}
            }
        }

        queries.push(query);
    }

    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(source: &str) -> (Stylesheet, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let sheet = CssReader::new()
            .parse(source, "test.css", &mut diagnostics)
            .unwrap();
        (sheet, diagnostics)
    }

    #[test]
    fn test_parse_style_rule() {
        let (sheet, diagnostics) = read(".THIS, .THIS a { color: red; margin: 0 !important }");
        assert!(!diagnostics.has_errors());
        assert_eq!(sheet.rules.len(), 1);

        match &sheet.rules[0] {
            Rule::Style(rule) => {
                let selectors: Vec<&str> = rule.selectors.iter().map(|s| s.text.as_str()).collect();
                assert_eq!(selectors, vec![".THIS", ".THIS a"]);
                assert_eq!(rule.declarations.len(), 2);
                assert_eq!(rule.declarations[0].property, "color");
                assert_eq!(rule.declarations[0].value, "red");
                assert_eq!(rule.declarations[1].value, "0");
                assert!(rule.declarations[1].important);
            }
            other => panic!("Expected style rule, got {:?}", other),
        }
    }

    #[test]
    fn test_declaration_locations() {
        let (sheet, _) = read("a {\n  color: red;\n  top: 0\n}");
        let Rule::Style(rule) = &sheet.rules[0] else {
            panic!("Expected style rule");
        };
        let loc = &rule.declarations[1].location;
        assert_eq!((loc.line, loc.column), (3, 3));
    }

    #[test]
    fn test_url_value_with_semicolon_in_string() {
        let (sheet, diagnostics) = read("a { background: url('x;y.png') no-repeat }");
        assert!(!diagnostics.has_errors());
        let Rule::Style(rule) = &sheet.rules[0] else {
            panic!("Expected style rule");
        };
        assert_eq!(rule.declarations.len(), 1);
        assert_eq!(rule.declarations[0].value, "url('x;y.png') no-repeat");
    }

    #[test]
    fn test_bad_declaration_is_dropped_and_recorded() {
        let (sheet, diagnostics) = read("a { color red; top: 0 }");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.issues()[0].message.contains("Expected ':'"));

        let Rule::Style(rule) = &sheet.rules[0] else {
            panic!("Expected style rule");
        };
        assert_eq!(rule.declarations.len(), 1);
        assert_eq!(rule.declarations[0].property, "top");
    }

    #[test]
    fn test_media_rule_with_nested_rules() {
        let (sheet, diagnostics) = read("@media (stylec-if:IE7){ a { top: 0 } b { left: 0 } }");
        assert!(!diagnostics.has_errors());

        match &sheet.rules[0] {
            Rule::Media(media) => {
                assert_eq!(media.queries.len(), 1);
                let exp = &media.queries[0].expressions[0];
                assert_eq!(exp.feature, "stylec-if");
                assert_eq!(exp.value.as_deref(), Some("IE7"));
                assert_eq!((exp.location.line, exp.location.column), (1, 8));
                assert_eq!(media.rules.len(), 2);
            }
            other => panic!("Expected media rule, got {:?}", other),
        }
    }

    #[test]
    fn test_media_expression_without_value() {
        let (sheet, _) = read("@media (stylec-else){ a { top: 0 } }");
        let Rule::Media(media) = &sheet.rules[0] else {
            panic!("Expected media rule");
        };
        assert_eq!(media.queries[0].expressions[0].feature, "stylec-else");
        assert!(media.queries[0].expressions[0].value.is_none());
    }

    #[test]
    fn test_verbatim_at_rules() {
        let source = "@font-face { font-family: x } @-webkit-keyframes spin { from { top: 0 } } \
                      @page :first { margin: 1in } @supports (display: grid) { a { top: 0 } } \
                      @-ms-viewport { width: device-width }";
        let (sheet, diagnostics) = read(source);
        assert!(!diagnostics.has_errors());
        let kinds: Vec<&str> = sheet.rules.iter().map(Rule::kind_name).collect();
        assert_eq!(kinds, vec!["font-face", "keyframes", "page", "supports", "viewport"]);

        let Rule::Keyframes(keyframes) = &sheet.rules[1] else {
            panic!("Expected keyframes");
        };
        assert_eq!(keyframes.name, "-webkit-keyframes");
        assert_eq!(keyframes.prelude, "spin");
    }

    #[test]
    fn test_unsupported_at_rule_recorded() {
        let (sheet, diagnostics) = read("@import url(x.css); a { top: 0 }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.issues()[0].message.contains("@import"));
    }

    #[test]
    fn test_recovers_after_stray_brace() {
        let (sheet, diagnostics) = read("} a { top: 0 }");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(sheet.rules.len(), 1);
    }

    #[test]
    fn test_unterminated_block_salvaged() {
        let (sheet, diagnostics) = read("a { top: 0");
        assert_eq!(diagnostics.len(), 1);
        let Rule::Style(rule) = &sheet.rules[0] else {
            panic!("Expected style rule");
        };
        assert_eq!(rule.declarations.len(), 1);
    }

    #[test]
    fn test_comments_ignored() {
        let (sheet, diagnostics) = read("/* header */ a { /* note */ top: 0 }");
        assert!(!diagnostics.has_errors());
        let Rule::Style(rule) = &sheet.rules[0] else {
            panic!("Expected style rule");
        };
        assert_eq!(rule.declarations[0].property, "top");
    }
}
