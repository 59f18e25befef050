//! Rendering of selectors, declarations and verbatim rules back to CSS text

use crate::ast::{AtRule, Declaration, MediaRule, Selector};
use crate::lexer::{in_string, string_spans};
use crate::types::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterSettings {
    /// Compact output without optional whitespace
    pub optimized: bool,
}

impl WriterSettings {
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            optimized: !mode.is_dev_mode(),
        }
    }
}

pub fn selector_css(selector: &Selector, _settings: &WriterSettings) -> String {
    collapse_whitespace(&selector.text)
}

pub fn declaration_css(declaration: &Declaration, settings: &WriterSettings) -> String {
    let value = collapse_whitespace(&declaration.value);
    match (settings.optimized, declaration.important) {
        (true, false) => format!("{}:{}", declaration.property, value),
        (true, true) => format!("{}:{}!important", declaration.property, value),
        (false, false) => format!("{}: {}", declaration.property, value),
        (false, true) => format!("{}: {} !important", declaration.property, value),
    }
}

pub fn at_rule_css(rule: &AtRule, settings: &WriterSettings) -> String {
    block_css(&rule.name, &rule.prelude, &rule.block, settings)
}

pub fn media_rule_css(rule: &MediaRule, settings: &WriterSettings) -> String {
    block_css("media", &rule.prelude, &rule.block, settings)
}

fn block_css(name: &str, prelude: &str, block: &str, settings: &WriterSettings) -> String {
    let prelude = collapse_whitespace(prelude);
    let mut out = format!("@{}", name);
    if !prelude.is_empty() {
        out.push(' ');
        out.push_str(&prelude);
    }
    if settings.optimized {
        out.push('{');
        out.push_str(&compact(block));
    } else {
        out.push_str(" {");
        out.push_str(&collapse_whitespace(block));
    }
    out.push('}');
    out
}

/// Whitespace runs outside quoted strings become one space; leading and
/// trailing whitespace is dropped
pub fn collapse_whitespace(text: &str) -> String {
    let strings = string_spans(text);
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() && !in_string(&strings, i) {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

/// Collapsed text with the spaces next to `{`, `}` and `;` removed
fn compact(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let strings = string_spans(&collapsed);
    let chars: Vec<(usize, char)> = collapsed.char_indices().collect();
    let mut out = String::with_capacity(collapsed.len());

    for (i, &(offset, ch)) in chars.iter().enumerate() {
        if ch == ' ' && !in_string(&strings, offset) {
            let prev = if i > 0 { chars[i - 1].1 } else { ' ' };
            let next = chars.get(i + 1).map_or(' ', |&(_, c)| c);
            if matches!(prev, '{' | '}' | ';') || matches!(next, '{' | '}' | ';') {
                continue;
            }
        }
        out.push(ch);
    }
    out
}
