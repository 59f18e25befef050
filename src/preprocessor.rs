//! Preprocessor for rewriting @if/@elseif/@else directives into media at-rules
//!
//! The grammar reader knows nothing about conditionals. Rewriting them as
//! `@media (<marker>:<condition>){` lets them travel through the reader as
//! ordinary nested media rules; the rule visitor recognises the marker
//! features afterwards.

use crate::lexer::{in_string, string_spans};
use crate::types::{CONDITIONAL_ELSE, CONDITIONAL_ELSEIF, CONDITIONAL_IF};
use regex::{Captures, Regex};

#[derive(Debug)]
pub struct Preprocessor {
    if_regex: Regex,
    elseif_regex: Regex,
    else_regex: Regex,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self {
            if_regex: Regex::new(r"@if[\s(]+([^{\s)]*)[\s){]*").expect("valid @if pattern"),
            elseif_regex: Regex::new(r"@elseif[\s(]+([^{\s)]*)[\s){]*")
                .expect("valid @elseif pattern"),
            else_regex: Regex::new(r"@else[\s{]*").expect("valid @else pattern"),
        }
    }

    /// Rewrite every conditional directive in `contents`.
    ///
    /// `@elseif` is rewritten before `@else` so the shorter pattern never
    /// sees an `@elseif`. Newlines swallowed by a match are re-emitted after
    /// the replacement so line numbers reported downstream still point at
    /// the original source. Directives inside quoted strings are left alone.
    pub fn process(&self, contents: &str) -> String {
        let contents = rewrite_outside_strings(&self.if_regex, contents, |caps| {
            format!("@media ({}:{}){{", CONDITIONAL_IF, &caps[1])
        });
        let contents = rewrite_outside_strings(&self.elseif_regex, &contents, |caps| {
            format!("@media ({}:{}){{", CONDITIONAL_ELSEIF, &caps[1])
        });
        rewrite_outside_strings(&self.else_regex, &contents, |_| {
            format!("@media ({}){{", CONDITIONAL_ELSE)
        })
    }
}

fn rewrite_outside_strings(
    regex: &Regex,
    contents: &str,
    rewrite: impl Fn(&Captures<'_>) -> String,
) -> String {
    let strings = string_spans(contents);
    regex
        .replace_all(contents, |caps: &Captures<'_>| {
            let start = caps.get(0).map_or(0, |m| m.start());
            if in_string(&strings, start) {
                caps[0].to_string()
            } else {
                replacement(&caps[0], &rewrite(caps))
            }
        })
        .into_owned()
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn replacement(matched: &str, rewritten: &str) -> String {
    let newlines = matched.matches('\n').count();
    let mut out = String::with_capacity(rewritten.len() + newlines);
    out.push_str(rewritten);
    out.extend(std::iter::repeat('\n').take(newlines));
    out
}

/// Convenience wrapper around [`Preprocessor::process`]
pub fn preprocess(contents: &str) -> String {
    Preprocessor::new().process(contents)
}
