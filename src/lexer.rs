//! Character-level scanning for stylesheet source
//!
//! The cursor knows about strings, comments and bracket nesting, which is
//! all the reader needs to find rule boundaries. It tracks 1-based line and
//! column numbers so every construct can carry a source [`Location`].

use crate::error::{Issue, Location};
use std::ops::Range;

pub struct Cursor {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    filename: String,
    issues: Vec<Issue>,
}

impl Cursor {
    pub fn new(input: &str, filename: String) -> Self {
        Self::at(input, Location::new(filename, 1, 1))
    }

    /// Cursor over a fragment that starts at `origin` in the enclosing source
    pub fn at(input: &str, origin: Location) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: origin.line,
            column: origin.column,
            filename: origin.file,
            issues: Vec::new(),
        }
    }

    pub fn location(&self) -> Location {
        Location::new(self.filename.clone(), self.line, self.column)
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    pub fn peek_next(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Issues found while scanning (unterminated comments and strings)
    pub fn take_issues(&mut self) -> Vec<Issue> {
        std::mem::take(&mut self.issues)
    }

    pub fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek_next() == Some('*') {
                let mut sink = String::new();
                self.blank_comment_into(&mut sink);
            } else {
                break;
            }
        }
    }

    /// Identifier characters, including the leading `-` of vendor prefixes
    pub fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    /// Consume up to, but not including, the first top-level char in `stops`.
    /// Strings and bracketed groups are consumed whole; comments are blanked
    /// to whitespace so offsets into the returned text stay aligned.
    pub fn read_until_any(&mut self, stops: &[char]) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        while let Some(ch) = self.peek() {
            if depth == 0 && stops.contains(&ch) {
                break;
            }
            match ch {
                '"' | '\'' => {
                    self.read_string_into(&mut out);
                    continue;
                }
                '/' if self.peek_next() == Some('*') => {
                    self.blank_comment_into(&mut out);
                    continue;
                }
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                _ => {}
            }
            out.push(ch);
            self.advance();
        }
        out
    }

    /// Read the body of a block whose `{` was already consumed, through the
    /// matching `}`. Returns the body and whether the closing brace was found.
    pub fn read_block(&mut self) -> (String, bool) {
        let mut out = String::new();
        let mut depth = 0usize;
        while let Some(ch) = self.peek() {
            match ch {
                '"' | '\'' => {
                    self.read_string_into(&mut out);
                    continue;
                }
                '/' if self.peek_next() == Some('*') => {
                    self.blank_comment_into(&mut out);
                    continue;
                }
                '{' => depth += 1,
                '}' => {
                    if depth == 0 {
                        self.advance();
                        return (out, true);
                    }
                    depth -= 1;
                }
                _ => {}
            }
            out.push(ch);
            self.advance();
        }
        (out, false)
    }

    fn read_string_into(&mut self, out: &mut String) {
        let start = self.location();
        let Some(quote) = self.advance() else {
            return;
        };
        out.push(quote);
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                self.issues.push(Issue::at("Unterminated string", start));
                return;
            }
            out.push(ch);
            self.advance();
            if ch == '\\' {
                if let Some(escaped) = self.advance() {
                    out.push(escaped);
                }
            } else if ch == quote {
                return;
            }
        }
        self.issues.push(Issue::at("Unterminated string", start));
    }

    fn blank_comment_into(&mut self, out: &mut String) {
        let start = self.location();
        self.advance();
        self.advance();
        out.push_str("  ");
        while let Some(ch) = self.peek() {
            if ch == '*' && self.peek_next() == Some('/') {
                self.advance();
                self.advance();
                out.push_str("  ");
                return;
            }
            out.push(if ch == '\n' { '\n' } else { ' ' });
            self.advance();
        }
        self.issues.push(Issue::at("Unterminated comment", start));
    }
}

/// Location of byte `offset` within `text`, where `text` starts at `origin`
pub fn locate(origin: &Location, text: &str, offset: usize) -> Location {
    let mut line = origin.line;
    let mut column = origin.column;
    for ch in text[..offset.min(text.len())].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    Location::new(origin.file.clone(), line, column)
}

/// Split on top-level occurrences of `separator`, returning each piece with
/// its byte offset. Separators inside strings or bracketed groups are ignored.
pub fn split_top_level(text: &str, separator: char) -> Vec<(usize, &str)> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push((start, &text[start..i]));
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push((start, &text[start..]));
    parts
}

/// Byte ranges of the quoted strings in `text`, quotes included. Comments are
/// skipped, so an apostrophe inside one never opens a string.
pub fn string_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        match ch {
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = '\0';
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '"' | '\'' => {
                let mut end = text.len();
                let mut escaped = false;
                for (i, c) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == ch {
                        end = i + c.len_utf8();
                        break;
                    }
                }
                spans.push(start..end);
            }
            _ => {}
        }
    }
    spans
}

pub fn in_string(spans: &[Range<usize>], offset: usize) -> bool {
    spans.iter().any(|span| span.contains(&offset))
}

/// Offset of the first non-whitespace character of `piece`
pub fn leading_whitespace(piece: &str) -> usize {
    piece.len() - piece.trim_start().len()
}
