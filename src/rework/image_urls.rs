use super::{Rework, ReworkResult};
use crate::ast::Declaration;
use crate::error::Issue;

/// Rewrites relative `url(...)` targets to paths under the namespace's resource directory
pub struct ImageUrlRework {
    base: String,
}

impl ImageUrlRework {
    pub fn new(resource_root: &str, namespace: &str) -> Self {
        Self {
            base: format!("{}/{}", resource_root.trim_end_matches('/'), namespace),
        }
    }

    fn rewrite(&self, value: &str) -> Result<String, String> {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(start) = find_url(rest) {
            let open = start + 4;
            out.push_str(&rest[..open]);
            let close = find_close(&rest[open..]).ok_or_else(|| {
                format!("Unterminated url() in '{}'", value)
            })?;

            let inner = &rest[open..open + close];
            out.push_str(&self.rewrite_target(inner)?);
            out.push(')');
            rest = &rest[open + close + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }

    fn rewrite_target(&self, inner: &str) -> Result<String, String> {
        let trimmed = inner.trim();
        let (quote, target) = match trimmed.chars().next() {
            Some(q @ ('"' | '\'')) if trimmed.len() >= 2 && trimmed.ends_with(q) => {
                (Some(q), &trimmed[1..trimmed.len() - 1])
            }
            _ => (None, trimmed),
        };

        if !is_relative(target) {
            return Ok(inner.to_string());
        }

        let path = normalize(target)
            .ok_or_else(|| format!("Image url '{}' escapes the resource directory", target))?;
        let rewritten = format!("{}/{}", self.base, path);

        Ok(match quote {
            Some(q) => format!("{}{}{}", q, rewritten, q),
            None => rewritten,
        })
    }
}

impl Rework<Declaration> for ImageUrlRework {
    fn name(&self) -> &'static str {
        "image-urls"
    }

    fn perform(&self, declaration: &Declaration) -> ReworkResult<Declaration> {
        if !declaration.value.to_ascii_lowercase().contains("url(") {
            return ReworkResult::keep(declaration.clone());
        }
        match self.rewrite(&declaration.value) {
            Ok(value) => ReworkResult::keep(declaration.with_value(value)),
            Err(message) => ReworkResult::reject(Issue::at(message, declaration.location.clone())),
        }
    }
}

fn find_url(text: &str) -> Option<usize> {
    text.to_ascii_lowercase().find("url(")
}

/// Offset of the `)` closing a url whose contents start at `text[0]`
fn find_close(text: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, ')') => return Some(i),
            _ => {}
        }
    }
    None
}

fn is_relative(target: &str) -> bool {
    if target.is_empty() || target.starts_with('/') || target.starts_with('#') {
        return false;
    }
    // scheme urls: data:, http:, https:, ...
    match target.find(':') {
        Some(idx) => {
            let scheme = &target[..idx];
            !(scheme
                .chars()
                .next()
                .map_or(false, |c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')))
        }
        None => true,
    }
}

/// Resolve `.` and `..` segments; `None` when the path climbs above its root
fn normalize(path: &str) -> Option<String> {
    let (path, suffix) = match path.find(|c: char| c == '?' || c == '#') {
        Some(idx) => (&path[..idx], &path[idx..]),
        None => (path, ""),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(format!("{}{}", segments.join("/"), suffix))
}
