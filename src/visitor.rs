//! Document-order dispatch over the closed set of top-level constructs

use crate::ast::{AtRule, MediaRule, Rule, StyleRule, Stylesheet};
use crate::error::Result;

/// Receives each construct of a stylesheet in document order.
///
/// Any `Err` aborts the walk; recoverable problems belong in the visitor's
/// own diagnostics instead.
pub trait RuleVisitor {
    fn visit_style_rule(&mut self, rule: &StyleRule) -> Result<()>;

    fn visit_font_face(&mut self, rule: &AtRule) -> Result<()>;

    fn visit_keyframes(&mut self, rule: &AtRule) -> Result<()>;

    fn visit_page(&mut self, rule: &AtRule) -> Result<()>;

    fn visit_supports(&mut self, rule: &AtRule) -> Result<()>;

    fn visit_viewport(&mut self, rule: &AtRule) -> Result<()>;

    /// Returns `true` to descend into the rule's nested rules, in which case
    /// [`RuleVisitor::end_media`] is called once they have been visited
    fn begin_media(&mut self, rule: &MediaRule) -> Result<bool>;

    fn end_media(&mut self, rule: &MediaRule) -> Result<()>;
}

pub fn visit_stylesheet<V: RuleVisitor + ?Sized>(stylesheet: &Stylesheet, visitor: &mut V) -> Result<()> {
    visit_rules(&stylesheet.rules, visitor)
}

pub fn visit_rules<V: RuleVisitor + ?Sized>(rules: &[Rule], visitor: &mut V) -> Result<()> {
    for rule in rules {
        match rule {
            Rule::Style(style) => visitor.visit_style_rule(style)?,
            Rule::FontFace(at_rule) => visitor.visit_font_face(at_rule)?,
            Rule::Keyframes(at_rule) => visitor.visit_keyframes(at_rule)?,
            Rule::Page(at_rule) => visitor.visit_page(at_rule)?,
            Rule::Supports(at_rule) => visitor.visit_supports(at_rule)?,
            Rule::Viewport(at_rule) => visitor.visit_viewport(at_rule)?,
            Rule::Media(media) => {
                if visitor.begin_media(media)? {
                    visit_rules(&media.rules, visitor)?;
                    visitor.end_media(media)?;
                }
            }
        }
    }
    Ok(())
}
