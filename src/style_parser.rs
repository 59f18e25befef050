//! Compile entry point: one [`StyleUnit`] in, an ordered node sequence out
//!
//! Phases:
//! 1. Preprocess conditional directives into marker media rules
//! 2. Read the stylesheet through the [`StylesheetParser`] collaborator
//! 3. Visit rules in document order, reworking selectors and declarations
//!    and assembling text and structural nodes
//! 4. Close the conditional stack and raise recorded issues, if any

use crate::ast::{AtRule, Declaration, MediaExpression, MediaRule, StyleRule, Stylesheet};
use crate::diagnostics::Diagnostics;
use crate::error::{CompilerError, Result};
use crate::expression::{Expression, ExpressionBuilder, PropertyReferenceBuilder};
use crate::node::OutputNode;
use crate::output::{Branch, OutputAssembler};
use crate::parser::{CssReader, StylesheetParser};
use crate::preprocessor::Preprocessor;
use crate::rework::{DynamicRework, ReworkPipeline};
use crate::types::{
    StyleUnit, ATTR_ELSE, CONDITIONAL_ELSE, CONDITIONAL_ELSEIF, CONDITIONAL_IF,
    CONDITION_EXPRESSION_PREFIX,
};
use crate::visitor::{visit_stylesheet, RuleVisitor};
use crate::writer::{at_rule_css, declaration_css, media_rule_css, selector_css, WriterSettings};
use crate::{CompilationStats, CompilerOptions};
use std::time::Instant;

/// Everything one compilation produced, before recorded issues are raised
#[derive(Debug)]
pub struct Compilation {
    pub nodes: Vec<OutputNode>,
    pub stats: CompilationStats,
    pub diagnostics: Diagnostics,
}

impl Compilation {
    /// The node sequence, or the aggregated error if any issue was recorded
    pub fn into_result(self, filename: &str) -> Result<(Vec<OutputNode>, CompilationStats)> {
        self.diagnostics.raise_if_any(filename)?;
        Ok((self.nodes, self.stats))
    }
}

/// Compiles a single unit. Consumed by [`StyleParser::parse`]; build a new
/// one for every unit.
pub struct StyleParser {
    unit: StyleUnit,
    options: CompilerOptions,
    grammar: Box<dyn StylesheetParser>,
    expressions: Box<dyn ExpressionBuilder>,
    pipeline: ReworkPipeline,
}

impl StyleParser {
    pub fn new(unit: StyleUnit, options: CompilerOptions) -> Self {
        let pipeline = ReworkPipeline::for_unit(&unit, &options);
        Self {
            unit,
            options,
            grammar: Box::new(CssReader::new()),
            expressions: Box::new(PropertyReferenceBuilder),
            pipeline,
        }
    }

    pub fn with_parser(mut self, parser: impl StylesheetParser + 'static) -> Self {
        self.grammar = Box::new(parser);
        self
    }

    pub fn with_expression_builder(mut self, builder: impl ExpressionBuilder + 'static) -> Self {
        self.expressions = Box::new(builder);
        self
    }

    /// Registers a dynamic rework after the ones already present
    pub fn with_dynamic_rework(mut self, rework: impl DynamicRework<Declaration> + 'static) -> Self {
        self.pipeline.push_dynamic_rework(rework);
        self
    }

    /// Registers a dynamic rework ahead of every built-in one
    pub fn with_priority_dynamic_rework(
        mut self,
        rework: impl DynamicRework<Declaration> + 'static,
    ) -> Self {
        self.pipeline.insert_dynamic_rework(0, rework);
        self
    }

    pub fn with_pipeline(mut self, pipeline: ReworkPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn parse(self) -> Result<Vec<OutputNode>> {
        self.parse_with_stats().map(|(nodes, _)| nodes)
    }

    pub fn parse_with_stats(self) -> Result<(Vec<OutputNode>, CompilationStats)> {
        let filename = self.unit.filename.clone();
        self.compile()?.into_result(&filename)
    }

    /// Runs every phase but leaves recorded issues in the returned
    /// [`Compilation`]. Fatal errors still abort with `Err`.
    pub fn compile(self) -> Result<Compilation> {
        let start_time = Instant::now();
        let debug = self.options.debug_mode;
        let filename = self.unit.filename.as_str();

        if debug {
            log::debug!("Compiling {} for class '{}'", filename, self.unit.component_class);
            log::debug!("Phase 1: Preprocessing conditionals...");
        }
        let source = Preprocessor::new().process(&self.unit.contents);

        if debug {
            log::debug!("Phase 2: Reading stylesheet...");
        }
        let mut diagnostics = Diagnostics::new();
        let stylesheet = self
            .grammar
            .parse(&source, filename, &mut diagnostics)
            .unwrap_or_default();
        if debug {
            log::debug!(
                "Phase 2 complete. {} top-level rules, {} issue(s)",
                stylesheet.rules.len(),
                diagnostics.len()
            );
            log::debug!("Phase 3: Visiting rules...");
        }

        let mut emitter = Emitter {
            unit: &self.unit,
            pipeline: &self.pipeline,
            expressions: self.expressions.as_ref(),
            settings: WriterSettings::for_mode(self.options.mode),
            output: OutputAssembler::new(),
            diagnostics,
            rules_visited: 0,
        };
        emitter.run(&stylesheet)?;

        let Emitter {
            mut output,
            diagnostics,
            rules_visited,
            ..
        } = emitter;
        let nodes = output.finish()?;
        let conditional_groups = output.conditional_groups();

        let (text_nodes, structural_nodes) = count_nodes(&nodes);
        let stats = CompilationStats {
            source_size: self.unit.contents.len() as u64,
            rules_visited,
            text_nodes,
            structural_nodes,
            conditional_groups,
            issues: diagnostics.len(),
            compile_time_ms: start_time.elapsed().as_millis() as u64,
        };

        if debug {
            log::debug!(
                "Phase 4 complete. {} node(s), {} issue(s) in {}ms",
                nodes.len(),
                stats.issues,
                stats.compile_time_ms
            );
        }

        Ok(Compilation {
            nodes,
            stats,
            diagnostics,
        })
    }
}

/// Visitor state for one compilation
struct Emitter<'a> {
    unit: &'a StyleUnit,
    pipeline: &'a ReworkPipeline,
    expressions: &'a dyn ExpressionBuilder,
    settings: WriterSettings,
    output: OutputAssembler,
    diagnostics: Diagnostics,
    rules_visited: usize,
}

impl Emitter<'_> {
    fn run(&mut self, stylesheet: &Stylesheet) -> Result<()> {
        visit_stylesheet(stylesheet, self)
    }

    fn verbatim(&mut self, rule: &AtRule) -> Result<()> {
        self.rules_visited += 1;
        log::trace!("@{} passed through at {}", rule.name, rule.location);
        let css = at_rule_css(rule, &self.settings);
        self.output.append_text(&css)
    }

    /// Expression for an `@if`/`@elseif` condition, validated against the
    /// unit's allowed conditions
    fn condition(&self, branch: Branch, expression: &MediaExpression) -> Result<Expression> {
        let value = expression
            .value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CompilerError::Expression {
                location: expression.location.clone(),
                message: format!("{} requires a condition", branch.directive()),
            })?
            .to_uppercase();

        if !self.unit.is_condition_allowed(&value) {
            return Err(CompilerError::UnknownCondition {
                value,
                allowed: self.unit.allowed_conditions_display(),
                location: expression.location.clone(),
            });
        }

        let text = format!("{}{}", CONDITION_EXPRESSION_PREFIX, value);
        self.expressions
            .build(&text, &expression.location)
            .map_err(|message| CompilerError::Expression {
                location: expression.location.clone(),
                message,
            })
    }
}

/// The conditional marker carried by a media rule, if it is one
fn conditional_marker(rule: &MediaRule) -> Option<(Branch, &MediaExpression)> {
    rule.queries
        .iter()
        .flat_map(|query| query.expressions.iter())
        .find_map(|expression| {
            let feature = expression.feature.as_str();
            if feature.eq_ignore_ascii_case(CONDITIONAL_IF) {
                Some((Branch::If, expression))
            } else if feature.eq_ignore_ascii_case(CONDITIONAL_ELSEIF) {
                Some((Branch::ElseIf, expression))
            } else if feature.eq_ignore_ascii_case(CONDITIONAL_ELSE) {
                Some((Branch::Else, expression))
            } else {
                None
            }
        })
}

impl RuleVisitor for Emitter<'_> {
    fn visit_style_rule(&mut self, rule: &StyleRule) -> Result<()> {
        self.rules_visited += 1;

        let selectors = self.pipeline.rework_selectors(&rule.selectors, &mut self.diagnostics);
        let declarations = self
            .pipeline
            .rework_declarations(&rule.declarations, &mut self.diagnostics);
        if selectors.is_empty() {
            // declarations are still matched so their issues get reported
            for declaration in &declarations {
                self.pipeline.try_match(declaration, &mut self.diagnostics);
            }
            log::debug!("Skipping rule at {}: no selectors left after rework", rule.location);
            return Ok(());
        }

        let selector_text: Vec<String> = selectors
            .iter()
            .map(|selector| selector_css(selector, &self.settings))
            .collect();
        self.output.append_text(&selector_text.join(","))?;
        self.output.append_text("{")?;

        for (i, declaration) in declarations.iter().enumerate() {
            if i != 0 {
                self.output.append_text(";")?;
            }
            match self.pipeline.try_match(declaration, &mut self.diagnostics) {
                Some(node) => self.output.append_structural(node)?,
                None => {
                    let css = declaration_css(declaration, &self.settings);
                    self.output.append_text(&css)?;
                }
            }
        }

        self.output.append_text("}")
    }

    fn visit_font_face(&mut self, rule: &AtRule) -> Result<()> {
        self.verbatim(rule)
    }

    fn visit_keyframes(&mut self, rule: &AtRule) -> Result<()> {
        self.verbatim(rule)
    }

    fn visit_page(&mut self, rule: &AtRule) -> Result<()> {
        self.verbatim(rule)
    }

    fn visit_supports(&mut self, rule: &AtRule) -> Result<()> {
        self.verbatim(rule)
    }

    fn visit_viewport(&mut self, rule: &AtRule) -> Result<()> {
        self.verbatim(rule)
    }

    fn begin_media(&mut self, rule: &MediaRule) -> Result<bool> {
        self.rules_visited += 1;

        let Some((branch, expression)) = conditional_marker(rule) else {
            let css = media_rule_css(rule, &self.settings);
            self.output.append_text(&css)?;
            return Ok(false);
        };

        match branch {
            Branch::If => {
                let condition = self.condition(branch, expression)?;
                self.output.open_if(condition)?;
            }
            Branch::ElseIf => {
                let condition = self.condition(branch, expression)?;
                self.output.open_elseif(condition)?;
            }
            Branch::Else => self.output.open_else()?,
        }
        Ok(true)
    }

    fn end_media(&mut self, _rule: &MediaRule) -> Result<()> {
        self.output.end_conditional_block()
    }
}

/// (text nodes, structural nodes), counting nested bodies and else branches
fn count_nodes(nodes: &[OutputNode]) -> (usize, usize) {
    let mut text = 0;
    let mut structural = 0;
    for node in nodes {
        match node {
            OutputNode::Text { .. } => text += 1,
            OutputNode::Structural(node) => {
                let mut current = Some(node);
                while let Some(branch) = current {
                    structural += 1;
                    if let Some(body) = &branch.body {
                        let (t, s) = count_nodes(body);
                        text += t;
                        structural += s;
                    }
                    current = branch.attribute(ATTR_ELSE).and_then(|value| value.as_node());
                }
            }
        }
    }
    (text, structural)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;
    use crate::node::{flatten_text, AttributeValue, NodeBuilder, StructuralNode};
    use crate::rework::DynamicOutcome;
    use crate::types::{
        Mode, Namespace, ATTR_IS_TRUE, ATTR_REFERENCES, DESCRIPTOR_CONDITIONAL, DESCRIPTOR_THEME,
    };

    fn unit(contents: &str) -> StyleUnit {
        StyleUnit::new(contents, "button.css", Namespace::new("ui"), "uiButton")
    }

    fn prod() -> CompilerOptions {
        CompilerOptions {
            mode: Mode::Prod,
            ..CompilerOptions::default()
        }
    }

    fn compile(unit: StyleUnit) -> Result<Vec<OutputNode>> {
        StyleParser::new(unit, prod()).parse()
    }

    fn condition_of(node: &StructuralNode) -> String {
        match node.attribute(ATTR_IS_TRUE) {
            Some(AttributeValue::Expression(e)) => e.to_string(),
            Some(AttributeValue::Bool(b)) => b.to_string(),
            other => panic!("unexpected condition {:?}", other),
        }
    }

    fn else_of(node: &StructuralNode) -> Option<&StructuralNode> {
        node.attribute(ATTR_ELSE).and_then(AttributeValue::as_node)
    }

    #[test]
    fn test_plain_stylesheet_is_one_text_node() {
        let nodes = compile(unit(".THIS { color: red; margin: 0 }\n.THIS a { top: 1px !important }"))
            .unwrap();
        assert_eq!(
            nodes,
            vec![OutputNode::text(
                ".uiButton{color:red;margin:0}.uiButton a{top:1px!important}"
            )]
        );
    }

    #[test]
    fn test_dev_mode_rendering() {
        let nodes = StyleParser::new(unit(".THIS,.THIS  a { color: red }"), CompilerOptions::default())
            .parse()
            .unwrap();
        assert_eq!(nodes, vec![OutputNode::text(".uiButton,.uiButton a{color: red}")]);
    }

    #[test]
    fn test_conditional_chain_nests_in_else() {
        let source = "@if(A){ .THIS { color: red } }\n\
                      @elseif(B){ .THIS { color: blue } }\n\
                      @else{ .THIS { color: green } }";
        let nodes = compile(unit(source).allow_conditions(["A", "B"])).unwrap();
        assert_eq!(nodes.len(), 1);

        let head = nodes[0].as_structural().unwrap();
        assert_eq!(head.descriptor, DESCRIPTOR_CONDITIONAL);
        assert_eq!(condition_of(head), "$Browser.isA");
        assert_eq!(head.body, Some(vec![OutputNode::text(".uiButton{color:red}")]));

        let elseif = else_of(head).unwrap();
        assert_eq!(elseif.descriptor, DESCRIPTOR_CONDITIONAL);
        assert_eq!(condition_of(elseif), "$Browser.isB");
        assert_eq!(elseif.body, Some(vec![OutputNode::text(".uiButton{color:blue}")]));

        let otherwise = else_of(elseif).unwrap();
        assert_eq!(condition_of(otherwise), "true");
        assert_eq!(otherwise.body, Some(vec![OutputNode::text(".uiButton{color:green}")]));
        assert!(else_of(otherwise).is_none());
    }

    #[test]
    fn test_conditions_keep_document_order() {
        let source = ".THIS { top: 0 } @if(ie7){ .THIS { top: 1px } } .THIS a { top: 2px }";
        let nodes = compile(unit(source).allow_condition("IE7")).unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].as_text(), Some(".uiButton{top:0}"));
        assert_eq!(condition_of(nodes[1].as_structural().unwrap()), "$Browser.isIE7");
        assert_eq!(nodes[2].as_text(), Some(".uiButton a{top:2px}"));
    }

    #[test]
    fn test_nested_conditionals() {
        let source = "@if(A){ .THIS { top: 0 } @if(B){ .THIS a { top: 1px } } } @else{ .THIS { top: 2px } }";
        let nodes = compile(unit(source).allow_conditions(["A", "B"])).unwrap();
        assert_eq!(nodes.len(), 1);

        let outer = nodes[0].as_structural().unwrap();
        let body = outer.body.as_ref().unwrap();
        assert_eq!(body.len(), 2);
        assert_eq!(condition_of(body[1].as_structural().unwrap()), "$Browser.isB");
        assert_eq!(
            else_of(outer).and_then(|n| n.body.clone()),
            Some(vec![OutputNode::text(".uiButton{top:2px}")])
        );
    }

    #[test]
    fn test_unknown_condition_fails_fast() {
        let result = compile(unit("@if(B){ .THIS { color: red } }").allow_condition("A"));
        match result {
            Err(CompilerError::UnknownCondition {
                value,
                allowed,
                location,
            }) => {
                assert_eq!(value, "B");
                assert_eq!(allowed, "[A]");
                assert_eq!(location.line, 1);
            }
            other => panic!("Expected unknown condition, got {:?}", other),
        }

        let err = compile(unit("@if(B){ .THIS { color: red } }").allow_condition("A")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("[B]"));
        assert!(message.contains("[A]"));
    }

    #[test]
    fn test_orphan_else_is_fatal() {
        let result = compile(unit("@else{ .THIS { top: 0 } }"));
        assert!(matches!(result, Err(CompilerError::Structure { .. })));
    }

    struct RejectAll;

    impl ExpressionBuilder for RejectAll {
        fn build(&self, text: &str, _location: &Location) -> std::result::Result<Expression, String> {
            Err(format!("cannot evaluate {}", text))
        }
    }

    #[test]
    fn test_expression_failure_is_fatal_with_location() {
        let result = StyleParser::new(unit("\n  @if(A){ .THIS { top: 0 } }").allow_condition("A"), prod())
            .with_expression_builder(RejectAll)
            .parse();
        match result {
            Err(CompilerError::Expression { location, message }) => {
                assert_eq!(location.line, 2);
                assert_eq!(message, "cannot evaluate $Browser.isA");
            }
            other => panic!("Expected expression error, got {:?}", other),
        }
    }

    #[test]
    fn test_selector_scoping_is_idempotent() {
        let first = compile(unit(".THIS .label, .uiButton.active { top: 0 }").with_validate_namespace(true))
            .unwrap();
        let once = flatten_text(&first);
        assert_eq!(once, ".uiButton .label,.uiButton.active{top:0}");

        let second = compile(unit(&once).with_validate_namespace(true)).unwrap();
        assert_eq!(flatten_text(&second), once);
    }

    struct Tagged(&'static str);

    impl DynamicRework<Declaration> for Tagged {
        fn name(&self) -> &'static str {
            self.0
        }

        fn perform(&self, declaration: &Declaration) -> DynamicOutcome {
            if !declaration.value.starts_with("dyn(") {
                return DynamicOutcome::NoMatch;
            }
            let mut builder = NodeBuilder::new();
            builder.set_descriptor(self.0);
            match builder.build() {
                Ok(node) => DynamicOutcome::Matched(node),
                Err(e) => panic!("{}", e),
            }
        }
    }

    #[test]
    fn test_first_registered_dynamic_rework_wins() {
        let nodes = StyleParser::new(unit(".THIS { color: dyn(x) }"), prod())
            .with_dynamic_rework(Tagged("first"))
            .with_dynamic_rework(Tagged("second"))
            .parse()
            .unwrap();

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].as_text(), Some(".uiButton{"));
        assert_eq!(nodes[1].as_structural().map(|n| n.descriptor.as_str()), Some("first"));
        assert_eq!(nodes[2].as_text(), Some("}"));
    }

    #[test]
    fn test_priority_dynamic_rework_beats_theme() {
        struct Everything;

        impl DynamicRework<Declaration> for Everything {
            fn name(&self) -> &'static str {
                "everything"
            }

            fn perform(&self, _declaration: &Declaration) -> DynamicOutcome {
                let mut builder = NodeBuilder::new();
                builder.set_descriptor("everything");
                builder.build().map_or(DynamicOutcome::NoMatch, DynamicOutcome::Matched)
            }
        }

        let nodes = StyleParser::new(unit(".THIS { color: theme(ui.c.x) }"), prod())
            .with_priority_dynamic_rework(Everything)
            .parse()
            .unwrap();
        assert_eq!(nodes[1].as_structural().map(|n| n.descriptor.as_str()), Some("everything"));
    }

    #[test]
    fn test_issues_aggregated_with_filename() {
        let source = ".THIS { color red; top: 0 }\n.THIS a { margin: ; left: 0 }";

        let err = compile(unit(source)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("button.css"));
        assert!(message.contains("Expected ':' in declaration 'color red'"));
        assert!(message.contains("Missing value for property 'margin'"));
        assert!(message.contains("(line 2, col 11)"));
        assert_eq!(err.issues().len(), 2);

        let compilation = StyleParser::new(unit(source), prod()).compile().unwrap();
        assert_eq!(compilation.diagnostics.len(), 2);
        assert_eq!(
            flatten_text(&compilation.nodes),
            ".uiButton{top:0}.uiButton a{left:0}"
        );
    }

    #[test]
    fn test_rework_issues_drop_only_offending_items() {
        let source = ".other { top: 0 } .THIS { background: url(../../x.png); left: 0 }";
        let compilation = StyleParser::new(unit(source).with_validate_namespace(true), prod())
            .compile()
            .unwrap();
        assert_eq!(compilation.diagnostics.len(), 2);
        assert_eq!(flatten_text(&compilation.nodes), ".uiButton{left:0}");
    }

    #[test]
    fn test_dropped_rule_still_reports_declaration_issues() {
        let source = ".other { background: url(../../x.png); border: theme(bad) }";
        let compilation = StyleParser::new(unit(source).with_validate_namespace(true), prod())
            .compile()
            .unwrap();
        assert!(compilation.nodes.is_empty());

        let messages: Vec<&str> = compilation
            .diagnostics
            .issues()
            .iter()
            .map(|issue| issue.message.as_str())
            .collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("CSS selector must include '.uiButton' or '.THIS'"));
        assert!(messages[1].contains("escapes the resource directory"));
        assert!(messages[2].contains("Invalid theme reference 'bad'"));
    }

    #[test]
    fn test_quoted_strings_survive_compilation() {
        let source = ".THIS::before { content: \"a    b\" }\n\
                      .THIS[title=\"x  y\"] { content: \"see theme(border) @else\" }";
        let nodes = compile(unit(source)).unwrap();
        assert_eq!(
            nodes,
            vec![OutputNode::text(
                ".uiButton::before{content:\"a    b\"}\
                 .uiButton[title=\"x  y\"]{content:\"see theme(border) @else\"}"
            )]
        );
    }

    #[test]
    fn test_text_flushed_before_dynamic_node() {
        let source = ".THIS { color: red; border: theme(ui.colors.border); top: 0 }";
        let nodes = compile(unit(source)).unwrap();

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].as_text(), Some(".uiButton{color:red;"));
        let theme = nodes[1].as_structural().unwrap();
        assert_eq!(theme.descriptor, DESCRIPTOR_THEME);
        assert_eq!(
            theme.attribute(ATTR_REFERENCES),
            Some(&AttributeValue::List(vec!["ui.colors.border".to_string()]))
        );
        assert_eq!(nodes[2].as_text(), Some(";top:0}"));
    }

    #[test]
    fn test_media_and_verbatim_rules_pass_through() {
        let source = "@media print { .x { top: 0 } }\n\
                      @font-face { font-family: Foo; src: url(foo.woff) }\n\
                      @keyframes spin { from { top: 0 } to { top: 1px } }";
        let nodes = compile(unit(source)).unwrap();
        assert_eq!(
            nodes,
            vec![OutputNode::text(
                "@media print{.x{top: 0}}@font-face{font-family: Foo;src: url(foo.woff)}@keyframes spin{from{top: 0}to{top: 1px}}"
            )]
        );
    }

    #[test]
    fn test_namespace_constants_and_urls() {
        let mut unit = unit(".THIS { color: PRIMARY; background: url(img/bg.png) }");
        unit.namespace = Namespace::new("ui").with_constant("PRIMARY", "#336699");
        let nodes = compile(unit).unwrap();
        assert_eq!(
            flatten_text(&nodes),
            ".uiButton{color:#336699;background:url(/resources/ui/img/bg.png)}"
        );
    }

    #[test]
    fn test_empty_pipeline_leaves_rules_alone() {
        let nodes = StyleParser::new(unit("a { color: PRIMARY }"), prod())
            .with_pipeline(ReworkPipeline::empty())
            .parse()
            .unwrap();
        assert_eq!(flatten_text(&nodes), "a{color:PRIMARY}");
    }

    struct Unreadable;

    impl StylesheetParser for Unreadable {
        fn parse(&self, _text: &str, filename: &str, diagnostics: &mut Diagnostics) -> Option<Stylesheet> {
            diagnostics.record_at("Unreadable stylesheet", Location::new(filename, 1, 1));
            None
        }
    }

    #[test]
    fn test_unreadable_stylesheet_raises_parser_issue() {
        let compilation = StyleParser::new(unit(".THIS { top: 0 }"), prod())
            .with_parser(Unreadable)
            .compile()
            .unwrap();
        assert!(compilation.nodes.is_empty());

        let err = compilation.into_result("button.css").unwrap_err();
        assert!(err.to_string().contains("Unreadable stylesheet (line 1, col 1)"));
    }

    #[test]
    fn test_compilation_stats() {
        let source = ".THIS { top: 0 } @if(A){ .THIS { border: theme(ui.c.b) } } @else{ .THIS { top: 1px } }";
        let (nodes, stats) = StyleParser::new(unit(source).allow_condition("A"), prod())
            .parse_with_stats()
            .unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(stats.rules_visited, 5);
        assert_eq!(stats.conditional_groups, 1);
        // if, else and the theme node
        assert_eq!(stats.structural_nodes, 3);
        // top-level rule, text either side of the theme node, else body
        assert_eq!(stats.text_nodes, 4);
        assert_eq!(stats.issues, 0);
    }

    #[test]
    fn test_trailing_if_counted_as_group() {
        let (_, stats) = StyleParser::new(unit("@if(A){ .THIS { top: 0 } }").allow_condition("A"), prod())
            .parse_with_stats()
            .unwrap();
        assert_eq!(stats.conditional_groups, 1);
    }
}
