//! Rework stages applied to selectors and declarations before emission
//!
//! Static stages map one item to zero or more replacements; stage `n + 1`
//! only sees what stage `n` produced, so a stage may drop or add items as
//! well as rewrite them. Dynamic stages may replace a declaration with a
//! structural node; the first one that matches wins.

mod class_name;
mod image_urls;
mod namespace_constants;
mod theme_function;

pub use class_name::ClassNameRework;
pub use image_urls::ImageUrlRework;
pub use namespace_constants::NamespaceConstantsRework;
pub use theme_function::ThemeFunctionRework;

use crate::ast::{Declaration, Selector};
use crate::diagnostics::Diagnostics;
use crate::error::Issue;
use crate::node::StructuralNode;
use crate::types::StyleUnit;
use crate::CompilerOptions;

/// Replacements for one input item, plus the issues raised producing them
#[derive(Debug, Clone, PartialEq)]
pub struct ReworkResult<T> {
    pub items: Vec<T>,
    pub issues: Vec<Issue>,
}

impl<T> ReworkResult<T> {
    pub fn keep(item: T) -> Self {
        Self {
            items: vec![item],
            issues: Vec::new(),
        }
    }

    pub fn replace(items: Vec<T>) -> Self {
        Self {
            items,
            issues: Vec::new(),
        }
    }

    /// Drop the item, recording why
    pub fn reject(issue: Issue) -> Self {
        Self {
            items: Vec::new(),
            issues: vec![issue],
        }
    }
}

pub trait Rework<T> {
    fn name(&self) -> &'static str;

    fn perform(&self, item: &T) -> ReworkResult<T>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DynamicOutcome {
    NoMatch,
    Matched(StructuralNode),
    /// The pattern matched but its arguments are unusable; the declaration
    /// falls back to plain text
    Invalid(Issue),
}

pub trait DynamicRework<T> {
    fn name(&self) -> &'static str;

    fn perform(&self, item: &T) -> DynamicOutcome;
}

/// The ordered rework stages for one compilation unit
pub struct ReworkPipeline {
    selector_rework: Vec<Box<dyn Rework<Selector>>>,
    declaration_rework: Vec<Box<dyn Rework<Declaration>>>,
    dynamic_declaration_rework: Vec<Box<dyn DynamicRework<Declaration>>>,
}

impl ReworkPipeline {
    pub fn empty() -> Self {
        Self {
            selector_rework: Vec::new(),
            declaration_rework: Vec::new(),
            dynamic_declaration_rework: Vec::new(),
        }
    }

    /// Built-in stages: class scoping; namespace constants then image urls;
    /// the theme function as the only dynamic stage
    pub fn for_unit(unit: &StyleUnit, options: &CompilerOptions) -> Self {
        let mut pipeline = Self::empty();
        pipeline.push_selector_rework(ClassNameRework::new(
            &unit.component_class,
            unit.validate_namespace,
        ));
        pipeline.push_declaration_rework(NamespaceConstantsRework::new(unit.namespace.clone()));
        pipeline.push_declaration_rework(ImageUrlRework::new(
            &options.resource_root,
            &unit.namespace.name,
        ));
        pipeline.push_dynamic_rework(ThemeFunctionRework::new());
        pipeline
    }

    pub fn push_selector_rework(&mut self, rework: impl Rework<Selector> + 'static) {
        self.selector_rework.push(Box::new(rework));
    }

    pub fn push_declaration_rework(&mut self, rework: impl Rework<Declaration> + 'static) {
        self.declaration_rework.push(Box::new(rework));
    }

    pub fn push_dynamic_rework(&mut self, rework: impl DynamicRework<Declaration> + 'static) {
        self.dynamic_declaration_rework.push(Box::new(rework));
    }

    /// Dynamic stages registered before this one take precedence
    pub fn insert_dynamic_rework(
        &mut self,
        index: usize,
        rework: impl DynamicRework<Declaration> + 'static,
    ) {
        let index = index.min(self.dynamic_declaration_rework.len());
        self.dynamic_declaration_rework.insert(index, Box::new(rework));
    }

    pub fn rework_selectors(&self, selectors: &[Selector], diagnostics: &mut Diagnostics) -> Vec<Selector> {
        run_stages(&self.selector_rework, selectors, diagnostics)
    }

    pub fn rework_declarations(
        &self,
        declarations: &[Declaration],
        diagnostics: &mut Diagnostics,
    ) -> Vec<Declaration> {
        run_stages(&self.declaration_rework, declarations, diagnostics)
    }

    /// Structural replacement for `declaration` from the first matching dynamic stage
    pub fn try_match(&self, declaration: &Declaration, diagnostics: &mut Diagnostics) -> Option<StructuralNode> {
        for rework in &self.dynamic_declaration_rework {
            match rework.perform(declaration) {
                DynamicOutcome::NoMatch => continue,
                DynamicOutcome::Matched(node) => {
                    log::trace!("{} replaced '{}'", rework.name(), declaration.property);
                    return Some(node);
                }
                DynamicOutcome::Invalid(issue) => {
                    diagnostics.record(issue);
                    return None;
                }
            }
        }
        None
    }
}

fn run_stages<T: Clone>(stages: &[Box<dyn Rework<T>>], items: &[T], diagnostics: &mut Diagnostics) -> Vec<T> {
    let mut items = items.to_vec();

    for stage in stages {
        let mut reworked = Vec::with_capacity(items.len());
        for item in &items {
            let result = stage.perform(item);
            for issue in result.issues {
                diagnostics.record(issue);
            }
            reworked.extend(result.items);
        }
        log::trace!("{}: {} -> {} items", stage.name(), items.len(), reworked.len());
        items = reworked;
    }

    items
}
