//! Output assembly and the conditional frame stack
//!
//! Text is buffered per scope and only becomes a [`OutputNode::Text`] when
//! flushed, which happens before every structural node and at the end of a
//! scope. Conditional branches open frames; `@elseif`/`@else` frames link to
//! the sealed frame before them and end up in its `else` slot.

use crate::error::{CompilerError, Result};
use crate::expression::Expression;
use crate::node::{NodeBuilder, OutputNode, StructuralNode};
use crate::types::{ATTR_ELSE, ATTR_IS_TRUE, DESCRIPTOR_CONDITIONAL};
use std::mem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    If,
    ElseIf,
    Else,
}

impl Branch {
    pub fn directive(self) -> &'static str {
        match self {
            Branch::If => "@if",
            Branch::ElseIf => "@elseif",
            Branch::Else => "@else",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Expression(Expression),
    Always,
}

#[derive(Debug, Default)]
struct Scope {
    body: Vec<OutputNode>,
    buffer: String,
}

impl Scope {
    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            self.body.push(OutputNode::text(mem::take(&mut self.buffer)));
        }
    }
}

#[derive(Debug)]
struct ConditionalFrame {
    branch: Branch,
    condition: Condition,
    scope: Scope,
    /// Fills the else slot of the frame below it when the chain closes
    linked: bool,
    /// The branch block has ended; the frame waits for an `@elseif`/`@else`
    sealed: bool,
    else_branch: Option<StructuralNode>,
}

impl ConditionalFrame {
    fn new(branch: Branch, condition: Condition, linked: bool) -> Self {
        Self {
            branch,
            condition,
            scope: Scope::default(),
            linked,
            sealed: false,
            else_branch: None,
        }
    }
}

/// Builds the conditional node for a finished frame
fn finalize(frame: ConditionalFrame) -> Result<StructuralNode> {
    let ConditionalFrame {
        condition,
        mut scope,
        else_branch,
        ..
    } = frame;
    scope.flush();

    let mut builder = NodeBuilder::new();
    builder.set_descriptor(DESCRIPTOR_CONDITIONAL);
    match condition {
        Condition::Expression(expression) => builder.set_attribute(ATTR_IS_TRUE, expression),
        Condition::Always => builder.set_attribute(ATTR_IS_TRUE, true),
    };
    builder.set_body(scope.body);
    if let Some(else_branch) = else_branch {
        builder.set_attribute(ATTR_ELSE, else_branch);
    }
    builder.build()
}

/// Ordered output for one compilation unit
#[derive(Debug, Default)]
pub struct OutputAssembler {
    root: Scope,
    frames: Vec<ConditionalFrame>,
    conditional_groups: usize,
}

impl OutputAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames currently on the stack, sealed ones included
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn conditional_groups(&self) -> usize {
        self.conditional_groups
    }

    fn active_scope(&mut self) -> &mut Scope {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.scope,
            None => &mut self.root,
        }
    }

    fn has_sealed_top(&self) -> bool {
        self.frames.last().map_or(false, |frame| frame.sealed)
    }

    pub fn append_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.close_chain()?;
        self.active_scope().buffer.push_str(text);
        Ok(())
    }

    /// Flushes pending text so the node lands after it
    pub fn append_structural(&mut self, node: StructuralNode) -> Result<()> {
        self.close_chain()?;
        let scope = self.active_scope();
        scope.flush();
        scope.body.push(OutputNode::Structural(node));
        Ok(())
    }

    pub fn open_if(&mut self, expression: Expression) -> Result<()> {
        self.close_chain()?;
        self.active_scope().flush();
        log::trace!("open @if {} at depth {}", expression, self.frames.len());
        self.frames
            .push(ConditionalFrame::new(Branch::If, Condition::Expression(expression), false));
        Ok(())
    }

    pub fn open_elseif(&mut self, expression: Expression) -> Result<()> {
        self.open_linked(Branch::ElseIf, Condition::Expression(expression))
    }

    pub fn open_else(&mut self) -> Result<()> {
        self.open_linked(Branch::Else, Condition::Always)
    }

    fn open_linked(&mut self, branch: Branch, condition: Condition) -> Result<()> {
        if !self.has_sealed_top() {
            return Err(CompilerError::structure(format!(
                "{} without a preceding @if or @elseif",
                branch.directive()
            )));
        }
        log::trace!("open {} at depth {}", branch.directive(), self.frames.len());
        self.frames.push(ConditionalFrame::new(branch, condition, true));
        Ok(())
    }

    /// End of a conditional block. `@if`/`@elseif` frames are sealed so a
    /// following `@elseif`/`@else` can attach; `@else` closes its chain.
    pub fn end_conditional_block(&mut self) -> Result<()> {
        // a chain nested inside this branch ends with it
        self.close_chain()?;

        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| CompilerError::structure("conditional block closed without an open frame"))?;
        frame.scope.flush();
        frame.sealed = true;

        if frame.branch == Branch::Else {
            self.close_chain()?;
        }
        Ok(())
    }

    /// Pops the sealed chain on top of the stack, nesting each branch in the
    /// else slot of the one before it, and emits the head into the enclosing scope
    pub fn close_chain(&mut self) -> Result<()> {
        let mut pending: Option<StructuralNode> = None;

        while self.has_sealed_top() {
            let Some(mut frame) = self.frames.pop() else {
                break;
            };
            if let Some(node) = pending.take() {
                frame.else_branch = Some(node);
            }
            let linked = frame.linked;
            let node = finalize(frame)?;

            if !linked {
                self.conditional_groups += 1;
                let scope = self.active_scope();
                scope.flush();
                scope.body.push(OutputNode::Structural(node));
                return Ok(());
            }
            pending = Some(node);
        }

        match pending {
            Some(_) => Err(CompilerError::structure(
                "conditional chain has no opening @if",
            )),
            None => Ok(()),
        }
    }

    /// Closes any trailing chain and takes the root body
    pub fn finish(&mut self) -> Result<Vec<OutputNode>> {
        self.close_chain()?;
        if !self.frames.is_empty() {
            return Err(CompilerError::structure(format!(
                "{} conditional block(s) left open at end of input",
                self.frames.len()
            )));
        }
        self.root.flush();
        Ok(mem::take(&mut self.root.body))
    }
}
