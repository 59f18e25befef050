//! Output nodes: literal text fragments and structural references

use crate::error::{CompilerError, Result};
use crate::expression::Expression;
use crate::types::{ATTR_IS_TRUE, DESCRIPTOR_CONDITIONAL};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputNode {
    Text { content: String },
    Structural(StructuralNode),
}

impl OutputNode {
    pub fn text(content: impl Into<String>) -> Self {
        OutputNode::Text {
            content: content.into(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutputNode::Text { content } => Some(content),
            OutputNode::Structural(_) => None,
        }
    }

    pub fn as_structural(&self) -> Option<&StructuralNode> {
        match self {
            OutputNode::Structural(node) => Some(node),
            OutputNode::Text { .. } => None,
        }
    }
}

/// Reference to another compiled unit, e.g. a conditional wrapper or a theme lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuralNode {
    pub descriptor: String,
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<OutputNode>>,
}

impl StructuralNode {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
    Expression(Expression),
    Node(Box<StructuralNode>),
}

impl AttributeValue {
    pub fn as_node(&self) -> Option<&StructuralNode> {
        match self {
            AttributeValue::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<Expression> for AttributeValue {
    fn from(value: Expression) -> Self {
        AttributeValue::Expression(value)
    }
}

impl From<StructuralNode> for AttributeValue {
    fn from(value: StructuralNode) -> Self {
        AttributeValue::Node(Box::new(value))
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        AttributeValue::List(value)
    }
}

/// Incremental builder for [`StructuralNode`], validated on [`NodeBuilder::build`]
#[derive(Debug, Default, Clone)]
pub struct NodeBuilder {
    descriptor: Option<String>,
    attributes: BTreeMap<String, AttributeValue>,
    body: Option<Vec<OutputNode>>,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_descriptor(&mut self, descriptor: impl Into<String>) -> &mut Self {
        self.descriptor = Some(descriptor.into());
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> &mut Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn set_body(&mut self, body: Vec<OutputNode>) -> &mut Self {
        self.body = Some(body);
        self
    }

    pub fn build(self) -> Result<StructuralNode> {
        let descriptor = self
            .descriptor
            .filter(|d| !d.is_empty())
            .ok_or_else(|| CompilerError::node_build("structural node has no descriptor"))?;

        if descriptor == DESCRIPTOR_CONDITIONAL {
            match self.attributes.get(ATTR_IS_TRUE) {
                Some(AttributeValue::Expression(_)) | Some(AttributeValue::Bool(_)) => {}
                Some(_) => {
                    return Err(CompilerError::node_build(format!(
                        "attribute '{}' of a conditional must be an expression or boolean",
                        ATTR_IS_TRUE
                    )))
                }
                None => {
                    return Err(CompilerError::node_build(format!(
                        "conditional node is missing attribute '{}'",
                        ATTR_IS_TRUE
                    )))
                }
            }
        }

        Ok(StructuralNode {
            descriptor,
            attributes: self.attributes,
            body: self.body,
        })
    }
}

/// Concatenated content of every text node, recursing into structural bodies
pub fn flatten_text(nodes: &[OutputNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            OutputNode::Text { content } => out.push_str(content),
            OutputNode::Structural(structural) => {
                if let Some(body) = &structural.body {
                    out.push_str(&flatten_text(body));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ATTR_ELSE;

    #[test]
    fn test_build_requires_descriptor() {
        let result = NodeBuilder::new().build();
        assert!(matches!(result, Err(CompilerError::NodeBuild { .. })));
    }

    #[test]
    fn test_conditional_requires_condition() {
        let mut builder = NodeBuilder::new();
        builder.set_descriptor(DESCRIPTOR_CONDITIONAL);
        assert!(builder.clone().build().is_err());

        builder.set_attribute(ATTR_IS_TRUE, "yes");
        assert!(builder.clone().build().is_err());

        builder.set_attribute(ATTR_IS_TRUE, true);
        let node = builder.build().unwrap();
        assert_eq!(node.attribute(ATTR_IS_TRUE), Some(&AttributeValue::Bool(true)));
    }

    #[test]
    fn test_nested_else_attribute() {
        let mut inner = NodeBuilder::new();
        inner.set_descriptor(DESCRIPTOR_CONDITIONAL).set_attribute(ATTR_IS_TRUE, true);
        let inner = inner.build().unwrap();

        let mut outer = NodeBuilder::new();
        outer
            .set_descriptor(DESCRIPTOR_CONDITIONAL)
            .set_attribute(ATTR_IS_TRUE, false)
            .set_attribute(ATTR_ELSE, inner.clone());
        let outer = outer.build().unwrap();

        assert_eq!(outer.attribute(ATTR_ELSE).and_then(AttributeValue::as_node), Some(&inner));
    }

    #[test]
    fn test_flatten_text() {
        let mut builder = NodeBuilder::new();
        builder
            .set_descriptor(DESCRIPTOR_CONDITIONAL)
            .set_attribute(ATTR_IS_TRUE, true)
            .set_body(vec![OutputNode::text("b{}")]);
        let nodes = vec![
            OutputNode::text("a{}"),
            OutputNode::Structural(builder.build().unwrap()),
        ];
        assert_eq!(flatten_text(&nodes), "a{}b{}");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(OutputNode::text("a{}")).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["content"], "a{}");
    }
}
