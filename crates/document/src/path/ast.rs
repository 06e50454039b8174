//! Syntax tree of relative path expressions.

use crate::node::{Element, Node};

/// A parsed path: a non-empty sequence of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativePath {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The step was introduced by `//`: it applies to every descendant-or-self
    /// of the current nodes instead of the nodes themselves.
    pub descend: bool,
    pub kind: StepKind,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    /// `.`
    SelfNode,
    /// `..`
    Parent,
    /// Child elements passing the test.
    Select(NodeTest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `*`
    Any,
    Name(String),
}

impl NodeTest {
    pub fn matches(&self, element: &Element) -> bool {
        match self {
            NodeTest::Any => true,
            NodeTest::Name(name) => element.name == *name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    HasAttribute(String),
    AttributeEquals(String, String),
    AttributeNotEquals(String, String),
    HasChild(String),
    ChildTextEquals(String, String),
    /// 1-based position among the candidates sharing a parent.
    Position(usize),
    /// `last()` minus `offset`.
    Last(usize),
}

impl Predicate {
    /// Whether the predicate filters element by element rather than by position.
    pub fn is_positional(&self) -> bool {
        matches!(self, Predicate::Position(_) | Predicate::Last(_))
    }

    /// Tests a non-positional predicate against `element`.
    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Predicate::HasAttribute(name) => element.has_attr(name),
            Predicate::AttributeEquals(name, value) => element.attr(name) == Some(value.as_str()),
            Predicate::AttributeNotEquals(name, value) => {
                element.attr(name).is_some_and(|v| v != value.as_str())
            }
            Predicate::HasChild(name) => element.find_child(name).is_some(),
            Predicate::ChildTextEquals(name, text) => element.children.iter().any(|n| match n {
                Node::Element(child) => child.name == *name && child.text() == *text,
                Node::Text(_) => false,
            }),
            Predicate::Position(_) | Predicate::Last(_) => true,
        }
    }
}
