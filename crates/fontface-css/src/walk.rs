//! Pre-order traversal of the syntax tree.
//!
//! [`walk`] calls the visitor for a node before its children. Returning
//! [`Walk::Skip`] keeps the walk from descending into the node just visited;
//! returning an error stops the whole walk and hands the error back.

use crate::ast::*;
use crate::Span;

/// What the walker should do after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Visit the node's children.
    Continue,
    /// Do not visit the node's children.
    Skip,
}

/// A borrowed view of any node in the tree.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    StyleSheet(&'a StyleSheet),
    QualifiedRule(&'a QualifiedRule),
    AtRule(&'a AtRule),
    Block(&'a Block),
    Declaration(&'a Declaration),
    Value(&'a Value),
    Raw(&'a Raw),
    /// A component of a value, including nested function arguments.
    Component(&'a ValueNode),
}

impl<'a> Node<'a> {
    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::StyleSheet(n) => n.span,
            Node::QualifiedRule(n) => n.span,
            Node::AtRule(n) => n.span,
            Node::Block(n) => n.span,
            Node::Declaration(n) => n.span,
            Node::Value(n) => n.span,
            Node::Raw(n) => n.span,
            Node::Component(n) => n.span(),
        }
    }
}

impl<'a> From<&'a StyleSheet> for Node<'a> {
    fn from(node: &'a StyleSheet) -> Self {
        Node::StyleSheet(node)
    }
}

impl<'a> From<&'a AtRule> for Node<'a> {
    fn from(node: &'a AtRule) -> Self {
        Node::AtRule(node)
    }
}

impl<'a> From<&'a QualifiedRule> for Node<'a> {
    fn from(node: &'a QualifiedRule) -> Self {
        Node::QualifiedRule(node)
    }
}

impl<'a> From<&'a Declaration> for Node<'a> {
    fn from(node: &'a Declaration) -> Self {
        Node::Declaration(node)
    }
}

impl<'a> From<&'a Rule> for Node<'a> {
    fn from(rule: &'a Rule) -> Self {
        match rule {
            Rule::Qualified(rule) => Node::QualifiedRule(rule),
            Rule::At(rule) => Node::AtRule(rule),
        }
    }
}

impl<'a> From<&'a BlockItem> for Node<'a> {
    fn from(item: &'a BlockItem) -> Self {
        match item {
            BlockItem::Declaration(decl) => Node::Declaration(decl),
            BlockItem::Rule(rule) => Node::QualifiedRule(rule),
            BlockItem::AtRule(rule) => Node::AtRule(rule),
        }
    }
}

impl<'a> From<&'a DeclarationValue> for Node<'a> {
    fn from(value: &'a DeclarationValue) -> Self {
        match value {
            DeclarationValue::Value(value) => Node::Value(value),
            DeclarationValue::Raw(raw) => Node::Raw(raw),
        }
    }
}

/// Walks `root` and everything below it in source order.
///
/// ```
/// use fontface_css::{parse, walk, Node, Walk};
///
/// let sheet = parse("@media print { @font-face { font-family: 'A' } }").stylesheet;
/// let mut names = Vec::new();
/// walk(&sheet, |node| {
///     if let Node::AtRule(rule) = node {
///         names.push(rule.name.to_string());
///     }
///     Ok::<_, ()>(Walk::Continue)
/// })
/// .unwrap();
/// assert_eq!(names, ["media", "font-face"]);
/// ```
pub fn walk<'a, E, F>(root: impl Into<Node<'a>>, mut visit: F) -> Result<(), E>
where
    F: FnMut(Node<'a>) -> Result<Walk, E>,
{
    walk_node(root.into(), &mut visit)
}

/// Walks from any node with a borrowed visitor, so walks can be nested.
pub fn walk_node<'a, E, F>(node: Node<'a>, visit: &mut F) -> Result<(), E>
where
    F: FnMut(Node<'a>) -> Result<Walk, E>,
{
    if visit(node)? == Walk::Skip {
        return Ok(());
    }

    match node {
        Node::StyleSheet(sheet) => {
            for rule in &sheet.rules {
                walk_node(rule.into(), visit)?;
            }
        }
        Node::QualifiedRule(rule) => {
            walk_node(Node::Raw(&rule.prelude), visit)?;
            walk_node(Node::Block(&rule.block), visit)?;
        }
        Node::AtRule(rule) => {
            if let Some(prelude) = &rule.prelude {
                walk_node(Node::Raw(prelude), visit)?;
            }
            if let Some(block) = &rule.block {
                walk_node(Node::Block(block), visit)?;
            }
        }
        Node::Block(block) => {
            for item in &block.items {
                walk_node(item.into(), visit)?;
            }
        }
        Node::Declaration(decl) => walk_node((&decl.value).into(), visit)?,
        Node::Value(value) => {
            for child in &value.children {
                walk_node(Node::Component(child), visit)?;
            }
        }
        Node::Component(component) => match component {
            ValueNode::Function(Function { children, .. })
            | ValueNode::Parentheses(Group { children, .. })
            | ValueNode::Brackets(Group { children, .. }) => {
                for child in children {
                    walk_node(Node::Component(child), visit)?;
                }
            }
            _ => {}
        },
        Node::Raw(_) => {}
    }

    Ok(())
}
