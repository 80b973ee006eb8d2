//! Syntax tree types for CSS.
//!
//! The tree keeps only what rule/declaration consumers need: at-rule names,
//! declaration properties and structured values. Selectors and at-rule
//! preludes are kept as raw text.

use crate::Span;
use smol_str::SmolStr;

/// A parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    /// Top-level rules in source order.
    pub rules: Vec<Rule>,
    /// The span of the entire stylesheet.
    pub span: Span,
}

/// A top-level rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// A style rule such as `body { ... }`.
    Qualified(QualifiedRule),
    /// An at-rule such as `@font-face { ... }` or `@charset "utf-8";`.
    At(AtRule),
}

impl Rule {
    /// Returns the span of this rule.
    pub fn span(&self) -> Span {
        match self {
            Rule::Qualified(rule) => rule.span,
            Rule::At(rule) => rule.span,
        }
    }
}

/// A style rule: a prelude (selector list) followed by a block.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedRule {
    /// The selector text, unparsed.
    pub prelude: Raw,
    /// The rule body.
    pub block: Block,
    /// The span of the rule.
    pub span: Span,
}

/// An at-rule.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    /// The name without the leading `@`, with its case preserved.
    pub name: SmolStr,
    /// Everything between the name and the block or `;`, if non-empty.
    pub prelude: Option<Raw>,
    /// The `{ ... }` body, absent for statement at-rules like `@import`.
    pub block: Option<Block>,
    /// The span of the at-rule.
    pub span: Span,
}

/// A `{ ... }` body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    /// The items in source order.
    pub items: Vec<BlockItem>,
    /// The span including the braces.
    pub span: Span,
}

/// An item inside a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockItem {
    /// A `property: value` declaration.
    Declaration(Declaration),
    /// A nested style rule.
    Rule(QualifiedRule),
    /// A nested at-rule.
    AtRule(AtRule),
}

impl BlockItem {
    /// Returns the span of this item.
    pub fn span(&self) -> Span {
        match self {
            BlockItem::Declaration(decl) => decl.span,
            BlockItem::Rule(rule) => rule.span,
            BlockItem::AtRule(rule) => rule.span,
        }
    }
}

/// A declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// The property name exactly as written.
    pub property: SmolStr,
    /// The value.
    pub value: DeclarationValue,
    /// Whether the declaration ends with `!important`.
    pub important: bool,
    /// The span of the declaration, excluding the trailing `;`.
    pub span: Span,
}

impl Declaration {
    /// Returns true for custom properties (`--name`).
    pub fn is_custom_property(&self) -> bool {
        self.property.starts_with("--")
    }
}

/// The value of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationValue {
    /// A value the value grammar understood.
    Value(Value),
    /// Custom property values and values containing tokens with no place in
    /// the value grammar.
    Raw(Raw),
}

impl DeclarationValue {
    /// Returns the span of this value.
    pub fn span(&self) -> Span {
        match self {
            DeclarationValue::Value(value) => value.span,
            DeclarationValue::Raw(raw) => raw.span,
        }
    }

    /// Returns a short name for the shape of this value.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DeclarationValue::Value(_) => "Value",
            DeclarationValue::Raw(_) => "Raw",
        }
    }
}

/// Unparsed source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw {
    /// The trimmed source text.
    pub value: String,
    /// The span of the text.
    pub span: Span,
}

/// A structured value: an ordered list of component nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Value {
    /// The component nodes, whitespace excluded.
    pub children: Vec<ValueNode>,
    /// The span of the value.
    pub span: Span,
}

/// A component of a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    /// A keyword such as `swap` or `sans-serif`.
    Identifier(Identifier),
    /// A quoted string.
    String(StringLiteral),
    /// A unitless number.
    Number(Numeric),
    /// A number followed by `%`.
    Percentage(Numeric),
    /// A number with a unit, such as `1.5em`.
    Dimension(Dimension),
    /// A `#name` token.
    Hash(Identifier),
    /// An unquoted `url(...)`.
    Url(Url),
    /// A `unicode-range` token.
    UnicodeRange(UnicodeRangeNode),
    /// A separator: `,`, `/`, `+`, `-`, `*` and friends.
    Operator(Operator),
    /// A function call such as `format('woff2')`.
    Function(Function),
    /// A parenthesized group.
    Parentheses(Group),
    /// A bracketed group.
    Brackets(Group),
}

impl ValueNode {
    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match self {
            ValueNode::Identifier(n) | ValueNode::Hash(n) => n.span,
            ValueNode::String(n) => n.span,
            ValueNode::Number(n) | ValueNode::Percentage(n) => n.span,
            ValueNode::Dimension(n) => n.span,
            ValueNode::Url(n) => n.span,
            ValueNode::UnicodeRange(n) => n.span,
            ValueNode::Operator(n) => n.span,
            ValueNode::Function(n) => n.span,
            ValueNode::Parentheses(n) | ValueNode::Brackets(n) => n.span,
        }
    }

    /// Returns the node kind name, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueNode::Identifier(_) => "Identifier",
            ValueNode::String(_) => "String",
            ValueNode::Number(_) => "Number",
            ValueNode::Percentage(_) => "Percentage",
            ValueNode::Dimension(_) => "Dimension",
            ValueNode::Hash(_) => "Hash",
            ValueNode::Url(_) => "Url",
            ValueNode::UnicodeRange(_) => "UnicodeRange",
            ValueNode::Operator(_) => "Operator",
            ValueNode::Function(_) => "Function",
            ValueNode::Parentheses(_) => "Parentheses",
            ValueNode::Brackets(_) => "Brackets",
        }
    }
}

/// An identifier or hash name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// The name as written (without `#` for hashes).
    pub name: SmolStr,
    pub span: Span,
}

/// A quoted string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// The decoded contents: quotes removed and escapes resolved.
    pub value: String,
    pub span: Span,
}

/// A number or percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct Numeric {
    pub value: f64,
    pub span: Span,
}

/// A number with a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub value: f64,
    pub unit: SmolStr,
    pub span: Span,
}

/// An unquoted `url(...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    /// The URL between the parentheses, whitespace trimmed.
    pub value: String,
    pub span: Span,
}

/// A `unicode-range` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnicodeRangeNode {
    /// The token text exactly as written, e.g. `U+0000-00FF`.
    pub value: SmolStr,
    pub span: Span,
}

/// A value separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub value: char,
    pub span: Span,
}

/// A function call.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// The function name without `(`.
    pub name: SmolStr,
    pub children: Vec<ValueNode>,
    pub span: Span,
}

/// A parenthesized or bracketed group.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub children: Vec<ValueNode>,
    pub span: Span,
}
