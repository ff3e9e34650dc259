// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Syntax tree produced by the parser.
//!
//! The tree is uniform: every node is a [`Node`] with a [`NodeType`], the
//! token it originates from, and an ordered list of children. Each node owns
//! its children; there is no sharing and there are no cycles.
//!
//! The child layout per node type is:
//!
//! | Node type | Token | Children |
//! |-----------|-------|----------|
//! | `TranslationUnit` | first token | `FunctionDeclaration`* |
//! | `FunctionDeclaration` | name | `AttributeList`? `TypeQualifier`* `Typename` `Identifier` `ParameterList` `CompoundStatement`? |
//! | `AttributeList` | `[` | `Attribute`+ |
//! | `Attribute` | name | `ArgumentList`? |
//! | `ParameterList` | `(` | `Parameter`* |
//! | `Parameter` | name | `TypeQualifier`* `Typename` `Identifier` |
//! | `Typename` | name | `Typename`* (generic arguments) |
//! | `VariableDeclaration` | name | `TypeQualifier`* `Typename` `Identifier` initializer? |
//! | `BinaryExpression` | operator | lhs rhs |
//! | `AssignmentExpression` | `=` | target value |
//! | `UnaryExpression` | operator | operand |
//! | `CallExpression` | `(` | callee `ArgumentList` |
//! | `MemberExpression` | `.` | object `Identifier` |
//! | `IndexExpression` | `[` | object index |
//! | `ReturnStatement` | `return` | value? |
//! | `ExpressionStatement` | first token | expression |
//! | `CompoundStatement` | `{` | statements |
//! | `BracedInitList` | `{` | initializers |
//! | `ArgumentList` | `(` | expressions |
//!
//! Parse errors that cannot be represented leave an [`NodeType::Unknown`]
//! node in place of the missing construct; a diagnostic is always reported
//! alongside.

use std::fmt;

use crate::source_analysis::{SourceSpan, Token};

/// The grammar production a node was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Root of a file.
    TranslationUnit,
    /// A function definition or prototype.
    FunctionDeclaration,
    /// `[[a, b(1)]]`
    AttributeList,
    /// One entry of an attribute list.
    Attribute,
    /// `in`, `out`, `inout`, `const`, `uniform`.
    TypeQualifier,
    /// A type name with optional generic arguments.
    Typename,
    /// A name.
    Identifier,
    /// Parameters of a function declaration.
    ParameterList,
    /// One declared parameter.
    Parameter,
    /// Arguments of a call or attribute.
    ArgumentList,
    /// `{1, 2, {3}}`
    BracedInitList,
    /// Any integer radix.
    IntegerLiteral,
    /// Decimal or hex float.
    FloatLiteral,
    /// `true` or `false`.
    BoolLiteral,
    /// A string literal (text without quotes).
    StringLiteral,
    /// A lone `;`.
    EmptyStatement,
    /// `{ ... }`
    CompoundStatement,
    /// `return x;`
    ReturnStatement,
    /// `f(x);`
    ExpressionStatement,
    /// `float x = 1.0;`
    VariableDeclaration,
    /// `a + b`
    BinaryExpression,
    /// `-a`
    UnaryExpression,
    /// `a = b`
    AssignmentExpression,
    /// `f(a)`
    CallExpression,
    /// `a.b`
    MemberExpression,
    /// `a[b]`
    IndexExpression,
    /// Placeholder left by error recovery.
    Unknown,
}

impl NodeType {
    /// Returns `true` for literal node types.
    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IntegerLiteral | Self::FloatLiteral | Self::BoolLiteral | Self::StringLiteral
        )
    }
}

/// A syntax tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Production.
    pub kind: NodeType,
    /// The token the node originates from.
    pub token: Token,
    /// Ordered children.
    pub children: Vec<Node>,
}

impl Node {
    /// Creates a childless node.
    #[must_use]
    pub fn leaf(kind: NodeType, token: Token) -> Self {
        Self {
            kind,
            token,
            children: Vec::new(),
        }
    }

    /// Creates a node with children.
    #[must_use]
    pub fn new(kind: NodeType, token: Token, children: Vec<Node>) -> Self {
        Self {
            kind,
            token,
            children,
        }
    }

    /// The span of the originating token.
    #[must_use]
    pub fn span(&self) -> SourceSpan {
        self.token.span
    }

    /// The span covering this node's token and all descendants.
    #[must_use]
    pub fn full_span(&self) -> SourceSpan {
        self.children
            .iter()
            .fold(self.token.span, |span, child| span.merge(child.full_span()))
    }

    /// Returns the first child of `kind`.
    #[must_use]
    pub fn child(&self, kind: NodeType) -> Option<&Node> {
        self.children.iter().find(|child| child.kind == kind)
    }

    /// Iterates over the children of `kind`.
    pub fn children_of(&self, kind: NodeType) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(move |child| child.kind == kind)
    }

    /// Visits this node and every descendant in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Returns `true` if this node or any descendant is [`NodeType::Unknown`].
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.kind == NodeType::Unknown || self.children.iter().any(Node::has_errors)
    }

    /// Renders the tree as an indented outline, one node per line.
    #[must_use]
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, 0);
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        use std::fmt::Write as _;

        let _ = writeln!(
            out,
            "{:indent$}{self}",
            "",
            indent = depth * 2
        );
        for child in &self.children {
            child.write_outline(out, depth + 1);
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.token.span.start;
        write!(
            f,
            "{:?} {:?} @{}:{}",
            self.kind,
            self.token.text.as_str(),
            start.line + 1,
            start.column + 1
        )
    }
}
