// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Declaration parsing.
//!
//! This module handles the productions that introduce names:
//! - Function declarations (definitions and prototypes)
//! - Attribute lists such as `[[entry(fragment)]]`
//! - Parameters, type qualifiers and type names

use crate::ast::{Node, NodeType};

use super::{MAX_NESTING_DEPTH, Parsed, Parser};

/// Words accepted as type qualifiers.
const QUALIFIERS: &[&str] = &["in", "out", "inout", "const", "uniform"];

impl Parser<'_> {
    // ========================================================================
    // Function Declarations
    // ========================================================================

    /// Parses a function declaration.
    ///
    /// ```text
    /// attribute_list? type_qualifier* typename identifier
    ///     '(' parameter_list? ')' ( compound_statement | ';' )
    /// ```
    ///
    /// Commits once `typename identifier '('` has been seen.
    pub(super) fn function_declaration(&mut self, at: usize) -> Option<Parsed> {
        let mut pos = at;
        let mut children = Vec::new();

        if let Some(attributes) = self.attribute_list(pos) {
            pos += attributes.consumed;
            children.push(attributes.node);
        }
        pos += self.type_qualifiers(pos, &mut children);

        let typename = self.typename(pos)?;
        let name = self.identifier(pos + typename.consumed)?;
        if !self.is_symbol(pos + typename.consumed + 1, '(') {
            return None;
        }
        pos += typename.consumed + 1;
        let name_token = name.node.token.clone();
        children.push(typename.node);
        children.push(name.node);

        let parameters = self.parameter_list(pos);
        pos += parameters.consumed;
        children.push(parameters.node);

        if self.is_symbol(pos, '{') {
            let body = self.compound_statement(pos);
            pos += body.consumed;
            children.push(body.node);
        } else {
            pos += self.expect_symbol(pos, ';');
        }

        Some(Parsed::new(
            pos - at,
            Node::new(NodeType::FunctionDeclaration, name_token, children),
        ))
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Parses `'[' '[' attribute (',' attribute)* ']' ']'`.
    ///
    /// Commits once both opening brackets have been seen.
    pub(super) fn attribute_list(&mut self, at: usize) -> Option<Parsed> {
        if !(self.is_symbol(at, '[') && self.is_symbol(at + 1, '[')) {
            return None;
        }
        let token = self.joined_token(at, 2);
        let mut pos = at + 2;
        let mut attributes = Vec::new();
        let mut failed = false;
        loop {
            match self.attribute(pos) {
                Some(attribute) => {
                    pos += attribute.consumed;
                    attributes.push(attribute.node);
                }
                None => {
                    self.error(pos, "Expected identifier");
                    failed = true;
                    break;
                }
            }
            if !self.is_symbol(pos, ',') {
                break;
            }
            pos += 1;
        }

        for _ in 0..2 {
            if self.is_symbol(pos, ']') {
                pos += 1;
                continue;
            }
            if !failed {
                self.error(pos, "Expected ']'");
                failed = true;
            }
            pos += self.recovery_len(pos, ']');
            if !self.is_symbol(pos, ']') {
                break;
            }
        }

        Some(Parsed::new(
            pos - at,
            Node::new(NodeType::AttributeList, token, attributes),
        ))
    }

    /// Parses `identifier ( '(' argument_list? ')' )?`.
    fn attribute(&mut self, at: usize) -> Option<Parsed> {
        let name = self.identifier(at)?;
        let mut consumed = name.consumed;
        let mut children = Vec::new();
        if self.is_symbol(at + consumed, '(') {
            let arguments = self.argument_list(at + consumed);
            consumed += arguments.consumed;
            children.push(arguments.node);
        }
        Some(Parsed::new(
            consumed,
            Node::new(NodeType::Attribute, name.node.token, children),
        ))
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Parses `'(' parameter_list? ')'` where
    /// `parameter_list := parameter (',' parameter)*`.
    ///
    /// Must be called on a `(`.
    pub(super) fn parameter_list(&mut self, at: usize) -> Parsed {
        let token = self.token_or_placeholder(at);
        let mut pos = at + 1;
        let mut parameters = Vec::new();
        let mut failed = false;

        if !self.is_symbol(pos, ')') {
            loop {
                match self.parameter(pos) {
                    Some(parameter) => {
                        pos += parameter.consumed;
                        parameters.push(parameter.node);
                    }
                    None => {
                        self.error(pos, "Expected parameter");
                        failed = true;
                        break;
                    }
                }
                if !self.is_symbol(pos, ',') {
                    break;
                }
                pos += 1;
            }
        }

        if !failed && !self.is_symbol(pos, ')') {
            self.error(pos, "Expected ')'");
            failed = true;
        }
        if failed {
            pos += self.recovery_len(pos, ')');
        }
        if self.is_symbol(pos, ')') {
            pos += 1;
        }

        Parsed::new(
            pos - at,
            Node::new(NodeType::ParameterList, token, parameters),
        )
    }

    /// Parses `type_qualifier* typename identifier`.
    pub(super) fn parameter(&mut self, at: usize) -> Option<Parsed> {
        let mut children = Vec::new();
        let mut pos = at + self.type_qualifiers(at, &mut children);
        let typename = self.typename(pos)?;
        pos += typename.consumed;
        let name = self.identifier(pos)?;
        pos += name.consumed;
        let token = name.node.token.clone();
        children.push(typename.node);
        children.push(name.node);
        Some(Parsed::new(
            pos - at,
            Node::new(NodeType::Parameter, token, children),
        ))
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Parses one `type_qualifier`.
    pub(super) fn type_qualifier(&self, at: usize) -> Option<Parsed> {
        let token = self.token(at)?;
        QUALIFIERS
            .iter()
            .any(|q| token.is_word(q))
            .then(|| Parsed::new(1, Node::leaf(NodeType::TypeQualifier, token.clone())))
    }

    /// Parses `type_qualifier*` into `children`, returning how many tokens
    /// were used.
    pub(super) fn type_qualifiers(&self, at: usize, children: &mut Vec<Node>) -> usize {
        let mut pos = at;
        while let Some(qualifier) = self.type_qualifier(pos) {
            pos += qualifier.consumed;
            children.push(qualifier.node);
        }
        pos - at
    }

    /// Parses `identifier ( '<' typename (',' typename)* '>' )?`.
    ///
    /// Never reports: when the generic part does not close, the type name is
    /// the bare identifier and the caller decides what the rest means.
    pub(super) fn typename(&self, at: usize) -> Option<Parsed> {
        self.typename_nested(at, 0)
    }

    fn typename_nested(&self, at: usize, depth: usize) -> Option<Parsed> {
        let name = self.identifier(at)?;
        let token = name.node.token;
        if depth < MAX_NESTING_DEPTH && self.is_symbol(at + 1, '<') {
            if let Some((consumed, arguments)) = self.generic_arguments(at + 1, depth + 1) {
                return Some(Parsed::new(
                    1 + consumed,
                    Node::new(NodeType::Typename, token, arguments),
                ));
            }
        }
        Some(Parsed::new(1, Node::leaf(NodeType::Typename, token)))
    }

    /// Parses `'<' typename (',' typename)* '>'` starting at the `<`.
    fn generic_arguments(&self, at: usize, depth: usize) -> Option<(usize, Vec<Node>)> {
        let mut pos = at + 1;
        let mut arguments = Vec::new();
        loop {
            let argument = self.typename_nested(pos, depth)?;
            pos += argument.consumed;
            arguments.push(argument.node);
            if !self.is_symbol(pos, ',') {
                break;
            }
            pos += 1;
        }
        self.is_symbol(pos, '>')
            .then(|| (pos + 1 - at, arguments))
    }
}
