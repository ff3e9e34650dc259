// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement parsing.
//!
//! Statements only appear inside function bodies:
//! - `;` (empty statement)
//! - `{ ... }` (compound statement)
//! - `return expr?;`
//! - `qualifiers* typename name (= init)?;` (variable declaration)
//! - `expr;` (expression statement)
//!
//! A declaration and an expression can start with the same identifier, so
//! the declaration is tried speculatively first and only commits once it has
//! seen a type name followed by a name.

use crate::ast::{Node, NodeType};

use super::{Parsed, Parser};

impl Parser<'_> {
    /// Parses one statement.
    ///
    /// Returns `None` if nothing at `at` starts a statement.
    pub(super) fn statement(&mut self, at: usize) -> Option<Parsed> {
        stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            if self.is_symbol(at, ';') {
                let token = self.token_or_placeholder(at);
                return Some(Parsed::new(1, Node::leaf(NodeType::EmptyStatement, token)));
            }
            if self.is_symbol(at, '{') {
                return Some(self.compound_statement(at));
            }
            if self.is_word(at, "return") {
                return Some(self.return_statement(at));
            }
            if let Some(declaration) = self.variable_declaration(at) {
                return Some(declaration);
            }
            self.expression_statement(at)
        })
    }

    /// Parses `'{' statement* '}'`. Must be called on a `{`.
    pub(super) fn compound_statement(&mut self, at: usize) -> Parsed {
        if !self.enter_nesting(at) {
            return Parsed::new(self.group_len(at), self.unknown(at));
        }

        let token = self.token_or_placeholder(at);
        let mut pos = at + 1;
        let mut statements = Vec::new();
        loop {
            if self.is_symbol(pos, '}') {
                pos += 1;
                break;
            }
            if self.is_at_end(pos) {
                self.error(pos, "Expected '}'");
                break;
            }
            match self.statement(pos) {
                Some(statement) if statement.consumed > 0 => {
                    pos += statement.consumed;
                    statements.push(statement.node);
                }
                _ => {
                    self.error(pos, "Expected statement");
                    pos += self.statement_recovery_len(pos);
                }
            }
        }

        self.leave_nesting();
        Parsed::new(
            pos - at,
            Node::new(NodeType::CompoundStatement, token, statements),
        )
    }

    /// Parses `'return' expression? ';'`. Must be called on `return`.
    fn return_statement(&mut self, at: usize) -> Parsed {
        let token = self.token_or_placeholder(at);
        let mut pos = at + 1;
        let mut children = Vec::new();
        if !self.is_symbol(pos, ';') {
            if let Some(value) = self.expression(pos) {
                pos += value.consumed;
                children.push(value.node);
            }
        }
        pos += self.expect_symbol(pos, ';');
        Parsed::new(
            pos - at,
            Node::new(NodeType::ReturnStatement, token, children),
        )
    }

    /// Parses a local variable declaration.
    ///
    /// ```text
    /// type_qualifier* typename identifier ( '=' ( braced_init_list | expression ) )? ';'
    /// ```
    ///
    /// Without qualifiers this is speculative until the name has been seen.
    fn variable_declaration(&mut self, at: usize) -> Option<Parsed> {
        let mut children = Vec::new();
        let qualifiers = self.type_qualifiers(at, &mut children);
        let mut pos = at + qualifiers;

        let Some(typename) = self.typename(pos) else {
            if qualifiers == 0 {
                return None;
            }
            self.error(pos, "Expected type name");
            return Some(self.abandoned_declaration(at, pos));
        };
        let Some(name) = self.identifier(pos + typename.consumed) else {
            if qualifiers == 0 {
                return None;
            }
            self.error(pos + typename.consumed, "Expected identifier");
            return Some(self.abandoned_declaration(at, pos + typename.consumed));
        };
        pos += typename.consumed + name.consumed;
        let token = name.node.token.clone();
        children.push(typename.node);
        children.push(name.node);

        if self.is_symbol(pos, '=') {
            pos += 1;
            if self.is_symbol(pos, '{') {
                let init = self.braced_init_list(pos);
                pos += init.consumed;
                children.push(init.node);
            } else if let Some(init) = self.expression(pos) {
                pos += init.consumed;
                children.push(init.node);
            } else {
                self.error(pos, "Expected expression");
                children.push(self.unknown(pos));
                pos += self.expression_len(pos);
            }
        }
        pos += self.expect_symbol(pos, ';');

        Some(Parsed::new(
            pos - at,
            Node::new(NodeType::VariableDeclaration, token, children),
        ))
    }

    /// Skips the rest of a declaration that failed after its qualifiers.
    fn abandoned_declaration(&self, at: usize, pos: usize) -> Parsed {
        let mut end = pos + self.expression_len(pos);
        if self.is_symbol(end, ';') {
            end += 1;
        }
        Parsed::new(end - at, self.unknown(at))
    }

    /// Parses `expression ';'`.
    fn expression_statement(&mut self, at: usize) -> Option<Parsed> {
        let expression = self.expression(at)?;
        let token = self.token_or_placeholder(at);
        let mut pos = at + expression.consumed;
        pos += self.expect_symbol(pos, ';');
        Some(Parsed::new(
            pos - at,
            Node::new(NodeType::ExpressionStatement, token, vec![expression.node]),
        ))
    }

    /// Counts the tokens to skip after an unparseable statement: up to and
    /// including the next `;`, or up to (not including) the `}` that closes
    /// the enclosing block. Always skips at least one token.
    fn statement_recovery_len(&self, at: usize) -> usize {
        let mut depth = 0usize;
        for (offset, token) in self.tokens.iter().skip(at).enumerate() {
            if depth == 0 {
                if token.is_symbol(';') {
                    return offset + 1;
                }
                if token.is_symbol('}') && offset > 0 {
                    return offset;
                }
            }
            if token.is_symbol('(') || token.is_symbol('[') || token.is_symbol('{') {
                depth += 1;
            } else if token.is_symbol(')') || token.is_symbol(']') || token.is_symbol('}') {
                depth = depth.saturating_sub(1);
            }
        }
        self.tokens.len().saturating_sub(at).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{body, parse_errors, parse_ok, parse_source};
    use crate::ast::NodeType;

    #[test]
    fn parse_empty_and_compound() {
        let root = parse_ok("void f() { ; { ; } }");
        let statements = body(&root);
        assert_eq!(statements[0].kind, NodeType::EmptyStatement);
        assert_eq!(statements[1].kind, NodeType::CompoundStatement);
        assert_eq!(statements[1].children.len(), 1);
    }

    #[test]
    fn parse_return() {
        let root = parse_ok("void f() { return; } float g() { return 1.0; }");
        assert!(body(&root)[0].children.is_empty());
        let g_body = root.children[1]
            .child(NodeType::CompoundStatement)
            .map(|b| b.children.clone())
            .unwrap_or_default();
        assert_eq!(g_body[0].kind, NodeType::ReturnStatement);
        assert_eq!(g_body[0].children[0].kind, NodeType::FloatLiteral);
    }

    #[test]
    fn parse_variable_declarations() {
        let root = parse_ok(
            "void f() { float x; const float4 c = {1, 2, 3, 4}; vec<float> v = make(x); }",
        );
        let statements = body(&root);
        assert!(statements.iter().all(|s| s.kind == NodeType::VariableDeclaration));
        assert_eq!(statements[0].token.text, "x");
        assert_eq!(statements[0].children.len(), 2);
        assert_eq!(
            statements[1].children.first().map(|c| c.kind),
            Some(NodeType::TypeQualifier)
        );
        assert_eq!(
            statements[1].children.last().map(|c| c.kind),
            Some(NodeType::BracedInitList)
        );
        assert_eq!(
            statements[2].children.last().map(|c| c.kind),
            Some(NodeType::CallExpression)
        );
    }

    #[test]
    fn identifier_start_can_be_an_expression() {
        let root = parse_ok("void f() { x = y; g(x); }");
        let statements = body(&root);
        assert_eq!(statements[0].kind, NodeType::ExpressionStatement);
        assert_eq!(statements[0].children[0].kind, NodeType::AssignmentExpression);
        assert_eq!(statements[1].children[0].kind, NodeType::CallExpression);
    }

    #[test]
    fn missing_semicolon_after_declaration() {
        let (root, messages) = parse_source("void f() { float x = 1 }");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "Expected ';'");
        assert_eq!(messages[0].span.start.index, 23);
        assert_eq!(body(&root)[0].kind, NodeType::VariableDeclaration);
    }

    #[test]
    fn missing_initializer() {
        assert_eq!(
            parse_errors("void f() { float x = ; }"),
            ["Expected expression"]
        );
    }

    #[test]
    fn qualifier_without_declaration() {
        assert_eq!(parse_errors("void f() { const 1; }"), ["Expected type name"]);
    }

    #[test]
    fn unparseable_statement_recovers_at_semicolon() {
        let (root, messages) = parse_source("void f() { ) x; y = 2; }");
        let texts: Vec<_> = messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["Expected statement"]);
        assert_eq!(body(&root).len(), 1);
    }

    #[test]
    fn unparseable_statement_stops_at_block_end() {
        let (root, messages) = parse_source("void f() { ) } void g() {}");
        assert_eq!(messages.len(), 1);
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn unclosed_block() {
        assert_eq!(parse_errors("void f() { x;"), ["Expected '}'"]);
    }
}
