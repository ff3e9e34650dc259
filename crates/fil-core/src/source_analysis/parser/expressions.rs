// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing.
//!
//! ```text
//! expression := assignment
//! assignment := binary ( '=' assignment )?
//! binary     := unary ( binary_op unary )*      (precedence climbing)
//! unary      := ( '-' | '+' | '!' ) unary | postfix
//! postfix    := primary ( argument_list | '.' identifier | '[' expression ']' )*
//! primary    := literal | identifier | '(' expression ')'
//! ```
//!
//! Parenthesised expressions do not get a node of their own; grouping is
//! already expressed by the tree shape.

use crate::ast::{Node, NodeType};
use crate::source_analysis::TokenClass;

use super::{Parsed, Parser, binary_precedence};

/// Prefix operators.
const UNARY_OPERATORS: [char; 3] = ['-', '+', '!'];

impl Parser<'_> {
    // ========================================================================
    // Expression Parsing
    // ========================================================================

    /// Parses any expression.
    ///
    /// Returns `None` without reporting if nothing at `at` starts an
    /// expression. Uses `stacker::maybe_grow` to extend the stack on the heap
    /// if remaining stack space falls below 32 KiB.
    pub(super) fn expression(&mut self, at: usize) -> Option<Parsed> {
        stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            if !self.enter_nesting(at) {
                return Some(Parsed::new(self.expression_len(at), self.unknown(at)));
            }
            let result = self.assignment(at);
            self.leave_nesting();
            result
        })
    }

    /// Parses `binary ( '=' expression )?`. Assignment is right-associative.
    fn assignment(&mut self, at: usize) -> Option<Parsed> {
        let target = self.binary(at, 1)?;
        let mut pos = at + target.consumed;

        let is_assign = self
            .operator_at(pos)
            .is_some_and(|(op, width)| op == "=" && width == 1);
        if !is_assign {
            return Some(target);
        }

        let token = self.token_or_placeholder(pos);
        pos += 1;
        let value = if let Some(value) = self.expression(pos) {
            pos += value.consumed;
            value.node
        } else {
            self.error(pos, "Expected expression");
            self.unknown(pos)
        };

        Some(Parsed::new(
            pos - at,
            Node::new(
                NodeType::AssignmentExpression,
                token,
                vec![target.node, value],
            ),
        ))
    }

    /// Parses binary operators binding at least as tight as `min_precedence`.
    fn binary(&mut self, at: usize, min_precedence: u8) -> Option<Parsed> {
        let lhs = self.unary(at)?;
        let mut pos = at + lhs.consumed;
        let mut node = lhs.node;

        while let Some((op, width)) = self.operator_at(pos) {
            let Some(precedence) = binary_precedence(&op) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            let token = self.joined_token(pos, width);
            pos += width;

            let rhs = if let Some(rhs) = self.binary(pos, precedence + 1) {
                pos += rhs.consumed;
                rhs.node
            } else {
                self.error(pos, "Expected expression");
                self.unknown(pos)
            };
            node = Node::new(NodeType::BinaryExpression, token, vec![node, rhs]);
        }

        Some(Parsed::new(pos - at, node))
    }

    /// Parses prefix operators.
    fn unary(&mut self, at: usize) -> Option<Parsed> {
        if !UNARY_OPERATORS.iter().any(|&op| self.is_symbol(at, op)) {
            return self.postfix(at);
        }
        if !self.enter_nesting(at) {
            return Some(Parsed::new(self.expression_len(at), self.unknown(at)));
        }

        let token = self.token_or_placeholder(at);
        let mut pos = at + 1;
        let operand = if let Some(operand) = self.unary(pos) {
            pos += operand.consumed;
            operand.node
        } else {
            self.error(pos, "Expected expression");
            self.unknown(pos)
        };
        self.leave_nesting();

        Some(Parsed::new(
            pos - at,
            Node::new(NodeType::UnaryExpression, token, vec![operand]),
        ))
    }

    /// Parses a primary followed by calls, member accesses and indexing.
    fn postfix(&mut self, at: usize) -> Option<Parsed> {
        let primary = self.primary(at)?;
        let mut pos = at + primary.consumed;
        let mut node = primary.node;

        loop {
            if self.is_symbol(pos, '(') {
                let token = self.token_or_placeholder(pos);
                let arguments = self.argument_list(pos);
                pos += arguments.consumed;
                node = Node::new(NodeType::CallExpression, token, vec![node, arguments.node]);
            } else if self.is_symbol(pos, '.') {
                let token = self.token_or_placeholder(pos);
                if let Some(member) = self.identifier(pos + 1) {
                    pos += 1 + member.consumed;
                    node = Node::new(NodeType::MemberExpression, token, vec![node, member.node]);
                } else {
                    self.error(pos + 1, "Expected identifier");
                    let missing = self.unknown(pos + 1);
                    pos += 1;
                    node = Node::new(NodeType::MemberExpression, token, vec![node, missing]);
                    break;
                }
            } else if self.is_symbol(pos, '[') {
                let token = self.token_or_placeholder(pos);
                pos += 1;
                let index = if let Some(index) = self.expression(pos) {
                    pos += index.consumed;
                    if !self.is_symbol(pos, ']') {
                        self.error(pos, "Expected ']'");
                        pos += self.recovery_len(pos, ']');
                    }
                    index.node
                } else {
                    self.error(pos, "Expected expression");
                    let missing = self.unknown(pos);
                    pos += self.recovery_len(pos, ']');
                    missing
                };
                if self.is_symbol(pos, ']') {
                    pos += 1;
                }
                node = Node::new(NodeType::IndexExpression, token, vec![node, index]);
            } else {
                break;
            }
        }

        Some(Parsed::new(pos - at, node))
    }

    /// Parses a literal, a name, or a parenthesised expression.
    fn primary(&mut self, at: usize) -> Option<Parsed> {
        if let Some(literal) = self.literal(at) {
            return Some(literal);
        }
        if let Some(identifier) = self.identifier(at) {
            return Some(identifier);
        }
        if !self.is_symbol(at, '(') {
            return None;
        }

        let mut pos = at + 1;
        let node = if let Some(inner) = self.expression(pos) {
            pos += inner.consumed;
            if !self.is_symbol(pos, ')') {
                self.error(pos, "Expected ')'");
                pos += self.recovery_len(pos, ')');
            }
            inner.node
        } else {
            self.error(pos, "Expected expression");
            pos += self.recovery_len(pos, ')');
            self.unknown(at)
        };
        if self.is_symbol(pos, ')') {
            pos += 1;
        }
        Some(Parsed::new(pos - at, node))
    }

    fn literal(&self, at: usize) -> Option<Parsed> {
        let token = self.token(at)?;
        let kind = match token.class {
            class if class.is_integer() => NodeType::IntegerLiteral,
            class if class.is_float() => NodeType::FloatLiteral,
            TokenClass::String => NodeType::StringLiteral,
            TokenClass::Identifier if token.is_word("true") || token.is_word("false") => {
                NodeType::BoolLiteral
            }
            _ => return None,
        };
        Some(Parsed::new(1, Node::leaf(kind, token.clone())))
    }

    // ========================================================================
    // Lists
    // ========================================================================

    /// Parses `'(' ( expression (',' expression)* )? ')'`. Must be called on
    /// a `(`.
    pub(super) fn argument_list(&mut self, at: usize) -> Parsed {
        let token = self.token_or_placeholder(at);
        let mut pos = at + 1;
        let mut arguments = Vec::new();
        let mut failed = false;

        if !self.is_symbol(pos, ')') {
            loop {
                if let Some(argument) = self.expression(pos) {
                    pos += argument.consumed;
                    arguments.push(argument.node);
                } else {
                    self.error(pos, "Expected expression");
                    failed = true;
                    break;
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
            Node::new(NodeType::ArgumentList, token, arguments),
        )
    }

    /// Parses `'{' ( init (',' init)* ','? )? '}'` where `init` is an
    /// expression or a nested list. Must be called on a `{`.
    pub(super) fn braced_init_list(&mut self, at: usize) -> Parsed {
        if !self.enter_nesting(at) {
            return Parsed::new(self.group_len(at), self.unknown(at));
        }

        let token = self.token_or_placeholder(at);
        let mut pos = at + 1;
        let mut items = Vec::new();
        let mut failed = false;

        while !self.is_symbol(pos, '}') {
            let item = if self.is_symbol(pos, '{') {
                Some(self.braced_init_list(pos))
            } else {
                self.expression(pos)
            };
            let Some(item) = item else {
                self.error(pos, "Expected expression");
                failed = true;
                break;
            };
            pos += item.consumed;
            items.push(item.node);
            if !self.is_symbol(pos, ',') {
                break;
            }
            pos += 1;
        }

        if !failed && !self.is_symbol(pos, '}') {
            self.error(pos, "Expected '}'");
            failed = true;
        }
        if failed {
            pos += self.recovery_len(pos, '}');
        }
        if self.is_symbol(pos, '}') {
            pos += 1;
        }

        self.leave_nesting();
        Parsed::new(
            pos - at,
            Node::new(NodeType::BracedInitList, token, items),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{body, parse_errors, parse_ok};
    use crate::ast::{Node, NodeType};

    /// Parses `source` as the body of a function and returns the expression
    /// of its first statement.
    fn expr(source: &str) -> Node {
        let root = parse_ok(&format!("void f() {{ {source}; }}"));
        body(&root)[0].children[0].clone()
    }

    /// Renders an expression tree in prefix form, e.g. `(+ a (* b c))`.
    fn sexp(node: &Node) -> String {
        if node.children.is_empty() {
            return node.token.text.to_string();
        }
        let children: Vec<_> = node.children.iter().map(sexp).collect();
        format!("({} {})", node.token.text, children.join(" "))
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(sexp(&expr("a + b * c")), "(+ a (* b c))");
        assert_eq!(sexp(&expr("a - b - c")), "(- (- a b) c)");
        assert_eq!(sexp(&expr("a || b && c == d")), "(|| a (&& b (== c d)))");
        assert_eq!(sexp(&expr("a < b + 1")), "(< a (+ b 1))");
    }

    #[test]
    fn assignment_is_right_associative() {
        let node = expr("a = b = c");
        assert_eq!(node.kind, NodeType::AssignmentExpression);
        assert_eq!(sexp(&node), "(= a (= b c))");
    }

    #[test]
    fn equality_is_not_assignment() {
        let node = expr("a == b");
        assert_eq!(node.kind, NodeType::BinaryExpression);
        assert_eq!(node.token.text, "==");
    }

    #[test]
    fn unary_operators() {
        let node = expr("-x * !y");
        assert_eq!(sexp(&node), "(* (- x) (! y))");
        assert_eq!(node.children[0].kind, NodeType::UnaryExpression);
        assert_eq!(sexp(&expr("- -x")), "(- (- x))");
    }

    #[test]
    fn parentheses_group_without_a_node() {
        let node = expr("(a + b) * c");
        assert_eq!(sexp(&node), "(* (+ a b) c)");
    }

    #[test]
    fn postfix_chain() {
        let node = expr("f(a, 1).xyz[2]");
        assert_eq!(node.kind, NodeType::IndexExpression);
        let member = &node.children[0];
        assert_eq!(member.kind, NodeType::MemberExpression);
        assert_eq!(member.children[1].token.text, "xyz");
        let call = &member.children[0];
        assert_eq!(call.kind, NodeType::CallExpression);
        assert_eq!(call.children[1].kind, NodeType::ArgumentList);
        assert_eq!(call.children[1].children.len(), 2);
    }

    #[test]
    fn literal_kinds() {
        let root = parse_ok("void f() { 1; 0x1F; 1.5; true; \"s\"; }");
        let kinds: Vec<_> = body(&root).iter().map(|s| s.children[0].kind).collect();
        assert_eq!(
            kinds,
            [
                NodeType::IntegerLiteral,
                NodeType::IntegerLiteral,
                NodeType::FloatLiteral,
                NodeType::BoolLiteral,
                NodeType::StringLiteral,
            ]
        );
    }

    #[test]
    fn nested_braced_init_list() {
        let root = parse_ok("void f() { float2x2 m = {{1, 2}, {3, 4},}; }");
        let init = body(&root)[0].children.last().cloned();
        let init = init.unwrap_or_else(|| panic!("missing initializer"));
        assert_eq!(init.kind, NodeType::BracedInitList);
        assert_eq!(init.children.len(), 2);
        assert!(init.children.iter().all(|c| c.children.len() == 2));
    }

    #[test]
    fn missing_operand() {
        assert_eq!(parse_errors("void f() { a + ; }"), ["Expected expression"]);
        assert_eq!(parse_errors("void f() { -; }"), ["Expected expression"]);
    }

    #[test]
    fn unclosed_call() {
        assert_eq!(parse_errors("void f() { g(a; }"), ["Expected ')'"]);
    }

    #[test]
    fn missing_member_name() {
        assert_eq!(parse_errors("void f() { a.; }"), ["Expected identifier"]);
    }

    #[test]
    fn unclosed_index() {
        assert_eq!(parse_errors("void f() { a[1; }"), ["Expected ']'"]);
    }

    #[test]
    fn unclosed_parenthesis() {
        assert_eq!(parse_errors("void f() { (a; }"), ["Expected ')'"]);
    }

    #[test]
    fn unclosed_initializer() {
        assert_eq!(
            parse_errors("void f() { float x = {1, 2; }"),
            ["Expected '}'"]
        );
    }
}
