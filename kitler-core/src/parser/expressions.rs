use crate::ast::{BinaryOp, Expression, ExpressionKind, Literal};
use crate::lexer::TokenKind;

use super::Parser;

/// Binding power and operator for each binary token, lowest first. All
/// binary operators are left-associative.
fn binary_precedence(kind: &TokenKind) -> Option<(u8, BinaryOp)> {
    match kind {
        TokenKind::Or => Some((1, BinaryOp::Or)),
        TokenKind::And => Some((2, BinaryOp::And)),
        TokenKind::Equal => Some((3, BinaryOp::Equal)),
        TokenKind::NotEqual => Some((3, BinaryOp::NotEqual)),
        TokenKind::Less => Some((4, BinaryOp::Less)),
        TokenKind::LessEqual => Some((4, BinaryOp::LessEqual)),
        TokenKind::Greater => Some((4, BinaryOp::Greater)),
        TokenKind::GreaterEqual => Some((4, BinaryOp::GreaterEqual)),
        TokenKind::Plus => Some((5, BinaryOp::Add)),
        TokenKind::Minus => Some((5, BinaryOp::Subtract)),
        TokenKind::Star => Some((6, BinaryOp::Multiply)),
        TokenKind::Slash => Some((6, BinaryOp::Divide)),
        TokenKind::Percent => Some((6, BinaryOp::Modulo)),
        _ => None,
    }
}

pub(crate) fn parse_expression(parser: &mut Parser) -> Expression {
    parse_binary(parser, 0)
}

fn parse_binary(parser: &mut Parser, min_precedence: u8) -> Expression {
    let mut left = parse_primary(parser);

    while let Some((precedence, op)) = binary_precedence(&parser.peek().kind) {
        if precedence < min_precedence {
            break;
        }
        let (line, column) = (parser.peek().line, parser.peek().column);
        parser.advance();
        let right = parse_binary(parser, precedence + 1);
        left = Expression {
            kind: ExpressionKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            line,
            column,
        };
    }

    left
}

/// Primaries always consume at least one token, so expression parsing makes
/// progress even through unexpected input.
fn parse_primary(parser: &mut Parser) -> Expression {
    let token = parser.advance();
    let (line, column) = (token.line, token.column);

    let kind = match token.kind {
        TokenKind::Number(value) => ExpressionKind::Literal(Literal::Number(value)),
        TokenKind::Str(value) => ExpressionKind::Literal(Literal::Str(value)),
        TokenKind::True => ExpressionKind::Literal(Literal::Bool(true)),
        TokenKind::False => ExpressionKind::Literal(Literal::Bool(false)),
        TokenKind::Ident(name) => {
            let expression = Expression {
                kind: ExpressionKind::Identifier(name),
                line,
                column,
            };
            return parse_postfix(parser, expression);
        }
        TokenKind::LParen => {
            let grouped = parse_expression(parser);
            parser.expect(TokenKind::RParen, "Expected ')' after expression");
            return grouped;
        }
        _ => {
            parser.report(line, column, format!("Unexpected token: {}", token.lexeme));
            ExpressionKind::Literal(Literal::Null)
        }
    };

    Expression { kind, line, column }
}

/// Call and member postfixes apply to identifier primaries only, and a
/// member access is not itself callable or chainable. Dotted names like
/// `Console.Write` arrive from the lexer as a single identifier, so this
/// only triggers for a `.` separated from its identifier by whitespace.
fn parse_postfix(parser: &mut Parser, callee: Expression) -> Expression {
    if parser.check(&TokenKind::LParen) {
        let (line, column) = (parser.peek().line, parser.peek().column);
        parser.advance();
        let mut args = Vec::new();
        if !parser.check(&TokenKind::RParen) {
            loop {
                args.push(parse_expression(parser));
                if !parser.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        parser.expect(TokenKind::RParen, "Expected ')' after arguments");
        return Expression {
            kind: ExpressionKind::Call {
                callee: Box::new(callee),
                args,
            },
            line,
            column,
        };
    }

    if parser.check(&TokenKind::Dot) {
        let (line, column) = (parser.peek().line, parser.peek().column);
        parser.advance();
        if let Some(member) = parser.expect_identifier("Expected member name after '.'") {
            return Expression {
                kind: ExpressionKind::MemberAccess {
                    object: Box::new(callee),
                    member,
                },
                line,
                column,
            };
        }
    }

    callee
}
