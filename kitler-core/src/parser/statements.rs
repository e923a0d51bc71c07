use std::rc::Rc;

use crate::ast::{Block, Statement, StatementKind};
use crate::lexer::TokenKind;

use super::expressions::parse_expression;
use super::Parser;

pub(crate) fn parse_statement(parser: &mut Parser) -> Statement {
    let (line, column) = (parser.peek().line, parser.peek().column);
    let kind = match parser.peek().kind {
        TokenKind::Including => parse_including(parser),
        TokenKind::NewVar => parse_var_decl(parser),
        TokenKind::NewFunc => parse_func_decl(parser, false),
        TokenKind::NewAsync => parse_func_decl(parser, true),
        TokenKind::If => parse_if(parser),
        TokenKind::While => parse_while(parser),
        TokenKind::For | TokenKind::Foreach => parse_for(parser),
        TokenKind::Return => parse_return(parser),
        TokenKind::Break => {
            parser.advance();
            StatementKind::Break
        }
        _ => parse_assignment_or_expression(parser),
    };
    Statement { kind, line, column }
}

/// Parses statements until one of `terminators` or the end of input is
/// reached. The terminator itself is left for the caller to consume, since
/// which one ended the block matters (`else` versus `end`).
fn parse_block(parser: &mut Parser, terminators: &[TokenKind]) -> Block {
    let mut statements = Vec::new();
    while !parser.at_end() && !terminators.iter().any(|t| parser.check(t)) {
        statements.push(parse_statement(parser));
    }
    Block { statements }
}

fn parse_including(parser: &mut Parser) -> StatementKind {
    parser.advance();
    let library = parser
        .expect_identifier("Expected library name after 'including'")
        .unwrap_or_else(|| "".into());
    let is_priority = parser.matches(&TokenKind::Hash);
    StatementKind::Including {
        library,
        is_priority,
    }
}

fn parse_var_decl(parser: &mut Parser) -> StatementKind {
    parser.advance();
    let Some(name) = parser.expect_identifier("Expected variable name after 'NewVar'") else {
        return StatementKind::VarDecl {
            name: "".into(),
            initializer: None,
        };
    };
    let initializer = if parser.matches(&TokenKind::Assign) {
        Some(parse_expression(parser))
    } else {
        None
    };
    StatementKind::VarDecl { name, initializer }
}

fn parse_func_decl(parser: &mut Parser, is_async: bool) -> StatementKind {
    parser.advance();
    let name = parser
        .expect_identifier("Expected function name")
        .unwrap_or_else(|| "".into());

    parser.expect(TokenKind::LParen, "Expected '(' after function name");
    let mut params: Vec<Rc<str>> = Vec::new();
    if !parser.check(&TokenKind::RParen) {
        loop {
            match parser.expect_identifier("Expected parameter name") {
                Some(param) => params.push(param),
                None => break,
            }
            if !parser.matches(&TokenKind::Comma) {
                break;
            }
        }
    }
    parser.expect(TokenKind::RParen, "Expected ')' after parameters");

    parser.expect(TokenKind::LParen, "Expected '(' before function body");
    let body = parse_block(parser, &[TokenKind::RParen]);
    parser.expect(TokenKind::RParen, "Expected ')' after function body");

    StatementKind::FuncDecl {
        name,
        params: params.into(),
        body: Rc::new(body),
        is_async,
    }
}

fn parse_if(parser: &mut Parser) -> StatementKind {
    parser.advance();
    let condition = parse_expression(parser);
    parser.expect(TokenKind::Run, "Expected 'run:' after if condition");
    parser.expect(TokenKind::Colon, "Expected ':' after 'run'");

    let then_branch = parse_block(parser, &[TokenKind::End, TokenKind::Else]);
    let else_branch = if parser.matches(&TokenKind::End) {
        None
    } else if parser.matches(&TokenKind::Else) {
        parser.expect(TokenKind::Colon, "Expected ':' after 'else'");
        let block = parse_block(parser, &[TokenKind::End]);
        parser.expect(TokenKind::End, "Expected 'end' after else branch");
        Some(block)
    } else {
        // unterminated if at end of input
        parser.expect(TokenKind::End, "Expected 'end' after if body");
        None
    };

    StatementKind::If {
        condition,
        then_branch,
        else_branch,
    }
}

fn parse_while(parser: &mut Parser) -> StatementKind {
    parser.advance();
    let condition = parse_expression(parser);
    parser.expect(TokenKind::Run, "Expected 'run:' after while condition");
    parser.expect(TokenKind::Colon, "Expected ':' after 'run'");
    let body = parse_block(parser, &[TokenKind::End]);
    parser.expect(TokenKind::End, "Expected 'end' after while body");
    StatementKind::While { condition, body }
}

/// `for` and `foreach` share one grammar rule.
fn parse_for(parser: &mut Parser) -> StatementKind {
    parser.advance();
    let iterator = parser
        .expect_identifier("Expected loop variable")
        .unwrap_or_else(|| "".into());
    parser.expect(TokenKind::In, "Expected 'in' after loop variable");
    let iterable = parse_expression(parser);
    parser.expect(TokenKind::Run, "Expected 'run:' after loop iterable");
    parser.expect(TokenKind::Colon, "Expected ':' after 'run'");
    let body = parse_block(parser, &[TokenKind::End]);
    parser.expect(TokenKind::End, "Expected 'end' after loop body");
    StatementKind::For {
        iterator,
        iterable,
        body,
    }
}

fn parse_return(parser: &mut Parser) -> StatementKind {
    parser.advance();
    // a bare `return` is legal right before a block terminator
    if parser.at_end() || parser.check(&TokenKind::End) || parser.check(&TokenKind::RParen) {
        StatementKind::Return(None)
    } else {
        StatementKind::Return(Some(parse_expression(parser)))
    }
}

fn parse_assignment_or_expression(parser: &mut Parser) -> StatementKind {
    let target = parse_expression(parser);
    if parser.matches(&TokenKind::Assign) {
        let value = parse_expression(parser);
        StatementKind::Assign { target, value }
    } else {
        StatementKind::Expression(target)
    }
}
