pub mod expressions;
pub mod statements;

use std::rc::Rc;

use crate::ast::Program;
use crate::diagnostics::Diagnostic;
use crate::lexer::{Token, TokenKind};
use statements::parse_statement;

/// Single-pass recursive-descent parser. Errors are recorded as diagnostics
/// and parsing continues best-effort; callers must check [`Parser::had_error`]
/// and must not evaluate a tree produced with the flag set.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub had_error: bool,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: "".into(),
                line: 1,
                column: 1,
            });
        }
        Parser {
            tokens,
            pos: 0,
            had_error: false,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    /// A lexical `Error` token terminates the stream just like `Eof`; its
    /// message is surfaced by `parse_program`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof | TokenKind::Error(_))
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str) -> bool {
        if self.matches(&kind) {
            return true;
        }
        let (line, column) = (self.peek().line, self.peek().column);
        self.report(line, column, message);
        false
    }

    pub(crate) fn expect_identifier(&mut self, message: &str) -> Option<Rc<str>> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.pos += 1;
            return Some(name);
        }
        let (line, column) = (self.peek().line, self.peek().column);
        self.report(line, column, message);
        None
    }

    pub(crate) fn report(&mut self, line: u32, column: u32, message: impl Into<String>) {
        self.had_error = true;
        self.diagnostics.push(Diagnostic::new(line, column, message));
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(parse_statement(self));
        }
        if let TokenKind::Error(message) = &self.peek().kind {
            let (line, column, message) = (self.peek().line, self.peek().column, message.clone());
            self.report(line, column, message);
        }
        Program { statements }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExpressionKind, StatementKind};
    use crate::lexer::tokenize;

    fn parse_ok(input: &str) -> Program {
        let mut parser = Parser::new(tokenize(input));
        let program = parser.parse_program();
        assert!(
            !parser.had_error,
            "unexpected diagnostics for {input:?}: {:?}",
            parser.diagnostics()
        );
        program
    }

    fn test_parsing(tests: Vec<(&str, &str)>) {
        for (input, expected) in tests {
            assert_eq!(parse_ok(input).to_string(), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_precedence() {
        let tests = vec![
            ("1 + 2 * 3", "(1 + (2 * 3))\n"),
            ("a + b + c", "((a + b) + c)\n"),
            ("a + b - c", "((a + b) - c)\n"),
            ("a * b / c", "((a * b) / c)\n"),
            ("a + b / c", "(a + (b / c))\n"),
            ("10 % 3 + 1", "((10 % 3) + 1)\n"),
            ("1 < 2 == true", "((1 < 2) == true)\n"),
            ("a <= b and b >= c", "((a <= b) and (b >= c))\n"),
            ("a and b or c", "((a and b) or c)\n"),
            ("x != y or y == z", "((x != y) or (y == z))\n"),
        ];
        test_parsing(tests);
    }

    #[test]
    fn test_grouping() {
        let tests = vec![
            ("(1 + 2) * 3", "((1 + 2) * 3)\n"),
            ("2 / (5 + 5)", "(2 / (5 + 5))\n"),
        ];
        test_parsing(tests);
    }

    #[test]
    fn test_calls() {
        let tests = vec![
            ("greet(\"World\")", "greet(\"World\")\n"),
            ("Max(a, b + 1, 3)", "Max(a, (b + 1), 3)\n"),
            ("Console.Write(result)", "Console.Write(result)\n"),
            ("f()", "f()\n"),
        ];
        test_parsing(tests);
    }

    #[test]
    fn test_var_decl() {
        let tests = vec![
            ("NewVar x = 10", "NewVar x = 10\n"),
            ("NewVar x", "NewVar x\n"),
            ("NewVar s = \"hi\"", "NewVar s = \"hi\"\n"),
        ];
        test_parsing(tests);
    }

    #[test]
    fn test_func_decl() {
        let tests = vec![
            (
                "NewFunc add(a, b) (\n return a + b\n)",
                "NewFunc add(a, b) ( return (a + b) )\n",
            ),
            ("NewFunc f() (\n)", "NewFunc f() (  )\n"),
            (
                "NewAsync load(path) (\n Console.Write(path)\n)",
                "NewAsync load(path) ( Console.Write(path) )\n",
            ),
        ];
        test_parsing(tests);
    }

    #[test]
    fn test_if_statement() {
        let tests = vec![
            (
                "if x > 5 run:\n Console.Write(\"yes\")\nend",
                "if (x > 5) run: Console.Write(\"yes\") end\n",
            ),
            (
                "if x run:\n a = 1\nelse:\n a = 2\nend",
                "if x run: a = 1 else: a = 2 end\n",
            ),
        ];
        test_parsing(tests);
    }

    #[test]
    fn test_loops() {
        let tests = vec![
            (
                "while n > 0 run:\n n = n - 1\nend",
                "while (n > 0) run: n = (n - 1) end\n",
            ),
            (
                "for item in items run:\n Console.Write(item)\nend",
                "for item in items run: Console.Write(item) end\n",
            ),
            (
                "foreach item in items run:\nend",
                "for item in items run:  end\n",
            ),
        ];
        test_parsing(tests);
    }

    #[test]
    fn test_return_and_break() {
        let program = parse_ok("NewFunc f() (\n return\n)");
        let StatementKind::FuncDecl { body, .. } = &program.statements[0].kind else {
            panic!("expected function declaration");
        };
        assert_eq!(body.statements[0].kind, StatementKind::Return(None));

        let program = parse_ok("break");
        assert_eq!(program.statements[0].kind, StatementKind::Break);
    }

    #[test]
    fn test_including_directive() {
        let tests = vec![
            ("including System.Interface#", "including System.Interface#\n"),
            ("including Math", "including Math\n"),
        ];
        test_parsing(tests);
    }

    #[test]
    fn test_assignment_statement() {
        let program = parse_ok("x = x + 1");
        let StatementKind::Assign { target, value } = &program.statements[0].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(&target.kind, ExpressionKind::Identifier(name) if name.as_ref() == "x"));
        assert_eq!(value.to_string(), "(x + 1)");
    }

    #[test]
    fn test_missing_rparen_sets_error_flag() {
        let mut parser = Parser::new(tokenize("Console.Write(x"));
        parser.parse_program();
        assert!(parser.had_error);
        assert!(parser.diagnostics()[0]
            .message
            .contains("Expected ')' after arguments"));
    }

    #[test]
    fn test_unexpected_token_records_position() {
        let mut parser = Parser::new(tokenize("NewVar x = +"));
        parser.parse_program();
        assert!(parser.had_error);
        let diagnostic = &parser.diagnostics()[0];
        assert_eq!((diagnostic.line, diagnostic.column), (1, 12));
        assert_eq!(diagnostic.message, "Unexpected token: +");
    }

    #[test]
    fn test_parsing_continues_after_error() {
        // best effort, no synchronization: later statements still parse
        let mut parser = Parser::new(tokenize("NewVar = 1\nNewVar y = 2"));
        let program = parser.parse_program();
        assert!(parser.had_error);
        assert!(program
            .statements
            .iter()
            .any(|s| matches!(&s.kind, StatementKind::VarDecl { name, .. } if name.as_ref() == "y")));
    }

    #[test]
    fn test_lexical_error_becomes_diagnostic() {
        let mut parser = Parser::new(tokenize("NewVar x = @"));
        parser.parse_program();
        assert!(parser.had_error);
        assert!(parser
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("Unexpected character: @")));
    }
}
