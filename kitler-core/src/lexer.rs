use std::rc::Rc;

#[derive(Debug, PartialEq, Clone)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Str(Rc<str>),
    Ident(Rc<str>),
    True,
    False,

    // Keywords
    Including,
    ProjectSpace,
    NewVar,
    NewFunc,
    NewClass,
    NewEvent,
    NewAsync,
    If,
    Else,
    While,
    For,
    Foreach,
    In,
    Switch,
    Case,
    Default,
    Break,
    Return,
    Run,
    End,
    When,
    This,
    New,
    Await,
    And,
    Or,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Not,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Colon,
    Hash,

    // Special
    Newline,
    Eof,
    Error(String),
}

/// Smallest lexical unit: a kind, the source text it covers, and its
/// 1-based position. Literal kinds carry their payload in the kind itself.
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Rc<str>,
    pub line: u32,
    pub column: u32,
}

fn keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "including" => Some(TokenKind::Including),
        "projectSpace" => Some(TokenKind::ProjectSpace),
        "NewVar" => Some(TokenKind::NewVar),
        "NewFunc" => Some(TokenKind::NewFunc),
        "NewClass" => Some(TokenKind::NewClass),
        "NewEvent" => Some(TokenKind::NewEvent),
        "NewAsync" => Some(TokenKind::NewAsync),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "while" => Some(TokenKind::While),
        "for" => Some(TokenKind::For),
        "foreach" => Some(TokenKind::Foreach),
        "in" => Some(TokenKind::In),
        "switch" => Some(TokenKind::Switch),
        "case" => Some(TokenKind::Case),
        "default" => Some(TokenKind::Default),
        "break" => Some(TokenKind::Break),
        "return" => Some(TokenKind::Return),
        "run" => Some(TokenKind::Run),
        "end" => Some(TokenKind::End),
        "when" => Some(TokenKind::When),
        "this" => Some(TokenKind::This),
        "New" => Some(TokenKind::New),
        "await" => Some(TokenKind::Await),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "and" => Some(TokenKind::And),
        "or" => Some(TokenKind::Or),
        _ => None,
    }
}

/// Restartable cursor over source text. `next_token` can be called until it
/// produces an `Eof` token; [`tokenize`] drives it to completion.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    column: u32,
    start_column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src,
            pos: 0,
            line: 1,
            column: 1,
            start_column: 1,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        self.column += 1;
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t') | Some('\r')) {
            self.advance();
        }
    }

    /// Skips a `<-- ... -->` comment, which may span lines. Returns whether
    /// a comment open marker was consumed, so the caller re-checks for
    /// whitespace afterwards.
    fn skip_comment(&mut self) -> bool {
        if !self.rest().starts_with("<--") {
            return false;
        }
        self.advance();
        self.advance();
        self.advance();

        while !self.is_at_end() {
            if self.rest().starts_with("-->") {
                self.advance();
                self.advance();
                self.advance();
                return true;
            }
            if self.peek() == Some('\n') {
                self.line += 1;
                self.column = 0;
            }
            self.advance();
        }
        // unterminated comment swallows the rest of the input
        true
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            lexeme: self.src[start..self.pos].into(),
            line: self.line,
            column: self.start_column,
        }
    }

    fn error_token(&self, message: impl Into<String>, lexeme: &str) -> Token {
        Token {
            kind: TokenKind::Error(message.into()),
            lexeme: lexeme.into(),
            line: self.line,
            column: self.start_column,
        }
    }

    fn string_literal(&mut self) -> Token {
        let start = self.pos;
        self.advance(); // opening quote

        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            }
            self.advance();
        }

        if self.is_at_end() {
            return self.error_token("Unterminated string", &self.src[start..self.pos]);
        }

        let value = &self.src[start + 1..self.pos];
        self.advance(); // closing quote

        Token {
            kind: TokenKind::Str(value.into()),
            lexeme: value.into(),
            line: self.line,
            column: self.start_column,
        }
    }

    fn number_literal(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        // a decimal point only belongs to the number when a digit follows
        if self.peek() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        let lexeme = &self.src[start..self.pos];
        let value = lexeme.parse::<f64>().unwrap_or(0.0);
        self.token(TokenKind::Number(value), start)
    }

    fn identifier(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            self.advance();
        }

        let ident = &self.src[start..self.pos];
        self.token(keyword(ident).unwrap_or_else(|| TokenKind::Ident(ident.into())), start)
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            if !self.skip_comment() {
                break;
            }
        }

        self.start_column = self.column;
        let start = self.pos;

        let Some(c) = self.peek() else {
            return self.token(TokenKind::Eof, start);
        };

        if c == '\n' {
            self.advance();
            let token = Token {
                kind: TokenKind::Newline,
                lexeme: "\\n".into(),
                line: self.line,
                column: self.start_column,
            };
            self.line += 1;
            self.column = 1;
            return token;
        }

        if c == '"' {
            return self.string_literal();
        }
        if c.is_ascii_digit() {
            return self.number_literal();
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return self.identifier();
        }

        self.advance();
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            '#' => TokenKind::Hash,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => {
                if self.match_char('=') {
                    TokenKind::Equal
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.match_char('=') {
                    TokenKind::NotEqual
                } else {
                    TokenKind::Not
                }
            }
            '<' => {
                if self.match_char('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.match_char('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                }
            }
            _ => {
                return self.error_token(
                    format!("Unexpected character: {c}"),
                    &self.src[start..self.pos],
                )
            }
        };
        self.token(kind, start)
    }
}

/// Tokenizes `source` completely, discarding newline tokens (statement
/// separation is not newline-sensitive) and stopping after the first `Eof`
/// or `Error` token, which is included in the output.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token();
        if matches!(token.kind, TokenKind::Newline) {
            continue;
        }
        let done = matches!(token.kind, TokenKind::Eof | TokenKind::Error(_));
        tokens.push(token);
        if done {
            break;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn test_delimiters_and_operators() {
        let input = "( ) [ ] { } , . : # + - * / % = == != < <= > >= !";
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Colon,
                TokenKind::Hash,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Assign,
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Not,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        let input = "including projectSpace NewVar NewFunc NewClass NewEvent NewAsync \
                     if else while for foreach in switch case default break return \
                     run end when this New await true false and or";
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Including,
                TokenKind::ProjectSpace,
                TokenKind::NewVar,
                TokenKind::NewFunc,
                TokenKind::NewClass,
                TokenKind::NewEvent,
                TokenKind::NewAsync,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::For,
                TokenKind::Foreach,
                TokenKind::In,
                TokenKind::Switch,
                TokenKind::Case,
                TokenKind::Default,
                TokenKind::Break,
                TokenKind::Return,
                TokenKind::Run,
                TokenKind::End,
                TokenKind::When,
                TokenKind::This,
                TokenKind::New,
                TokenKind::Await,
                TokenKind::True,
                TokenKind::False,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_var_decl() {
        assert_eq!(
            kinds("NewVar x = 10"),
            vec![
                TokenKind::NewVar,
                TokenKind::Ident("x".into()),
                TokenKind::Assign,
                TokenKind::Number(10.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("0 42 3.25"),
            vec![
                TokenKind::Number(0.0),
                TokenKind::Number(42.0),
                TokenKind::Number(3.25),
                TokenKind::Eof,
            ]
        );
        // a trailing dot is not part of the number
        assert_eq!(
            kinds("5."),
            vec![TokenKind::Number(5.0), TokenKind::Dot, TokenKind::Eof]
        );
    }

    #[test]
    fn test_dotted_identifier() {
        // dots are identifier characters, so `Console.Write` is one name
        assert_eq!(
            kinds("Console.Write(x)"),
            vec![
                TokenKind::Ident("Console.Write".into()),
                TokenKind::LParen,
                TokenKind::Ident("x".into()),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_literal() {
        let tokens = tokenize("\"hello world\"");
        assert_eq!(tokens[0].kind, TokenKind::Str("hello world".into()));
        assert_eq!(tokens[0].lexeme.as_ref(), "hello world");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = tokenize("NewVar s = \"oops");
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::Error("Unterminated string".to_owned()));
    }

    #[test]
    fn test_unexpected_character() {
        let tokens = tokenize("NewVar x = @");
        let last = tokens.last().unwrap();
        assert_eq!(
            last.kind,
            TokenKind::Error("Unexpected character: @".to_owned())
        );
        assert_eq!(last.column, 12);
    }

    #[test]
    fn test_newlines_are_discarded() {
        assert_eq!(
            kinds("NewVar x\nNewVar y\n"),
            vec![
                TokenKind::NewVar,
                TokenKind::Ident("x".into()),
                TokenKind::NewVar,
                TokenKind::Ident("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comment_is_skipped() {
        assert_eq!(
            kinds("NewVar x <-- the answer --> = 42"),
            vec![
                TokenKind::NewVar,
                TokenKind::Ident("x".into()),
                TokenKind::Assign,
                TokenKind::Number(42.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_multiline_comment_keeps_positions() {
        let tokens = tokenize("<-- one\ntwo\nthree -->\nNewVar x");
        assert_eq!(tokens[0].kind, TokenKind::NewVar);
        assert_eq!(tokens[0].line, 4);
        assert_eq!(tokens[0].column, 1);
        assert_eq!(tokens[1].kind, TokenKind::Ident("x".into()));
        assert_eq!(tokens[1].column, 8);
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = tokenize("NewVar x = 10\nNewVar yy = 20");
        let y = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Ident("yy".into()))
            .unwrap();
        assert_eq!((y.line, y.column), (2, 8));
    }

    #[test]
    fn test_lexeme_round_trip() {
        let input = "NewVar result = x + 10.5";
        let tokens = tokenize(input);
        let text: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.lexeme.as_ref())
            .collect();
        assert_eq!(text, vec!["NewVar", "result", "=", "x", "+", "10.5"]);
    }

    #[test]
    fn test_next_token_is_restartable() {
        let mut lexer = Lexer::new("a b");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident("a".into()));
        assert_eq!(lexer.next_token().kind, TokenKind::Ident("b".into()));
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        // repeatable after end of input
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}
