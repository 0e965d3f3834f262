//! Scanner for Q-Lang.

use logos::Logos;

use crate::error::{ParseError, ParseResult};
use crate::gates;

/// Token kinds for Q-Lang.
///
/// Spaces, tabs and carriage returns are skipped. Newlines are kept because
/// they terminate time steps.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r]+")]
pub enum TokenKind {
    #[regex(r"#[^\n]*")]
    Comment,

    // Keywords
    #[token("measure")]
    Measure,

    #[token("if")]
    If,

    #[token("then")]
    Then,

    #[token("and")]
    And,

    #[token("or")]
    Or,

    #[token("not")]
    Not,

    #[token("qubits")]
    Qubits,

    // Names and literals
    #[regex(r"[A-Z][A-Za-z0-9_†]*")]
    GateName,

    #[regex(r"[a-z][a-z0-9_]*")]
    Identifier,

    #[regex(r"[0-9]+")]
    Number,

    #[regex(r"\([^)]+\)")]
    Parameter,

    // Punctuation
    #[token("==")]
    Equals,

    #[token("->")]
    Arrow,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token("-")]
    Dash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("\n")]
    Newline,

    /// Appended by [`tokenize`]; never produced by the lexer itself.
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Comment => "COMMENT",
            TokenKind::Measure => "MEASURE",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Qubits => "QUBITS",
            TokenKind::GateName => "GATE_NAME",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::Parameter => "PARAMETER",
            TokenKind::Equals => "EQUALS",
            TokenKind::Arrow => "ARROW",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Dash => "DASH",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// A token with its literal text and 1-based position.
///
/// Columns count characters, so a line containing `π` still reports the
/// column a reader would see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    fn new(kind: TokenKind, text: &str, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.to_string(),
            line,
            column,
        }
    }
}

/// Tokenize Q-Lang source into a list terminated by [`TokenKind::Eof`].
///
/// Comments are kept; use [`filter_comments`] before parsing. Gate names are
/// checked against the allow-list here, so an unknown gate is a lexical
/// error rather than a syntax error.
pub fn tokenize(source: &str) -> ParseResult<Vec<Token>> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut line_start = 0;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let column = source[line_start..span.start].chars().count() + 1;

        let Ok(kind) = result else {
            return Err(ParseError::InvalidCharacter {
                text: text.to_string(),
                line,
                column,
            });
        };

        if kind == TokenKind::GateName && !gates::is_known_gate(text) {
            return Err(ParseError::UnknownGate {
                name: text.to_string(),
                line,
                column,
            });
        }

        tokens.push(Token::new(kind, text, line, column));

        // Parameter literals may span lines, so count every newline consumed.
        if let Some(offset) = text.rfind('\n') {
            line += text.matches('\n').count();
            line_start = span.start + offset + 1;
        }
    }

    let column = source[line_start..].chars().count() + 1;
    tokens.push(Token::new(TokenKind::Eof, "", line, column));

    Ok(tokens)
}

/// Remove comment tokens.
pub fn filter_comments(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Comment)
        .collect()
}
