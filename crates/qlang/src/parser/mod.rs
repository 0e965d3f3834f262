//! Parser for Q-Lang.

mod condition;
mod operation;

use tracing::{debug, instrument};

use crate::ast::{Program, TimeStep};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Token, TokenKind, filter_comments, tokenize};

/// Parse Q-Lang source into a [`Program`].
#[instrument(skip_all, fields(len = source.len()))]
pub fn parse(source: &str) -> ParseResult<Program> {
    let tokens = filter_comments(tokenize(source)?);
    debug!("Scanned {} tokens", tokens.len());

    let mut parser = Parser::new(tokens);
    let program = parser.parse_program()?;
    debug!(
        "Parsed {} time steps, {} operations",
        program.time_steps.len(),
        program.num_operations()
    );
    Ok(program)
}

/// Parser state: an immutable token buffer and a cursor into it.
pub(super) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser over comment-free tokens.
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                line,
                column,
            });
        }
        Self { tokens, pos: 0 }
    }

    /// Check if we've reached the end.
    pub(super) fn is_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    /// The current token. Stays on `Eof` once reached.
    pub(super) fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    /// Advance and return the current token.
    pub(super) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token has the given kind.
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consume the current token if it has the given kind.
    pub(super) fn consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect a token of the given kind.
    pub(super) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    /// Build an "expected X" error pointing at the current token.
    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: token.kind.to_string(),
            text: token.text.clone(),
            line: token.line,
            column: token.column,
        }
    }

    /// Parse a non-negative integer literal.
    pub(super) fn parse_index(&mut self) -> ParseResult<usize> {
        let token = self.expect(TokenKind::Number)?;
        token
            .text
            .parse()
            .map_err(|_| ParseError::IntegerOverflow {
                text: token.text.clone(),
                line: token.line,
                column: token.column,
            })
    }

    /// Parse a comma-separated list of qubit indices.
    pub(super) fn parse_index_list(&mut self) -> ParseResult<Vec<usize>> {
        let mut qubits = vec![self.parse_index()?];
        while self.consume(TokenKind::Comma) {
            qubits.push(self.parse_index()?);
        }
        Ok(qubits)
    }

    /// Parse the entire program.
    fn parse_program(&mut self) -> ParseResult<Program> {
        while self.consume(TokenKind::Newline) {}

        let num_qubits = if self.check(TokenKind::Qubits) {
            Some(self.parse_qubit_directive()?)
        } else {
            None
        };

        let mut time_steps = Vec::new();
        while !self.is_eof() {
            if self.consume(TokenKind::Newline) {
                continue;
            }

            time_steps.push(self.parse_time_step()?);

            if !self.is_eof() {
                self.expect(TokenKind::Newline)?;
            }
        }

        Ok(Program {
            num_qubits,
            time_steps,
        })
    }

    /// Parse `qubits N` on its own line.
    fn parse_qubit_directive(&mut self) -> ParseResult<usize> {
        self.expect(TokenKind::Qubits)?;
        let count = self.parse_index()?;
        if !self.is_eof() {
            self.expect(TokenKind::Newline)?;
        }
        Ok(count)
    }

    /// Parse one line of `;`-separated operations.
    fn parse_time_step(&mut self) -> ParseResult<TimeStep> {
        let line = self.current().line;
        let mut operations = vec![self.parse_operation()?];
        while self.consume(TokenKind::Semicolon) {
            operations.push(self.parse_operation()?);
        }
        Ok(TimeStep { operations, line })
    }
}
