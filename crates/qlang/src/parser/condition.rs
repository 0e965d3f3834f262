//! Condition parsing for Q-Lang.

use super::Parser;
use crate::ast::Condition;
use crate::error::{ParseError, ParseResult};
use crate::lexer::TokenKind;

/// Most bit conditions one `if` may combine.
const MAX_CONDITION_TERMS: usize = 64;

impl Parser {
    /// Parse a condition: bit conditions joined by `and`/`or`, folded left
    /// to right without precedence.
    pub(super) fn parse_condition(&mut self) -> ParseResult<Condition> {
        let mut left = self.parse_bit_condition()?;
        let mut terms = 1;

        loop {
            if terms == MAX_CONDITION_TERMS
                && matches!(self.current().kind, TokenKind::And | TokenKind::Or)
            {
                let token = self.current();
                return Err(ParseError::ConditionTooLong {
                    limit: MAX_CONDITION_TERMS,
                    line: token.line,
                    column: token.column,
                });
            }
            if self.consume(TokenKind::And) {
                let right = self.parse_bit_condition()?;
                left = Condition::And(Box::new(left), Box::new(right));
                terms += 1;
            } else if self.consume(TokenKind::Or) {
                let right = self.parse_bit_condition()?;
                left = Condition::Or(Box::new(left), Box::new(right));
                terms += 1;
            } else {
                return Ok(left);
            }
        }
    }

    /// Parse `bit` or `bit == 0|1`.
    fn parse_bit_condition(&mut self) -> ParseResult<Condition> {
        let name = self.parse_bit_name()?;

        if !self.consume(TokenKind::Equals) {
            return Ok(Condition::Bit {
                name,
                expected: None,
            });
        }

        let (text, line, column) = {
            let token = self.current();
            (token.text.clone(), token.line, token.column)
        };
        let expected = match self.parse_index()? {
            0 => 0,
            1 => 1,
            _ => {
                return Err(ParseError::InvalidBitValue {
                    value: text,
                    line,
                    column,
                });
            }
        };

        Ok(Condition::Bit {
            name,
            expected: Some(expected),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Condition, Operation};
    use crate::error::{ErrorKind, ParseError};
    use crate::parser::parse;

    fn condition_of(source: &str) -> Condition {
        let program = parse(source).unwrap();
        match &program.time_steps[0].operations[0] {
            Operation::Conditional(c) => c.condition.clone(),
            other => panic!("expected conditional, got {other:?}"),
        }
    }

    fn bit(name: &str, expected: Option<u8>) -> Box<Condition> {
        Box::new(Condition::bit(name, expected))
    }

    #[test]
    fn test_bare_bit() {
        assert_eq!(condition_of("if c1 then X 2"), Condition::bit("c1", None));
    }

    #[test]
    fn test_compared_bit() {
        assert_eq!(
            condition_of("if c0 == 0 then Z 2"),
            Condition::bit("c0", Some(0))
        );
    }

    #[test]
    fn test_left_to_right_folding() {
        assert_eq!(
            condition_of("if a and b or c then X 0"),
            Condition::Or(
                Box::new(Condition::And(bit("a", None), bit("b", None))),
                bit("c", None)
            )
        );

        // No precedence between the two: `or` first still groups left.
        assert_eq!(
            condition_of("if a or b and c then X 0"),
            Condition::And(
                Box::new(Condition::Or(bit("a", None), bit("b", None))),
                bit("c", None)
            )
        );
    }

    #[test]
    fn test_invalid_bit_value() {
        let err = parse("if c0 == 2 then X 0").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidBitValue {
                value: "2".into(),
                line: 1,
                column: 10,
            }
        );
    }

    #[test]
    fn test_bit_value_is_numeric() {
        assert_eq!(
            condition_of("if c0 == 01 then X 0"),
            Condition::bit("c0", Some(1))
        );
        assert_eq!(
            condition_of("if c0 == 00 then X 0"),
            Condition::bit("c0", Some(0))
        );
        assert!(matches!(
            parse("if c0 == 10 then X 0").unwrap_err(),
            ParseError::InvalidBitValue { ref value, .. } if value == "10"
        ));
    }

    #[test]
    fn test_condition_term_limit() {
        let at_limit = format!(
            "if c0{} then X 0",
            " and c0".repeat(super::MAX_CONDITION_TERMS - 1)
        );
        parse(&at_limit).unwrap();

        let too_long = format!("if c0{} then X 0", " or c0".repeat(300_000));
        let err = parse(&too_long).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(matches!(
            err,
            ParseError::ConditionTooLong { limit: super::MAX_CONDITION_TERMS, line: 1, .. }
        ));
    }

    #[test]
    fn test_not_is_rejected() {
        let err = parse("if not c0 then X 0").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { ref found, .. } if found == "NOT"
        ));
    }
}
