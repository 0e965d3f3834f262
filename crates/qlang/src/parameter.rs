//! Gate parameter expressions.
//!
//! Parameters are stored as written and evaluated on demand. The grammar is
//! deliberately small:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+')* primary
//! primary := number | 'π' | 'pi' | '(' expr ')'
//! ```

use std::f64::consts::PI;

use logos::Logos;
use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// A gate parameter, e.g. the `π/4` in `Rz(π/4) 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Expression text without the surrounding parentheses.
    pub expression: String,
}

impl Parameter {
    /// Create a parameter from expression text.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    /// Evaluate the expression to an angle in radians.
    pub fn evaluate(&self) -> Result<f64, EvalError> {
        evaluate(&self.expression)
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.expression)
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum Atom {
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[token("π")]
    #[token("pi")]
    Pi,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,
}

/// Evaluate a parameter expression.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    let fail = |reason: String| EvalError {
        expression: expression.to_string(),
        reason,
    };

    let mut atoms = Vec::new();
    let mut lexer = Atom::lexer(expression);
    while let Some(result) = lexer.next() {
        match result {
            Ok(atom) => atoms.push(atom),
            Err(()) => return Err(fail(format!("unexpected '{}'", lexer.slice()))),
        }
    }

    let mut evaluator = Evaluator {
        atoms,
        pos: 0,
        depth: 0,
    };
    let value = evaluator.parse_expr().map_err(fail)?;
    if let Some(extra) = evaluator.peek() {
        return Err(fail(format!("unexpected {extra:?} after expression")));
    }
    if !value.is_finite() {
        return Err(fail("result is not a finite number".into()));
    }
    Ok(value)
}

/// Deepest parenthesis nesting accepted by [`evaluate`].
const MAX_NESTING: usize = 64;

struct Evaluator {
    atoms: Vec<Atom>,
    pos: usize,
    depth: usize,
}

impl Evaluator {
    fn peek(&self) -> Option<Atom> {
        self.atoms.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Atom> {
        let atom = self.peek();
        if atom.is_some() {
            self.pos += 1;
        }
        atom
    }

    fn parse_expr(&mut self) -> Result<f64, String> {
        let mut value = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Atom::Plus) => {
                    self.advance();
                    value += self.parse_term()?;
                }
                Some(Atom::Minus) => {
                    self.advance();
                    value -= self.parse_term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn parse_term(&mut self) -> Result<f64, String> {
        let mut value = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Atom::Star) => {
                    self.advance();
                    value *= self.parse_unary()?;
                }
                Some(Atom::Slash) => {
                    self.advance();
                    let divisor = self.parse_unary()?;
                    if divisor == 0.0 {
                        return Err("division by zero".into());
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<f64, String> {
        let mut negate = false;
        loop {
            match self.peek() {
                Some(Atom::Minus) => negate = !negate,
                Some(Atom::Plus) => {}
                _ => break,
            }
            self.advance();
        }
        let value = self.parse_primary()?;
        Ok(if negate { -value } else { value })
    }

    fn parse_primary(&mut self) -> Result<f64, String> {
        match self.advance() {
            Some(Atom::Number(v)) => Ok(v),
            Some(Atom::Pi) => Ok(PI),
            Some(Atom::LParen) => {
                if self.depth >= MAX_NESTING {
                    return Err("expression nested too deeply".into());
                }
                self.depth += 1;
                let value = self.parse_expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Atom::RParen) => Ok(value),
                    Some(other) => Err(format!("expected ')', found {other:?}")),
                    None => Err("missing ')'".into()),
                }
            }
            Some(other) => Err(format!("expected a number, found {other:?}")),
            None => Err("unexpected end of expression".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn eval(expr: &str) -> f64 {
        evaluate(expr).unwrap()
    }

    #[test]
    fn test_pi_fractions() {
        assert!((eval("π/2") - FRAC_PI_2).abs() < 1e-12);
        assert!((eval("pi/4") - FRAC_PI_4).abs() < 1e-12);
        assert!((eval("2*π") - 2.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_literals() {
        assert!((eval("0.785") - 0.785).abs() < 1e-12);
        assert!((eval("3.14159/2") - 1.570_795).abs() < 1e-9);
        assert!((eval("1e-3") - 0.001).abs() < 1e-12);
        assert!((eval(".5") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_precedence_and_grouping() {
        assert!((eval("1 + 2 * 3") - 7.0).abs() < 1e-12);
        assert!((eval("(1 + 2) * 3") - 9.0).abs() < 1e-12);
        assert!((eval("8 / 2 / 2") - 2.0).abs() < 1e-12);
        assert!((eval("-π/2") + FRAC_PI_2).abs() < 1e-12);
        assert!((eval("1 - -1") - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_expressions() {
        for expr in ["", "theta", "π/", "(1 + 2", "1 2", "1/0", "2 ** 3"] {
            let err = evaluate(expr).unwrap_err();
            assert_eq!(err.expression, expr);
        }
    }

    #[test]
    fn test_long_sign_runs() {
        let even = format!("{}1", "-".repeat(100_000));
        assert!((eval(&even) - 1.0).abs() < 1e-12);

        let odd = format!("{}π", "-+".repeat(50_001).trim_end_matches('+'));
        assert!((eval(&odd) + PI).abs() < 1e-12);
    }

    #[test]
    fn test_nesting_limit() {
        let ok = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert!((eval(&ok) - 1.0).abs() < 1e-12);

        let deep = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        let err = evaluate(&deep).unwrap_err();
        assert_eq!(err.reason, "expression nested too deeply");
    }

    #[test]
    fn test_parameter_evaluate() {
        let param = Parameter::new("π/2");
        assert!((param.evaluate().unwrap() - 1.570_796_3).abs() < 1e-6);
        assert_eq!(param.to_string(), "π/2");
    }
}
