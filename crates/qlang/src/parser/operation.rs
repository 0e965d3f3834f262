//! Operation parsing for Q-Lang.

use super::Parser;
use crate::ast::{
    Conditional, Measurement, ModularGate, Operation, Position, RegisterGate, SingleQubitGate,
    ThreeQubitGate, TwoQubitGate,
};
use crate::error::{ParseError, ParseResult};
use crate::gates::{self, GateClass};
use crate::lexer::{Token, TokenKind};
use crate::parameter::Parameter;

impl Parser {
    /// Parse a gate, measurement or conditional.
    pub(super) fn parse_operation(&mut self) -> ParseResult<Operation> {
        let (kind, line, column) = {
            let token = self.current();
            (token.kind, token.line, token.column)
        };
        match kind {
            TokenKind::If => self.parse_conditional(),
            TokenKind::Measure => self.parse_measurement(),
            TokenKind::Qubits => Err(ParseError::MisplacedDirective { line, column }),
            _ => self.parse_gate(),
        }
    }

    /// Parse `if <condition> then <operation>`.
    fn parse_conditional(&mut self) -> ParseResult<Operation> {
        let if_token = self.expect(TokenKind::If)?;
        let condition = self.parse_condition()?;
        self.expect(TokenKind::Then)?;

        let current = self.current();
        if current.kind == TokenKind::If {
            return Err(ParseError::NestedConditional {
                line: current.line,
                column: current.column,
            });
        }

        let operation = self.parse_operation()?;
        Ok(Operation::Conditional(Conditional {
            condition,
            operation: Box::new(operation),
            position: position_of(&if_token),
        }))
    }

    /// Parse `measure <qubit> -> <bit>`.
    fn parse_measurement(&mut self) -> ParseResult<Operation> {
        let measure_token = self.expect(TokenKind::Measure)?;
        let qubit = self.parse_index()?;
        self.expect(TokenKind::Arrow)?;
        let classical_bit = self.parse_bit_name()?;

        Ok(Operation::Measure(Measurement {
            qubit,
            classical_bit,
            position: position_of(&measure_token),
        }))
    }

    /// Parse a classical bit name. Lowercase identifiers are the norm, but
    /// gate-name tokens such as `X` are accepted too.
    pub(super) fn parse_bit_name(&mut self) -> ParseResult<String> {
        let kind = self.current().kind;
        match kind {
            TokenKind::Identifier | TokenKind::GateName => Ok(self.advance().text),
            _ => Err(self.unexpected("classical bit name")),
        }
    }

    /// Parse a gate application, dispatching on the gate's operand shape.
    fn parse_gate(&mut self) -> ParseResult<Operation> {
        let gate_token = self.expect(TokenKind::GateName)?;
        let name = gate_token.text.clone();
        let position = position_of(&gate_token);

        match gates::classify(&name) {
            GateClass::TwoQubit => {
                let control = self.parse_index()?;
                self.expect(TokenKind::Dash)?;
                let target = self.parse_index()?;
                Ok(Operation::TwoQubit(TwoQubitGate {
                    name,
                    control,
                    target,
                    position,
                }))
            }
            GateClass::ThreeQubit => {
                let control1 = self.parse_index()?;
                self.expect(TokenKind::Dash)?;
                let control2 = self.parse_index()?;
                self.expect(TokenKind::Dash)?;
                let target = self.parse_index()?;
                Ok(Operation::ThreeQubit(ThreeQubitGate {
                    name,
                    control1,
                    control2,
                    target,
                    position,
                }))
            }
            GateClass::Modular => {
                let param_token = self.expect(TokenKind::Parameter)?;
                let (base, modulus) = parse_modular_params(&name, &param_token)?;
                let control_qubits = self.parse_index_list()?;
                self.expect(TokenKind::Dash)?;
                let target_qubits = self.parse_index_list()?;
                Ok(Operation::Modular(ModularGate {
                    name,
                    control_qubits,
                    target_qubits,
                    base,
                    modulus,
                    position,
                }))
            }
            GateClass::Register => {
                let qubits = self.parse_index_list()?;
                Ok(Operation::Register(RegisterGate {
                    name,
                    qubits,
                    position,
                }))
            }
            GateClass::SingleQubit => {
                let parameter = if gates::is_parametric(&name) {
                    let param_token = self.expect(TokenKind::Parameter)?;
                    Some(Parameter::new(strip_parens(&param_token.text)))
                } else {
                    None
                };
                let qubits = self.parse_index_list()?;
                Ok(Operation::SingleQubit(SingleQubitGate {
                    name,
                    qubits,
                    parameter,
                    position,
                }))
            }
        }
    }
}

fn position_of(token: &Token) -> Position {
    Position::new(token.line, token.column)
}

/// Drop the parentheses of a parameter literal.
fn strip_parens(text: &str) -> &str {
    text.strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text)
        .trim()
}

/// Parse `(base, modulus)` for a modular gate.
fn parse_modular_params(gate: &str, token: &Token) -> ParseResult<(u64, u64)> {
    let inner = strip_parens(&token.text);
    let invalid = || ParseError::InvalidModularParameters {
        gate: gate.to_string(),
        text: inner.to_string(),
        line: token.line,
        column: token.column,
    };

    let values = inner
        .split(',')
        .map(|part| part.trim().parse::<u64>().map_err(|_| invalid()))
        .collect::<ParseResult<Vec<_>>>()?;

    match values.as_slice() {
        [base, modulus] => Ok((*base, *modulus)),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Condition, Operation};
    use crate::error::ParseError;
    use crate::parser::parse;

    fn single_op(source: &str) -> Operation {
        let mut program = parse(source).unwrap();
        assert_eq!(program.time_steps.len(), 1);
        program.time_steps.remove(0).operations.remove(0)
    }

    #[test]
    fn test_single_qubit_list() {
        match single_op("H 0, 2, 4") {
            Operation::SingleQubit(g) => {
                assert_eq!(g.name, "H");
                assert_eq!(g.qubits, vec![0, 2, 4]);
                assert!(g.parameter.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parametric_gates() {
        let program = parse("Rx(3.14159/2) 0\nRy(π/4) 1\nRz(0.785) 2").unwrap();
        let exprs: Vec<_> = program
            .time_steps
            .iter()
            .map(|s| match &s.operations[0] {
                Operation::SingleQubit(g) => g.parameter.clone().unwrap().expression,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(exprs, vec!["3.14159/2", "π/4", "0.785"]);
    }

    #[test]
    fn test_rotation_requires_parameter() {
        let err = parse("Rx 0").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { ref expected, ref found, .. }
                if expected == "PARAMETER" && found == "NUMBER"
        ));
    }

    #[test]
    fn test_three_qubit_gate() {
        match single_op("Toffoli 0-1-2") {
            Operation::ThreeQubit(g) => {
                assert_eq!((g.control1, g.control2, g.target), (0, 1, 2));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_two_qubit_missing_dash() {
        let err = parse("CNOT 0 1").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                expected: "DASH".into(),
                found: "NUMBER".into(),
                text: "1".into(),
                line: 1,
                column: 8,
            }
        );
    }

    #[test]
    fn test_modular_gate() {
        match single_op("MOD_EXP(7, 15) 0,1,2,3-4,5,6,7") {
            Operation::Modular(g) => {
                assert_eq!(g.name, "MOD_EXP");
                assert_eq!((g.base, g.modulus), (7, 15));
                assert_eq!(g.control_qubits, vec![0, 1, 2, 3]);
                assert_eq!(g.target_qubits, vec![4, 5, 6, 7]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_modular_gate_bad_params() {
        for source in ["MOD_EXP(7) 0-1", "MOD_EXP(7.5, 15) 0-1", "MOD_ADD(1, 2, 3) 0-1"] {
            let err = parse(source).unwrap_err();
            assert!(
                matches!(err, ParseError::InvalidModularParameters { .. }),
                "{source}: {err}"
            );
        }
    }

    #[test]
    fn test_register_gate() {
        match single_op("QFT 0, 1, 2") {
            Operation::Register(g) => {
                assert_eq!(g.name, "QFT");
                assert_eq!(g.qubits, vec![0, 1, 2]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_measurement() {
        match single_op("measure 1 -> c1") {
            Operation::Measure(m) => {
                assert_eq!(m.qubit, 1);
                assert_eq!(m.classical_bit, "c1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_measurement_missing_arrow() {
        let err = parse("measure 0 c0").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { ref expected, .. } if expected == "ARROW"
        ));
    }

    #[test]
    fn test_conditional() {
        match single_op("if c0 == 1 then X 2") {
            Operation::Conditional(c) => {
                assert_eq!(c.condition, Condition::bit("c0", Some(1)));
                assert!(matches!(*c.operation, Operation::SingleQubit(_)));
                assert_eq!(c.position.column, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_conditional_measurement() {
        match single_op("if c0 then measure 1 -> c1") {
            Operation::Conditional(c) => {
                assert!(matches!(*c.operation, Operation::Measure(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_nested_conditional_rejected() {
        let err = parse("if c0 then if c1 then X 0").unwrap_err();
        assert_eq!(err, ParseError::NestedConditional { line: 1, column: 12 });
    }

    #[test]
    fn test_conditional_missing_then() {
        let err = parse("if c0 X 1").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { ref expected, .. } if expected == "THEN"
        ));
    }
}
