//! Abstract Syntax Tree for Q-Lang.

use serde::{Deserialize, Serialize};

use crate::parameter::Parameter;

/// Source position of a node's leading token (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A complete Q-Lang program.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    /// Qubit count from a leading `qubits N` directive.
    pub num_qubits: Option<usize>,
    /// Time steps in temporal order.
    pub time_steps: Vec<TimeStep>,
}

impl Program {
    /// Total number of operations across all time steps.
    pub fn num_operations(&self) -> usize {
        self.time_steps.iter().map(|s| s.operations.len()).sum()
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(n) = self.num_qubits {
            writeln!(f, "qubits {n}")?;
        }
        for step in &self.time_steps {
            writeln!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Operations that execute in parallel. Their qubit sets must be disjoint;
/// the validator enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStep {
    pub operations: Vec<Operation>,
    /// Line of the step's first token.
    pub line: usize,
}

impl std::fmt::Display for TimeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

/// An operation inside a time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// `H 0, 2` or `Rx(π/2) 1`.
    SingleQubit(SingleQubitGate),
    /// `CNOT 0-1`.
    TwoQubit(TwoQubitGate),
    /// `Toffoli 0-1-2`.
    ThreeQubit(ThreeQubitGate),
    /// `MOD_EXP(7, 15) 0,1,2,3-4,5,6,7`.
    Modular(ModularGate),
    /// `QFT 0, 1, 2`.
    Register(RegisterGate),
    /// `measure 0 -> c0`.
    Measure(Measurement),
    /// `if c0 then X 1`.
    Conditional(Conditional),
}

impl Operation {
    /// Position of the operation's leading token.
    pub fn position(&self) -> Position {
        match self {
            Operation::SingleQubit(g) => g.position,
            Operation::TwoQubit(g) => g.position,
            Operation::ThreeQubit(g) => g.position,
            Operation::Modular(g) => g.position,
            Operation::Register(g) => g.position,
            Operation::Measure(m) => m.position,
            Operation::Conditional(c) => c.position,
        }
    }

    /// Line of the operation's leading token.
    pub fn line(&self) -> usize {
        self.position().line
    }

    /// Every qubit the operation touches, in operand order.
    pub fn qubits(&self) -> Vec<usize> {
        match self {
            Operation::SingleQubit(g) => g.qubits.clone(),
            Operation::TwoQubit(g) => vec![g.control, g.target],
            Operation::ThreeQubit(g) => vec![g.control1, g.control2, g.target],
            Operation::Modular(g) => g
                .control_qubits
                .iter()
                .chain(&g.target_qubits)
                .copied()
                .collect(),
            Operation::Register(g) => g.qubits.clone(),
            Operation::Measure(m) => vec![m.qubit],
            Operation::Conditional(c) => c.operation.qubits(),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::SingleQubit(g) => {
                f.write_str(&g.name)?;
                if let Some(param) = &g.parameter {
                    write!(f, "({param})")?;
                }
                write!(f, " {}", join(&g.qubits, ", "))
            }
            Operation::TwoQubit(g) => write!(f, "{} {}-{}", g.name, g.control, g.target),
            Operation::ThreeQubit(g) => write!(
                f,
                "{} {}-{}-{}",
                g.name, g.control1, g.control2, g.target
            ),
            Operation::Modular(g) => write!(
                f,
                "{}({}, {}) {}-{}",
                g.name,
                g.base,
                g.modulus,
                join(&g.control_qubits, ","),
                join(&g.target_qubits, ",")
            ),
            Operation::Register(g) => write!(f, "{} {}", g.name, join(&g.qubits, ", ")),
            Operation::Measure(m) => write!(f, "measure {} -> {}", m.qubit, m.classical_bit),
            Operation::Conditional(c) => write!(f, "if {} then {}", c.condition, c.operation),
        }
    }
}

pub(crate) fn join(qubits: &[usize], sep: &str) -> String {
    qubits
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

/// One gate applied independently to each listed qubit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleQubitGate {
    pub name: String,
    pub qubits: Vec<usize>,
    pub parameter: Option<Parameter>,
    pub position: Position,
}

/// Two-qubit gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoQubitGate {
    pub name: String,
    pub control: usize,
    pub target: usize,
    pub position: Position,
}

/// Three-qubit gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeQubitGate {
    pub name: String,
    pub control1: usize,
    pub control2: usize,
    pub target: usize,
    pub position: Position,
}

/// Modular arithmetic gate over a control and a target register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModularGate {
    pub name: String,
    pub control_qubits: Vec<usize>,
    pub target_qubits: Vec<usize>,
    pub base: u64,
    pub modulus: u64,
    pub position: Position,
}

/// Gate applied once across a whole register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterGate {
    pub name: String,
    pub qubits: Vec<usize>,
    pub position: Position,
}

/// Measurement of one qubit into a named classical bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub qubit: usize,
    pub classical_bit: String,
    pub position: Position,
}

/// An operation guarded by a classical condition.
///
/// The parser never nests conditionals, so `operation` is always a plain
/// gate or measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub condition: Condition,
    pub operation: Box<Operation>,
    pub position: Position,
}

/// Classical condition.
///
/// `and`/`or` fold strictly left to right with no precedence between them:
/// `a and b or c` is `(a and b) or c`, and `a or b and c` is `(a or b) and c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// `c0` (bit is set) or `c0 == 0` / `c0 == 1`.
    Bit { name: String, expected: Option<u8> },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    /// Create a bit condition.
    pub fn bit(name: impl Into<String>, expected: Option<u8>) -> Self {
        Condition::Bit {
            name: name.into(),
            expected,
        }
    }

    /// Evaluate against a lookup of classical bit values. Unknown bits read
    /// as 0; a bare `c0` means `c0 == 1`.
    pub fn evaluate(&self, bit: &impl Fn(&str) -> Option<u8>) -> bool {
        match self {
            Condition::Bit { name, expected } => {
                bit(name).unwrap_or(0) == expected.unwrap_or(1)
            }
            Condition::And(l, r) => l.evaluate(bit) && r.evaluate(bit),
            Condition::Or(l, r) => l.evaluate(bit) || r.evaluate(bit),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Bit {
                name,
                expected: None,
            } => f.write_str(name),
            Condition::Bit {
                name,
                expected: Some(v),
            } => write!(f, "{name} == {v}"),
            Condition::And(l, r) => write!(f, "{l} and {r}"),
            Condition::Or(l, r) => write!(f, "{l} or {r}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new(1, 1)
    }

    #[test]
    fn test_operation_qubits() {
        let modular = Operation::Modular(ModularGate {
            name: "MOD_EXP".into(),
            control_qubits: vec![0, 1],
            target_qubits: vec![2, 3],
            base: 7,
            modulus: 15,
            position: pos(),
        });
        assert_eq!(modular.qubits(), vec![0, 1, 2, 3]);

        let conditional = Operation::Conditional(Conditional {
            condition: Condition::bit("c0", None),
            operation: Box::new(Operation::TwoQubit(TwoQubitGate {
                name: "CNOT".into(),
                control: 1,
                target: 2,
                position: pos(),
            })),
            position: pos(),
        });
        assert_eq!(conditional.qubits(), vec![1, 2]);
    }

    #[test]
    fn test_operation_display() {
        let gate = Operation::SingleQubit(SingleQubitGate {
            name: "Rx".into(),
            qubits: vec![0, 2],
            parameter: Some(Parameter::new("π/4")),
            position: pos(),
        });
        assert_eq!(gate.to_string(), "Rx(π/4) 0, 2");

        let modular = Operation::Modular(ModularGate {
            name: "MOD_EXP".into(),
            control_qubits: vec![0, 1],
            target_qubits: vec![2, 3],
            base: 7,
            modulus: 15,
            position: pos(),
        });
        assert_eq!(modular.to_string(), "MOD_EXP(7, 15) 0,1-2,3");
    }

    #[test]
    fn test_condition_evaluate() {
        let cond = Condition::Or(
            Box::new(Condition::And(
                Box::new(Condition::bit("a", None)),
                Box::new(Condition::bit("b", Some(0))),
            )),
            Box::new(Condition::bit("c", None)),
        );
        let lookup = |name: &str| match name {
            "a" => Some(1),
            "c" => Some(0),
            _ => None,
        };
        assert!(cond.evaluate(&lookup));
        assert_eq!(cond.to_string(), "a and b == 0 or c");
    }
}
