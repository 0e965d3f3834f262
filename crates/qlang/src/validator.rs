//! Semantic validation of Q-Lang programs.
//!
//! Validation is fail-fast: the first problem found is returned. Within a
//! time step each operation is checked on its own first, then against the
//! qubits already used by earlier operations of the same step.

use rustc_hash::FxHashSet;
use tracing::{debug, instrument};

use crate::ast::{
    Measurement, ModularGate, Operation, Program, RegisterGate, SingleQubitGate, ThreeQubitGate,
    TimeStep, TwoQubitGate,
};
use crate::error::{ValidationError, ValidationResult};
use crate::gates;

/// Validate a program against a circuit of `num_qubits` qubits.
#[instrument(skip(program))]
pub fn validate(program: &Program, num_qubits: usize) -> ValidationResult<()> {
    let validator = Validator { num_qubits };
    for step in &program.time_steps {
        validator.validate_time_step(step)?;
    }
    debug!("Validated {} time steps", program.time_steps.len());
    Ok(())
}

struct Validator {
    num_qubits: usize,
}

impl Validator {
    fn validate_time_step(&self, step: &TimeStep) -> ValidationResult<()> {
        let mut used = FxHashSet::default();

        for op in &step.operations {
            self.validate_operation(op)?;

            let involved = op.qubits();
            let conflicts = sorted_unique(involved.iter().copied().filter(|q| used.contains(q)));
            if !conflicts.is_empty() {
                return Err(ValidationError::QubitReuse {
                    qubits: conflicts,
                    line: op.line(),
                });
            }
            used.extend(involved);
        }
        Ok(())
    }

    fn validate_operation(&self, op: &Operation) -> ValidationResult<()> {
        let line = op.line();
        match op {
            Operation::SingleQubit(g) => self.validate_single_qubit(g, line),
            Operation::TwoQubit(g) => self.validate_two_qubit(g, line),
            Operation::ThreeQubit(g) => self.validate_three_qubit(g, line),
            Operation::Modular(g) => self.validate_modular(g, line),
            Operation::Register(g) => self.validate_register(g, line),
            Operation::Measure(m) => self.validate_measurement(m, line),
            Operation::Conditional(c) => self.validate_operation(&c.operation),
        }
    }

    fn check_range(&self, qubits: &[usize], line: usize) -> ValidationResult<()> {
        match qubits.iter().find(|&&q| q >= self.num_qubits) {
            Some(&qubit) => Err(ValidationError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
                line,
            }),
            None => Ok(()),
        }
    }

    fn validate_single_qubit(&self, gate: &SingleQubitGate, line: usize) -> ValidationResult<()> {
        check_not_empty(&gate.name, &gate.qubits, line)?;
        self.check_range(&gate.qubits, line)?;
        check_no_duplicates(&gate.qubits, line)?;

        match (&gate.parameter, gates::is_parametric(&gate.name)) {
            (None, true) => Err(ValidationError::MissingParameter {
                gate: gate.name.clone(),
                line,
            }),
            (Some(param), true) => param
                .evaluate()
                .map(|_| ())
                .map_err(|source| ValidationError::InvalidParameter { source, line }),
            (Some(_), false) => Err(ValidationError::UnexpectedParameter {
                gate: gate.name.clone(),
                line,
            }),
            (None, false) => Ok(()),
        }
    }

    fn validate_two_qubit(&self, gate: &TwoQubitGate, line: usize) -> ValidationResult<()> {
        self.check_range(&[gate.control, gate.target], line)?;
        if gate.control == gate.target {
            return Err(ValidationError::ControlEqualsTarget {
                qubit: gate.control,
                line,
            });
        }
        Ok(())
    }

    fn validate_three_qubit(&self, gate: &ThreeQubitGate, line: usize) -> ValidationResult<()> {
        let qubits = [gate.control1, gate.control2, gate.target];
        self.check_range(&qubits, line)?;
        if qubits[0] == qubits[1] || qubits[0] == qubits[2] || qubits[1] == qubits[2] {
            return Err(ValidationError::QubitsNotDistinct { qubits, line });
        }
        Ok(())
    }

    fn validate_modular(&self, gate: &ModularGate, line: usize) -> ValidationResult<()> {
        check_not_empty(&gate.name, &gate.control_qubits, line)?;
        check_not_empty(&gate.name, &gate.target_qubits, line)?;
        self.check_range(&gate.control_qubits, line)?;
        self.check_range(&gate.target_qubits, line)?;

        let controls: FxHashSet<usize> = gate.control_qubits.iter().copied().collect();
        let overlap = sorted_unique(
            gate.target_qubits
                .iter()
                .copied()
                .filter(|q| controls.contains(q)),
        );
        if !overlap.is_empty() {
            return Err(ValidationError::RegisterOverlap {
                qubits: overlap,
                line,
            });
        }
        Ok(())
    }

    fn validate_register(&self, gate: &RegisterGate, line: usize) -> ValidationResult<()> {
        check_not_empty(&gate.name, &gate.qubits, line)?;
        self.check_range(&gate.qubits, line)?;
        check_no_duplicates(&gate.qubits, line)
    }

    fn validate_measurement(&self, node: &Measurement, line: usize) -> ValidationResult<()> {
        self.check_range(&[node.qubit], line)
    }
}

fn check_not_empty(gate: &str, qubits: &[usize], line: usize) -> ValidationResult<()> {
    if qubits.is_empty() {
        return Err(ValidationError::EmptyRegister {
            gate: gate.to_string(),
            line,
        });
    }
    Ok(())
}

fn check_no_duplicates(qubits: &[usize], line: usize) -> ValidationResult<()> {
    let mut seen = FxHashSet::default();
    let duplicates = sorted_unique(qubits.iter().copied().filter(|q| !seen.insert(*q)));
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::DuplicateQubits {
            qubits: duplicates,
            line,
        })
    }
}

fn sorted_unique(qubits: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut qubits: Vec<usize> = qubits.collect();
    qubits.sort_unstable();
    qubits.dedup();
    qubits
}
