//! Lowering from the AST to IR gate records.

use tracing::{debug, instrument, trace, warn};

use crate::ast::{Operation, Program, SingleQubitGate};
use crate::ir::{GateRecord, MEASURE};

/// Compile a program into a flat record list.
///
/// The program should already be validated. Unevaluable angle expressions
/// are not rejected here: the record keeps the raw expression text instead.
#[instrument(skip_all, fields(time_steps = program.time_steps.len()))]
pub fn compile(program: &Program) -> Vec<GateRecord> {
    let mut records = Vec::with_capacity(program.num_operations());

    for (time_step, step) in program.time_steps.iter().enumerate() {
        for op in &step.operations {
            trace!(time_step, "Lowering {op}");
            lower(op, time_step, &mut records);
        }
    }

    debug!("Compiled {} records", records.len());
    records
}

fn lower(op: &Operation, time_step: usize, out: &mut Vec<GateRecord>) {
    match op {
        Operation::SingleQubit(gate) => lower_single_qubit(gate, time_step, out),
        Operation::TwoQubit(g) => {
            out.push(GateRecord::new(&g.name, g.target, time_step).with_control(g.control));
        }
        Operation::ThreeQubit(g) => out.push(
            GateRecord::new(&g.name, g.target, time_step)
                .with_control(g.control1)
                .with_control2(g.control2),
        ),
        Operation::Modular(g) => {
            // Empty registers are rejected by the validator.
            let (Some(&target), Some(&control)) =
                (g.target_qubits.first(), g.control_qubits.first())
            else {
                warn!(gate = %g.name, "Skipping modular gate with an empty register");
                return;
            };
            out.push(
                GateRecord::new(&g.name, target, time_step)
                    .with_control(control)
                    .with_param("a", g.base)
                    .with_param("N", g.modulus)
                    .with_param("controls", g.control_qubits.clone())
                    .with_param("targets", g.target_qubits.clone()),
            );
        }
        Operation::Register(g) => {
            let Some(&first) = g.qubits.first() else {
                warn!(gate = %g.name, "Skipping register gate with no qubits");
                return;
            };
            out.push(
                GateRecord::new(&g.name, first, time_step).with_param("qubits", g.qubits.clone()),
            );
        }
        Operation::Measure(m) => out.push(
            GateRecord::new(MEASURE, m.qubit, time_step)
                .with_param("cbit", m.classical_bit.as_str()),
        ),
        Operation::Conditional(c) => {
            let mut inner = Vec::new();
            lower(&c.operation, time_step, &mut inner);
            out.extend(
                inner
                    .into_iter()
                    .map(|record| GateRecord::conditional(c.condition.clone(), record)),
            );
        }
    }
}

fn lower_single_qubit(gate: &SingleQubitGate, time_step: usize, out: &mut Vec<GateRecord>) {
    for &qubit in &gate.qubits {
        let mut record = GateRecord::new(&gate.name, qubit, time_step);
        if let Some(param) = &gate.parameter {
            record = match param.evaluate() {
                Ok(angle) => record.with_param("angle", angle),
                Err(err) => {
                    warn!(gate = %gate.name, "Keeping raw parameter: {err}");
                    record.with_param("angle", param.expression.as_str())
                }
            };
        }
        out.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Condition;
    use crate::ir::{IF, ParamValue};
    use crate::parser::parse;

    fn compile_str(source: &str) -> Vec<GateRecord> {
        compile(&parse(source).unwrap())
    }

    #[test]
    fn test_bell_state() {
        let records = compile_str("H 0\nCNOT 0-1");
        assert_eq!(
            records,
            vec![
                GateRecord::new("H", 0, 0),
                GateRecord::new("CNOT", 1, 1).with_control(0),
            ]
        );
    }

    #[test]
    fn test_single_qubit_expansion() {
        let records = compile_str("H 0, 2, 4; X 1, 3");
        let summary: Vec<_> = records
            .iter()
            .map(|r| (r.gate_type.as_str(), r.qubit, r.time_step))
            .collect();
        assert_eq!(
            summary,
            vec![("H", 0, 0), ("H", 2, 0), ("H", 4, 0), ("X", 1, 0), ("X", 3, 0)]
        );
    }

    #[test]
    fn test_toffoli_fields() {
        let records = compile_str("Toffoli 0-1-2");
        assert_eq!(
            records,
            vec![GateRecord::new("Toffoli", 2, 0).with_control(0).with_control2(1)]
        );
    }

    #[test]
    fn test_angles() {
        let records = compile_str("Rx(π/2) 0\nRz(1.5708) 1");
        let angle = records[0].angle().and_then(ParamValue::as_angle).unwrap();
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(records[1].angle(), Some(&ParamValue::Angle(1.5708)));
    }

    #[test]
    fn test_unevaluable_angle_kept_as_text() {
        let records = compile_str("Ry(theta/2) 0, 1");
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.angle(), Some(&ParamValue::Text("theta/2".into())));
        }
    }

    #[test]
    fn test_modular_record() {
        let records = compile_str("H 0\nMOD_EXP(7, 15) 0,1,2,3-4,5,6,7");
        let record = &records[1];
        assert_eq!(record.gate_type, "MOD_EXP");
        assert_eq!((record.qubit, record.control, record.time_step), (4, Some(0), 1));
        assert_eq!(record.param("a"), Some(&ParamValue::Int(7)));
        assert_eq!(record.param("N"), Some(&ParamValue::Int(15)));
        assert_eq!(
            record.param("controls").and_then(ParamValue::as_qubits),
            Some(&[0, 1, 2, 3][..])
        );
        assert_eq!(
            record.param("targets").and_then(ParamValue::as_qubits),
            Some(&[4, 5, 6, 7][..])
        );
    }

    #[test]
    fn test_register_record() {
        let records = compile_str("QFT_INV 3, 4, 5");
        assert_eq!(
            records,
            vec![GateRecord::new("QFT_INV", 3, 0).with_param("qubits", vec![3_usize, 4, 5])]
        );
    }

    #[test]
    fn test_measure_and_conditional() {
        let records = compile_str("measure 0 -> c0\nif c0 == 1 then X 1, 2");
        assert_eq!(
            records[0],
            GateRecord::new(MEASURE, 0, 0).with_param("cbit", "c0")
        );

        // One wrapper per lowered inner record.
        assert_eq!(records.len(), 3);
        for (record, qubit) in records[1..].iter().zip([1, 2]) {
            assert_eq!(record.gate_type, IF);
            assert_eq!((record.qubit, record.time_step), (qubit, 1));
            let guard = record.guard.as_ref().unwrap();
            assert_eq!(guard.condition, Condition::bit("c0", Some(1)));
            assert_eq!(guard.record, GateRecord::new("X", qubit, 1));
        }
    }

    #[test]
    fn test_empty_program() {
        assert!(compile_str("# nothing\n").is_empty());
    }
}
