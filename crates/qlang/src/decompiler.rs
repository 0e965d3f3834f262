//! Decompiler for rendering IR records back to Q-Lang source.
//!
//! The mapping is lossy. Comments are gone, single-qubit gates that shared a
//! statement come back one per qubit, and angles are printed from their
//! numeric value. The output reparses to the same gate sequence.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt::Write;

use tracing::{debug, instrument};

use crate::ast::join;
use crate::gates::{self, GateClass};
use crate::ir::{GateRecord, Guard, MEASURE, ParamValue, group_by_time_step};

/// Header comment of generated source.
pub const HEADER: &str = "# Generated Q-Lang code";

/// Output for an empty record list.
pub const EMPTY_CIRCUIT: &str = "# Empty circuit\n";

/// Tolerance for snapping angles to a named fraction of π.
const SNAP_TOLERANCE: f64 = 1e-3;

/// Render records as Q-Lang source.
///
/// With `num_qubits` set, the output starts with a `qubits N` directive.
#[instrument(skip(records), fields(records = records.len()))]
pub fn decompile(records: &[GateRecord], num_qubits: Option<usize>) -> String {
    if records.is_empty() {
        return EMPTY_CIRCUIT.to_string();
    }

    let mut output = String::new();
    output.push_str(HEADER);
    output.push_str("\n\n");
    if let Some(n) = num_qubits {
        let _ = writeln!(output, "qubits {n}");
    }

    let groups = group_by_time_step(records);
    for statements in groups.values() {
        let line = statements
            .iter()
            .map(|record| render_record(record))
            .collect::<Vec<_>>()
            .join("; ");
        output.push_str(&line);
        output.push('\n');
    }

    debug!("Decompiled {} time steps", groups.len());
    output
}

/// Render one record as a single statement.
pub fn render_record(record: &GateRecord) -> String {
    if let Some(guard) = &record.guard {
        return render_guard(guard);
    }
    if record.gate_type == MEASURE {
        let cbit = record
            .param("cbit")
            .and_then(ParamValue::as_text)
            .map_or_else(|| format!("c{}", record.qubit), str::to_string);
        return format!("measure {} -> {cbit}", record.qubit);
    }

    let name = &record.gate_type;
    match (gates::classify(name), record.control, record.control2) {
        (GateClass::TwoQubit, Some(control), _) => format!("{name} {control}-{}", record.qubit),
        (GateClass::ThreeQubit, Some(control), Some(control2)) => {
            format!("{name} {control}-{control2}-{}", record.qubit)
        }
        (GateClass::Modular, _, _) => render_modular(record),
        (GateClass::Register, _, _) => {
            let qubits = record
                .param("qubits")
                .and_then(ParamValue::as_qubits)
                .map_or_else(|| record.qubit.to_string(), |q| join(q, ", "));
            format!("{name} {qubits}")
        }
        _ => match record.angle() {
            Some(angle) if gates::is_parametric(name) => {
                format!("{name}({}) {}", format_param(angle), record.qubit)
            }
            _ => format!("{name} {}", record.qubit),
        },
    }
}

fn render_guard(guard: &Guard) -> String {
    format!("if {} then {}", guard.condition, render_record(&guard.record))
}

fn render_modular(record: &GateRecord) -> String {
    let int = |key: &str| record.param(key).and_then(ParamValue::as_int).unwrap_or(0);
    let register = |key: &str, fallback: Option<usize>| {
        record
            .param(key)
            .and_then(ParamValue::as_qubits)
            .map(|q| join(q, ","))
            .or_else(|| fallback.map(|q| q.to_string()))
            .unwrap_or_default()
    };
    format!(
        "{}({}, {}) {}-{}",
        record.gate_type,
        int("a"),
        int("N"),
        register("controls", record.control),
        register("targets", Some(record.qubit))
    )
}

fn format_param(value: &ParamValue) -> String {
    match value {
        ParamValue::Angle(angle) => format_angle(*angle),
        ParamValue::Int(v) => v.to_string(),
        ParamValue::Text(text) => text.clone(),
        ParamValue::Qubits(q) => join(q, ","),
    }
}

/// Format an angle, snapping to `π/2`, `π/4` or `π` within 1e-3 and
/// otherwise printing up to six decimals with trailing zeros removed.
pub fn format_angle(angle: f64) -> String {
    for (value, text) in [(FRAC_PI_2, "π/2"), (FRAC_PI_4, "π/4"), (PI, "π")] {
        if (angle - value).abs() < SNAP_TOLERANCE {
            return text.to_string();
        }
    }

    let fixed = format!("{angle:.6}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        _ => trimmed.to_string(),
    }
}
