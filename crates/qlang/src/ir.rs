//! Intermediate representation: flat, time-tagged gate records.
//!
//! Records are what downstream collaborators consume. An execution engine
//! applies them grouped by ascending [`GateRecord::time_step`]; an editor or
//! a network handler can serialize them as they are.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ast::Condition;

/// Record type of a measurement.
pub const MEASURE: &str = "MEASURE";

/// Record type of a conditional wrapper.
pub const IF: &str = "IF";

/// A value in a record's parameter map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Modular gate base or modulus.
    Int(u64),
    /// Evaluated rotation angle in radians.
    Angle(f64),
    /// Unevaluated angle expression or classical bit name.
    Text(String),
    /// Register operand.
    Qubits(Vec<usize>),
}

impl ParamValue {
    pub fn as_angle(&self) -> Option<f64> {
        match self {
            ParamValue::Angle(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_qubits(&self) -> Option<&[usize]> {
        match self {
            ParamValue::Qubits(q) => Some(q),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Angle(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<Vec<usize>> for ParamValue {
    fn from(value: Vec<usize>) -> Self {
        ParamValue::Qubits(value)
    }
}

/// Named record parameters, ordered by key.
pub type Params = BTreeMap<String, ParamValue>;

/// One gate application in the IR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateRecord {
    /// Gate name, [`MEASURE`] or [`IF`].
    #[serde(rename = "type")]
    pub gate_type: String,
    /// Primary qubit: the target for controlled gates.
    pub qubit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control2: Option<usize>,
    /// Zero-based time step index.
    pub time_step: usize,
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub params: Params,
    /// Set only on [`IF`] records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<Box<Guard>>,
}

/// Condition and guarded record of an [`IF`] record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guard {
    pub condition: Condition,
    pub record: GateRecord,
}

impl GateRecord {
    /// Create a record with no control qubits or parameters.
    pub fn new(gate_type: impl Into<String>, qubit: usize, time_step: usize) -> Self {
        Self {
            gate_type: gate_type.into(),
            qubit,
            control: None,
            control2: None,
            time_step,
            params: Params::new(),
            guard: None,
        }
    }

    #[must_use]
    pub fn with_control(mut self, control: usize) -> Self {
        self.control = Some(control);
        self
    }

    #[must_use]
    pub fn with_control2(mut self, control2: usize) -> Self {
        self.control2 = Some(control2);
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Wrap `record` in an [`IF`] record. The wrapper mirrors the guarded
    /// record's qubit, controls and time step.
    pub fn conditional(condition: Condition, record: GateRecord) -> Self {
        Self {
            gate_type: IF.to_string(),
            qubit: record.qubit,
            control: record.control,
            control2: record.control2,
            time_step: record.time_step,
            params: Params::new(),
            guard: Some(Box::new(Guard { condition, record })),
        }
    }

    /// Look up a parameter.
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// The `angle` parameter of a rotation record.
    pub fn angle(&self) -> Option<&ParamValue> {
        self.param("angle")
    }

    pub fn is_measurement(&self) -> bool {
        self.gate_type == MEASURE
    }

    pub fn is_conditional(&self) -> bool {
        self.guard.is_some()
    }
}

/// Compiled circuit: a qubit count plus its records in emission order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompiledCircuit {
    pub num_qubits: usize,
    pub records: Vec<GateRecord>,
}

impl CompiledCircuit {
    pub fn new(num_qubits: usize, records: Vec<GateRecord>) -> Self {
        Self {
            num_qubits,
            records,
        }
    }

    /// Records grouped by time step, ascending. Order within a group is
    /// emission order.
    pub fn time_steps(&self) -> BTreeMap<usize, Vec<&GateRecord>> {
        group_by_time_step(&self.records)
    }

    /// Number of distinct time steps.
    pub fn depth(&self) -> usize {
        self.time_steps().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub(crate) fn group_by_time_step(records: &[GateRecord]) -> BTreeMap<usize, Vec<&GateRecord>> {
    let mut groups: BTreeMap<usize, Vec<&GateRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.time_step).or_default().push(record);
    }
    groups
}
