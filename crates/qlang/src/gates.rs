//! Static gate tables.
//!
//! The scanner checks gate names against [`ALLOWED_GATES`]; the parser and
//! decompiler use [`classify`] to pick the operand syntax.

/// Every gate name the scanner accepts.
pub const ALLOWED_GATES: &[&str] = &[
    "H", "X", "Y", "Z", "S", "T", "S†", "T†", "Rx", "Ry", "Rz", "CNOT", "CX", "CZ", "SWAP",
    "Toffoli", "CCNOT", "CCZ", "MOD_EXP", "MOD_ADD", "MOD_MUL", "QFT", "QFT_INV",
];

/// Rotation gates that take an angle parameter.
pub const PARAMETRIC_GATES: &[&str] = &["Rx", "Ry", "Rz"];

/// Gates written `NAME control-target`.
pub const TWO_QUBIT_GATES: &[&str] = &["CNOT", "CX", "CZ", "SWAP"];

/// Gates written `NAME control1-control2-target`.
pub const THREE_QUBIT_GATES: &[&str] = &["Toffoli", "CCNOT", "CCZ"];

/// Gates written `NAME(base, modulus) controls-targets`.
pub const MODULAR_GATES: &[&str] = &["MOD_EXP", "MOD_ADD", "MOD_MUL"];

/// Gates applied once to a whole qubit list.
pub const REGISTER_GATES: &[&str] = &["QFT", "QFT_INV"];

/// Operand shape of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateClass {
    SingleQubit,
    TwoQubit,
    ThreeQubit,
    Modular,
    Register,
}

/// Whether the scanner accepts `name`.
pub fn is_known_gate(name: &str) -> bool {
    ALLOWED_GATES.contains(&name)
}

/// Whether `name` takes an angle parameter.
pub fn is_parametric(name: &str) -> bool {
    PARAMETRIC_GATES.contains(&name)
}

/// Classify a gate by name. Anything outside the multi-qubit tables is
/// treated as single-qubit.
pub fn classify(name: &str) -> GateClass {
    if TWO_QUBIT_GATES.contains(&name) {
        GateClass::TwoQubit
    } else if THREE_QUBIT_GATES.contains(&name) {
        GateClass::ThreeQubit
    } else if MODULAR_GATES.contains(&name) {
        GateClass::Modular
    } else if REGISTER_GATES.contains(&name) {
        GateClass::Register
    } else {
        GateClass::SingleQubit
    }
}
