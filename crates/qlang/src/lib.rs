//! Q-Lang: a line-oriented circuit description language
//!
//! This crate is the language front-end. It scans and parses Q-Lang source
//! into an AST, validates it against a qubit count, lowers it into flat
//! time-tagged gate records, and renders records back into source text.
//!
//! Each line of a program is one time step. Operations on a line are
//! separated by `;` and run in parallel, so they must touch disjoint qubits.
//!
//! # Supported Syntax
//!
//! | Construct | Example |
//! |-----------|---------|
//! | Qubit count | `qubits 3` (first line only) |
//! | Single-qubit gates | `H 0, 2, 4` |
//! | Rotations | `Rx(π/2) 0`, `Rz(pi/4) 1` |
//! | Two-qubit gates | `CNOT 0-1` |
//! | Three-qubit gates | `Toffoli 0-1-2` |
//! | Modular arithmetic | `MOD_EXP(7, 15) 0,1,2,3-4,5,6,7` |
//! | Register gates | `QFT 0, 1, 2` |
//! | Measurement | `measure 0 -> c0` |
//! | Conditionals | `if c0 == 1 and c1 then X 2` |
//! | Comments | `# comment` |
//!
//! # Example: Compiling Source
//!
//! ```rust
//! use qlang::compile_source;
//!
//! let source = r"
//!     H 0
//!     CNOT 0-1
//! ";
//!
//! let circuit = compile_source(source, 2).unwrap();
//! assert_eq!(circuit.records.len(), 2);
//! assert_eq!(circuit.records[1].control, Some(0));
//! ```
//!
//! # Example: Stage by Stage
//!
//! ```rust
//! use qlang::{compile, decompile, parse, validate};
//!
//! let program = parse("qubits 3\nH 0, 1; X 2\nToffoli 0-1-2").unwrap();
//! assert_eq!(program.num_qubits, Some(3));
//!
//! validate(&program, 3).unwrap();
//! let records = compile(&program);
//!
//! let source = decompile(&records, program.num_qubits);
//! assert!(source.contains("Toffoli 0-1-2"));
//! assert_eq!(parse(&source).unwrap().num_qubits, Some(3));
//! ```
//!
//! # Errors
//!
//! Every error reports the source line. [`ErrorKind`] tells the stages apart:
//!
//! ```rust
//! use qlang::{ErrorKind, compile_source};
//!
//! let err = compile_source("H 5", 3).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Semantic);
//!
//! let err = compile_source("FOO 0", 3).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Lexical);
//! ```

mod ast;
mod compiler;
mod decompiler;
mod error;
pub mod gates;
mod ir;
mod lexer;
mod parameter;
mod parser;
mod validator;

use tracing::{debug, instrument};

pub use ast::{
    Condition, Conditional, Measurement, ModularGate, Operation, Position, Program,
    RegisterGate, SingleQubitGate, ThreeQubitGate, TimeStep, TwoQubitGate,
};
pub use compiler::compile;
pub use decompiler::{decompile, format_angle, render_record};
pub use error::{
    Error, ErrorKind, EvalError, ParseError, ParseResult, Result, ValidationError,
    ValidationResult,
};
pub use ir::{CompiledCircuit, GateRecord, Guard, IF, MEASURE, ParamValue, Params};
pub use lexer::{Token, TokenKind, tokenize};
pub use parameter::{Parameter, evaluate};
pub use parser::parse;
pub use validator::validate;

/// Run the full pipeline: parse, validate, compile.
///
/// A leading `qubits N` directive takes precedence over `default_qubits`.
#[instrument(skip(source), fields(len = source.len()))]
pub fn compile_source(source: &str, default_qubits: usize) -> Result<CompiledCircuit> {
    let program = parse(source)?;
    let num_qubits = program.num_qubits.unwrap_or(default_qubits);

    validate(&program, num_qubits)?;
    let records = compile(&program);

    debug!(num_qubits, "Compiled {} records", records.len());
    Ok(CompiledCircuit::new(num_qubits, records))
}
