//! Error types for the Q-Lang front-end.
//!
//! Each pipeline stage has its own error enum. [`Error`] wraps them for the
//! combined [`compile_source`](crate::compile_source) entry point.

use thiserror::Error;

/// Broad category of a front-end error, ordered by the stage that detects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown gate name or unrecognized character (scanner).
    Lexical,
    /// Token mismatch or malformed construct (parser).
    Syntax,
    /// Well-formed program that violates a circuit rule (validator).
    Semantic,
}

/// Errors raised while scanning or parsing source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Gate name not in the allow-list.
    #[error("Line {line}:{column}: Unknown gate '{name}'")]
    UnknownGate {
        name: String,
        line: usize,
        column: usize,
    },

    /// Character not matched by any token pattern.
    #[error("Line {line}:{column}: Invalid character '{text}'")]
    InvalidCharacter {
        text: String,
        line: usize,
        column: usize,
    },

    /// Unexpected token.
    #[error("Line {line}:{column}: Expected {expected}, got {found} ({text:?})")]
    UnexpectedToken {
        expected: String,
        found: String,
        text: String,
        line: usize,
        column: usize,
    },

    /// `if ... then if ...`.
    #[error("Line {line}:{column}: Nested if-statements are not supported")]
    NestedConditional { line: usize, column: usize },

    /// Bit comparison against something other than 0 or 1.
    #[error("Line {line}:{column}: Classical bit value must be 0 or 1, got {value}")]
    InvalidBitValue {
        value: String,
        line: usize,
        column: usize,
    },

    /// Modular gate parameters are not `(base, modulus)` integers.
    #[error(
        "Line {line}:{column}: Gate '{gate}' expects integer parameters (base, modulus), got ({text})"
    )]
    InvalidModularParameters {
        gate: String,
        text: String,
        line: usize,
        column: usize,
    },

    /// `qubits N` after the first operation.
    #[error("Line {line}:{column}: 'qubits' directive must precede all operations")]
    MisplacedDirective { line: usize, column: usize },

    /// Condition with more `and`/`or` terms than the parser accepts.
    #[error("Line {line}:{column}: Condition has more than {limit} terms")]
    ConditionTooLong {
        limit: usize,
        line: usize,
        column: usize,
    },

    /// Integer literal that does not fit a qubit index.
    #[error("Line {line}:{column}: Integer literal '{text}' is too large")]
    IntegerOverflow {
        text: String,
        line: usize,
        column: usize,
    },
}

impl ParseError {
    /// The stage category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnknownGate { .. } | ParseError::InvalidCharacter { .. } => {
                ErrorKind::Lexical
            }
            _ => ErrorKind::Syntax,
        }
    }

    /// Source line the error points at.
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnknownGate { line, .. }
            | ParseError::InvalidCharacter { line, .. }
            | ParseError::UnexpectedToken { line, .. }
            | ParseError::NestedConditional { line, .. }
            | ParseError::InvalidBitValue { line, .. }
            | ParseError::InvalidModularParameters { line, .. }
            | ParseError::MisplacedDirective { line, .. }
            | ParseError::ConditionTooLong { line, .. }
            | ParseError::IntegerOverflow { line, .. } => *line,
        }
    }
}

/// Semantic errors raised by the validator.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// Qubit index outside `[0, num_qubits)`.
    #[error("Line {line}: Qubit {qubit} out of range (circuit has {num_qubits} qubits)")]
    QubitOutOfRange {
        qubit: usize,
        num_qubits: usize,
        line: usize,
    },

    /// Qubits shared between operations of one time step.
    #[error("Line {line}: Qubit(s) {qubits:?} used multiple times in same time step")]
    QubitReuse { qubits: Vec<usize>, line: usize },

    /// Two-qubit gate whose control is its target.
    #[error("Line {line}: Control and target qubits cannot be the same ({qubit})")]
    ControlEqualsTarget { qubit: usize, line: usize },

    /// Three-qubit gate with coinciding indices.
    #[error("Line {line}: Control and target qubits must be distinct (got {qubits:?})")]
    QubitsNotDistinct { qubits: [usize; 3], line: usize },

    /// Modular gate registers sharing qubits.
    #[error("Line {line}: Qubit(s) {qubits:?} appear in both control and target registers")]
    RegisterOverlap { qubits: Vec<usize>, line: usize },

    /// Repeated index in one qubit list.
    #[error("Line {line}: Duplicate qubit(s) {qubits:?} in gate operation")]
    DuplicateQubits { qubits: Vec<usize>, line: usize },

    /// Gate with an empty qubit list or register.
    #[error("Line {line}: Gate '{gate}' has an empty qubit register")]
    EmptyRegister { gate: String, line: usize },

    /// Parametric gate without a parameter.
    #[error("Line {line}: Gate '{gate}' requires a parameter")]
    MissingParameter { gate: String, line: usize },

    /// Parameter on a gate that takes none.
    #[error("Line {line}: Gate '{gate}' does not accept parameters")]
    UnexpectedParameter { gate: String, line: usize },

    /// Parameter expression that cannot be evaluated.
    #[error("Line {line}: {source}")]
    InvalidParameter {
        #[source]
        source: EvalError,
        line: usize,
    },
}

impl ValidationError {
    /// The stage category of this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Semantic
    }

    /// Source line of the offending operation.
    pub fn line(&self) -> usize {
        match self {
            ValidationError::QubitOutOfRange { line, .. }
            | ValidationError::QubitReuse { line, .. }
            | ValidationError::ControlEqualsTarget { line, .. }
            | ValidationError::QubitsNotDistinct { line, .. }
            | ValidationError::RegisterOverlap { line, .. }
            | ValidationError::DuplicateQubits { line, .. }
            | ValidationError::EmptyRegister { line, .. }
            | ValidationError::MissingParameter { line, .. }
            | ValidationError::UnexpectedParameter { line, .. }
            | ValidationError::InvalidParameter { line, .. } => *line,
        }
    }
}

/// Failure to evaluate a gate parameter expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid parameter expression '{expression}': {reason}")]
pub struct EvalError {
    /// The expression as written, without parentheses.
    pub expression: String,
    /// What went wrong.
    pub reason: String,
}

/// Any error from the full source-to-IR pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// Scanning or parsing failed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// The stage category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse(e) => e.kind(),
            Error::Validation(e) => e.kind(),
        }
    }
}

/// Result type for scanning and parsing.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result type for validation.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Result type for the full pipeline.
pub type Result<T> = std::result::Result<T, Error>;
