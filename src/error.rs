//! Error types for circuit construction and simulation.

use thiserror::Error;

/// Errors that can occur while building or running circuits.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QsimError {
    /// A register size exceeds the number of qubits in the circuit.
    #[error("Register size {n} is out of range for a circuit of {num_of_qbits} qubits")]
    InvalidRegisterSize {
        /// Requested register size.
        n: usize,
        /// Number of qubits in the circuit.
        num_of_qbits: usize,
    },

    /// Qubit index out of range.
    #[error("Index {index} is out of bounds for the number of qubits {num_of_qbits}")]
    IndexOutOfRange { index: usize, num_of_qbits: usize },

    /// Classical bit index out of range.
    #[error("Classical bit {index} is out of bounds for the number of classical bits {num_of_cbits}")]
    ClbitOutOfRange { index: usize, num_of_cbits: usize },

    /// The same qubit is used twice in one gate.
    #[error("Qubit {0} is used more than once in a single gate")]
    DuplicateQubit(usize),

    /// Circuit and state (or two circuits) disagree on the number of qubits.
    #[error("Expected {expected} qubits, got {got}")]
    QubitCountMismatch { expected: usize, got: usize },

    /// The circuit contains a reset or measurement.
    #[error("Operation '{0}' is not unitary")]
    NonUnitary(&'static str),

    /// A state vector length is not a non-zero power of two.
    #[error("State vector length must be a non-zero power of 2, got {0}")]
    InvalidStateLength(usize),

    /// A basis label contains something other than `0` and `1`.
    #[error("Invalid basis state label '{0}'")]
    InvalidBasisLabel(String),

    /// A logic gate input is not one of the two accepted symbols.
    #[error("Input value not allowed: '{0}' (expected '0' or '1')")]
    UnsupportedInputEncoding(String),

    /// A logic gate name that is not one of NOT, XOR, AND, NAND, OR.
    #[error("Unknown logic gate '{0}'")]
    UnknownGate(String),

    /// A logic gate received the wrong number of inputs.
    #[error("Gate '{gate}' takes {expected} inputs, got {got}")]
    InvalidArity {
        gate: &'static str,
        expected: usize,
        got: usize,
    },

    /// Zero shots requested.
    #[error("Number of shots must be at least 1")]
    InvalidShots,

    /// No backend can run the circuit.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// Result type for circuit and simulation operations.
pub type Result<T> = std::result::Result<T, QsimError>;
