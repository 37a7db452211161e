//! Classical logic gates built from qubit operations.
//!
//! Every circuit resets its qubits, encodes the inputs with `X`, applies the
//! gate and measures one qubit into classical bit 0.

use std::fmt::Display;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::backend::{Backend, Counts};
use crate::circuit::Circuit;
use crate::error::{QsimError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Bit {
    Zero,
    One,
}

impl Bit {
    pub fn is_set(self) -> bool {
        self == Bit::One
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value {
            Bit::One
        } else {
            Bit::Zero
        }
    }
}

impl TryFrom<char> for Bit {
    type Error = QsimError;

    fn try_from(value: char) -> Result<Self> {
        match value {
            '0' => Ok(Bit::Zero),
            '1' => Ok(Bit::One),
            other => Err(QsimError::UnsupportedInputEncoding(other.to_string())),
        }
    }
}

impl FromStr for Bit {
    type Err = QsimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "0" => Ok(Bit::Zero),
            "1" => Ok(Bit::One),
            other => Err(QsimError::UnsupportedInputEncoding(other.to_string())),
        }
    }
}

impl Display for Bit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bit::Zero => write!(f, "0"),
            Bit::One => write!(f, "1"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LogicGate {
    Not,
    Xor,
    And,
    Nand,
    Or,
}

impl LogicGate {
    pub const ALL: [LogicGate; 5] = [
        LogicGate::Not,
        LogicGate::Xor,
        LogicGate::And,
        LogicGate::Nand,
        LogicGate::Or,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LogicGate::Not => "NOT",
            LogicGate::Xor => "XOR",
            LogicGate::And => "AND",
            LogicGate::Nand => "NAND",
            LogicGate::Or => "OR",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            LogicGate::Not => 1,
            _ => 2,
        }
    }

    fn check_arity(self, inputs: &[Bit]) -> Result<()> {
        if inputs.len() != self.arity() {
            return Err(QsimError::InvalidArity {
                gate: self.name(),
                expected: self.arity(),
                got: inputs.len(),
            });
        }
        Ok(())
    }

    /// The classical answer.
    pub fn truth(self, inputs: &[Bit]) -> Result<Bit> {
        self.check_arity(inputs)?;

        let a = inputs[0].is_set();
        let b = inputs.get(1).is_some_and(|bit| bit.is_set());
        let out = match self {
            LogicGate::Not => !a,
            LogicGate::Xor => a != b,
            LogicGate::And => a && b,
            LogicGate::Nand => !(a && b),
            LogicGate::Or => a || b,
        };
        Ok(out.into())
    }

    /// All input combinations, in counting order.
    pub fn truth_table_inputs(self) -> Vec<Vec<Bit>> {
        (0..1_usize << self.arity())
            .map(|n| {
                (0..self.arity())
                    .rev()
                    .map(|i| Bit::from((n >> i) & 1 == 1))
                    .collect()
            })
            .collect()
    }

    pub fn circuit(self, inputs: &[Bit]) -> Result<Circuit> {
        self.check_arity(inputs)?;

        let num_of_qbits = match self {
            LogicGate::Not => 1,
            LogicGate::Xor => 2,
            LogicGate::And | LogicGate::Nand | LogicGate::Or => 3,
        };

        let mut circuit = Circuit::with_clbits(num_of_qbits, 1);
        for qbit in 0..num_of_qbits {
            circuit.add_reset(qbit)?;
        }
        if self == LogicGate::Nand {
            // Target starts in |1>
            circuit.add_x(2)?;
        }

        for (qbit, input) in inputs.iter().enumerate() {
            if input.is_set() {
                circuit.add_x(qbit)?;
            }
        }
        circuit.add_barrier();

        let output = match self {
            LogicGate::Not => {
                circuit.add_x(0)?;
                circuit.add_barrier();
                0
            }
            LogicGate::Xor => {
                circuit.add_cnot(0, 1)?;
                circuit.add_barrier();
                1
            }
            LogicGate::And | LogicGate::Nand => {
                circuit.add_toffoli(0, 1, 2)?;
                circuit.add_barrier();
                2
            }
            LogicGate::Or => {
                circuit.add_toffoli(0, 1, 2)?;
                circuit.add_cnot(0, 1)?;
                circuit.add_cnot(2, 1)?;
                1
            }
        };
        circuit.add_measure(output, 0)?;

        Ok(circuit)
    }
}

impl Display for LogicGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LogicGate {
    type Err = QsimError;

    fn from_str(s: &str) -> Result<Self> {
        LogicGate::ALL
            .into_iter()
            .find(|gate| gate.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| QsimError::UnknownGate(s.to_string()))
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LogicOutcome {
    pub gate: LogicGate,
    pub inputs: Vec<Bit>,
    pub expected: Bit,
    /// Output of the first shot.
    pub output: String,
    pub counts: Counts,
    /// Fraction of shots that gave the classical answer.
    pub success_probability: f64,
    pub depth: usize,
    pub nonlocal_gates: usize,
}

/// Builds the circuit for `gate`, runs it on `backend` and scores the result.
pub fn evaluate(
    gate: LogicGate,
    inputs: &[Bit],
    backend: &dyn Backend,
    shots: usize,
) -> Result<LogicOutcome> {
    let expected = gate.truth(inputs)?;
    let circuit = gate.circuit(inputs)?;
    let result = backend.run(&circuit, shots)?;

    let output = result
        .memory
        .first()
        .cloned()
        .or_else(|| result.counts.most_frequent().map(str::to_string))
        .unwrap_or_default();
    let success_probability = result.counts.probability(&expected.to_string());

    debug!(
        gate = gate.name(),
        ?inputs,
        %output,
        success_probability,
        "evaluated logic gate"
    );

    Ok(LogicOutcome {
        gate,
        inputs: inputs.to_vec(),
        expected,
        output,
        counts: result.counts,
        success_probability,
        depth: circuit.depth(),
        nonlocal_gates: circuit.num_nonlocal_gates(),
    })
}
