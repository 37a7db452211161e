//! Circuit execution backends.

use std::collections::BTreeMap;

use nalgebra_sparse::csr::CsrMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::circuit::{Circuit, Operation};
use crate::config::SimulatorConfig;
use crate::error::{QsimError, Result};
use crate::qstate::QState;
use crate::Qbit;

/// Histogram of classical bitstrings. Classical bit 0 is the rightmost
/// character.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Counts(BTreeMap<String, usize>);

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` occurrences of `bitstring`.
    pub fn record(&mut self, bitstring: String, count: usize) {
        *self.0.entry(bitstring).or_insert(0) += count;
    }

    pub fn get(&self, bitstring: &str) -> usize {
        self.0.get(bitstring).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Fraction of shots that produced `bitstring`.
    pub fn probability(&self, bitstring: &str) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.get(bitstring) as f64 / total as f64
    }

    pub fn most_frequent(&self) -> Option<&str> {
        self.0
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(bitstring, _)| bitstring.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ExecutionResult {
    pub backend: String,
    pub shots: usize,
    pub counts: Counts,
    /// Bitstring of every shot, in order. Empty when memory is disabled.
    pub memory: Vec<String>,
    /// Final state, only for circuits without resets or measurements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statevector: Option<Vec<Qbit>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BackendStatus {
    pub name: String,
    pub num_of_qbits: usize,
    pub simulator: bool,
    pub operational: bool,
    pub pending_jobs: usize,
}

/// Something that can execute a finished circuit.
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    fn status(&self) -> BackendStatus;

    fn run(&self, circuit: &Circuit, shots: usize) -> Result<ExecutionResult>;
}

/// Picks the operational backend with the fewest pending jobs among those
/// with at least `min_qubits` qubits.
pub fn select_least_busy(
    backends: &[Box<dyn Backend>],
    min_qubits: usize,
    allow_simulator: bool,
) -> Result<&dyn Backend> {
    backends
        .iter()
        .map(|backend| (backend, backend.status()))
        .filter(|(_, status)| {
            status.operational
                && status.num_of_qbits >= min_qubits
                && (allow_simulator || !status.simulator)
        })
        .min_by_key(|(_, status)| status.pending_jobs)
        .map(|(backend, status)| {
            debug!(backend = %status.name, pending_jobs = status.pending_jobs, "selected backend");
            &**backend
        })
        .ok_or_else(|| {
            QsimError::BackendUnavailable(format!(
                "no operational backend with at least {min_qubits} qubits"
            ))
        })
}

enum Step {
    Unitary(CsrMatrix<Qbit>),
    Reset(usize),
    Measure { qbit: usize, cbit: usize },
}

/// Local state-vector simulator.
///
/// Each shot starts from `|0...0>`. Resets and measurements sample from the
/// current state and collapse it.
pub struct StatevectorSimulator {
    config: SimulatorConfig,
}

impl StatevectorSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Rejects registers wider than `max_qubits`.
    pub fn check_width(&self, num_of_qbits: usize) -> Result<()> {
        if num_of_qbits > self.config.max_qubits {
            return Err(QsimError::BackendUnavailable(format!(
                "circuit has {} qubits, simulator supports at most {}",
                num_of_qbits, self.config.max_qubits
            )));
        }
        Ok(())
    }

    /// Final state of a unitary circuit started from `|0...0>`.
    pub fn statevector(&self, circuit: &Circuit) -> Result<QState> {
        self.check_width(circuit.num_of_qbits())?;
        circuit.apply(&QState::zero_state(circuit.num_of_qbits()))
    }

    /// Runs a unitary circuit on `state`.
    pub fn evolve(&self, circuit: &Circuit, state: &QState) -> Result<QState> {
        self.check_width(circuit.num_of_qbits())?;
        circuit.apply(state)
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    fn compile(circuit: &Circuit) -> Vec<Step> {
        circuit
            .operations()
            .iter()
            .filter_map(|op| match op {
                Operation::Reset(qbit) => Some(Step::Reset(*qbit)),
                Operation::Measure { qbit, cbit } => Some(Step::Measure {
                    qbit: *qbit,
                    cbit: *cbit,
                }),
                op => circuit.operation_matrix(op).map(Step::Unitary),
            })
            .collect()
    }

    fn sample(state: &mut QState, qbit: usize, rng: &mut StdRng) -> bool {
        let outcome = rng.random::<f64>() < state.probability_of_one(qbit);
        state.collapse(qbit, outcome);
        outcome
    }

    fn run_shot(num_of_qbits: usize, cbits: &mut [bool], steps: &[Step], rng: &mut StdRng) {
        let mut state = QState::zero_state(num_of_qbits);
        cbits.fill(false);

        for step in steps {
            match step {
                Step::Unitary(matrix) => state.apply_matrix(matrix),
                Step::Reset(qbit) => {
                    if Self::sample(&mut state, *qbit, rng) {
                        state.flip(*qbit);
                    }
                }
                Step::Measure { qbit, cbit } => {
                    cbits[*cbit] = Self::sample(&mut state, *qbit, rng);
                }
            }
        }
    }
}

impl Default for StatevectorSimulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

impl Backend for StatevectorSimulator {
    fn name(&self) -> &str {
        "statevector_simulator"
    }

    fn status(&self) -> BackendStatus {
        BackendStatus {
            name: self.name().to_string(),
            num_of_qbits: self.config.max_qubits,
            simulator: true,
            operational: true,
            pending_jobs: 0,
        }
    }

    #[instrument(skip(self, circuit), fields(qubits = circuit.num_of_qbits()))]
    fn run(&self, circuit: &Circuit, shots: usize) -> Result<ExecutionResult> {
        if shots == 0 {
            return Err(QsimError::InvalidShots);
        }
        self.check_width(circuit.num_of_qbits())?;

        let steps = Self::compile(circuit);
        debug!("Circuit has {} steps", steps.len());

        let statevector = circuit.is_unitary().then(|| {
            let mut state = QState::zero_state(circuit.num_of_qbits());
            for step in &steps {
                if let Step::Unitary(matrix) = step {
                    state.apply_matrix(matrix);
                }
            }
            state.amplitudes().to_vec()
        });

        let mut rng = self.rng();
        let mut counts = Counts::new();
        let mut memory = Vec::new();
        let mut cbits = vec![false; circuit.num_of_cbits()];

        if circuit.num_of_cbits() > 0 {
            for _ in 0..shots {
                Self::run_shot(circuit.num_of_qbits(), &mut cbits, &steps, &mut rng);

                let bitstring = cbits
                    .iter()
                    .rev()
                    .map(|bit| if *bit { '1' } else { '0' })
                    .collect::<String>();
                if self.config.memory {
                    memory.push(bitstring.clone());
                }
                counts.record(bitstring, 1);
            }
        }

        debug!(shots, outcomes = counts.len(), "Simulation completed");

        Ok(ExecutionResult {
            backend: self.name().to_string(),
            shots,
            counts,
            memory,
            statevector,
        })
    }
}
