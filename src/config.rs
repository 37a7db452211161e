use serde::{Deserialize, Serialize};

/// Settings for [`StatevectorSimulator`](crate::backend::StatevectorSimulator).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Shots used when the caller does not ask for a specific number.
    pub shots: usize,
    /// Fixed RNG seed for reproducible sampling.
    pub seed: Option<u64>,
    /// Widest circuit the simulator accepts.
    pub max_qubits: usize,
    /// Keep the per-shot bitstrings.
    pub memory: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            shots: 1024,
            seed: None,
            max_qubits: 16,
            memory: true,
        }
    }
}

impl SimulatorConfig {
    pub fn with_shots(mut self, shots: usize) -> Self {
        self.shots = shots;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }
}
