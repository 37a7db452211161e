pub mod backend;
pub mod circuit;
pub mod config;
pub mod error;
pub mod gates;
pub mod logic;
pub mod qft;
pub mod qstate;
mod test_util;

use num_complex::Complex;

pub use backend::{Backend, Counts, ExecutionResult, StatevectorSimulator};
pub use circuit::Circuit;
pub use config::SimulatorConfig;
pub use error::{QsimError, Result};
pub use qstate::QState;

pub type Qbit = Complex<f64>;
