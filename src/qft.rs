//! Quantum Fourier Transform construction.
//!
//! All builders act on qubits `0..n` of an existing circuit and check `n`
//! before appending anything, so a failed call leaves the circuit untouched.

use std::f64::consts::PI;

use tracing::debug;

use crate::circuit::Circuit;
use crate::error::Result;

/// Appends the Hadamard and controlled-phase part of the QFT on qubits `0..n`.
///
/// The most significant qubit is processed first: qubit `j` gets a Hadamard
/// followed by a phase of `π / 2^(j - c)` controlled by every lower qubit `c`.
pub fn apply_qft_rotations(circuit: &mut Circuit, n: usize) -> Result<()> {
    circuit.check_register_size(n)?;
    let before = circuit.len();

    for target in (0..n).rev() {
        circuit.add_h(target)?;
        for control in 0..target {
            let angle = PI / 2f64.powi((target - control) as i32);
            circuit.add_cphase(control, target, angle)?;
        }
    }

    debug!(n, appended = circuit.len() - before, "qft rotations");
    Ok(())
}

/// Reverses the order of qubits `0..n`.
pub fn swap_registers(circuit: &mut Circuit, n: usize) -> Result<()> {
    circuit.check_register_size(n)?;

    for qbit in 0..n / 2 {
        circuit.add_swap(qbit, n - 1 - qbit)?;
    }
    Ok(())
}

/// Appends the QFT on qubits `0..n` and returns the circuit for chaining.
///
/// Applying this twice is not the identity: QFT² maps `|x>` to `|-x mod 2^n>`.
pub fn qft(circuit: &mut Circuit, n: usize) -> Result<&mut Circuit> {
    apply_qft_rotations(circuit, n)?;
    swap_registers(circuit, n)?;
    Ok(circuit)
}

/// Appends the inverse QFT on qubits `0..n`.
///
/// The forward transform is built on a scratch circuit and inverted gate by
/// gate, then spliced onto `circuit` as primitive gates.
pub fn inverse_qft(circuit: &mut Circuit, n: usize) -> Result<&mut Circuit> {
    circuit.check_register_size(n)?;

    let inverse = inverse_qft_circuit(n)?;
    let qbits = (0..n).collect::<Vec<_>>();
    circuit.append(&inverse, &qbits)?;

    debug!(n, appended = inverse.len(), "inverse qft");
    Ok(circuit)
}

/// A fresh `n` qubit circuit holding only the QFT.
pub fn qft_circuit(n: usize) -> Result<Circuit> {
    let mut circuit = Circuit::new(n);
    qft(&mut circuit, n)?;
    Ok(circuit)
}

/// A fresh `n` qubit circuit holding only the inverse QFT.
pub fn inverse_qft_circuit(n: usize) -> Result<Circuit> {
    qft_circuit(n)?.inverse()
}

/// Prepares `value` in the Fourier basis on qubits `0..n`.
///
/// Qubit `q` gets `H` then a phase of `value * 2π / 2^(n - q)`, which is the
/// state `qft` produces from `|value mod 2^n>`.
pub fn encode_fourier_basis(circuit: &mut Circuit, n: usize, value: u64) -> Result<()> {
    circuit.check_register_size(n)?;

    for qbit in 0..n {
        // Only the low `n - qbit` bits of `value` change the phase
        let bits = n - qbit;
        let reduced = if bits < 64 {
            value & ((1_u64 << bits) - 1)
        } else {
            value
        };
        let angle = reduced as f64 * 2.0 * PI / 2f64.powi(bits as i32);
        circuit.add_h(qbit)?;
        circuit.add_phase(qbit, angle)?;
    }
    Ok(())
}
