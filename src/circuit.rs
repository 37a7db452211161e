use std::collections::BTreeMap;
use std::fmt::Display;

use nalgebra_sparse::{coo::CooMatrix, csr::CsrMatrix};
use num_complex::Complex;

use crate::error::{QsimError, Result};
use crate::gates::{h_matrix, phase_matrix, x_matrix, y_matrix, z_matrix};
use crate::qstate::QState;
use crate::Qbit;

/// Single-qubit unitaries. Controlled forms reuse the same kinds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GateKind {
    H,
    X,
    Y,
    Z,
    Phase(f64),
}

impl GateKind {
    pub fn matrix(&self) -> CsrMatrix<Qbit> {
        match self {
            GateKind::H => h_matrix(),
            GateKind::X => x_matrix(),
            GateKind::Y => y_matrix(),
            GateKind::Z => z_matrix(),
            GateKind::Phase(angle) => phase_matrix(*angle),
        }
    }

    pub fn inverse(&self) -> Self {
        match self {
            GateKind::Phase(angle) => GateKind::Phase(-angle),
            kind => *kind,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GateKind::H => "h",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::Phase(_) => "p",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Gate {
        kind: GateKind,
        qbit: usize,
    },
    Controlled {
        kind: GateKind,
        controls: Vec<usize>,
        target: usize,
    },
    Swap(usize, usize),
    Reset(usize),
    Measure {
        qbit: usize,
        cbit: usize,
    },
    Barrier,
}

impl Operation {
    pub fn name(&self) -> String {
        match self {
            Operation::Gate { kind, .. } => kind.name().to_string(),
            Operation::Controlled { kind, controls, .. } => {
                format!("{}{}", "c".repeat(controls.len()), kind.name())
            }
            Operation::Swap(..) => "swap".to_string(),
            Operation::Reset(_) => "reset".to_string(),
            Operation::Measure { .. } => "measure".to_string(),
            Operation::Barrier => "barrier".to_string(),
        }
    }

    /// Qubits touched by this operation. Empty for barriers.
    pub fn qbits(&self) -> Vec<usize> {
        match self {
            Operation::Gate { qbit, .. } => vec![*qbit],
            Operation::Controlled {
                controls, target, ..
            } => {
                let mut qbits = controls.clone();
                qbits.push(*target);
                qbits
            }
            Operation::Swap(a, b) => vec![*a, *b],
            Operation::Reset(qbit) => vec![*qbit],
            Operation::Measure { qbit, .. } => vec![*qbit],
            Operation::Barrier => Vec::new(),
        }
    }

    pub fn is_unitary(&self) -> bool {
        !matches!(self, Operation::Reset(_) | Operation::Measure { .. })
    }

    pub fn inverse(&self) -> Result<Self> {
        let inverse = match self {
            Operation::Gate { kind, qbit } => Operation::Gate {
                kind: kind.inverse(),
                qbit: *qbit,
            },
            Operation::Controlled {
                kind,
                controls,
                target,
            } => Operation::Controlled {
                kind: kind.inverse(),
                controls: controls.clone(),
                target: *target,
            },
            Operation::Swap(a, b) => Operation::Swap(*a, *b),
            Operation::Barrier => Operation::Barrier,
            Operation::Reset(_) => return Err(QsimError::NonUnitary("reset")),
            Operation::Measure { .. } => return Err(QsimError::NonUnitary("measure")),
        };
        Ok(inverse)
    }

    fn map_qbits(&self, map: &[usize]) -> Self {
        match self {
            Operation::Gate { kind, qbit } => Operation::Gate {
                kind: *kind,
                qbit: map[*qbit],
            },
            Operation::Controlled {
                kind,
                controls,
                target,
            } => Operation::Controlled {
                kind: *kind,
                controls: controls.iter().map(|c| map[*c]).collect(),
                target: map[*target],
            },
            Operation::Swap(a, b) => Operation::Swap(map[*a], map[*b]),
            Operation::Reset(qbit) => Operation::Reset(map[*qbit]),
            Operation::Measure { qbit, cbit } => Operation::Measure {
                qbit: map[*qbit],
                cbit: *cbit,
            },
            Operation::Barrier => Operation::Barrier,
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let qbits = self
            .qbits()
            .iter()
            .map(|q| format!("q[{q}]"))
            .collect::<Vec<_>>()
            .join(", ");

        match self {
            Operation::Gate {
                kind: GateKind::Phase(angle),
                ..
            }
            | Operation::Controlled {
                kind: GateKind::Phase(angle),
                ..
            } => write!(f, "{}({:.6}) {}", self.name(), angle, qbits),
            Operation::Measure { cbit, .. } => write!(f, "measure {} -> c[{}]", qbits, cbit),
            Operation::Barrier => write!(f, "barrier"),
            _ => write!(f, "{} {}", self.name(), qbits),
        }
    }
}

/// An ordered list of operations over `num_of_qbits` qubits and
/// `num_of_cbits` classical bits.
///
/// Every stored operation has already been checked against both registers,
/// so building matrices from them cannot fail.
#[derive(Clone, Debug, PartialEq)]
pub struct Circuit {
    operations: Vec<Operation>,
    num_of_qbits: usize,
    num_of_cbits: usize,
}

impl Circuit {
    pub fn new(num_of_qbits: usize) -> Self {
        Self::with_clbits(num_of_qbits, 0)
    }

    pub fn with_clbits(num_of_qbits: usize, num_of_cbits: usize) -> Self {
        Self {
            operations: Vec::new(),
            num_of_qbits,
            num_of_cbits,
        }
    }

    pub fn num_of_qbits(&self) -> usize {
        self.num_of_qbits
    }

    pub fn num_of_cbits(&self) -> usize {
        self.num_of_cbits
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn is_unitary(&self) -> bool {
        self.operations.iter().all(Operation::is_unitary)
    }

    pub fn check_index(&self, index: usize) -> Result<usize> {
        if index >= self.num_of_qbits {
            return Err(QsimError::IndexOutOfRange {
                index,
                num_of_qbits: self.num_of_qbits,
            });
        }
        Ok(index)
    }

    /// Fails with [`QsimError::InvalidRegisterSize`] unless `n` qubits fit.
    pub fn check_register_size(&self, n: usize) -> Result<()> {
        if n > self.num_of_qbits {
            return Err(QsimError::InvalidRegisterSize {
                n,
                num_of_qbits: self.num_of_qbits,
            });
        }
        Ok(())
    }

    fn check_operation(&self, operation: &Operation) -> Result<()> {
        let qbits = operation.qbits();
        for (i, &qbit) in qbits.iter().enumerate() {
            self.check_index(qbit)?;
            if qbits[..i].contains(&qbit) {
                return Err(QsimError::DuplicateQubit(qbit));
            }
        }

        if let Operation::Measure { cbit, .. } = operation {
            if *cbit >= self.num_of_cbits {
                return Err(QsimError::ClbitOutOfRange {
                    index: *cbit,
                    num_of_cbits: self.num_of_cbits,
                });
            }
        }

        Ok(())
    }

    pub fn add_operation(&mut self, operation: Operation) -> Result<()> {
        self.check_operation(&operation)?;
        self.operations.push(operation);
        Ok(())
    }

    pub fn add_gate(&mut self, kind: GateKind, index: usize) -> Result<()> {
        self.add_operation(Operation::Gate { kind, qbit: index })
    }

    pub fn add_h(&mut self, index: usize) -> Result<()> {
        self.add_gate(GateKind::H, index)
    }

    pub fn add_x(&mut self, index: usize) -> Result<()> {
        self.add_gate(GateKind::X, index)
    }

    pub fn add_y(&mut self, index: usize) -> Result<()> {
        self.add_gate(GateKind::Y, index)
    }

    pub fn add_z(&mut self, index: usize) -> Result<()> {
        self.add_gate(GateKind::Z, index)
    }

    pub fn add_phase(&mut self, index: usize, angle: f64) -> Result<()> {
        self.add_gate(GateKind::Phase(angle), index)
    }

    pub fn add_control(&mut self, controls: &[usize], target: usize, kind: GateKind) -> Result<()> {
        self.add_operation(Operation::Controlled {
            kind,
            controls: controls.to_vec(),
            target,
        })
    }

    pub fn add_cnot(&mut self, control: usize, target: usize) -> Result<()> {
        self.add_control(&[control], target, GateKind::X)
    }

    pub fn add_cphase(&mut self, control: usize, target: usize, angle: f64) -> Result<()> {
        self.add_control(&[control], target, GateKind::Phase(angle))
    }

    pub fn add_toffoli(&mut self, control1: usize, control2: usize, target: usize) -> Result<()> {
        self.add_control(&[control1, control2], target, GateKind::X)
    }

    pub fn add_swap(&mut self, index1: usize, index2: usize) -> Result<()> {
        self.add_operation(Operation::Swap(index1, index2))
    }

    pub fn add_reset(&mut self, index: usize) -> Result<()> {
        self.add_operation(Operation::Reset(index))
    }

    pub fn add_measure(&mut self, qbit: usize, cbit: usize) -> Result<()> {
        self.add_operation(Operation::Measure { qbit, cbit })
    }

    pub fn add_barrier(&mut self) {
        self.operations.push(Operation::Barrier);
    }

    #[allow(non_snake_case)]
    pub fn H(mut self, index: usize) -> Result<Self> {
        self.add_h(index)?;
        Ok(self)
    }

    pub fn x(mut self, index: usize) -> Result<Self> {
        self.add_x(index)?;
        Ok(self)
    }

    pub fn phase(mut self, index: usize, angle: f64) -> Result<Self> {
        self.add_phase(index, angle)?;
        Ok(self)
    }

    pub fn cnot(mut self, control: usize, target: usize) -> Result<Self> {
        self.add_cnot(control, target)?;
        Ok(self)
    }

    pub fn cp(mut self, control: usize, target: usize, angle: f64) -> Result<Self> {
        self.add_cphase(control, target, angle)?;
        Ok(self)
    }

    pub fn toffoli(mut self, control1: usize, control2: usize, target: usize) -> Result<Self> {
        self.add_toffoli(control1, control2, target)?;
        Ok(self)
    }

    pub fn swap(mut self, index1: usize, index2: usize) -> Result<Self> {
        self.add_swap(index1, index2)?;
        Ok(self)
    }

    pub fn reset(mut self, index: usize) -> Result<Self> {
        self.add_reset(index)?;
        Ok(self)
    }

    pub fn measure(mut self, qbit: usize, cbit: usize) -> Result<Self> {
        self.add_measure(qbit, cbit)?;
        Ok(self)
    }

    pub fn barrier(mut self) -> Self {
        self.add_barrier();
        self
    }

    /// Reversed circuit with every gate replaced by its inverse.
    pub fn inverse(&self) -> Result<Circuit> {
        let operations = self
            .operations
            .iter()
            .rev()
            .map(Operation::inverse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Circuit {
            operations,
            num_of_qbits: self.num_of_qbits,
            num_of_cbits: self.num_of_cbits,
        })
    }

    /// Appends `other` with its qubit `i` placed on `qbits[i]`.
    ///
    /// Nothing is appended unless the whole mapping is valid.
    pub fn append(&mut self, other: &Circuit, qbits: &[usize]) -> Result<()> {
        if qbits.len() != other.num_of_qbits {
            return Err(QsimError::QubitCountMismatch {
                expected: other.num_of_qbits,
                got: qbits.len(),
            });
        }
        for (i, &qbit) in qbits.iter().enumerate() {
            self.check_index(qbit)?;
            if qbits[..i].contains(&qbit) {
                return Err(QsimError::DuplicateQubit(qbit));
            }
        }
        if other.num_of_cbits > self.num_of_cbits {
            return Err(QsimError::ClbitOutOfRange {
                index: other.num_of_cbits - 1,
                num_of_cbits: self.num_of_cbits,
            });
        }

        self.operations
            .extend(other.operations.iter().map(|op| op.map_qbits(qbits)));
        Ok(())
    }

    /// Appends `other` onto qubits `offset..offset + other.num_of_qbits()`.
    pub fn compose(&mut self, other: &Circuit, offset: usize) -> Result<()> {
        let end = offset
            .checked_add(other.num_of_qbits)
            .ok_or(QsimError::IndexOutOfRange {
                index: offset,
                num_of_qbits: self.num_of_qbits,
            })?;
        let qbits = (offset..end).collect::<Vec<_>>();
        self.append(other, &qbits)
    }

    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for op in &self.operations {
            *counts.entry(op.name()).or_insert(0) += 1;
        }
        counts
    }

    /// Operations that act on two or more qubits.
    pub fn num_nonlocal_gates(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| op.is_unitary() && op.qbits().len() >= 2)
            .count()
    }

    /// Length of the critical path. Barriers do not count.
    pub fn depth(&self) -> usize {
        let mut qbit_levels = vec![0; self.num_of_qbits];
        let mut cbit_levels = vec![0; self.num_of_cbits];

        for op in &self.operations {
            let qbits = op.qbits();
            let cbit = match op {
                Operation::Measure { cbit, .. } => Some(*cbit),
                _ => None,
            };
            if qbits.is_empty() {
                continue;
            }

            let level = qbits
                .iter()
                .map(|q| qbit_levels[*q])
                .chain(cbit.map(|c| cbit_levels[c]))
                .max()
                .unwrap_or(0)
                + 1;

            for q in qbits {
                qbit_levels[q] = level;
            }
            if let Some(c) = cbit {
                cbit_levels[c] = level;
            }
        }

        qbit_levels
            .into_iter()
            .chain(cbit_levels)
            .max()
            .unwrap_or(0)
    }

    fn create_gate_for_index(&self, index: usize, gate: &CsrMatrix<Qbit>) -> CsrMatrix<Qbit> {
        let mut matrix = CsrMatrix::identity(1);
        for i in (0..self.num_of_qbits).rev() {
            if i == index {
                matrix = kronecker_product(&matrix, gate);
            } else {
                matrix = kronecker_product(&matrix, &CsrMatrix::identity(2));
            }
        }

        matrix
    }

    fn build_control_matrix(
        &self,
        controls: &[usize],
        target: usize,
        gate: &CsrMatrix<Qbit>,
    ) -> CsrMatrix<Qbit> {
        // |1><1|
        let mut one_one = CooMatrix::new(2, 2);
        one_one.push(1, 1, Complex::new(1.0, 0.0));
        let one_one = CsrMatrix::from(&one_one);

        let id = CsrMatrix::identity(2);

        // All controls set, identity on the target
        let mut projector = CsrMatrix::identity(1);
        // All controls set, gate on the target
        let mut one_matrix = CsrMatrix::identity(1);
        for i in (0..self.num_of_qbits).rev() {
            if controls.contains(&i) {
                projector = kronecker_product(&projector, &one_one);
                one_matrix = kronecker_product(&one_matrix, &one_one);
            } else if i == target {
                projector = kronecker_product(&projector, &id);
                one_matrix = kronecker_product(&one_matrix, gate);
            } else {
                projector = kronecker_product(&projector, &id);
                one_matrix = kronecker_product(&one_matrix, &id);
            }
        }

        let identity: CsrMatrix<Qbit> = CsrMatrix::identity(1 << self.num_of_qbits);
        identity - projector + one_matrix
    }

    fn build_swap_matrix(&self, index1: usize, index2: usize) -> CsrMatrix<Qbit> {
        let dim = 1 << self.num_of_qbits;
        let mut swap = CooMatrix::new(dim, dim);
        for col in 0..dim {
            let bit1 = (col >> index1) & 1;
            let bit2 = (col >> index2) & 1;
            let row = if bit1 == bit2 {
                col
            } else {
                col ^ ((1 << index1) | (1 << index2))
            };
            swap.push(row, col, Complex::new(1.0, 0.0));
        }
        CsrMatrix::from(&swap)
    }

    /// Full-register matrix of a unitary operation, `None` for barriers and
    /// non-unitary operations.
    pub(crate) fn operation_matrix(&self, operation: &Operation) -> Option<CsrMatrix<Qbit>> {
        match operation {
            Operation::Gate { kind, qbit } => {
                Some(self.create_gate_for_index(*qbit, &kind.matrix()))
            }
            Operation::Controlled {
                kind,
                controls,
                target,
            } => Some(self.build_control_matrix(controls, *target, &kind.matrix())),
            Operation::Swap(a, b) => Some(self.build_swap_matrix(*a, *b)),
            Operation::Reset(_) | Operation::Measure { .. } | Operation::Barrier => None,
        }
    }

    /// Evolves `state` through the circuit. Only unitary circuits can be
    /// applied this way; use a backend for measurements and resets.
    pub fn apply(&self, state: &QState) -> Result<QState> {
        if state.num_of_qbits() != self.num_of_qbits {
            return Err(QsimError::QubitCountMismatch {
                expected: self.num_of_qbits,
                got: state.num_of_qbits(),
            });
        }
        if let Some(op) = self.operations.iter().find(|op| !op.is_unitary()) {
            return Err(match op {
                Operation::Reset(_) => QsimError::NonUnitary("reset"),
                _ => QsimError::NonUnitary("measure"),
            });
        }

        let mut result = state.clone();
        for op in &self.operations {
            if let Some(matrix) = self.operation_matrix(op) {
                result.apply_matrix(&matrix);
            }
        }
        Ok(result)
    }
}

impl Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "circuit: {} qubits, {} classical bits",
            self.num_of_qbits, self.num_of_cbits
        )?;
        for op in &self.operations {
            writeln!(f, "  {}", op)?;
        }
        Ok(())
    }
}

pub fn kronecker_product(x: &CsrMatrix<Qbit>, y: &CsrMatrix<Qbit>) -> CsrMatrix<Qbit> {
    let mut result = CooMatrix::new(x.nrows() * y.nrows(), x.ncols() * y.ncols());

    for (rx, cx, value_x) in x.triplet_iter() {
        for (ry, cy, value_y) in y.triplet_iter() {
            let new_row = rx * y.nrows() + ry;
            let new_col = cx * y.ncols() + cy;
            let new_value = value_x * value_y;
            result.push(new_row, new_col, new_value);
        }
    }

    CsrMatrix::from(&result)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    use crate::assert_approx_complex_eq;

    use super::*;

    #[test]
    fn test_bell_state() -> Result<()> {
        let q00 = QState::from_str("00")?;
        let result = Circuit::new(q00.num_of_qbits())
            .H(0)?
            .cnot(0, 1)?
            .apply(&q00)?;

        // Bell state |00> + |11>
        assert_approx_complex_eq!(1.0 / 2f64.sqrt(), 0.0, result.state[0]);
        assert_approx_complex_eq!(0.0, 0.0, result.state[1]);
        assert_approx_complex_eq!(0.0, 0.0, result.state[2]);
        assert_approx_complex_eq!(1.0 / 2f64.sqrt(), 0.0, result.state[3]);

        Ok(())
    }

    #[test]
    /// Hadamard test for Hadamard gate
    /// https://dojo.qulacs.org/ja/latest/notebooks/2.2_Hadamard_test.html
    fn test_hadamard_test() -> Result<()> {
        let q00 = QState::from_str("00")?;
        let mut circuit = Circuit::new(q00.num_of_qbits()).H(0)?;
        circuit.add_control(&[0], 1, GateKind::H)?;
        let result = circuit.H(0)?.apply(&q00)?;

        assert_approx_complex_eq!((2f64.sqrt() + 2.0) / 4.0, 0.0, result.state[0]);
        assert_approx_complex_eq!((-2f64.sqrt() + 2.0) / 4.0, 0.0, result.state[1]);
        assert_approx_complex_eq!(2f64.sqrt() / 4.0, 0.0, result.state[2]);
        assert_approx_complex_eq!(-2f64.sqrt() / 4.0, 0.0, result.state[3]);

        Ok(())
    }

    #[test]
    fn test_qubit_zero_is_least_significant() -> Result<()> {
        let q = QState::from_str("000")?;
        let result = Circuit::new(3).x(0)?.apply(&q)?;
        assert_approx_complex_eq!(1.0, 0.0, result.state[1]);

        let result = Circuit::new(3).x(2)?.apply(&q)?;
        assert_approx_complex_eq!(1.0, 0.0, result.state[4]);

        Ok(())
    }

    #[test]
    /// Hand-built 3 qubit QFT on the uniform superposition gives |000>.
    fn test_qft_by_hand() -> Result<()> {
        let qstate = QState::new(&[Complex::new(1.0, 0.0) / 8.0_f64.sqrt(); 8])?;

        let result = Circuit::new(qstate.num_of_qbits())
            .H(2)?
            .cp(1, 2, FRAC_PI_2)?
            .cp(0, 2, FRAC_PI_4)?
            .H(1)?
            .cp(0, 1, FRAC_PI_2)?
            .H(0)?
            .swap(0, 2)?
            .apply(&qstate)?;

        assert_approx_complex_eq!(1.0, 0.0, result.state[0]);
        for i in 1..8 {
            assert_approx_complex_eq!(0.0, 0.0, result.state[i]);
        }

        Ok(())
    }

    #[test]
    fn test_toffoli_truth_table() -> Result<()> {
        let circuit = Circuit::new(3).toffoli(0, 1, 2)?;

        for input in 0..8 {
            let result = circuit.apply(&QState::basis(3, input)?)?;
            let expected = if input & 0b011 == 0b011 {
                input ^ 0b100
            } else {
                input
            };
            assert_approx_complex_eq!(1.0, 0.0, result.state[expected]);
        }

        Ok(())
    }

    #[test]
    fn test_swap() -> Result<()> {
        let q = QState::from_str("001")?;
        let result = Circuit::new(3).swap(0, 2)?.apply(&q)?;
        assert_approx_complex_eq!(1.0, 0.0, result.state[4]);

        Ok(())
    }

    #[test]
    fn test_invalid_indices_leave_circuit_unchanged() {
        let mut circuit = Circuit::new(2);
        assert_eq!(
            Err(QsimError::IndexOutOfRange {
                index: 2,
                num_of_qbits: 2
            }),
            circuit.add_h(2)
        );
        assert_eq!(Err(QsimError::DuplicateQubit(1)), circuit.add_cnot(1, 1));
        assert_eq!(Err(QsimError::DuplicateQubit(0)), circuit.add_swap(0, 0));
        assert_eq!(
            Err(QsimError::ClbitOutOfRange {
                index: 0,
                num_of_cbits: 0
            }),
            circuit.add_measure(0, 0)
        );
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_inverse_undoes_circuit() -> Result<()> {
        let circuit = Circuit::new(2)
            .H(0)?
            .phase(1, 0.3)?
            .cp(0, 1, 1.1)?
            .swap(0, 1)?
            .cnot(1, 0)?;
        let inverse = circuit.inverse()?;

        assert_eq!(
            Operation::Gate {
                kind: GateKind::Phase(-0.3),
                qbit: 1
            },
            inverse.operations()[3]
        );

        let q = QState::from_str("01")?;
        let result = inverse.apply(&circuit.apply(&q)?)?;
        assert!(result.approx_eq(&q, 1e-10));

        Ok(())
    }

    #[test]
    fn test_inverse_of_measurement_fails() -> Result<()> {
        let circuit = Circuit::with_clbits(1, 1).H(0)?.measure(0, 0)?;
        assert_eq!(Err(QsimError::NonUnitary("measure")), circuit.inverse());
        assert_eq!(
            Err(QsimError::NonUnitary("measure")),
            circuit.apply(&QState::zero_state(1))
        );

        Ok(())
    }

    #[test]
    fn test_append_maps_qubits() -> Result<()> {
        let bell = Circuit::new(2).H(0)?.cnot(0, 1)?;

        let mut circuit = Circuit::new(4);
        circuit.append(&bell, &[3, 1])?;
        assert_eq!(
            &[
                Operation::Gate {
                    kind: GateKind::H,
                    qbit: 3
                },
                Operation::Controlled {
                    kind: GateKind::X,
                    controls: vec![3],
                    target: 1
                },
            ],
            circuit.operations()
        );

        circuit.compose(&bell, 2)?;
        assert_eq!(vec![2, 3], circuit.operations()[3].qbits());

        assert!(circuit.compose(&bell, 3).is_err());
        assert_eq!(
            Err(QsimError::IndexOutOfRange {
                index: usize::MAX,
                num_of_qbits: 4
            }),
            circuit.compose(&bell, usize::MAX)
        );
        assert!(circuit.append(&bell, &[0]).is_err());
        assert!(circuit.append(&bell, &[0, 0]).is_err());
        assert_eq!(4, circuit.len());

        Ok(())
    }

    #[test]
    fn test_metrics() -> Result<()> {
        let circuit = Circuit::with_clbits(3, 1)
            .H(0)?
            .H(1)?
            .barrier()
            .toffoli(0, 1, 2)?
            .cnot(0, 1)?
            .measure(1, 0)?;

        assert_eq!(4, circuit.depth());
        assert_eq!(2, circuit.num_nonlocal_gates());

        let ops = circuit.count_ops();
        assert_eq!(Some(&2), ops.get("h"));
        assert_eq!(Some(&1), ops.get("ccx"));
        assert_eq!(Some(&1), ops.get("cx"));
        assert_eq!(Some(&1), ops.get("barrier"));
        assert_eq!(Some(&1), ops.get("measure"));

        Ok(())
    }

    #[test]
    fn test_display() -> Result<()> {
        let circuit = Circuit::with_clbits(2, 1)
            .cp(0, 1, FRAC_PI_2)?
            .barrier()
            .measure(1, 0)?;
        let text = circuit.to_string();

        assert!(text.contains("cp(1.570796) q[0], q[1]"));
        assert!(text.contains("barrier"));
        assert!(text.contains("measure q[1] -> c[0]"));

        Ok(())
    }
}
