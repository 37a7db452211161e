use std::fmt::Display;

use nalgebra::DVector;
use nalgebra_sparse::csr::CsrMatrix;
use num_complex::Complex;

use crate::error::{QsimError, Result};
use crate::Qbit;

/// A state vector over `num_of_qbits` qubits.
///
/// Qubit 0 is the least significant bit of a basis index, so `|011>` has
/// qubits 0 and 1 set.
#[derive(Clone, Debug, PartialEq)]
pub struct QState {
    pub(crate) state: DVector<Qbit>,
}

impl QState {
    pub fn new(state: &[Qbit]) -> Result<Self> {
        let len = state.len();
        if len == 0 || (len & (len - 1)) != 0 {
            return Err(QsimError::InvalidStateLength(len));
        }

        let state = DVector::from_row_slice(state);
        Ok(Self { state })
    }

    /// `|0...0>` on `num_of_qbits` qubits.
    ///
    /// # Panics
    ///
    /// If `2^num_of_qbits` amplitudes cannot be allocated. Use `basis` to get
    /// an error instead.
    pub fn zero_state(num_of_qbits: usize) -> Self {
        Self::basis_unchecked(num_of_qbits, 0)
    }

    /// Computational basis state `|index>` on `num_of_qbits` qubits.
    pub fn basis(num_of_qbits: usize, index: usize) -> Result<Self> {
        let size = dimension(num_of_qbits).ok_or_else(|| {
            QsimError::InvalidBasisLabel(format!(
                "{num_of_qbits} qubits do not fit in a state vector"
            ))
        })?;
        if index >= size {
            return Err(QsimError::InvalidBasisLabel(format!(
                "{index} does not fit in {num_of_qbits} qubits"
            )));
        }
        Ok(Self::basis_unchecked(num_of_qbits, index))
    }

    fn basis_unchecked(num_of_qbits: usize, index: usize) -> Self {
        let mut state = DVector::zeros(1_usize << num_of_qbits);
        state[index] = Complex::new(1.0, 0.0);
        Self { state }
    }

    /// Parses a binary label such as `"011"`, most significant qubit first.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(qbits: &str) -> Result<Self> {
        if qbits.is_empty() || !qbits.chars().all(|c| c == '0' || c == '1') {
            return Err(QsimError::InvalidBasisLabel(qbits.to_string()));
        }
        if dimension(qbits.len()).is_none() {
            return Err(QsimError::InvalidBasisLabel(qbits.to_string()));
        }
        let index = usize::from_str_radix(qbits, 2)
            .map_err(|_| QsimError::InvalidBasisLabel(qbits.to_string()))?;

        Ok(Self::basis_unchecked(qbits.len(), index))
    }

    pub fn num_of_qbits(&self) -> usize {
        self.state.len().ilog2() as usize
    }

    pub fn amplitudes(&self) -> &[Qbit] {
        self.state.as_slice()
    }

    pub fn amplitude(&self, index: usize) -> Option<Qbit> {
        self.state.get(index).copied()
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.state.iter().map(|a| a.norm_sqr()).collect()
    }

    pub fn norm(&self) -> f64 {
        self.state.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt()
    }

    /// |<self|other>|^2
    pub fn fidelity(&self, other: &QState) -> Result<f64> {
        self.check_same_size(other)?;
        Ok(self.state.dotc(&other.state).norm_sqr())
    }

    /// Amplitude-wise comparison, so global phase matters.
    pub fn approx_eq(&self, other: &QState, eps: f64) -> bool {
        self.state.len() == other.state.len()
            && self
                .state
                .iter()
                .zip(other.state.iter())
                .all(|(a, b)| (a - b).norm() < eps)
    }

    /// Index of the basis state with the highest probability.
    pub fn most_likely(&self) -> usize {
        self.state
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.norm_sqr().total_cmp(&b.norm_sqr()))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Formats a basis index the way `from_str` parses it.
    pub fn label(&self, index: usize) -> String {
        format!("{:0width$b}", index, width = self.num_of_qbits())
    }

    pub(crate) fn apply_matrix(&mut self, matrix: &CsrMatrix<Qbit>) {
        self.state = matrix * &self.state;
    }

    /// Probability of reading 1 on `qbit`.
    pub(crate) fn probability_of_one(&self, qbit: usize) -> f64 {
        let mask = 1 << qbit;
        self.state
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Projects `qbit` onto `outcome` and renormalizes.
    pub(crate) fn collapse(&mut self, qbit: usize, outcome: bool) {
        let mask = 1 << qbit;
        let mut norm = 0.0;
        for (i, amp) in self.state.iter_mut().enumerate() {
            if (i & mask != 0) != outcome {
                *amp = Complex::new(0.0, 0.0);
            } else {
                norm += amp.norm_sqr();
            }
        }

        if norm > 0.0 {
            let scale = 1.0 / norm.sqrt();
            for amp in self.state.iter_mut() {
                *amp *= scale;
            }
        }
    }

    /// Swaps the amplitudes of `qbit = 0` and `qbit = 1`.
    pub(crate) fn flip(&mut self, qbit: usize) {
        let mask = 1 << qbit;
        for i in 0..self.state.len() {
            if i & mask == 0 {
                self.state.swap_rows(i, i | mask);
            }
        }
    }

    fn check_same_size(&self, other: &QState) -> Result<()> {
        if self.num_of_qbits() != other.num_of_qbits() {
            return Err(QsimError::QubitCountMismatch {
                expected: self.num_of_qbits(),
                got: other.num_of_qbits(),
            });
        }
        Ok(())
    }
}

/// Number of amplitudes over `num_of_qbits` qubits, or `None` when the
/// vector would not fit in memory addressable by a `Vec`.
fn dimension(num_of_qbits: usize) -> Option<usize> {
    let size = 1_usize.checked_shl(u32::try_from(num_of_qbits).ok()?)?;
    let bytes = size.checked_mul(std::mem::size_of::<Qbit>())?;
    (bytes <= isize::MAX as usize).then_some(size)
}

impl Display for QState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bin_width = self.num_of_qbits();

        for (i, value) in self.state.iter().enumerate() {
            writeln!(f, "|{:0width$b}>: {}", i, value, width = bin_width)?;
        }

        Ok(())
    }
}

impl From<QState> for DVector<Qbit> {
    fn from(qstate: QState) -> Self {
        qstate.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_approx_complex_eq, assert_approx_eq};

    #[test]
    fn test_qstate_from_2bit_str() {
        let qstate = QState::from_str("00").unwrap();

        assert_eq!(qstate.num_of_qbits(), 2);
        assert_eq!(qstate.state.len(), 4);

        assert_approx_complex_eq!(1.0, 0.0, qstate.state[0]);
        assert_approx_complex_eq!(0.0, 0.0, qstate.state[1]);
        assert_approx_complex_eq!(0.0, 0.0, qstate.state[2]);
        assert_approx_complex_eq!(0.0, 0.0, qstate.state[3]);

        let qstate = QState::from_str("01").unwrap();
        assert_approx_complex_eq!(0.0, 0.0, qstate.state[0]);
        assert_approx_complex_eq!(1.0, 0.0, qstate.state[1]);

        let qstate = QState::from_str("11").unwrap();
        assert_approx_complex_eq!(1.0, 0.0, qstate.state[3]);
    }

    #[test]
    fn test_qstate_from_3bit_str() {
        let qstate = QState::from_str("011").unwrap();

        assert_eq!(qstate.num_of_qbits(), 3);
        assert_eq!(qstate.state.len(), 8);
        assert_approx_complex_eq!(1.0, 0.0, qstate.state[3]);
        assert_eq!("011", qstate.label(qstate.most_likely()));
    }

    #[test]
    fn test_invalid_labels_and_lengths() {
        assert!(matches!(
            QState::from_str("0a1"),
            Err(QsimError::InvalidBasisLabel(_))
        ));
        assert!(matches!(
            QState::from_str(""),
            Err(QsimError::InvalidBasisLabel(_))
        ));
        assert!(matches!(
            QState::from_str("+1"),
            Err(QsimError::InvalidBasisLabel(_))
        ));
        assert_eq!(
            Err(QsimError::InvalidStateLength(3)),
            QState::new(&[Complex::new(1.0, 0.0); 3])
        );
        assert!(QState::basis(2, 4).is_err());
    }

    #[test]
    fn test_widths_beyond_addressable_memory_are_rejected() {
        for num_of_qbits in [62, 63, 64, 65, 200] {
            assert!(matches!(
                QState::basis(num_of_qbits, 0),
                Err(QsimError::InvalidBasisLabel(_))
            ));
        }
        let label = "0".repeat(64);
        assert_eq!(
            Err(QsimError::InvalidBasisLabel(label.clone())),
            QState::from_str(&label)
        );
        assert!(QState::from_str(&"1".repeat(70)).is_err());
        assert_eq!(Some(8), dimension(3));
        assert_eq!(None, dimension(64));
    }

    #[test]
    fn test_collapse_and_flip() {
        let amp = Complex::new(0.5, 0.0);
        let mut qstate = QState::new(&[amp; 4]).unwrap();

        assert_approx_eq!(0.5, qstate.probability_of_one(0));

        qstate.collapse(0, true);
        assert_approx_eq!(1.0, qstate.norm());
        assert_approx_eq!(1.0, qstate.probability_of_one(0));

        qstate.flip(0);
        assert_approx_eq!(0.0, qstate.probability_of_one(0));
        assert_approx_complex_eq!(1.0 / 2f64.sqrt(), 0.0, qstate.state[0]);
        assert_approx_complex_eq!(1.0 / 2f64.sqrt(), 0.0, qstate.state[2]);
    }

    #[test]
    fn test_fidelity() {
        let q0 = QState::from_str("0").unwrap();
        let plus = QState::new(&[Complex::new(1.0 / 2f64.sqrt(), 0.0); 2]).unwrap();

        assert_approx_eq!(1.0, q0.fidelity(&q0).unwrap());
        assert_approx_eq!(0.5, q0.fidelity(&plus).unwrap());
        assert!(q0.fidelity(&QState::zero_state(2)).is_err());
    }
}
