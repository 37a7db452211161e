use proptest::prelude::*;

use qlogic::qft::{apply_qft_rotations, encode_fourier_basis, inverse_qft, qft, swap_registers};
use qlogic::{Circuit, QState, QsimError};

fn count(circuit: &Circuit, name: &str) -> usize {
    circuit.count_ops().get(name).copied().unwrap_or(0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn rotations_and_swaps_have_expected_counts(n in 0usize..10, extra in 0usize..3) {
        let mut circuit = Circuit::new(n + extra);
        apply_qft_rotations(&mut circuit, n).unwrap();
        prop_assert_eq!(n, count(&circuit, "h"));
        prop_assert_eq!(n * n.saturating_sub(1) / 2, count(&circuit, "cp"));
        prop_assert_eq!(n * (n + 1) / 2, circuit.len());

        let mut circuit = Circuit::new(n + extra);
        swap_registers(&mut circuit, n).unwrap();
        prop_assert_eq!(n / 2, circuit.len());
    }

    #[test]
    fn qft_then_inverse_restores_basis_states(n in 1usize..5, seed in any::<u64>()) {
        let index = (seed as usize) % (1 << n);
        let input = QState::basis(n, index).unwrap();

        let mut circuit = Circuit::new(n);
        qft(&mut circuit, n).unwrap();
        inverse_qft(&mut circuit, n).unwrap();

        let result = circuit.apply(&input).unwrap();
        prop_assert!(result.approx_eq(&input, 1e-9));
    }

    #[test]
    fn encoded_values_decode_after_inverse_qft(n in 1usize..5, value in any::<u64>()) {
        let mut circuit = Circuit::new(n);
        encode_fourier_basis(&mut circuit, n, value).unwrap();
        inverse_qft(&mut circuit, n).unwrap();

        let result = circuit.apply(&QState::zero_state(n)).unwrap();
        let expected = (value % (1 << n)) as usize;
        prop_assert!((result.probabilities()[expected] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn oversized_registers_are_rejected_without_mutation(width in 0usize..5, over in 1usize..4) {
        let mut circuit = Circuit::new(width);
        let n = width + over;

        prop_assert_eq!(
            Err(QsimError::InvalidRegisterSize { n, num_of_qbits: width }),
            qft(&mut circuit, n).map(|_| ())
        );
        prop_assert!(circuit.is_empty());
    }
}
