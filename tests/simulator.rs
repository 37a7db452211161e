use qlogic::logic::{evaluate, Bit, LogicGate};
use qlogic::qft::{encode_fourier_basis, inverse_qft};
use qlogic::{Backend, Circuit, QsimError, Result, SimulatorConfig, StatevectorSimulator};

fn simulator() -> StatevectorSimulator {
    StatevectorSimulator::new(SimulatorConfig::default().with_seed(Some(2024)))
}

#[test]
fn fourier_encoded_three_is_measured_as_011() -> Result<()> {
    let mut circuit = Circuit::with_clbits(3, 3);
    encode_fourier_basis(&mut circuit, 3, 3)?;
    inverse_qft(&mut circuit, 3)?;
    for qbit in 0..3 {
        circuit.add_measure(qbit, qbit)?;
    }

    let result = simulator().run(&circuit, 256)?;
    assert_eq!(256, result.counts.get("011"));
    Ok(())
}

#[test]
fn nand_is_zero_only_for_one_one() -> Result<()> {
    let simulator = simulator();
    for (a, b) in [(Bit::Zero, Bit::Zero), (Bit::Zero, Bit::One), (Bit::One, Bit::Zero), (Bit::One, Bit::One)] {
        let outcome = evaluate(LogicGate::Nand, &[a, b], &simulator, 8)?;
        let expected = if a.is_set() && b.is_set() { "0" } else { "1" };
        assert_eq!(expected, outcome.output);
    }
    Ok(())
}

#[test]
fn unsupported_input_symbol_is_rejected() {
    assert_eq!(
        Err(QsimError::UnsupportedInputEncoding("x".to_string())),
        "x".parse::<Bit>()
    );
}

#[test]
fn inverse_qft_spliced_into_wider_measured_circuit() -> Result<()> {
    // Qubit 2 is left alone by a 2 qubit inverse QFT.
    let mut circuit = Circuit::with_clbits(3, 1);
    circuit.add_x(2)?;
    inverse_qft(&mut circuit, 2)?;
    circuit.add_measure(2, 0)?;

    let result = simulator().run(&circuit, 32)?;
    assert_eq!(32, result.counts.get("1"));
    Ok(())
}
