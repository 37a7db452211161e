use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qlogic::logic::{self, LogicGate, LogicOutcome};
use qlogic::qft::{encode_fourier_basis, inverse_qft, qft};
use qlogic::{Circuit, QState, Qbit, SimulatorConfig, StatevectorSimulator};

/// Quantum Fourier Transform and classical logic gates on a state-vector simulator
#[derive(Parser)]
#[command(name = "qlogic")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Shots per circuit
    #[arg(long, global = true, env = "QLOGIC_SHOTS", default_value_t = 1024)]
    shots: usize,

    /// Seed for reproducible sampling
    #[arg(long, global = true, env = "QLOGIC_SEED")]
    seed: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the QFT to a basis state, then undo it with the inverse QFT
    Qft {
        /// Input basis state, most significant qubit first
        #[arg(short, long, default_value = "011")]
        input: String,

        /// Number of qubits to transform (defaults to the whole input)
        #[arg(short = 'n', long)]
        qubits: Option<usize>,
    },

    /// Encode a number in the Fourier basis and read it back with the inverse QFT
    Encode {
        #[arg(short = 'n', long, default_value_t = 3)]
        qubits: usize,

        #[arg(long, default_value_t = 3)]
        value: u64,
    },

    /// Run logic gate truth tables
    Logic {
        /// One of NOT, XOR, AND, NAND, OR (all when omitted)
        #[arg(short, long)]
        gate: Option<LogicGate>,
    },
}

#[derive(Serialize)]
struct QftReport {
    input: String,
    qubits: usize,
    operations: BTreeMap<String, usize>,
    transformed: Vec<Qbit>,
    round_trip: bool,
    #[serde(skip)]
    circuit: Circuit,
    #[serde(skip)]
    initial: QState,
    #[serde(skip)]
    after_qft: QState,
    #[serde(skip)]
    restored: QState,
}

#[derive(Serialize)]
struct EncodeReport {
    value: u64,
    qubits: usize,
    decoded: String,
    probability: f64,
    #[serde(skip)]
    index: usize,
    #[serde(skip)]
    circuit: Circuit,
    #[serde(skip)]
    state: QState,
}

fn run_qft(
    simulator: &StatevectorSimulator,
    input: &str,
    qubits: Option<usize>,
) -> Result<QftReport> {
    simulator.check_width(input.len()).context("invalid --input")?;
    let initial = QState::from_str(input).context("invalid --input")?;
    let n = qubits.unwrap_or(initial.num_of_qbits());

    let mut circuit = Circuit::new(initial.num_of_qbits());
    qft(&mut circuit, n)?;
    let after_qft = simulator.evolve(&circuit, &initial)?;

    let mut round_trip = circuit.clone();
    inverse_qft(&mut round_trip, n)?;
    let restored = simulator.evolve(&round_trip, &initial)?;
    let ok = restored.approx_eq(&initial, 1e-9);
    info!(n, ops = circuit.len(), round_trip = ok, "qft");

    Ok(QftReport {
        input: input.to_string(),
        qubits: n,
        operations: circuit.count_ops(),
        transformed: after_qft.amplitudes().to_vec(),
        round_trip: ok,
        circuit,
        initial,
        after_qft,
        restored,
    })
}

fn print_qft(report: &QftReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report.circuit);
        println!("The initial statevector is:\n{}", report.initial);
        println!("The statevector after QFT is:\n{}", report.after_qft);
        println!("The statevector after inverse QFT is:\n{}", report.restored);
    }
    Ok(())
}

fn check_round_trip(report: &QftReport) -> Result<()> {
    if !report.round_trip {
        bail!("inverse QFT did not restore the input state");
    }
    Ok(())
}

fn run_encode(simulator: &StatevectorSimulator, n: usize, value: u64) -> Result<EncodeReport> {
    simulator.check_width(n)?;

    let mut circuit = Circuit::new(n);
    encode_fourier_basis(&mut circuit, n, value)?;
    inverse_qft(&mut circuit, n)?;

    let state = simulator.statevector(&circuit)?;
    let index = state.most_likely();

    Ok(EncodeReport {
        value,
        qubits: n,
        decoded: state.label(index),
        probability: state.probabilities()[index],
        index,
        circuit,
        state,
    })
}

fn print_encode(report: &EncodeReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report.circuit);
        println!("Resulting state:\n{}", report.state);
        println!(
            "Decoded |{}> ({}) with probability {:.2}",
            report.decoded, report.index, report.probability
        );
    }
    Ok(())
}

fn run_logic(
    simulator: &StatevectorSimulator,
    gate: Option<LogicGate>,
    shots: usize,
) -> Result<Vec<LogicOutcome>> {
    let gates = match gate {
        Some(gate) => vec![gate],
        None => LogicGate::ALL.to_vec(),
    };

    let mut outcomes = Vec::new();
    for gate in gates {
        for inputs in gate.truth_table_inputs() {
            let outcome = logic::evaluate(gate, &inputs, simulator, shots)
                .with_context(|| format!("{gate} failed for {inputs:?}"))?;
            outcomes.push(outcome);
        }
    }
    Ok(outcomes)
}

fn print_logic(outcomes: &[LogicOutcome], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcomes)?);
        return Ok(());
    }

    for outcome in outcomes {
        let inputs = outcome
            .inputs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{} [{}] -> output {} (correct {:.2}, depth {}, nonlocal gates {})",
            outcome.gate,
            inputs,
            outcome.output,
            outcome.success_probability,
            outcome.depth,
            outcome.nonlocal_gates
        );
    }

    let best = outcomes
        .iter()
        .map(|o| o.success_probability)
        .fold(0.0, f64::max);
    let worst = outcomes
        .iter()
        .map(|o| o.success_probability)
        .fold(1.0, f64::min);
    println!();
    println!("The highest probability of a correct answer was {:.2}", best);
    println!("The lowest probability of a correct answer was {:.2}", worst);
    Ok(())
}

fn simulator_for(cli: &Cli) -> StatevectorSimulator {
    let config = SimulatorConfig::default()
        .with_shots(cli.shots)
        .with_seed(cli.seed);
    StatevectorSimulator::new(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let simulator = simulator_for(&cli);

    match cli.command {
        Commands::Qft { input, qubits } => {
            let report = run_qft(&simulator, &input, qubits)?;
            print_qft(&report, cli.json)?;
            check_round_trip(&report)
        }
        Commands::Encode { qubits, value } => {
            print_encode(&run_encode(&simulator, qubits, value)?, cli.json)
        }
        Commands::Logic { gate } => {
            let outcomes = run_logic(&simulator, gate, simulator.config().shots)?;
            print_logic(&outcomes, cli.json)
        }
    }
}
