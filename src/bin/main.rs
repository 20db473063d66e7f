use std::time::Instant;

use clap::{Parser, ValueEnum};
use gkr_p3::{
    circuit::{
        Circuit, SortedCircuit, WireId,
        gate::{AddGate, MulGate},
        topological_sort,
    },
    gkr::{
        AssignmentError, ProverError, TranscriptSettings, VerifierError,
        assignment::WireAssignment, complete_assignment, proof_size, prove, verify_serialized,
    },
};
use p3_baby_bear::{BabyBear, Poseidon2BabyBear};
use p3_challenger::{DuplexChallenger, FieldChallenger};
use p3_field::{ExtensionField, Field, extension::BinomialExtensionField};
use p3_koala_bear::{KoalaBear, Poseidon2KoalaBear};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;
use tracing::info;
use tracing_forest::{ForestLayer, util::LevelFilter};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FieldChoice {
    BabyBear,
    KoalaBear,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short = 'f', long, value_enum, default_value = "baby-bear")]
    field: FieldChoice,

    /// log2 of the number of circuit instances.
    #[arg(short = 'n', long = "instances", default_value = "10")]
    log_instances: usize,

    /// Number of gate layers.
    #[arg(short = 'd', long, default_value = "4")]
    depth: usize,

    /// Wires per layer.
    #[arg(short = 'w', long, default_value = "4")]
    width: usize,
}

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    #[error(transparent)]
    Prover(#[from] ProverError),
    #[error(transparent)]
    Verifier(#[from] VerifierError),
}

/// `depth` layers of `width` wires, alternating multiplications and additions of neighbours.
fn layered_circuit<EF: Field>(depth: usize, width: usize) -> SortedCircuit<EF> {
    let mut circuit = Circuit::new();
    let mut layer: Vec<WireId> = (0..width).map(|_| circuit.add_input()).collect();

    for d in 0..depth {
        layer = (0..width)
            .map(|j| {
                let inputs = [layer[j], layer[(j + 1) % width]];
                if (d + j) % 2 == 0 {
                    circuit.add_gate(MulGate, &inputs)
                } else {
                    circuit.add_gate(AddGate, &inputs)
                }
            })
            .collect();
    }

    topological_sort(&circuit)
}

fn run<F, EF, Challenger>(
    args: &Args,
    make_challenger: impl Fn() -> Challenger,
) -> Result<(), DemoError>
where
    F: Field,
    EF: ExtensionField<F>,
    Challenger: FieldChallenger<F>,
{
    let circuit = layered_circuit::<EF>(args.depth, args.width.max(1));

    let mut rng = SmallRng::seed_from_u64(0);
    let mut inputs = WireAssignment::new();
    for (id, wire) in circuit.iter_sorted() {
        if wire.is_input() {
            let values = (0..1 << args.log_instances)
                .map(|_| EF::from_u64(rng.random()))
                .collect();
            inputs.insert(id, values);
        }
    }
    let assignment = complete_assignment(&circuit, &inputs)?;

    println!("=========================================");
    println!("GKR over {:?}", args.field);
    println!(
        "{} wires, 2^{} instances, {} proof elements",
        circuit.len(),
        args.log_instances,
        proof_size(&circuit, args.log_instances)
    );

    let time = Instant::now();
    let proof = prove(
        &circuit,
        &assignment,
        TranscriptSettings::fresh(make_challenger()),
    )?;
    let prove_time = time.elapsed();
    let data = proof.serialize();

    // The verifier only sees inputs and outputs.
    let mut public = WireAssignment::new();
    for (id, wire) in circuit.iter_sorted() {
        if wire.is_input() || wire.is_output() {
            if let Some(values) = assignment.get(id) {
                public.insert(id, values.to_vec());
            }
        }
    }

    let time = Instant::now();
    verify_serialized(
        &circuit,
        &public,
        &data,
        TranscriptSettings::fresh(make_challenger()),
    )?;
    let verify_time = time.elapsed();

    info!(elements = data.len(), "proof verified");
    println!("Prover time: {prove_time:.1?}");
    println!(
        "Proof size: {:.1} KiB",
        (data.len() * size_of::<EF>()) as f64 / 1024.0
    );
    println!("Verifier time: {verify_time:.1?}");

    Ok(())
}

fn main() -> Result<(), DemoError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(ForestLayer::default())
        .init();

    let args = Args::parse();

    match args.field {
        FieldChoice::BabyBear => run::<BabyBear, BinomialExtensionField<BabyBear, 4>, _>(
            &args,
            || {
                let perm = Poseidon2BabyBear::<16>::new_from_rng_128(&mut SmallRng::seed_from_u64(1));
                DuplexChallenger::<BabyBear, _, 16, 8>::new(perm)
            },
        ),
        FieldChoice::KoalaBear => run::<KoalaBear, BinomialExtensionField<KoalaBear, 4>, _>(
            &args,
            || {
                let perm =
                    Poseidon2KoalaBear::<16>::new_from_rng_128(&mut SmallRng::seed_from_u64(1));
                DuplexChallenger::<KoalaBear, _, 16, 8>::new(perm)
            },
        ),
    }
}
