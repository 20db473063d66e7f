use p3_challenger::FieldChallenger;
use p3_field::{ExtensionField, Field};
use p3_maybe_rayon::prelude::*;
use tracing::{debug, instrument, trace};

use super::{
    AssignmentError, ProverError,
    assignment::WireAssignment,
    challenges::{first_challenge_names, wire_prefix},
    claims::{ClaimsManager, WireClaims},
    parameters::TranscriptSettings,
    proof::Proof,
};
use crate::{
    circuit::{SortedCircuit, WireId},
    fiat_shamir::transcript::Transcript,
    poly::{evals::EvaluationsList, multilinear::MultilinearPoint},
    sumcheck::{self, SumcheckProof},
};

/// Evaluates every gate of `circuit` on every instance of `inputs`.
///
/// `inputs` must assign every input wire. Values it assigns to other wires are overwritten.
#[instrument(skip_all, fields(num_wires = circuit.len()))]
pub fn complete_assignment<EF: Field>(
    circuit: &SortedCircuit<EF>,
    inputs: &WireAssignment<EF>,
) -> Result<WireAssignment<EF>, AssignmentError> {
    let num_instances = inputs.num_instances()?;
    let mut assignment = inputs.clone();

    for (id, wire) in circuit.iter_sorted() {
        if wire.is_input() {
            if !assignment.contains(id) {
                return Err(AssignmentError::MissingWire(id));
            }
            continue;
        }

        let tables: Vec<&[EF]> = wire
            .inputs()
            .iter()
            .map(|&input| {
                assignment
                    .get(input)
                    .ok_or(AssignmentError::MissingWire(input))
            })
            .collect::<Result<_, _>>()?;

        let values = (0..num_instances)
            .into_par_iter()
            .map(|k| {
                let slot_values: Vec<EF> = tables.iter().map(|t| t[k]).collect();
                wire.gate().evaluate(&slot_values)
            })
            .collect();
        assignment.insert(id, values);
    }

    Ok(assignment)
}

/// Proves that `assignment`, a complete assignment of `circuit`, is consistent.
///
/// Follows the verifier's schedule exactly: the same challenge names, the same bindings and
/// the same claim propagation through a [`ClaimsManager`].
#[instrument(skip_all, fields(num_wires = circuit.len()))]
pub fn prove<F, EF, Challenger>(
    circuit: &SortedCircuit<EF>,
    assignment: &WireAssignment<EF>,
    settings: TranscriptSettings<'_, F, EF, Challenger>,
) -> Result<Proof<EF>, ProverError>
where
    F: Field,
    EF: ExtensionField<F>,
    Challenger: FieldChallenger<F>,
{
    let num_vars = assignment.num_vars()?;
    let (mut handle, prefix) = settings.into_transcript(circuit, num_vars)?;
    let transcript = handle.transcript();

    let first_challenge = MultilinearPoint::new(
        transcript.compute_challenges(&first_challenge_names(num_vars, &prefix))?,
    );

    let mut manager = ClaimsManager::new(circuit, assignment);
    let mut entries = vec![SumcheckProof::default(); circuit.len()];

    for (i, (id, wire)) in circuit.iter_sorted().enumerate().rev() {
        if wire.is_output() {
            let value = assignment.evaluate(id, &first_challenge)?;
            manager.add(id, first_challenge.clone(), value)?;
        }

        let claims = manager.delete_claim(id)?;
        if !wire.no_proof() {
            let base_challenges = entries
                .get(i + 1)
                .map(|entry| entry.final_eval_proof.clone())
                .unwrap_or_default();
            entries[i] = prove_wire(
                &mut manager,
                id,
                &claims,
                num_vars,
                transcript,
                &wire_prefix(&prefix, i),
                &base_challenges,
            )?;
        }
        debug!(wire = %id, position = i, "wire proved");
    }

    Ok(Proof(entries))
}

/// Sum-check of `sum_x eq_comb(x) * gate(inputs(x))` for one wire.
///
/// Sends `degree + 1` evaluations per round, computed on tables folded with the previous
/// challenges, then registers the final input evaluations as claims on the inputs.
#[instrument(skip_all, level = "debug", fields(wire = %id))]
fn prove_wire<F, EF, Challenger>(
    manager: &mut ClaimsManager<'_, EF>,
    id: WireId,
    claims: &WireClaims<EF>,
    num_vars: usize,
    transcript: &mut Transcript<F, EF, Challenger>,
    prefix: &str,
    base_challenges: &[EF],
) -> Result<SumcheckProof<EF>, ProverError>
where
    F: Field,
    EF: ExtensionField<F>,
    Challenger: FieldChallenger<F>,
{
    let assignment = manager.assignment();
    let wire = manager.circuit().wire(id);
    let claims_num = claims.points().len();

    let names = sumcheck::challenge_names(prefix, claims_num, num_vars);
    if let Some(first) = names.first() {
        transcript.bind(first, base_challenges)?;
    }
    let (coeff, round_names) = if claims_num > 1 {
        (transcript.compute_challenge(&names[0])?, &names[1..])
    } else {
        (EF::ZERO, &names[..])
    };

    let mut eq = vec![EF::ZERO; 1 << num_vars];
    let mut scale = EF::ONE;
    for point in claims.points() {
        let table = EvaluationsList::eq_table(point, scale);
        eq.par_iter_mut()
            .zip(table.as_slice().par_iter())
            .for_each(|(e, &t)| *e += t);
        scale *= coeff;
    }
    let mut eq = EvaluationsList::new(eq);

    // An input wire is its own single input.
    let (sources, slot_to_unique): (Vec<WireId>, Vec<usize>) = if wire.is_input() {
        (vec![id], vec![0])
    } else {
        (wire.unique_inputs().to_vec(), wire.slot_to_unique().to_vec())
    };
    let mut tables = sources
        .iter()
        .map(|&source| {
            assignment
                .get(source)
                .map(|t| EvaluationsList::new(t.to_vec()))
                .ok_or(AssignmentError::MissingWire(source))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let degree = wire.degree() + 1;
    let gate = wire.gate();
    let mut partial_sum_polys = Vec::with_capacity(num_vars);
    let mut r = Vec::with_capacity(num_vars);

    for (round, name) in round_names.iter().enumerate() {
        let mid = eq.num_evals() / 2;
        let poly: Vec<EF> = (1..=degree)
            .map(|t| {
                let t = EF::from_usize(t);
                let at_t = |table: &EvaluationsList<EF>, x: usize| {
                    let (lo, hi) = (table.as_slice()[x], table.as_slice()[x + mid]);
                    lo + t * (hi - lo)
                };
                (0..mid)
                    .into_par_iter()
                    .map(|x| {
                        let by_slot: Vec<EF> = slot_to_unique
                            .iter()
                            .map(|&u| at_t(&tables[u], x))
                            .collect();
                        at_t(&eq, x) * gate.evaluate(&by_slot)
                    })
                    .sum()
            })
            .collect();

        transcript.bind(name, &poly)?;
        let r_j = transcript.compute_challenge(name)?;
        eq.compress(r_j);
        tables.iter_mut().for_each(|table| table.compress(r_j));
        partial_sum_polys.push(poly);
        r.push(r_j);
        trace!(round, "round sent");
    }

    if wire.is_input() {
        return Ok(SumcheckProof::new(partial_sum_polys, Vec::new()));
    }

    let final_evals: Vec<EF> = tables.iter().map(|table| table.as_slice()[0]).collect();

    let by_slot: Vec<EF> = slot_to_unique.iter().map(|&u| final_evals[u]).collect();
    manager.add_for_input(id, &MultilinearPoint::new(r), &by_slot)?;

    Ok(SumcheckProof::new(partial_sum_polys, final_evals))
}
