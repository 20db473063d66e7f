use p3_challenger::FieldChallenger;
use p3_field::{ExtensionField, Field};
use tracing::{debug, instrument};

use super::{
    VerifierError,
    assignment::WireAssignment,
    challenges::{first_challenge_names, wire_prefix},
    claims::ClaimsManager,
    parameters::TranscriptSettings,
    proof::Proof,
};
use crate::{
    circuit::{Circuit, SortedCircuit, topological_sort},
    poly::multilinear::MultilinearPoint,
    sumcheck::{self, SumcheckTranscript},
};

/// Verifies that the output values in `assignment` follow from its input values.
///
/// Wires are visited from outputs to inputs. Output claims are seeded at a random point,
/// each wire's claims are reduced by a sum-check to claims on its inputs, and input wires
/// end up checked against `assignment`. Only output and input wires need to be assigned.
///
/// Each sum-check binds the final evaluations of the previous wire, so the whole run is a
/// single Fiat-Shamir transcript. The first failure aborts the run.
#[instrument(skip_all, fields(num_wires = circuit.len()))]
pub fn verify<F, EF, Challenger>(
    circuit: &SortedCircuit<EF>,
    assignment: &WireAssignment<EF>,
    proof: &Proof<EF>,
    settings: TranscriptSettings<'_, F, EF, Challenger>,
) -> Result<(), VerifierError>
where
    F: Field,
    EF: ExtensionField<F>,
    Challenger: FieldChallenger<F>,
{
    let num_vars = assignment.num_vars()?;
    if proof.len() != circuit.len() {
        return Err(VerifierError::ProofLength {
            expected: circuit.len(),
            got: proof.len(),
        });
    }

    let (mut handle, prefix) = settings.into_transcript(circuit, num_vars)?;
    let transcript = handle.transcript();

    let first_challenge = MultilinearPoint::new(
        transcript.compute_challenges(&first_challenge_names(num_vars, &prefix))?,
    );

    let mut manager = ClaimsManager::new(circuit, assignment);
    let mut base_challenges: &[EF] = &[];

    for (i, (id, wire)) in circuit.iter_sorted().enumerate().rev() {
        if wire.is_output() {
            let value = assignment.evaluate(id, &first_challenge)?;
            manager.add(id, first_challenge.clone(), value)?;
        }

        let entry = &proof[i];
        let claims = manager.delete_claim(id)?;
        if claims.points().is_empty() {
            return Err(VerifierError::NoPendingClaims(id));
        }

        if wire.no_proof() {
            if !entry.is_empty() {
                return Err(VerifierError::UnexpectedProof(id));
            }
            for (point, &claimed) in claims.points().iter().zip(claims.values()) {
                let evaluation = assignment.evaluate(id, point)?;
                if evaluation != claimed {
                    return Err(VerifierError::InputEvaluationMismatch {
                        wire: id,
                        expected: claimed.to_string(),
                        actual: evaluation.to_string(),
                    });
                }
            }
        } else {
            sumcheck::verify(
                &claims,
                &mut manager,
                entry,
                SumcheckTranscript {
                    transcript: &mut *transcript,
                    prefix: &wire_prefix(&prefix, i),
                    base_challenges,
                },
            )?;
        }

        debug!(wire = %id, position = i, "wire verified");
        base_challenges = entry.final_eval_proof.as_slice();
    }

    if !manager.is_empty() {
        return Err(VerifierError::UnverifiedClaims);
    }
    Ok(())
}

/// Sorts `circuit` and runs [`verify`].
///
/// # Panics
/// Panics if the circuit has a cycle.
pub fn verify_circuit<F, EF, Challenger>(
    circuit: &Circuit<EF>,
    assignment: &WireAssignment<EF>,
    proof: &Proof<EF>,
    settings: TranscriptSettings<'_, F, EF, Challenger>,
) -> Result<(), VerifierError>
where
    F: Field,
    EF: ExtensionField<F>,
    Challenger: FieldChallenger<F>,
{
    verify(&topological_sort(circuit), assignment, proof, settings)
}

/// Deserializes `data` for the instance count of `assignment` and runs [`verify`].
pub fn verify_serialized<F, EF, Challenger>(
    circuit: &SortedCircuit<EF>,
    assignment: &WireAssignment<EF>,
    data: &[EF],
    settings: TranscriptSettings<'_, F, EF, Challenger>,
) -> Result<(), VerifierError>
where
    F: Field,
    EF: ExtensionField<F>,
    Challenger: FieldChallenger<F>,
{
    let proof = Proof::deserialize_with_log(circuit, assignment.num_vars()?, data)?;
    verify(circuit, assignment, &proof, settings)
}
