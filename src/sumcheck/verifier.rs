use p3_challenger::FieldChallenger;
use p3_field::{ExtensionField, Field};
use tracing::{instrument, trace};

use super::{SumcheckError, SumcheckProof, lagrange::interpolate_at};
use crate::fiat_shamir::transcript::Transcript;

/// A batch of claims about one multivariate polynomial, reduced by a single sum-check.
///
/// The claims are combined with powers of a random coefficient `a`, so the sum-check proves
/// `combined_sum(a)`. The verifier never evaluates the polynomial itself: at the end of the
/// protocol it asks the claim to check one evaluation at the random point, which may in turn
/// produce new claims through `ctx`.
pub trait LazyClaims<EF, Ctx> {
    type Error: From<SumcheckError>;

    fn claims_num(&self) -> usize;

    fn vars_num(&self) -> usize;

    /// `sum_i v_i * a^i` over the claimed values `v_i`.
    fn combined_sum(&self, a: EF) -> EF;

    /// Number of evaluations sent for round `round`.
    fn degree(&self, round: usize) -> usize;

    /// Checks that the polynomial evaluates to `purported_value` at `r`.
    fn verify_final_eval(
        &self,
        ctx: &mut Ctx,
        r: &[EF],
        combination_coeff: EF,
        purported_value: EF,
        final_eval_proof: &[EF],
    ) -> Result<(), Self::Error>;
}

/// The part of a transcript a sum-check run owns.
#[derive(Debug)]
pub struct SumcheckTranscript<'a, F, EF, Challenger> {
    pub transcript: &'a mut Transcript<F, EF, Challenger>,
    /// Prefix of every challenge name of this run.
    pub prefix: &'a str,
    /// Values bound to the first challenge of the run.
    pub base_challenges: &'a [EF],
}

/// Challenge names of one sum-check run, in the order they are computed.
///
/// A combination coefficient `{prefix}comb` is drawn only when there is more than one claim,
/// followed by one `{prefix}pSP.{j}` per variable.
#[must_use]
pub fn challenge_names(prefix: &str, claims_num: usize, vars_num: usize) -> Vec<String> {
    let comb = (claims_num > 1).then(|| format!("{prefix}comb"));
    comb.into_iter()
        .chain((0..vars_num).map(|j| format!("{prefix}pSP.{j}")))
        .collect()
}

/// Verifies a sum-check proof for `claims` and returns the random point it reduced them to.
///
/// Each round's polynomial is bound to that round's challenge before it is drawn, so the
/// point depends on everything the prover sent up to that round.
#[instrument(skip_all, fields(prefix = transcript.prefix, claims = claims.claims_num(), vars = claims.vars_num()))]
pub fn verify<F, EF, Challenger, Ctx, C>(
    claims: &C,
    ctx: &mut Ctx,
    proof: &SumcheckProof<EF>,
    transcript: SumcheckTranscript<'_, F, EF, Challenger>,
) -> Result<Vec<EF>, C::Error>
where
    F: Field,
    EF: ExtensionField<F>,
    Challenger: FieldChallenger<F>,
    C: LazyClaims<EF, Ctx>,
{
    let SumcheckTranscript {
        transcript,
        prefix,
        base_challenges,
    } = transcript;

    let vars_num = claims.vars_num();
    let names = challenge_names(prefix, claims.claims_num(), vars_num);

    if let Some(first) = names.first() {
        transcript
            .bind(first, base_challenges)
            .map_err(SumcheckError::from)?;
    }

    let (combination_coeff, round_names) = if claims.claims_num() > 1 {
        let coeff = transcript
            .compute_challenge(&names[0])
            .map_err(SumcheckError::from)?;
        (coeff, &names[1..])
    } else {
        (EF::ZERO, &names[..])
    };

    if proof.partial_sum_polys.len() != vars_num {
        return Err(SumcheckError::WrongNumberOfRounds {
            expected: vars_num,
            got: proof.partial_sum_polys.len(),
        }
        .into());
    }

    let mut running_sum = claims.combined_sum(combination_coeff);
    let mut r = Vec::with_capacity(vars_num);
    let mut evals = Vec::new();

    for (round, (poly, name)) in proof.partial_sum_polys.iter().zip(round_names).enumerate() {
        let degree = claims.degree(round);
        if poly.len() != degree || degree == 0 {
            return Err(SumcheckError::MalformedPartialSumPoly {
                round,
                expected: degree,
                got: poly.len(),
            }
            .into());
        }

        // g(0) + g(1) must equal the running sum.
        evals.clear();
        evals.push(running_sum - poly[0]);
        evals.extend_from_slice(poly);

        transcript.bind(name, poly).map_err(SumcheckError::from)?;
        let r_j = transcript
            .compute_challenge(name)
            .map_err(SumcheckError::from)?;

        running_sum = interpolate_at(&evals, r_j);
        r.push(r_j);
        trace!(round, "sum-check round reduced");
    }

    claims.verify_final_eval(
        ctx,
        &r,
        combination_coeff,
        running_sum,
        &proof.final_eval_proof,
    )?;

    Ok(r)
}
