use p3_baby_bear::{BabyBear, Poseidon2BabyBear};
use p3_challenger::DuplexChallenger;
use p3_field::{PrimeCharacteristicRing, extension::BinomialExtensionField};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;

use super::*;
use crate::{
    fiat_shamir::{domain_separator::DomainSeparator, transcript::Transcript},
    poly::{evals::EvaluationsList, multilinear::MultilinearPoint},
};

type F = BabyBear;
type EF = BinomialExtensionField<F, 4>;
type Perm = Poseidon2BabyBear<16>;
type MyChallenger = DuplexChallenger<F, Perm, 16, 8>;

const PREFIX: &str = "t.";

/// Claims `f(p_i) = v_i` about a multilinear `f`, proved through `sum_x eq(p, x) * f(x)`.
struct EvalClaims {
    points: Vec<MultilinearPoint<EF>>,
    values: Vec<EF>,
}

#[derive(Debug, Error, PartialEq, Eq)]
enum EvalClaimsError {
    #[error(transparent)]
    Sumcheck(#[from] SumcheckError),
    #[error("final evaluation mismatch")]
    Mismatch,
}

impl LazyClaims<EF, EvaluationsList<EF>> for EvalClaims {
    type Error = EvalClaimsError;

    fn claims_num(&self) -> usize {
        self.points.len()
    }

    fn vars_num(&self) -> usize {
        self.points[0].num_variables()
    }

    fn combined_sum(&self, a: EF) -> EF {
        self.values.iter().rev().fold(EF::ZERO, |acc, &v| acc * a + v)
    }

    fn degree(&self, _round: usize) -> usize {
        2
    }

    fn verify_final_eval(
        &self,
        f: &mut EvaluationsList<EF>,
        r: &[EF],
        combination_coeff: EF,
        purported_value: EF,
        _final_eval_proof: &[EF],
    ) -> Result<(), Self::Error> {
        let r = MultilinearPoint::new(r.to_vec());
        let eq = self
            .points
            .iter()
            .rev()
            .fold(EF::ZERO, |acc, p| acc * combination_coeff + p.eq_poly(&r));
        if eq * f.evaluate(&r) == purported_value {
            Ok(())
        } else {
            Err(EvalClaimsError::Mismatch)
        }
    }
}

fn transcript(names: Vec<String>) -> Transcript<F, EF, MyChallenger> {
    let perm = Perm::new_from_rng_128(&mut SmallRng::seed_from_u64(1));
    DomainSeparator::new(vec![]).to_transcript(MyChallenger::new(perm), names)
}

fn setup(seed: u64, num_vars: usize, num_claims: usize) -> (EvaluationsList<EF>, EvalClaims) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let f = EvaluationsList::new((0..1 << num_vars).map(|_| rng.random()).collect());
    let points: Vec<_> = (0..num_claims)
        .map(|_| MultilinearPoint::new((0..num_vars).map(|_| rng.random()).collect()))
        .collect();
    let values = points.iter().map(|p| f.evaluate(p)).collect();
    (f, EvalClaims { points, values })
}

/// Honest prover for [`EvalClaims`], on the same challenge schedule as [`verify`].
fn prove(
    f: &EvaluationsList<EF>,
    claims: &EvalClaims,
    transcript: &mut Transcript<F, EF, MyChallenger>,
    base: &[EF],
) -> SumcheckProof<EF> {
    let names = challenge_names(PREFIX, claims.claims_num(), claims.vars_num());
    transcript.bind(&names[0], base).unwrap();
    let (coeff, round_names) = if claims.claims_num() > 1 {
        (transcript.compute_challenge(&names[0]).unwrap(), &names[1..])
    } else {
        (EF::ZERO, &names[..])
    };

    let mut eq = vec![EF::ZERO; f.num_evals()];
    let mut scale = EF::ONE;
    for p in &claims.points {
        let table = EvaluationsList::eq_table(p, scale);
        eq.iter_mut()
            .zip(table.as_slice())
            .for_each(|(e, &t)| *e += t);
        scale *= coeff;
    }
    let mut eq = EvaluationsList::new(eq);
    let mut f = f.clone();

    let mut polys = Vec::new();
    for name in round_names {
        let mid = f.num_evals() / 2;
        let (e0, e1) = eq.as_slice().split_at(mid);
        let (f0, f1) = f.as_slice().split_at(mid);
        let poly: Vec<EF> = (1..=2u8)
            .map(|t| {
                let t = EF::from_u8(t);
                (0..mid)
                    .map(|i| (e0[i] + t * (e1[i] - e0[i])) * (f0[i] + t * (f1[i] - f0[i])))
                    .sum()
            })
            .collect();
        transcript.bind(name, &poly).unwrap();
        let r = transcript.compute_challenge(name).unwrap();
        eq.compress(r);
        f.compress(r);
        polys.push(poly);
    }

    SumcheckProof::new(polys, vec![])
}

fn run_verifier(
    f: &mut EvaluationsList<EF>,
    claims: &EvalClaims,
    proof: &SumcheckProof<EF>,
    base: &[EF],
) -> Result<Vec<EF>, EvalClaimsError> {
    let mut t = transcript(challenge_names(
        PREFIX,
        claims.claims_num(),
        claims.vars_num(),
    ));
    verify(
        claims,
        f,
        proof,
        SumcheckTranscript {
            transcript: &mut t,
            prefix: PREFIX,
            base_challenges: base,
        },
    )
}

fn honest(seed: u64, num_vars: usize, num_claims: usize) -> (EvaluationsList<EF>, EvalClaims, SumcheckProof<EF>) {
    let (f, claims) = setup(seed, num_vars, num_claims);
    let names = challenge_names(PREFIX, num_claims, num_vars);
    let proof = prove(&f, &claims, &mut transcript(names), &[EF::ONE]);
    (f, claims, proof)
}

#[test]
fn test_challenge_names() {
    assert_eq!(challenge_names("w3.", 1, 2), vec!["w3.pSP.0", "w3.pSP.1"]);
    assert_eq!(
        challenge_names("w3.", 2, 1),
        vec!["w3.comb", "w3.pSP.0"]
    );
    assert!(challenge_names("w3.", 1, 0).is_empty());
}

#[test]
fn test_single_claim_accepted() {
    let (mut f, claims, proof) = honest(0, 4, 1);
    let r = run_verifier(&mut f, &claims, &proof, &[EF::ONE]).unwrap();
    assert_eq!(r.len(), 4);
}

#[test]
fn test_batched_claims_accepted() {
    for num_claims in 2..5 {
        let (mut f, claims, proof) = honest(num_claims as u64, 3, num_claims);
        assert!(run_verifier(&mut f, &claims, &proof, &[EF::ONE]).is_ok());
    }
}

#[test]
fn test_tampered_round_rejected() {
    let (mut f, claims, mut proof) = honest(5, 3, 2);
    proof.partial_sum_polys[1][0] += EF::ONE;
    assert_eq!(
        run_verifier(&mut f, &claims, &proof, &[EF::ONE]),
        Err(EvalClaimsError::Mismatch)
    );
}

#[test]
fn test_wrong_claimed_value_rejected() {
    let (mut f, mut claims, proof) = honest(6, 3, 1);
    claims.values[0] += EF::ONE;
    assert_eq!(
        run_verifier(&mut f, &claims, &proof, &[EF::ONE]),
        Err(EvalClaimsError::Mismatch)
    );
}

#[test]
fn test_base_challenges_are_bound() {
    let (mut f, claims, proof) = honest(7, 3, 1);
    assert_eq!(
        run_verifier(&mut f, &claims, &proof, &[EF::TWO]),
        Err(EvalClaimsError::Mismatch)
    );
}

#[test]
fn test_wrong_number_of_rounds() {
    let (mut f, claims, mut proof) = honest(8, 3, 1);
    proof.partial_sum_polys.pop();
    assert_eq!(
        run_verifier(&mut f, &claims, &proof, &[EF::ONE]),
        Err(EvalClaimsError::Sumcheck(SumcheckError::WrongNumberOfRounds {
            expected: 3,
            got: 2
        }))
    );
}

#[test]
fn test_malformed_round_polynomial() {
    let (mut f, claims, mut proof) = honest(9, 3, 1);
    proof.partial_sum_polys[2].push(EF::ZERO);
    assert_eq!(
        run_verifier(&mut f, &claims, &proof, &[EF::ONE]),
        Err(EvalClaimsError::Sumcheck(
            SumcheckError::MalformedPartialSumPoly {
                round: 2,
                expected: 2,
                got: 3
            }
        ))
    );
}

#[test]
fn test_proof_len() {
    let (_, _, proof) = honest(10, 3, 1);
    assert_eq!(proof.len(), 6);
    assert!(!proof.is_empty());
    assert!(SumcheckProof::<EF>::default().is_empty());
}
