use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::ProofError;
use crate::{circuit::SortedCircuit, sumcheck::SumcheckProof};

/// One sum-check proof per wire, in sorted order.
///
/// Wires checked by direct evaluation have an empty entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof<EF>(pub Vec<SumcheckProof<EF>>);

impl<EF> Deref for Proof<EF> {
    type Target = [SumcheckProof<EF>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Number of field elements in a proof for `circuit` over `2^log_nb_instances` instances.
///
/// Every distinct consumer of a wire reads one final evaluation of it, and every wire that
/// needs a sum-check sends `degree + 1` values per variable.
#[must_use]
pub fn proof_size<F>(circuit: &SortedCircuit<F>, log_nb_instances: usize) -> usize {
    let (final_evals, per_variable) = size_terms(circuit);
    final_evals + per_variable * log_nb_instances
}

fn size_terms<F>(circuit: &SortedCircuit<F>) -> (usize, usize) {
    circuit
        .iter_sorted()
        .fold((0, 0), |(final_evals, per_variable), (_, wire)| {
            let rounds = if wire.no_proof() { 0 } else { wire.degree() + 1 };
            (final_evals + wire.nb_unique_outputs(), per_variable + rounds)
        })
}

impl<EF: Clone> Proof<EF> {
    /// Flattens the proof wire by wire: rounds first, then the final evaluations.
    ///
    /// No lengths are written; they follow from the circuit shape.
    #[must_use]
    pub fn serialize(&self) -> Vec<EF> {
        self.0
            .iter()
            .flat_map(|entry| {
                entry
                    .partial_sum_polys
                    .iter()
                    .flatten()
                    .chain(&entry.final_eval_proof)
                    .cloned()
            })
            .collect()
    }

    /// Reads a proof, inferring the number of instances from its length.
    pub fn deserialize<F>(circuit: &SortedCircuit<F>, data: &[EF]) -> Result<Self, ProofError>
    where
        EF: Default,
    {
        let (final_evals, per_variable) = size_terms(circuit);

        let Some(rounds_len) = data.len().checked_sub(final_evals) else {
            return Err(ProofError::SizeMismatch {
                expected: final_evals,
                got: data.len(),
            });
        };

        let log_nb_instances = match (rounds_len, per_variable) {
            (0, _) => 0,
            (_, 0) => return Err(ProofError::UndeterminedInstances(data.len())),
            (len, per) if len % per != 0 => {
                return Err(ProofError::UndeterminedInstances(data.len()));
            }
            (len, per) => len / per,
        };

        Self::deserialize_with_log(circuit, log_nb_instances, data)
    }

    /// Reads a proof over `2^log_nb_instances` instances.
    pub fn deserialize_with_log<F>(
        circuit: &SortedCircuit<F>,
        log_nb_instances: usize,
        data: &[EF],
    ) -> Result<Self, ProofError>
    where
        EF: Default,
    {
        let expected = proof_size(circuit, log_nb_instances);
        if data.len() < expected {
            return Err(ProofError::SizeMismatch {
                expected,
                got: data.len(),
            });
        }

        let mut rest = data;
        let mut take = |n: usize| {
            let (head, tail) = rest.split_at(n);
            rest = tail;
            head.to_vec()
        };

        let entries = circuit
            .iter_sorted()
            .map(|(_, wire)| {
                if wire.no_proof() {
                    return SumcheckProof::default();
                }
                let partial_sum_polys = (0..log_nb_instances)
                    .map(|_| take(wire.degree() + 1))
                    .collect();
                let final_eval_proof = take(wire.nb_unique_inputs());
                SumcheckProof::new(partial_sum_polys, final_eval_proof)
            })
            .collect();

        if !rest.is_empty() {
            return Err(ProofError::TrailingData(rest.len()));
        }

        Ok(Self(entries))
    }
}

#[cfg(test)]
mod tests {
    use p3_baby_bear::BabyBear;
    use p3_field::PrimeCharacteristicRing;
    use proptest::prelude::*;

    use super::*;
    use crate::circuit::{
        Circuit, WireId,
        gate::{AddGate, MulGate, PowGate},
        topological_sort,
    };

    type F = BabyBear;

    /// `out = (a * b) + b`, `sq = a^3`.
    fn sample_circuit() -> SortedCircuit<F> {
        let mut circuit = Circuit::new();
        let a = circuit.add_input();
        let b = circuit.add_input();
        let ab = circuit.add_gate(MulGate, &[a, b]);
        circuit.add_gate(AddGate, &[ab, b]);
        circuit.add_gate(PowGate(3), &[a]);
        topological_sort(&circuit)
    }

    #[test]
    fn test_proof_size() {
        let sorted = sample_circuit();
        // Fan-outs: a -> {ab, sq}, b -> {ab, out}, ab -> {out}.
        // Sum-checks: a (2), b (2), ab (3), out (2), sq (4).
        assert_eq!(proof_size(&sorted, 0), 5);
        assert_eq!(proof_size(&sorted, 3), 5 + 13 * 3);
    }

    #[test]
    fn test_single_mul_gate_size() {
        let mut circuit = Circuit::<F>::new();
        let a = circuit.add_input();
        let b = circuit.add_input();
        circuit.add_gate(MulGate, &[a, b]);
        let sorted = topological_sort(&circuit);

        assert_eq!(proof_size(&sorted, 0), 2);
        assert_eq!(proof_size(&sorted, 1), 5);
    }

    #[test]
    fn test_deserialize_errors() {
        let sorted = sample_circuit();

        assert_eq!(
            Proof::deserialize(&sorted, &[F::ONE; 4]),
            Err(ProofError::SizeMismatch {
                expected: 5,
                got: 4
            })
        );
        assert_eq!(
            Proof::deserialize(&sorted, &[F::ONE; 5 + 14]),
            Err(ProofError::UndeterminedInstances(19))
        );
        assert!(Proof::deserialize_with_log(&sorted, 1, &[F::ONE; 18]).is_ok());
        assert_eq!(
            Proof::deserialize_with_log(&sorted, 2, &[F::ONE; 18]),
            Err(ProofError::SizeMismatch {
                expected: 31,
                got: 18
            })
        );
        assert_eq!(
            Proof::deserialize_with_log(&sorted, 1, &[F::ONE; 19]),
            Err(ProofError::TrailingData(1))
        );
    }

    #[test]
    fn test_deserialize_layout() {
        let mut circuit = Circuit::<F>::new();
        let a = circuit.add_input();
        let b = circuit.add_input();
        circuit.add_gate(MulGate, &[a, b]);
        let sorted = topological_sort(&circuit);

        let data: Vec<F> = (1..=5).map(F::from_u64).collect();
        let proof = Proof::deserialize(&sorted, &data).unwrap();

        assert_eq!(proof.len(), 3);
        assert!(proof[0].is_empty() && proof[1].is_empty());
        assert_eq!(
            proof[2].partial_sum_polys,
            vec![vec![F::from_u64(1), F::from_u64(2), F::from_u64(3)]]
        );
        assert_eq!(proof[2].final_eval_proof, vec![F::from_u64(4), F::from_u64(5)]);
        assert_eq!(proof.serialize(), data);
    }

    #[test]
    fn test_inputs_only_circuit() {
        let mut circuit = Circuit::<F>::new();
        circuit.add_input();
        circuit.add_input();
        let sorted = topological_sort(&circuit);

        assert_eq!(proof_size(&sorted, 5), 0);
        assert_eq!(
            Proof::<F>::deserialize(&sorted, &[]),
            Ok(Proof(vec![SumcheckProof::default(); 2]))
        );
        assert_eq!(
            Proof::deserialize(&sorted, &[F::ONE]),
            Err(ProofError::UndeterminedInstances(1))
        );
    }

    /// A random layered circuit: `num_inputs` inputs, then gates reading earlier wires.
    fn random_circuit(num_inputs: usize, gates: &[(u8, usize, usize)]) -> SortedCircuit<F> {
        let mut circuit = Circuit::<F>::new();
        for _ in 0..num_inputs {
            circuit.add_input();
        }
        for &(kind, x, y) in gates {
            let n = circuit.len();
            let (x, y) = (WireId(x % n), WireId(y % n));
            match kind % 3 {
                0 => circuit.add_gate(AddGate, &[x, y]),
                1 => circuit.add_gate(MulGate, &[x, y]),
                _ => circuit.add_gate(PowGate(3), &[x]),
            };
        }
        topological_sort(&circuit)
    }

    proptest! {
        #[test]
        fn test_size_round_trip(
            num_inputs in 1usize..4,
            gates in prop::collection::vec((any::<u8>(), any::<usize>(), any::<usize>()), 1..8),
            log in 0usize..4,
        ) {
            let sorted = random_circuit(num_inputs, &gates);
            let size = proof_size(&sorted, log);
            let data: Vec<F> = (0..size as u64).map(F::from_u64).collect();

            let proof = Proof::deserialize_with_log(&sorted, log, &data).unwrap();
            prop_assert_eq!(proof.iter().map(SumcheckProof::len).sum::<usize>(), size);
            prop_assert_eq!(proof.serialize(), data.clone());

            prop_assert_eq!(Proof::deserialize(&sorted, &data).unwrap(), proof);
        }
    }
}
