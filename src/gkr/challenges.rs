//! Challenge names of a protocol run.
//!
//! Names only depend on the circuit shape and the number of instances, so prover and
//! verifier register the same list without exchanging it.

use p3_field::{ExtensionField, Field};

use crate::{
    circuit::SortedCircuit,
    fiat_shamir::{
        domain_separator::DomainSeparator,
        pattern::{Observe, Sample},
    },
    sumcheck,
};

/// Prefix of the names of the wire at sorted position `i`.
#[must_use]
pub fn wire_prefix(prefix: &str, i: usize) -> String {
    format!("{prefix}w{i}.")
}

/// Names of the coordinates of the point at which outputs are first claimed.
#[must_use]
pub fn first_challenge_names(log_nb_instances: usize, prefix: &str) -> Vec<String> {
    (0..log_nb_instances)
        .map(|j| format!("{prefix}fC.{j}"))
        .collect()
}

/// Every challenge name of a run, in the order they are drawn.
///
/// First challenges come first. Then wires are visited from outputs to inputs and each wire
/// that needs a sum-check contributes its combination coefficient (when it has more than one
/// claim) and one name per round.
#[must_use]
pub fn challenge_names<F>(
    circuit: &SortedCircuit<F>,
    log_nb_instances: usize,
    prefix: &str,
) -> Vec<String> {
    let mut names = first_challenge_names(log_nb_instances, prefix);

    for (i, (_, wire)) in circuit.iter_sorted().enumerate().rev() {
        if wire.no_proof() {
            continue;
        }
        names.extend(sumcheck::challenge_names(
            &wire_prefix(prefix, i),
            wire.nb_claims(),
            log_nb_instances,
        ));
    }

    names
}

impl<EF, F> DomainSeparator<EF, F>
where
    EF: ExtensionField<F>,
    F: Field,
{
    /// Records the shape of a proof for `circuit` over `2^log_nb_instances` instances.
    pub fn add_gkr_proof<G>(&mut self, circuit: &SortedCircuit<G>, log_nb_instances: usize) {
        self.observe(log_nb_instances, Observe::NumInstances);
        self.observe(circuit.len(), Observe::NumWires);
        self.sample(log_nb_instances, Sample::FirstChallenge);

        for (_, wire) in circuit.iter_sorted().rev() {
            if wire.no_proof() {
                continue;
            }
            if wire.nb_claims() > 1 {
                self.sample(1, Sample::CombinationCoefficient);
            }
            for _ in 0..log_nb_instances {
                self.observe(wire.degree() + 1, Observe::PartialSumPoly);
                self.sample(1, Sample::PartialSumChallenge);
            }
            self.observe(wire.nb_unique_inputs(), Observe::FinalEvalProof);
        }
    }
}

#[cfg(test)]
mod tests {
    use p3_baby_bear::BabyBear;
    use p3_field::extension::BinomialExtensionField;

    use super::*;
    use crate::circuit::{Circuit, gate::MulGate, topological_sort};

    type F = BabyBear;
    type EF = BinomialExtensionField<F, 4>;

    #[test]
    fn test_first_challenge_names() {
        assert_eq!(first_challenge_names(2, "p."), vec!["p.fC.0", "p.fC.1"]);
        assert!(first_challenge_names(0, "").is_empty());
    }

    #[test]
    fn test_single_gate_names() {
        let mut circuit = Circuit::<EF>::new();
        let a = circuit.add_input();
        let b = circuit.add_input();
        circuit.add_gate(MulGate, &[a, b]);
        let sorted = topological_sort(&circuit);

        // Both inputs have a single claim and need no sum-check.
        assert_eq!(challenge_names(&sorted, 1, ""), vec!["fC.0", "w2.pSP.0"]);
        assert!(challenge_names(&sorted, 0, "").is_empty());
    }

    #[test]
    fn test_names_follow_reverse_sorted_order() {
        // x feeds two gates, so it has two claims and gets a combination coefficient.
        let mut circuit = Circuit::<EF>::new();
        let x = circuit.add_input();
        let sq = circuit.add_gate(MulGate, &[x, x]);
        circuit.add_gate(MulGate, &[sq, x]);
        let sorted = topological_sort(&circuit);

        assert_eq!(
            challenge_names(&sorted, 2, "g."),
            vec![
                "g.fC.0", "g.fC.1", "g.w2.pSP.0", "g.w2.pSP.1", "g.w1.pSP.0", "g.w1.pSP.1",
                "g.w0.comb", "g.w0.pSP.0", "g.w0.pSP.1",
            ]
        );
    }

    #[test]
    fn test_domain_separator_depends_on_shape() {
        let mut circuit = Circuit::<EF>::new();
        let a = circuit.add_input();
        circuit.add_gate(MulGate, &[a, a]);
        let sorted = topological_sort(&circuit);

        let mut d1 = DomainSeparator::<EF, F>::new(vec![]);
        d1.add_gkr_proof(&sorted, 1);
        let mut d2 = DomainSeparator::<EF, F>::new(vec![]);
        d2.add_gkr_proof(&sorted, 2);
        assert_ne!(d1, d2);
    }
}
