use itertools::izip;
use p3_field::Field;

use super::{ClaimsError, VerifierError, assignment::WireAssignment};
use crate::{
    circuit::{SortedCircuit, WireId},
    poly::multilinear::MultilinearPoint,
    sumcheck::LazyClaims,
};

/// Pending claims `V(p_i) = v_i` about one wire.
///
/// A sum-check on `sum_x (sum_i a^i eq(p_i, x)) * gate(inputs(x))` reduces all of them at
/// once. For an input wire the gate is the identity applied to the wire itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireClaims<EF> {
    wire: WireId,
    points: Vec<MultilinearPoint<EF>>,
    values: Vec<EF>,
    /// Evaluations sent per sum-check round: gate degree plus one for the eq factor.
    degree: usize,
}

impl<EF: Field> WireClaims<EF> {
    fn new(wire: WireId, degree: usize, capacity: usize) -> Self {
        Self {
            wire,
            points: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            degree,
        }
    }

    #[must_use]
    pub const fn wire(&self) -> WireId {
        self.wire
    }

    #[must_use]
    pub fn points(&self) -> &[MultilinearPoint<EF>] {
        &self.points
    }

    #[must_use]
    pub fn values(&self) -> &[EF] {
        &self.values
    }

    /// `sum_i a^i eq(p_i, r)`.
    #[must_use]
    pub fn combined_eq(&self, a: EF, r: &MultilinearPoint<EF>) -> EF {
        self.points
            .iter()
            .rev()
            .fold(EF::ZERO, |acc, p| acc * a + p.eq_poly(r))
    }
}

impl<'a, EF: Field> LazyClaims<EF, ClaimsManager<'a, EF>> for WireClaims<EF> {
    type Error = VerifierError;

    fn claims_num(&self) -> usize {
        self.points.len()
    }

    fn vars_num(&self) -> usize {
        self.points.first().map_or(0, MultilinearPoint::num_variables)
    }

    fn combined_sum(&self, a: EF) -> EF {
        self.values.iter().rev().fold(EF::ZERO, |acc, &v| acc * a + v)
    }

    fn degree(&self, _round: usize) -> usize {
        self.degree
    }

    /// Checks `combined_eq(r) * gate(inputs(r)) == purported_value`.
    ///
    /// `final_eval_proof` holds the claimed evaluation at `r` of every distinct input wire.
    /// For a gate wire these become new claims on the inputs, so the check is only complete
    /// once every input wire has been reduced in turn.
    fn verify_final_eval(
        &self,
        manager: &mut ClaimsManager<'a, EF>,
        r: &[EF],
        combination_coeff: EF,
        purported_value: EF,
        final_eval_proof: &[EF],
    ) -> Result<(), VerifierError> {
        let r = MultilinearPoint::new(r.to_vec());
        let eq = self.combined_eq(combination_coeff, &r);

        let wire = manager.circuit.wire(self.wire);
        let (expected, given) = (wire.nb_unique_inputs(), final_eval_proof.len());
        // Input wires may carry their own value as an artificial single input.
        if expected != given && (expected != 0 || given != 1) {
            return Err(VerifierError::MalformedFinalEvalProof {
                wire: self.wire,
                expected,
                given,
            });
        }

        let (gate_value, values_by_slot) = if wire.is_input() {
            (manager.assignment.evaluate(self.wire, &r)?, None)
        } else {
            let by_slot: Vec<EF> = wire
                .slot_to_unique()
                .iter()
                .map(|&u| final_eval_proof[u])
                .collect();
            (wire.gate().evaluate(&by_slot), Some(by_slot))
        };

        let evaluation = eq * gate_value;
        if evaluation != purported_value {
            return Err(VerifierError::FinalEvalMismatch {
                wire: self.wire,
                expected: purported_value.to_string(),
                actual: evaluation.to_string(),
            });
        }

        if let Some(by_slot) = values_by_slot {
            manager.add_for_input(self.wire, &r, &by_slot)?;
        }
        Ok(())
    }
}

/// Claims of every wire not yet reduced.
///
/// A wire's entry is taken out with [`delete_claim`](Self::delete_claim) right before its
/// sum-check, which then gets the manager back as the finalization context. A wire is
/// therefore reduced at most once, and a claim added to it afterwards is an error.
#[derive(Debug)]
pub struct ClaimsManager<'a, EF> {
    circuit: &'a SortedCircuit<EF>,
    assignment: &'a WireAssignment<EF>,
    claims: Vec<Option<WireClaims<EF>>>,
}

impl<'a, EF: Field> ClaimsManager<'a, EF> {
    #[must_use]
    pub fn new(circuit: &'a SortedCircuit<EF>, assignment: &'a WireAssignment<EF>) -> Self {
        let claims = (0..circuit.len())
            .map(|i| {
                let wire = circuit.wire(WireId(i));
                Some(WireClaims::new(
                    WireId(i),
                    wire.degree() + 1,
                    wire.nb_claims(),
                ))
            })
            .collect();

        Self {
            circuit,
            assignment,
            claims,
        }
    }

    #[must_use]
    pub const fn circuit(&self) -> &'a SortedCircuit<EF> {
        self.circuit
    }

    #[must_use]
    pub const fn assignment(&self) -> &'a WireAssignment<EF> {
        self.assignment
    }

    /// Records the claim `wire(point) = value`. Claims are not deduplicated.
    pub fn add(
        &mut self,
        wire: WireId,
        point: MultilinearPoint<EF>,
        value: EF,
    ) -> Result<(), ClaimsError> {
        let claims = self.claims[wire.0]
            .as_mut()
            .ok_or(ClaimsError::AlreadyReduced(wire))?;
        claims.points.push(point);
        claims.values.push(value);
        Ok(())
    }

    /// Records one claim per distinct input of `wire`, all at `point`.
    ///
    /// When the gate reads the same wire through several slots only the first slot's value
    /// is kept.
    pub fn add_for_input(
        &mut self,
        wire: WireId,
        point: &MultilinearPoint<EF>,
        values_by_slot: &[EF],
    ) -> Result<(), ClaimsError> {
        let circuit = self.circuit;
        let wire = circuit.wire(wire);

        // Distinct inputs are numbered in order of first occurrence.
        let mut next_unique = 0;
        for (&input, &u, &value) in izip!(wire.inputs(), wire.slot_to_unique(), values_by_slot) {
            if u == next_unique {
                self.add(input, point.clone(), value)?;
                next_unique += 1;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get_lazy_claim(&self, wire: WireId) -> Option<&WireClaims<EF>> {
        self.claims[wire.0].as_ref()
    }

    /// Removes the claims of `wire` for good, handing them to the caller.
    pub fn delete_claim(&mut self, wire: WireId) -> Result<WireClaims<EF>, ClaimsError> {
        self.claims[wire.0]
            .take()
            .ok_or(ClaimsError::AlreadyReduced(wire))
    }

    /// True once every wire has been reduced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use p3_baby_bear::BabyBear;
    use p3_field::{PrimeCharacteristicRing, extension::BinomialExtensionField};

    use super::*;
    use crate::circuit::{
        Circuit,
        gate::{AddGate, MulGate},
        topological_sort,
    };

    type EF = BinomialExtensionField<BabyBear, 4>;

    fn point(coords: &[u64]) -> MultilinearPoint<EF> {
        MultilinearPoint::new(coords.iter().copied().map(EF::from_u64).collect())
    }

    #[test]
    fn test_add_for_input_keeps_first_slot() {
        let mut circuit = Circuit::<EF>::new();
        let x = circuit.add_input();
        let y = circuit.add_input();
        let g = circuit.add_gate(AddGate, &[x, y, x]);
        let sorted = topological_sort(&circuit);
        let assignment = WireAssignment::new();
        let mut manager = ClaimsManager::new(&sorted, &assignment);

        let p = point(&[2]);
        let values = [EF::from_u64(3), EF::from_u64(4), EF::from_u64(5)];
        manager.add_for_input(g, &p, &values).unwrap();

        let claims_x = manager.get_lazy_claim(x).unwrap();
        assert_eq!(claims_x.values(), &[EF::from_u64(3)]);
        assert_eq!(claims_x.points(), &[p.clone()]);
        assert_eq!(
            manager.get_lazy_claim(y).unwrap().values(),
            &[EF::from_u64(4)]
        );
    }

    #[test]
    fn test_delete_claim_is_terminal() {
        let mut circuit = Circuit::<EF>::new();
        let x = circuit.add_input();
        let g = circuit.add_gate(MulGate, &[x, x]);
        let sorted = topological_sort(&circuit);
        let assignment = WireAssignment::new();
        let mut manager = ClaimsManager::new(&sorted, &assignment);

        manager.add(g, point(&[1]), EF::ONE).unwrap();
        let claims = manager.delete_claim(g).unwrap();
        assert_eq!(claims.wire(), g);
        assert_eq!(LazyClaims::<EF, ClaimsManager<'_, EF>>::claims_num(&claims), 1);
        assert_eq!(LazyClaims::<EF, ClaimsManager<'_, EF>>::degree(&claims, 0), 3);

        assert_eq!(
            manager.add(g, point(&[1]), EF::ONE),
            Err(ClaimsError::AlreadyReduced(g))
        );
        assert_eq!(
            manager.delete_claim(g),
            Err(ClaimsError::AlreadyReduced(g))
        );
        assert!(!manager.is_empty());
        manager.delete_claim(x).unwrap();
        assert!(manager.is_empty());
    }

    #[test]
    fn test_combined_sum_and_eq() {
        let mut circuit = Circuit::<EF>::new();
        let x = circuit.add_input();
        let sorted = topological_sort(&circuit);
        let assignment = WireAssignment::new();
        let mut manager = ClaimsManager::new(&sorted, &assignment);

        manager.add(x, point(&[0]), EF::from_u64(2)).unwrap();
        manager.add(x, point(&[1]), EF::from_u64(7)).unwrap();
        let claims = manager.delete_claim(x).unwrap();

        let a = EF::from_u64(10);
        assert_eq!(
            LazyClaims::<EF, ClaimsManager<'_, EF>>::combined_sum(&claims, a),
            EF::from_u64(72)
        );
        // eq(0, r) + a * eq(1, r) at r = 3: (1 - 3) + 10 * 3
        assert_eq!(claims.combined_eq(a, &point(&[3])), EF::from_u64(28));
    }
}
