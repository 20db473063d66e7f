use std::sync::Arc;

use p3_field::Field;
use tracing::instrument;

use super::{Circuit, CircuitError, Gate, WireId, gate::IdentityGate};

/// A wire together with the metadata the protocol derives from the circuit shape.
#[derive(Debug)]
pub struct SortedWire<F> {
    gate: Arc<dyn Gate<F>>,
    inputs: Vec<WireId>,
    /// Distinct inputs, in order of first occurrence.
    unique_inputs: Vec<WireId>,
    /// For every input slot, the index of its wire in `unique_inputs`.
    slot_to_unique: Vec<usize>,
    /// Number of distinct wires consuming this one.
    nb_unique_outputs: usize,
}

impl<F> SortedWire<F> {
    #[must_use]
    pub fn gate(&self) -> &dyn Gate<F> {
        self.gate.as_ref()
    }

    #[must_use]
    pub fn inputs(&self) -> &[WireId] {
        &self.inputs
    }

    #[must_use]
    pub fn unique_inputs(&self) -> &[WireId] {
        &self.unique_inputs
    }

    #[must_use]
    pub fn slot_to_unique(&self) -> &[usize] {
        &self.slot_to_unique
    }

    #[must_use]
    pub fn is_input(&self) -> bool {
        self.inputs.is_empty()
    }

    #[must_use]
    pub const fn is_output(&self) -> bool {
        self.nb_unique_outputs == 0
    }

    /// Number of claims the wire accumulates during verification.
    ///
    /// An output wire gets a single claim seeded from the first challenge, any other wire gets
    /// one claim per distinct consumer.
    #[must_use]
    pub const fn nb_claims(&self) -> usize {
        if self.is_output() {
            1
        } else {
            self.nb_unique_outputs
        }
    }

    /// An input wire with a single claim is checked by direct evaluation, without a sum-check.
    #[must_use]
    pub fn no_proof(&self) -> bool {
        self.is_input() && self.nb_claims() == 1
    }

    #[must_use]
    pub const fn nb_unique_outputs(&self) -> usize {
        self.nb_unique_outputs
    }

    #[must_use]
    pub fn nb_unique_inputs(&self) -> usize {
        self.unique_inputs.len()
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        self.gate.degree()
    }
}

/// A circuit with its evaluation order and per-wire metadata.
///
/// Wires keep their declaration [`WireId`]s; `order` lists them so that every wire comes
/// after all of its inputs. Proofs and challenge names refer to positions in `order`.
#[derive(Debug)]
pub struct SortedCircuit<F> {
    wires: Vec<SortedWire<F>>,
    order: Vec<WireId>,
}

impl<F: Field> SortedCircuit<F> {
    /// Adopts a caller-supplied evaluation order instead of computing one.
    pub fn with_order(circuit: &Circuit<F>, order: Vec<WireId>) -> Result<Self, CircuitError> {
        let (wires, _) = annotate(circuit)?;

        if order.len() != wires.len() {
            return Err(CircuitError::OrderLength {
                expected: wires.len(),
                got: order.len(),
            });
        }

        let mut position = vec![usize::MAX; wires.len()];
        for (i, &id) in order.iter().enumerate() {
            if id.0 >= wires.len() || position[id.0] != usize::MAX {
                return Err(CircuitError::NotAPermutation(id));
            }
            position[id.0] = i;
        }

        for (i, wire) in wires.iter().enumerate() {
            for &input in &wire.inputs {
                if position[input.0] >= position[i] {
                    return Err(CircuitError::InputAfterConsumer {
                        wire: WireId(i),
                        input,
                    });
                }
            }
        }

        Ok(Self { wires, order })
    }
}

impl<F> SortedCircuit<F> {
    #[must_use]
    pub fn wire(&self, id: WireId) -> &SortedWire<F> {
        &self.wires[id.0]
    }

    /// Evaluation order: every wire appears after all of its inputs.
    #[must_use]
    pub fn order(&self) -> &[WireId] {
        &self.order
    }

    /// The wire at position `i` of the evaluation order.
    #[must_use]
    pub fn sorted(&self, i: usize) -> (WireId, &SortedWire<F>) {
        let id = self.order[i];
        (id, &self.wires[id.0])
    }

    pub fn iter_sorted(&self) -> impl DoubleEndedIterator<Item = (WireId, &SortedWire<F>)> + ExactSizeIterator {
        self.order.iter().map(|&id| (id, &self.wires[id.0]))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.wires.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }
}

/// Canonicalizes gates, computes fan-out counts and the consumer list of every wire.
///
/// The consumer list has one entry per input slot, so a wire feeding the same gate twice is
/// listed twice, matching the per-slot readiness counters of the sort.
fn annotate<F: Field>(
    circuit: &Circuit<F>,
) -> Result<(Vec<SortedWire<F>>, Vec<Vec<usize>>), CircuitError> {
    let n = circuit.len();
    let identity: Arc<dyn Gate<F>> = Arc::new(IdentityGate);

    let mut outputs = vec![Vec::new(); n];
    let mut nb_unique_outputs = vec![0; n];
    let mut wires = Vec::with_capacity(n);

    for (id, wire) in circuit.iter() {
        let mut unique_inputs: Vec<WireId> = Vec::with_capacity(wire.inputs.len());
        let mut slot_to_unique = Vec::with_capacity(wire.inputs.len());

        for &input in &wire.inputs {
            if input.0 >= n {
                return Err(CircuitError::UnknownInput { wire: id, input });
            }
            outputs[input.0].push(id.0);

            if let Some(pos) = unique_inputs.iter().position(|&u| u == input) {
                slot_to_unique.push(pos);
            } else {
                slot_to_unique.push(unique_inputs.len());
                unique_inputs.push(input);
                nb_unique_outputs[input.0] += 1;
            }
        }

        let gate = match (&wire.gate, wire.is_input()) {
            (Some(gate), false) => gate.clone(),
            _ => identity.clone(),
        };

        wires.push(SortedWire {
            gate,
            inputs: wire.inputs.clone(),
            unique_inputs,
            slot_to_unique,
            nb_unique_outputs: 0,
        });
    }

    for (wire, count) in wires.iter_mut().zip(nb_unique_outputs) {
        wire.nb_unique_outputs = count;
    }

    Ok((wires, outputs))
}

struct TopSortData {
    outputs: Vec<Vec<usize>>,
    /// Number of input slots not yet emitted.
    pending: Vec<usize>,
    done: Vec<bool>,
    /// Smallest index that may be ready; everything below it is done or waiting.
    least_ready: usize,
}

impl TopSortData {
    fn is_ready(&self, i: usize) -> bool {
        !self.done[i] && self.pending[i] == 0
    }

    fn mark_done(&mut self, i: usize) {
        self.done[i] = true;

        for &out in &self.outputs[i] {
            self.pending[out] -= 1;
            if self.pending[out] == 0 && out < self.least_ready {
                self.least_ready = out;
            }
        }

        while self.least_ready < self.done.len() && !self.is_ready(self.least_ready) {
            self.least_ready += 1;
        }
    }
}

/// Sorts the wires so that every wire comes after all the wires it depends on.
///
/// The lowest-index ready wire is always emitted first, so the declaration order is kept
/// wherever possible and an already sorted circuit is returned unchanged. Input wires get
/// the identity gate and every wire gets its fan-out count.
///
/// Worst case is quadratic in the number of wires, but circuits are small and usually
/// declared close to sorted.
///
/// # Panics
///
/// Panics if the circuit has a cycle or references a wire that does not exist.
#[instrument(skip_all, fields(num_wires = circuit.len()))]
#[must_use]
pub fn topological_sort<F: Field>(circuit: &Circuit<F>) -> SortedCircuit<F> {
    let (wires, outputs) = match annotate(circuit) {
        Ok(annotated) => annotated,
        Err(err) => panic!("malformed circuit: {err}"),
    };

    let n = wires.len();
    let mut data = TopSortData {
        outputs,
        pending: wires.iter().map(|w| w.inputs.len()).collect(),
        done: vec![false; n],
        least_ready: 0,
    };
    while data.least_ready < n && !data.is_ready(data.least_ready) {
        data.least_ready += 1;
    }

    let mut order = Vec::with_capacity(n);
    for _ in 0..n {
        assert!(data.least_ready < n, "circuit contains a cycle");
        order.push(WireId(data.least_ready));
        data.mark_done(data.least_ready);
    }

    SortedCircuit { wires, order }
}
