//! Layered arithmetic circuits.
//!
//! A [`Circuit`] is an arena of [`Wire`]s in declaration order. Wires reference their inputs
//! through stable [`WireId`]s, so "the same wire" always means "the same index".
//! Sorting a circuit (see [`topological_sort`]) produces a [`SortedCircuit`], the immutable
//! form the protocol works with.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod gate;
mod sort;

pub use gate::Gate;
pub use sort::{SortedCircuit, SortedWire, topological_sort};

/// Index of a wire in its circuit's declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WireId(pub usize);

impl WireId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the circuit DAG.
///
/// A wire without inputs is a circuit input. Its gate is ignored: once sorted, every input
/// wire carries the identity gate.
#[derive(Debug)]
pub struct Wire<F> {
    pub gate: Option<Arc<dyn Gate<F>>>,
    pub inputs: Vec<WireId>,
}

impl<F> Clone for Wire<F> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            inputs: self.inputs.clone(),
        }
    }
}

impl<F> Wire<F> {
    #[must_use]
    pub const fn input() -> Self {
        Self {
            gate: None,
            inputs: Vec::new(),
        }
    }

    #[must_use]
    pub fn new<G: Gate<F> + 'static>(gate: G, inputs: Vec<WireId>) -> Self {
        Self {
            gate: Some(Arc::new(gate)),
            inputs,
        }
    }

    #[must_use]
    pub fn is_input(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Wires in the caller's declaration order, which need not be an evaluation order.
#[derive(Debug)]
pub struct Circuit<F> {
    wires: Vec<Wire<F>>,
}

impl<F> Clone for Circuit<F> {
    fn clone(&self) -> Self {
        Self {
            wires: self.wires.clone(),
        }
    }
}

impl<F> Default for Circuit<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> Circuit<F> {
    #[must_use]
    pub const fn new() -> Self {
        Self { wires: Vec::new() }
    }

    #[must_use]
    pub const fn from_wires(wires: Vec<Wire<F>>) -> Self {
        Self { wires }
    }

    /// Appends a wire and returns its id. Inputs may reference wires declared later.
    pub fn push(&mut self, wire: Wire<F>) -> WireId {
        self.wires.push(wire);
        WireId(self.wires.len() - 1)
    }

    pub fn add_input(&mut self) -> WireId {
        self.push(Wire::input())
    }

    pub fn add_gate<G: Gate<F> + 'static>(&mut self, gate: G, inputs: &[WireId]) -> WireId {
        self.push(Wire::new(gate, inputs.to_vec()))
    }

    #[must_use]
    pub fn wire(&self, id: WireId) -> &Wire<F> {
        &self.wires[id.0]
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.wires.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WireId, &Wire<F>)> {
        self.wires.iter().enumerate().map(|(i, w)| (WireId(i), w))
    }
}

/// Errors raised when adopting a caller-supplied evaluation order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CircuitError {
    #[error("order has {got} entries but the circuit has {expected} wires")]
    OrderLength { expected: usize, got: usize },

    #[error("wire {0} is missing from or repeated in the order")]
    NotAPermutation(WireId),

    #[error("wire {wire} is not ordered after its input {input}")]
    InputAfterConsumer { wire: WireId, input: WireId },

    #[error("wire {wire} references unknown input {input}")]
    UnknownInput { wire: WireId, input: WireId },
}
