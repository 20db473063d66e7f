use std::collections::BTreeMap;

use p3_field::Field;
use p3_util::log2_strict_usize;
use serde::{Deserialize, Serialize};

use super::AssignmentError;
use crate::{
    circuit::WireId,
    poly::{evals::eval_multilinear, multilinear::MultilinearPoint},
};

/// Values of some wires across every instance of the circuit.
///
/// Entry `k` of a wire's table is its value in instance `k`, so the table is the evaluation
/// form of a multilinear polynomial in `log2(instances)` variables. The verifier only reads
/// output and input wires, so the assignment it gets may be partial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAssignment<F> {
    tables: BTreeMap<WireId, Vec<F>>,
}

impl<F: Field> WireAssignment<F> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    /// Sets the values of `wire`, returning the previous ones.
    pub fn insert(&mut self, wire: WireId, values: Vec<F>) -> Option<Vec<F>> {
        self.tables.insert(wire, values)
    }

    #[must_use]
    pub fn get(&self, wire: WireId) -> Option<&[F]> {
        self.tables.get(&wire).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, wire: WireId) -> bool {
        self.tables.contains_key(&wire)
    }

    /// Number of instances, checked to be a power of two shared by every table.
    pub fn num_instances(&self) -> Result<usize, AssignmentError> {
        let mut tables = self.tables.iter();
        let (_, first) = tables.next().ok_or(AssignmentError::Empty)?;
        let expected = first.len();

        if let Some((&wire, t)) = tables.find(|(_, t)| t.len() != expected) {
            return Err(AssignmentError::InconsistentInstances {
                wire,
                expected,
                got: t.len(),
            });
        }
        if !expected.is_power_of_two() {
            return Err(AssignmentError::NotPowerOfTwo(expected));
        }

        Ok(expected)
    }

    /// Checks that the assignment is non-empty and every table has the same power-of-two length.
    pub fn validate(&self) -> Result<(), AssignmentError> {
        self.num_instances().map(|_| ())
    }

    /// `log2` of the number of instances.
    pub fn num_vars(&self) -> Result<usize, AssignmentError> {
        self.num_instances().map(log2_strict_usize)
    }

    /// Evaluates the multilinear extension of `wire`'s table at `point`.
    pub fn evaluate(&self, wire: WireId, point: &MultilinearPoint<F>) -> Result<F, AssignmentError> {
        let table = self
            .tables
            .get(&wire)
            .ok_or(AssignmentError::MissingWire(wire))?;

        if !table.len().is_power_of_two() {
            return Err(AssignmentError::NotPowerOfTwo(table.len()));
        }
        let num_vars = log2_strict_usize(table.len());
        if num_vars != point.num_variables() {
            return Err(AssignmentError::PointArity {
                wire,
                expected: num_vars,
                got: point.num_variables(),
            });
        }

        Ok(eval_multilinear(table, point))
    }
}
