//! Gates: low-degree polynomials attached to non-input wires.

use core::fmt::Debug;

use p3_field::Field;

/// A gate is a low-degree polynomial map from input wire values to the wire's own value.
///
/// Both methods must be pure: the verifier evaluates gates on sum-check reduced points and
/// the degree bound fixes the length of every partial-sum polynomial in the proof.
pub trait Gate<F>: Debug + Send + Sync {
    /// Evaluates the gate on one value per input slot.
    fn evaluate(&self, inputs: &[F]) -> F;

    /// Total degree of the gate polynomial.
    fn degree(&self) -> usize;
}

/// Forwards its single input. Takes exactly one input.
///
/// Every input wire is treated as carrying this gate, with itself as the only input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityGate;

impl<F: Field> Gate<F> for IdentityGate {
    fn evaluate(&self, inputs: &[F]) -> F {
        debug_assert_eq!(inputs.len(), 1, "identity gate takes one input");
        inputs[0]
    }

    fn degree(&self) -> usize {
        1
    }
}

/// Sum of all inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddGate;

impl<F: Field> Gate<F> for AddGate {
    fn evaluate(&self, inputs: &[F]) -> F {
        inputs.iter().copied().sum()
    }

    fn degree(&self) -> usize {
        1
    }
}

/// `a - b`. Takes exactly two inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubGate;

impl<F: Field> Gate<F> for SubGate {
    fn evaluate(&self, inputs: &[F]) -> F {
        debug_assert_eq!(inputs.len(), 2, "sub gate takes two inputs");
        inputs[0] - inputs[1]
    }

    fn degree(&self) -> usize {
        1
    }
}

/// `a * b`. Takes exactly two inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MulGate;

impl<F: Field> Gate<F> for MulGate {
    fn evaluate(&self, inputs: &[F]) -> F {
        debug_assert_eq!(inputs.len(), 2, "mul gate takes two inputs");
        inputs[0] * inputs[1]
    }

    fn degree(&self) -> usize {
        2
    }
}

/// `a^e` for a fixed public exponent `e >= 1`. Takes exactly one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowGate(pub u64);

impl<F: Field> Gate<F> for PowGate {
    fn evaluate(&self, inputs: &[F]) -> F {
        debug_assert_eq!(inputs.len(), 1, "pow gate takes one input");
        inputs[0].exp_u64(self.0)
    }

    fn degree(&self) -> usize {
        self.0 as usize
    }
}
