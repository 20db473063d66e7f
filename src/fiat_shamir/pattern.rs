use p3_field::Field;

#[derive(Debug, Clone, Copy)]
pub enum Pattern {
    Sample,
    Observe,
}

impl Pattern {
    #[must_use]
    pub fn as_field_element<F: Field>(self) -> F {
        F::from_u8(self as u8)
    }
}

/// Labels for items that are sampled.
#[derive(Debug, Clone, Copy)]
pub enum Sample {
    FirstChallenge,
    CombinationCoefficient,
    PartialSumChallenge,
}

impl Sample {
    #[must_use]
    pub fn as_field_element<F: Field>(self) -> F {
        F::from_u8(self as u8)
    }
}

/// Labels for items that are observed.
#[derive(Debug, Clone, Copy)]
pub enum Observe {
    NumInstances,
    NumWires,
    BaseChallenges,
    PartialSumPoly,
    FinalEvalProof,
}

impl Observe {
    #[must_use]
    pub fn as_field_element<F: Field>(self) -> F {
        F::from_u8(self as u8)
    }
}
