use std::marker::PhantomData;

use p3_challenger::FieldChallenger;
use p3_field::{ExtensionField, Field};

use super::{
    pattern::{Observe, Pattern, Sample},
    transcript::Transcript,
};

/// The shape of an interactive protocol, encoded as base field elements.
///
/// Every operation appends a `(pattern, label, count)` triple. The whole pattern is absorbed
/// by the challenger before anything else, so transcripts for differently shaped protocols
/// (another circuit, another number of instances) diverge from the first challenge on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSeparator<EF, F> {
    pattern: Vec<F>,
    _extension_field: PhantomData<EF>,
}

impl<EF, F> DomainSeparator<EF, F>
where
    EF: ExtensionField<F>,
    F: Field,
{
    /// Creates a domain separator starting from an application-chosen prefix.
    #[must_use]
    pub const fn new(pattern: Vec<F>) -> Self {
        Self {
            pattern,
            _extension_field: PhantomData,
        }
    }

    #[must_use]
    pub fn as_field_elements(&self) -> &[F] {
        &self.pattern
    }

    /// Records that `count` elements labelled `pattern` are absorbed.
    pub fn observe(&mut self, count: usize, pattern: Observe) {
        self.pattern.extend([
            Pattern::Observe.as_field_element(),
            pattern.as_field_element(),
            F::from_usize(count),
        ]);
    }

    /// Records that `count` challenges labelled `pattern` are squeezed.
    pub fn sample(&mut self, count: usize, pattern: Sample) {
        self.pattern.extend([
            Pattern::Sample.as_field_element(),
            pattern.as_field_element(),
            F::from_usize(count),
        ]);
    }

    /// Builds a transcript that registers `names`, in order, on top of this domain separator.
    pub fn to_transcript<Challenger>(
        &self,
        challenger: Challenger,
        names: Vec<String>,
    ) -> Transcript<F, EF, Challenger>
    where
        Challenger: FieldChallenger<F>,
    {
        Transcript::new(self, challenger, names)
    }
}
