use std::{collections::HashMap, marker::PhantomData};

use p3_challenger::FieldChallenger;
use p3_field::{ExtensionField, Field};

use super::{domain_separator::DomainSeparator, errors::FiatShamirError};

#[derive(Debug, Clone)]
struct NamedChallenge<EF> {
    name: String,
    /// Values bound to the challenge, absorbed right before it is sampled.
    bindings: Vec<EF>,
    value: Option<EF>,
}

/// A Fiat-Shamir transcript with named challenges.
///
/// The list of challenge names is fixed at construction. Challenges are computed in that
/// order and each one absorbs, in this order, its name, the values bound to it, and
/// whatever the challenger absorbed before (which includes every earlier challenge). Two
/// transcripts built from the same domain separator, challenger and names therefore derive
/// the same challenges.
#[derive(Debug, Clone)]
pub struct Transcript<F, EF, Challenger> {
    challenger: Challenger,
    challenges: Vec<NamedChallenge<EF>>,
    index: HashMap<String, usize>,
    /// Position of the first challenge not yet computed.
    next: usize,
    _base_field: PhantomData<F>,
}

impl<F, EF, Challenger> Transcript<F, EF, Challenger>
where
    F: Field,
    EF: ExtensionField<F>,
    Challenger: FieldChallenger<F>,
{
    /// Absorbs the domain separator and registers the challenge names.
    ///
    /// # Panics
    /// Panics if a name is registered twice.
    #[must_use]
    pub fn new(
        domain_separator: &DomainSeparator<EF, F>,
        mut challenger: Challenger,
        names: Vec<String>,
    ) -> Self {
        challenger.observe_slice(domain_separator.as_field_elements());

        let mut index = HashMap::with_capacity(names.len());
        let challenges = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                assert!(
                    index.insert(name.clone(), i).is_none(),
                    "challenge name \"{name}\" registered twice"
                );
                NamedChallenge {
                    name,
                    bindings: Vec::new(),
                    value: None,
                }
            })
            .collect();

        Self {
            challenger,
            challenges,
            index,
            next: 0,
            _base_field: PhantomData,
        }
    }

    /// True once every registered challenge has been computed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.next == self.challenges.len()
    }

    fn position(&self, name: &str) -> Result<usize, FiatShamirError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| FiatShamirError::UnknownChallenge(name.to_string()))
    }

    /// Binds `values` to the challenge `name`; they are absorbed when it gets computed.
    pub fn bind(&mut self, name: &str, values: &[EF]) -> Result<(), FiatShamirError> {
        let i = self.position(name)?;
        let challenge = &mut self.challenges[i];
        if challenge.value.is_some() {
            return Err(FiatShamirError::AlreadyComputed(name.to_string()));
        }
        challenge.bindings.extend_from_slice(values);
        Ok(())
    }

    /// Computes the challenge `name`, or returns it if it was already computed.
    ///
    /// Every challenge registered before `name` must have been computed already.
    pub fn compute_challenge(&mut self, name: &str) -> Result<EF, FiatShamirError> {
        let i = self.position(name)?;
        if let Some(value) = self.challenges[i].value {
            return Ok(value);
        }
        if i != self.next {
            return Err(FiatShamirError::OutOfOrder {
                name: name.to_string(),
                pending: self.challenges[self.next].name.clone(),
            });
        }

        let challenge = &mut self.challenges[i];
        let name_elements: Vec<F> = challenge.name.bytes().map(F::from_u8).collect();
        self.challenger.observe_slice(&name_elements);
        for &value in &challenge.bindings {
            self.challenger.observe_algebra_element(value);
        }

        let value: EF = self.challenger.sample_algebra_element();
        challenge.value = Some(value);
        self.next += 1;

        Ok(value)
    }

    /// Computes a run of challenges, in order.
    pub fn compute_challenges(&mut self, names: &[String]) -> Result<Vec<EF>, FiatShamirError> {
        names
            .iter()
            .map(|name| self.compute_challenge(name))
            .collect()
    }
}
