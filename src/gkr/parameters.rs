use p3_challenger::FieldChallenger;
use p3_field::{ExtensionField, Field};

use super::challenges::challenge_names;
use crate::{
    circuit::SortedCircuit,
    fiat_shamir::{
        domain_separator::DomainSeparator, errors::FiatShamirError, pattern::Observe,
        transcript::Transcript,
    },
};

/// Where a run draws its challenges from.
#[derive(Debug)]
pub enum TranscriptSettings<'a, F, EF, Challenger> {
    /// A transcript dedicated to this run, created from the circuit shape.
    Fresh {
        challenger: Challenger,
        /// Prefix of every challenge name.
        prefix: String,
        /// Values bound to the first challenge, typically a commitment to the inputs.
        base_challenges: Vec<EF>,
    },
    /// A transcript shared with an enclosing protocol.
    ///
    /// It must have the names of [`challenge_names`] with the same `prefix` registered, next
    /// in line.
    Shared {
        transcript: &'a mut Transcript<F, EF, Challenger>,
        prefix: String,
    },
}

impl<F, EF, Challenger> TranscriptSettings<'_, F, EF, Challenger> {
    /// Fresh transcript with no prefix and no base challenges.
    #[must_use]
    pub const fn fresh(challenger: Challenger) -> Self {
        Self::Fresh {
            challenger,
            prefix: String::new(),
            base_challenges: Vec::new(),
        }
    }
}

/// A transcript either owned by the run or borrowed from the caller.
#[derive(Debug)]
pub(crate) enum TranscriptHandle<'a, F, EF, Challenger> {
    Owned(Transcript<F, EF, Challenger>),
    Borrowed(&'a mut Transcript<F, EF, Challenger>),
}

impl<F, EF, Challenger> TranscriptHandle<'_, F, EF, Challenger> {
    pub(crate) fn transcript(&mut self) -> &mut Transcript<F, EF, Challenger> {
        match self {
            Self::Owned(transcript) => transcript,
            Self::Borrowed(transcript) => transcript,
        }
    }
}

impl<'a, F, EF, Challenger> TranscriptSettings<'a, F, EF, Challenger>
where
    F: Field,
    EF: ExtensionField<F>,
    Challenger: FieldChallenger<F>,
{
    /// Resolves the settings into a transcript ready for the first challenges, and the name
    /// prefix.
    pub(crate) fn into_transcript<G>(
        self,
        circuit: &SortedCircuit<G>,
        log_nb_instances: usize,
    ) -> Result<(TranscriptHandle<'a, F, EF, Challenger>, String), FiatShamirError> {
        match self {
            Self::Fresh {
                challenger,
                prefix,
                base_challenges,
            } => {
                let names = challenge_names(circuit, log_nb_instances, &prefix);

                let mut domsep = DomainSeparator::<EF, F>::new(vec![]);
                domsep.observe(base_challenges.len(), Observe::BaseChallenges);
                domsep.add_gkr_proof(circuit, log_nb_instances);

                let first = names.first().cloned();
                let mut transcript = domsep.to_transcript(challenger, names);
                if let Some(first) = first {
                    transcript.bind(&first, &base_challenges)?;
                }

                Ok((TranscriptHandle::Owned(transcript), prefix))
            }
            Self::Shared { transcript, prefix } => {
                Ok((TranscriptHandle::Borrowed(transcript), prefix))
            }
        }
    }
}
