use serde::{Deserialize, Serialize};

/// Transcript of one sum-check run.
///
/// Round `j` carries `g_j(1), ..., g_j(d)`. The value `g_j(0)` is implied by the running sum,
/// so a round of degree `d` costs `d` field elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumcheckProof<EF> {
    pub partial_sum_polys: Vec<Vec<EF>>,
    /// Extra values the claim needs to check its final evaluation.
    pub final_eval_proof: Vec<EF>,
}

impl<EF> SumcheckProof<EF> {
    #[must_use]
    pub const fn new(partial_sum_polys: Vec<Vec<EF>>, final_eval_proof: Vec<EF>) -> Self {
        Self {
            partial_sum_polys,
            final_eval_proof,
        }
    }

    /// True for the entry of a wire checked by direct evaluation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partial_sum_polys.is_empty() && self.final_eval_proof.is_empty()
    }

    /// Number of field elements in the proof.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partial_sum_polys.iter().map(Vec::len).sum::<usize>() + self.final_eval_proof.len()
    }
}
