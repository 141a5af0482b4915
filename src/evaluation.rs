// imports
use crate::error::{PmiError, Result};
use crate::similarity::Similarity;
use crate::stats::{spearman, SpearmanResult};

use tracing::warn;

/// One row of a human similarity table.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalPair {
    pub word1: String,
    pub word2: String,
    pub score: f64,
}

impl EvalPair {
    pub fn new(word1: &str, word2: &str, score: f64) -> EvalPair {
        EvalPair { word1: word1.to_owned(), word2: word2.to_owned(), score }
    }
}

/// What to do with a pair that names a word outside the vocabulary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OovPolicy {
    /// Abort the evaluation with `PmiError::UnknownWord`.
    #[default]
    Fail,
    /// Drop the pair and count it in `SpearmanResult::skipped`.
    Skip,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Evaluator {
    policy: OovPolicy,
}

impl Evaluator {

    pub fn new(policy: OovPolicy) -> Evaluator {
        Evaluator { policy }
    }

    pub fn evaluate<A>(&self, pairs: &[EvalPair], similarity: &Similarity<A>) -> Result<SpearmanResult>
    where
        A: Copy + Into<f64> + Send + Sync,
    {
        // cosine of the two rows for every pair, then rank correlation against the human scores
        let mut scores: Vec<f64> = Vec::with_capacity(pairs.len());
        let mut sim_scores: Vec<f64> = Vec::with_capacity(pairs.len());
        let mut skipped = 0;

        for pair in pairs {
            match similarity.similarity(&pair.word1, &pair.word2) {
                Ok(sim) => {
                    scores.push(pair.score);
                    sim_scores.push(sim);
                },
                Err(PmiError::UnknownWord(word)) if self.policy == OovPolicy::Skip => {
                    warn!("skipping pair ({}, {}), '{}' is not in the vocabulary", pair.word1, pair.word2, word);
                    skipped += 1;
                },
                Err(e) => return Err(e)
            }
        }

        let (correlation, p_value) = spearman(&scores, &sim_scores)?;
        Ok(SpearmanResult {
            correlation,
            p_value,
            n_pairs: scores.len(),
            skipped
        })
    }
}
