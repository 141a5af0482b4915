use crate::error::{PmiError, Result};

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

/// Raw documents, one per corpus line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Corpus {
    documents: Vec<String>,
}

impl Corpus {

    pub fn new(documents: Vec<String>) -> Corpus {
        Corpus { documents }
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Keeps `round(fraction * len)` documents drawn with a generator seeded by `seed`,
    /// in their original order. The same seed always gives the same sample.
    pub fn sample(&self, fraction: f64, seed: u64) -> Result<Corpus> {

        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(PmiError::InvalidFraction(fraction));
        }

        let n = self.documents.len();
        let amount = ((fraction * n as f64).round() as usize).min(n);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut picked = index::sample(&mut rng, n, amount).into_vec();
        picked.sort_unstable();

        Ok(Corpus {
            documents: picked.into_iter().map(|i| self.documents[i].clone()).collect()
        })
    }
}
