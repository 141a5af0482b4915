
mod config;
mod cooccurrence;
mod corpus;
mod error;
mod evaluation;
mod neighbors;
mod pipeline;
mod pmi;
mod similarity;
mod stats;
mod vocab;

pub use config::{files_handling, Config, Params};
pub use cooccurrence::{CountMatrix, Counts, Tokenizer, END_TOKEN, START_TOKEN};
pub use corpus::Corpus;
pub use error::{PmiError, Result};
pub use evaluation::{EvalPair, Evaluator, OovPolicy};
pub use neighbors::NeighborComparison;
pub use pipeline::{EvaluationRow, Inputs, MatrixKind, Pipeline};
pub use pmi::{Pmi, PmiConvention, PmiMatrix, PMI_EPS};
pub use similarity::{cosine_similarity, Similarity, COSINE_EPS};
pub use stats::{rank, spearman, SpearmanResult};
pub use vocab::Vocab;
