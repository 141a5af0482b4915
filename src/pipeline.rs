// imports
use crate::config::{files_handling::read_input, Config, Params};
use crate::cooccurrence::{CountMatrix, Counts};
use crate::corpus::Corpus;
use crate::error::{PmiError, Result};
use crate::evaluation::{EvalPair, Evaluator, OovPolicy};
use crate::neighbors::NeighborComparison;
use crate::pmi::{Pmi, PmiMatrix};
use crate::similarity::Similarity;
use crate::stats::SpearmanResult;
use crate::vocab::Vocab;

use rayon::ThreadPoolBuilder;
use std::env;
use std::error::Error;
use std::time::Instant;
use tracing::{info, warn};

/// Everything read from disk before any matrix is built.
pub struct Inputs {
    pub corpus: Corpus,
    pub row_vocab: Vocab,
    pub col_vocab: Vocab,
    pub tables: Vec<(String, Vec<EvalPair>)>,
}

impl Inputs {

    pub fn load(params: &Params) -> Result<Inputs> {

        let mut corpus = read_input::<Corpus>(&params.corpus_file)?;
        info!("loaded {} documents from {}", corpus.len(), params.corpus_file);
        if params.sample_fraction < 1.0 {
            corpus = corpus.sample(params.sample_fraction, params.seed)?;
            info!("sampled {} documents with seed {}", corpus.len(), params.seed);
        }

        // the column vocabulary comes from a file, or else from the most common corpus tokens
        let col_vocab = match &params.col_vocab_file {
            Some(path) => Vocab::build(read_input::<Vec<String>>(path)?),
            None => Vocab::most_frequent(corpus.documents(), params.vocab_size)
        };
        let row_vocab = match &params.row_vocab_file {
            Some(path) => Vocab::build(read_input::<Vec<String>>(path)?),
            None => col_vocab.clone()
        };
        info!("row vocabulary: {} words, column vocabulary: {} words", row_vocab.len(), col_vocab.len());

        let mut tables = Vec::with_capacity(params.eval_files.len());
        for path in &params.eval_files {
            let pairs = read_input::<Vec<EvalPair>>(path)?;
            info!("loaded {} evaluation pairs from {}", pairs.len(), path);
            tables.push((path.to_owned(), pairs));
        }

        Ok(Inputs { corpus, row_vocab, col_vocab, tables })
    }
}

/// Which matrix a score was computed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixKind {
    Counts,
    Pmi,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationRow {
    pub window_size: usize,
    pub kind: MatrixKind,
    pub table: String,
    pub result: SpearmanResult,
}

pub struct Pipeline {}

impl Pipeline {

    // runs the main procedure of 3 steps -
    // -> configuration of arguments and loading of inputs
    // -> counting and pmi for every window size, scored against every evaluation table
    // -> nearest neighbors of the queries, side by side for the neighbor windows

    pub fn run() -> std::result::Result<(), Box<dyn Error>> {

        info!("entering program...");
        let args: Vec<String> = env::args().collect();

        info!("building parameters...");
        let params = Config::new(&args)?.get_params();
        info!("{}", params);

        let inputs = Inputs::load(&params)?;

        let rows = Pipeline::evaluate(&params, &inputs)?;
        if !rows.is_empty() {
            Pipeline::print_report(&rows);
        }

        for comparison in Pipeline::neighbors(&params, &inputs)? {
            println!("{}", comparison);
        }

        Ok(())
    }

    fn counts(params: &Params, documents: &[String], row_vocab: &Vocab, col_vocab: &Vocab, window_size: usize) -> Result<CountMatrix> {

        let timer = Instant::now();
        let counts = Counts::build_parallel(documents, row_vocab, col_vocab, window_size, params.num_threads, params.progress_verbose)?;
        info!("window {}: counted {:?} matrix, took {} seconds ...", window_size, counts.dim(), timer.elapsed().as_secs());
        Ok(counts)
    }

    fn pmi(params: &Params, counts: &CountMatrix) -> PmiMatrix {

        let timer = Instant::now();
        let mut next_percent = 10;
        let mut report = |done: usize, total: usize| {
            let percent = 100 * done / total.max(1);
            if percent >= next_percent {
                info!("pmi {}% done", percent);
                next_percent = percent - percent % 10 + 10;
            }
        };
        let progress: Option<&mut dyn FnMut(usize, usize)> = if params.progress_verbose { Some(&mut report as &mut dyn FnMut(usize, usize)) } else { None };

        let pmi = Pmi::transform_with_progress(counts, params.pmi_eps, params.pmi_convention, progress);
        info!("pmi ({}) took {} seconds ...", params.pmi_convention, timer.elapsed().as_secs());
        pmi
    }

    fn policy(params: &Params) -> OovPolicy {
        if params.skip_unknown { OovPolicy::Skip } else { OovPolicy::Fail }
    }

    /// Spearman scores of the raw counts and of the PMI matrix, per window size and table.
    pub fn evaluate(params: &Params, inputs: &Inputs) -> Result<Vec<EvaluationRow>> {

        let mut rows = Vec::new();
        if inputs.tables.is_empty() {
            return Ok(rows);
        }

        let evaluator = Evaluator::new(Pipeline::policy(params));
        for &window_size in &params.window_sizes {

            let counts = Pipeline::counts(params, inputs.corpus.documents(), &inputs.row_vocab, &inputs.col_vocab, window_size)?;
            let pmi = Pipeline::pmi(params, &counts);

            let on_counts = Similarity::new(counts.view(), &inputs.row_vocab)?.with_eps(params.cosine_eps);
            let on_pmi = Similarity::new(pmi.view(), &inputs.row_vocab)?.with_eps(params.cosine_eps);

            for (table, pairs) in &inputs.tables {
                for (kind, result) in [
                    (MatrixKind::Counts, evaluator.evaluate(pairs, &on_counts)?),
                    (MatrixKind::Pmi, evaluator.evaluate(pairs, &on_pmi)?),
                ] {
                    info!("window {}, {:?} vs {}: {}", window_size, kind, table, result);
                    rows.push(EvaluationRow { window_size, kind, table: table.to_owned(), result });
                }
            }
        }

        Ok(rows)
    }

    /// Nearest neighbors of every query in PMI space, one column per neighbor window.
    /// Both axes use the column vocabulary.
    pub fn neighbors(params: &Params, inputs: &Inputs) -> Result<Vec<NeighborComparison>> {

        let mut comparisons = Vec::new();
        if params.neighbor_queries.is_empty() {
            return Ok(comparisons);
        }

        // counts are dropped as soon as their pmi exists, only the pmi matrices are kept
        let mut pmis: Vec<(usize, PmiMatrix)> = Vec::with_capacity(params.neighbor_windows.len());
        for &window_size in &params.neighbor_windows {
            let counts = Pipeline::counts(params, inputs.corpus.documents(), &inputs.col_vocab, &inputs.col_vocab, window_size)?;
            pmis.push((window_size, Pipeline::pmi(params, &counts)));
        }

        let configs = pmis.iter()
            .map(|(window_size, pmi)| Ok((*window_size, Similarity::new(pmi.view(), &inputs.col_vocab)?.with_eps(params.cosine_eps))))
            .collect::<Result<Vec<(usize, Similarity<f32>)>>>()?;

        // row scoring is parallel, kept on a pool of the configured size
        let pool = ThreadPoolBuilder::new().num_threads(params.num_threads.max(1)).build()?;
        pool.install(|| {
            for query in &params.neighbor_queries {
                match NeighborComparison::compare(query, params.top_k, &configs) {
                    Ok(comparison) => comparisons.push(comparison),
                    Err(PmiError::UnknownWord(word)) if params.skip_unknown => warn!("skipping query '{}', not in the vocabulary", word),
                    Err(e) => return Err(e)
                }
            }
            Ok(())
        })?;

        Ok(comparisons)
    }

    pub fn print_report(rows: &[EvaluationRow]) {

        println!("{:>6}  {:<6}  {:<30}  {:>11}  {:>10}  {:>6}", "window", "matrix", "table", "correlation", "pvalue", "pairs");
        println!("{}", "-".repeat(6 + 6 + 30 + 11 + 10 + 6 + 10));
        for row in rows {
            let kind = match row.kind {
                MatrixKind::Counts => "C",
                MatrixKind::Pmi => "PMI",
            };
            let p_value = match row.result.p_value {
                Some(p) => format!("{:.3e}", p),
                None => "n/a".to_string()
            };
            println!("{:>6}  {:<6}  {:<30}  {:>11.4}  {:>10}  {:>6}",
                row.window_size, kind, row.table, row.result.correlation, p_value, row.result.n_pairs);
        }
    }

}
