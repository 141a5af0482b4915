// imports
use crate::error::{PmiError, Result};
use crate::vocab::Vocab;

use std::ops::Range;
use ndarray::{Array2, ArrayViewMut2, Axis};
use rayon::{prelude::*, ThreadPoolBuilder};
use tracing::{debug, info};

/// Rows follow the row vocabulary, columns the column vocabulary.
pub type CountMatrix = Array2<u32>;

/// Row id and column id of one padded position.
type Ids = (Option<usize>, Option<usize>);

pub const START_TOKEN: &str = "<s>";
pub const END_TOKEN: &str = "</s>";

pub struct Counts {}

impl Counts {

    fn parse_line(line: &str, window_size: usize) -> Vec<&str> {

        // pad both ends with `window_size` boundary tokens, so every offset
        // within the window of a real token falls inside the sequence.
        let tokens = Counts::tokenize(line);
        let mut padded = Vec::with_capacity(tokens.len() + 2 * window_size);
        padded.extend(std::iter::repeat(START_TOKEN).take(window_size));
        padded.extend(tokens);
        padded.extend(std::iter::repeat(END_TOKEN).take(window_size));
        padded
    }

    fn resolve(documents: &[String], row_vocab: &Vocab, col_vocab: &Vocab, window_size: usize) -> Vec<Vec<Ids>> {

        // each document is padded and looked up once, every worker then reads the same ids
        documents.iter()
            .map(|document| {
                Counts::parse_line(document, window_size).into_iter()
                    .map(|token| (row_vocab.get_id(token), col_vocab.get_id(token)))
                    .collect()
            })
            .collect()
    }

    fn count(window_size: usize,
        sequences: &[Vec<Ids>],
        block: &mut ArrayViewMut2<u32>,
        slice: &Range<usize>,
        thread_i: Option<usize>,
        progress_verbose: bool) {

            // counts the context tokens around every center token whose row id lies in `slice`.
            // `block` holds only the rows of `slice`, so row `r` of the full matrix is row
            // `r - slice.start` here. Offsets run 1..=window_size on each side, the center
            // position never counts itself.
            let n_docs = sequences.len();
            for (k, sequence) in sequences.iter().enumerate() {

                if progress_verbose && k % 200000 == 0 {
                    debug!(thread = ?thread_i, "counted {:.1}% of documents", 100.0 * (k as f32 / n_docs as f32));
                }

                for i in window_size..sequence.len() - window_size {

                    let token_i = match sequence[i].0 {
                        Some(token_i) if slice.contains(&token_i) => token_i - slice.start,
                        Some(_token_i) => continue,
                        None => continue
                    };

                    for distance in 1..=window_size {
                        for j in [i - distance, i + distance] {
                            if let Some(context_j) = sequence[j].1 {
                                block[[token_i, context_j]] += 1;
                            }
                        }
                    }
                }
            }
    }

    fn check_window(window_size: usize) -> Result<()> {
        if window_size == 0 {
            return Err(PmiError::InvalidWindow(window_size));
        }
        Ok(())
    }

    pub fn build(documents: &[String], row_vocab: &Vocab, col_vocab: &Vocab, window_size: usize) -> Result<CountMatrix> {

        Counts::check_window(window_size)?;

        let mut counts: CountMatrix = Array2::zeros((row_vocab.len(), col_vocab.len()));
        let sequences = Counts::resolve(documents, row_vocab, col_vocab, window_size);
        let slice = 0..row_vocab.len();
        Counts::count(window_size, &sequences, &mut counts.view_mut(), &slice, None, false);

        Ok(counts)
    }

    pub fn build_parallel(documents: &[String],
        row_vocab: &Vocab,
        col_vocab: &Vocab,
        window_size: usize,
        num_threads: usize,
        progress_verbose: bool) -> Result<CountMatrix> {

        // the row range is cut in contiguous slices, one per worker. Every worker scans the
        // resolved corpus but only writes the rows of its own slice, which is a disjoint block
        // of the output matrix, so no cell is shared between threads.
        Counts::check_window(window_size)?;

        let num_threads = num_threads.max(1);
        let mut counts: CountMatrix = Array2::zeros((row_vocab.len(), col_vocab.len()));
        if row_vocab.is_empty() {
            return Ok(counts);
        }

        let in_parts_size = (row_vocab.len() + num_threads - 1) / num_threads;
        let mut blocks: Vec<ArrayViewMut2<u32>> = counts.axis_chunks_iter_mut(Axis(0), in_parts_size).collect();

        let pool = ThreadPoolBuilder::new().num_threads(num_threads).build()?;
        let sequences = Counts::resolve(documents, row_vocab, col_vocab, window_size);
        info!("counting {} row tokens in {} slices of up to {}", row_vocab.len(), blocks.len(), in_parts_size);

        pool.install(|| {
            blocks.par_iter_mut().enumerate().for_each(|(thread_i, block)| {
                let start = thread_i * in_parts_size;
                let slice = start..start + block.nrows();
                debug!("thread {}, working on vocab slice {:?}", thread_i, slice);
                Counts::count(window_size, &sequences, block, &slice, Some(thread_i), progress_verbose);
            });
        });
        drop(blocks);

        Ok(counts)
    }

}


// defines the behavior needed for tokenizing a corpus
pub trait Tokenizer {
    fn tokenize(sequence: &str) -> Vec<&str>;
}

impl Tokenizer for Counts {
    // split on runs of whitespace, never yields empty tokens
    fn tokenize(sequence: &str) -> Vec<&str> {
        sequence.split_whitespace().collect()
    }
}


#[cfg(test)]
mod tests {

    use super::{Counts, Tokenizer, END_TOKEN, START_TOKEN};
    use crate::error::PmiError;
    use crate::vocab::Vocab;
    use ndarray::{array, Axis};

    fn docs(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn adjacent_pairs_across_documents() {

        let row_vocab = Vocab::build(["a", "b"]);
        let col_vocab = Vocab::build(["a", "b", "c"]);
        let documents = docs(&["a b c", "b a"]);

        let counts = Counts::build(&documents, &row_vocab, &col_vocab, 1).unwrap();

        assert_eq!(counts.dim(), (2, 3));
        assert_eq!(counts[[0, 1]], 2); // b next to a, once per document
        assert_eq!(counts[[0, 2]], 0); // c is two tokens away from a
        assert_eq!(counts[[1, 0]], 2);
        assert_eq!(counts[[1, 2]], 1);
        assert_eq!(counts[[0, 0]], 0);
        assert_eq!(counts[[1, 1]], 0);
    }

    #[test]
    fn cooc_golden() {

        // hand counted with window 2 over "a b a c"
        let vocab = Vocab::build(["a", "b", "c"]);
        let documents = docs(&["a b a c"]);

        let counts = Counts::build(&documents, &vocab, &vocab, 2).unwrap();
        let golden = array![
            [2, 2, 1],
            [2, 0, 1],
            [1, 1, 0]
        ];
        assert_eq!(counts, golden);

        // same vocabulary on both axes gives a symmetric matrix
        assert_eq!(counts, counts.t());

        // a row sum is the number of in-window neighbours of that word
        assert_eq!(counts.sum_axis(Axis(1)), array![5, 3, 2]);
    }

    #[test]
    fn center_never_counts_itself() {
        let vocab = Vocab::build(["x"]);
        let counts = Counts::build(&docs(&["x"]), &vocab, &vocab, 3).unwrap();
        assert_eq!(counts[[0, 0]], 0);

        let counts = Counts::build(&docs(&["x x"]), &vocab, &vocab, 3).unwrap();
        assert_eq!(counts[[0, 0]], 2);
    }

    #[test]
    fn short_documents_and_unknown_tokens() {

        let row_vocab = Vocab::build(["cat"]);
        let col_vocab = Vocab::build(["cat", "mat"]);
        let documents = docs(&["", "cat", "the cat sat on the mat", "mat"]);

        let counts = Counts::build(&documents, &row_vocab, &col_vocab, 6).unwrap();
        assert_eq!(counts, array![[0, 1]]);
    }

    #[test]
    fn boundary_tokens_count_only_when_in_vocab() {

        let row_vocab = Vocab::build(["a"]);
        let col_vocab = Vocab::build([START_TOKEN, END_TOKEN]);

        // window 2 pads two start and two end tokens around "a"
        let counts = Counts::build(&docs(&["a"]), &row_vocab, &col_vocab, 2).unwrap();
        assert_eq!(counts, array![[2, 2]]);

        let counts = Counts::build(&docs(&["a z"]), &row_vocab, &col_vocab, 2).unwrap();
        assert_eq!(counts, array![[2, 1]]);
    }

    #[test]
    fn documents_resolve_to_padded_ids() {

        let row_vocab = Vocab::build(["b"]);
        let col_vocab = Vocab::build(["a", "b", END_TOKEN]);
        let sequences = Counts::resolve(&docs(&["a b z", ""]), &row_vocab, &col_vocab, 1);

        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0], vec![
            (None, None),
            (None, Some(0)),
            (Some(0), Some(1)),
            (None, None),
            (None, Some(2)),
        ]);
        assert_eq!(sequences[1], vec![(None, None), (None, Some(2))]);
    }

    #[test]
    fn zero_window_is_rejected() {
        let vocab = Vocab::build(["a"]);
        match Counts::build(&docs(&["a a"]), &vocab, &vocab, 0) {
            Err(PmiError::InvalidWindow(0)) => {},
            other => panic!("expected InvalidWindow, got {:?}", other)
        }
    }

    #[test]
    fn parallel_matches_sequential() {

        let documents = docs(&[
            "what you say makes a lot of sense to me , you are right",
            "are you playing basketball just for fun or are you a pro ?",
            "you  are   right",
        ]);
        let col_vocab = Vocab::most_frequent(&documents, 100);
        let row_vocab = Vocab::build(["you", "are", "a", "pro", "missing", "right", "fun"]);

        for window_size in [1, 3, 6] {
            let sequential = Counts::build(&documents, &row_vocab, &col_vocab, window_size).unwrap();
            for num_threads in [1, 2, 3, 8] {
                let parallel = Counts::build_parallel(&documents, &row_vocab, &col_vocab, window_size, num_threads, false).unwrap();
                assert_eq!(parallel, sequential);
            }
        }
    }

    #[test]
    fn parallel_with_empty_rows() {
        let col_vocab = Vocab::build(["a"]);
        let counts = Counts::build_parallel(&docs(&["a a"]), &Vocab::default(), &col_vocab, 2, 4, false).unwrap();
        assert_eq!(counts.dim(), (0, 1));
    }

    #[test]
    fn tokenize_splits_on_whitespace() {
        assert_eq!(Counts::tokenize("  a\tb  c \n"), vec!["a", "b", "c"]);
        assert!(Counts::tokenize("   ").is_empty());
    }
}
