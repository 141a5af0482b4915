use crate::error::{PmiError, Result};
use crate::vocab::Vocab;

use ndarray::{ArrayView1, ArrayView2, Axis, Zip};
use rayon::prelude::*;

/// Guards the cosine denominator against all-zero rows.
pub const COSINE_EPS: f64 = 1e-8;

/// `dot(x, y) / (|x| * |y| + eps)`, accumulated in f64.
///
/// A result that is not finite is replaced by 0.0: rows with no co-occurrences are
/// common and their similarity is simply treated as unrelated.
pub fn cosine_similarity<A>(x: ArrayView1<A>, y: ArrayView1<A>, eps: f64) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    if x.len() != y.len() {
        return Err(PmiError::ShapeMismatch { context: "cosine vector lengths", expected: x.len(), got: y.len() });
    }

    let mut dot = 0.0;
    let mut xx = 0.0;
    let mut yy = 0.0;
    Zip::from(&x).and(&y).for_each(|&a, &b| {
        let (a, b): (f64, f64) = (a.into(), b.into());
        dot += a * b;
        xx += a * a;
        yy += b * b;
    });

    let sim = dot / (xx.sqrt() * yy.sqrt() + eps);
    Ok(if sim.is_finite() { sim } else { 0.0 })
}

/// Read-only view of a word matrix (raw counts or PMI) and the vocabulary of its rows.
pub struct Similarity<'a, A> {
    w: ArrayView2<'a, A>,
    vocab: &'a Vocab,
    eps: f64,
}

impl<'a, A> Similarity<'a, A>
where
    A: Copy + Into<f64> + Send + Sync,
{

    pub fn new(w: ArrayView2<'a, A>, vocab: &'a Vocab) -> Result<Similarity<'a, A>> {

        if w.nrows() != vocab.len() {
            return Err(PmiError::ShapeMismatch { context: "matrix rows vs vocabulary", expected: vocab.len(), got: w.nrows() });
        }

        Ok(Self {
            w,
            vocab,
            eps: COSINE_EPS
        })
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn vocab(&self) -> &Vocab {
        self.vocab
    }

    pub fn extract_vec_from_word(&self, token: &str) -> Result<ArrayView1<'a, A>> {

        match self.vocab.get_id(token) {
            // moves a copy of the view, so the row borrows the matrix and not `self`
            Some(i) => Ok(self.w.clone().index_axis_move(Axis(0), i)),
            None => Err(PmiError::UnknownWord(token.to_owned()))
        }
    }

    pub fn similarity(&self, word1: &str, word2: &str) -> Result<f64> {
        let x = self.extract_vec_from_word(word1)?;
        let y = self.extract_vec_from_word(word2)?;
        cosine_similarity(x, y, self.eps)
    }

    pub fn rank_neighbors(&self, token: &str) -> Result<Vec<(String, f64)>> {

        // score every row against the query row, leaving out the query's own id only.
        // The parallel collect keeps vocabulary order, and the stable sort keeps it among ties.
        let query_i = self.vocab.get_id(token).ok_or_else(|| PmiError::UnknownWord(token.to_owned()))?;
        let query = self.w.row(query_i);

        let mut indexed_scores: Vec<(usize, f64)> = (0..self.w.nrows())
            .into_par_iter()
            .filter(|i| *i != query_i)
            .map(|i| Ok((i, cosine_similarity(query, self.w.row(i), self.eps)?)))
            .collect::<Result<Vec<(usize, f64)>>>()?;

        // sort by most similar in descending order
        indexed_scores.sort_by(|(_i, s), (_j, t)| t.total_cmp(s));

        let words = self.vocab.words();
        Ok(indexed_scores.into_iter().map(|(i, score)| (words[i].to_owned(), score)).collect())
    }

    pub fn find_k_most_similar(&self, token: &str, k: usize) -> Result<Vec<(String, f64)>> {
        let mut sim_tokens = self.rank_neighbors(token)?;
        sim_tokens.truncate(k);
        Ok(sim_tokens)
    }

}


#[cfg(test)]
mod tests {

    use super::{cosine_similarity, Similarity};
    use crate::error::PmiError;
    use crate::vocab::Vocab;
    use ndarray::{array, Array2, ArrayView1};

    #[test]
    fn cosine_properties() {

        let x = array![1.0f32, 2.0, 0.0, 3.0];
        let y = array![0.5f32, 0.0, 4.0, 1.0];

        let cos = |a: ArrayView1<f32>, b: ArrayView1<f32>, eps: f64| cosine_similarity(a, b, eps).unwrap();

        assert!((cos(x.view(), x.view(), 1e-8) - 1.0).abs() < 1e-6);
        assert_eq!(cos(x.view(), y.view(), 1e-8), cos(y.view(), x.view(), 1e-8));

        let orthogonal = array![0.0f32, 0.0, 1.0, 0.0];
        assert_eq!(cos(x.view(), orthogonal.view(), 1e-8), 0.0);

        let counts = array![2u32, 0, 2];
        let other = array![1u32, 1, 0];
        assert!((cosine_similarity(counts.view(), other.view(), 0.0).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let x = array![1.0f32, 2.0, 3.0];
        let y = array![1.0f32, 2.0];
        match cosine_similarity(x.view(), y.view(), 1e-8) {
            Err(PmiError::ShapeMismatch { expected: 3, got: 2, .. }) => {},
            other => panic!("expected a shape mismatch, got {:?}", other)
        }
    }

    #[test]
    fn degenerate_rows_score_zero() {

        let zeros = array![0.0f32, 0.0, 0.0];
        let x = array![1.0f32, 0.0, 0.0];
        assert_eq!(cosine_similarity(zeros.view(), zeros.view(), 1e-8).unwrap(), 0.0);
        assert_eq!(cosine_similarity(zeros.view(), x.view(), 1e-8).unwrap(), 0.0);

        // without the guard 0 / 0 is NaN, still reported as 0
        assert_eq!(cosine_similarity(zeros.view(), zeros.view(), 0.0).unwrap(), 0.0);

        let inf = array![f32::INFINITY, 0.0, 0.0];
        assert_eq!(cosine_similarity(inf.view(), x.view(), 1e-8).unwrap(), 0.0);
    }

    #[test]
    fn shape_is_checked() {
        let vocab = Vocab::build(["a", "b", "c"]);
        let w: Array2<f32> = Array2::zeros((2, 4));
        match Similarity::new(w.view(), &vocab) {
            Err(PmiError::ShapeMismatch { expected: 3, got: 2, .. }) => {},
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("expected a shape mismatch")
        }
    }

    #[test]
    fn unknown_words_are_surfaced() {
        let vocab = Vocab::build(["a", "b"]);
        let w = array![[1.0f32, 0.0], [0.0, 1.0]];
        let sim = Similarity::new(w.view(), &vocab).unwrap();

        match sim.similarity("a", "zebra") {
            Err(PmiError::UnknownWord(word)) => assert_eq!(word, "zebra"),
            other => panic!("expected UnknownWord, got {:?}", other)
        }
        assert!(sim.rank_neighbors("zebra").is_err());
        assert_eq!(sim.similarity("a", "b").unwrap(), 0.0);
    }

    #[test]
    fn extracted_rows_outlive_the_view() {
        let vocab = Vocab::build(["a", "b"]);
        let w = array![[1.0f32, 2.0], [3.0, 4.0]];
        let row = {
            let sim = Similarity::new(w.view(), &vocab).unwrap();
            sim.extract_vec_from_word("b").unwrap()
        };
        assert_eq!(row, array![3.0f32, 4.0]);
    }

    #[test]
    fn ranking_excludes_query_and_is_sorted() {

        let vocab = Vocab::build(["sun", "moon", "star", "car", "road"]);
        let w = array![
            [1.0f32, 1.0, 0.0],
            [1.0, 0.9, 0.0],
            [0.9, 1.0, 0.1],
            [0.0, 0.1, 1.0],
            [0.0, 0.0, 0.0]
        ];
        let sim = Similarity::new(w.view(), &vocab).unwrap();

        let ranking = sim.rank_neighbors("sun").unwrap();
        assert_eq!(ranking.len(), 4);
        assert!(ranking.iter().all(|(word, _)| word != "sun"));
        assert!(ranking.windows(2).all(|pair| pair[0].1 >= pair[1].1));
        assert_eq!(ranking[3], ("road".to_string(), 0.0));

        let top = sim.find_k_most_similar("sun", 2).unwrap();
        let top_words: Vec<&str> = top.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(top_words, vec!["moon", "star"]);

        assert_eq!(sim.find_k_most_similar("sun", 10).unwrap().len(), 4);
    }

    #[test]
    fn ties_keep_vocabulary_order() {

        let vocab = Vocab::build(["q", "d", "b", "c", "a"]);
        let w = array![
            [1.0f32, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 0.0],
            [0.0, 1.0]
        ];
        let sim = Similarity::new(w.view(), &vocab).unwrap();

        let words: Vec<String> = sim.rank_neighbors("q").unwrap().into_iter().map(|(w, _)| w).collect();
        assert_eq!(words, vec!["d", "c", "b", "a"]);
    }
}
