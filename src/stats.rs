// imports
use crate::error::{PmiError, Result};

use std::fmt::Display;
use ndarray::{Array2, ArrayView1};
use ndarray_stats::CorrelationExt;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Spearman rank correlation between human scores and computed similarities.
#[derive(Clone, Debug, PartialEq)]
pub struct SpearmanResult {
    pub correlation: f64,
    /// Two-sided, `None` when fewer than three pairs or the correlation is undefined.
    pub p_value: Option<f64>,
    pub n_pairs: usize,
    /// Pairs dropped because a word was out of vocabulary.
    pub skipped: usize,
}

impl Display for SpearmanResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.p_value {
            Some(p) => write!(f, "correlation={:.4}, pvalue={:.4e}, pairs={}", self.correlation, p, self.n_pairs)?,
            None => write!(f, "correlation={:.4}, pvalue=n/a, pairs={}", self.correlation, self.n_pairs)?,
        }
        if self.skipped > 0 {
            write!(f, ", skipped={}", self.skipped)?;
        }
        Ok(())
    }
}

/// 1-based ranks, tied values share the average of the ranks they span.
pub fn rank(values: &[f64]) -> Vec<f64> {

    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let average = (i + j) as f64 / 2.0 + 1.0;
        for k in &order[i..=j] {
            ranks[*k] = average;
        }
        i = j + 1;
    }
    ranks
}

fn two_sided_p_value(correlation: f64, n: usize) -> Result<Option<f64>> {

    if n < 3 || !correlation.is_finite() {
        return Ok(None);
    }

    // t = r * sqrt((n - 2) / (1 - r^2)) follows a Student t with n - 2 degrees of freedom
    let dof = (n - 2) as f64;
    let denominator = 1.0 - correlation * correlation;
    if denominator <= 0.0 {
        return Ok(Some(0.0));
    }
    let t = correlation * (dof / denominator).sqrt();
    let dist = StudentsT::new(0.0, 1.0, dof)?;
    Ok(Some((2.0 * dist.cdf(-t.abs())).min(1.0)))
}

pub fn spearman(x: &[f64], y: &[f64]) -> Result<(f64, Option<f64>)> {

    if x.len() != y.len() {
        return Err(PmiError::ShapeMismatch { context: "spearman samples", expected: x.len(), got: y.len() });
    }
    if x.is_empty() {
        return Err(PmiError::EmptyEvaluation);
    }

    // pearson correlation of the ranks, variables as rows and observations as columns
    let n = x.len();
    let mut ranks: Array2<f64> = Array2::zeros((2, n));
    ranks.row_mut(0).assign(&ArrayView1::from(&rank(x)[..]));
    ranks.row_mut(1).assign(&ArrayView1::from(&rank(y)[..]));

    let corr = ranks.pearson_correlation().map_err(|_| PmiError::EmptyEvaluation)?;
    let correlation = corr[[0, 1]].clamp(-1.0, 1.0);

    let p_value = two_sided_p_value(correlation, n)?;
    Ok((correlation, p_value))
}


#[cfg(test)]
mod tests {

    use super::{rank, spearman};

    #[test]
    fn ranks_average_ties() {
        assert_eq!(rank(&[30.0, 10.0, 20.0]), vec![3.0, 1.0, 2.0]);
        assert_eq!(rank(&[0.1, 0.1, 0.5, 0.9]), vec![1.5, 1.5, 3.0, 4.0]);
        assert_eq!(rank(&[2.0, 2.0, 2.0]), vec![2.0, 2.0, 2.0]);
        assert!(rank(&[]).is_empty());
    }

    #[test]
    fn same_order_is_perfect() {
        let (r, p) = spearman(&[1.0, 9.5], &[0.2, 0.7]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert_eq!(p, None);

        let (r, p) = spearman(&[1.0, 2.0, 3.0, 4.0], &[0.1, 0.4, 0.45, 0.9]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert!(p.unwrap() < 1e-6);

        let (r, _) = spearman(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn golden_correlation_and_p_value() {

        // sum of squared rank differences is 10, r = 1 - 6 * 10 / (5 * 24) = 0.5, t = 1 on 3 dof
        let (r, p) = spearman(&[1.0, 2.0, 3.0, 4.0, 5.0], &[1.0, 4.0, 2.0, 5.0, 3.0]).unwrap();
        assert!((r - 0.5).abs() < 1e-12);
        assert!((p.unwrap() - 0.391002).abs() < 1e-4);
    }

    #[test]
    fn ties_in_similarities() {
        let (r, _) = spearman(&[10.0, 20.0, 30.0, 40.0], &[0.1, 0.1, 0.5, 0.9]).unwrap();
        assert!((r - 0.948683).abs() < 1e-5);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(spearman(&[], &[]).is_err());
        assert!(spearman(&[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn constant_input_has_no_p_value() {
        let (r, p) = spearman(&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0]).unwrap();
        assert!(r.is_nan());
        assert_eq!(p, None);
    }
}
