// imports
use crate::cooccurrence::CountMatrix;
use crate::error::PmiError;

use std::fmt::Display;
use std::str::FromStr;
use ndarray::{Array1, Array2, Axis, Zip};

pub type PmiMatrix = Array2<f32>;

/// Added to the product of marginals so an empty row or column never divides by zero.
pub const PMI_EPS: f64 = 1e-10;

/// How a cell is filled once its log ratio is known.
///
/// `ZeroFill` keeps negative associations and writes exactly 0 where the count is 0.
/// `Positive` additionally clamps every negative value to 0 (PPMI).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PmiConvention {
    #[default]
    ZeroFill,
    Positive,
}

impl FromStr for PmiConvention {
    type Err = PmiError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero_fill" => Ok(PmiConvention::ZeroFill),
            "positive" => Ok(PmiConvention::Positive),
            _ => Err(PmiError::Config(format!("unrecognized pmi convention {}", s)))
        }
    }
}

impl Display for PmiConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PmiConvention::ZeroFill => write!(f, "zero_fill"),
            PmiConvention::Positive => write!(f, "positive"),
        }
    }
}

pub struct Pmi {}

impl Pmi {

    fn marginals(counts: &CountMatrix) -> (Array1<u64>, Array1<u64>, u64) {
        let row_sums = counts.fold_axis(Axis(1), 0u64, |acc, &c| acc + c as u64);
        let col_sums = counts.fold_axis(Axis(0), 0u64, |acc, &c| acc + c as u64);
        let total = row_sums.sum();
        (row_sums, col_sums, total)
    }

    pub fn transform(counts: &CountMatrix, eps: f64, convention: PmiConvention) -> PmiMatrix {
        Pmi::transform_with_progress(counts, eps, convention, None)
    }

    pub fn transform_with_progress(counts: &CountMatrix,
        eps: f64,
        convention: PmiConvention,
        mut progress: Option<&mut dyn FnMut(usize, usize)>) -> PmiMatrix {

        // pmi[i, j] = ln(count[i, j] * total / (row_sum[i] * col_sum[j] + eps)) where count > 0,
        // cells with no count stay at 0. `progress` is told (rows done, rows total) after each row.
        let (row_sums, col_sums, total) = Pmi::marginals(counts);
        let total = total as f64;
        let n_rows = counts.nrows();

        let mut pmi: PmiMatrix = Array2::zeros(counts.raw_dim());
        for (i, (mut pmi_row, count_row)) in pmi.outer_iter_mut().zip(counts.outer_iter()).enumerate() {

            let row_sum = row_sums[i] as f64;
            Zip::from(&mut pmi_row).and(&count_row).and(&col_sums).for_each(|p, &c, &col_sum| {
                if c > 0 {
                    let value = ((c as f64 * total) / (row_sum * col_sum as f64 + eps)).ln();
                    *p = match convention {
                        PmiConvention::ZeroFill => value,
                        PmiConvention::Positive => value.max(0.0),
                    } as f32;
                }
            });

            if let Some(report) = progress.as_deref_mut() {
                report(i + 1, n_rows);
            }
        }

        pmi
    }
}
