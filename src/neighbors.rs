use crate::error::Result;
use crate::similarity::Similarity;

use std::fmt::Display;

/// Top-k neighbors of one query word under several window configurations.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborComparison {
    pub query: String,
    pub k: usize,
    /// (window size, ranked neighbors), in the order the configurations were given.
    pub columns: Vec<(usize, Vec<(String, f64)>)>,
}

impl NeighborComparison {

    pub fn compare<A>(query: &str, k: usize, configs: &[(usize, Similarity<A>)]) -> Result<NeighborComparison>
    where
        A: Copy + Into<f64> + Send + Sync,
    {
        let mut columns = Vec::with_capacity(configs.len());
        for (window_size, similarity) in configs {
            columns.push((*window_size, similarity.find_k_most_similar(query, k)?));
        }

        Ok(NeighborComparison {
            query: query.to_owned(),
            k,
            columns
        })
    }
}

impl Display for NeighborComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {

        const CELL: usize = 30;

        writeln!(f, "{} nearest neighbors of '{}'", self.k, self.query)?;
        write!(f, "{:>4}", "rank")?;
        for (window_size, _) in &self.columns {
            write!(f, "  {:<width$}", format!("window={}", window_size), width = CELL)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(4 + self.columns.len() * (CELL + 2)))?;

        let rows = self.columns.iter().map(|(_, ranked)| ranked.len()).max().unwrap_or(0);
        for i in 0..rows {
            write!(f, "{:>4}", i + 1)?;
            for (_, ranked) in &self.columns {
                let cell = match ranked.get(i) {
                    Some((word, score)) => format!("{} ({:.4})", word, score),
                    None => String::new()
                };
                write!(f, "  {:<width$}", cell, width = CELL)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
