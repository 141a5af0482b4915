

use crate::error::{PmiError, Result};
use crate::pmi::{PmiConvention, PMI_EPS};
use crate::similarity::COSINE_EPS;

use serde_json::Value;
use std::{fs, fmt::Display};

#[derive(Clone, Debug)]
pub struct Params {
    pub corpus_file: String,
    pub row_vocab_file: Option<String>,
    pub col_vocab_file: Option<String>,
    pub vocab_size: usize,
    pub eval_files: Vec<String>,
    pub window_sizes: Vec<usize>,
    pub neighbor_queries: Vec<String>,
    pub neighbor_windows: Vec<usize>,
    pub top_k: usize,
    pub seed: u64,
    pub sample_fraction: f64,
    pub num_threads: usize,
    pub pmi_eps: f64,
    pub cosine_eps: f64,
    pub pmi_convention: PmiConvention,
    pub skip_unknown: bool,
    pub progress_verbose: bool,
}


impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using parameters:
        corpus_file: {}
        row_vocab_file: {:?}
        col_vocab_file: {:?}
        vocab_size: {}
        eval_files: {:?}
        window_sizes: {:?}
        neighbor_queries: {:?}
        neighbor_windows: {:?}
        top_k: {}
        seed: {}
        sample_fraction: {}
        num_threads: {}
        pmi_eps: {:e}
        cosine_eps: {:e}
        pmi_convention: {}
        skip_unknown: {}
        progress_verbose: {}",
        self.corpus_file, self.row_vocab_file, self.col_vocab_file, self.vocab_size, self.eval_files,
        self.window_sizes, self.neighbor_queries, self.neighbor_windows, self.top_k, self.seed,
        self.sample_fraction, self.num_threads, self.pmi_eps, self.cosine_eps, self.pmi_convention,
        self.skip_unknown, self.progress_verbose
        )
    }
}

pub struct Config {
    params: Params
}

fn get_usize(json: &Value, key: &str, default: usize) -> Result<usize> {
    match json.get(key) {
        Some(value) => value.as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| PmiError::Config(format!("given {} is not a non negative integer", key))),
        None => Ok(default)
    }
}

fn get_f64(json: &Value, key: &str, default: f64) -> Result<f64> {
    match json.get(key) {
        Some(value) => value.as_f64().ok_or_else(|| PmiError::Config(format!("given {} is not numeric", key))),
        None => Ok(default)
    }
}

fn get_bool(json: &Value, key: &str, default: bool) -> Result<bool> {
    match json.get(key) {
        Some(value) => value.as_bool().ok_or_else(|| PmiError::Config(format!("given {} is not boolean", key))),
        None => Ok(default)
    }
}

fn get_opt_str(json: &Value, key: &str) -> Result<Option<String>> {
    match json.get(key) {
        Some(value) => value.as_str()
            .map(|s| Some(s.to_owned()))
            .ok_or_else(|| PmiError::Config(format!("cannot cast {} to string", key))),
        None => Ok(None)
    }
}

fn get_list<T, F>(json: &Value, key: &str, default: Vec<T>, cast: F) -> Result<Vec<T>>
where
    F: Fn(&Value) -> Option<T>,
{
    match json.get(key) {
        Some(Value::Array(values)) => values.iter()
            .map(|v| cast(v).ok_or_else(|| PmiError::Config(format!("unexpected element {} in {}", v, key))))
            .collect(),
        Some(_) => Err(PmiError::Config(format!("given {} is not a list", key))),
        None => Ok(default)
    }
}

impl Config {

    pub fn get_params(&self) -> Params {
        self.params.clone()
    }

    pub fn new(args: &[String]) -> Result<Config> {

        if args.len() != 2 {
            return Err(PmiError::Config("input should be a path to json file only".to_string()));
        }

        // parse input json
        let f = fs::File::open(&args[1])?;
        let json: Value = serde_json::from_reader(f)?;
        Config::from_json(&json)
    }

    pub fn from_json(json: &Value) -> Result<Config> {

        // validate required input in json
        let corpus_file = get_opt_str(json, "corpus_file")?
            .ok_or_else(|| PmiError::Config("corpus_file was not supplied through json".to_string()))?;

        // handle default vs input parameters
        let pmi_convention = match get_opt_str(json, "pmi_convention")? {
            Some(convention) => convention.parse::<PmiConvention>()?,
            None => PmiConvention::default()
        };

        let params = Params {
            corpus_file,
            row_vocab_file: get_opt_str(json, "row_vocab_file")?,
            col_vocab_file: get_opt_str(json, "col_vocab_file")?,
            vocab_size: get_usize(json, "vocab_size", 25000)?,
            eval_files: get_list(json, "eval_files", Vec::new(), |v| v.as_str().map(str::to_owned))?,
            window_sizes: get_list(json, "window_sizes", vec![1, 3, 6], |v| v.as_u64().map(|w| w as usize))?,
            neighbor_queries: get_list(json, "neighbor_queries", Vec::new(), |v| v.as_str().map(str::to_owned))?,
            neighbor_windows: get_list(json, "neighbor_windows", vec![1, 6], |v| v.as_u64().map(|w| w as usize))?,
            top_k: get_usize(json, "top_k", 10)?,
            seed: get_usize(json, "seed", 9608)? as u64,
            sample_fraction: get_f64(json, "sample_fraction", 1.0)?,
            num_threads: get_usize(json, "num_threads", 4)?,
            pmi_eps: get_f64(json, "pmi_eps", PMI_EPS)?,
            cosine_eps: get_f64(json, "cosine_eps", COSINE_EPS)?,
            pmi_convention,
            skip_unknown: get_bool(json, "skip_unknown", false)?,
            progress_verbose: get_bool(json, "progress_verbose", false)?,
        };

        if let Some(w) = params.window_sizes.iter().chain(params.neighbor_windows.iter()).find(|w| **w == 0) {
            return Err(PmiError::InvalidWindow(*w));
        }
        if !(params.sample_fraction > 0.0 && params.sample_fraction <= 1.0) {
            return Err(PmiError::InvalidFraction(params.sample_fraction));
        }

        Ok(Self { params })
    }

}


pub mod files_handling {

    use crate::corpus::Corpus;
    use crate::error::{PmiError, Result};
    use crate::evaluation::EvalPair;

    use std::fs::File;
    use std::io::{BufRead, BufReader};
    use tracing::debug;

    pub fn read_input<R: ReadFile>(file_path: &str) -> Result<R> {
        R::read_file(file_path)
    }

    pub trait ReadFile: Sized {
        fn read_file(file_path: &str) -> Result<Self>;

        fn read_from<B: BufRead>(reader: B) -> Result<Self>;
    }

    fn open(file_path: &str) -> Result<BufReader<File>> {
        Ok(BufReader::new(File::open(file_path)?))
    }

    impl ReadFile for Corpus {
        // one document per line, kept as is
        fn read_file(file_path: &str) -> Result<Self> {
            Corpus::read_from(open(file_path)?)
        }

        fn read_from<B: BufRead>(reader: B) -> Result<Self> {
            let documents = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
            Ok(Corpus::new(documents))
        }
    }

    impl ReadFile for Vec<String> {
        // one word per line, line order is the vocabulary order
        fn read_file(file_path: &str) -> Result<Self> {
            Vec::<String>::read_from(open(file_path)?)
        }

        fn read_from<B: BufRead>(reader: B) -> Result<Self> {
            let mut words = Vec::new();
            for line in reader.lines() {
                let line = line?;
                let word = line.trim();
                if !word.is_empty() {
                    words.push(word.to_owned());
                }
            }
            Ok(words)
        }
    }

    impl ReadFile for Vec<EvalPair> {
        // tab separated word1, word2, score. A first non blank line without a numeric score is a header.
        fn read_file(file_path: &str) -> Result<Self> {
            Vec::<EvalPair>::read_from(open(file_path)?)
        }

        fn read_from<B: BufRead>(reader: B) -> Result<Self> {

            let mut pairs = Vec::new();
            let mut first = true;
            for (k, line) in reader.lines().enumerate() {

                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let is_first = std::mem::replace(&mut first, false);

                let cols: Vec<&str> = line.split('\t').map(str::trim).collect();
                if cols.len() < 3 {
                    return Err(PmiError::Parse {
                        line: k + 1,
                        message: format!("expected at least 3 tab separated columns, found {}", cols.len())
                    });
                }

                match cols[2].parse::<f64>() {
                    Ok(score) if score.is_finite() => pairs.push(EvalPair::new(cols[0], cols[1], score)),
                    Ok(score) => return Err(PmiError::Parse { line: k + 1, message: format!("score {} is not finite", score) }),
                    Err(_) if is_first => debug!("skipping header {:?}", cols),
                    Err(e) => return Err(PmiError::Parse { line: k + 1, message: format!("bad score '{}': {}", cols[2], e) })
                }
            }
            Ok(pairs)
        }
    }
}
