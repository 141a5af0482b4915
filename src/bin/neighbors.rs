use std::{error::Error, env};
use pmi_similarity::{files_handling::read_input, Config, Inputs, Pipeline};
use serde_json::json;
use tracing_subscriber::EnvFilter;


// side by side nearest neighbors of query words in pmi space under two window sizes.
// treated as binary executable so it can be ran independently from main

fn main() -> Result<(), Box<dyn Error>> {

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pmi_similarity=info".parse()?))
        .init();

    // arguments to this executable should be:
    // path to corpus (one document per line)
    // path to vocabulary (one word per line), used for both rows and columns
    // path to queries (one word per line)
    // two window sizes, and optionally k
    // example: ... wiki-1percent.txt vocab-25k.txt queries.txt 1 6 10
    let args: Vec<String> = env::args().collect();
    if args.len() != 6 && args.len() != 7 {
        return Err("usage: neighbors <corpus> <vocab> <queries> <window_a> <window_b> [k]".into());
    }

    let queries = read_input::<Vec<String>>(&args[3])?;
    let window_a: usize = args[4].parse()?;
    let window_b: usize = args[5].parse()?;
    let k: usize = match args.get(6) {
        Some(k) => k.parse()?,
        None => 10
    };

    let params = Config::from_json(&json!({
        "corpus_file": args[1],
        "col_vocab_file": args[2],
        "neighbor_queries": queries,
        "neighbor_windows": [window_a, window_b],
        "top_k": k
    }))?.get_params();

    let inputs = Inputs::load(&params)?;
    for comparison in Pipeline::neighbors(&params, &inputs)? {
        println!("{}\n", comparison);
    }

    Ok(())
}
