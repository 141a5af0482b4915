use pmi_similarity::Pipeline;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pmi_similarity=info".parse()?))
        .init();

    Pipeline::run()
}
