use anyhow::Result;
use clap::Parser;
use postgen_cli::{run, Args};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    run(args).await
}
