use anyhow::Context;
use clap::Parser;
use exposure_bias::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).context("exposure-bias failed")
}
