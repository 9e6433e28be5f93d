use anyhow::{Context, Result};
use clap::Parser;
use dataset_prep::Config;
use std::path::PathBuf;

/// Split an object-detection corpus into train/val/test subsets, optionally
/// augmenting it with blurred and rotated variants first.
#[derive(Debug, Clone, Parser)]
struct Args {
    #[clap(long, default_value = "prep.json5")]
    /// configuration file
    pub config_file: PathBuf,
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let Args { config_file } = Args::parse();
    let config = Config::open(&config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;

    dataset_prep::start(&config)
}
