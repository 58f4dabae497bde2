use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    /// Overwritten on every run
    #[clap(long, default_value = "image.png", env = "CHART_OUTPUT")]
    pub output: PathBuf,
}
