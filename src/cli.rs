use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "spike")]
#[command(author, version, about = "Telegram bot that saves tagged photos to Yandex.Disk", long_about = None)]
pub struct Cli {
    /// Path to the JSON config file
    #[arg(short, long)]
    pub config: PathBuf,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
