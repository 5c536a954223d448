use anyhow::Result;
use clap::Parser;

use colorboy::cli::Cli;
use colorboy::Config;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from(Cli::parse());
    colorboy::run(config)
}
