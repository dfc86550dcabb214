use anyhow::Result;
use clap::Parser;
use perturb_vae::cli::{train, Cli, Commands};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Train(args) => {
            train::run(args)?;
        }
    }

    Ok(())
}
