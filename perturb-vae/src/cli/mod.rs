pub mod train;

use clap::{Parser, Subcommand};

pub use train::TrainArgs;

#[derive(Parser)]
#[command(name = "perturb-vae")]
#[command(about = "Convolutional perturbation VAE for small RGB images")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the VAE on synthetic image batches
    Train(TrainArgs),
}
