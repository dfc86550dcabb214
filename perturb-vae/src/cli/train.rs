use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use clap::Args;
use log::info;

use crate::candle_data_loader::InMemoryImages;
use crate::candle_inference::TrainConfig;
use crate::candle_model_traits::{IMAGE_CHANNELS, IMAGE_SIDE};
use crate::candle_vae_inference::{VaeTrainer, VaeTrainerT};
use crate::candle_vae_model::ConvPerturbVae;

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Latent dimensionality
    #[arg(long, default_value_t = 16)]
    z_dim: usize,

    /// Fully-connected bottleneck width
    #[arg(long, default_value_t = 512)]
    feat_dim: usize,

    /// Number of synthetic training images
    #[arg(long, default_value_t = 256)]
    num_samples: usize,

    /// Minibatch size
    #[arg(long, default_value_t = 64)]
    batch_size: usize,

    /// Number of training epochs
    #[arg(long, default_value_t = 10)]
    num_epochs: usize,

    /// AdamW learning rate
    #[arg(long, default_value_t = 1e-3)]
    learning_rate: f32,

    /// Report the loss after every epoch
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

/// Smoke-train the model on uniform random images. There is no real
/// dataset behind this command; it exercises the full encode, sample,
/// decode, loss, and update cycle end to end.
pub fn run(args: &TrainArgs) -> Result<()> {
    let device = Device::Cpu;

    info!("z_dim: {}, feat_dim: {}", args.z_dim, args.feat_dim);

    let variable_map = VarMap::new();
    let vs = VarBuilder::from_varmap(&variable_map, DType::F32, &device);
    let model = ConvPerturbVae::new(args.z_dim, args.feat_dim, vs)?;

    let images_nchw = Tensor::rand(
        0f32,
        1f32,
        (args.num_samples, IMAGE_CHANNELS, IMAGE_SIDE, IMAGE_SIDE),
        &device,
    )?;
    let mut data = InMemoryImages::new(&images_nchw)?;

    let train_config = TrainConfig {
        learning_rate: args.learning_rate,
        batch_size: args.batch_size,
        num_epochs: args.num_epochs,
        device: device.clone(),
        verbose: args.verbose,
        show_progress: true,
    };

    let mut trainer = VaeTrainer::build(&model, &variable_map);
    let loss_trace = trainer.train_vae(&mut data, &train_config)?;

    if let (Some(first), Some(last)) = (loss_trace.first(), loss_trace.last()) {
        info!("loss: {} -> {}", first, last);
    }

    Ok(())
}
