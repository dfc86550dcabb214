use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};

use perturb_vae::candle_data_loader::InMemoryImages;
use perturb_vae::candle_inference::TrainConfig;
use perturb_vae::candle_model_traits::{IMAGE_CHANNELS, IMAGE_SIDE};
use perturb_vae::candle_vae_inference::{VaeTrainer, VaeTrainerT};
use perturb_vae::candle_vae_model::ConvPerturbVae;

#[test]
fn smoke_train_test() -> anyhow::Result<()> {
    let device = Device::Cpu;

    let variable_map = VarMap::new();
    let vs = VarBuilder::from_varmap(&variable_map, DType::F32, &device);
    let model = ConvPerturbVae::new(4, 16, vs)?;

    let images_nchw = Tensor::rand(
        0f32,
        1f32,
        (8, IMAGE_CHANNELS, IMAGE_SIDE, IMAGE_SIDE),
        &device,
    )?;
    let mut data = InMemoryImages::new(&images_nchw)?;

    let train_config = TrainConfig {
        learning_rate: 1e-3,
        batch_size: 4,
        num_epochs: 2,
        device: device.clone(),
        verbose: false,
        show_progress: false,
    };

    let mut trainer = VaeTrainer::build(&model, &variable_map);
    let loss_trace = trainer.train_vae(&mut data, &train_config)?;

    assert_eq!(loss_trace.len(), 2);
    assert!(loss_trace.iter().all(|l| l.is_finite()));
    Ok(())
}
