#![allow(dead_code)]

use crate::candle_data_loader::*;
use crate::candle_inference::TrainConfig;
use crate::candle_model_traits::{DecoderModuleT, EncoderModuleT};
use crate::candle_vae_model::PerturbVae;

use candle_nn::AdamW;
use candle_nn::Optimizer;
use indicatif::{ProgressBar, ProgressDrawTarget};
use log::info;

pub struct VaeTrainer<'a, Enc, Dec>
where
    Enc: EncoderModuleT,
    Dec: DecoderModuleT,
{
    pub model: &'a PerturbVae<Enc, Dec>,
    pub variable_map: &'a candle_nn::VarMap,
}

pub trait VaeTrainerT<'a, Enc, Dec>
where
    Enc: EncoderModuleT,
    Dec: DecoderModuleT,
{
    /// Train the VAE model by minibatch gradient descent
    /// * `data` - data loader with `minibatch_data`
    /// * `train_config` - training configuration
    fn train_vae<DataL>(
        &mut self,
        data: &mut DataL,
        train_config: &TrainConfig,
    ) -> anyhow::Result<Vec<f32>>
    where
        DataL: DataLoader;

    /// Wrap a model and its variable map for training
    /// * `model` - encoder/decoder pair
    /// * `variable_map` - the variables the optimizer updates
    fn build(model: &'a PerturbVae<Enc, Dec>, variable_map: &'a candle_nn::VarMap) -> Self;
}

impl<'a, Enc, Dec> VaeTrainerT<'a, Enc, Dec> for VaeTrainer<'a, Enc, Dec>
where
    Enc: EncoderModuleT,
    Dec: DecoderModuleT,
{
    fn train_vae<DataL>(
        &mut self,
        data: &mut DataL,
        train_config: &TrainConfig,
    ) -> anyhow::Result<Vec<f32>>
    where
        DataL: DataLoader,
    {
        let device = &train_config.device;
        let mut adam = AdamW::new_lr(
            self.variable_map.all_vars(),
            train_config.learning_rate.into(),
        )?;

        let pb = ProgressBar::new(train_config.num_epochs as u64);

        if !train_config.show_progress || train_config.verbose {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        let mut loss_trace = vec![];

        data.shuffle_minibatch(train_config.batch_size)?;

        let num_minibatches = data.num_minibatch();

        let minibatch_vec = (0..num_minibatches)
            .map(|b| {
                data.minibatch_data(b, device)
                    .unwrap_or_else(|_| panic!("failed to preload minibatch #{}", b))
            })
            .collect::<Vec<_>>();

        for _epoch in 0..train_config.num_epochs {
            let mut loss_tot = 0f32;

            for x_nchw in minibatch_vec.iter() {
                let (_recon_nchw, loss) = self.model.forward_t(x_nchw, true, true, false)?;
                let loss = loss.ok_or(anyhow::anyhow!("loss required"))?;
                adam.backward_step(&loss)?;
                loss_tot += loss.to_scalar::<f32>()?;
            }
            loss_trace.push(loss_tot / num_minibatches as f32);
            pb.inc(1);

            if train_config.verbose {
                info!(
                    "[{}] loss: {}",
                    _epoch + 1,
                    loss_trace.last().ok_or(anyhow::anyhow!("loss"))?
                );
            }
        } // each epoch

        pb.finish_and_clear();
        Ok(loss_trace)
    }

    fn build(model: &'a PerturbVae<Enc, Dec>, variable_map: &'a candle_nn::VarMap) -> Self {
        Self {
            model,
            variable_map,
        }
    }
}
