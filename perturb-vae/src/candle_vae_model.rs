#![allow(dead_code)]

use crate::candle_decoder_conv::ConvDecoder;
use crate::candle_encoder_conv::ConvEncoder;
use crate::candle_loss_functions::{gaussian_kl_loss, sum_squared_error};
use crate::candle_model_traits::*;
use candle_core::{Result, Tensor};
use candle_nn::VarBuilder;

/// A perturbation VAE: the decoder emits a residual image in (0,1) and
/// the reconstruction is `x + residual` rather than a direct decoding.
pub struct PerturbVae<Enc, Dec>
where
    Enc: EncoderModuleT,
    Dec: DecoderModuleT,
{
    pub encoder: Enc,
    pub decoder: Dec,
}

/// The standard convolutional pair for 3 x 32 x 32 images
pub type ConvPerturbVae = PerturbVae<ConvEncoder, ConvDecoder>;

impl ConvPerturbVae {
    /// Build the convolutional encoder/decoder pair sharing one variable
    /// builder, under the `nn.enc.*` and `nn.dec.*` prefixes
    ///
    /// # Arguments
    /// * `z_dim` - latent dimensionality
    /// * `feat_dim` - fully-connected bottleneck width
    /// * `vs` - variable builder
    pub fn new(z_dim: usize, feat_dim: usize, vs: VarBuilder) -> Result<Self> {
        let encoder = ConvEncoder::new(z_dim, feat_dim, vs.clone())?;
        let decoder = ConvDecoder::new(z_dim, feat_dim, vs)?;
        Ok(Self::build(encoder, decoder))
    }
}

impl<Enc, Dec> PerturbVae<Enc, Dec>
where
    Enc: EncoderModuleT,
    Dec: DecoderModuleT,
{
    /// Pair an encoder with a decoder
    pub fn build(encoder: Enc, decoder: Dec) -> Self {
        assert_eq!(encoder.dim_latent(), decoder.dim_latent());
        Self { encoder, decoder }
    }

    pub fn dim_latent(&self) -> usize {
        self.encoder.dim_latent()
    }

    /// Latent Gaussian parameters `(z_mean_nk, z_lnvar_nk)` of the
    /// approximate posterior
    pub fn encode_t(&self, x_nchw: &Tensor, train: bool) -> Result<(Tensor, Tensor)> {
        self.encoder.forward_t(x_nchw, train)
    }

    /// Residual image in (0,1)
    pub fn decode_t(&self, z_nk: &Tensor, train: bool) -> Result<Tensor> {
        self.decoder.forward_t(z_nk, train)
    }

    ///
    /// z = mu + sigma * eps
    /// where eps ~ N(0, 1)
    ///
    /// A fresh eps is drawn on every call; sampling is not gated on the
    /// training flag.
    ///
    /// # Arguments
    /// * `z_mean` - mean of Gaussian distribution
    /// * `z_lnvar` - log variance of Gaussian distribution
    pub fn reparameterize(&self, z_mean: &Tensor, z_lnvar: &Tensor) -> Result<Tensor> {
        let eps = Tensor::randn_like(z_mean, 0., 1.)?;
        z_mean + (z_lnvar * 0.5)?.exp()? * eps
    }

    /// Composite loss, each term summed then averaged over the batch:
    ///
    /// sum (recon - x)^2 / n - 0.5 * sum (1 + log sigma^2 - mu^2 - sigma^2) / n
    ///
    /// * `x_nchw` - observed images
    /// * `recon_nchw` - reconstruction (input plus residual)
    /// * `z_mean_nk` - posterior mean
    /// * `z_lnvar_nk` - posterior log variance
    pub fn loss(
        &self,
        x_nchw: &Tensor,
        recon_nchw: &Tensor,
        z_mean_nk: &Tensor,
        z_lnvar_nk: &Tensor,
    ) -> Result<Tensor> {
        let nn = x_nchw.dim(0)? as f64;
        let mse = sum_squared_error(x_nchw, recon_nchw)?;
        let kld = (gaussian_kl_loss(z_mean_nk, z_lnvar_nk)?.sum_all()? / nn)?;
        mse + kld
    }

    /// One full pass: encode, sample, decode, then add the residual back
    /// onto the input.
    ///
    /// # Arguments
    /// * `x_nchw` - input images (n x c x h x w)
    /// * `train` - batch statistics vs. running statistics in normalization
    /// * `require_loss` - also evaluate the composite loss
    /// * `_require_grid` - accepted and ignored, kept for interface
    ///   compatibility with existing callers
    ///
    /// # Returns `(recon_nchw, loss)`
    /// * `recon_nchw` - reconstruction (n x c x h x w)
    /// * `loss` - scalar loss when `require_loss` is set
    pub fn forward_t(
        &self,
        x_nchw: &Tensor,
        train: bool,
        require_loss: bool,
        _require_grid: bool,
    ) -> Result<(Tensor, Option<Tensor>)> {
        let (z_mean_nk, z_lnvar_nk) = self.encode_t(x_nchw, train)?;
        let z_nk = self.reparameterize(&z_mean_nk, &z_lnvar_nk)?;
        let residual_nchw = self.decode_t(&z_nk, train)?;
        let recon_nchw = (x_nchw + residual_nchw)?;

        if require_loss {
            let loss = self.loss(x_nchw, &recon_nchw, &z_mean_nk, &z_lnvar_nk)?;
            Ok((recon_nchw, Some(loss)))
        } else {
            Ok((recon_nchw, None))
        }
    }
}
