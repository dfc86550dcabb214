#![allow(dead_code)]

use candle_core::{Result, Tensor};

/// Input image geometry (CIFAR-scale RGB)
pub const IMAGE_CHANNELS: usize = 3;
pub const IMAGE_SIDE: usize = 32;

/// Feature volume at the bottom of the strided convolution stack
pub const CONV_CHANNELS: usize = 128;
pub const CONV_SIDE: usize = 8;

/// Flattened feature volume feeding the fully-connected bottleneck
pub const CONV_FLAT_DIM: usize = CONV_CHANNELS * CONV_SIDE * CONV_SIDE;

pub trait EncoderModuleT {
    /// An encoder that maps images onto latent Gaussian parameters
    ///
    /// # Arguments
    /// * `x_nchw` - input images (n x c x h x w)
    /// * `train` - batch statistics vs. running statistics in normalization
    ///
    /// # Returns `(z_mean_nk, z_lnvar_nk)`
    /// * `z_mean_nk` - latent mean (n x k)
    /// * `z_lnvar_nk` - latent log variance (n x k), unconstrained
    fn forward_t(&self, x_nchw: &Tensor, train: bool) -> Result<(Tensor, Tensor)>;

    fn dim_latent(&self) -> usize;

    fn dim_feature(&self) -> usize;
}

pub trait DecoderModuleT {
    /// A decoder that maps latent samples onto residual images in (0,1)
    ///
    /// # Arguments
    /// * `z_nk` - latent states (n x k)
    /// * `train` - batch statistics vs. running statistics in normalization
    fn forward_t(&self, z_nk: &Tensor, train: bool) -> Result<Tensor>;

    fn dim_latent(&self) -> usize;

    fn dim_feature(&self) -> usize;
}
