#![allow(dead_code)]

use candle_core::{Result, Tensor};

/// KL divergence loss between two Gaussian distributions
///
/// -0.5 * (1 + log(sigma^2) - mu^2 - sigma^2)
///
/// summed over the latent dimensions, one value per sample
///
/// * `z_mean` - mean of Gaussian distribution
/// * `z_lnvar` - log variance of Gaussian distribution
///
pub fn gaussian_kl_loss(z_mean: &Tensor, z_lnvar: &Tensor) -> Result<Tensor> {
    let z_var = z_lnvar.exp()?;
    (z_var - 1. + z_mean.powf(2.)? - z_lnvar)?.sum(z_mean.rank() - 1)? * 0.5
}

/// Summed squared reconstruction error, averaged over the batch
///
/// sum_chw [ x(i,c,h,w) - xhat(i,c,h,w) ]^2 / n
///
/// * `x_nchw` - data tensor (observed images)
/// * `recon_nchw` - reconstruction tensor
///
pub fn sum_squared_error(x_nchw: &Tensor, recon_nchw: &Tensor) -> Result<Tensor> {
    let nn = x_nchw.dim(0)? as f64;
    recon_nchw.sub(x_nchw)?.powf(2.)?.sum_all()? / nn
}
