#![allow(dead_code)]

use crate::candle_aux_layers::*;
use crate::candle_model_traits::*;
use candle_core::{Result, Tensor};
use candle_nn::{Linear, Module, ModuleT, VarBuilder};

///////////////////////////////////////
// Strided convolutional encoder     //
///////////////////////////////////////

pub struct ConvEncoder {
    z_dim: usize,
    feat_dim: usize,
    convs: StackLayersT<ConvBlock>,
    fc: FcBlock,
    z_mean: Linear,
    z_lnvar: Linear,
}

impl EncoderModuleT for ConvEncoder {
    fn forward_t(&self, x_nchw: &Tensor, train: bool) -> Result<(Tensor, Tensor)> {
        let h_nchw = self.convs.forward_t(x_nchw, train)?;
        let h_nf = self.fc.forward_t(&h_nchw.flatten_from(1)?, train)?;

        // raw Gaussian heads, no activation on either one
        Ok((self.z_mean.forward(&h_nf)?, self.z_lnvar.forward(&h_nf)?))
    }

    fn dim_latent(&self) -> usize {
        self.z_dim
    }

    fn dim_feature(&self) -> usize {
        self.feat_dim
    }
}

impl ConvEncoder {
    /// Will create a new convolutional encoder for 3 x 32 x 32 images
    /// with these variables:
    ///
    /// * `nn.enc.conv.{}.{conv,bn}` where {} is the block index
    /// * `nn.enc.fc.{fc,bn}`
    /// * `nn.enc.z.mean.{weight,bias}`
    /// * `nn.enc.z.lnvar.{weight,bias}`
    ///
    /// # Arguments
    /// * `z_dim` - latent dimensionality
    /// * `feat_dim` - fully-connected bottleneck width
    /// * `vs` - variable builder
    pub fn new(z_dim: usize, feat_dim: usize, vs: VarBuilder) -> Result<Self> {
        // (1) image -> feature maps, 32x32 down to 8x8
        let blocks = [
            (IMAGE_CHANNELS, 32, 1), // 32x32
            (32, 64, 2),             // 16x16
            (64, 64, 1),
            (64, CONV_CHANNELS, 2), // 8x8
            (CONV_CHANNELS, CONV_CHANNELS, 1),
        ];

        let mut convs = StackLayersT::<ConvBlock>::new();
        for (j, &(in_c, out_c, stride)) in blocks.iter().enumerate() {
            let _name = format!("nn.enc.conv.{}", j);
            convs.push(conv_block_3x3(in_c, out_c, stride, vs.pp(_name))?);
        }

        // (2) flattened maps -> bottleneck
        let fc = fc_block(CONV_FLAT_DIM, feat_dim, vs.pp("nn.enc.fc"))?;

        // (3) bottleneck -> latent Gaussian parameters
        let z_mean = candle_nn::linear(feat_dim, z_dim, vs.pp("nn.enc.z.mean"))?;
        let z_lnvar = candle_nn::linear(feat_dim, z_dim, vs.pp("nn.enc.z.lnvar"))?;

        Ok(Self {
            z_dim,
            feat_dim,
            convs,
            fc,
            z_mean,
            z_lnvar,
        })
    }
}
