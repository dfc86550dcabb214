#![allow(dead_code)]

use crate::candle_aux_layers::*;
use crate::candle_model_traits::*;
use candle_core::{Result, Tensor};
use candle_nn::{ops, Conv2d, Linear, Module, ModuleT, VarBuilder};

////////////////////////////////////
// Transposed-convolution decoder //
////////////////////////////////////

pub struct ConvDecoder {
    z_dim: usize,
    feat_dim: usize,
    fc: FcBlock,
    proj: Linear,
    deconvs: StackLayersT<DeconvBlock>,
    out: Conv2d,
}

impl DecoderModuleT for ConvDecoder {
    fn forward_t(&self, z_nk: &Tensor, train: bool) -> Result<Tensor> {
        let nn = z_nk.dim(0)?;

        let h_nf = self.fc.forward_t(z_nk, train)?;
        let h_nchw = self
            .proj
            .forward(&h_nf)?
            .reshape((nn, CONV_CHANNELS, CONV_SIDE, CONV_SIDE))?;

        let h_nchw = self.deconvs.forward_t(&h_nchw, train)?;

        // squash the residual into (0,1)
        ops::sigmoid(&self.out.forward(&h_nchw)?)
    }

    fn dim_latent(&self) -> usize {
        self.z_dim
    }

    fn dim_feature(&self) -> usize {
        self.feat_dim
    }
}

impl ConvDecoder {
    /// Will create a new transposed-convolution decoder for 3 x 32 x 32
    /// images with these variables:
    ///
    /// * `nn.dec.fc.{fc,bn}`
    /// * `nn.dec.proj.{weight,bias}`
    /// * `nn.dec.deconv.{}.{conv,bn}` where {} is the block index
    /// * `nn.dec.out.weight`
    ///
    /// The 1x1 output convolution starts with all-zero weights, so an
    /// untrained decoder emits a constant sigmoid(0) = 0.5 residual.
    ///
    /// # Arguments
    /// * `z_dim` - latent dimensionality
    /// * `feat_dim` - fully-connected bottleneck width
    /// * `vs` - variable builder
    pub fn new(z_dim: usize, feat_dim: usize, vs: VarBuilder) -> Result<Self> {
        // (1) latent -> bottleneck -> feature maps
        let fc = fc_block(z_dim, feat_dim, vs.pp("nn.dec.fc"))?;
        let proj = candle_nn::linear(feat_dim, CONV_FLAT_DIM, vs.pp("nn.dec.proj"))?;

        // (2) feature maps 8x8 back up to 32x32
        let blocks = [
            (CONV_CHANNELS, CONV_CHANNELS, 1), // 8x8
            (CONV_CHANNELS, 64, 2),            // 16x16
            (64, 64, 1),
            (64, 32, 2), // 32x32
            (32, 32, 1),
        ];

        let mut deconvs = StackLayersT::<DeconvBlock>::new();
        for (j, &(in_c, out_c, stride)) in blocks.iter().enumerate() {
            let _name = format!("nn.dec.deconv.{}", j);
            deconvs.push(deconv_block_3x3(in_c, out_c, stride, vs.pp(_name))?);
        }

        // (3) feature maps -> residual image channels
        let out = conv2d_1x1_zero(32, IMAGE_CHANNELS, vs.pp("nn.dec.out"))?;

        Ok(Self {
            z_dim,
            feat_dim,
            fc,
            proj,
            deconvs,
            out,
        })
    }

    pub fn output_layer(&self) -> &Conv2d {
        &self.out
    }
}
