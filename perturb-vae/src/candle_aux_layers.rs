#![allow(dead_code)]

use candle_core::{Result, Tensor};
use candle_nn::{
    Activation, BatchNorm, BatchNormConfig, Conv2d, Conv2dConfig, ConvTranspose2d,
    ConvTranspose2dConfig, Linear, Module, ModuleT, VarBuilder,
};

/// build a stack of train-aware layers applied in order
pub struct StackLayersT<M>
where
    M: ModuleT,
{
    layers: Vec<M>,
}

impl<M> ModuleT for StackLayersT<M>
where
    M: ModuleT,
{
    fn forward_t(&self, input: &Tensor, train: bool) -> Result<Tensor> {
        let mut x = input.clone();
        for layer in self.layers.iter() {
            x = layer.forward_t(&x, train)?;
        }
        Ok(x)
    }
}

impl<M> StackLayersT<M>
where
    M: ModuleT,
{
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Appends a layer after all the current layers.
    pub fn push(&mut self, layer: M) {
        self.layers.push(layer);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl<M> Default for StackLayersT<M>
where
    M: ModuleT,
{
    fn default() -> Self {
        Self::new()
    }
}

//////////////////////////////////////////////
// 3x3 convolution + batch norm + rectifier //
//////////////////////////////////////////////

pub struct ConvBlock {
    conv: Conv2d,
    bn: BatchNorm,
    act: Activation,
}

impl ModuleT for ConvBlock {
    fn forward_t(&self, x_nchw: &Tensor, train: bool) -> Result<Tensor> {
        let h_nchw = self.conv.forward(x_nchw)?;
        let h_nchw = self.bn.forward_t(&h_nchw, train)?;
        self.act.forward(&h_nchw)
    }
}

/// Will create a bias-free 3x3 convolution block with these variables:
///
/// * `{prefix}.conv.weight`
/// * `{prefix}.bn.{weight,bias,running_mean,running_var}`
///
/// Padding is fixed at 1 so stride-1 blocks preserve the spatial size
/// and stride-2 blocks halve it.
pub fn conv_block_3x3(
    in_channels: usize,
    out_channels: usize,
    stride: usize,
    vs: VarBuilder,
) -> Result<ConvBlock> {
    let cfg = Conv2dConfig {
        padding: 1,
        stride,
        ..Default::default()
    };

    let conv = conv2d_fan_out_init(in_channels, out_channels, 3, cfg, vs.pp("conv"))?;
    let bn = candle_nn::batch_norm(out_channels, BatchNormConfig::default(), vs.pp("bn"))?;

    Ok(ConvBlock {
        conv,
        bn,
        act: Activation::Relu,
    })
}

/////////////////////////////////////////////////////////
// 3x3 transposed convolution + batch norm + rectifier //
/////////////////////////////////////////////////////////

pub struct DeconvBlock {
    deconv: ConvTranspose2d,
    bn: BatchNorm,
    act: Activation,
}

impl ModuleT for DeconvBlock {
    fn forward_t(&self, x_nchw: &Tensor, train: bool) -> Result<Tensor> {
        let h_nchw = self.deconv.forward(x_nchw)?;
        let h_nchw = self.bn.forward_t(&h_nchw, train)?;
        self.act.forward(&h_nchw)
    }
}

/// Will create a bias-free 3x3 transposed convolution block with these
/// variables:
///
/// * `{prefix}.conv.weight`
/// * `{prefix}.bn.{weight,bias,running_mean,running_var}`
///
/// The output padding is `stride - 1` so stride-2 blocks exactly double
/// the spatial size and stride-1 blocks preserve it.
pub fn deconv_block_3x3(
    in_channels: usize,
    out_channels: usize,
    stride: usize,
    vs: VarBuilder,
) -> Result<DeconvBlock> {
    let cfg = ConvTranspose2dConfig {
        padding: 1,
        output_padding: stride - 1,
        stride,
        ..Default::default()
    };

    let deconv =
        candle_nn::conv_transpose2d_no_bias(in_channels, out_channels, 3, cfg, vs.pp("conv"))?;
    let bn = candle_nn::batch_norm(out_channels, BatchNormConfig::default(), vs.pp("bn"))?;

    Ok(DeconvBlock {
        deconv,
        bn,
        act: Activation::Relu,
    })
}

///////////////////////////////////////////////
// fully-connected + batch norm + rectifier  //
///////////////////////////////////////////////

pub struct FcBlock {
    fc: Linear,
    bn: BatchNorm,
    act: Activation,
}

impl ModuleT for FcBlock {
    fn forward_t(&self, x_nd: &Tensor, train: bool) -> Result<Tensor> {
        let h_nd = self.fc.forward(x_nd)?;
        let h_nd = self.bn.forward_t(&h_nd, train)?;
        self.act.forward(&h_nd)
    }
}

/// Will create a fully-connected block with these variables:
///
/// * `{prefix}.fc.{weight,bias}`
/// * `{prefix}.bn.{weight,bias,running_mean,running_var}`
pub fn fc_block(in_dim: usize, out_dim: usize, vs: VarBuilder) -> Result<FcBlock> {
    let fc = candle_nn::linear(in_dim, out_dim, vs.pp("fc"))?;
    let bn = candle_nn::batch_norm(out_dim, BatchNormConfig::default(), vs.pp("bn"))?;

    Ok(FcBlock {
        fc,
        bn,
        act: Activation::Relu,
    })
}

/// Bias-free convolution with fan-out normal initialization:
/// stdev = sqrt(2 / (k * k * out_channels))
pub fn conv2d_fan_out_init(
    in_channels: usize,
    out_channels: usize,
    kernel: usize,
    cfg: Conv2dConfig,
    vb: VarBuilder,
) -> Result<Conv2d> {
    let fan_out = (kernel * kernel * out_channels) as f64;
    let init_ws = candle_nn::Init::Randn {
        mean: 0.,
        stdev: (2. / fan_out).sqrt(),
    };

    let ws = vb.get_with_hints(
        (out_channels, in_channels, kernel, kernel),
        "weight",
        init_ws,
    )?;

    Ok(Conv2d::new(ws, None, cfg))
}

/// Bias-free 1x1 convolution with all-zero weights, so the layer starts
/// by emitting an all-zero map regardless of its input.
pub fn conv2d_1x1_zero(
    in_channels: usize,
    out_channels: usize,
    vb: VarBuilder,
) -> Result<Conv2d> {
    let ws = vb.get_with_hints(
        (out_channels, in_channels, 1, 1),
        "weight",
        candle_nn::init::ZERO,
    )?;

    Ok(Conv2d::new(ws, None, Conv2dConfig::default()))
}
