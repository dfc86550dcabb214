use candle_core::{DType, Device, Result, Tensor};
use candle_nn::{Conv2dConfig, Module, ModuleT, VarBuilder, VarMap};

use perturb_vae::candle_aux_layers::*;

fn test_vs(device: &Device) -> (VarMap, VarBuilder<'static>) {
    let variable_map = VarMap::new();
    let vs = VarBuilder::from_varmap(&variable_map, DType::F32, device);
    (variable_map, vs)
}

#[test]
fn conv_block_shape_test() -> Result<()> {
    let device = Device::Cpu;
    let (_vars, vs) = test_vs(&device);

    let x_nchw = Tensor::rand(0f32, 1f32, (2, 3, 16, 16), &device)?;

    let same = conv_block_3x3(3, 8, 1, vs.pp("same"))?;
    assert_eq!(same.forward_t(&x_nchw, true)?.dims(), &[2, 8, 16, 16]);

    let down = conv_block_3x3(3, 8, 2, vs.pp("down"))?;
    assert_eq!(down.forward_t(&x_nchw, true)?.dims(), &[2, 8, 8, 8]);
    Ok(())
}

#[test]
fn deconv_block_shape_test() -> Result<()> {
    let device = Device::Cpu;
    let (_vars, vs) = test_vs(&device);

    let x_nchw = Tensor::rand(0f32, 1f32, (2, 8, 8, 8), &device)?;

    let same = deconv_block_3x3(8, 8, 1, vs.pp("same"))?;
    assert_eq!(same.forward_t(&x_nchw, true)?.dims(), &[2, 8, 8, 8]);

    // stride-2 output padding makes the upsampled size exactly double
    let up = deconv_block_3x3(8, 4, 2, vs.pp("up"))?;
    assert_eq!(up.forward_t(&x_nchw, true)?.dims(), &[2, 4, 16, 16]);
    Ok(())
}

#[test]
fn fc_block_shape_test() -> Result<()> {
    let device = Device::Cpu;
    let (_vars, vs) = test_vs(&device);

    let x_nd = Tensor::rand(0f32, 1f32, (5, 16), &device)?;
    let fc = fc_block(16, 8, vs.pp("fc"))?;

    let h_nd = fc.forward_t(&x_nd, true)?;
    assert_eq!(h_nd.dims(), &[5, 8]);

    // rectified output is non-negative
    let min_val = h_nd.min_all()?.to_scalar::<f32>()?;
    assert!(min_val >= 0.0);
    Ok(())
}

#[test]
fn stacked_blocks_test() -> Result<()> {
    let device = Device::Cpu;
    let (_vars, vs) = test_vs(&device);

    let mut stack = StackLayersT::<ConvBlock>::new();
    stack.push(conv_block_3x3(3, 8, 2, vs.pp("stack.0"))?);
    stack.push(conv_block_3x3(8, 16, 2, vs.pp("stack.1"))?);
    assert_eq!(stack.len(), 2);

    let x_nchw = Tensor::rand(0f32, 1f32, (2, 3, 32, 32), &device)?;
    assert_eq!(stack.forward_t(&x_nchw, true)?.dims(), &[2, 16, 8, 8]);
    Ok(())
}

#[test]
fn conv_fan_out_init_test() -> Result<()> {
    let device = Device::Cpu;
    let (_vars, vs) = test_vs(&device);

    let conv = conv2d_fan_out_init(3, 64, 3, Conv2dConfig::default(), vs.pp("conv"))?;
    let ws = conv.weight().flatten_all()?.to_vec1::<f32>()?;

    let nn = ws.len() as f32;
    let mean = ws.iter().sum::<f32>() / nn;
    let var = ws.iter().map(|w| (w - mean) * (w - mean)).sum::<f32>() / nn;

    // stdev should track sqrt(2 / (3 * 3 * 64)) = 0.0589
    let expected = (2f32 / (9.0 * 64.0)).sqrt();
    assert!(mean.abs() < 0.01);
    assert!((var.sqrt() - expected).abs() / expected < 0.2);
    Ok(())
}

#[test]
fn zero_conv_test() -> Result<()> {
    let device = Device::Cpu;
    let (_vars, vs) = test_vs(&device);

    let conv = conv2d_1x1_zero(8, 3, vs.pp("out"))?;

    let weight_mass = conv.weight().abs()?.sum_all()?.to_scalar::<f32>()?;
    assert_eq!(weight_mass, 0f32);

    let x_nchw = Tensor::rand(0f32, 1f32, (2, 8, 4, 4), &device)?;
    let y_nchw = conv.forward(&x_nchw)?;
    assert_eq!(y_nchw.dims(), &[2, 3, 4, 4]);
    assert_eq!(y_nchw.abs()?.sum_all()?.to_scalar::<f32>()?, 0f32);
    Ok(())
}
