use candle_core::{Device, Tensor};
use ndarray::Array4;

use perturb_vae::candle_data_loader::*;

#[test]
fn shuffle_and_minibatch_test() -> anyhow::Result<()> {
    let device = Device::Cpu;

    // sample i is a constant-i image, so batches can be traced back
    let images = Array4::from_shape_fn((10, 3, 4, 4), |(i, _, _, _)| i as f32);
    let mut data = InMemoryImages::new(&images)?;

    assert_eq!(data.num_samples(), 10);
    assert!(data.minibatch_data(0, &device).is_err());

    data.shuffle_minibatch(3)?;
    assert_eq!(data.num_minibatch(), 4);

    let mut seen = vec![];
    for b in 0..data.num_minibatch() {
        let x_nchw = data.minibatch_data(b, &device)?;
        let dims = x_nchw.dims();
        assert_eq!(&dims[1..], &[3, 4, 4]);

        let flat = x_nchw.reshape((dims[0], 48))?.to_vec2::<f32>()?;
        for row in flat.iter() {
            assert!(row.iter().all(|&v| v == row[0]));
            seen.push(row[0] as usize);
        }
    }

    // every sample appears exactly once across the minibatches
    seen.sort_unstable();
    assert_eq!(seen, (0..10).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn tensor_input_test() -> anyhow::Result<()> {
    let device = Device::Cpu;

    let images_nchw = Tensor::rand(0f32, 1f32, (7, 3, 4, 4), &device)?;
    let mut data = InMemoryImages::new(&images_nchw)?;

    data.shuffle_minibatch(7)?;
    assert_eq!(data.num_minibatch(), 1);

    let x_nchw = data.minibatch_data(0, &device)?;
    assert_eq!(x_nchw.dims(), &[7, 3, 4, 4]);
    Ok(())
}

#[test]
fn uneven_last_minibatch_test() -> anyhow::Result<()> {
    let device = Device::Cpu;

    let images_nchw = Tensor::rand(0f32, 1f32, (5, 3, 4, 4), &device)?;
    let mut data = InMemoryImages::new(&images_nchw)?;

    data.shuffle_minibatch(2)?;
    assert_eq!(data.num_minibatch(), 3);

    let mut total = 0;
    for b in 0..data.num_minibatch() {
        total += data.minibatch_data(b, &device)?.dims()[0];
    }
    assert_eq!(total, 5);
    Ok(())
}
