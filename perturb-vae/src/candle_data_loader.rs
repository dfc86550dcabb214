#![allow(dead_code)]

use anyhow::anyhow;
use candle_core::{Device, Tensor};
use rand::prelude::SliceRandom;
use rayon::prelude::*;

/// `DataLoader` for minibatch learning
pub trait DataLoader {
    fn minibatch_data(&self, batch_idx: usize, target_device: &Device) -> anyhow::Result<Tensor>;

    fn num_minibatch(&self) -> usize;

    fn num_samples(&self) -> usize;

    fn shuffle_minibatch(&mut self, batch_size: usize) -> anyhow::Result<()>;
}

///
/// A simple data loader for an in-memory image stack. Each sample is
/// kept as a `(1, c, h, w)` tensor; after `shuffle_minibatch`, the
/// shuffled minibatches are preloaded as stacked `(b, c, h, w)` tensors.
///
pub struct InMemoryImages {
    image_data: Vec<Tensor>,
    shuffled_image_data: Option<Vec<Tensor>>,
    minibatches: Minibatches,
}

impl InMemoryImages {
    ///
    /// Create a data loader from the image stack `data`
    ///
    pub fn new<D>(data: &D) -> anyhow::Result<Self>
    where
        D: ImagesToTensorVec,
    {
        let image_data = data.images_to_tensor_vec()?;
        let samples = (0..image_data.len()).collect();

        Ok(InMemoryImages {
            image_data,
            shuffled_image_data: None,
            minibatches: Minibatches {
                samples,
                chunks: vec![],
            },
        })
    }
}

impl DataLoader for InMemoryImages {
    fn minibatch_data(&self, batch_idx: usize, target_device: &Device) -> anyhow::Result<Tensor> {
        let shuffled = self
            .shuffled_image_data
            .as_ref()
            .ok_or(anyhow!("need to shuffle data"))?;

        if shuffled.len() <= batch_idx {
            return Err(anyhow!(
                "invalid index = {} vs. total # = {}",
                batch_idx,
                shuffled.len()
            ));
        }

        Ok(shuffled[batch_idx].to_device(target_device)?)
    }

    fn num_minibatch(&self) -> usize {
        self.minibatches.chunks.len()
    }

    fn num_samples(&self) -> usize {
        self.image_data.len()
    }

    fn shuffle_minibatch(&mut self, batch_size: usize) -> anyhow::Result<()> {
        /////////////////////
        // shuffle indexes //
        /////////////////////

        self.minibatches.shuffle_minibatch(batch_size);

        ///////////////////////////////////
        // preload all the shuffled data //
        ///////////////////////////////////

        let mut shuffled = Vec::with_capacity(self.num_minibatch());

        for samples in self.minibatches.chunks.iter() {
            let chunk: Vec<Tensor> = samples.iter().map(|&i| self.image_data[i].clone()).collect();
            shuffled.push(Tensor::cat(&chunk, 0)?);
        }

        self.shuffled_image_data = Some(shuffled);
        Ok(())
    }
}

///
/// A helper `struct` for shuffling and creating minibatch indexes;
/// after `shuffle_minibatch` is called, `chunks` partition indexes.
///
pub struct Minibatches {
    pub samples: Vec<usize>,
    pub chunks: Vec<Vec<usize>>,
}

impl Minibatches {
    pub fn shuffle_minibatch(&mut self, batch_size: usize) {
        let mut rng = rand::rng();
        self.samples.shuffle(&mut rng);

        let ntot = self.size();
        let nbatch = ntot.div_ceil(batch_size);
        let samples = &self.samples;

        self.chunks = (0..nbatch)
            .into_par_iter()
            .map(|b| {
                let lb = b * batch_size;
                let ub = ((b + 1) * batch_size).min(ntot);
                samples[lb..ub].to_vec()
            })
            .collect::<Vec<Vec<usize>>>();
    }

    pub fn size(&self) -> usize {
        self.samples.len()
    }
}

/// Split stacked images into per-sample `(1, c, h, w)` tensors
pub trait ImagesToTensorVec {
    fn images_to_tensor_vec(&self) -> anyhow::Result<Vec<Tensor>>;
}

impl ImagesToTensorVec for Tensor {
    fn images_to_tensor_vec(&self) -> anyhow::Result<Vec<Tensor>> {
        let (nn, _c, _h, _w) = self.dims4()?;
        (0..nn)
            .map(|i| Ok(self.narrow(0, i, 1)?))
            .collect::<anyhow::Result<Vec<_>>>()
    }
}

impl ImagesToTensorVec for ndarray::Array4<f32> {
    fn images_to_tensor_vec(&self) -> anyhow::Result<Vec<Tensor>> {
        let (nn, cc, hh, ww) = self.dim();
        let data: Vec<f32> = self.iter().copied().collect();
        let stacked = Tensor::from_vec(data, (nn, cc, hh, ww), &Device::Cpu)?;
        stacked.images_to_tensor_vec()
    }
}
