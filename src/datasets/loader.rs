use anyhow::{anyhow, Result};
use candle_core::Device;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{batch::collate, traits::Dataset, GraphBatch};

#[derive(Debug, Clone)]
pub struct LoaderParams {
    pub batch_size: usize,
    pub shuffle: bool,
    pub seed: u64,
    pub drop_last: bool,
}
impl Default for LoaderParams {
    fn default() -> Self {
        Self {
            batch_size: 512,
            shuffle: false,
            seed: 0,
            drop_last: false,
        }
    }
}

/// Iterates over a dataset in mini-batches of collated graphs.
pub struct GraphDataLoader<'a, D> {
    dataset: &'a D,
    device: &'a Device,
    order: Vec<usize>,
    batch_size: usize,
    drop_last: bool,
    position: usize,
}
impl<'a, D: Dataset> GraphDataLoader<'a, D> {
    pub fn new(dataset: &'a D, device: &'a Device, batch_size: usize) -> Self {
        let params = LoaderParams {
            batch_size,
            ..Default::default()
        };
        Self::with_params(dataset, device, &params, 0)
    }
    /// Order for `epoch`; a shuffled loader reseeds with `seed + epoch`.
    pub fn with_params(dataset: &'a D, device: &'a Device, params: &LoaderParams, epoch: usize) -> Self {
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        if params.shuffle {
            let mut rng = ChaCha8Rng::seed_from_u64(params.seed.wrapping_add(epoch as u64));
            order.shuffle(&mut rng);
        }
        Self {
            dataset,
            device,
            order,
            batch_size: params.batch_size.max(1),
            drop_last: params.drop_last,
            position: 0,
        }
    }
    pub fn num_batches(&self) -> usize {
        if self.drop_last {
            self.order.len() / self.batch_size
        } else {
            self.order.len().div_ceil(self.batch_size)
        }
    }
}

impl<'a, D: Dataset> Iterator for GraphDataLoader<'a, D> {
    type Item = Result<GraphBatch>;
    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.order.len() - self.position;
        if remaining == 0 || (self.drop_last && remaining < self.batch_size) {
            return None;
        }
        let end = self.position + remaining.min(self.batch_size);
        let chunk = &self.order[self.position..end];
        self.position = end;

        let items: Result<Vec<_>> = chunk
            .iter()
            .map(|&i| {
                self.dataset
                    .get(i)
                    .ok_or_else(|| anyhow!("index {} out of range", i))
            })
            .collect();
        Some(items.and_then(|items| collate(&items, self.device)))
    }
}
