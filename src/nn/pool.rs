use candle_core::{Result, Tensor};

/// Reduction of the node embeddings of each graph in a batch to one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Readout {
    #[default]
    Sum,
    Mean,
}
impl Readout {
    pub fn forward(&self, xs: &Tensor, batch: &Tensor, num_graphs: usize) -> Result<Tensor> {
        match self {
            Self::Sum => sum_pool(xs, batch, num_graphs),
            Self::Mean => mean_pool(xs, batch, num_graphs),
        }
    }
}

/// `out[g] = sum of xs[i] over nodes i with batch[i] == g`.
pub fn sum_pool(xs: &Tensor, batch: &Tensor, num_graphs: usize) -> Result<Tensor> {
    let zeros = Tensor::zeros((num_graphs, xs.dim(1)?), xs.dtype(), xs.device())?;
    if xs.dim(0)? == 0 {
        return Ok(zeros);
    }
    zeros.index_add(batch, xs, 0)
}

/// Empty graphs pool to zero.
pub fn mean_pool(xs: &Tensor, batch: &Tensor, num_graphs: usize) -> Result<Tensor> {
    let sum = sum_pool(xs, batch, num_graphs)?;
    let counts = super::utils::count_index(batch, num_graphs, xs.dtype())?;
    let counts = counts.maximum(&counts.ones_like()?)?.unsqueeze(1)?;
    sum.broadcast_div(&counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn pools_per_graph() -> Result<()> {
        let device = Device::Cpu;
        let xs = Tensor::new(&[[1f32, 2.0], [3.0, 4.0], [5.0, 6.0]], &device)?;
        let batch = Tensor::new(&[0u32, 0, 2], &device)?;

        let sum = Readout::Sum.forward(&xs, &batch, 3)?.to_vec2::<f32>()?;
        assert_eq!(sum, vec![vec![4.0, 6.0], vec![0.0, 0.0], vec![5.0, 6.0]]);

        let mean = Readout::Mean.forward(&xs, &batch, 3)?.to_vec2::<f32>()?;
        assert_eq!(mean, vec![vec![2.0, 3.0], vec![0.0, 0.0], vec![5.0, 6.0]]);
        Ok(())
    }
}
