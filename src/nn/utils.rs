use candle_core::{DType, IndexOp, Result, Tensor};

/// Number of occurrences of every node id `0..num_nodes` in `index`.
pub fn count_index(index: &Tensor, num_nodes: usize, dtype: DType) -> Result<Tensor> {
    let zeros = Tensor::zeros(num_nodes, dtype, index.device())?;
    if index.dim(0)? == 0 {
        return Ok(zeros);
    }
    let ones = Tensor::ones(index.dim(0)?, dtype, index.device())?;
    zeros.index_add(index, &ones, 0)
}

pub fn out_degree(edge_index: &Tensor, num_nodes: usize, dtype: DType) -> Result<Tensor> {
    count_index(&edge_index.i(0)?, num_nodes, dtype)
}

pub fn in_degree(edge_index: &Tensor, num_nodes: usize, dtype: DType) -> Result<Tensor> {
    count_index(&edge_index.i(1)?, num_nodes, dtype)
}

/// `init[target] += edge_weight * xs[source]` for every edge.
pub fn weighted_sum_agg(
    xs: &Tensor,
    edge_index: &Tensor,
    edge_weight: &Tensor,
    init: &Tensor,
) -> Result<Tensor> {
    if edge_index.dim(1)? == 0 {
        return Ok(init.clone());
    }
    let messages = xs
        .i(&edge_index.i(0)?)?
        .broadcast_mul(&edge_weight.unsqueeze(1)?)?;
    init.index_add(&edge_index.i(1)?, &messages, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn degrees_count_isolated_nodes() -> Result<()> {
        let edge_index = Tensor::new(&[[0u32, 0, 1], [1, 2, 2]], &Device::Cpu)?;
        let out = out_degree(&edge_index, 4, DType::F32)?.to_vec1::<f32>()?;
        let inc = in_degree(&edge_index, 4, DType::F32)?.to_vec1::<f32>()?;
        assert_eq!(out, vec![2.0, 1.0, 0.0, 0.0]);
        assert_eq!(inc, vec![0.0, 1.0, 2.0, 0.0]);
        Ok(())
    }

    #[test]
    fn weighted_sum_moves_source_to_target() -> Result<()> {
        let device = Device::Cpu;
        let xs = Tensor::new(&[[1f32, 10.0], [2.0, 20.0], [3.0, 30.0]], &device)?;
        let edge_index = Tensor::new(&[[0u32, 1], [2, 2]], &device)?;
        let weight = Tensor::new(&[1f32, 0.5], &device)?;
        let out = weighted_sum_agg(&xs, &edge_index, &weight, &xs.zeros_like()?)?;
        assert_eq!(
            out.to_vec2::<f32>()?,
            vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![2.0, 20.0]]
        );
        Ok(())
    }
}
