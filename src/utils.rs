use candle_core::{DType, Result, Tensor, D};

/// Number of rows of `logits` whose argmax equals the label in `ys`.
pub fn count_correct(logits: &Tensor, ys: &Tensor) -> Result<usize> {
    let correct = logits
        .argmax(D::Minus1)?
        .eq(ys)?
        .to_dtype(DType::F32)?
        .sum_all()?
        .to_scalar::<f32>()?;
    Ok(correct as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn counts_argmax_hits() -> Result<()> {
        let logits = Tensor::new(&[[0.1f32, 0.9], [2.0, -1.0], [0.0, 3.0]], &Device::Cpu)?;
        let ys = Tensor::new(&[1u32, 1, 1], &Device::Cpu)?;
        assert_eq!(count_correct(&logits, &ys)?, 2);
        Ok(())
    }
}
