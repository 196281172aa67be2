use candle_core::Result;
use candle_nn::{Init, Linear, VarBuilder};

/// Classifier head initialised like `torch.nn.Linear`: weight and bias both
/// drawn from `U(-1/sqrt(in_dim), 1/sqrt(in_dim))`.
/// See https://github.com/pytorch/pytorch/issues/57109
pub(crate) fn linear(in_dim: usize, out_dim: usize, vs: VarBuilder) -> Result<Linear> {
    let bound = 1.0 / (in_dim as f64).sqrt();
    let init = Init::Uniform {
        lo: -bound,
        up: bound,
    };
    let ws = vs.get_with_hints((out_dim, in_dim), "weight", init)?;
    let bs = vs.get_with_hints(out_dim, "bias", init)?;
    Ok(Linear::new(ws, Some(bs)))
}
