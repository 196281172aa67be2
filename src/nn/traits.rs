use candle_core::{Result, Tensor};

/// A layer (or stack of layers) that maps node features over a fixed edge set.
pub trait GnnModule {
    fn forward_t(&self, xs: &Tensor, edge_index: &Tensor, train: bool) -> Result<Tensor>;

    fn forward(&self, xs: &Tensor, edge_index: &Tensor) -> Result<Tensor> {
        self.forward_t(xs, edge_index, false)
    }
}
