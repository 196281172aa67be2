use candle_core::{bail, IndexOp, Result, Tensor};
use candle_nn::{Activation, Dropout, Init, Module, VarBuilder};

use super::{
    traits::GnnModule,
    utils::{in_degree, out_degree, weighted_sum_agg},
};

/// Graph convolution with a root term:
/// `h_i = x_i W + sum_{j -> i} x_j W / sqrt(deg_out(j) deg_in(i)) + b`.
pub struct GcnConv {
    weight: Tensor,
    bias: Tensor,
}
impl GcnConv {
    pub fn new(in_dim: usize, out_dim: usize, vs: VarBuilder) -> Result<Self> {
        // Xavier Uniform
        let bound = (6.0 / (in_dim + out_dim) as f64).sqrt();
        let weight = vs.get_with_hints(
            (in_dim, out_dim),
            "weight",
            Init::Uniform {
                lo: -bound,
                up: bound,
            },
        )?;
        let bias = vs.get_with_hints((1, out_dim), "bias", Init::Const(0.0))?;
        Ok(Self { weight, bias })
    }
}
impl GnnModule for GcnConv {
    fn forward_t(&self, xs: &Tensor, edge_index: &Tensor, _train: bool) -> Result<Tensor> {
        let xs = xs.matmul(&self.weight)?;
        if edge_index.dim(1)? == 0 {
            return xs.broadcast_add(&self.bias);
        }
        let num_nodes = xs.dim(0)?;
        let out_degree = out_degree(edge_index, num_nodes, xs.dtype())?;
        let out_degree = out_degree.maximum(&out_degree.ones_like()?)?;
        let in_degree = in_degree(edge_index, num_nodes, xs.dtype())?;
        let in_degree = in_degree.maximum(&in_degree.ones_like()?)?;
        let edge_weight = out_degree
            .i(&edge_index.i(0)?)?
            .mul(&in_degree.i(&edge_index.i(1)?)?)?
            .powf(-0.5)?;
        weighted_sum_agg(&xs, edge_index, &edge_weight, &xs)?.broadcast_add(&self.bias)
    }
}

pub struct GcnParams {
    pub dropout_rate: f32,
    pub activation_fn: Activation,
    /// Also apply `activation_fn` after the last layer.
    pub activate_output: bool,
}
impl Default for GcnParams {
    fn default() -> Self {
        Self {
            dropout_rate: 0.0,
            activation_fn: Activation::Relu,
            activate_output: false,
        }
    }
}

pub struct Gcn {
    layers: Vec<GcnConv>,
    dropout: Dropout,
    activation_fn: Activation,
    activate_output: bool,
}
impl Gcn {
    pub fn with_params(layer_sizes: &[usize], params: GcnParams, vs: VarBuilder) -> Result<Self> {
        if layer_sizes.len() < 2 {
            bail!("a GCN needs at least two layer sizes; got {:?}", layer_sizes);
        }
        let mut layers = Vec::new();
        for i in 0..layer_sizes.len() - 1 {
            layers.push(GcnConv::new(
                layer_sizes[i],
                layer_sizes[i + 1],
                vs.pp(i.to_string()),
            )?);
        }
        Ok(Self {
            layers,
            dropout: Dropout::new(params.dropout_rate),
            activation_fn: params.activation_fn,
            activate_output: params.activate_output,
        })
    }
    pub fn new(layer_sizes: &[usize], vs: VarBuilder) -> Result<Self> {
        Self::with_params(layer_sizes, GcnParams::default(), vs)
    }
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}
impl GnnModule for Gcn {
    fn forward_t(&self, xs: &Tensor, edge_index: &Tensor, train: bool) -> Result<Tensor> {
        let mut h = xs.clone();
        for (idx, layer) in self.layers.iter().enumerate() {
            if idx > 0 {
                h = self.dropout.forward(&h, train)?;
            }
            h = layer.forward(&h, edge_index)?;
            if idx + 1 < self.layers.len() || self.activate_output {
                h = self.activation_fn.forward(&h)?;
            }
        }
        Ok(h)
    }
}
