use candle_core::{DType, Device, Result, Tensor, Var};
use candle_nn::{Activation, Linear, Module, VarBuilder, VarMap};

use super::utils::linear;
use crate::datasets::GraphBatch;
use crate::nn::{Gcn, GcnParams, GnnModule, Readout};

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub in_dim: usize,
    pub hidden_dim: usize,
    pub num_layers: usize,
    pub num_classes: usize,
    pub readout: Readout,
    pub dropout_rate: f32,
}
impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            in_dim: 18,
            hidden_dim: 64,
            num_layers: 3,
            num_classes: 6,
            readout: Readout::Sum,
            dropout_rate: 0.0,
        }
    }
}
impl ModelConfig {
    /// `[in_dim, hidden_dim, ..., hidden_dim]` with `num_layers` convolutions.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![self.in_dim];
        sizes.extend(std::iter::repeat(self.hidden_dim).take(self.num_layers));
        sizes
    }
}

/// GCN encoder, graph readout and a linear head producing per-graph logits.
pub struct GraphClassifier {
    gcn: Gcn,
    readout: Readout,
    classifier: Linear,
    varmap: VarMap,
}
impl GraphClassifier {
    pub fn new(config: &ModelConfig, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vs = VarBuilder::from_varmap(&varmap, DType::F32, device);

        let params = GcnParams {
            dropout_rate: config.dropout_rate,
            activation_fn: Activation::Relu,
            activate_output: true,
        };
        let gcn = Gcn::with_params(&config.layer_sizes(), params, vs.pp("gcn"))?;
        let classifier = linear(config.hidden_dim, config.num_classes, vs.pp("classifier"))?;
        Ok(Self {
            gcn,
            readout: config.readout,
            classifier,
            varmap,
        })
    }
    pub fn parameters(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }
    /// Logits of shape `(num_graphs, num_classes)`.
    pub fn forward_t(&self, batch: &GraphBatch, train: bool) -> Result<Tensor> {
        let h = self.gcn.forward_t(&batch.xs, &batch.edge_index, train)?;
        let h = self.readout.forward(&h, &batch.batch, batch.num_graphs())?;
        self.classifier.forward(&h)
    }
    pub fn forward(&self, batch: &GraphBatch) -> Result<Tensor> {
        self.forward_t(batch, false)
    }
}
