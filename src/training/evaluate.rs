use anyhow::{bail, Result};
use candle_core::Device;
use candle_nn::loss;
use tracing::info;

use crate::datasets::{Dataset, GraphDataLoader};
use crate::models::GraphClassifier;
use crate::utils::count_correct;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalStats {
    pub loss: f32,
    pub correct: usize,
    pub total: usize,
    pub accuracy: f32,
}

/// One pass over `dataset` in inference mode; no gradients are taken.
pub fn evaluate<D: Dataset>(
    model: &GraphClassifier,
    dataset: &D,
    batch_size: usize,
    device: &Device,
) -> Result<EvalStats> {
    if dataset.is_empty() {
        bail!("cannot evaluate on an empty dataset");
    }
    let mut total_loss = 0.0f32;
    let mut correct = 0;
    let mut total = 0;
    for batch in GraphDataLoader::new(dataset, device, batch_size) {
        let batch = batch?;
        let logits = model.forward_t(&batch, false)?.detach();
        let loss = loss::cross_entropy(&logits, &batch.ys)?.to_scalar::<f32>()?;
        total_loss += loss * batch.num_graphs() as f32;
        correct += count_correct(&logits, &batch.ys)?;
        total += batch.num_graphs();
    }
    let stats = EvalStats {
        loss: total_loss / total as f32,
        correct,
        total,
        accuracy: correct as f32 / total as f32,
    };
    info!(loss = stats.loss, accuracy = stats.accuracy, total, "evaluated");
    Ok(stats)
}
