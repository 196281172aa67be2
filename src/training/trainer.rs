use anyhow::{bail, Result};
use candle_core::Device;
use candle_nn::{loss, AdamW, Optimizer, ParamsAdamW};
use tracing::{debug, info};

use super::TrainConfig;
use crate::datasets::{Dataset, GraphDataLoader};
use crate::models::GraphClassifier;
use crate::utils::count_correct;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    pub epoch: usize,
    /// Per-graph mean cross-entropy over the epoch.
    pub loss: f32,
    pub accuracy: f32,
    pub num_graphs: usize,
}

/// Progress of [`Trainer::fit_with`], in the order the events occur:
/// `EpochStart`, then `BatchStart` / `StepComplete` per mini-batch, then
/// `EpochComplete`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainEvent {
    EpochStart {
        epoch: usize,
    },
    /// A collated batch is about to go through the forward pass.
    BatchStart {
        epoch: usize,
        step: usize,
        num_graphs: usize,
    },
    StepComplete {
        epoch: usize,
        step: usize,
        loss: f32,
        num_graphs: usize,
    },
    EpochComplete(EpochStats),
}

pub struct Trainer<'a> {
    model: &'a GraphClassifier,
    optimizer: AdamW,
    config: TrainConfig,
    device: Device,
}
impl<'a> Trainer<'a> {
    /// Adam with default betas and epsilon and no weight decay.
    pub fn new(model: &'a GraphClassifier, config: TrainConfig, device: &Device) -> Result<Self> {
        let optimizer = AdamW::new(
            model.parameters(),
            ParamsAdamW {
                lr: config.learning_rate,
                weight_decay: 0.0,
                ..Default::default()
            },
        )?;
        Ok(Self {
            model,
            optimizer,
            config,
            device: device.clone(),
        })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn fit<D: Dataset>(&mut self, dataset: &D) -> Result<Vec<EpochStats>> {
        self.fit_with(dataset, |_| ())
    }

    pub fn fit_with<D, F>(&mut self, dataset: &D, mut on_event: F) -> Result<Vec<EpochStats>>
    where
        D: Dataset,
        F: FnMut(&TrainEvent),
    {
        if self.config.epochs > 0 && dataset.is_empty() {
            bail!("cannot train on an empty dataset");
        }
        let mut history = Vec::with_capacity(self.config.epochs);
        for epoch in 0..self.config.epochs {
            on_event(&TrainEvent::EpochStart { epoch });
            let stats = self.train_epoch(dataset, epoch, &mut on_event)?;
            info!(epoch, loss = stats.loss, accuracy = stats.accuracy, "epoch complete");
            on_event(&TrainEvent::EpochComplete(stats));
            history.push(stats);
        }
        Ok(history)
    }

    fn train_epoch<D, F>(&mut self, dataset: &D, epoch: usize, on_event: &mut F) -> Result<EpochStats>
    where
        D: Dataset,
        F: FnMut(&TrainEvent),
    {
        let params = self.config.loader_params();
        let loader = GraphDataLoader::with_params(dataset, &self.device, &params, epoch);

        let mut total_loss = 0.0f32;
        let mut correct = 0;
        let mut num_graphs = 0;
        for (step, batch) in loader.enumerate() {
            let batch = batch?;
            on_event(&TrainEvent::BatchStart {
                epoch,
                step,
                num_graphs: batch.num_graphs(),
            });
            let logits = self.model.forward_t(&batch, true)?;
            let loss = loss::cross_entropy(&logits, &batch.ys)?;
            self.optimizer.backward_step(&loss)?;

            let loss = loss.to_scalar::<f32>()?;
            let n = batch.num_graphs();
            total_loss += loss * n as f32;
            correct += count_correct(&logits, &batch.ys)?;
            num_graphs += n;
            debug!(epoch, step, loss, graphs = n, "step complete");
            on_event(&TrainEvent::StepComplete {
                epoch,
                step,
                loss,
                num_graphs: n,
            });
        }
        Ok(EpochStats {
            epoch,
            loss: total_loss / num_graphs as f32,
            accuracy: correct as f32 / num_graphs as f32,
            num_graphs,
        })
    }
}
