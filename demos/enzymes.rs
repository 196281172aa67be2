use candle_core::Device;
use tracing_subscriber::EnvFilter;

use candle_graph_classification::datasets::{Dataset, RandomSplit, TuDataset};
use candle_graph_classification::models::{GraphClassifier, ModelConfig};
use candle_graph_classification::training::{evaluate, TrainConfig, TrainEvent, Trainer};

// cargo run --example enzymes
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let device = Device::cuda_if_available(0)?;

    // load dataset
    let dataset = TuDataset::new("datasets/ENZYMES", "ENZYMES")?;
    let [train, val] = dataset.random_split([0.8, 0.2], true, 42)?;

    // create a GCN model
    let model = GraphClassifier::new(
        &ModelConfig {
            in_dim: dataset.num_features(),
            hidden_dim: 64,
            num_layers: 3,
            num_classes: dataset.num_classes(),
            ..Default::default()
        },
        &device,
    )?;

    // training loop
    let config = TrainConfig {
        epochs: 50,
        batch_size: 512,
        ..Default::default()
    };
    let batch_size = config.batch_size;
    let mut trainer = Trainer::new(&model, config, &device)?;
    trainer.fit_with(&train, |event| {
        if let TrainEvent::EpochComplete(stats) = event {
            println!(
                "Epoch {:05} | Loss: {:.4} | Accuracy: {:.4}",
                stats.epoch, stats.loss, stats.accuracy
            );
        }
    })?;

    let stats = evaluate(&model, &val, batch_size, &device)?;
    println!("Validation Accuracy: {:.4}", stats.accuracy);
    Ok(())
}
