use anyhow::Result;
use candle_core::Device;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use candle_graph_classification::datasets::{Dataset, Graph, RandomSplit, TuDataset};
use candle_graph_classification::models::{GraphClassifier, ModelConfig};
use candle_graph_classification::training::{evaluate, TrainConfig, Trainer};

// ENZYMES-shaped: 600 graphs, 18 features, 6 classes, random ring-ish graphs
fn synthetic_enzymes() -> Result<TuDataset> {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut graphs = Vec::new();
    let mut labels = Vec::new();
    for i in 0..600 {
        let num_nodes = rng.gen_range(2..40);
        let xs = (0..num_nodes * 18).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let mut edges = Vec::new();
        for v in 1..num_nodes as u32 {
            let u = rng.gen_range(0..v);
            edges.push((u, v));
            edges.push((v, u));
        }
        graphs.push(Graph::new(num_nodes, 18, xs, edges)?);
        labels.push(i % 6);
    }
    TuDataset::from_graphs("synthetic", graphs, labels)
}

#[test]
fn split_matches_requested_ratio() -> Result<()> {
    let dataset = synthetic_enzymes()?;
    let [train, val] = dataset.random_split([0.8, 0.2], true, 42)?;
    assert_eq!(train.len(), 480);
    assert_eq!(val.len(), 120);

    let mut all: Vec<usize> = train.indices().iter().chain(val.indices()).copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..600).collect::<Vec<_>>());

    let [again, _] = dataset.random_split([0.8, 0.2], true, 42)?;
    assert_eq!(train.indices(), again.indices());
    Ok(())
}

#[test]
fn one_epoch_gives_finite_loss() -> Result<()> {
    let device = Device::Cpu;
    let dataset = synthetic_enzymes()?;
    let [train, val] = dataset.random_split([0.8, 0.2], true, 42)?;

    let model = GraphClassifier::new(&ModelConfig::default(), &device)?;
    let config = TrainConfig {
        epochs: 1,
        ..Default::default()
    };
    let history = Trainer::new(&model, config, &device)?.fit(&train)?;

    assert_eq!(history.len(), 1);
    let stats = history[0];
    assert!(stats.loss.is_finite());
    assert!((0.0..=1.0).contains(&stats.accuracy));
    assert_eq!(stats.num_graphs, 480);

    let eval = evaluate(&model, &val, 512, &device)?;
    assert_eq!(eval.total, 120);
    assert!(eval.loss.is_finite());
    assert!((0.0..=1.0).contains(&eval.accuracy));
    Ok(())
}

#[test]
fn zero_epochs_leave_parameters_unchanged() -> Result<()> {
    let device = Device::Cpu;
    let dataset = synthetic_enzymes()?;
    let model = GraphClassifier::new(&ModelConfig::default(), &device)?;
    let snapshot = |model: &GraphClassifier| -> Result<Vec<Vec<f32>>> {
        let mut data: Vec<_> = model.varmap().data().lock().unwrap().clone().into_iter().collect();
        data.sort_by(|a, b| a.0.cmp(&b.0));
        data.into_iter()
            .map(|(_, var)| -> Result<Vec<f32>> {
                Ok(var.as_tensor().flatten_all()?.to_vec1::<f32>()?)
            })
            .collect()
    };
    let before = snapshot(&model)?;

    let config = TrainConfig {
        epochs: 0,
        ..Default::default()
    };
    let history = Trainer::new(&model, config, &device)?.fit(&dataset)?;
    assert!(history.is_empty());
    assert_eq!(snapshot(&model)?, before);

    let config = TrainConfig {
        epochs: 1,
        ..Default::default()
    };
    Trainer::new(&model, config, &device)?.fit(&dataset)?;
    assert_ne!(snapshot(&model)?, before);
    Ok(())
}
