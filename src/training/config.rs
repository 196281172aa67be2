use crate::datasets::LoaderParams;

#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Reshuffle the training set every epoch.
    pub shuffle: bool,
    pub seed: u64,
}
impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 512,
            learning_rate: 1e-3,
            shuffle: false,
            seed: 0,
        }
    }
}
impl TrainConfig {
    pub fn loader_params(&self) -> LoaderParams {
        LoaderParams {
            batch_size: self.batch_size,
            shuffle: self.shuffle,
            seed: self.seed,
            drop_last: false,
        }
    }
}
