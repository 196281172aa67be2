mod config;
pub use config::TrainConfig;

mod evaluate;
pub use evaluate::{evaluate, EvalStats};

mod trainer;
pub use trainer::{EpochStats, TrainEvent, Trainer};
