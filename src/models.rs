mod utils;

mod graph_classifier;
pub use graph_classifier::{GraphClassifier, ModelConfig};
