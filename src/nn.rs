mod traits;
pub use traits::*;
pub mod utils;

mod gcn;
pub use gcn::{Gcn, GcnConv, GcnParams};
mod pool;
pub use pool::{mean_pool, sum_pool, Readout};
