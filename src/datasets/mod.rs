mod batch;
pub use batch::*;

mod graph;
pub use graph::*;

mod loader;
pub use loader::*;

mod split;
pub use split::*;

mod traits;
pub use traits::*;

mod tu;
pub use tu::*;

mod utils;
pub use utils::*;
