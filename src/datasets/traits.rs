use super::Graph;

/// Read-only, indexable collection of labeled graphs.
pub trait Dataset {
    fn len(&self) -> usize;
    fn get(&self, index: usize) -> Option<(&Graph, u32)>;
    fn num_features(&self) -> usize;
    fn num_classes(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
