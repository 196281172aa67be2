use anyhow::{bail, Result};

/// A single graph with a dense node feature matrix and a directed edge list.
///
/// Undirected graphs carry both directions of every edge. Node ids in
/// `edges` are local to the graph (`0..num_nodes`).
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    num_nodes: usize,
    num_features: usize,
    xs: Vec<f32>,
    edges: Vec<(u32, u32)>,
}
impl Graph {
    pub fn new(
        num_nodes: usize,
        num_features: usize,
        xs: Vec<f32>,
        edges: Vec<(u32, u32)>,
    ) -> Result<Self> {
        if xs.len() != num_nodes * num_features {
            bail!(
                "feature matrix has {} entries, expected {} x {}",
                xs.len(),
                num_nodes,
                num_features
            );
        }
        if let Some(&(u, v)) = edges
            .iter()
            .find(|&&(u, v)| u as usize >= num_nodes || v as usize >= num_nodes)
        {
            bail!("edge ({}, {}) out of range for {} nodes", u, v, num_nodes);
        }
        Ok(Self {
            num_nodes,
            num_features,
            xs,
            edges,
        })
    }
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
    pub fn num_features(&self) -> usize {
        self.num_features
    }
    /// Row-major `num_nodes x num_features` features.
    pub fn xs(&self) -> &[f32] {
        &self.xs
    }
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }
    pub fn node_features(&self, node: usize) -> &[f32] {
        &self.xs[node * self.num_features..(node + 1) * self.num_features]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_feature_length() {
        assert!(Graph::new(2, 3, vec![0.0; 5], vec![]).is_err());
    }

    #[test]
    fn rejects_out_of_range_edge() {
        assert!(Graph::new(2, 1, vec![0.0; 2], vec![(0, 2)]).is_err());
    }

    #[test]
    fn node_features_are_rows() -> Result<()> {
        let graph = Graph::new(2, 2, vec![1.0, 2.0, 3.0, 4.0], vec![(0, 1), (1, 0)])?;
        assert_eq!(graph.node_features(1), &[3.0, 4.0]);
        assert_eq!(graph.num_edges(), 2);
        Ok(())
    }
}
