use anyhow::{bail, Result};
use candle_core::{Device, Tensor};

use super::Graph;

/// Disjoint union of several graphs.
#[derive(Debug, Clone)]
pub struct GraphBatch {
    /// `(num_nodes, num_features)` node features.
    pub xs: Tensor,
    /// `(2, num_edges)` source/target node ids in the merged numbering.
    pub edge_index: Tensor,
    /// `(num_nodes,)` index of the graph each node belongs to.
    pub batch: Tensor,
    /// `(num_graphs,)` graph labels in input order.
    pub ys: Tensor,
    pub graph_sizes: Vec<usize>,
}
impl GraphBatch {
    pub fn num_graphs(&self) -> usize {
        self.graph_sizes.len()
    }
    pub fn num_nodes(&self) -> usize {
        self.graph_sizes.iter().sum()
    }
    pub fn num_edges(&self) -> Result<usize> {
        Ok(self.edge_index.dim(1)?)
    }
}

/// Merge `items` into one graph, renumbering nodes contiguously in input order.
pub fn collate(items: &[(&Graph, u32)], device: &Device) -> Result<GraphBatch> {
    let Some((first, _)) = items.first() else {
        bail!("cannot collate an empty list of graphs");
    };
    let num_features = first.num_features();

    let mut xs = Vec::new();
    let mut source = Vec::new();
    let mut target = Vec::new();
    let mut batch = Vec::new();
    let mut ys = Vec::with_capacity(items.len());
    let mut graph_sizes = Vec::with_capacity(items.len());

    let mut offset = 0u32;
    for (graph_idx, (graph, label)) in items.iter().enumerate() {
        if graph.num_features() != num_features {
            bail!(
                "graph {} has {} features; expected {}",
                graph_idx,
                graph.num_features(),
                num_features
            );
        }
        xs.extend_from_slice(graph.xs());
        for &(u, v) in graph.edges() {
            source.push(u + offset);
            target.push(v + offset);
        }
        batch.extend(std::iter::repeat(graph_idx as u32).take(graph.num_nodes()));
        ys.push(*label);
        graph_sizes.push(graph.num_nodes());
        offset += graph.num_nodes() as u32;
    }

    let num_nodes = offset as usize;
    let num_edges = source.len();
    let mut edge_index = source;
    edge_index.extend(target);

    Ok(GraphBatch {
        xs: Tensor::from_vec(xs, (num_nodes, num_features), device)?,
        edge_index: Tensor::from_vec(edge_index, (2, num_edges), device)?,
        batch: Tensor::from_vec(batch, num_nodes, device)?,
        ys: Tensor::from_vec(ys, items.len(), device)?,
        graph_sizes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(num_nodes: usize, fill: f32) -> Graph {
        let edges = (1..num_nodes as u32)
            .flat_map(|v| [(v - 1, v), (v, v - 1)])
            .collect();
        Graph::new(num_nodes, 2, vec![fill; num_nodes * 2], edges).unwrap()
    }

    #[test]
    fn preserves_node_count_and_label_order() -> Result<()> {
        let graphs = [path(3, 1.0), path(1, 2.0), path(4, 3.0)];
        let items: Vec<_> = graphs.iter().zip([5u32, 0, 3]).collect();
        let batch = collate(&items, &Device::Cpu)?;

        assert_eq!(batch.num_nodes(), 8);
        assert_eq!(batch.xs.dims(), &[8, 2]);
        assert_eq!(batch.ys.to_vec1::<u32>()?, vec![5, 0, 3]);
        assert_eq!(batch.batch.to_vec1::<u32>()?, vec![0, 0, 0, 1, 2, 2, 2, 2]);
        assert_eq!(batch.graph_sizes, vec![3, 1, 4]);
        Ok(())
    }

    #[test]
    fn offsets_edges() -> Result<()> {
        let graphs = [path(2, 0.0), path(2, 0.0)];
        let items: Vec<_> = graphs.iter().zip([0u32, 1]).collect();
        let batch = collate(&items, &Device::Cpu)?;

        assert_eq!(batch.num_edges()?, 4);
        assert_eq!(
            batch.edge_index.to_vec2::<u32>()?,
            vec![vec![0, 1, 2, 3], vec![1, 0, 3, 2]]
        );
        Ok(())
    }

    #[test]
    fn rejects_empty_and_mismatched() {
        assert!(collate(&[], &Device::Cpu).is_err());
        let a = path(2, 0.0);
        let b = Graph::new(1, 3, vec![0.0; 3], vec![]).unwrap();
        assert!(collate(&[(&a, 0), (&b, 1)], &Device::Cpu).is_err());
    }
}
