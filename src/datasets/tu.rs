use std::{
    fs::{create_dir_all, File},
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{anyhow, bail, Result};
use itertools::{Itertools, MinMaxResult};
use polars::{
    io::{
        parquet::{read::ParquetReader, write::ParquetWriter},
        SerReader,
    },
    prelude::{df, DataFrame, DataType, NamedFrom, NamedFromOwned, Series},
};
use regex::Regex;
use tracing::info;

use super::{download_and_extract, traits::Dataset, Graph};

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(
        File::open(path).map_err(|e| anyhow!("failed to open {}: {}", path.display(), e))?,
    );
    let mut lines = Vec::new();
    for buf in reader.lines() {
        let line = buf?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn parse_ints(path: &Path) -> Result<Vec<i64>> {
    read_lines(path)?
        .iter()
        .map(|line| {
            line.trim()
                .parse::<i64>()
                .map_err(|e| anyhow!("{}: failed to parse {:?}; {}", path.display(), line, e))
        })
        .collect()
}

fn shift_to_zero(values: &[i64]) -> (Vec<u32>, usize) {
    let (min, max) = match values.iter().minmax() {
        MinMaxResult::NoElements => return (Vec::new(), 0),
        MinMaxResult::OneElement(&v) => (v, v),
        MinMaxResult::MinMax(&lo, &hi) => (lo, hi),
    };
    let shifted = values.iter().map(|&v| (v - min) as u32).collect();
    (shifted, (max - min + 1) as usize)
}

/// Graph classification benchmark in the TU Dortmund text format.
///
/// Node features are the node attributes when the dataset ships them,
/// otherwise one-hot node labels, otherwise a constant `1.0`.
#[derive(Debug, Clone)]
pub struct TuDataset {
    name: String,
    graphs: Vec<Graph>,
    labels: Vec<u32>,
    num_features: usize,
    num_classes: usize,
}
impl TuDataset {
    const URL: &'static str = "https://www.chrsmrrs.de/graphkerneldatasets";

    /// Downloads and processes `name` under `root` on first use, then loads it.
    pub fn new<P: AsRef<Path>>(root: P, name: &str) -> Result<Self> {
        Self::prepare_data(root.as_ref(), name)?;
        Self::load(root, name)
    }

    pub fn from_graphs(name: &str, graphs: Vec<Graph>, labels: Vec<u32>) -> Result<Self> {
        if graphs.len() != labels.len() {
            bail!("{} graphs but {} labels", graphs.len(), labels.len());
        }
        let num_features = graphs.first().map(|g| g.num_features()).unwrap_or(0);
        if let Some(idx) = graphs.iter().position(|g| g.num_features() != num_features) {
            bail!("graph {} has a different feature width", idx);
        }
        let num_classes = labels.iter().max().map(|&m| m as usize + 1).unwrap_or(0);
        Ok(Self {
            name: name.to_owned(),
            graphs,
            labels,
            num_features,
            num_classes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn graphs(&self) -> &[Graph] {
        &self.graphs
    }
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn prepare_data<P: AsRef<Path>>(root: P, name: &str) -> Result<()> {
        let raw = root.as_ref().join("raw");
        if !raw.join(name).join(format!("{name}_A.txt")).exists() {
            create_dir_all(&raw)?;
            download_and_extract(&format!("{}/{}.zip", Self::URL, name), &raw)?;
        }
        let processed = root.as_ref().join("processed").join(name);
        if !processed.join("graphs.parquet").exists() {
            create_dir_all(&processed)?;
            let (mut graph_df, mut node_df, mut edge_df) = Self::process(&raw.join(name), name)?;
            // graphs.parquet is written last and marks a complete cache
            ParquetWriter::new(File::create(processed.join("nodes.parquet"))?)
                .finish(&mut node_df)?;
            ParquetWriter::new(File::create(processed.join("edges.parquet"))?)
                .finish(&mut edge_df)?;
            ParquetWriter::new(File::create(processed.join("graphs.parquet"))?)
                .finish(&mut graph_df)?;
            info!(
                dataset = name,
                graphs = graph_df.height(),
                nodes = node_df.height(),
                edges = edge_df.height(),
                "processed dataset"
            );
        }
        Ok(())
    }

    /// Converts the raw text files in `dir` into graph, node and edge tables.
    pub fn process(dir: &Path, name: &str) -> Result<(DataFrame, DataFrame, DataFrame)> {
        let file = |suffix: &str| dir.join(format!("{name}_{suffix}.txt"));

        let graph_indicator: Vec<u32> = parse_ints(&file("graph_indicator"))?
            .into_iter()
            .map(|g| {
                if g < 1 {
                    Err(anyhow!("graph ids are 1-based; got {}", g))
                } else {
                    Ok((g - 1) as u32)
                }
            })
            .collect::<Result<_>>()?;
        let num_nodes = graph_indicator.len();

        let (labels, _) = shift_to_zero(&parse_ints(&file("graph_labels"))?);
        let graph_df = df! { "label" => labels }?;

        let regex = Regex::new(r"^\s*(\d+)\s*,\s*(\d+)\s*$")?;
        let mut source = Vec::new();
        let mut target = Vec::new();
        for line in read_lines(&file("A"))? {
            let c = regex
                .captures(&line)
                .ok_or_else(|| anyhow!("failed to parse edge; {:?}", line))?;
            let u: u32 = c[1].parse()?;
            let v: u32 = c[2].parse()?;
            if u == 0 || v == 0 || u as usize > num_nodes || v as usize > num_nodes {
                bail!("edge ({}, {}) out of range for {} nodes", u, v, num_nodes);
            }
            source.push(u - 1);
            target.push(v - 1);
        }
        let edge_df = df! {
            "source" => source,
            "target" => target,
        }?;

        let xs = if file("node_attributes").exists() {
            let mut xs: Vec<Vec<f32>> = Vec::new();
            for (row, line) in read_lines(&file("node_attributes"))?.iter().enumerate() {
                let values = line
                    .split(',')
                    .map(|s| s.trim().parse::<f32>())
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                if xs.is_empty() {
                    xs = vec![Vec::with_capacity(num_nodes); values.len()];
                }
                if values.len() != xs.len() {
                    bail!("node {} has {} attributes; expected {}", row, values.len(), xs.len());
                }
                for (col, x) in xs.iter_mut().zip(values) {
                    col.push(x);
                }
            }
            xs
        } else if file("node_labels").exists() {
            let (node_labels, width) = shift_to_zero(&parse_ints(&file("node_labels"))?);
            let mut xs = vec![vec![0.0f32; node_labels.len()]; width];
            for (node, &label) in node_labels.iter().enumerate() {
                xs[label as usize][node] = 1.0;
            }
            xs
        } else {
            vec![vec![1.0f32; num_nodes]]
        };
        if let Some(col) = xs.iter().find(|col| col.len() != num_nodes) {
            bail!("{} node feature rows for {} nodes", col.len(), num_nodes);
        }

        let mut node_df = df! { "graph" => graph_indicator }?;
        for (i, x) in xs.into_iter().enumerate() {
            node_df.with_column(Series::from_vec(&format!("xs[{}]", i), x))?;
        }
        Ok((graph_df, node_df, edge_df))
    }

    pub fn load<P: AsRef<Path>>(root: P, name: &str) -> Result<Self> {
        let processed = root.as_ref().join("processed").join(name);
        let read = |table: &str| -> Result<DataFrame> {
            Ok(ParquetReader::new(File::open(processed.join(table))?).finish()?)
        };
        let graph_df = read("graphs.parquet")?;
        let node_df = read("nodes.parquet")?;
        let edge_df = read("edges.parquet")?;
        let dataset = Self::from_frames(name, &graph_df, &node_df, &edge_df)?;
        info!(
            dataset = name,
            graphs = dataset.len(),
            features = dataset.num_features,
            classes = dataset.num_classes,
            "loaded dataset"
        );
        Ok(dataset)
    }

    pub fn from_frames(
        name: &str,
        graph_df: &DataFrame,
        node_df: &DataFrame,
        edge_df: &DataFrame,
    ) -> Result<Self> {
        let u32_column = |df: &DataFrame, col: &str| -> Result<Vec<u32>> {
            let series = df.column(col)?.cast(&DataType::UInt32)?;
            let values = series.u32()?.into_no_null_iter().collect();
            Ok(values)
        };
        let labels = u32_column(graph_df, "label")?;
        let graph_of = u32_column(node_df, "graph")?;
        let source = u32_column(edge_df, "source")?;
        let target = u32_column(edge_df, "target")?;
        let num_graphs = labels.len();

        // nodes of a graph are contiguous and graphs appear in order
        let mut offsets = vec![0usize; num_graphs + 1];
        for (node, &g) in graph_of.iter().enumerate() {
            let g = g as usize;
            if g >= num_graphs {
                bail!("node {} belongs to unknown graph {}", node, g);
            }
            if node > 0 && (g as u32) < graph_of[node - 1] {
                bail!("graph indicator is not sorted at node {}", node);
            }
            offsets[g + 1] += 1;
        }
        for g in 0..num_graphs {
            offsets[g + 1] += offsets[g];
        }

        let feature_cols: Vec<String> = node_df
            .get_column_names()
            .into_iter()
            .filter(|col| col.starts_with("xs["))
            .map(|col| col.to_owned())
            .collect();
        let num_features = feature_cols.len();
        let mut columns = Vec::with_capacity(num_features);
        for col in &feature_cols {
            let series = node_df.column(col)?.cast(&DataType::Float32)?;
            let values: Vec<f32> = series.f32()?.into_no_null_iter().collect();
            columns.push(values);
        }

        let mut edges = vec![Vec::new(); num_graphs];
        for (&u, &v) in source.iter().zip(&target) {
            let (u, v) = (u as usize, v as usize);
            if u >= graph_of.len() || v >= graph_of.len() {
                bail!("edge ({}, {}) refers to a missing node", u, v);
            }
            let g = graph_of[u] as usize;
            if graph_of[v] as usize != g {
                bail!("edge ({}, {}) crosses graphs {} and {}", u, v, g, graph_of[v]);
            }
            let base = offsets[g];
            edges[g].push(((u - base) as u32, (v - base) as u32));
        }

        let mut graphs = Vec::with_capacity(num_graphs);
        for (g, edges) in edges.into_iter().enumerate() {
            let (start, end) = (offsets[g], offsets[g + 1]);
            let mut xs = Vec::with_capacity((end - start) * num_features);
            for node in start..end {
                xs.extend(columns.iter().map(|col| col[node]));
            }
            graphs.push(Graph::new(end - start, num_features, xs, edges)?);
        }
        Self::from_graphs(name, graphs, labels)
    }
}

impl Dataset for TuDataset {
    fn len(&self) -> usize {
        self.graphs.len()
    }
    fn get(&self, index: usize) -> Option<(&Graph, u32)> {
        Some((self.graphs.get(index)?, self.labels[index]))
    }
    fn num_features(&self) -> usize {
        self.num_features
    }
    fn num_classes(&self) -> usize {
        self.num_classes
    }
}
