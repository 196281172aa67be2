use anyhow::{anyhow, bail, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{traits::Dataset, Graph};

/// Partition `0..len` into `ratio.len()` disjoint parts.
///
/// Part boundaries are `round(len * cumsum(ratio))`, the last one pinned to
/// `len`, so every part is within one element of its exact share.
pub fn split_indices(len: usize, ratio: &[f64], shuffle: bool, seed: u64) -> Result<Vec<Vec<usize>>> {
    if ratio.is_empty() {
        bail!("split ratio is empty");
    }
    if ratio.iter().any(|&r| r.is_nan() || r < 0.0) {
        bail!("split ratio must be non-negative; {:?}", ratio);
    }
    let total: f64 = ratio.iter().sum();
    if (total - 1.0).abs() > 1e-6 {
        bail!("split ratio must sum to 1.0; got {}", total);
    }

    let mut indices: Vec<usize> = (0..len).collect();
    if shuffle {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    }

    let mut parts = Vec::with_capacity(ratio.len());
    let mut cumsum = 0.0;
    let mut start = 0;
    for (k, r) in ratio.iter().enumerate() {
        cumsum += r;
        let end = if k + 1 == ratio.len() {
            len
        } else {
            ((len as f64 * cumsum).round() as usize).clamp(start, len)
        };
        parts.push(indices[start..end].to_vec());
        start = end;
    }
    Ok(parts)
}

/// View of a dataset restricted to a list of indices.
#[derive(Debug, Clone)]
pub struct Subset<'a, D> {
    dataset: &'a D,
    indices: Vec<usize>,
}
impl<'a, D: Dataset> Subset<'a, D> {
    pub fn new(dataset: &'a D, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}
impl<'a, D: Dataset> Dataset for Subset<'a, D> {
    fn len(&self) -> usize {
        self.indices.len()
    }
    fn get(&self, index: usize) -> Option<(&Graph, u32)> {
        self.indices.get(index).and_then(|&i| self.dataset.get(i))
    }
    fn num_features(&self) -> usize {
        self.dataset.num_features()
    }
    fn num_classes(&self) -> usize {
        self.dataset.num_classes()
    }
}

pub trait RandomSplit: Dataset + Sized {
    fn random_split<const N: usize>(
        &self,
        ratio: [f64; N],
        shuffle: bool,
        seed: u64,
    ) -> Result<[Subset<'_, Self>; N]> {
        let parts: Vec<_> = split_indices(self.len(), &ratio, shuffle, seed)?
            .into_iter()
            .map(|indices| Subset::new(self, indices))
            .collect();
        parts
            .try_into()
            .map_err(|_| anyhow!("failed to split into {} parts", N))
    }
}
impl<D: Dataset> RandomSplit for D {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::TuDataset;
    use std::collections::HashSet;

    #[test]
    fn parts_are_disjoint_and_cover() -> Result<()> {
        let parts = split_indices(101, &[0.7, 0.2, 0.1], true, 7)?;
        let mut seen = HashSet::new();
        for part in &parts {
            for &i in part {
                assert!(seen.insert(i), "index {} appears twice", i);
            }
        }
        assert_eq!(seen.len(), 101);
        for (part, r) in parts.iter().zip([0.7, 0.2, 0.1]) {
            assert!((part.len() as f64 - 101.0 * r).abs() <= 1.0);
        }
        Ok(())
    }

    #[test]
    fn exact_sizes_for_600() -> Result<()> {
        let parts = split_indices(600, &[0.8, 0.2], true, 42)?;
        assert_eq!(parts[0].len(), 480);
        assert_eq!(parts[1].len(), 120);
        Ok(())
    }

    #[test]
    fn same_seed_same_partition() -> Result<()> {
        let a = split_indices(50, &[0.5, 0.5], true, 3)?;
        let b = split_indices(50, &[0.5, 0.5], true, 3)?;
        let c = split_indices(50, &[0.5, 0.5], true, 4)?;
        assert_eq!(a, b);
        assert_ne!(a, c);
        Ok(())
    }

    #[test]
    fn no_shuffle_keeps_order() -> Result<()> {
        let parts = split_indices(5, &[0.6, 0.4], false, 0)?;
        assert_eq!(parts, vec![vec![0, 1, 2], vec![3, 4]]);
        Ok(())
    }

    #[test]
    fn rejects_bad_ratio() {
        assert!(split_indices(10, &[0.5, 0.4], true, 0).is_err());
        assert!(split_indices(10, &[1.2, -0.2], true, 0).is_err());
        assert!(split_indices(10, &[], true, 0).is_err());
        assert!(split_indices(10, &[f64::NAN, 1.0], true, 0).is_err());
    }

    #[test]
    fn subset_remaps_indices() -> Result<()> {
        let graphs = (0..6)
            .map(|i| Graph::new(i + 1, 1, vec![i as f32; i + 1], vec![]))
            .collect::<Result<Vec<_>>>()?;
        let dataset = TuDataset::from_graphs("toy", graphs, vec![0, 1, 2, 0, 1, 2])?;
        let [train, val] = dataset.random_split([0.5, 0.5], true, 9)?;

        for subset in [&train, &val] {
            assert_eq!(subset.num_features(), 1);
            assert_eq!(subset.num_classes(), 3);
            for (i, &idx) in subset.indices().iter().enumerate() {
                let (graph, label) = subset.get(i).unwrap();
                let (expected, expected_label) = dataset.get(idx).unwrap();
                assert_eq!(graph, expected);
                assert_eq!(label, expected_label);
            }
            assert!(subset.get(subset.len()).is_none());
        }
        Ok(())
    }
}
