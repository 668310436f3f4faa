//! Symbol sources: weighted random draws and scripted replays

use rand::prelude::*;

use bs_core::{BsError, BsResult};

use crate::symbols::{SymbolCatalog, SymbolId};

/// Supplies the next occupant for a cell
pub trait SymbolSource {
    fn draw(&mut self) -> SymbolId;
}

/// Boxed source owned by the engine
pub type BoxedSymbolSource = Box<dyn SymbolSource + Send>;

/// Independent weighted draws over the catalog
///
/// Every call is an i.i.d. sample with probability proportional to weight.
/// There is no reel strip and no memory between calls.
pub struct WeightedSelector<R: Rng = StdRng> {
    weights: Vec<f64>,
    total: f64,
    /// Index returned when float drift walks past the end of the list
    fallback: usize,
    rng: R,
}

impl WeightedSelector<StdRng> {
    /// Selector over a catalog's own weights, seeded or from OS entropy
    pub fn for_catalog(catalog: &SymbolCatalog, seed: Option<u64>) -> BsResult<Self> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self::new(catalog.len(), catalog.weights(), rng)
    }
}

impl<R: Rng> WeightedSelector<R> {
    /// `weights` must be parallel to a catalog of `catalog_len` entries
    pub fn new(catalog_len: usize, weights: Vec<f64>, rng: R) -> BsResult<Self> {
        if weights.len() != catalog_len {
            return Err(BsError::InvalidConfiguration(format!(
                "weight list has {} entries for a catalog of {}",
                weights.len(),
                catalog_len
            )));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(BsError::InvalidConfiguration(format!(
                "weights must be finite and non-negative, got {}",
                bad
            )));
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(BsError::InvalidConfiguration(
                "total weight must be positive".into(),
            ));
        }

        // Never fall back onto a zero-weight entry
        let fallback = weights
            .iter()
            .rposition(|&w| w > 0.0)
            .unwrap_or(weights.len() - 1);

        Ok(Self {
            weights,
            total,
            fallback,
            rng,
        })
    }

    pub fn total_weight(&self) -> f64 {
        self.total
    }

    /// Draw one symbol id
    pub fn pick(&mut self) -> SymbolId {
        let mut remainder = self.rng.random::<f64>() * self.total;
        for (idx, &weight) in self.weights.iter().enumerate() {
            if remainder < weight {
                return idx as SymbolId;
            }
            remainder -= weight;
        }
        self.fallback as SymbolId
    }
}

impl<R: Rng + Send> SymbolSource for WeightedSelector<R> {
    fn draw(&mut self) -> SymbolId {
        self.pick()
    }
}

/// Replays a fixed sequence of ids, wrapping at the end
///
/// Used to reproduce recorded sessions and to drive exact boards in tests.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    sequence: Vec<SymbolId>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(sequence: Vec<SymbolId>) -> BsResult<Self> {
        if sequence.is_empty() {
            return Err(BsError::InvalidConfiguration(
                "scripted source needs at least one symbol".into(),
            ));
        }
        Ok(Self {
            sequence,
            cursor: 0,
        })
    }

    /// Script by symbol name
    pub fn from_names(catalog: &SymbolCatalog, names: &[&str]) -> BsResult<Self> {
        let ids = names
            .iter()
            .map(|name| catalog.id_of(name))
            .collect::<BsResult<Vec<_>>>()?;
        Self::new(ids)
    }

    /// Number of draws served so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl SymbolSource for ScriptedSource {
    fn draw(&mut self) -> SymbolId {
        let id = self.sequence[self.cursor % self.sequence.len()];
        self.cursor += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_distribution_follows_weights() {
        let weights = vec![1.0, 0.0, 3.0, 6.0];
        let mut selector =
            WeightedSelector::new(4, weights.clone(), ChaCha8Rng::seed_from_u64(7)).unwrap();

        const N: usize = 100_000;
        let mut counts = [0usize; 4];
        for _ in 0..N {
            counts[selector.pick() as usize] += 1;
        }

        // Zero weight is never drawn
        assert_eq!(counts[1], 0);

        let total: f64 = weights.iter().sum();
        for (idx, &w) in weights.iter().enumerate() {
            let expected = w / total;
            let observed = counts[idx] as f64 / N as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "symbol {}: expected {:.3}, observed {:.3}",
                idx,
                expected,
                observed
            );
        }
    }

    #[test]
    fn test_trailing_zero_weight_never_drawn() {
        let mut selector =
            WeightedSelector::new(3, vec![1.0, 1.0, 0.0], ChaCha8Rng::seed_from_u64(1)).unwrap();
        for _ in 0..10_000 {
            assert_ne!(selector.pick(), 2);
        }
    }

    #[test]
    fn test_invalid_weights() {
        let rng = || ChaCha8Rng::seed_from_u64(0);
        assert!(WeightedSelector::new(3, vec![1.0, 1.0], rng()).is_err());
        assert!(WeightedSelector::new(2, vec![0.0, 0.0], rng()).is_err());
        assert!(WeightedSelector::new(2, vec![1.0, -1.0], rng()).is_err());
        assert!(WeightedSelector::new(2, vec![1.0, f64::NAN], rng()).is_err());
    }

    #[test]
    fn test_seeded_selectors_agree() {
        let catalog = SymbolCatalog::standard();
        let mut a = WeightedSelector::for_catalog(&catalog, Some(99)).unwrap();
        let mut b = WeightedSelector::for_catalog(&catalog, Some(99)).unwrap();
        let left: Vec<_> = (0..50).map(|_| a.draw()).collect();
        let right: Vec<_> = (0..50).map(|_| b.draw()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_scripted_source_wraps() {
        let mut source = ScriptedSource::new(vec![3, 1]).unwrap();
        assert_eq!(
            (0..5).map(|_| source.draw()).collect::<Vec<_>>(),
            vec![3, 1, 3, 1, 3]
        );
        assert_eq!(source.draws(), 5);
        assert!(ScriptedSource::new(Vec::new()).is_err());
    }
}
