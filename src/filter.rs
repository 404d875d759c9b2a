use crate::error::{GatewayError, Result};
use crate::hash::{HashFunction, default_hash_function, estimated_false_positive_rate};
use bitvec::{bitvec, order::Lsb0, vec::BitVec};
use derive_builder::Builder;
use serde::Serialize;
use std::sync::{
    PoisonError, RwLock,
    atomic::{AtomicUsize, Ordering},
};

/// Configuration for the fingerprint filter
#[derive(Clone, Debug, Builder)]
#[builder(pattern = "owned")]
pub struct FilterConfig {
    /// Size of the bit array
    #[builder(default = "1_000_000")]
    pub bits: usize,

    /// Number of hash projections per fingerprint
    #[builder(default = "3")]
    pub num_hashes: usize,

    /// Projection function
    #[builder(default = "default_hash_function")]
    pub hash_function: HashFunction,
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bits == 0 {
            return Err(GatewayError::InvalidConfig(
                "Bit array size must be > 0".into(),
            ));
        }
        if self.bits > u32::MAX as usize {
            return Err(GatewayError::InvalidConfig(format!(
                "Bit array size must be <= {}",
                u32::MAX
            )));
        }
        if self.num_hashes == 0 {
            return Err(GatewayError::InvalidConfig(
                "Number of hashes must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Point-in-time view of a filter's load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct FilterStats {
    pub bits: usize,
    pub num_hashes: usize,
    pub inserted: usize,
    pub bits_set: usize,
    pub estimated_false_positive_rate: f64,
}

/// Bloom filter over trusted fingerprints.
///
/// The bit array sits behind a reader-writer lock: `test` takes the shared
/// side and may run from any number of request tasks at once, `add` takes the
/// exclusive side. Setting bits is monotonic, so a lock poisoned by a panicking
/// writer still guards a usable array and is recovered instead of propagated.
pub struct FingerprintFilter {
    config: FilterConfig,
    bits: RwLock<BitVec<usize, Lsb0>>,
    insert_count: AtomicUsize,
}

impl FingerprintFilter {
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;

        let bits = bitvec![0; config.bits];
        Ok(Self {
            config,
            bits: RwLock::new(bits),
            insert_count: AtomicUsize::new(0),
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    fn indices(&self, item: &[u8]) -> Result<Vec<usize>> {
        let capacity = self.config.bits;
        (self.config.hash_function)(item, self.config.num_hashes, capacity)
            .into_iter()
            .map(|h| {
                let index = h as usize;
                if index >= capacity {
                    Err(GatewayError::IndexOutOfBounds { index, capacity })
                } else {
                    Ok(index)
                }
            })
            .collect()
    }

    /// Sets the projected bits for `item`. Adding the same item twice leaves
    /// the array unchanged.
    pub fn add(&self, item: &[u8]) -> Result<()> {
        let indices = self.indices(item)?;

        let mut bits = self.bits.write().unwrap_or_else(PoisonError::into_inner);
        for idx in indices {
            bits.set(idx, true);
        }

        self.insert_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// True only if every projected bit is set. Never false for an item that
    /// was added; may be true for one that was not.
    pub fn test(&self, item: &[u8]) -> Result<bool> {
        let indices = self.indices(item)?;

        let bits = self.bits.read().unwrap_or_else(PoisonError::into_inner);
        Ok(indices.into_iter().all(|idx| bits[idx]))
    }

    /// Number of `add` calls, duplicates included.
    pub fn insert_count(&self) -> usize {
        self.insert_count.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> FilterStats {
        let bits_set = self
            .bits
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .count_ones();
        let inserted = self.insert_count();

        FilterStats {
            bits: self.config.bits,
            num_hashes: self.config.num_hashes,
            inserted,
            bits_set,
            estimated_false_positive_rate: estimated_false_positive_rate(
                inserted,
                self.config.bits,
                self.config.num_hashes,
            ),
        }
    }
}

impl std::fmt::Debug for FingerprintFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FingerprintFilter {{ bits: {}, num_hashes: {}, inserted: {} }}",
            self.config.bits,
            self.config.num_hashes,
            self.insert_count()
        )
    }
}
