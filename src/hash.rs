use fnv::FnvHasher;
use murmur3::murmur3_32;
use sha3::{Digest, Sha3_512};
use std::hash::Hasher;
use std::io::Cursor;

/// A type alias for the projection function used by the fingerprint filter.
///
/// The function takes an item and computes `num_hashes` bit indices for it.
///
/// **Parameters:**
///
/// - `item: &[u8]`
///   - The bytes to project, usually a raw fingerprint.
/// - `num_hashes: usize`
///   - How many indices to compute.
/// - `capacity: usize`
///   - Size of the bit array. Every index must fall in `[0, capacity)`.
///
/// **Returns:**
///
/// - `Vec<u32>` with exactly `num_hashes` indices.
///
/// The filter checks every index against the bit array, so a custom function
/// that breaks the range contract surfaces as an error instead of a panic.
pub type HashFunction = fn(&[u8], usize, usize) -> Vec<u32>;

/// Number of 8-byte words in a SHA3-512 block.
const DIGEST_SLICES: usize = 8;

pub(crate) fn hash_murmur32(key: &[u8]) -> u32 {
    let mut cursor = Cursor::new(key);
    murmur3_32(&mut cursor, 0).expect("Failed to compute Murmur3 hash")
}

pub(crate) fn hash_fnv32(key: &[u8]) -> u32 {
    let mut hasher = FnvHasher::default();
    hasher.write(key);
    hasher.finish() as u32
}

/// Double hashing `h1 + i * h2` over MurmurHash3 and FNV-1a.
///
/// `h2` is forced odd so the stride can never be zero and successive
/// projections never collapse onto a single bit.
pub fn default_hash_function(
    item: &[u8],
    num_hashes: usize,
    capacity: usize,
) -> Vec<u32> {
    let h1 = hash_murmur32(item);
    let h2 = hash_fnv32(item) | 1;
    (0..num_hashes)
        .map(|i| h1.wrapping_add((i as u32).wrapping_mul(h2)) % capacity as u32)
        .collect()
}

/// Projects an item onto non-overlapping 8-byte slices of its SHA3-512
/// digest. Once the eight slices of a block are used up, the block is
/// digested again and slicing continues on the new block.
pub fn digest_slice_hash_function(
    item: &[u8],
    num_hashes: usize,
    capacity: usize,
) -> Vec<u32> {
    let mut block = Sha3_512::digest(item);
    let mut indices = Vec::with_capacity(num_hashes);
    let mut slice = 0;

    while indices.len() < num_hashes {
        if slice == DIGEST_SLICES {
            block = Sha3_512::digest(block);
            slice = 0;
        }
        let start = slice * 8;
        let mut word = [0u8; 8];
        word.copy_from_slice(&block[start..start + 8]);
        indices.push((u64::from_le_bytes(word) % capacity as u64) as u32);
        slice += 1;
    }
    indices
}

pub fn optimal_bit_vector_size(n: usize, fpr: f64) -> usize {
    let ln2 = std::f64::consts::LN_2;
    ((-(n as f64) * fpr.ln()) / (ln2 * ln2)).ceil() as usize
}

pub fn optimal_num_hashes(n: usize, m: usize) -> usize {
    (((m as f64 / n as f64) * std::f64::consts::LN_2).round() as usize).max(1)
}

/// `(1 - e^(-k*n/m))^k`, the classic false positive estimate.
pub fn estimated_false_positive_rate(n: usize, m: usize, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}
