//! Integrity gateway that screens payloads against a Bloom filter of
//! known-good SHA3-512 fingerprints.
//!
//! HowTo:
//!    * Fingerprint: every payload is digested with SHA3-512 on arrival.
//!    * Known-good set: a fixed-size Bloom filter is loaded once at startup
//!      with the fingerprints of the built-in seeds and, optionally, those
//!      listed in a provisioning file.
//!    * Check: the fingerprint's `k` projections are looked up in the bit
//!      array. All bits set means the payload is accepted.
//!
//! Rejection:
//!     * A miss is treated as a tamper event: it is logged, an alert is
//!       fired on a detached task, and the caller gets `403 tamper detected`
//!       without waiting on the alert.
//!
//! Obvious problems:
//!     * False Positives: a tampered payload can collide with the trusted
//!       bits and be accepted. At 1M bits, 3 projections and a handful of
//!       entries the odds are negligible, but they grow with the corpus.
//!     * Nothing here proves authenticity. The filter is a fast pre-screen,
//!       not a signature check.

#[cfg(feature = "server")]
pub mod alert;
#[cfg(feature = "server")]
pub mod api;
pub mod common;
mod error;
mod filter;
mod fingerprint;
mod hash;
pub mod known_good;
#[cfg(feature = "server")]
pub mod types;

pub use error::{GatewayError, Result};
pub use filter::{
    FilterConfig, FilterConfigBuilder, FilterConfigBuilderError, FilterStats,
    FingerprintFilter,
};
pub use fingerprint::{FINGERPRINT_LEN, Fingerprint};
pub use hash::{
    HashFunction, default_hash_function, digest_slice_hash_function,
    estimated_false_positive_rate, optimal_bit_vector_size, optimal_num_hashes,
};
#[cfg(feature = "server")]
pub use alert::{AlertSink, AlertTrigger, LogAlertSink, TamperEvent};
#[cfg(feature = "server")]
pub use types::{
    AppState, ServerConfig, ServerConfigBuilder, ServerConfigBuilderError,
};
