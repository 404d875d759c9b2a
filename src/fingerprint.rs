//! Content fingerprints: SHA3-512 digests of raw payloads.
use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_512};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of a SHA3-512 digest.
pub const FINGERPRINT_LEN: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(#[serde(with = "hex_bytes")] [u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Digests the whole payload.
    pub fn of(payload: &[u8]) -> Self {
        let digest = Sha3_512::digest(payload);
        let mut bytes = [0u8; FINGERPRINT_LEN];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 bytes in hex, enough to correlate log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

impl FromStr for Fingerprint {
    type Err = GatewayError;

    /// Parses 128 hex characters. The line number of the error is left at 0;
    /// callers reading files fill it in.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; FINGERPRINT_LEN];
        hex::decode_to_slice(s.trim(), &mut bytes).map_err(|e| {
            GatewayError::InvalidFingerprint {
                line: 0,
                reason: e.to_string(),
            }
        })?;
        Ok(Self(bytes))
    }
}

mod hex_bytes {
    use super::FINGERPRINT_LEN;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        bytes: &[u8; FINGERPRINT_LEN],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[u8; FINGERPRINT_LEN], D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut bytes = [0u8; FINGERPRINT_LEN];
        hex::decode_to_slice(&s, &mut bytes).map_err(D::Error::custom)?;
        Ok(bytes)
    }
}
