// Helper method to format bytes in human-readable form
pub fn bytes2hr(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Memory footprint of a bit array, rounded up to whole bytes.
pub fn bits2hr(bits: usize) -> String {
    bytes2hr(bits.div_ceil(8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes2hr() {
        assert_eq!(bytes2hr(512), "512 bytes");
        assert_eq!(bytes2hr(2048), "2.00 KB");
        assert_eq!(bytes2hr(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_bits2hr() {
        assert_eq!(bits2hr(9), "2 bytes");
        // default filter size
        assert_eq!(bits2hr(1_000_000), "122.07 KB");
    }
}
