//! Known-good corpus: the built-in seeds and the optional provisioning file
//! of hex fingerprints that extends them at startup.
use crate::error::{GatewayError, Result};
use crate::filter::{FilterConfig, FingerprintFilter};
use crate::fingerprint::Fingerprint;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Payloads trusted out of the box.
pub const DEFAULT_SEEDS: [&str; 2] = ["vkykkey", "kkeyyky"];

pub fn seed_fingerprints(seeds: &[&str]) -> Vec<Fingerprint> {
    seeds.iter().map(|s| Fingerprint::of(s.as_bytes())).collect()
}

/// Parses provisioning text: one hex fingerprint per line. Blank lines and
/// lines starting with `#` are skipped; a trailing `# comment` is allowed.
pub fn parse_fingerprints(text: &str) -> Result<Vec<Fingerprint>> {
    let mut fingerprints = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let fingerprint = line.parse::<Fingerprint>().map_err(|e| match e {
            GatewayError::InvalidFingerprint { reason, .. } => {
                GatewayError::InvalidFingerprint { line: i + 1, reason }
            }
            other => other,
        })?;
        fingerprints.push(fingerprint);
    }
    Ok(fingerprints)
}

pub fn load_fingerprints(path: &Path) -> Result<Vec<Fingerprint>> {
    let text = fs::read_to_string(path)?;
    let fingerprints = parse_fingerprints(&text)?;
    debug!(
        path = %path.display(),
        count = fingerprints.len(),
        "Loaded provisioning file"
    );
    Ok(fingerprints)
}

/// Builds a filter holding `fingerprints`. Construction is deterministic:
/// the same config and corpus always yield the same membership answers.
pub fn build_filter(
    config: FilterConfig,
    fingerprints: &[Fingerprint],
) -> Result<FingerprintFilter> {
    let filter = FingerprintFilter::new(config)?;
    for fingerprint in fingerprints {
        filter.add(fingerprint.as_ref())?;
    }
    info!(
        known_good = fingerprints.len(),
        bits = filter.config().bits,
        num_hashes = filter.config().num_hashes,
        "Fingerprint filter initialized"
    );
    Ok(filter)
}

/// Seeds plus, when given, the contents of a provisioning file.
pub fn known_good_corpus(
    seeds: &[&str],
    provisioning: Option<&Path>,
) -> Result<Vec<Fingerprint>> {
    let mut corpus = seed_fingerprints(seeds);
    if let Some(path) = provisioning {
        corpus.extend(load_fingerprints(path)?);
    }
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterConfigBuilder;

    struct TempFile {
        path: std::path::PathBuf,
    }

    impl TempFile {
        fn new(test_name: &str, contents: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "tamper_gate_{}_{}.txt",
                test_name,
                rand::random::<u64>()
            ));
            fs::write(&path, contents).unwrap();
            Self { path }
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let a = Fingerprint::of(b"a");
        let b = Fingerprint::of(b"b");
        let text = format!("# provisioned\n\n{a}\n  {b}  # release build\n");

        let parsed = parse_fingerprints(&text).unwrap();
        assert_eq!(parsed, vec![a, b]);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let a = Fingerprint::of(b"a");
        let text = format!("{a}\n\nnot-hex\n");

        match parse_fingerprints(&text) {
            Err(GatewayError::InvalidFingerprint { line, .. }) => {
                assert_eq!(line, 3)
            }
            other => panic!("Expected InvalidFingerprint, got {other:?}"),
        }
    }

    #[test]
    fn test_corpus_with_provisioning_file() {
        let extra = Fingerprint::of(b"release-1.2.3.tar.gz");
        let file = TempFile::new("corpus", &format!("{extra}\n"));

        let corpus =
            known_good_corpus(&DEFAULT_SEEDS, Some(file.path.as_path())).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus[0], Fingerprint::of(b"vkykkey"));
        assert_eq!(corpus[2], extra);
    }

    #[test]
    fn test_missing_provisioning_file_is_io_error() {
        let missing = std::env::temp_dir().join("tamper_gate_does_not_exist.txt");
        assert!(matches!(
            known_good_corpus(&DEFAULT_SEEDS, Some(missing.as_path())),
            Err(GatewayError::Io(_))
        ));
    }

    #[test]
    fn test_build_filter_accepts_seeds() {
        let corpus = seed_fingerprints(&DEFAULT_SEEDS);
        let filter =
            build_filter(FilterConfigBuilder::default().build().unwrap(), &corpus)
                .unwrap();

        for seed in DEFAULT_SEEDS {
            let fp = Fingerprint::of(seed.as_bytes());
            assert!(filter.test(fp.as_ref()).unwrap());
        }
        // Raw seed bytes are not fingerprints and are not trusted.
        assert!(!filter.test(b"vkykkey").unwrap());
        assert_eq!(filter.insert_count(), 2);
    }
}
