use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf, process::ExitCode};
use tamper_gate::{
    FilterConfigBuilder, Fingerprint, common::bits2hr,
    estimated_false_positive_rate,
    known_good::{DEFAULT_SEEDS, build_filter, known_good_corpus},
    optimal_bit_vector_size, optimal_num_hashes,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SHA3-512 fingerprint of each file, one per line
    ///
    /// The output can be used directly as a provisioning file.
    Fingerprint {
        /// Files to fingerprint
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Screen a file the same way the server screens a request body
    Check {
        /// File to check
        file: PathBuf,

        /// Provisioning file with extra known-good fingerprints
        #[arg(short, long)]
        known_good: Option<PathBuf>,

        /// Size of the bit array
        #[arg(short, long, default_value = "1000000")]
        bits: usize,

        /// Number of hash projections
        #[arg(long, default_value = "3")]
        hashes: usize,
    },

    /// Suggest filter parameters for an expected corpus size
    Params {
        /// Expected number of known-good fingerprints
        #[arg(short, long)]
        elements: usize,

        /// Bit array size to evaluate
        #[arg(short, long, default_value = "1000000")]
        bits: usize,

        /// Number of hash projections to evaluate
        #[arg(long, default_value = "3")]
        hashes: usize,

        /// Target false positive rate for the suggestion (between 0 and 1)
        #[arg(short, long, default_value = "0.001")]
        fpr: f64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Commands::Fingerprint { files } => {
            for file in files {
                let payload = fs::read(&file)?;
                println!("{}  # {}", Fingerprint::of(&payload), file.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            file,
            known_good,
            bits,
            hashes,
        } => {
            let config = FilterConfigBuilder::default()
                .bits(bits)
                .num_hashes(hashes)
                .build()?;
            let corpus = known_good_corpus(&DEFAULT_SEEDS, known_good.as_deref())?;
            let filter = build_filter(config, &corpus)?;

            let fingerprint = Fingerprint::of(&fs::read(&file)?);
            if filter.test(fingerprint.as_ref())? {
                println!("clean: {}", file.display());
                Ok(ExitCode::SUCCESS)
            } else {
                println!("tamper detected: {} ({})", file.display(), fingerprint.short());
                Ok(ExitCode::from(2))
            }
        }
        Commands::Params {
            elements,
            bits,
            hashes,
            fpr,
        } => {
            if elements == 0 {
                return Err("--elements must be > 0".into());
            }
            if fpr <= 0.0 || fpr >= 1.0 {
                return Err("--fpr must be between 0 and 1".into());
            }

            let estimate = estimated_false_positive_rate(elements, bits, hashes);
            println!("Configured filter:");
            println!("  bits:              {} ({})", bits, bits2hr(bits));
            println!("  hash projections:  {hashes}");
            println!("  estimated FPR:     {:.6}%", estimate * 100.0);

            let suggested_bits = optimal_bit_vector_size(elements, fpr);
            let suggested_hashes = optimal_num_hashes(elements, suggested_bits);
            println!("Suggested for {:.4}% at {} elements:", fpr * 100.0, elements);
            println!(
                "  bits:              {} ({})",
                suggested_bits,
                bits2hr(suggested_bits)
            );
            println!("  hash projections:  {suggested_hashes}");
            Ok(ExitCode::SUCCESS)
        }
    }
}
