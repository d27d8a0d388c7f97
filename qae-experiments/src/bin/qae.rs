//! `qae` command-line driver
//!
//! ```text
//! qae train --qubits 3 --latent 1 --state ghz --optimizer spsa
//! qae entanglement --seed 42
//! qae classical --qubits 2,4,6
//! qae summary --markdown results/summary.md
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use qae_core::{
    train, AutoencoderConfig, QuantumState, DEFAULT_ITERATION_BUDGET, DEFAULT_REPETITIONS,
};
use qae_experiments::{
    record_training_run, run_classical_experiment, save_markdown_report, ClassicalConfig,
    EntanglementExperiment, ResultLog, BELL_METHOD, GHZ_METHOD, PRODUCT_METHOD, RANDOM_METHOD,
    ZERO_METHOD,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "qae")]
#[command(about = "Quantum autoencoder testbed")]
#[command(version)]
struct Cli {
    /// Directory for JSON result records and charts
    #[arg(long, global = true, default_value = "results/experiments")]
    results_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InputState {
    Bell,
    Ghz,
    Product,
    Zero,
    Random,
}

impl InputState {
    /// Record method name, matching the entanglement experiment's labels.
    fn method(self) -> &'static str {
        match self {
            InputState::Bell => BELL_METHOD,
            InputState::Ghz => GHZ_METHOD,
            InputState::Product => PRODUCT_METHOD,
            InputState::Zero => ZERO_METHOD,
            InputState::Random => RANDOM_METHOD,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Train one autoencoder and log the result
    Train {
        #[arg(short, long, default_value_t = 2)]
        qubits: usize,
        #[arg(short, long, default_value_t = 1)]
        latent: usize,
        #[arg(short, long, default_value_t = DEFAULT_REPETITIONS)]
        reps: usize,
        /// full, linear, reverse_linear, circular or none
        #[arg(short, long, default_value = "full")]
        entanglement: String,
        /// nelder_mead or spsa
        #[arg(short, long, default_value = "nelder_mead")]
        optimizer: String,
        /// Maximum objective evaluations
        #[arg(short, long, default_value_t = DEFAULT_ITERATION_BUDGET)]
        budget: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = InputState::Bell)]
        state: InputState,
        /// Method name for the result record
        #[arg(long)]
        method: Option<String>,
        /// Write the loss curve as SVG
        #[arg(long)]
        plot: Option<PathBuf>,
    },

    /// Bell vs GHZ vs product-state compression
    Entanglement {
        /// nelder_mead or spsa
        #[arg(short, long, default_value = "nelder_mead")]
        optimizer: String,
        #[arg(long)]
        seed: Option<u64>,
        /// Override the per-state evaluation budgets
        #[arg(short, long)]
        budget: Option<usize>,
    },

    /// Classical dense autoencoder sweep over qubit counts
    Classical {
        /// Comma-separated qubit counts
        #[arg(short, long, value_delimiter = ',', default_values_t = vec![2usize, 4, 6, 8, 10, 12])]
        qubits: Vec<usize>,
        #[arg(long, default_value_t = 16)]
        latent: usize,
        #[arg(long, default_value_t = 300)]
        epochs: usize,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print logged results, optionally writing a Markdown report
    Summary {
        #[arg(long)]
        markdown: Option<PathBuf>,
    },
}

fn input_state(kind: InputState, qubits: usize, seed: Option<u64>) -> Result<QuantumState> {
    Ok(match kind {
        InputState::Bell => {
            if qubits != 2 {
                bail!("the Bell state needs --qubits 2, got {qubits}");
            }
            QuantumState::bell()
        }
        InputState::Ghz => QuantumState::ghz(qubits),
        InputState::Product => QuantumState::uniform(qubits),
        InputState::Zero => QuantumState::zero(qubits),
        InputState::Random => {
            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            QuantumState::random(qubits, &mut rng)
        }
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let log = ResultLog::new(&cli.results_dir)
        .with_context(|| format!("opening results directory {}", cli.results_dir.display()))?;

    match cli.command {
        Commands::Train {
            qubits,
            latent,
            reps,
            entanglement,
            optimizer,
            budget,
            seed,
            state,
            method,
            plot,
        } => {
            let mut config = AutoencoderConfig::new(qubits, latent)
                .with_repetitions(reps)
                .with_budget(budget)
                .with_names(&entanglement, &optimizer)?;
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            config.validate()?;

            let input = input_state(state, qubits, seed)?;
            let result = train(config, input)?;
            let method = method.unwrap_or_else(|| state.method().to_string());
            let path = record_training_run(&log, &method, &result, plot.as_deref())?;

            println!(
                "{method}: fidelity {:.6} ({}, {} evaluations, {:.2}s) -> {}",
                result.fidelity(),
                result.status,
                result.evaluations,
                result.elapsed.as_secs_f64(),
                path.display()
            );
        }

        Commands::Entanglement {
            optimizer,
            seed,
            budget,
        } => {
            let mut experiment =
                EntanglementExperiment::default().with_optimizer(optimizer.parse()?);
            if let Some(seed) = seed {
                experiment = experiment.with_seed(seed);
            }
            if let Some(budget) = budget {
                experiment = experiment.with_budget(budget);
            }
            for (label, result) in experiment.run(&log)? {
                println!("{label}: fidelity {:.6} ({})", result.fidelity(), result.status);
            }
        }

        Commands::Classical {
            qubits,
            latent,
            epochs,
            seed,
        } => {
            let mut config = ClassicalConfig::default()
                .with_qubit_range(qubits)
                .with_latent_dim(latent)
                .with_epochs(epochs);
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            for outcome in run_classical_experiment(&config, &log)? {
                println!(
                    "{} qubits: test fidelity {:.4}",
                    outcome.qubits, outcome.fidelity
                );
            }
        }

        Commands::Summary { markdown } => {
            let records = log.summary()?;
            if records.is_empty() {
                println!("no results in {}", log.dir().display());
            }
            for r in &records {
                println!(
                    "{:<28} q={:<3} l={:<3} fidelity={:.6} time={:.2}s",
                    r.method, r.qubits, r.latent, r.fidelity, r.training_time
                );
            }
            if let Some(path) = markdown {
                save_markdown_report(&records, &path)?;
                println!("report written to {}", path.display());
            }
        }
    }

    Ok(())
}
