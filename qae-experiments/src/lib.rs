//! # QAE Experiments
//!
//! Outer layer around `qae-core`: result persistence, charts, the classical
//! dense-autoencoder baseline and the experiment drivers behind the `qae` CLI.
//!
//! ## Modules
//!
//! - `results`: one JSON record per `(method, qubits, latent)`
//! - `plot`: SVG loss curves and the classical collapse chart
//! - `report`: Markdown summary of logged records
//! - `classical`: MLP autoencoder baseline trained with Adam
//! - `experiments`: entanglement comparison and classical sweep
//!
//! ## Example
//!
//! ```rust,ignore
//! use qae_experiments::{EntanglementExperiment, ResultLog};
//!
//! let log = ResultLog::new("results/experiments")?;
//! let outcomes = EntanglementExperiment::default().with_seed(42).run(&log)?;
//! ```

pub mod classical;
pub mod error;
pub mod experiments;
pub mod plot;
pub mod report;
pub mod results;

pub use classical::{
    run_classical_sweep, run_classical_trial, ClassicalAutoencoder, ClassicalConfig,
    ClassicalOutcome, CLASSICAL_METHOD,
};
pub use error::{ExperimentError, Result};
pub use experiments::{
    record_training_run, run_classical_experiment, EntanglementExperiment, BELL_METHOD,
    CLASSICAL_PLOT, COLLAPSE_THRESHOLD, ENTANGLEMENT_PLOT, GHZ_METHOD, PRODUCT_METHOD,
    RANDOM_METHOD, ZERO_METHOD,
};
pub use plot::{plot_fidelity_by_qubits, plot_loss_histories, plot_loss_history, LossSeries};
pub use report::{generate_markdown_report, save_markdown_report};
pub use results::ResultLog;
