pub mod ansatz; // RY + CNOT layered ansatz
pub mod autoencoder; // Validated configuration boundary
pub mod density; // Density matrices, eigenvalues, matrix square root
pub mod error;
pub mod evolve; // Statevector evolution
pub mod fidelity; // Uhlmann and pure-state fidelity
pub mod gates;
pub mod loss; // Trash population loss
pub mod ops; // In-place 1q/2q gate kernels
pub mod optimizer; // Nelder–Mead, SPSA, minimize driver
pub mod partial_trace; // Tensor reshape-and-contract partial trace
pub mod state;
pub mod training; // Training loop and parallel batches
pub mod unitary;

pub use ansatz::{Ansatz, EntanglementPattern};
pub use autoencoder::{
    AutoencoderConfig, QuantumAutoencoder, DEFAULT_ITERATION_BUDGET, DEFAULT_REPETITIONS,
    MAX_QUBITS,
};
pub use density::DensityMatrix;
pub use error::{QaeError, Result};
pub use evolve::{evolve, evolve_gates};
pub use fidelity::{fidelity, pure_fidelity, state_fidelity, uhlmann_fidelity};
pub use gates::Gate;
pub use loss::{reference_zero_state, trash_population_loss, LossEvaluator, TrashQubits};
pub use optimizer::{
    build_strategy, minimize, Evaluation, NelderMead, OptimizationResult, OptimizationStrategy,
    OptimizerConfig, OptimizerKind, RunStatus, SPSAState, Spsa, Step,
};
pub use partial_trace::{partial_trace, AxisArena};
pub use state::QuantumState;
pub use training::{
    random_parameters, train, train_batch, RunReport, RunState, TrainingJob, TrainingLoop,
    TrainingResult,
};
pub use unitary::Unitary;
