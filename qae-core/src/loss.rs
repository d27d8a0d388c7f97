//! Trash population loss
//!
//! A perfect encoder maps the input onto `latent ⊗ |0..0>_trash`. The loss is
//! the distance of the traced-out trash subsystem from the all-zero reference:
//!
//! ```text
//! L(θ) = 1 − F( Tr_latent[ U(θ)|ψ><ψ|U(θ)† ], |0..0><0..0| )
//! ```

use crate::ansatz::Ansatz;
use crate::density::DensityMatrix;
use crate::error::{QaeError, Result};
use crate::evolve::evolve;
use crate::fidelity::fidelity;
use crate::partial_trace::{partial_trace, AxisArena};
use crate::state::QuantumState;

/// Ordered set of qubits that must collapse to |0> after encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashQubits {
    num_qubits: usize,
    qubits: Vec<usize>,
}

impl TrashQubits {
    /// Arbitrary trash set over `num_qubits` qubits, sorted ascending.
    ///
    /// At least one qubit must remain latent.
    pub fn new(num_qubits: usize, qubits: &[usize]) -> Result<Self> {
        let arena = AxisArena::new(num_qubits, qubits)?;
        if arena.traced().is_empty() {
            return Err(QaeError::InvalidQubitSet(
                "trash set leaves no latent qubit".into(),
            ));
        }
        Ok(Self {
            num_qubits,
            qubits: arena.kept().to_vec(),
        })
    }

    /// The `num_trash` highest-index qubits; `num_trash` must be in `1..num_qubits`.
    pub fn highest(num_qubits: usize, num_trash: usize) -> Result<Self> {
        if num_trash == 0 || num_trash >= num_qubits {
            return Err(QaeError::config(format!(
                "num_trash must be in 1..{num_qubits}, got {num_trash}"
            )));
        }
        Self::new(num_qubits, &((num_qubits - num_trash)..num_qubits).collect::<Vec<_>>())
    }

    /// The `num_trash` lowest-index qubits.
    pub fn lowest(num_qubits: usize, num_trash: usize) -> Result<Self> {
        if num_trash == 0 || num_trash >= num_qubits {
            return Err(QaeError::config(format!(
                "num_trash must be in 1..{num_qubits}, got {num_trash}"
            )));
        }
        Self::new(num_qubits, &(0..num_trash).collect::<Vec<_>>())
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn len(&self) -> usize {
        self.qubits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.qubits.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.qubits
    }

    /// Complement of the trash set.
    pub fn latent(&self) -> Vec<usize> {
        (0..self.num_qubits)
            .filter(|q| !self.qubits.contains(q))
            .collect()
    }
}

/// |0..0><0..0| over `num_qubits` qubits.
pub fn reference_zero_state(num_qubits: usize) -> DensityMatrix {
    DensityMatrix::zero_state(num_qubits)
}

/// Loss bound to one ansatz and one trash set.
#[derive(Debug, Clone)]
pub struct LossEvaluator {
    ansatz: Ansatz,
    trash: TrashQubits,
    reference: DensityMatrix,
}

impl LossEvaluator {
    pub fn new(ansatz: Ansatz, trash: TrashQubits) -> Result<Self> {
        if trash.num_qubits() != ansatz.num_qubits() {
            return Err(QaeError::DimensionMismatch {
                expected: ansatz.num_qubits(),
                actual: trash.num_qubits(),
            });
        }
        let reference = reference_zero_state(trash.len());
        Ok(Self {
            ansatz,
            trash,
            reference,
        })
    }

    pub fn ansatz(&self) -> &Ansatz {
        &self.ansatz
    }

    pub fn trash(&self) -> &TrashQubits {
        &self.trash
    }

    /// Reduced density matrix of the trash qubits after encoding.
    pub fn trash_state(&self, state: &QuantumState, params: &[f64]) -> Result<DensityMatrix> {
        let unitary = self.ansatz.build_unitary(params)?;
        let encoded = evolve(state, &unitary)?;
        partial_trace(&encoded, self.trash.as_slice())
    }

    /// 1 − F(ρ_trash, |0..0>), clamped to [0, 1].
    pub fn evaluate(&self, state: &QuantumState, params: &[f64]) -> Result<f64> {
        let rho_trash = self.trash_state(state, params)?;
        let f = fidelity(&rho_trash, &self.reference)?;
        Ok((1.0 - f).clamp(0.0, 1.0))
    }
}

/// Loss with the `num_trash` highest-index qubits as trash.
pub fn trash_population_loss(
    state: &QuantumState,
    ansatz: &Ansatz,
    params: &[f64],
    num_trash: usize,
) -> Result<f64> {
    let trash = TrashQubits::highest(ansatz.num_qubits(), num_trash)?;
    LossEvaluator::new(ansatz.clone(), trash)?.evaluate(state, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansatz::EntanglementPattern;

    #[test]
    fn test_trash_sets() {
        let trash = TrashQubits::highest(4, 2).unwrap();
        assert_eq!(trash.as_slice(), &[2, 3]);
        assert_eq!(trash.latent(), vec![0, 1]);

        let trash = TrashQubits::lowest(3, 1).unwrap();
        assert_eq!(trash.as_slice(), &[0]);

        let trash = TrashQubits::new(3, &[2, 0]).unwrap();
        assert_eq!(trash.as_slice(), &[0, 2]);
    }

    #[test]
    fn test_trash_set_errors() {
        assert!(TrashQubits::highest(2, 0).unwrap_err().is_configuration());
        assert!(TrashQubits::highest(2, 2).unwrap_err().is_configuration());
        assert!(matches!(
            TrashQubits::new(2, &[0, 1]),
            Err(QaeError::InvalidQubitSet(_))
        ));
        assert!(matches!(
            TrashQubits::new(2, &[2]),
            Err(QaeError::InvalidQubitSet(_))
        ));
    }

    #[test]
    fn test_bell_identity_loss_is_half() {
        let ansatz = Ansatz::new(2, 1, EntanglementPattern::None).unwrap();
        let params = vec![0.0; ansatz.parameter_count()];
        let loss = trash_population_loss(&QuantumState::bell(), &ansatz, &params, 1).unwrap();
        assert!((loss - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_identity_on_clean_trash_is_zero() {
        // |q1 q0> = |0>|+> : trash qubit 1 is already |0>
        let state = QuantumState::new(vec![
            num_complex::Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0),
            num_complex::Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0),
            num_complex::Complex64::new(0.0, 0.0),
            num_complex::Complex64::new(0.0, 0.0),
        ])
        .unwrap();
        let ansatz = Ansatz::new(2, 2, EntanglementPattern::None).unwrap();
        let params = vec![0.0; ansatz.parameter_count()];
        let loss = trash_population_loss(&state, &ansatz, &params, 1).unwrap();
        assert!(loss.abs() < 1e-12);
    }

    #[test]
    fn test_lowest_trash_convention() {
        // |1>|0> : qubit 0 is clean, qubit 1 is not
        let state = QuantumState::basis(2, 2);
        let ansatz = Ansatz::new(2, 1, EntanglementPattern::None).unwrap();
        let params = vec![0.0; ansatz.parameter_count()];

        let low = LossEvaluator::new(ansatz.clone(), TrashQubits::lowest(2, 1).unwrap()).unwrap();
        let high = LossEvaluator::new(ansatz, TrashQubits::highest(2, 1).unwrap()).unwrap();
        assert!(low.evaluate(&state, &params).unwrap() < 1e-12);
        assert!((high.evaluate(&state, &params).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_propagates() {
        let ansatz = Ansatz::new(2, 1, EntanglementPattern::Full).unwrap();
        let err = trash_population_loss(&QuantumState::bell(), &ansatz, &[0.0; 3], 1).unwrap_err();
        assert!(matches!(err, QaeError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_evaluator_rejects_foreign_trash_set() {
        let ansatz = Ansatz::new(3, 1, EntanglementPattern::Full).unwrap();
        let trash = TrashQubits::highest(2, 1).unwrap();
        assert!(LossEvaluator::new(ansatz, trash).is_err());
    }
}
