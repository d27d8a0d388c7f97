//! Elementary gates used by the ansatz
//!
//! Matrices follow the kernel convention of [`crate::ops`]: a two-qubit
//! matrix is indexed by `2 * bit(qubit1) + bit(qubit2)`, so for CNOT the
//! control is `qubit1`.

use ndarray::{array, Array2, ArrayViewMut1};
use num_complex::Complex64;

use crate::ops::{apply_gate_1q, apply_gate_2q};

/// Rotation around Y-axis: RY(θ) = exp(-iθY/2)
pub fn ry(theta: f64) -> Array2<Complex64> {
    let c = Complex64::new((theta / 2.0).cos(), 0.0);
    let s = Complex64::new((theta / 2.0).sin(), 0.0);
    array![[c, -s], [s, c]]
}

/// Controlled-NOT, control on the first qubit of the pair
pub fn cnot() -> Array2<Complex64> {
    let o = Complex64::new(0.0, 0.0);
    let l = Complex64::new(1.0, 0.0);
    array![[l, o, o, o], [o, l, o, o], [o, o, o, l], [o, o, l, o]]
}

/// One step of a gate sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Y rotation by `theta` on `qubit`
    Ry { qubit: usize, theta: f64 },
    /// CNOT with the given control and target
    Cx { control: usize, target: usize },
}

impl Gate {
    /// Dense matrix of the gate on its own qubits.
    pub fn matrix(&self) -> Array2<Complex64> {
        match *self {
            Gate::Ry { theta, .. } => ry(theta),
            Gate::Cx { .. } => cnot(),
        }
    }

    /// Inverse gate (RY(-θ); CNOT is self-inverse).
    pub fn inverse(&self) -> Gate {
        match *self {
            Gate::Ry { qubit, theta } => Gate::Ry {
                qubit,
                theta: -theta,
            },
            cx @ Gate::Cx { .. } => cx,
        }
    }

    /// Highest qubit index touched by the gate.
    pub fn max_qubit(&self) -> usize {
        match *self {
            Gate::Ry { qubit, .. } => qubit,
            Gate::Cx { control, target } => control.max(target),
        }
    }

    /// Applies the gate in place to an amplitude vector (or matrix column).
    pub fn apply(&self, amplitudes: ArrayViewMut1<Complex64>) {
        match *self {
            Gate::Ry { qubit, theta } => apply_gate_1q(amplitudes, qubit, &ry(theta)),
            Gate::Cx { control, target } => apply_gate_2q(amplitudes, control, target, &cnot()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_ry_identity_at_zero() {
        let g = ry(0.0);
        assert!((g[[0, 0]].re - 1.0).abs() < EPSILON);
        assert!((g[[1, 1]].re - 1.0).abs() < EPSILON);
        assert!(g[[0, 1]].norm() < EPSILON);
        assert!(g[[1, 0]].norm() < EPSILON);
    }

    #[test]
    fn test_ry_pi_flips() {
        let g = ry(PI);
        assert!(g[[0, 0]].norm() < EPSILON);
        assert!((g[[1, 0]].re - 1.0).abs() < EPSILON);
        assert!((g[[0, 1]].re + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_inverse() {
        let g = Gate::Ry {
            qubit: 1,
            theta: 0.7,
        };
        let prod = g.matrix().dot(&g.inverse().matrix());
        assert!((prod[[0, 0]].re - 1.0).abs() < EPSILON);
        assert!(prod[[0, 1]].norm() < EPSILON);

        let cx = Gate::Cx {
            control: 0,
            target: 2,
        };
        assert_eq!(cx.inverse(), cx);
        assert_eq!(cx.max_qubit(), 2);
    }
}
