use ndarray::{Array2, ArrayViewMut1};
use num_complex::Complex64;

/// Applies a single-qubit gate to `qubit` of an amplitude vector.
///
/// The vector is treated as (Outer, 2, Inner) with Inner = 2^qubit, so the
/// middle axis is the target qubit. Works on strided views, which lets the
/// ansatz apply gates to the columns of a unitary under construction.
pub fn apply_gate_1q(
    mut amplitudes: ArrayViewMut1<Complex64>,
    qubit: usize,
    gate: &Array2<Complex64>,
) {
    debug_assert!(gate.shape() == [2, 2], "Gate must be 2x2");

    let total_dim = amplitudes.len();
    let inner_dim = 1 << qubit;
    let outer_dim = total_dim / (2 * inner_dim);

    let u00 = gate[[0, 0]];
    let u01 = gate[[0, 1]];
    let u10 = gate[[1, 0]];
    let u11 = gate[[1, 1]];

    for outer in 0..outer_dim {
        let base = outer * 2 * inner_dim;
        for i in 0..inner_dim {
            let i0 = base + i;
            let i1 = i0 + inner_dim;
            let alpha = amplitudes[i0];
            let beta = amplitudes[i1];

            amplitudes[i0] = u00 * alpha + u01 * beta;
            amplitudes[i1] = u10 * alpha + u11 * beta;
        }
    }
}

/// Applies a two-qubit gate to the pair (`qubit1`, `qubit2`).
///
/// The 4x4 matrix is indexed by `2 * bit(qubit1) + bit(qubit2)`, i.e. `qubit1`
/// is the first tensor factor. For CNOT, `qubit1` is the control.
pub fn apply_gate_2q(
    mut amplitudes: ArrayViewMut1<Complex64>,
    qubit1: usize,
    qubit2: usize,
    gate: &Array2<Complex64>,
) {
    debug_assert!(gate.shape() == [4, 4], "Gate must be 4x4");
    debug_assert!(qubit1 != qubit2, "Gate qubits must differ");

    let dim = amplitudes.len();
    let (p1, p2) = if qubit1 < qubit2 {
        (qubit1, qubit2)
    } else {
        (qubit2, qubit1)
    };
    let bit1 = 1 << qubit1;
    let bit2 = 1 << qubit2;

    for k in 0..(dim >> 2) {
        // Insert zero bits at p1 then p2 to get the |00> index of this block
        let low = k & ((1 << p1) - 1);
        let k_p1 = ((k >> p1) << (p1 + 1)) | low;
        let low2 = k_p1 & ((1 << p2) - 1);
        let i00 = ((k_p1 >> p2) << (p2 + 1)) | low2;

        let idx = [i00, i00 | bit2, i00 | bit1, i00 | bit1 | bit2];
        let src = [
            amplitudes[idx[0]],
            amplitudes[idx[1]],
            amplitudes[idx[2]],
            amplitudes[idx[3]],
        ];

        for r in 0..4 {
            let mut acc = Complex64::new(0.0, 0.0);
            for c in 0..4 {
                acc += gate[[r, c]] * src[c];
            }
            amplitudes[idx[r]] = acc;
        }
    }
}
