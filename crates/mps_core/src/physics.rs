//! Complex-scalar helpers and gate-matrix constants shared by the gate
//! library and the engine's test suites.
//!
//! This module provides:
//! - The scalar type used throughout the workspace (`C64`)
//! - Standard gate matrices (Pauli, Clifford, rotation gates)
//! - Small dense-matrix utilities (product, dagger, unitarity check)

use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

/// Complex number type alias used throughout the workspace.
pub type C64 = Complex64;

/// Create a complex number from real and imaginary parts.
#[inline]
pub const fn c(re: f64, im: f64) -> C64 {
    C64::new(re, im)
}

/// Complex zero.
pub const ZERO: C64 = C64::new(0.0, 0.0);

/// Complex one.
pub const ONE: C64 = C64::new(1.0, 0.0);

/// Complex imaginary unit i.
pub const I: C64 = C64::new(0.0, 1.0);

/// 1/√2 as complex number.
pub const FRAC_1_SQRT_2_C: C64 = C64::new(FRAC_1_SQRT_2, 0.0);

// ============================================================================
// Gate Matrices (2x2 for single-qubit, 4x4 for two-qubit)
// ============================================================================

/// 2x2 matrix type: [[a, b], [c, d]]
pub type Matrix2x2 = [[C64; 2]; 2];

/// 4x4 matrix type for two-qubit gates
pub type Matrix4x4 = [[C64; 4]; 4];

/// Identity matrix I.
pub const IDENTITY: Matrix2x2 = [[ONE, ZERO], [ZERO, ONE]];

/// Pauli-X (NOT) gate.
/// |0⟩ → |1⟩, |1⟩ → |0⟩
pub const PAULI_X: Matrix2x2 = [[ZERO, ONE], [ONE, ZERO]];

/// Pauli-Y gate.
/// |0⟩ → i|1⟩, |1⟩ → -i|0⟩
pub const PAULI_Y: Matrix2x2 = [[ZERO, C64::new(0.0, -1.0)], [I, ZERO]];

/// Pauli-Z gate.
/// |0⟩ → |0⟩, |1⟩ → -|1⟩
pub const PAULI_Z: Matrix2x2 = [[ONE, ZERO], [ZERO, C64::new(-1.0, 0.0)]];

/// Hadamard gate.
/// |0⟩ → (|0⟩ + |1⟩)/√2, |1⟩ → (|0⟩ - |1⟩)/√2
pub const HADAMARD: Matrix2x2 = [
    [FRAC_1_SQRT_2_C, FRAC_1_SQRT_2_C],
    [FRAC_1_SQRT_2_C, C64::new(-FRAC_1_SQRT_2, 0.0)],
];

/// S gate (√Z, phase gate).
/// |0⟩ → |0⟩, |1⟩ → i|1⟩
pub const S_GATE: Matrix2x2 = [[ONE, ZERO], [ZERO, I]];

/// T gate (π/8 gate).
/// |0⟩ → |0⟩, |1⟩ → e^(iπ/4)|1⟩
pub const T_GATE: Matrix2x2 = [[ONE, ZERO], [ZERO, C64::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2)]];

/// Computes Rx(θ) rotation matrix.
/// Rx(θ) = cos(θ/2)I - i·sin(θ/2)X
pub fn rx(theta: f64) -> Matrix2x2 {
    let cos = (theta / 2.0).cos();
    let sin = (theta / 2.0).sin();
    [[c(cos, 0.0), c(0.0, -sin)], [c(0.0, -sin), c(cos, 0.0)]]
}

/// Computes Ry(θ) rotation matrix.
/// Ry(θ) = cos(θ/2)I - i·sin(θ/2)Y
pub fn ry(theta: f64) -> Matrix2x2 {
    let cos = (theta / 2.0).cos();
    let sin = (theta / 2.0).sin();
    [[c(cos, 0.0), c(-sin, 0.0)], [c(sin, 0.0), c(cos, 0.0)]]
}

/// Computes Rz(θ) rotation matrix.
/// Rz(θ) = e^(-iθ/2)|0⟩⟨0| + e^(iθ/2)|1⟩⟨1|
pub fn rz(theta: f64) -> Matrix2x2 {
    let half = theta / 2.0;
    [
        [c(half.cos(), -half.sin()), ZERO],
        [ZERO, c(half.cos(), half.sin())],
    ]
}

/// Computes `exp(-iθ (mx·X + my·Y + mz·Z))` for a unit Bloch vector
/// `(mx, my, mz)`, using the closed form that follows from
/// `(n·σ)² = I` for unit `n`: `exp(-iθ n·σ) = cos(θ)·I - i·sin(θ)·(n·σ)`.
pub fn bloch_rotation(theta: f64, mx: f64, my: f64, mz: f64) -> Matrix2x2 {
    let n_dot_sigma: Matrix2x2 = [
        [c(mz, 0.0), c(mx, -my)],
        [c(mx, my), c(-mz, 0.0)],
    ];
    let cos = c(theta.cos(), 0.0);
    let neg_i_sin = c(0.0, -theta.sin());
    [
        [
            cos + neg_i_sin * n_dot_sigma[0][0],
            neg_i_sin * n_dot_sigma[0][1],
        ],
        [
            neg_i_sin * n_dot_sigma[1][0],
            cos + neg_i_sin * n_dot_sigma[1][1],
        ],
    ]
}

/// CNOT (CX) gate matrix (control=0, target=1).
/// |00⟩ → |00⟩, |01⟩ → |01⟩, |10⟩ → |11⟩, |11⟩ → |10⟩
pub const CNOT: Matrix4x4 = [
    [ONE, ZERO, ZERO, ZERO],
    [ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ONE],
    [ZERO, ZERO, ONE, ZERO],
];

/// SWAP gate matrix.
/// |00⟩ → |00⟩, |01⟩ → |10⟩, |10⟩ → |01⟩, |11⟩ → |11⟩
pub const SWAP: Matrix4x4 = [
    [ONE, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ONE, ZERO],
    [ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ONE],
];

// ============================================================================
// Utility Functions
// ============================================================================

/// Computes the Hermitian conjugate (conjugate transpose) of a 2x2 matrix.
pub fn dagger_2x2(m: &Matrix2x2) -> Matrix2x2 {
    [
        [m[0][0].conj(), m[1][0].conj()],
        [m[0][1].conj(), m[1][1].conj()],
    ]
}

/// Multiplies two 2x2 matrices.
pub fn mul_2x2(a: &Matrix2x2, b: &Matrix2x2) -> Matrix2x2 {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}

/// Checks if a 2x2 matrix is approximately unitary (U†U ≈ I).
pub fn is_unitary_2x2(m: &Matrix2x2, tolerance: f64) -> bool {
    let product = mul_2x2(&dagger_2x2(m), m);

    (product[0][0] - ONE).norm() < tolerance
        && product[0][1].norm() < tolerance
        && product[1][0].norm() < tolerance
        && (product[1][1] - ONE).norm() < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-10;

    #[test]
    fn test_pauli_gates_unitary() {
        assert!(is_unitary_2x2(&PAULI_X, TOLERANCE));
        assert!(is_unitary_2x2(&PAULI_Y, TOLERANCE));
        assert!(is_unitary_2x2(&PAULI_Z, TOLERANCE));
    }

    #[test]
    fn test_hadamard_unitary() {
        assert!(is_unitary_2x2(&HADAMARD, TOLERANCE));
    }

    #[test]
    fn test_s_t_gates_unitary() {
        assert!(is_unitary_2x2(&S_GATE, TOLERANCE));
        assert!(is_unitary_2x2(&T_GATE, TOLERANCE));
    }

    #[test]
    fn test_rotation_gates_unitary() {
        for theta in [0.0, PI / 4.0, PI / 2.0, PI, 2.0 * PI] {
            assert!(is_unitary_2x2(&rx(theta), TOLERANCE), "Rx({theta}) not unitary");
            assert!(is_unitary_2x2(&ry(theta), TOLERANCE), "Ry({theta}) not unitary");
            assert!(is_unitary_2x2(&rz(theta), TOLERANCE), "Rz({theta}) not unitary");
        }
    }

    #[test]
    fn test_bloch_rotation_unitary() {
        let frac = 1.0 / 3.0_f64.sqrt();
        assert!(is_unitary_2x2(
            &bloch_rotation(0.7, frac, frac, frac),
            TOLERANCE
        ));
    }

    #[test]
    fn test_bloch_rotation_reduces_to_rx() {
        // mx=1, my=mz=0 should match exp(-iθX) = cos(θ)I - i sin(θ)X.
        let m = bloch_rotation(0.3, 1.0, 0.0, 0.0);
        let expected = rx(0.6); // rx(theta) uses theta/2 internally
        for i in 0..2 {
            for j in 0..2 {
                assert!((m[i][j] - expected[i][j]).norm() < TOLERANCE);
            }
        }
    }

    #[test]
    fn test_x_squared_is_identity() {
        let x2 = mul_2x2(&PAULI_X, &PAULI_X);
        assert!((x2[0][0] - ONE).norm() < TOLERANCE);
        assert!(x2[0][1].norm() < TOLERANCE);
        assert!(x2[1][0].norm() < TOLERANCE);
        assert!((x2[1][1] - ONE).norm() < TOLERANCE);
    }

    #[test]
    fn test_hadamard_squared_is_identity() {
        let h2 = mul_2x2(&HADAMARD, &HADAMARD);
        assert!((h2[0][0] - ONE).norm() < TOLERANCE);
        assert!(h2[0][1].norm() < TOLERANCE);
        assert!(h2[1][0].norm() < TOLERANCE);
        assert!((h2[1][1] - ONE).norm() < TOLERANCE);
    }
}
