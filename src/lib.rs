//! Eigenvalues of a dense non-symmetric real matrix.
//!
//! Given a square matrix $A$ of shape $(n, n)$ with real entries, this crate computes its $n$
//! (possibly complex) eigenvalues $\lambda_1, \dots, \lambda_n$ without forming any eigenvectors.
//! The computation is done in three stages, each of which is a similarity transform and therefore
//! leaves the spectrum unchanged:
//!
//! - the matrix is balanced by rescaling its rows and columns with powers of the floating point
//!   radix,
//! - the balanced matrix is reduced to upper Hessenberg form using stabilized elementary
//!   similarity transforms,
//! - the Hessenberg matrix is driven to quasi-triangular form by the implicit double-shift QR
//!   algorithm, reading off $1 \times 1$ and $2 \times 2$ blocks as they deflate.
//!
//! The eigenvalues are then sorted by ascending real part. Since $A$ is real, complex eigenvalues
//! come in conjugate pairs, which are stored next to each other.
//!
//! # Example
//! ```
//! use faer::mat;
//! use realeig::RealEigenvalues;
//!
//! let a = mat![[0.0, -1.0], [1.0, 0.0f64]];
//! let evd = RealEigenvalues::new(a.as_ref()).unwrap();
//!
//! let s = evd.eigenvalues();
//! assert_eq!(s.len(), 2);
//! assert_eq!(s[0].re, 0.0);
//! assert_eq!(s[0].im, 1.0);
//! assert_eq!(s[1].im, -1.0);
//! assert_eq!(evd.condition_number(), 1.0);
//! ```

use equator::{assert, debug_assert};
use faer::MatRef;
use num_complex::Complex64;

#[doc(hidden)]
pub mod balance;
#[doc(hidden)]
pub mod hessenberg;
#[doc(hidden)]
pub mod hqr;
#[doc(hidden)]
pub mod sort;

mod utils;

/// Magnitude below which an eigenvalue is treated as zero by
/// [`RealEigenvalues::condition_number`].
pub const ROOT_VSMALL: f64 = 1.0e-150;

/// Value reported by [`RealEigenvalues::condition_number`] when the spectrum contains an
/// eigenvalue of magnitude below [`ROOT_VSMALL`].
pub const GREAT: f64 = 1.0e15;

/// This error signifies that the eigenvalues could not be computed because the QR iteration
/// stalled on one of the diagonal blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvdError {
    /// Convergence failure.
    NoConvergence {
        /// Index of the last row of the block that failed to deflate.
        row: usize,
        /// Number of iterations spent on the block before giving up.
        iters: usize,
    },
}

impl core::fmt::Display for EvdError {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for EvdError {}

/// Real eigenvalue solver tuning parameters.
#[derive(Copy, Clone, Debug)]
#[non_exhaustive]
pub struct RealEvdParams {
    /// Whether the matrix is balanced before being reduced to Hessenberg form.
    pub balance: bool,
    /// Maximum number of QR iterations spent on a single deflation before failing with
    /// [`EvdError::NoConvergence`].
    pub max_iters: usize,
    /// Relative precision used to decide whether a subdiagonal element is negligible.
    pub epsilon: f64,
}

impl Default for RealEvdParams {
    #[inline]
    fn default() -> Self {
        Self {
            balance: true,
            max_iters: 30,
            epsilon: f64::EPSILON,
        }
    }
}

/// Eigenvalues of a real square matrix, sorted by ascending real part.
///
/// The input matrix is copied on construction and all the work happens inside [`Self::new`].
/// The resulting object is immutable.
#[derive(Clone, Debug)]
pub struct RealEigenvalues {
    s: Vec<Complex64>,
}

impl RealEigenvalues {
    /// Computes the eigenvalues of `matrix` with the default parameters.
    ///
    /// # Panics
    /// Panics if `matrix` is not square, or if it is empty.
    #[track_caller]
    pub fn new(matrix: MatRef<'_, f64>) -> Result<Self, EvdError> {
        Self::new_with_params(matrix, RealEvdParams::default())
    }

    /// Computes the eigenvalues of `matrix`.
    ///
    /// # Panics
    /// Panics if `matrix` is not square, or if it is empty.
    #[track_caller]
    pub fn new_with_params(
        matrix: MatRef<'_, f64>,
        params: RealEvdParams,
    ) -> Result<Self, EvdError> {
        let n = matrix.nrows();
        assert!(all(matrix.ncols() == n, n > 0));

        let mut a = matrix.to_owned();
        let mut s = vec![Complex64::new(0.0, 0.0); n];

        if n == 1 {
            s[0] = Complex64::new(a.read(0, 0), 0.0);
            return Ok(Self { s });
        }

        if params.balance {
            log::trace!(target: "realeig", "balancing {n}x{n} matrix");
            balance::balance_in_place(a.as_mut());
        }

        log::trace!(target: "realeig", "reducing {n}x{n} matrix to Hessenberg form");
        hessenberg::make_hessenberg_in_place(a.as_mut());

        log::trace!(target: "realeig", "running QR iteration on {n}x{n} Hessenberg matrix");
        hqr::hqr_eigenvalues_in_place(a.as_mut(), &mut s, params.epsilon, params.max_iters)?;

        sort::sort_by_real_part(&mut s);

        Ok(Self { s })
    }

    /// Returns the dimension of the matrix.
    #[inline]
    pub fn dim(&self) -> usize {
        self.s.len()
    }

    /// Returns the eigenvalues, sorted by ascending real part.
    ///
    /// Complex conjugate pairs are stored contiguously, with the eigenvalue having a positive
    /// imaginary part first.
    #[inline]
    pub fn eigenvalues(&self) -> &[Complex64] {
        &self.s
    }

    /// Consumes `self` and returns the eigenvalues, sorted by ascending real part.
    #[inline]
    pub fn into_eigenvalues(self) -> Vec<Complex64> {
        self.s
    }

    /// Returns the largest eigenvalue magnitude.
    pub fn spectral_radius(&self) -> f64 {
        self.s.iter().map(|x| x.norm()).fold(0.0, f64::max)
    }

    /// Returns the ratio of the largest to the smallest eigenvalue magnitude.
    ///
    /// If the smallest magnitude is below [`ROOT_VSMALL`], [`GREAT`] is returned instead.
    pub fn condition_number(&self) -> f64 {
        let min = self
            .s
            .iter()
            .map(|x| x.norm())
            .fold(f64::INFINITY, f64::min);

        if min < ROOT_VSMALL {
            log::debug!(
                target: "realeig",
                "smallest eigenvalue magnitude {min:e} is below {ROOT_VSMALL:e}, condition number set to {GREAT:e}"
            );
            return GREAT;
        }

        self.spectral_radius() / min
    }
}

/// Computes the eigenvalues of `matrix` with the default parameters, sorted by ascending real
/// part.
///
/// # Panics
/// Panics if `matrix` is not square, or if it is empty.
#[track_caller]
pub fn eigenvalues_real(matrix: MatRef<'_, f64>) -> Result<Vec<Complex64>, EvdError> {
    RealEigenvalues::new(matrix).map(RealEigenvalues::into_eigenvalues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;
    use assert_approx_eq::assert_approx_eq;
    use faer::{mat, Mat};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_mat(rng: &mut StdRng, n: usize) -> Mat<f64> {
        Mat::from_fn(n, n, |_, _| rng.gen::<f64>() * 2.0 - 1.0)
    }

    #[test]
    fn test_diagonal_2() {
        let a = mat![[2.0, 0.0], [0.0, 3.0f64]];
        let evd = RealEigenvalues::new(a.as_ref()).unwrap();

        let s = evd.eigenvalues();
        assert!(s.len() == 2);
        assert!(s[0] == Complex64::new(2.0, 0.0));
        assert!(s[1] == Complex64::new(3.0, 0.0));
        assert!(evd.condition_number() == 1.5);
    }

    #[test]
    fn test_rotation() {
        let a = mat![[0.0, -1.0], [1.0, 0.0f64]];
        let evd = RealEigenvalues::new(a.as_ref()).unwrap();

        let s = evd.eigenvalues();
        assert!(s.len() == 2);
        assert!(s[0] == Complex64::new(0.0, 1.0));
        assert!(s[1] == Complex64::new(0.0, -1.0));
        assert!(evd.condition_number() == 1.0);
    }

    #[test]
    fn test_real_and_complex_pair() {
        let a = mat![
            [1.0, -2.0, 3.0],
            [2.0, 1.0, 4.0],
            [0.0, 0.0, 5.0f64],
        ];
        let s = eigenvalues_real(a.as_ref()).unwrap();

        assert!(s.len() == 3);
        assert_approx_eq!(s[0].re, 1.0, 1e-12);
        assert_approx_eq!(s[0].im, 2.0, 1e-12);
        assert_approx_eq!(s[1].re, 1.0, 1e-12);
        assert_approx_eq!(s[1].im, -2.0, 1e-12);
        assert!(s[0].re == s[1].re);
        assert_approx_eq!(s[2].re, 5.0, 1e-12);
        assert!(s[2].im == 0.0);
    }

    #[test]
    fn test_identity() {
        for n in [1, 2, 3, 4, 7, 16] {
            let a = Mat::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.0 });
            let evd = RealEigenvalues::new(a.as_ref()).unwrap();

            assert!(evd.dim() == n);
            for x in evd.eigenvalues() {
                assert!(*x == Complex64::new(1.0, 0.0));
            }
            assert!(evd.condition_number() == 1.0);
        }
    }

    #[test]
    fn test_one_by_one() {
        let a = mat![[-4.5f64]];
        let evd = RealEigenvalues::new(a.as_ref()).unwrap();

        assert!(evd.eigenvalues().len() == 1);
        assert!(evd.eigenvalues()[0] == Complex64::new(-4.5, 0.0));
        assert!(evd.spectral_radius() == 4.5);
        assert!(evd.condition_number() == 1.0);
    }

    #[test]
    fn test_zero_row_condition() {
        let a = mat![
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            [0.0, 0.0, 0.0f64],
        ];
        let evd = RealEigenvalues::new(a.as_ref()).unwrap();

        let cond = evd.condition_number();
        assert!(cond == GREAT);
        assert!(cond.is_finite());
    }

    #[test]
    fn test_zero_matrix() {
        let a = Mat::<f64>::zeros(4, 4);
        let evd = RealEigenvalues::new(a.as_ref()).unwrap();

        for x in evd.eigenvalues() {
            assert!(*x == Complex64::new(0.0, 0.0));
        }
        assert!(evd.condition_number() == GREAT);
    }

    #[test]
    fn test_no_balance() {
        let mut rng = StdRng::seed_from_u64(0);
        for n in [2, 3, 5, 8] {
            let a = random_mat(&mut rng, n);

            let balanced = RealEigenvalues::new(a.as_ref()).unwrap();
            let raw = RealEigenvalues::new_with_params(
                a.as_ref(),
                RealEvdParams {
                    balance: false,
                    ..Default::default()
                },
            )
            .unwrap();

            for (x, y) in balanced.eigenvalues().iter().zip(raw.eigenvalues()) {
                assert_approx_eq!(x.re, y.re, 1e-10);
                assert_approx_eq!(x.im.abs(), y.im.abs(), 1e-10);
            }
        }
    }

    #[test]
    fn test_no_convergence() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = random_mat(&mut rng, 6);

        let err = RealEigenvalues::new_with_params(
            a.as_ref(),
            RealEvdParams {
                max_iters: 0,
                ..Default::default()
            },
        )
        .unwrap_err();

        assert!(err == EvdError::NoConvergence { row: 5, iters: 0 });
    }

    #[test]
    #[should_panic]
    fn test_non_square() {
        let a = Mat::<f64>::zeros(2, 3);
        let _ = RealEigenvalues::new(a.as_ref());
    }

    #[test]
    #[should_panic]
    fn test_empty() {
        let a = Mat::<f64>::zeros(0, 0);
        let _ = RealEigenvalues::new(a.as_ref());
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RealEigenvalues>();
    }
}
