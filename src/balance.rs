//! Osborne balancing of a square matrix.
//!
//! Rows and columns are rescaled by powers of the floating point radix so that, for every index
//! $i$, the off-diagonal parts of row $i$ and column $i$ have comparable norms. Since the scaling
//! factors are exact powers of the radix, the transform introduces no rounding error and the
//! diagonal is left untouched.

use crate::assert;
use faer::MatMut;

const RADIX: f64 = f64::RADIX as f64;
const SQR_RADIX: f64 = RADIX * RADIX;

/// Balances `a` in place with a sequence of diagonal similarity transforms.
///
/// The scaling factors are not returned, so only the eigenvalues of the balanced matrix are
/// meaningful.
///
/// # Panics
/// Panics if `a` is not square.
#[track_caller]
pub fn balance_in_place(mut a: MatMut<'_, f64>) {
    let n = a.nrows();
    assert!(a.ncols() == n);

    let mut done = false;
    while !done {
        done = true;
        for i in 0..n {
            let mut c = 0.0;
            let mut r = 0.0;
            for j in 0..n {
                if j != i {
                    c += a.read(j, i).abs();
                    r += a.read(i, j).abs();
                }
            }

            if c == 0.0 || r == 0.0 {
                continue;
            }
            // rescaling cannot bring an infinite norm back into range
            if !(c.is_finite() && r.is_finite()) {
                continue;
            }

            let s = c + r;
            let mut f = 1.0;

            let g = r / RADIX;
            while c < g {
                f *= RADIX;
                c *= SQR_RADIX;
            }
            let g = r * RADIX;
            while c > g {
                f /= RADIX;
                c /= SQR_RADIX;
            }

            // only accept scalings that shrink the norm, otherwise the sweep may never end
            if (c + r) / f < 0.95 * s {
                done = false;
                let g = f.recip();
                for j in 0..n {
                    a.write(i, j, a.read(i, j) * g);
                }
                for j in 0..n {
                    a.write(j, i, a.read(j, i) * f);
                }
            }
        }
    }
}
