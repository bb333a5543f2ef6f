//! Eigenvalues of an upper Hessenberg matrix using the implicit double-shift QR algorithm of
//! Francis.
//!
//! The active window `[l, nn]` of the matrix is iterated on until a subdiagonal element becomes
//! negligible, at which point a $1 \times 1$ or $2 \times 2$ block is split off from the bottom
//! and its eigenvalues are read off directly. Each iteration applies two shifts at once, chosen as
//! the eigenvalues of the trailing $2 \times 2$ block, so that complex conjugate shifts can be
//! handled in real arithmetic.
//!
//! When a block fails to deflate after 10 or 20 iterations, an exceptional shift is used instead
//! to break out of cycles.

use crate::{assert, debug_assert, utils::sign, EvdError};
use faer::{MatMut, MatRef};
use num_complex::Complex64;
use reborrow::*;

/// Iteration counts at which the exceptional shift replaces the Francis shift.
const EXCEPTIONAL_SHIFT_ITERS: [usize; 2] = [10, 20];

/// Sum of the magnitudes of the elements in the upper Hessenberg part of `a`.
fn hessenberg_norm(a: MatRef<'_, f64>) -> f64 {
    let n = a.nrows();
    let mut norm = 0.0;
    for i in 0..n {
        for j in i.saturating_sub(1)..n {
            norm += a.read(i, j).abs();
        }
    }
    norm
}

/// Searches upward from row `nn` for a negligible subdiagonal element, sets it to zero and
/// returns its row. Returns zero if there is none.
fn find_small_subdiagonal(mut a: MatMut<'_, f64>, nn: usize, anorm: f64, epsilon: f64) -> usize {
    let mut l = nn;
    while l > 0 {
        let mut s = a.read(l - 1, l - 1).abs() + a.read(l, l).abs();
        if s == 0.0 {
            s = anorm;
        }
        if a.read(l, l - 1).abs() <= epsilon * s {
            a.write(l, l - 1, 0.0);
            break;
        }
        l -= 1;
    }
    l
}

/// Eigenvalues of the $2 \times 2$ block whose diagonal is `(y, x)` and the product of whose
/// off-diagonal elements is `w`, shifted by `t`.
///
/// Complex results are returned with the positive imaginary part first.
fn eigenvalues_2x2(x: f64, y: f64, w: f64, t: f64) -> (Complex64, Complex64) {
    let p = 0.5 * (y - x);
    let q = p * p + w;
    let z = q.abs().sqrt();
    let x = x + t;

    if q >= 0.0 {
        // the larger root avoids cancellation, the smaller one comes from the determinant
        let z = p + sign(z, p);
        let s0 = x + z;
        let s1 = if z != 0.0 { x - w / z } else { s0 };
        (Complex64::new(s0, 0.0), Complex64::new(s1, 0.0))
    } else {
        (Complex64::new(x + p, z), Complex64::new(x + p, -z))
    }
}

/// Performs one double-shift QR sweep on the window `[l, nn]`.
///
/// `(x, y, w)` encode the two shifts: `x + y` is their sum and `x * y - w` their product.
fn francis_step(
    mut a: MatMut<'_, f64>,
    l: usize,
    nn: usize,
    (x, y, w): (f64, f64, f64),
    epsilon: f64,
) {
    debug_assert!(l + 2 <= nn);

    // look for two consecutive small subdiagonal elements
    let mut m = nn - 2;
    let mut p;
    let mut q;
    let mut r;
    loop {
        let z = a.read(m, m);
        let r0 = x - z;
        let s0 = y - z;
        p = (r0 * s0 - w) / a.read(m + 1, m) + a.read(m, m + 1);
        q = a.read(m + 1, m + 1) - z - r0 - s0;
        r = a.read(m + 2, m + 1);

        let s = p.abs() + q.abs() + r.abs();
        p /= s;
        q /= s;
        r /= s;

        if m == l {
            break;
        }

        let u = a.read(m, m - 1).abs() * (q.abs() + r.abs());
        let v = p.abs() * (a.read(m - 1, m - 1).abs() + z.abs() + a.read(m + 1, m + 1).abs());
        if u <= epsilon * v {
            break;
        }
        m -= 1;
    }

    for i in m..nn - 1 {
        a.write(i + 2, i, 0.0);
        if i != m {
            a.write(i + 2, i - 1, 0.0);
        }
    }

    // chase the bulge down to the bottom of the window
    for k in m..nn {
        let last = k + 1 == nn;

        let mut scale = 0.0;
        if k != m {
            p = a.read(k, k - 1);
            q = a.read(k + 1, k - 1);
            r = if last { 0.0 } else { a.read(k + 2, k - 1) };
            scale = p.abs() + q.abs() + r.abs();
            if scale != 0.0 {
                p /= scale;
                q /= scale;
                r /= scale;
            }
        }

        let s = sign((p * p + q * q + r * r).sqrt(), p);
        if s == 0.0 {
            continue;
        }

        if k == m {
            if l != m {
                a.write(k, k - 1, -a.read(k, k - 1));
            }
        } else {
            a.write(k, k - 1, -s * scale);
        }

        p += s;
        let x = p / s;
        let y = q / s;
        let z = r / s;
        q /= p;
        r /= p;

        for j in k..nn + 1 {
            let mut p = a.read(k, j) + q * a.read(k + 1, j);
            if !last {
                p += r * a.read(k + 2, j);
                a.write(k + 2, j, a.read(k + 2, j) - p * z);
            }
            a.write(k + 1, j, a.read(k + 1, j) - p * y);
            a.write(k, j, a.read(k, j) - p * x);
        }

        let i_end = Ord::min(nn, k + 3);
        for i in l..i_end + 1 {
            let mut p = x * a.read(i, k) + y * a.read(i, k + 1);
            if !last {
                p += z * a.read(i, k + 2);
                a.write(i, k + 2, a.read(i, k + 2) - p * r);
            }
            a.write(i, k + 1, a.read(i, k + 1) - p * q);
            a.write(i, k, a.read(i, k) - p);
        }
    }
}

/// Computes the eigenvalues of the upper Hessenberg matrix `a` and stores them in `s`, in the
/// order in which they appear on the diagonal of the final quasi-triangular matrix.
///
/// Only the upper Hessenberg part of `a` is accessed, and `a` is clobbered. Complex conjugate
/// pairs are stored contiguously, with the eigenvalue having a positive imaginary part first.
///
/// `epsilon` is the relative precision below which a subdiagonal element is considered zero, and
/// `max_iters` bounds the number of iterations spent on a single deflation.
///
/// # Panics
/// Panics if `a` is not square, or if the length of `s` differs from the dimension of `a`.
#[track_caller]
pub fn hqr_eigenvalues_in_place(
    mut a: MatMut<'_, f64>,
    s: &mut [Complex64],
    epsilon: f64,
    max_iters: usize,
) -> Result<(), EvdError> {
    let n = a.nrows();
    assert!(all(a.ncols() == n, s.len() == n));

    let anorm = hessenberg_norm(a.rb());
    // exceptional shifts accumulated so far
    let mut t = 0.0;

    let mut active = n;
    while active > 0 {
        let nn = active - 1;
        let mut its = 0;

        loop {
            let l = find_small_subdiagonal(a.rb_mut(), nn, anorm, epsilon);
            let x = a.read(nn, nn);

            if l == nn {
                s[nn] = Complex64::new(x + t, 0.0);
                active -= 1;
                break;
            }

            let y = a.read(nn - 1, nn - 1);
            let w = a.read(nn, nn - 1) * a.read(nn - 1, nn);

            if l + 1 == nn {
                let (s0, s1) = eigenvalues_2x2(x, y, w, t);
                s[nn - 1] = s0;
                s[nn] = s1;
                active -= 2;
                break;
            }

            if its == max_iters {
                log::warn!(
                    target: "realeig",
                    "QR iteration did not converge for row {nn} after {its} iterations"
                );
                return Err(EvdError::NoConvergence { row: nn, iters: its });
            }

            let mut shift = (x, y, w);
            if EXCEPTIONAL_SHIFT_ITERS.contains(&its) {
                log::debug!(
                    target: "realeig",
                    "applying exceptional shift for row {nn} after {its} iterations"
                );

                t += x;
                for i in 0..nn + 1 {
                    a.write(i, i, a.read(i, i) - x);
                }
                let s = a.read(nn, nn - 1).abs() + a.read(nn - 1, nn - 2).abs();
                shift = (0.75 * s, 0.75 * s, -0.4375 * s * s);
            }
            its += 1;

            francis_step(a.rb_mut(), l, nn, shift, epsilon);
        }
    }

    Ok(())
}
