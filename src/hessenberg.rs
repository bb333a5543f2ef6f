//! Reduction of a square matrix to upper Hessenberg form using stabilized elementary similarity
//! transforms, i.e. Gaussian elimination with partial pivoting applied from both sides.

use crate::{assert, debug_assert};
use faer::MatMut;

/// Swaps rows `i` and `m`, then columns `i` and `m`.
///
/// `first_col` is the first column in which the two rows may differ.
#[inline]
fn swap_similarity(a: &mut MatMut<'_, f64>, i: usize, m: usize, first_col: usize) {
    let n = a.nrows();
    for j in first_col..n {
        let tmp = a.read(i, j);
        a.write(i, j, a.read(m, j));
        a.write(m, j, tmp);
    }
    for j in 0..n {
        let tmp = a.read(j, i);
        a.write(j, i, a.read(j, m));
        a.write(j, m, tmp);
    }
}

/// Subtracts `y` times row `m` from row `i`, then adds `y` times column `i` to column `m`.
///
/// Columns of row `i` before `first_col` are left untouched.
#[inline]
fn eliminate_similarity(a: &mut MatMut<'_, f64>, i: usize, m: usize, y: f64, first_col: usize) {
    let n = a.nrows();
    for j in first_col..n {
        a.write(i, j, a.read(i, j) - y * a.read(m, j));
    }
    for j in 0..n {
        a.write(j, m, a.read(j, m) + y * a.read(j, i));
    }
}

/// Reduces `a` to upper Hessenberg form in place.
///
/// On output, all the elements below the first subdiagonal are exactly zero. The similarity
/// transform is not accumulated.
///
/// # Panics
/// Panics if `a` is not square.
#[track_caller]
pub fn make_hessenberg_in_place(mut a: MatMut<'_, f64>) {
    let n = a.nrows();
    assert!(a.ncols() == n);

    for m in 1..n.saturating_sub(1) {
        let mut x = 0.0f64;
        let mut i = m;
        for j in m..n {
            let v = a.read(j, m - 1);
            if v.abs() > x.abs() {
                x = v;
                i = j;
            }
        }

        if i != m {
            swap_similarity(&mut a, i, m, m - 1);
        }

        if x == 0.0 {
            continue;
        }

        for i in m + 1..n {
            let y = a.read(i, m - 1);
            if y != 0.0 {
                let y = y / x;
                eliminate_similarity(&mut a, i, m, y, m);
                a.write(i, m - 1, 0.0);
            }
        }
    }

    for j in 0..n {
        for i in j + 2..n {
            debug_assert!(a.read(i, j) == 0.0);
        }
    }
}
