use num_complex::Complex64;

/// Sorts `s` by non-decreasing real part.
///
/// The sort is stable, so eigenvalues with equal real parts, such as complex conjugate pairs,
/// keep their relative order.
pub fn sort_by_real_part(s: &mut [Complex64]) {
    // insertion sort, the inputs are small and often nearly sorted
    for j in 1..s.len() {
        let x = s[j];
        let mut i = j;
        while i > 0 && s[i - 1].re > x.re {
            s[i] = s[i - 1];
            i -= 1;
        }
        s[i] = x;
    }
}
