/// Returns the magnitude of `a` with the sign bit of `b`.
///
/// A negative zero `b` yields a negative result.
#[inline(always)]
pub(crate) fn sign(a: f64, b: f64) -> f64 {
    if b.is_sign_negative() {
        -a.abs()
    } else {
        a.abs()
    }
}
