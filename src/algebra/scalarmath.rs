use super::{FloatT, ScalarMath};

impl<T: FloatT> ScalarMath for T {
    type T = T;
    fn logsafe(&self) -> T {
        if *self <= T::zero() {
            -T::infinity()
        } else {
            self.ln()
        }
    }
}

pub(crate) fn triangular_number(k: usize) -> usize {
    (k * (k + 1)) >> 1
}

#[test]
fn test_scalar_log() {
    assert_eq!((0.0f64).logsafe(), f64::NEG_INFINITY);
    assert_eq!((1.0f64).logsafe(), 0.0);
    assert_eq!(triangular_number(4), 10);
}
