//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Linearly interpolate between `a` and `b`, `t = 0` giving `a` and `t = 1`
/// giving `b`. `t` is not clamped.
pub fn lerp<T>(a: T, b: T, t: T) -> T
where
    T: Float
{
    a + (b - a) * t
}

/// Move `current` towards `target` by the fraction `rate` of the remaining
/// distance.
///
/// Applied once per cycle this gives exponential convergence. For `rate` in
/// (0, 1] the result never passes `target`.
pub fn exp_smooth<T>(current: T, target: T, rate: T) -> T
where
    T: Float
{
    current + (target - current) * rate
}

/// Apply polynomial coefficients to a value.
///
/// Coefficients are ordered from the highest power down to the constant.
pub fn poly_val<T>(value: &T, coeffs: &[T]) -> T
where
    T: Float + std::ops::AddAssign
{
    let mut res = T::zero();

    for (i, c) in coeffs.iter().enumerate() {
        res += value.powi((coeffs.len() - 1 - i) as i32) * *c;
    }

    res
}

/// Clamp `value` to the range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2f64, 4f64, 0.0), 2.0);
        assert_eq!(lerp(2f64, 4f64, 0.5), 3.0);
        assert_eq!(lerp(2f64, 4f64, 1.0), 4.0);
    }

    #[test]
    fn test_exp_smooth() {
        assert_eq!(exp_smooth(0f64, 10f64, 0.5), 5.0);
        assert_eq!(exp_smooth(0f64, 10f64, 1.0), 10.0);

        // Repeated application approaches without passing the target
        let mut h = 0f64;
        for _ in 0..50 {
            let next = exp_smooth(h, 1.0, 0.2);
            assert!(next > h && next <= 1.0);
            h = next;
        }
    }

    #[test]
    fn test_poly_val() {
        // 2x^2 - 3x + 1 at x = 2
        assert_eq!(poly_val(&2f64, &[2.0, -3.0, 1.0]), 3.0);
        assert_eq!(poly_val(&2f64, &[]), 0.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&1.5f64, &0.0, &1.0), 1.0);
        assert_eq!(clamp(&-0.5f64, &0.0, &1.0), 0.0);
        assert_eq!(clamp(&0.25f64, &0.0, &1.0), 0.25);
    }
}
