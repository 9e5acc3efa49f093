//! Shaping curves applied to flight progress

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use util::maths::poly_val;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A pure function of flight progress in [0, 1].
///
/// Curves are expected, but not required, to map into [0, 1]. They must be deterministic.
pub trait ShapingCurve {
    fn eval(&self, progress: f64) -> f64;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Curves which can be selected from a parameter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CurveKind {
    /// `p`
    Linear,

    /// `3p^2 - 2p^3`
    SmoothStep,

    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseOutSine,

    /// `4p(1 - p)`, zero at both ends and one at the midpoint.
    Parabola,

    /// Polynomial in `p` with coefficients from the highest power down.
    Poly { coeffs: Vec<f64> },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CurveKind {
    fn default() -> Self {
        CurveKind::Linear
    }
}

impl CurveKind {
    pub(crate) fn parabola() -> Self {
        CurveKind::Parabola
    }
}

impl ShapingCurve for CurveKind {
    fn eval(&self, p: f64) -> f64 {
        match self {
            CurveKind::Linear => p,
            CurveKind::SmoothStep => p * p * (3.0 - 2.0 * p),
            CurveKind::EaseInQuad => p * p,
            CurveKind::EaseOutQuad => p * (2.0 - p),
            CurveKind::EaseInOutQuad => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    1.0 - 2.0 * (1.0 - p) * (1.0 - p)
                }
            }
            CurveKind::EaseOutSine => (p * FRAC_PI_2).sin(),
            CurveKind::Parabola => 4.0 * p * (1.0 - p),
            CurveKind::Poly { coeffs } => poly_val(&p, coeffs),
        }
    }
}

impl<F> ShapingCurve for F
where
    F: Fn(f64) -> f64,
{
    fn eval(&self, progress: f64) -> f64 {
        self(progress)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_curve_endpoints() {
        let unit_curves = [
            CurveKind::Linear,
            CurveKind::SmoothStep,
            CurveKind::EaseInQuad,
            CurveKind::EaseOutQuad,
            CurveKind::EaseInOutQuad,
            CurveKind::EaseOutSine,
        ];

        for c in unit_curves.iter() {
            assert!(c.eval(0.0).abs() < 1e-12, "{:?}", c);
            assert!((c.eval(1.0) - 1.0).abs() < 1e-12, "{:?}", c);
        }

        assert_eq!(CurveKind::Parabola.eval(0.0), 0.0);
        assert_eq!(CurveKind::Parabola.eval(0.5), 1.0);
        assert_eq!(CurveKind::Parabola.eval(1.0), 0.0);
    }

    #[test]
    fn test_poly_and_closure() {
        // p^2 + 0p + 0.5
        let poly = CurveKind::Poly {
            coeffs: vec![1.0, 0.0, 0.5],
        };
        assert_eq!(poly.eval(2.0), 4.5);

        let closure = |p: f64| 1.0 - p;
        assert_eq!(closure.eval(0.25), 0.75);
    }

    #[test]
    fn test_curve_deserialise() {
        #[derive(Deserialize)]
        struct Curves {
            a: CurveKind,
            b: CurveKind,
        }

        let c: Curves = util::params::from_str(
            r#"
            a = { type = "ease_in_out_quad" }
            b = { type = "poly", coeffs = [1.0, 0.0] }
            "#,
        )
        .unwrap();

        assert_eq!(c.a, CurveKind::EaseInOutQuad);
        assert_eq!(c.b, CurveKind::Poly { coeffs: vec![1.0, 0.0] });
    }
}
