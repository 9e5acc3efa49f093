//! Parameters structure for stepping

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{CurveKind, ShapingCurve};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Allowed deviation of the shaping curves from their required end values.
const CURVE_END_TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters controlling when and how legs step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepParams {
    /// A leg whose foot is further than this from its rest position will step.
    ///
    /// Units: meters
    pub threshold_m: f64,

    /// Speed at which the foot travels towards its new rest position.
    ///
    /// Units: meters/second
    pub move_speed_ms: f64,

    /// Lower bound on the duration of a step.
    ///
    /// Units: seconds
    #[serde(default)]
    pub min_step_duration_s: f64,

    /// Shaping of the vertical interpolation between start and end heights.
    #[serde(default)]
    pub vertical_curve: CurveKind,

    /// Shaping of the lift towards the apex. Should be 0 at both ends of the step.
    #[serde(default = "CurveKind::parabola")]
    pub lift_curve: CurveKind,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for StepParams {
    fn default() -> Self {
        Self {
            threshold_m: 3.0,
            move_speed_ms: 4.0,
            min_step_duration_s: 0.0,
            vertical_curve: CurveKind::Linear,
            lift_curve: CurveKind::Parabola,
        }
    }
}

impl StepParams {
    /// Returns a description of the first invalid value, if any.
    pub fn check(&self) -> Option<String> {
        if !(self.threshold_m >= 0.0) {
            return Some(format!("step threshold must not be negative, got {}", self.threshold_m));
        }
        if !(self.move_speed_ms > 0.0) {
            return Some(format!("move speed must be positive, got {}", self.move_speed_ms));
        }
        if !(self.min_step_duration_s >= 0.0) {
            return Some(format!(
                "minimum step duration must not be negative, got {}",
                self.min_step_duration_s
            ));
        }

        // The foot must leave and land on the planned points
        let ends = [
            ("vertical curve at 0", self.vertical_curve.eval(0.0), 0.0),
            ("vertical curve at 1", self.vertical_curve.eval(1.0), 1.0),
            ("lift curve at 0", self.lift_curve.eval(0.0), 0.0),
            ("lift curve at 1", self.lift_curve.eval(1.0), 0.0),
        ];
        for (name, value, expected) in ends.iter() {
            if !((value - expected).abs() <= CURVE_END_TOL) {
                return Some(format!("{} must be {}, got {}", name, expected, value));
            }
        }

        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_step_params_defaults() {
        let p: StepParams = util::params::from_str(
            r#"
            threshold_m = 3.0
            move_speed_ms = 4.0
            "#,
        )
        .unwrap();

        assert_eq!(p, StepParams::default());
        assert!(p.check().is_none());
    }

    #[test]
    fn test_step_params_check() {
        let mut p = StepParams::default();
        p.move_speed_ms = 0.0;
        assert!(p.check().is_some());

        let mut p = StepParams::default();
        p.threshold_m = -1.0;
        assert!(p.check().is_some());

        let mut p = StepParams::default();
        p.min_step_duration_s = f64::NAN;
        assert!(p.check().is_some());
    }

    #[test]
    fn test_step_params_curve_ends() {
        // A linear lift would leave the foot raised at landing
        let mut p = StepParams::default();
        p.lift_curve = CurveKind::Linear;
        assert!(p.check().unwrap().contains("lift curve at 1"));

        // A parabolic vertical never reaches the end height
        let mut p = StepParams::default();
        p.vertical_curve = CurveKind::Parabola;
        assert!(p.check().unwrap().contains("vertical curve at 1"));

        let mut p = StepParams::default();
        p.vertical_curve = CurveKind::Poly {
            coeffs: vec![1.0, 0.5],
        };
        assert!(p.check().unwrap().contains("vertical curve at 0"));

        // Eased curves are fine
        let mut p = StepParams::default();
        p.vertical_curve = CurveKind::SmoothStep;
        assert!(p.check().is_none());
    }
}
