//! Parameters structure for body control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::ground::{Layer, LayerMask, BODY_LAYER};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for body height calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyParams {
    /// Fraction of the remaining distance to the target height covered each tick, in (0, 1].
    #[serde(default = "default_smoothing_rate")]
    pub smoothing_rate: f64,

    /// If true the downward body ray ignores colliders on `body_layer`.
    #[serde(default)]
    pub exclude_self: bool,

    /// Layer of the body's own colliders.
    #[serde(default = "default_body_layer")]
    pub body_layer: Layer,

    /// Leg whose initial rest height defines the body height offset.
    #[serde(default)]
    pub reference_leg: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            smoothing_rate: default_smoothing_rate(),
            exclude_self: false,
            body_layer: default_body_layer(),
            reference_leg: 0,
        }
    }
}

impl BodyParams {
    /// Mask used for the downward body ray.
    pub fn ray_mask(&self) -> LayerMask {
        if self.exclude_self {
            LayerMask::ALL.without(self.body_layer)
        } else {
            LayerMask::ALL
        }
    }

    /// Returns a description of the first invalid value, if any.
    pub fn check(&self, num_legs: usize) -> Option<String> {
        if !(self.smoothing_rate > 0.0 && self.smoothing_rate <= 1.0) {
            return Some(format!(
                "body smoothing rate must be in (0, 1], got {}",
                self.smoothing_rate
            ));
        }
        if num_legs > 0 && self.reference_leg >= num_legs {
            return Some(format!(
                "reference leg {} is out of range, there are {} legs",
                self.reference_leg, num_legs
            ));
        }
        None
    }
}

fn default_smoothing_rate() -> f64 {
    0.1
}

fn default_body_layer() -> Layer {
    BODY_LAYER
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ray_mask() {
        let mut p = BodyParams::default();
        assert_eq!(p.ray_mask(), LayerMask::ALL);

        p.exclude_self = true;
        assert!(!p.ray_mask().contains(BODY_LAYER));
    }

    #[test]
    fn test_check() {
        let mut p = BodyParams::default();
        assert!(p.check(4).is_none());

        p.smoothing_rate = 1.0;
        assert!(p.check(4).is_none());

        p.smoothing_rate = 0.0;
        assert!(p.check(4).is_some());

        p.smoothing_rate = 0.5;
        p.reference_leg = 4;
        assert!(p.check(4).is_some());
        assert!(p.check(0).is_none());
    }
}
