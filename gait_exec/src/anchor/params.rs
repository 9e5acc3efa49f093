//! Parameters structure for ground sensing

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::ground::LayerMask;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the per-leg ground detection rays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensingParams {
    /// Length of the detection rays.
    ///
    /// Units: meters
    pub detection_distance_m: f64,

    /// Layers the leg rays may hit.
    #[serde(default)]
    pub leg_ray_mask: LayerMask,

    /// Number of consecutive misses after which a leg is reported as having lost the ground.
    #[serde(default = "default_max_consec_misses")]
    pub max_consec_misses: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SensingParams {
    fn default() -> Self {
        Self {
            detection_distance_m: 5.0,
            leg_ray_mask: LayerMask::ALL,
            max_consec_misses: default_max_consec_misses(),
        }
    }
}

impl SensingParams {
    /// Returns a description of the first invalid value, if any.
    pub fn check(&self) -> Option<String> {
        if !(self.detection_distance_m.is_finite() && self.detection_distance_m > 0.0) {
            return Some(format!(
                "detection distance must be positive and finite, got {}",
                self.detection_distance_m
            ));
        }
        None
    }
}

fn default_max_consec_misses() -> usize {
    50
}
