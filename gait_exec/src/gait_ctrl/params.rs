//! Parameters structure for GaitCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::InitError;
use crate::{
    anchor::SensingParams, body_ctrl::BodyParams, gait_sched::Grouping, leg_ctrl::StepParams,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for gait control, read once at initialisation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
    // ---- STEPPING ----
    pub step: StepParams,

    // ---- SENSING ----
    #[serde(default)]
    pub sensing: SensingParams,

    // ---- BODY ----
    #[serde(default)]
    pub body: BodyParams,

    // ---- GAIT ----
    /// Assignment of legs to phase groups
    #[serde(default)]
    pub grouping: Grouping,

    // ---- GEOMETRY ----
    /// One entry per leg, in leg index order
    #[serde(default)]
    pub legs: Vec<LegParams>,

    /// If true per-tick leg and body states are archived in the session
    #[serde(default)]
    pub archive: bool,
}

/// Parameters of a single leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegParams {
    /// Position of the leg's natural foot placement.
    ///
    /// Units: meters,
    /// Frame: Body
    pub anchor_m_rb: [f64; 3],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the numeric parameters are usable.
    pub fn validate(&self) -> Result<(), InitError> {
        let problem = self
            .step
            .check()
            .or_else(|| self.sensing.check())
            .or_else(|| self.body.check(self.legs.len()));

        match problem {
            Some(p) => Err(InitError::InvalidParams(p)),
            None => Ok(()),
        }
    }

    /// Anchor positions of every leg in the body frame.
    pub fn anchors_m_rb(&self) -> Vec<Vector3<f64>> {
        self.legs
            .iter()
            .map(|l| Vector3::from(l.anchor_m_rb))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ground::{LayerMask, BODY_LAYER};

    #[test]
    fn test_load_params() {
        let p: Params = util::params::from_str(
            r#"
            archive = true

            [step]
            threshold_m = 0.3
            move_speed_ms = 1.5
            min_step_duration_s = 0.1
            vertical_curve = { type = "smooth_step" }

            [sensing]
            detection_distance_m = 2.0
            leg_ray_mask = 1

            [body]
            smoothing_rate = 0.2
            exclude_self = true

            [grouping]
            type = "parity"
            num_groups = 2

            [[legs]]
            anchor_m_rb = [0.4, -0.3, 0.4]

            [[legs]]
            anchor_m_rb = [0.4, -0.3, -0.4]
            "#,
        )
        .unwrap();

        assert!(p.archive);
        assert_eq!(p.step.min_step_duration_s, 0.1);
        assert_eq!(p.sensing.leg_ray_mask, LayerMask::only(0));
        assert_eq!(p.body.body_layer, BODY_LAYER);
        assert_eq!(p.anchors_m_rb()[1], Vector3::new(0.4, -0.3, -0.4));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let mut p = Params::default();
        assert!(p.validate().is_ok());

        p.body.smoothing_rate = 1.5;
        assert!(matches!(p.validate(), Err(InitError::InvalidParams(_))));

        let mut p = Params::default();
        p.sensing.detection_distance_m = 0.0;
        assert!(matches!(p.validate(), Err(InitError::InvalidParams(_))));
    }
}
