//! Body height calibration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use nalgebra::{Point3, Unit, Vector3};
use ordered_float::OrderedFloat;
use serde::Serialize;

use super::BodyParams;
use crate::{ground::GroundSampler, leg_ctrl::Leg, loc::Pose};
use util::maths::exp_smooth;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The body's pose together with its fixed height above the leg rest positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyFrame {
    pub pose: Pose,

    /// Vertical distance between the body and the reference leg's rest height, fixed at
    /// initialisation.
    ///
    /// Units: meters
    pub height_offset_m: f64,
}

/// Calibrates the body height once per tick.
#[derive(Debug, Clone, Default)]
pub struct BodyHeightCalibrator {
    params: BodyParams,
}

/// Status of a single calibration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HeightReport {
    /// Candidate height from the ground below the body
    pub candidate_a_m: f64,

    /// True if the body ray hit something
    pub ground_hit: bool,

    /// Candidate height from the leg stance envelope
    pub candidate_b_m: f64,

    pub target_m: f64,

    /// Body height after smoothing
    pub height_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BodyFrame {
    /// Create a body frame, fixing the height offset against a reference rest position.
    pub fn new(pose: Pose, reference_rest_m: &Point3<f64>) -> Self {
        Self {
            pose,
            height_offset_m: pose.position_m_w.y - reference_rest_m.y,
        }
    }

    pub fn up(&self) -> Unit<Vector3<f64>> {
        self.pose.up()
    }

    pub fn height_m(&self) -> f64 {
        self.pose.position_m_w.y
    }
}

impl BodyHeightCalibrator {
    pub fn new(params: BodyParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BodyParams {
        &self.params
    }

    /// Move the body height one step towards the higher of the ground and stance candidates.
    pub fn calibrate<S>(
        &self,
        body: &mut BodyFrame,
        legs: &[Leg],
        sampler: &S,
        detection_distance_m: f64,
    ) -> HeightReport
    where
        S: GroundSampler + ?Sized,
    {
        let current_m = body.height_m();
        let offset_m = body.height_offset_m;
        let up = body.up();

        // Candidate A, ground below the body. A miss leaves the body where it is.
        let origin_m = body.pose.position() + up.into_inner() * offset_m;
        let hit = sampler.raycast(
            &origin_m,
            &(-up.into_inner()),
            detection_distance_m + offset_m,
            self.params.ray_mask(),
        );
        let candidate_a_m = match hit {
            Some(ref h) => h.point_m.y + offset_m,
            None => current_m,
        };

        // Candidate B, middle of the stance envelope
        let max_rest = legs.iter().map(|l| OrderedFloat(l.rest_position_m.y)).max();
        let min_rest = legs.iter().map(|l| OrderedFloat(l.rest_position_m.y)).min();
        let candidate_b_m = match (max_rest, min_rest) {
            (Some(max), Some(min)) => (max.0 + min.0) / 2.0 + offset_m,
            _ => current_m,
        };

        let target_m = candidate_a_m.max(candidate_b_m);
        let height_m = exp_smooth(current_m, target_m, self.params.smoothing_rate);
        body.pose.position_m_w.y = height_m;

        trace!(
            "Body height {:.4} m (A: {:.4}, B: {:.4}, target: {:.4})",
            height_m,
            candidate_a_m,
            candidate_b_m,
            target_m
        );

        HeightReport {
            candidate_a_m,
            ground_hit: hit.is_some(),
            candidate_b_m,
            target_m,
            height_m,
        }
    }
}
