//! # Foot anchor module
//!
//! Every leg has an anchor, a fixed offset in the body frame marking where its foot naturally
//! rests. Each tick a ray is cast down from above every anchor and the hit point becomes the leg's
//! rest position. A leg whose ray misses keeps its previous rest position.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use nalgebra::{Point3, Vector3};
use serde::Serialize;

use crate::{body_ctrl::BodyFrame, debug_draw::DebugDraw, ground::GroundSampler, leg_ctrl::Leg};

pub use params::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Body-frame anchors of every leg, plus per-leg sampling history.
#[derive(Debug, Clone, Default)]
pub struct FootAnchorSet {
    /// Anchor offsets
    ///
    /// Frame: Body
    anchors_m_rb: Vec<Vector3<f64>>,

    /// Number of consecutive ticks each leg's ray has missed
    consec_misses: Vec<usize>,

    /// Set once a leg's lost ground has been reported, cleared on the next hit
    miss_reported: Vec<bool>,
}

/// Summary of one refresh of the rest positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AnchorReport {
    pub num_hits: usize,
    pub num_misses: usize,

    /// Longest current run of misses over all legs
    pub max_consec_misses: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FootAnchorSet {
    pub fn new(anchors_m_rb: Vec<Vector3<f64>>) -> Self {
        let num_legs = anchors_m_rb.len();
        Self {
            anchors_m_rb,
            consec_misses: vec![0; num_legs],
            miss_reported: vec![false; num_legs],
        }
    }

    pub fn len(&self) -> usize {
        self.anchors_m_rb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors_m_rb.is_empty()
    }

    pub fn anchor_m_rb(&self, leg: usize) -> Option<&Vector3<f64>> {
        self.anchors_m_rb.get(leg)
    }

    /// Anchor of a leg in the world frame.
    pub fn anchor_world(&self, leg: usize, body: &BodyFrame) -> Option<Point3<f64>> {
        self.anchors_m_rb.get(leg).map(|a| body.pose.to_world(a))
    }

    /// Number of consecutive ticks the leg's ray has missed.
    pub fn consec_misses(&self, leg: usize) -> usize {
        self.consec_misses.get(leg).copied().unwrap_or(0)
    }

    /// Refresh the rest position of every leg from the ground below its anchor.
    ///
    /// Rays start `height_offset_m` above the anchor along the body's up direction and search
    /// downwards for `detection_distance_m`. Legs are processed in index order.
    pub fn refresh<S>(
        &mut self,
        legs: &mut [Leg],
        body: &BodyFrame,
        sampler: &S,
        params: &SensingParams,
        debug: &mut dyn DebugDraw,
    ) -> AnchorReport
    where
        S: GroundSampler + ?Sized,
    {
        let mut report = AnchorReport::default();
        let up = body.up().into_inner();
        let down = -up;

        for leg in legs.iter_mut() {
            let i = leg.index;
            let anchor_m = match self.anchor_world(i, body) {
                Some(a) => a,
                None => continue,
            };

            let origin_m = anchor_m + up * body.height_offset_m;
            let hit = sampler.raycast(&origin_m, &down, params.detection_distance_m, params.leg_ray_mask);

            match hit {
                Some(h) => {
                    leg.rest_position_m = h.point_m;
                    report.num_hits += 1;
                    self.consec_misses[i] = 0;
                    self.miss_reported[i] = false;

                    debug.detection_ray(i, &origin_m, &h.point_m, true);
                }
                None => {
                    report.num_misses += 1;
                    self.consec_misses[i] += 1;

                    if self.consec_misses[i] > params.max_consec_misses && !self.miss_reported[i] {
                        warn!(
                            "Leg {} has found no ground for {} ticks, holding its rest position",
                            i, self.consec_misses[i]
                        );
                        self.miss_reported[i] = true;
                    }

                    debug.detection_ray(
                        i,
                        &origin_m,
                        &(origin_m + down * params.detection_distance_m),
                        false,
                    );
                }
            }

            report.max_consec_misses = report.max_consec_misses.max(self.consec_misses[i]);
            debug.rest_point(i, &leg.rest_position_m);
        }

        report
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        debug_draw::{NoDebugDraw, RecordingDebugDraw},
        ground::{FlatGround, GroundHit, LayerMask, TerrainMap},
        loc::Pose,
    };
    use nalgebra::UnitQuaternion;

    /// Four anchors at the corners of a square, 1 m below the body.
    fn square_anchors() -> FootAnchorSet {
        FootAnchorSet::new(vec![
            Vector3::new(1.0, -1.0, 1.0),
            Vector3::new(1.0, -1.0, -1.0),
            Vector3::new(-1.0, -1.0, 1.0),
            Vector3::new(-1.0, -1.0, -1.0),
        ])
    }

    fn make_legs(anchors: &FootAnchorSet, body: &BodyFrame) -> Vec<Leg> {
        (0..anchors.len())
            .filter_map(|i| anchors.anchor_world(i, body).map(|a| Leg::new(i, a)))
            .collect()
    }

    /// Sampler which only hits along rays passing over x > 0.
    struct HalfGround;

    impl GroundSampler for HalfGround {
        fn raycast(
            &self,
            origin_m: &Point3<f64>,
            dir: &Vector3<f64>,
            max_distance_m: f64,
            mask: LayerMask,
        ) -> Option<GroundHit> {
            if origin_m.x > 0.0 {
                FlatGround::new(-0.5).raycast(origin_m, dir, max_distance_m, mask)
            } else {
                None
            }
        }
    }

    #[test]
    fn test_anchor_world() {
        let anchors = square_anchors();
        let body = BodyFrame {
            pose: Pose::new(
                Vector3::new(10.0, 1.0, 0.0),
                UnitQuaternion::from_euler_angles(0.0, std::f64::consts::PI, 0.0),
            ),
            height_offset_m: 1.0,
        };

        // Turned half way round about the vertical
        let a = anchors.anchor_world(0, &body).unwrap();
        assert!((a - Point3::new(9.0, 0.0, -1.0)).norm() < 1e-12);
        assert!(anchors.anchor_world(4, &body).is_none());
    }

    #[test]
    fn test_refresh_hits() {
        let anchors_init = square_anchors();
        let mut anchors = anchors_init.clone();
        let body = BodyFrame {
            pose: Pose::from_position(0.0, 1.0, 0.0),
            height_offset_m: 1.0,
        };
        let mut legs = make_legs(&anchors, &body);

        // Ground drops away to the slope
        let terrain = TerrainMap::from_fn([0.25, 0.25], [41, 41], [0.0, 0.0], |x, _| 0.25 * x - 0.5).unwrap();

        let mut draw = RecordingDebugDraw::default();
        let report = anchors.refresh(&mut legs, &body, &terrain, &SensingParams::default(), &mut draw);

        assert_eq!(report.num_hits, 4);
        assert_eq!(report.num_misses, 0);
        for leg in legs.iter() {
            let expected_y = 0.25 * leg.rest_position_m.x - 0.5;
            assert!((leg.rest_position_m.y - expected_y).abs() < 1e-9);

            // Only the rest position moves, the foot waits for a step
            assert_eq!(leg.foot_position_m, anchors_init.anchor_world(leg.index, &body).unwrap());
        }

        assert_eq!(draw.rays.len(), 4);
        assert_eq!(draw.rest_points.len(), 4);
        assert!(draw.rays.iter().all(|r| r.hit && r.origin_m.y == 1.0));
        assert_eq!(draw.rays[2].leg, 2);
    }

    #[test]
    fn test_refresh_miss_holds_position() {
        let mut anchors = square_anchors();
        let body = BodyFrame {
            pose: Pose::from_position(0.0, 1.0, 0.0),
            height_offset_m: 1.0,
        };
        let mut legs = make_legs(&anchors, &body);
        let params = SensingParams {
            max_consec_misses: 3,
            ..SensingParams::default()
        };

        for tick in 1..=5 {
            let report = anchors.refresh(&mut legs, &body, &HalfGround, &params, &mut NoDebugDraw);
            assert_eq!(report.num_hits, 2);
            assert_eq!(report.num_misses, 2);
            assert_eq!(report.max_consec_misses, tick);
        }

        // Legs 0 and 1 are over the ground, 2 and 3 keep their stale rest positions
        assert_eq!(legs[0].rest_position_m, Point3::new(1.0, -0.5, 1.0));
        assert_eq!(legs[1].rest_position_m, Point3::new(1.0, -0.5, -1.0));
        assert_eq!(legs[2].rest_position_m, Point3::new(-1.0, 0.0, 1.0));
        assert_eq!(legs[3].rest_position_m, Point3::new(-1.0, 0.0, -1.0));
        assert_eq!(anchors.consec_misses(2), 5);
        assert_eq!(anchors.consec_misses(0), 0);

        // Out of range rays also miss
        let short = SensingParams {
            detection_distance_m: 1.0,
            ..SensingParams::default()
        };
        let report = anchors.refresh(&mut legs, &body, &FlatGround::new(-5.0), &short, &mut NoDebugDraw);
        assert_eq!(report.num_misses, 4);
    }
}
