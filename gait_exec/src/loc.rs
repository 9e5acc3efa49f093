//! # Localisation types
//!
//! The world frame is right handed with +Y up. The body frame has the same axes as the world frame
//! when the attitude is the identity.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose (position and attitude in the world frame) of the body.
///
/// More specifically this represents the Body (B) frame in the World (W)
/// frame.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Pose {
    /// The position in the W frame
    pub position_m_w: Vector3<f64>,

    /// The attitude of the body in the W frame. This is a quaternion that
    /// will rotate an object from the B frame into the W frame.
    pub attitude_q_w: UnitQuaternion<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// Create a new pose from a position and an attitude.
    pub fn new(position_m_w: Vector3<f64>, attitude_q_w: UnitQuaternion<f64>) -> Self {
        Self {
            position_m_w,
            attitude_q_w,
        }
    }

    /// Create an un-rotated pose at the given position.
    pub fn from_position(x: f64, y: f64, z: f64) -> Self {
        Self::new(Vector3::new(x, y, z), UnitQuaternion::identity())
    }

    /// The position of the body as a point.
    pub fn position(&self) -> Point3<f64> {
        Point3::from(self.position_m_w)
    }

    /// The local up direction of the body in the W frame.
    pub fn up(&self) -> Unit<Vector3<f64>> {
        Unit::new_normalize(self.attitude_q_w * Vector3::y())
    }

    /// Transform a point given in the B frame into the W frame.
    pub fn to_world(&self, point_m_b: &Vector3<f64>) -> Point3<f64> {
        Point3::from(self.position_m_w + self.attitude_q_w * point_m_b)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pose_transform() {
        let pose = Pose::from_position(1.0, 2.0, 3.0);
        assert_eq!(pose.to_world(&Vector3::new(1.0, -1.0, 0.0)), Point3::new(2.0, 1.0, 3.0));
        assert_eq!(pose.up().into_inner(), Vector3::y());

        // Rolled over by 90 degrees about X, up now points along +Z
        let rolled = Pose::new(
            Vector3::zeros(),
            UnitQuaternion::from_euler_angles(std::f64::consts::FRAC_PI_2, 0.0, 0.0),
        );
        assert!((rolled.up().into_inner() - Vector3::z()).norm() < 1e-12);
    }
}
