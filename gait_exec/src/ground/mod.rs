//! # Ground sampling
//!
//! The gait core never inspects geometry directly, it asks a [`GroundSampler`] to cast a ray and
//! report the first contact. Samplers filter what they may hit with a [`LayerMask`], which is how
//! the body can exclude its own geometry from downward rays.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod scene;
mod terrain_map;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

pub use scene::*;
pub use terrain_map::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Layer of terrain colliders.
pub const TERRAIN_LAYER: Layer = 0;

/// Default layer of the walking body's own colliders.
pub const BODY_LAYER: Layer = 8;

/// Directions shorter than this are treated as zero.
const MIN_DIR_NORM: f64 = 1e-12;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Identifier of a collision layer, in the range `0..32`.
pub type Layer = u8;

/// Set of layers a ray is allowed to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

/// A contact reported by a ground query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    /// The contact point in the W frame
    pub point_m: Point3<f64>,

    /// Surface normal at the contact point
    pub normal: Unit<Vector3<f64>>,

    /// Distance along the ray from the origin to the contact
    pub distance_m: f64,

    /// Layer of the collider that was hit
    pub layer: Layer,
}

/// An infinite horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatGround {
    /// Height of the plane
    pub height_m: f64,

    /// Layer the plane sits on
    pub layer: Layer,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Ray-intersection service used to detect the ground.
pub trait GroundSampler {
    /// Cast a ray from `origin_m` along `dir`, searching up to `max_distance_m`, and return the
    /// nearest contact on a layer contained in `mask`, or `None` if there is no contact.
    ///
    /// `dir` does not need to be normalised. A zero direction or a non-positive maximum distance
    /// never produces a contact.
    fn raycast(
        &self,
        origin_m: &Point3<f64>,
        dir: &Vector3<f64>,
        max_distance_m: f64,
        mask: LayerMask,
    ) -> Option<GroundHit>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LayerMask {
    /// Mask hitting every layer.
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Mask hitting nothing.
    pub const NONE: LayerMask = LayerMask(0);

    /// Mask containing only the given layer.
    pub fn only(layer: Layer) -> Self {
        Self::NONE.with(layer)
    }

    /// This mask with `layer` added.
    pub fn with(self, layer: Layer) -> Self {
        match 1u32.checked_shl(layer as u32) {
            Some(bit) => LayerMask(self.0 | bit),
            None => self,
        }
    }

    /// This mask with `layer` removed.
    pub fn without(self, layer: Layer) -> Self {
        match 1u32.checked_shl(layer as u32) {
            Some(bit) => LayerMask(self.0 & !bit),
            None => self,
        }
    }

    /// Returns true if the mask contains `layer`.
    pub fn contains(&self, layer: Layer) -> bool {
        match 1u32.checked_shl(layer as u32) {
            Some(bit) => self.0 & bit != 0,
            None => false,
        }
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl FlatGround {
    pub fn new(height_m: f64) -> Self {
        Self {
            height_m,
            layer: TERRAIN_LAYER,
        }
    }
}

impl GroundSampler for FlatGround {
    fn raycast(
        &self,
        origin_m: &Point3<f64>,
        dir: &Vector3<f64>,
        max_distance_m: f64,
        mask: LayerMask,
    ) -> Option<GroundHit> {
        if !mask.contains(self.layer) {
            return None;
        }
        let dir = ray_dir(dir, max_distance_m)?;

        // Parallel to the plane
        if dir.y.abs() < MIN_DIR_NORM {
            return None;
        }

        let t = (self.height_m - origin_m.y) / dir.y;
        if t < 0.0 || t > max_distance_m {
            return None;
        }

        let mut point_m = origin_m + dir.into_inner() * t;
        point_m.y = self.height_m;

        Some(GroundHit {
            point_m,
            normal: Vector3::y_axis(),
            distance_m: t,
            layer: self.layer,
        })
    }
}

impl<'a, T: GroundSampler + ?Sized> GroundSampler for &'a T {
    fn raycast(
        &self,
        origin_m: &Point3<f64>,
        dir: &Vector3<f64>,
        max_distance_m: f64,
        mask: LayerMask,
    ) -> Option<GroundHit> {
        (**self).raycast(origin_m, dir, max_distance_m, mask)
    }
}

impl<T: GroundSampler + ?Sized> GroundSampler for Box<T> {
    fn raycast(
        &self,
        origin_m: &Point3<f64>,
        dir: &Vector3<f64>,
        max_distance_m: f64,
        mask: LayerMask,
    ) -> Option<GroundHit> {
        (**self).raycast(origin_m, dir, max_distance_m, mask)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Normalise a ray direction, rejecting zero directions and empty search ranges.
pub(crate) fn ray_dir(dir: &Vector3<f64>, max_distance_m: f64) -> Option<Unit<Vector3<f64>>> {
    if !(max_distance_m > 0.0) {
        return None;
    }
    Unit::try_new(*dir, MIN_DIR_NORM)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_layer_mask() {
        let mask = LayerMask::ALL.without(BODY_LAYER);
        assert!(mask.contains(TERRAIN_LAYER));
        assert!(!mask.contains(BODY_LAYER));

        let only = LayerMask::only(3);
        assert!(only.contains(3));
        assert!(!only.contains(0));

        // Layers beyond the mask width are never contained
        assert!(!LayerMask::ALL.contains(40));
        assert_eq!(LayerMask::default(), LayerMask::ALL);
    }

    #[test]
    fn test_flat_ground() {
        let ground = FlatGround::new(-1.0);
        let down = -Vector3::y();

        let hit = ground
            .raycast(&Point3::new(2.0, 3.0, 4.0), &down, 10.0, LayerMask::ALL)
            .unwrap();
        assert_eq!(hit.point_m, Point3::new(2.0, -1.0, 4.0));
        assert_eq!(hit.distance_m, 4.0);
        assert_eq!(hit.layer, TERRAIN_LAYER);

        // Out of range
        assert!(ground
            .raycast(&Point3::new(2.0, 3.0, 4.0), &down, 3.9, LayerMask::ALL)
            .is_none());

        // Pointing away, zero direction, filtered layer
        assert!(ground
            .raycast(&Point3::origin(), &Vector3::y(), 10.0, LayerMask::ALL)
            .is_none());
        assert!(ground
            .raycast(&Point3::origin(), &Vector3::zeros(), 10.0, LayerMask::ALL)
            .is_none());
        assert!(ground
            .raycast(&Point3::origin(), &down, 10.0, LayerMask::ALL.without(TERRAIN_LAYER))
            .is_none());

        // Unnormalised directions are accepted
        let hit = ground
            .raycast(&Point3::origin(), &(down * 7.0), 10.0, LayerMask::ALL)
            .unwrap();
        assert_eq!(hit.distance_m, 1.0);
    }
}
