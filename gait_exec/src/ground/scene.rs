//! # Scene
//!
//! A collection of colliders queried as a single ground sampler.

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use super::{ray_dir, FlatGround, GroundHit, GroundSampler, Layer, LayerMask, TerrainMap, BODY_LAYER};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Ordered set of colliders. A raycast returns the nearest hit over all colliders in the mask.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    colliders: Vec<Collider>,
}

/// Index of a collider within a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(usize);

/// A sphere, used to stand in for the walking body's own geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub centre_m: Point3<f64>,
    pub radius_m: f64,
    pub layer: Layer,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Collider {
    Terrain(TerrainMap),
    Flat(FlatGround),
    Sphere(Sphere),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collider to the scene, returning its id.
    pub fn add(&mut self, collider: Collider) -> ColliderId {
        self.colliders.push(collider);
        ColliderId(self.colliders.len() - 1)
    }

    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(id.0)
    }

    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        self.colliders.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl GroundSampler for Scene {
    fn raycast(
        &self,
        origin_m: &Point3<f64>,
        dir: &Vector3<f64>,
        max_distance_m: f64,
        mask: LayerMask,
    ) -> Option<GroundHit> {
        let mut nearest: Option<GroundHit> = None;

        for collider in self.colliders.iter() {
            if let Some(hit) = collider.raycast(origin_m, dir, max_distance_m, mask) {
                match nearest {
                    Some(ref n) if n.distance_m <= hit.distance_m => (),
                    _ => nearest = Some(hit),
                }
            }
        }

        nearest
    }
}

impl GroundSampler for Collider {
    fn raycast(
        &self,
        origin_m: &Point3<f64>,
        dir: &Vector3<f64>,
        max_distance_m: f64,
        mask: LayerMask,
    ) -> Option<GroundHit> {
        match self {
            Collider::Terrain(t) => t.raycast(origin_m, dir, max_distance_m, mask),
            Collider::Flat(f) => f.raycast(origin_m, dir, max_distance_m, mask),
            Collider::Sphere(s) => s.raycast(origin_m, dir, max_distance_m, mask),
        }
    }
}

impl Sphere {
    /// A sphere on the body layer.
    pub fn body(centre_m: Point3<f64>, radius_m: f64) -> Self {
        Self {
            centre_m,
            radius_m,
            layer: BODY_LAYER,
        }
    }
}

impl GroundSampler for Sphere {
    /// Rays starting inside the sphere never hit it.
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
        let dir = ray_dir(dir, max_distance_m)?.into_inner();

        let oc = origin_m - self.centre_m;
        let c = oc.norm_squared() - self.radius_m * self.radius_m;
        if c <= 0.0 {
            return None;
        }

        let b = oc.dot(&dir);
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }

        let t = -b - disc.sqrt();
        if t < 0.0 || t > max_distance_m {
            return None;
        }

        let point_m = origin_m + dir * t;

        Some(GroundHit {
            point_m,
            normal: Unit::new_normalize(point_m - self.centre_m),
            distance_m: t,
            layer: self.layer,
        })
    }
}
