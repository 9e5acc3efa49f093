//! # Terrain Map
//!
//! Height field over a regular grid in the XZ plane of the world frame. Heights are stored at the
//! grid vertices and interpolated bilinearly between them.

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use std::ops::Range;

use nalgebra::{Point3, Unit, Vector2, Vector3};
use ndarray::Array2;
use noise::{NoiseFn, Perlin, Seedable};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::{ray_dir, GroundHit, GroundSampler, Layer, LayerMask, TERRAIN_LAYER};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of bisection iterations used to refine a ray/terrain intersection.
const NUM_BISECTION_ITERS: usize = 24;

/// Padding added above and below the terrain's height band when clipping rays to the map.
const BAND_MARGIN_M: f64 = 1e-3;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Terrain Map
#[derive(Debug, Clone)]
pub struct TerrainMap {
    /// The size of each grid cell in meters per cell
    pub cell_size_m: Vector2<f64>,

    /// Position of the centre of the map in the XZ plane
    pub centre_m: Vector2<f64>,

    /// Layer the terrain sits on
    pub layer: Layer,

    /// Position of vertex (0, 0)
    lower_m: Vector2<f64>,

    /// Position of the last vertex
    upper_m: Vector2<f64>,

    /// Vertex heights, indexed by (x, z)
    heights: Array2<f64>,

    /// Lowest and highest vertex heights
    min_height_m: f64,
    max_height_m: f64,
}

/// Parameters describing a randomly generated terrain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainParams {
    /// The size of each grid cell in meters per cell
    pub cell_size_m: [f64; 2],

    /// Number of vertices along each axis
    pub num_cells: [usize; 2],

    /// Position of the centre of the map in the XZ plane
    pub centre_m: [f64; 2],

    /// Scaling applied to positions before sampling the noise function
    pub perlin_scale: [f64; 2],

    /// Seed of the noise function
    pub perlin_seed: u32,

    /// Peak height of the terrain
    pub amplitude_m: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TerrainMapError {
    #[error("A terrain map needs at least 2 vertices per axis, got {0:?}")]
    TooFewCells([usize; 2]),

    #[error("Cell size must be positive, got {0:?}")]
    InvalidCellSize([f64; 2]),

    #[error("Expected {expected} heights but got {found}")]
    DataSizeMismatch { expected: usize, found: usize },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TerrainMap {
    /// Create a new terrain map from heights listed in x-major order.
    pub fn new(
        cell_size_m: [f64; 2],
        num_cells: [usize; 2],
        centre_m: [f64; 2],
        heights: Vec<f64>,
    ) -> Result<Self, TerrainMapError> {
        Self::check_grid(cell_size_m, num_cells)?;

        let found = heights.len();
        let heights = Array2::from_shape_vec((num_cells[0], num_cells[1]), heights).map_err(
            |_| TerrainMapError::DataSizeMismatch {
                expected: num_cells[0] * num_cells[1],
                found,
            },
        )?;

        Ok(Self::from_array(cell_size_m, centre_m, heights))
    }

    /// Create a new terrain map by evaluating `f(x, z)` at every vertex.
    pub fn from_fn<F>(
        cell_size_m: [f64; 2],
        num_cells: [usize; 2],
        centre_m: [f64; 2],
        f: F,
    ) -> Result<Self, TerrainMapError>
    where
        F: Fn(f64, f64) -> f64,
    {
        Self::check_grid(cell_size_m, num_cells)?;

        let lower = Self::lower_corner(cell_size_m, num_cells, centre_m);
        let heights = Array2::from_shape_fn((num_cells[0], num_cells[1]), |(i, j)| {
            f(
                lower.x + i as f64 * cell_size_m[0],
                lower.y + j as f64 * cell_size_m[1],
            )
        });

        Ok(Self::from_array(cell_size_m, centre_m, heights))
    }

    /// Generate a random terrain map using a Perlin noise system
    pub fn generate_random(params: &TerrainParams) -> Result<Self, TerrainMapError> {
        let perlin = Perlin::new().set_seed(params.perlin_seed);
        let scale = params.perlin_scale;
        let amplitude_m = params.amplitude_m;

        Self::from_fn(
            params.cell_size_m,
            params.num_cells,
            params.centre_m,
            |x, z| amplitude_m * perlin.get([x * scale[0], z * scale[1]]),
        )
    }

    /// Set the layer the terrain sits on.
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Returns the range of height in the terrain
    pub fn range(&self) -> Range<f64> {
        self.min_height_m..self.max_height_m
    }

    /// Returns true if the position lies over the map.
    pub fn contains(&self, x: f64, z: f64) -> bool {
        x >= self.lower_m.x && x <= self.upper_m.x && z >= self.lower_m.y && z <= self.upper_m.y
    }

    /// Bilinearly interpolated height at the given position, or `None` outside the map.
    pub fn height_at(&self, x: f64, z: f64) -> Option<f64> {
        if !self.contains(x, z) {
            return None;
        }

        let (nx, nz) = self.heights.dim();

        let fx = (x - self.lower_m.x) / self.cell_size_m.x;
        let fz = (z - self.lower_m.y) / self.cell_size_m.y;

        // Clamp so positions on the upper edge interpolate within the last cell
        let i = (fx.floor() as usize).min(nx - 2);
        let j = (fz.floor() as usize).min(nz - 2);
        let tx = fx - i as f64;
        let tz = fz - j as f64;

        let h00 = self.heights[(i, j)];
        let h10 = self.heights[(i + 1, j)];
        let h01 = self.heights[(i, j + 1)];
        let h11 = self.heights[(i + 1, j + 1)];

        let h0 = h00 + (h10 - h00) * tx;
        let h1 = h01 + (h11 - h01) * tx;

        Some(h0 + (h1 - h0) * tz)
    }

    /// Surface normal at the given position from central differences, or `None` outside the map.
    ///
    /// Differences are taken over half a cell, falling back to one-sided differences at the map
    /// edges.
    pub fn normal_at(&self, x: f64, z: f64) -> Option<Unit<Vector3<f64>>> {
        let h = self.height_at(x, z)?;

        let dh_dx = self.slope(h, x, z, 0.5 * self.cell_size_m.x, true);
        let dh_dz = self.slope(h, x, z, 0.5 * self.cell_size_m.y, false);

        Some(Unit::new_normalize(Vector3::new(-dh_dx, 1.0, -dh_dz)))
    }

    fn slope(&self, h: f64, x: f64, z: f64, eps: f64, along_x: bool) -> f64 {
        let sample = |d: f64| {
            if along_x {
                self.height_at(x + d, z)
            } else {
                self.height_at(x, z + d)
            }
        };

        match (sample(-eps), sample(eps)) {
            (Some(lo), Some(hi)) => (hi - lo) / (2.0 * eps),
            (None, Some(hi)) => (hi - h) / eps,
            (Some(lo), None) => (h - lo) / eps,
            (None, None) => 0.0,
        }
    }

    fn check_grid(cell_size_m: [f64; 2], num_cells: [usize; 2]) -> Result<(), TerrainMapError> {
        if num_cells[0] < 2 || num_cells[1] < 2 {
            return Err(TerrainMapError::TooFewCells(num_cells));
        }
        if !(cell_size_m[0] > 0.0 && cell_size_m[1] > 0.0) {
            return Err(TerrainMapError::InvalidCellSize(cell_size_m));
        }
        Ok(())
    }

    fn lower_corner(cell_size_m: [f64; 2], num_cells: [usize; 2], centre_m: [f64; 2]) -> Vector2<f64> {
        Vector2::new(
            centre_m[0] - 0.5 * (num_cells[0] - 1) as f64 * cell_size_m[0],
            centre_m[1] - 0.5 * (num_cells[1] - 1) as f64 * cell_size_m[1],
        )
    }

    fn from_array(cell_size_m: [f64; 2], centre_m: [f64; 2], heights: Array2<f64>) -> Self {
        let (nx, nz) = heights.dim();
        let lower_m = Self::lower_corner(cell_size_m, [nx, nz], centre_m);
        let upper_m = Vector2::new(
            lower_m.x + (nx - 1) as f64 * cell_size_m[0],
            lower_m.y + (nz - 1) as f64 * cell_size_m[1],
        );

        let min = heights.iter().copied().map(OrderedFloat).min();
        let max = heights.iter().copied().map(OrderedFloat).max();
        let (min_height_m, max_height_m) = match (min, max) {
            (Some(min), Some(max)) => (min.0, max.0),
            _ => (0.0, 0.0),
        };

        Self {
            cell_size_m: Vector2::from(cell_size_m),
            centre_m: Vector2::from(centre_m),
            layer: TERRAIN_LAYER,
            lower_m,
            upper_m,
            heights,
            min_height_m,
            max_height_m,
        }
    }

    /// Height of the ray above the terrain at distance `t`, `None` if the ray is off the map.
    fn clearance(&self, origin_m: &Point3<f64>, dir: &Vector3<f64>, t: f64) -> Option<f64> {
        let p = origin_m + dir * t;
        self.height_at(p.x, p.z).map(|h| p.y - h)
    }
}

impl GroundSampler for TerrainMap {
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

        let (t_enter, t_exit) = self.clip(origin_m, &dir, max_distance_m)?;

        let step_m = 0.5 * self.cell_size_m.x.min(self.cell_size_m.y);

        // March along the ray looking for the first point where it passes from above the terrain
        // to on or below it. A ray which starts below the surface never hits it.
        let mut prev: Option<(f64, f64)> = None;
        let mut t = t_enter;

        loop {
            let t_clamped = t.min(t_exit);
            let curr = self.clearance(origin_m, &dir, t_clamped);

            if let (Some((t_above, c_above)), Some(c)) = (prev, curr) {
                if c_above > 0.0 && c <= 0.0 {
                    let t_hit = self.bisect(origin_m, &dir, t_above, t_clamped);
                    return self.hit_at(origin_m, &dir, t_hit);
                }
            }

            prev = curr.map(|c| (t_clamped, c));

            if t_clamped >= t_exit {
                return None;
            }
            t += step_m;
        }
    }
}

impl TerrainMap {
    /// Distances along the ray between which it lies over the map and within its height band.
    ///
    /// Returns `None` if that part of the ray is empty or lies beyond `max_distance_m`.
    fn clip(&self, origin_m: &Point3<f64>, dir: &Vector3<f64>, max_distance_m: f64) -> Option<(f64, f64)> {
        let lower = [
            self.lower_m.x,
            self.min_height_m - BAND_MARGIN_M,
            self.lower_m.y,
        ];
        let upper = [
            self.upper_m.x,
            self.max_height_m + BAND_MARGIN_M,
            self.upper_m.y,
        ];

        let mut t_min = 0f64;
        let mut t_max = max_distance_m;

        for axis in 0..3 {
            let (o, d) = (origin_m[axis], dir[axis]);

            if d.abs() < f64::EPSILON {
                if o < lower[axis] || o > upper[axis] {
                    return None;
                }
                continue;
            }

            let t0 = (lower[axis] - o) / d;
            let t1 = (upper[axis] - o) / d;
            t_min = t_min.max(t0.min(t1));
            t_max = t_max.min(t0.max(t1));

            if t_min > t_max {
                return None;
            }
        }

        Some((t_min, t_max))
    }

    /// Refine an intersection known to lie between `t_above` and `t_below`.
    fn bisect(&self, origin_m: &Point3<f64>, dir: &Vector3<f64>, mut t_above: f64, mut t_below: f64) -> f64 {
        for _ in 0..NUM_BISECTION_ITERS {
            let t_mid = 0.5 * (t_above + t_below);
            match self.clearance(origin_m, dir, t_mid) {
                Some(c) if c > 0.0 => t_above = t_mid,
                _ => t_below = t_mid,
            }
        }
        t_below
    }

    fn hit_at(&self, origin_m: &Point3<f64>, dir: &Vector3<f64>, t: f64) -> Option<GroundHit> {
        let mut point_m = origin_m + dir * t;
        point_m.y = self.height_at(point_m.x, point_m.z)?;

        Some(GroundHit {
            point_m,
            normal: self.normal_at(point_m.x, point_m.z)?,
            distance_m: t,
            layer: self.layer,
        })
    }
}
