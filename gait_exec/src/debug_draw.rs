//! # Debug drawing
//!
//! Observers which receive the rest points and detection rays computed during ground sampling.
//! Nothing in the controller reads back from a debug sink.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use nalgebra::Point3;
use serde::Serialize;

use util::{
    archive::{ArchiveError, Archiver},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Sink for diagnostic geometry. All methods default to doing nothing.
pub trait DebugDraw {
    /// The current rest position of a leg.
    fn rest_point(&mut self, _leg: usize, _point_m: &Point3<f64>) {}

    /// A ground detection ray cast for a leg, from `origin_m` to `end_m`. `end_m` is the hit
    /// point when the ray hit, otherwise the end of the search range.
    fn detection_ray(&mut self, _leg: usize, _origin_m: &Point3<f64>, _end_m: &Point3<f64>, _hit: bool) {}
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Debug sink which discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDebugDraw;

/// Debug sink which keeps everything it is given.
#[derive(Debug, Clone, Default)]
pub struct RecordingDebugDraw {
    pub rest_points: Vec<(usize, Point3<f64>)>,
    pub rays: Vec<DetectionRay>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionRay {
    pub leg: usize,
    pub origin_m: Point3<f64>,
    pub end_m: Point3<f64>,
    pub hit: bool,
}

/// Debug sink writing every primitive to `debug_draw.csv` in the session archive.
pub struct ArchiveDebugDraw {
    arch: Archiver,
}

#[derive(Serialize)]
struct DrawRecord {
    time_s: f64,
    kind: &'static str,
    leg: usize,
    x_m: f64,
    y_m: f64,
    z_m: f64,
    end_x_m: f64,
    end_y_m: f64,
    end_z_m: f64,
    hit: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DebugDraw for NoDebugDraw {}

impl RecordingDebugDraw {
    pub fn clear(&mut self) {
        self.rest_points.clear();
        self.rays.clear();
    }
}

impl DebugDraw for RecordingDebugDraw {
    fn rest_point(&mut self, leg: usize, point_m: &Point3<f64>) {
        self.rest_points.push((leg, *point_m));
    }

    fn detection_ray(&mut self, leg: usize, origin_m: &Point3<f64>, end_m: &Point3<f64>, hit: bool) {
        self.rays.push(DetectionRay {
            leg,
            origin_m: *origin_m,
            end_m: *end_m,
            hit,
        });
    }
}

impl ArchiveDebugDraw {
    pub fn new(session: &Session) -> Result<Self, ArchiveError> {
        Ok(Self {
            arch: Archiver::from_path(session, "gait_ctrl/debug_draw.csv")?,
        })
    }

    fn record(&mut self, record: DrawRecord) {
        if let Err(e) = self.arch.serialise(record) {
            warn!("Could not archive debug drawing: {}", e);
        }
    }
}

impl DebugDraw for ArchiveDebugDraw {
    fn rest_point(&mut self, leg: usize, point_m: &Point3<f64>) {
        self.record(DrawRecord {
            time_s: session::get_elapsed_seconds(),
            kind: "rest_point",
            leg,
            x_m: point_m.x,
            y_m: point_m.y,
            z_m: point_m.z,
            end_x_m: point_m.x,
            end_y_m: point_m.y,
            end_z_m: point_m.z,
            hit: true,
        });
    }

    fn detection_ray(&mut self, leg: usize, origin_m: &Point3<f64>, end_m: &Point3<f64>, hit: bool) {
        self.record(DrawRecord {
            time_s: session::get_elapsed_seconds(),
            kind: "detection_ray",
            leg,
            x_m: origin_m.x,
            y_m: origin_m.y,
            z_m: origin_m.z,
            end_x_m: end_m.x,
            end_y_m: end_m.y,
            end_z_m: end_m.z,
            hit,
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_archive_debug_draw() {
        let dir = std::env::temp_dir().join("gait_debug_draw_test");
        let session = Session::new("debug_draw_test", &dir).unwrap();

        let mut draw = ArchiveDebugDraw::new(&session).unwrap();
        draw.rest_point(2, &Point3::new(1.0, 2.0, 3.0));
        draw.detection_ray(2, &Point3::new(1.0, 7.0, 3.0), &Point3::new(1.0, 2.0, 3.0), true);

        let written =
            std::fs::read_to_string(session.arch_root.join("gait_ctrl/debug_draw.csv")).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("rest_point,2,1.0,2.0,3.0"));
        assert!(lines[2].contains("detection_ray,2,1.0,7.0,3.0,1.0,2.0,3.0,true"));
    }

    #[test]
    fn test_recording_debug_draw() {
        let mut draw = RecordingDebugDraw::default();
        draw.rest_point(0, &Point3::origin());
        draw.detection_ray(0, &Point3::new(0.0, 1.0, 0.0), &Point3::origin(), false);
        assert_eq!(draw.rest_points.len(), 1);
        assert!(!draw.rays[0].hit);

        draw.clear();
        assert!(draw.rays.is_empty());

        // The no-op sink accepts everything
        NoDebugDraw.rest_point(0, &Point3::origin());
    }
}
