//! IK target output

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Point3;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Receiver of the per-leg foot targets produced each tick.
pub trait IkTargetSink {
    /// Set the world frame target of a leg.
    fn set_target(&mut self, leg: usize, target_m: &Point3<f64>);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl IkTargetSink for Vec<Point3<f64>> {
    fn set_target(&mut self, leg: usize, target_m: &Point3<f64>) {
        if leg >= self.len() {
            self.resize(leg + 1, Point3::origin());
        }
        self[leg] = *target_m;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<Point3<f64>> = Vec::new();
        sink.set_target(2, &Point3::new(1.0, 2.0, 3.0));
        assert_eq!(sink.len(), 3);
        assert_eq!(sink[0], Point3::origin());
        assert_eq!(sink[2], Point3::new(1.0, 2.0, 3.0));

        sink.set_target(0, &Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(sink.len(), 3);
        assert_eq!(sink[0].x, -1.0);
    }
}
