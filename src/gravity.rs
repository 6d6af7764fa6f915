//! Freeform infall integrator for "living" star fields.
//!
//! Each tick, every point in a [`PointField`] accumulates velocity toward
//! the field's origin under a softened inverse-square law and is integrated
//! with explicit Euler. Points inside the clamp radius are skipped entirely,
//! which avoids the singularity without any exception handling.
//!
//! After the full pass, per-point speed magnitudes are republished
//! normalized by this tick's maximum. The normalization runs only once all
//! velocities are final: a consumer may read last tick's magnitudes, but
//! never a mix of two ticks within one field.

use crate::field::PointField;
use glam::Vec3;

/// Default gravitational constant. Tuned for feel, not physics.
pub const DEFAULT_G: f32 = 80.0;
/// Default clamp threshold below which points feel no force.
pub const DEFAULT_MIN_RADIUS: f32 = 1.5;

/// Softening added to the squared distance to cap peak acceleration.
const SOFTENING: f32 = 0.5;

/// Per-field infall integrator.
///
/// Velocities live beside the field, sized once at attach and never
/// resized, mirroring the field's own fixed-size contract.
#[derive(Clone, Debug)]
pub struct GravitySim {
    g: f32,
    min_radius: f32,
    velocities: Vec<Vec3>,
}

impl GravitySim {
    /// Create an integrator for a field of `point_count` points.
    pub fn new(point_count: usize, g: f32, min_radius: f32) -> Self {
        Self {
            g,
            min_radius,
            velocities: vec![Vec3::ZERO; point_count],
        }
    }

    /// Create with default constants for a given field.
    pub fn for_field(field: &PointField) -> Self {
        Self::new(field.len(), DEFAULT_G, DEFAULT_MIN_RADIUS)
    }

    /// Current velocity buffer.
    #[inline]
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Advance the field by `dt`.
    ///
    /// The field must be the one this integrator was sized for.
    pub fn step(&mut self, field: &mut PointField, dt: f32) {
        debug_assert_eq!(field.len(), self.velocities.len());

        let positions = field.positions_mut();
        for (pos, vel) in positions.iter_mut().zip(self.velocities.iter_mut()) {
            let dist = pos.length();
            if dist < self.min_radius {
                continue;
            }
            let dir = -*pos / dist;
            let accel = self.g / (dist * dist + SOFTENING * SOFTENING);
            *vel += dir * accel * dt;
            *pos += *vel * dt;
        }

        // Normalization pass: runs only after every velocity is final.
        let max_speed = self
            .velocities
            .iter()
            .map(|v| v.length())
            .fold(0.0, f32::max);
        let magnitudes = field.magnitudes_mut();
        if max_speed > 0.0 {
            for (m, v) in magnitudes.iter_mut().zip(&self.velocities) {
                *m = v.length() / max_speed;
            }
        } else {
            magnitudes.fill(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_with(points: Vec<Vec3>) -> PointField {
        let colors = vec![Vec3::ONE; points.len()];
        PointField::new(points, colors)
    }

    #[test]
    fn test_infall_monotonic() {
        let mut field = field_with(vec![Vec3::new(20.0, 0.0, 0.0)]);
        let mut sim = GravitySim::new(1, DEFAULT_G, DEFAULT_MIN_RADIUS);

        let mut last = field.positions()[0].length();
        for _ in 0..50 {
            sim.step(&mut field, 0.016);
            let dist = field.positions()[0].length();
            assert!(dist < last, "distance must strictly decrease");
            last = dist;
        }
    }

    #[test]
    fn test_clamped_points_do_not_move() {
        let start = Vec3::new(0.5, 0.0, 0.0);
        let mut field = field_with(vec![start]);
        let mut sim = GravitySim::new(1, DEFAULT_G, 1.5);
        for _ in 0..10 {
            sim.step(&mut field, 0.016);
        }
        assert_eq!(field.positions()[0], start);
    }

    #[test]
    fn test_magnitudes_normalized() {
        let mut field = field_with(vec![
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 40.0),
            Vec3::new(0.2, 0.0, 0.0), // clamped, stays at rest
        ]);
        let mut sim = GravitySim::new(3, DEFAULT_G, 1.5);
        sim.step(&mut field, 0.016);

        let mags = field.magnitudes();
        assert!(mags.iter().all(|&m| (0.0..=1.0).contains(&m)));
        // The nearer free point accelerates hardest and defines the max.
        assert!((mags[0] - 1.0).abs() < 1e-6);
        assert!(mags[1] < 1.0);
        assert_eq!(mags[2], 0.0);
    }

    #[test]
    fn test_zero_motion_zero_magnitudes() {
        let mut field = field_with(vec![Vec3::new(0.1, 0.0, 0.0)]);
        let mut sim = GravitySim::new(1, DEFAULT_G, 1.0);
        sim.step(&mut field, 0.016);
        assert_eq!(field.magnitudes()[0], 0.0);
    }
}
