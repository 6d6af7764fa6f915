//! Closed elliptical orbits and per-frame placement.
//!
//! Orbits here are a visually plausible approximation, not real orbital
//! mechanics: the ellipse is parameterized directly by angle, and angular
//! speed scales with `1/sqrt(a)` to echo Kepler's third law. The parametric
//! path is sampled once per descriptor and cached for the renderer.

use crate::seed::SeedRng;
use glam::{Mat3, Vec3};
use std::f32::consts::TAU;

/// Eccentricity range for seeded orbits. Every call site draws from here.
pub const ECCENTRICITY_RANGE: (f32, f32) = (0.05, 0.30);

/// Number of cached samples along the parametric path.
pub const ORBIT_PATH_SAMPLES: usize = 128;

/// Speed constant `k` in `angular_speed = k / sqrt(a)`. Tuned for feel.
const ANGULAR_SPEED_K: f32 = 1.8;

/// Maximum seeded axial tilt of the orbit plane, in radians.
const MAX_TILT: f32 = 0.12;

/// Parameters of one body's closed elliptical path.
///
/// Immutable per body; recomputed (never mutated piecemeal) when the orbit
/// radius changes, which also regenerates the cached path.
#[derive(Clone, Debug)]
pub struct OrbitDescriptor {
    /// Semi-major axis.
    a: f32,
    /// Semi-minor axis, `a * sqrt(1 - e²)`.
    b: f32,
    /// Focus offset, `a * e`.
    c: f32,
    eccentricity: f32,
    angular_speed: f32,
    phase: f32,
    /// Small rotation of the orbit plane about X.
    tilt: f32,
    /// Cached parametric samples for the renderer.
    path: Vec<Vec3>,
}

impl OrbitDescriptor {
    /// Build an orbit from explicit parameters.
    pub fn new(a: f32, eccentricity: f32, phase: f32, tilt: f32) -> Self {
        let e = eccentricity.clamp(0.0, 0.95);
        let b = a * (1.0 - e * e).sqrt();
        let c = a * e;
        let mut orbit = Self {
            a,
            b,
            c,
            eccentricity: e,
            angular_speed: ANGULAR_SPEED_K / a.max(f32::EPSILON).sqrt(),
            phase,
            tilt,
            path: Vec::new(),
        };
        orbit.rebuild_path();
        orbit
    }

    /// Derive an orbit from a body's generation-time distance and its
    /// seeded stream. Identical streams produce identical orbits.
    pub fn from_seed(distance: f32, rng: &mut SeedRng) -> Self {
        let e = rng.range(ECCENTRICITY_RANGE.0, ECCENTRICITY_RANGE.1);
        let phase = rng.range(0.0, TAU);
        let tilt = rng.signed() * MAX_TILT;
        Self::new(distance, e, phase, tilt)
    }

    /// Semi-major axis.
    #[inline]
    pub fn semi_major(&self) -> f32 {
        self.a
    }

    /// Eccentricity.
    #[inline]
    pub fn eccentricity(&self) -> f32 {
        self.eccentricity
    }

    /// Closest approach to the focus, `a - c`, at θ = 0.
    #[inline]
    pub fn periapsis(&self) -> f32 {
        self.a - self.c
    }

    /// Farthest distance from the focus, `a + c`, at θ = π.
    #[inline]
    pub fn apoapsis(&self) -> f32 {
        self.a + self.c
    }

    /// Orbital angle at elapsed time `t`.
    #[inline]
    pub fn angle_at(&self, t: f32) -> f32 {
        t * self.angular_speed + self.phase
    }

    /// Position on the (tilted) orbit at a given parametric angle.
    pub fn position_at_angle(&self, theta: f32) -> Vec3 {
        let local = Vec3::new(theta.cos() * self.a - self.c, 0.0, theta.sin() * self.b);
        Mat3::from_rotation_x(self.tilt) * local
    }

    /// Position on the orbit at elapsed time `t`.
    #[inline]
    pub fn position_at(&self, t: f32) -> Vec3 {
        self.position_at_angle(self.angle_at(t))
    }

    /// Cached path samples for the renderer to draw.
    #[inline]
    pub fn path(&self) -> &[Vec3] {
        &self.path
    }

    /// Change the orbit radius, recomputing derived axes and the cached
    /// path. The eccentricity, phase, and tilt are preserved.
    pub fn set_radius(&mut self, a: f32) {
        if (a - self.a).abs() <= f32::EPSILON {
            return;
        }
        *self = Self::new(a, self.eccentricity, self.phase, self.tilt);
    }

    fn rebuild_path(&mut self) {
        self.path = (0..ORBIT_PATH_SAMPLES)
            .map(|i| {
                let theta = i as f32 / ORBIT_PATH_SAMPLES as f32 * TAU;
                self.position_at_angle(theta)
            })
            .collect();
    }
}
