//! Smoothed camera rig.
//!
//! Each view state defines a default camera target; the rig chases it by
//! exponential interpolation every tick and never snaps. Direct user camera
//! input engages a manual override that suspends the chase until the view
//! state or selection changes. The rig also unprojects pointer coordinates
//! into world-space rays for the picker.

use glam::{Mat4, Vec2, Vec3};

/// A world-space ray, as cast from the camera through the pointer.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

/// A camera destination: where to sit and what to look at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTarget {
    pub position: Vec3,
    pub look_at: Vec3,
}

/// The engine's camera.
#[derive(Debug)]
pub struct CameraRig {
    position: Vec3,
    look_at: Vec3,
    target: CameraTarget,
    /// Exponential chase rate per tick.
    smooth_rate: f32,
    manual_override: bool,
    fov_y: f32,
    aspect: f32,
    z_near: f32,
    z_far: f32,
}

impl CameraRig {
    /// Create a rig already settled at `initial`.
    pub fn new(initial: CameraTarget, smooth_rate: f32, fov_y: f32, aspect: f32) -> Self {
        Self {
            position: initial.position,
            look_at: initial.look_at,
            target: initial,
            smooth_rate: smooth_rate.clamp(0.0, 1.0),
            manual_override: false,
            fov_y,
            aspect,
            z_near: 0.1,
            z_far: 5000.0,
        }
    }

    /// Set the target the rig chases. Does not move the camera.
    pub fn set_target(&mut self, target: CameraTarget) {
        self.target = target;
    }

    /// Update the projection aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect.max(f32::EPSILON);
    }

    /// Whether direct user input currently owns the camera.
    #[inline]
    pub fn manual_override(&self) -> bool {
        self.manual_override
    }

    /// Release manual control. Called whenever the view state or the
    /// selection changes.
    pub fn clear_manual_override(&mut self) {
        self.manual_override = false;
    }

    /// Apply a direct user orbit: yaw/pitch around the current look-at
    /// point. Engages the manual override.
    pub fn apply_manual_orbit(&mut self, delta: Vec2) {
        self.manual_override = true;

        let offset = self.position - self.look_at;
        let radius = offset.length().max(f32::EPSILON);
        let mut yaw = offset.z.atan2(offset.x);
        let mut pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();

        yaw -= delta.x * 2.0;
        pitch = (pitch + delta.y * 2.0).clamp(-1.4, 1.4);

        let new_offset = Vec3::new(
            radius * pitch.cos() * yaw.cos(),
            radius * pitch.sin(),
            radius * pitch.cos() * yaw.sin(),
        );
        self.position = self.look_at + new_offset;
    }

    /// Advance one tick: chase the target unless manually overridden.
    pub fn tick(&mut self) {
        if self.manual_override {
            return;
        }
        self.position = self.position.lerp(self.target.position, self.smooth_rate);
        self.look_at = self.look_at.lerp(self.target.look_at, self.smooth_rate);
    }

    /// Current camera position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current look-at point.
    #[inline]
    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    /// View matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let up = Vec3::Y;
        Mat4::look_at_rh(self.position, self.look_at, up)
    }

    /// Projection matrix (0..1 depth range).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    /// Combined view-projection matrix for the renderer.
    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Cast a world-space ray through a pointer position in NDC.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_proj().inverse();
        let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray {
            origin: near,
            dir: (far - near).normalize_or_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        CameraRig::new(
            CameraTarget {
                position: Vec3::new(0.0, 10.0, 20.0),
                look_at: Vec3::ZERO,
            },
            0.1,
            std::f32::consts::FRAC_PI_4,
            16.0 / 9.0,
        )
    }

    #[test]
    fn test_chases_target_without_snapping() {
        let mut rig = rig();
        let far = CameraTarget {
            position: Vec3::new(100.0, 0.0, 0.0),
            look_at: Vec3::new(50.0, 0.0, 0.0),
        };
        rig.set_target(far);
        rig.tick();
        // Moved toward, but nowhere near, the target.
        assert!(rig.position().x > 0.0);
        assert!(rig.position().x < 50.0);

        for _ in 0..400 {
            rig.tick();
        }
        assert!((rig.position() - far.position).length() < 0.1);
        assert!((rig.look_at() - far.look_at).length() < 0.1);
    }

    #[test]
    fn test_manual_override_suspends_chase() {
        let mut rig = rig();
        rig.set_target(CameraTarget {
            position: Vec3::new(100.0, 0.0, 0.0),
            look_at: Vec3::ZERO,
        });
        rig.apply_manual_orbit(Vec2::new(0.1, 0.0));
        let held = rig.position();
        rig.tick();
        assert_eq!(rig.position(), held);

        rig.clear_manual_override();
        rig.tick();
        assert_ne!(rig.position(), held);
    }

    #[test]
    fn test_manual_orbit_preserves_distance() {
        let mut rig = rig();
        let before = (rig.position() - rig.look_at()).length();
        rig.apply_manual_orbit(Vec2::new(0.3, 0.15));
        let after = (rig.position() - rig.look_at()).length();
        assert!((before - after).abs() < 1e-3);
    }

    #[test]
    fn test_center_ray_points_at_look_at() {
        let rig = rig();
        let ray = rig.ray_from_ndc(Vec2::ZERO);
        let to_target = (rig.look_at() - rig.position()).normalize();
        assert!(ray.dir.dot(to_target) > 0.999);
    }
}
