//! Renderer boundary.
//!
//! The engine never issues drawing calls. Once per tick it assembles a
//! [`FrameBundle`] (borrowed point fields, cached orbit paths, body
//! spheres, and the smoothed render parameters) and hands it to whatever
//! implements [`Renderer`]. The [`NullRenderer`] swallows frames for tests
//! and headless runs.

use crate::field::PointField;
use glam::{Mat4, Vec3};

/// Smoothed, render-ready scalars for this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderParams {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
    pub overall: f32,
}

/// One structure's point field, with its world anchor and fade opacity.
pub struct FieldDraw<'a> {
    pub structure: &'a str,
    pub field: &'a PointField,
    pub anchor: Vec3,
    pub opacity: f32,
}

/// One body's cached orbit path, translated to its system's anchor.
pub struct OrbitDraw<'a> {
    pub body: &'a str,
    pub path: &'a [Vec3],
    pub anchor: Vec3,
    pub opacity: f32,
}

/// One orbiting body at its current position.
#[derive(Clone, Debug)]
pub struct BodyDraw<'a> {
    pub body: &'a str,
    pub center: Vec3,
    pub radius: f32,
    pub color: Vec3,
    pub opacity: f32,
}

/// Everything the renderer needs for one frame.
pub struct FrameBundle<'a> {
    pub view_proj: Mat4,
    pub fields: Vec<FieldDraw<'a>>,
    pub orbits: Vec<OrbitDraw<'a>>,
    pub bodies: Vec<BodyDraw<'a>>,
    pub params: RenderParams,
}

/// External rasterization back-end.
pub trait Renderer {
    fn submit(&mut self, frame: &FrameBundle<'_>);
}

/// A renderer that draws nothing. Counts frames for assertions.
#[derive(Debug, Default)]
pub struct NullRenderer {
    frames: u64,
}

impl NullRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames submitted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for NullRenderer {
    fn submit(&mut self, _frame: &FrameBundle<'_>) {
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_renderer_counts_frames() {
        let mut renderer = NullRenderer::new();
        let frame = FrameBundle {
            view_proj: Mat4::IDENTITY,
            fields: Vec::new(),
            orbits: Vec::new(),
            bodies: Vec::new(),
            params: RenderParams::default(),
        };
        renderer.submit(&frame);
        renderer.submit(&frame);
        assert_eq!(renderer.frames(), 2);
    }
}
