//! Point field buffers.
//!
//! A [`PointField`] is the dense position/color/magnitude storage backing a
//! structure's visual representation. It is created once by the generator,
//! may be mutated in place each tick by the gravity integrator, and is never
//! resized after creation. [`PointVertex`] is the packed view handed to the
//! renderer.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Packed per-point vertex for renderer upload.
///
/// Layout matches a tightly interleaved GPU vertex buffer: position,
/// normalized speed magnitude, color, explicit padding to 32 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub magnitude: f32,
    pub color: [f32; 3],
    _pad: f32,
}

/// Dense point storage for a generated structure.
///
/// All three buffers share one length, fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct PointField {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
    magnitudes: Vec<f32>,
}

impl PointField {
    /// Build a field from parallel position and color buffers.
    ///
    /// Magnitudes start at zero and are only written by the gravity pass.
    pub(crate) fn new(positions: Vec<Vec3>, colors: Vec<Vec3>) -> Self {
        debug_assert_eq!(positions.len(), colors.len());
        let magnitudes = vec![0.0; positions.len()];
        Self {
            positions,
            colors,
            magnitudes,
        }
    }

    /// Number of points in the field.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the field contains no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Point positions.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Mutable positions, for the in-place gravity integrator.
    #[inline]
    pub(crate) fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    /// Per-point colors.
    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Normalized speed magnitudes in [0, 1], for visual modulation.
    #[inline]
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Mutable magnitudes. Written only by the post-integration
    /// normalization pass.
    #[inline]
    pub(crate) fn magnitudes_mut(&mut self) -> &mut [f32] {
        &mut self.magnitudes
    }

    /// Largest planar (XZ) distance of any point from the local origin.
    pub fn planar_extent(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| (p.x * p.x + p.z * p.z).sqrt())
            .fold(0.0, f32::max)
    }

    /// Pack the field into interleaved vertices for renderer upload.
    pub fn vertices(&self) -> Vec<PointVertex> {
        self.positions
            .iter()
            .zip(&self.colors)
            .zip(&self.magnitudes)
            .map(|((p, c), &m)| PointVertex {
                position: p.to_array(),
                magnitude: m,
                color: c.to_array(),
                _pad: 0.0,
            })
            .collect()
    }
}
