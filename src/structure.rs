//! Procedural structure generation.
//!
//! A [`Structure`] is a generated celestial collection: a point field for the
//! galaxy-like kinds, or a small ordered set of orbiting bodies for
//! [`StructureKind::PlanetarySystem`]. Generation is a pure function of the
//! structure id and its configuration: the same inputs always produce
//! bit-identical output. Structures are regenerated, never mutated,
//! when parameters change.
//!
//! # Example
//!
//! ```
//! use astrarium::structure::{Structure, StructureConfig, StructureKind, DetailLevel};
//! use astrarium::Vec3;
//!
//! let config = StructureConfig {
//!     kind: StructureKind::Spiral,
//!     particle_count: 2000,
//!     radius: 50.0,
//!     branch_count: 4,
//!     inside_color: Vec3::new(1.0, 0.8, 0.5),
//!     outside_color: Vec3::new(0.3, 0.4, 1.0),
//!     detail: DetailLevel::Detail,
//!     ..Default::default()
//! };
//! let galaxy = Structure::generate("m31", &config);
//! assert!(galaxy.field().unwrap().len() > 0);
//! ```

use crate::field::PointField;
use crate::orbit::OrbitDescriptor;
use crate::seed::SeedRng;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Jitter falloff exponent: fuzz is widest at the core and dies at the rim.
const JITTER_POWER: f32 = 2.0;
/// Fraction of the radius occupied by the bar in barred spirals.
const BAR_FRACTION: f32 = 0.4;
/// Bar stretch along X and squeeze along Z.
const BAR_STRETCH: f32 = 1.6;
const BAR_SQUEEZE: f32 = 0.55;
/// Base probability of a hot-spot color override at the core.
const HOT_SPOT_CHANCE: f32 = 0.08;
/// Cluster radius for irregular structures, as a fraction of the radius.
const CLUSTER_SPREAD: f32 = 0.35;
/// Overview fields carry a quarter of the detail point budget.
const OVERVIEW_POINT_DIVISOR: u32 = 4;

/// The closed set of structure shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    Spiral,
    BarredSpiral,
    Elliptical,
    Lenticular,
    Irregular,
    PlanetarySystem,
}

/// Level of detail a structure is generated at.
///
/// Both levels run the same shape algorithm and color mapping for a given
/// id; only the point and branch budgets differ, so the silhouette and
/// palette survive a detail switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailLevel {
    Overview,
    Detail,
}

impl DetailLevel {
    /// Point budget at this level for a configured count.
    pub fn point_budget(self, particle_count: u32) -> u32 {
        match self {
            DetailLevel::Detail => particle_count,
            DetailLevel::Overview => (particle_count / OVERVIEW_POINT_DIVISOR).max(64),
        }
    }

    /// Branch budget at this level for a configured count.
    pub fn branch_budget(self, branch_count: u32) -> u32 {
        match self {
            DetailLevel::Detail => branch_count,
            DetailLevel::Overview => branch_count.min(4),
        }
    }
}

/// Generation parameters for one structure.
#[derive(Clone, Debug, PartialEq)]
pub struct StructureConfig {
    pub kind: StructureKind,
    pub particle_count: u32,
    pub radius: f32,
    pub branch_count: u32,
    pub inside_color: Vec3,
    pub outside_color: Vec3,
    pub detail: DetailLevel,
    /// Spiral twist applied per unit of normalized radius, in radians.
    pub spin: f32,
    /// Density bias exponent: higher values pack points toward the core.
    pub density_power: f32,
    /// Positional jitter as a fraction of the radius.
    pub jitter: f32,
    /// Cluster count for irregular structures.
    pub cluster_count: u32,
    /// Body count for planetary systems.
    pub body_count: u32,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            kind: StructureKind::Spiral,
            particle_count: 4000,
            radius: 50.0,
            branch_count: 3,
            inside_color: Vec3::new(1.0, 0.7, 0.4),
            outside_color: Vec3::new(0.3, 0.5, 1.0),
            detail: DetailLevel::Detail,
            spin: 4.0,
            density_power: 2.2,
            jitter: 0.15,
            cluster_count: 4,
            body_count: 5,
        }
    }
}

/// One body of a planetary system, with its seeded orbit.
#[derive(Clone, Debug)]
pub struct OrbitingBody {
    /// Stable id, derived from the parent structure id.
    pub id: String,
    /// Generation-time distance from the system origin.
    pub distance: f32,
    /// Visual radius of the body itself.
    pub radius: f32,
    pub color: Vec3,
    pub orbit: OrbitDescriptor,
}

/// Payload of a generated structure.
#[derive(Clone, Debug)]
pub enum StructureData {
    Field(PointField),
    System(Vec<OrbitingBody>),
}

/// A generated celestial structure. Immutable once generated.
#[derive(Clone, Debug)]
pub struct Structure {
    id: String,
    kind: StructureKind,
    detail: DetailLevel,
    radius: f32,
    inside_color: Vec3,
    outside_color: Vec3,
    data: StructureData,
}

/// Radius-to-color mapping shared by every kind and detail level.
#[inline]
pub fn radial_color(inside: Vec3, outside: Vec3, r_norm: f32) -> Vec3 {
    inside.lerp(outside, r_norm.clamp(0.0, 1.0))
}

/// Hot-spot override color: a brightened version of the core color.
#[inline]
fn hot_spot_color(inside: Vec3) -> Vec3 {
    (inside * 1.5 + Vec3::splat(0.25)).min(Vec3::ONE)
}

/// Pull a point back inside the configured planar radius if jitter or
/// bar-stretching pushed it out. Y is left alone.
fn clamp_planar(p: Vec3, max_r: f32) -> Vec3 {
    let planar = (p.x * p.x + p.z * p.z).sqrt();
    if planar > max_r {
        let s = max_r / planar;
        Vec3::new(p.x * s, p.y, p.z * s)
    } else {
        p
    }
}

impl Structure {
    /// Generate a structure from its stable id and configuration.
    ///
    /// Pure: identical `(id, config)` yields bit-identical output.
    pub fn generate(id: &str, config: &StructureConfig) -> Self {
        let seed = SeedRng::new(id);
        let data = match config.kind {
            StructureKind::Spiral => Self::generate_spiral(&seed, config, false),
            StructureKind::BarredSpiral => Self::generate_spiral(&seed, config, true),
            StructureKind::Elliptical => {
                Self::generate_spheroid(&seed, config, Vec3::new(1.0, 0.75, 0.9))
            }
            StructureKind::Lenticular => {
                Self::generate_spheroid(&seed, config, Vec3::new(1.0, 0.22, 1.0))
            }
            StructureKind::Irregular => Self::generate_irregular(&seed, config),
            StructureKind::PlanetarySystem => Self::generate_system(id, &seed, config),
        };

        Self {
            id: id.to_string(),
            kind: config.kind,
            detail: config.detail,
            radius: config.radius,
            inside_color: config.inside_color,
            outside_color: config.outside_color,
            data,
        }
    }

    fn generate_spiral(seed: &SeedRng, config: &StructureConfig, barred: bool) -> StructureData {
        let branches = config.detail.branch_budget(config.branch_count);
        if branches == 0 {
            // Degenerate branch count: fall back to a safe spherical shape
            // instead of dividing by zero.
            return Self::generate_spheroid(seed, config, Vec3::new(1.0, 0.8, 1.0));
        }

        let count = config.detail.point_budget(config.particle_count) as usize;
        let mut points = seed.fork("points");
        let mut hot = seed.fork("hotspots");
        let radius = config.radius;

        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);

        for i in 0..count {
            let r = points.value().powf(config.density_power) * radius;
            let r_norm = r / radius;

            let branch_angle = (i as u32 % branches) as f32 / branches as f32 * TAU;
            let spin_angle = r_norm * config.spin;
            let angle = branch_angle + spin_angle;

            let tightness = (1.0 - r_norm).powf(JITTER_POWER);
            let jitter = config.jitter * radius * tightness;
            let jx = points.signed() * jitter;
            let jy = points.signed() * jitter * 0.5;
            let jz = points.signed() * jitter;

            let mut pos = Vec3::new(angle.cos() * r + jx, jy, angle.sin() * r + jz);
            if barred && r_norm < BAR_FRACTION {
                pos.x *= BAR_STRETCH;
                pos.z *= BAR_SQUEEZE;
            }
            let pos = clamp_planar(pos, radius);
            positions.push(pos);
            colors.push(Self::point_color(config, r_norm, &mut hot));
        }

        StructureData::Field(PointField::new(positions, colors))
    }

    fn generate_spheroid(seed: &SeedRng, config: &StructureConfig, axis: Vec3) -> StructureData {
        let count = config.detail.point_budget(config.particle_count) as usize;
        let mut points = seed.fork("points");
        let mut hot = seed.fork("hotspots");
        let radius = config.radius;

        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);

        for _ in 0..count {
            let r = points.value().powf(config.density_power) * radius;
            let r_norm = r / radius;

            let theta = points.range(0.0, TAU);
            let cos_phi = points.signed();
            let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
            let dir = Vec3::new(sin_phi * theta.cos(), cos_phi, sin_phi * theta.sin());

            let pos = clamp_planar(dir * r * axis, radius);
            positions.push(pos);
            colors.push(Self::point_color(config, r_norm, &mut hot));
        }

        StructureData::Field(PointField::new(positions, colors))
    }

    fn generate_irregular(seed: &SeedRng, config: &StructureConfig) -> StructureData {
        let k = config.cluster_count as usize;
        if k == 0 {
            // Same fallback as a degenerate branch count.
            return Self::generate_spheroid(seed, config, Vec3::new(1.0, 0.8, 1.0));
        }

        let count = config.detail.point_budget(config.particle_count) as usize;
        let mut clusters_rng = seed.fork("clusters");
        let mut points = seed.fork("points");
        let mut hot = seed.fork("hotspots");
        let radius = config.radius;

        let centers: Vec<Vec3> = (0..k)
            .map(|_| {
                let theta = clusters_rng.range(0.0, TAU);
                let r = clusters_rng.value().sqrt() * radius * 0.6;
                Vec3::new(
                    theta.cos() * r,
                    clusters_rng.signed() * radius * 0.1,
                    theta.sin() * r,
                )
            })
            .collect();

        let spread = radius * CLUSTER_SPREAD;
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);

        for _ in 0..count {
            let center = centers[points.index(k)];
            let offset = Vec3::new(
                points.signed() * spread,
                points.signed() * spread * 0.5,
                points.signed() * spread,
            );
            let pos = clamp_planar(center + offset, radius);
            let r_norm = (pos.x * pos.x + pos.z * pos.z).sqrt() / radius;
            positions.push(pos);
            colors.push(Self::point_color(config, r_norm, &mut hot));
        }

        StructureData::Field(PointField::new(positions, colors))
    }

    fn generate_system(id: &str, seed: &SeedRng, config: &StructureConfig) -> StructureData {
        let n = config.body_count.max(1);
        let bodies = (0..n)
            .map(|i| {
                let mut body_rng = seed.fork(&format!("body-{}", i));
                let t = (i as f32 + 0.5) / n as f32;
                let distance = config.radius * (0.15 + 0.75 * t) * body_rng.range(0.95, 1.05);
                let orbit = OrbitDescriptor::from_seed(distance, &mut body_rng);
                let body_radius = config.radius * body_rng.range(0.015, 0.05);
                let color = radial_color(
                    config.inside_color,
                    config.outside_color,
                    distance / config.radius,
                );
                OrbitingBody {
                    id: format!("{}/body-{}", id, i),
                    distance,
                    radius: body_radius,
                    color,
                    orbit,
                }
            })
            .collect();
        StructureData::System(bodies)
    }

    fn point_color(config: &StructureConfig, r_norm: f32, hot: &mut SeedRng) -> Vec3 {
        // Hot spots cluster toward the dense core.
        if hot.value() < HOT_SPOT_CHANCE * (1.0 - r_norm) {
            hot_spot_color(config.inside_color)
        } else {
            radial_color(config.inside_color, config.outside_color, r_norm)
        }
    }

    /// Stable structure id.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn kind(&self) -> StructureKind {
        self.kind
    }

    #[inline]
    pub fn detail(&self) -> DetailLevel {
        self.detail
    }

    /// Configured outer radius.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// The point field, for galaxy kinds.
    pub fn field(&self) -> Option<&PointField> {
        match &self.data {
            StructureData::Field(f) => Some(f),
            StructureData::System(_) => None,
        }
    }

    /// Mutable access to the point field, for the gravity integrator.
    pub fn field_mut(&mut self) -> Option<&mut PointField> {
        match &mut self.data {
            StructureData::Field(f) => Some(f),
            StructureData::System(_) => None,
        }
    }

    /// The orbiting bodies, for planetary systems.
    pub fn bodies(&self) -> Option<&[OrbitingBody]> {
        match &self.data {
            StructureData::Field(_) => None,
            StructureData::System(bodies) => Some(bodies),
        }
    }

    /// Look up a body by id.
    pub fn body(&self, body_id: &str) -> Option<&OrbitingBody> {
        self.bodies()
            .and_then(|bodies| bodies.iter().find(|b| b.id == body_id))
    }

    /// The radius→color mapping this structure was generated with.
    ///
    /// Identical across detail levels for the same id.
    #[inline]
    pub fn color_at(&self, r_norm: f32) -> Vec3 {
        radial_color(self.inside_color, self.outside_color, r_norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spiral_config(detail: DetailLevel) -> StructureConfig {
        StructureConfig {
            kind: StructureKind::Spiral,
            particle_count: 2000,
            detail,
            ..Default::default()
        }
    }

    #[test]
    fn test_generation_deterministic() {
        let config = spiral_config(DetailLevel::Detail);
        let a = Structure::generate("m31", &config);
        let b = Structure::generate("m31", &config);
        assert_eq!(a.field().unwrap(), b.field().unwrap());
    }

    #[test]
    fn test_different_ids_differ() {
        let config = spiral_config(DetailLevel::Detail);
        let a = Structure::generate("m31", &config);
        let b = Structure::generate("m33", &config);
        assert_ne!(a.field().unwrap(), b.field().unwrap());
    }

    #[test]
    fn test_radius_bound_all_kinds() {
        for kind in [
            StructureKind::Spiral,
            StructureKind::BarredSpiral,
            StructureKind::Elliptical,
            StructureKind::Lenticular,
            StructureKind::Irregular,
        ] {
            let config = StructureConfig {
                kind,
                particle_count: 3000,
                ..Default::default()
            };
            let s = Structure::generate("bound-check", &config);
            let field = s.field().unwrap();
            for p in field.positions() {
                let planar = (p.x * p.x + p.z * p.z).sqrt();
                assert!(
                    planar <= config.radius + 1e-4,
                    "{:?}: planar {} > radius {}",
                    kind,
                    planar,
                    config.radius
                );
            }
        }
    }

    #[test]
    fn test_lod_color_mapping_consistent() {
        let overview = Structure::generate("lod", &spiral_config(DetailLevel::Overview));
        let detail = Structure::generate("lod", &spiral_config(DetailLevel::Detail));
        for i in 0..=10 {
            let r = i as f32 / 10.0;
            let delta = (overview.color_at(r) - detail.color_at(r)).length();
            assert!(delta < 1e-6);
        }
    }

    #[test]
    fn test_point_colors_from_shared_mapping() {
        let config = spiral_config(DetailLevel::Detail);
        let s = Structure::generate("palette", &config);
        let field = s.field().unwrap();
        let hot = super::hot_spot_color(config.inside_color);
        for (p, c) in field.positions().iter().zip(field.colors()) {
            let r_norm = (p.x * p.x + p.z * p.z).sqrt() / config.radius;
            let base = radial_color(config.inside_color, config.outside_color, r_norm);
            let matches_base = (*c - base).length() < 0.35;
            let matches_hot = (*c - hot).length() < 1e-6;
            assert!(matches_base || matches_hot);
        }
    }

    #[test]
    fn test_overview_uses_fewer_points() {
        let overview = Structure::generate("lod", &spiral_config(DetailLevel::Overview));
        let detail = Structure::generate("lod", &spiral_config(DetailLevel::Detail));
        assert!(overview.field().unwrap().len() < detail.field().unwrap().len());
    }

    #[test]
    fn test_zero_branches_falls_back() {
        let config = StructureConfig {
            branch_count: 0,
            particle_count: 500,
            ..Default::default()
        };
        let s = Structure::generate("no-branches", &config);
        let field = s.field().unwrap();
        assert_eq!(field.len(), 500);
        assert!(field.positions().iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_zero_clusters_falls_back() {
        let config = StructureConfig {
            kind: StructureKind::Irregular,
            cluster_count: 0,
            particle_count: 500,
            ..Default::default()
        };
        let s = Structure::generate("no-clusters", &config);
        assert_eq!(s.field().unwrap().len(), 500);
    }

    #[test]
    fn test_barred_differs_from_plain_spiral() {
        let plain = Structure::generate(
            "bar",
            &StructureConfig {
                kind: StructureKind::Spiral,
                ..Default::default()
            },
        );
        let barred = Structure::generate(
            "bar",
            &StructureConfig {
                kind: StructureKind::BarredSpiral,
                ..Default::default()
            },
        );
        assert_ne!(plain.field().unwrap(), barred.field().unwrap());
    }

    #[test]
    fn test_planetary_system_bodies() {
        let config = StructureConfig {
            kind: StructureKind::PlanetarySystem,
            body_count: 6,
            radius: 80.0,
            ..Default::default()
        };
        let s = Structure::generate("sol", &config);
        let bodies = s.bodies().unwrap();
        assert_eq!(bodies.len(), 6);
        for (i, body) in bodies.iter().enumerate() {
            assert_eq!(body.id, format!("sol/body-{}", i));
            assert!(body.distance <= config.radius);
            assert!(body.orbit.semi_major() > 0.0);
        }
        // Body ids resolve through the lookup.
        assert!(s.body("sol/body-3").is_some());
        assert!(s.body("sol/body-9").is_none());
    }
}
