//! Engine configuration.
//!
//! These types describe a whole engine (structures, audio pipeline,
//! camera feel, transition timing) and can be serialized to JSON.
//! Colors and positions are plain arrays here and converted to math types
//! at the engine boundary.

use crate::error::ConfigError;
use crate::structure::{DetailLevel, StructureConfig, StructureKind};
use glam::Vec3;
use serde::{Deserialize, Serialize};

fn default_particle_count() -> u32 {
    4000
}
fn default_radius() -> f32 {
    50.0
}
fn default_branch_count() -> u32 {
    3
}
fn default_inside_color() -> [f32; 3] {
    [1.0, 0.7, 0.4]
}
fn default_outside_color() -> [f32; 3] {
    [0.3, 0.5, 1.0]
}
fn default_spin() -> f32 {
    4.0
}
fn default_density_power() -> f32 {
    2.2
}
fn default_jitter() -> f32 {
    0.15
}
fn default_cluster_count() -> u32 {
    4
}
fn default_body_count() -> u32 {
    5
}

/// Generation parameters for one configured structure.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StructureSpec {
    pub id: String,
    pub kind: StructureKind,
    #[serde(default = "default_particle_count")]
    pub particle_count: u32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_branch_count")]
    pub branch_count: u32,
    #[serde(default = "default_inside_color")]
    pub inside_color: [f32; 3],
    #[serde(default = "default_outside_color")]
    pub outside_color: [f32; 3],
    #[serde(default = "default_spin")]
    pub spin: f32,
    #[serde(default = "default_density_power")]
    pub density_power: f32,
    #[serde(default = "default_jitter")]
    pub jitter: f32,
    #[serde(default = "default_cluster_count")]
    pub cluster_count: u32,
    #[serde(default = "default_body_count")]
    pub body_count: u32,
    /// World anchor. Seeded placement is used when absent.
    #[serde(default)]
    pub position: Option<[f32; 3]>,
}

impl StructureSpec {
    /// The engine-side generation config at a given detail level.
    pub fn to_config(&self, detail: DetailLevel) -> StructureConfig {
        StructureConfig {
            kind: self.kind,
            particle_count: self.particle_count,
            radius: self.radius,
            branch_count: self.branch_count,
            inside_color: Vec3::from_array(self.inside_color),
            outside_color: Vec3::from_array(self.outside_color),
            detail,
            spin: self.spin,
            density_power: self.density_power,
            jitter: self.jitter,
            cluster_count: self.cluster_count,
            body_count: self.body_count,
        }
    }
}

fn default_audio_ceiling() -> f32 {
    255.0
}
fn default_audio_rate() -> f32 {
    0.12
}

/// Audio pipeline settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AudioSettings {
    /// Magnitude that maps to a feature value of 1.0.
    #[serde(default = "default_audio_ceiling")]
    pub ceiling: f32,
    /// Smoothing rate for the four feature parameters.
    #[serde(default = "default_audio_rate")]
    pub smoothing_rate: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            ceiling: default_audio_ceiling(),
            smoothing_rate: default_audio_rate(),
        }
    }
}

fn default_camera_rate() -> f32 {
    0.06
}
fn default_fov_degrees() -> f32 {
    55.0
}

/// Camera feel.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CameraSettings {
    #[serde(default = "default_camera_rate")]
    pub smooth_rate: f32,
    #[serde(default = "default_fov_degrees")]
    pub fov_degrees: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            smooth_rate: default_camera_rate(),
            fov_degrees: default_fov_degrees(),
        }
    }
}

fn default_fade_seconds() -> f32 {
    0.8
}

/// Transition timing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TransitionSettings {
    #[serde(default = "default_fade_seconds")]
    pub fade_seconds: f32,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            fade_seconds: default_fade_seconds(),
        }
    }
}

fn default_gravity_g() -> f32 {
    crate::gravity::DEFAULT_G
}
fn default_gravity_min_radius() -> f32 {
    crate::gravity::DEFAULT_MIN_RADIUS
}

/// Freeform star-field gravity settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GravitySettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_gravity_g")]
    pub g: f32,
    #[serde(default = "default_gravity_min_radius")]
    pub min_radius: f32,
}

impl Default for GravitySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            g: default_gravity_g(),
            min_radius: default_gravity_min_radius(),
        }
    }
}

fn default_oracle_timeout() -> f32 {
    8.0
}

/// Complete engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub structures: Vec<StructureSpec>,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub transition: TransitionSettings,
    #[serde(default)]
    pub gravity: GravitySettings,
    /// Seconds before an Oracle query resolves to its fallback.
    #[serde(default = "default_oracle_timeout")]
    pub oracle_timeout: f32,
}

impl EngineConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.structures.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one structure is required".into(),
            ));
        }
        for spec in &self.structures {
            if spec.radius <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "structure `{}` has non-positive radius",
                    spec.id
                )));
            }
        }
        Ok(())
    }

    /// A small demo universe: two galaxies and a planetary system.
    pub fn sample() -> Self {
        Self {
            structures: vec![
                StructureSpec {
                    id: "whirl".into(),
                    kind: StructureKind::Spiral,
                    particle_count: 6000,
                    radius: 50.0,
                    branch_count: 4,
                    inside_color: [1.0, 0.75, 0.45],
                    outside_color: [0.35, 0.45, 1.0],
                    spin: default_spin(),
                    density_power: default_density_power(),
                    jitter: default_jitter(),
                    cluster_count: default_cluster_count(),
                    body_count: default_body_count(),
                    position: Some([-120.0, 0.0, 0.0]),
                },
                StructureSpec {
                    id: "smudge".into(),
                    kind: StructureKind::Irregular,
                    particle_count: 3000,
                    radius: 35.0,
                    branch_count: 0,
                    inside_color: [0.9, 0.5, 0.8],
                    outside_color: [0.4, 0.7, 0.9],
                    spin: default_spin(),
                    density_power: default_density_power(),
                    jitter: default_jitter(),
                    cluster_count: 5,
                    body_count: default_body_count(),
                    position: Some([120.0, 10.0, -40.0]),
                },
                StructureSpec {
                    id: "haven".into(),
                    kind: StructureKind::PlanetarySystem,
                    particle_count: 0,
                    radius: 60.0,
                    branch_count: 0,
                    inside_color: [1.0, 0.9, 0.6],
                    outside_color: [0.5, 0.6, 0.9],
                    spin: default_spin(),
                    density_power: default_density_power(),
                    jitter: default_jitter(),
                    cluster_count: default_cluster_count(),
                    body_count: 6,
                    position: Some([0.0, -20.0, 160.0]),
                },
            ],
            audio: AudioSettings::default(),
            camera: CameraSettings::default(),
            transition: TransitionSettings::default(),
            gravity: GravitySettings::default(),
            oracle_timeout: default_oracle_timeout(),
        }
    }
}
