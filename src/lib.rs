//! # Astrarium - audio-reactive celestial simulation engine
//!
//! Astrarium simulates an interactive, multi-scale celestial environment:
//! deterministic procedural star and galaxy point fields, orbiting bodies,
//! and a camera that fades between discrete scales of view. It is a pure
//! simulation core: rasterization, windowing, audio capture, and the
//! generative "Oracle" service are external collaborators behind small
//! trait and value-type boundaries.
//!
//! ## Quick Start
//!
//! ```
//! use astrarium::prelude::*;
//!
//! let mut engine = Engine::new(EngineConfig::sample()).unwrap();
//! let mut renderer = NullRenderer::new();
//! let mut pointer = PointerTracker::new(1280, 720);
//!
//! // One tick per display refresh.
//! for notice in engine.tick(&pointer.snapshot(), None, &mut renderer) {
//!     match notice {
//!         EngineNotice::HoverChanged { current, .. } => {
//!             // highlight `current`
//!             let _ = current;
//!         }
//!         _ => {}
//!     }
//! }
//! pointer.begin_tick();
//! ```
//!
//! ## Core Concepts
//!
//! ### Structures
//!
//! A [`Structure`](structure::Structure) is generated, never mutated,
//! from a stable id and a [`StructureConfig`](structure::StructureConfig).
//! The same inputs always produce bit-identical point fields, so an entity
//! looks the same every time it is visited. Six kinds are supported:
//! spiral, barred spiral, elliptical, lenticular, irregular, and planetary
//! system.
//!
//! ### View transitions
//!
//! The engine presents one of three view scales (`Overview`, `MidScale`,
//! `Detail`) derived from the current selection. Scale changes fade the
//! old scene out, dispose it, then build and fade the new scene in;
//! requests that arrive mid-transition supersede the in-flight one rather
//! than racing it.
//!
//! ### Audio reactivity
//!
//! A fixed-size magnitude spectrum is reduced to four normalized band
//! features each tick and smoothed before reaching the renderer. No audio
//! source is a valid state: every feature reads exactly zero.
//!
//! ### The tick
//!
//! All engine state is mutated inside [`Engine::tick`](engine::Engine::tick),
//! once per display refresh. Asynchronous work (Oracle queries, device
//! acquisition) posts completions into an inbox drained at the start of the
//! next tick, so a tick never blocks.

pub mod audio;
pub mod camera;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod field;
pub mod gravity;
pub mod inbox;
pub mod input;
pub mod oracle;
pub mod orbit;
pub mod picking;
pub mod renderer;
pub mod seed;
pub mod smoothing;
pub mod structure;
pub mod transition;
pub mod view;

pub use bytemuck;
pub use glam::{Mat4, Vec2, Vec3};

pub use audio::{AudioFeatureExtractor, AudioFeatureFrame};
pub use camera::{CameraRig, CameraTarget, Ray};
pub use config::{EngineConfig, StructureSpec};
pub use engine::Engine;
pub use error::{ConfigError, EngineError, OracleError};
pub use events::EngineNotice;
pub use field::{PointField, PointVertex};
pub use gravity::GravitySim;
pub use input::{PointerSnapshot, PointerTracker};
pub use oracle::{OracleClient, OracleRecord, OracleRequest, OracleSchema};
pub use orbit::OrbitDescriptor;
pub use picking::{InteractionPicker, PickCandidate, PickOutcome};
pub use renderer::{FrameBundle, NullRenderer, RenderParams, Renderer};
pub use seed::SeedRng;
pub use smoothing::SmoothedParameter;
pub use structure::{DetailLevel, Structure, StructureConfig, StructureKind};
pub use transition::{LifecyclePhase, SceneObjectHandle, TransitionController};
pub use view::{EntityId, Selection, ViewState};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```
/// use astrarium::prelude::*;
/// ```
pub mod prelude {
    pub use crate::audio::{AudioFeatureExtractor, AudioFeatureFrame};
    pub use crate::camera::{CameraRig, CameraTarget, Ray};
    pub use crate::config::{EngineConfig, StructureSpec};
    pub use crate::engine::Engine;
    pub use crate::events::EngineNotice;
    pub use crate::field::{PointField, PointVertex};
    pub use crate::input::{PointerSnapshot, PointerTracker};
    pub use crate::oracle::{FieldKind, OracleClient, OracleRecord, OracleSchema};
    pub use crate::renderer::{FrameBundle, NullRenderer, RenderParams, Renderer};
    pub use crate::seed::SeedRng;
    pub use crate::structure::{DetailLevel, Structure, StructureConfig, StructureKind};
    pub use crate::view::{EntityId, Selection, ViewState};
    pub use crate::{Mat4, Vec2, Vec3};
}
