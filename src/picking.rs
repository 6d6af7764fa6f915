//! Pointer picking.
//!
//! The picker casts the camera's pointer ray against the current view's
//! candidate set and resolves the nearest hit. Candidates are supplied by
//! the caller from the *active* scene objects only, so hits against fading
//! or disposed objects are structurally impossible rather than guarded
//! against at runtime.

use crate::camera::Ray;
use crate::view::EntityId;
use glam::Vec3;

/// One pickable sphere.
#[derive(Clone, Debug)]
pub struct PickCandidate {
    pub entity: EntityId,
    pub center: Vec3,
    pub radius: f32,
}

/// Result of resolving a click.
#[derive(Clone, Debug, PartialEq)]
pub enum PickOutcome {
    /// The nearest intersected entity.
    Hit(EntityId),
    /// Nothing under the pointer; the view's empty-space action applies.
    EmptySpace,
}

/// A hover transition, emitted only when the resolved id changes.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverChange {
    pub previous: Option<EntityId>,
    pub current: Option<EntityId>,
}

/// Ray-based picker with hover de-duplication.
#[derive(Debug, Default)]
pub struct InteractionPicker {
    last_hover: Option<EntityId>,
}

impl InteractionPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the pointer most recently rested on.
    #[inline]
    pub fn hovered(&self) -> Option<&EntityId> {
        self.last_hover.as_ref()
    }

    /// Forget the hover state, e.g. across a view transition.
    pub fn reset(&mut self) {
        self.last_hover = None;
    }

    /// Resolve hover for this tick.
    ///
    /// Returns `Some` only when the resolved id differs from last tick's;
    /// repeated ticks over the same entity emit nothing.
    pub fn hover(&mut self, ray: &Ray, candidates: &[PickCandidate]) -> Option<HoverChange> {
        let current = nearest_hit(ray, candidates).map(|(entity, _)| entity);
        if current == self.last_hover {
            return None;
        }
        let change = HoverChange {
            previous: self.last_hover.take(),
            current: current.clone(),
        };
        self.last_hover = current;
        Some(change)
    }

    /// Resolve a click: the nearest hit, or the empty-space outcome.
    pub fn click(&self, ray: &Ray, candidates: &[PickCandidate]) -> PickOutcome {
        match nearest_hit(ray, candidates) {
            Some((entity, _)) => PickOutcome::Hit(entity),
            None => PickOutcome::EmptySpace,
        }
    }
}

/// Nearest ray/sphere intersection, by entry distance along the ray.
fn nearest_hit(ray: &Ray, candidates: &[PickCandidate]) -> Option<(EntityId, f32)> {
    let mut best: Option<(EntityId, f32)> = None;
    for candidate in candidates {
        if let Some(t) = ray_sphere(ray, candidate.center, candidate.radius) {
            match &best {
                Some((_, best_t)) if *best_t <= t => {}
                _ => best = Some((candidate.entity.clone(), t)),
            }
        }
    }
    best
}

/// Distance along the ray to the sphere, or `None` if it is missed or
/// entirely behind the origin.
fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t_near = -b - sqrt_disc;
    let t_far = -b + sqrt_disc;
    if t_near >= 0.0 {
        Some(t_near)
    } else if t_far >= 0.0 {
        // Origin inside the sphere.
        Some(0.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_ray() -> Ray {
        Ray {
            origin: Vec3::ZERO,
            dir: Vec3::Z,
        }
    }

    fn candidate(id: &str, center: Vec3, radius: f32) -> PickCandidate {
        PickCandidate {
            entity: EntityId::Structure(id.to_string()),
            center,
            radius,
        }
    }

    #[test]
    fn test_nearest_hit_wins() {
        let ray = forward_ray();
        let candidates = vec![
            candidate("far", Vec3::new(0.0, 0.0, 20.0), 1.0),
            candidate("near", Vec3::new(0.0, 0.0, 5.0), 1.0),
        ];
        let mut picker = InteractionPicker::new();
        match picker.click(&ray, &candidates) {
            PickOutcome::Hit(EntityId::Structure(id)) => assert_eq!(id, "near"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        let change = picker.hover(&ray, &candidates).expect("first hover fires");
        assert_eq!(change.current, Some(EntityId::Structure("near".into())));
    }

    #[test]
    fn test_miss_is_empty_space() {
        let ray = forward_ray();
        let candidates = vec![candidate("aside", Vec3::new(10.0, 0.0, 5.0), 1.0)];
        let picker = InteractionPicker::new();
        assert_eq!(picker.click(&ray, &candidates), PickOutcome::EmptySpace);
    }

    #[test]
    fn test_behind_ray_not_hit() {
        let ray = forward_ray();
        let candidates = vec![candidate("behind", Vec3::new(0.0, 0.0, -5.0), 1.0)];
        let picker = InteractionPicker::new();
        assert_eq!(picker.click(&ray, &candidates), PickOutcome::EmptySpace);
    }

    #[test]
    fn test_hover_deduplicates() {
        let ray = forward_ray();
        let candidates = vec![candidate("a", Vec3::new(0.0, 0.0, 5.0), 1.0)];
        let mut picker = InteractionPicker::new();

        assert!(picker.hover(&ray, &candidates).is_some());
        // Pointer rests on the same entity: exactly one notification total.
        for _ in 0..10 {
            assert!(picker.hover(&ray, &candidates).is_none());
        }

        // Moving off fires one change back to none.
        let change = picker.hover(&ray, &[]).expect("leave fires");
        assert_eq!(change.previous, Some(EntityId::Structure("a".into())));
        assert_eq!(change.current, None);
        assert!(picker.hover(&ray, &[]).is_none());
    }

    #[test]
    fn test_empty_candidates_never_hit() {
        let ray = forward_ray();
        let picker = InteractionPicker::new();
        assert_eq!(picker.click(&ray, &[]), PickOutcome::EmptySpace);
    }
}
