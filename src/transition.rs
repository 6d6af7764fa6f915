//! View transitions and scene object lifecycle.
//!
//! The [`TransitionController`] owns every renderable scene object handle
//! and walks them through the lifecycle
//! `Building → FadingIn → Active → FadingOut → Disposed`, strictly
//! sequentially: nothing is built while anything is still fading out, and
//! dispose leaves zero handles behind.
//!
//! Transition requests carry a monotonically increasing token. A request
//! arriving while another is in flight *supersedes* it: the in-flight
//! fade-out simply retargets, so exactly one build/fade-in ever runs, and
//! it belongs to the latest request, no matter how fast the selection
//! changes.

use crate::view::{EntityId, ViewState};
use tracing::debug;

/// Lifecycle phase of a scene object handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePhase {
    Building,
    FadingIn,
    Active,
    FadingOut,
    Disposed,
}

/// What a scene object renders as.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneObjectKind {
    /// A structure's point field.
    StarField { structure: String },
    /// A body's cached orbit path.
    OrbitPath { body: String },
    /// An orbiting body itself.
    Body { body: String },
}

impl SceneObjectKind {
    /// The entity a hit on this object resolves to.
    pub fn entity(&self) -> EntityId {
        match self {
            SceneObjectKind::StarField { structure } => EntityId::Structure(structure.clone()),
            SceneObjectKind::OrbitPath { body } | SceneObjectKind::Body { body } => {
                EntityId::Body(body.clone())
            }
        }
    }
}

/// An opaque, lifecycle-tagged reference to a renderable instance.
///
/// Owned exclusively by the [`TransitionController`]; handles never
/// outlive the view state they were tagged with.
#[derive(Clone, Debug)]
pub struct SceneObjectHandle {
    id: u64,
    pub kind: SceneObjectKind,
    view: ViewState,
    phase: LifecyclePhase,
    opacity: f32,
}

impl SceneObjectHandle {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn view(&self) -> ViewState {
        self.view
    }

    #[inline]
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Render opacity in [0, 1], driven by the fade phases.
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase == LifecyclePhase::Active
    }
}

/// Events a transition tick can emit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionEvent {
    Started { token: u64, to: ViewState },
    Completed { token: u64, view: ViewState },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Idle,
    FadingOut,
    FadingIn,
}

/// The view transition state machine.
pub struct TransitionController {
    view: ViewState,
    handles: Vec<SceneObjectHandle>,
    stage: Stage,
    fade_duration: f32,
    fade_progress: f32,
    /// Latest requested (token, target view); superseded requests are
    /// simply overwritten here.
    pending: Option<(u64, ViewState)>,
    /// Token of the transition currently fading in.
    in_flight: Option<(u64, ViewState)>,
    next_token: u64,
    next_handle_id: u64,
}

impl TransitionController {
    pub fn new(initial_view: ViewState, fade_duration: f32) -> Self {
        Self {
            view: initial_view,
            handles: Vec::new(),
            stage: Stage::Idle,
            fade_duration: fade_duration.max(0.0),
            fade_progress: 0.0,
            pending: None,
            in_flight: None,
            next_token: 0,
            next_handle_id: 0,
        }
    }

    /// The view state the controller currently presents.
    #[inline]
    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Whether a transition is currently in flight.
    pub fn is_transitioning(&self) -> bool {
        self.stage != Stage::Idle || self.pending.is_some()
    }

    /// All handles, in every phase.
    pub fn handles(&self) -> &[SceneObjectHandle] {
        &self.handles
    }

    /// Only the active handles, the picker's candidate source.
    pub fn active_handles(&self) -> impl Iterator<Item = &SceneObjectHandle> {
        self.handles.iter().filter(|h| h.is_active())
    }

    /// The view the latest pending request targets, if any.
    ///
    /// Lets the caller prepare the target's objects before the build
    /// callback runs.
    pub fn pending_target(&self) -> Option<ViewState> {
        self.pending.map(|(_, view)| view)
    }

    /// Request a transition to `target`. Latest request wins; the returned
    /// token identifies it in subsequent events.
    pub fn request(&mut self, target: ViewState) -> u64 {
        self.next_token += 1;
        let token = self.next_token;
        if let Some((old, _)) = self.pending.replace((token, target)) {
            debug!(superseded = old, token, "transition request superseded");
        }
        token
    }

    /// Advance the state machine by `dt`. `build` is invoked at most once,
    /// after the previous view's objects are fully disposed, to produce the
    /// target view's objects.
    pub fn tick<F>(&mut self, dt: f32, build: F) -> Vec<TransitionEvent>
    where
        F: FnOnce(ViewState) -> Vec<SceneObjectKind>,
    {
        let mut events = Vec::new();

        match self.stage {
            Stage::Idle => {
                if let Some((token, to)) = self.pending {
                    events.push(TransitionEvent::Started { token, to });
                    self.begin_fade_out();
                    if self.handles.is_empty() {
                        // Nothing to fade: dispose is a no-op, build now.
                        self.build_target(build);
                    }
                }
            }
            Stage::FadingOut => {
                self.fade_progress = self.advance_fade(dt);
                let opacity = 1.0 - self.fade_progress;
                for handle in &mut self.handles {
                    if handle.phase == LifecyclePhase::FadingOut {
                        handle.opacity = opacity;
                    }
                }
                if self.fade_progress >= 1.0 {
                    self.dispose_all();
                    self.build_target(build);
                }
            }
            Stage::FadingIn => {
                if self.pending.is_some() {
                    // Superseded mid-fade-in: the new set becomes the
                    // current set and fades back out.
                    self.begin_fade_out();
                } else {
                    self.fade_progress = self.advance_fade(dt);
                    for handle in &mut self.handles {
                        if handle.phase == LifecyclePhase::FadingIn {
                            handle.opacity = self.fade_progress;
                        }
                    }
                    if self.fade_progress >= 1.0 {
                        for handle in &mut self.handles {
                            handle.phase = LifecyclePhase::Active;
                            handle.opacity = 1.0;
                        }
                        let (token, view) = self
                            .in_flight
                            .take()
                            .expect("fade-in always has an in-flight transition");
                        self.stage = Stage::Idle;
                        events.push(TransitionEvent::Completed { token, view });
                    }
                }
            }
        }

        events
    }

    /// Dispose every handle immediately, e.g. at engine shutdown.
    /// Guarantees zero handles survive.
    pub fn dispose_immediately(&mut self) {
        self.dispose_all();
        self.stage = Stage::Idle;
        self.pending = None;
        self.in_flight = None;
    }

    fn advance_fade(&self, dt: f32) -> f32 {
        if self.fade_duration <= f32::EPSILON {
            1.0
        } else {
            (self.fade_progress + dt / self.fade_duration).min(1.0)
        }
    }

    fn begin_fade_out(&mut self) {
        // Resume from the dimmest handle so a superseded fade-in does not
        // pop back to full opacity before fading out.
        let dimmest = self
            .handles
            .iter()
            .map(|h| h.opacity)
            .fold(1.0, f32::min);
        for handle in &mut self.handles {
            handle.phase = LifecyclePhase::FadingOut;
        }
        self.stage = Stage::FadingOut;
        self.fade_progress = 1.0 - dimmest;
        self.in_flight = None;
    }

    fn dispose_all(&mut self) {
        for handle in &mut self.handles {
            handle.phase = LifecyclePhase::Disposed;
        }
        debug!(count = self.handles.len(), "disposed scene objects");
        self.handles.clear();
    }

    fn build_target<F>(&mut self, build: F)
    where
        F: FnOnce(ViewState) -> Vec<SceneObjectKind>,
    {
        let (token, target) = self
            .pending
            .take()
            .expect("build only runs for a pending transition");
        self.view = target;
        self.in_flight = Some((token, target));

        debug_assert!(self.handles.is_empty());
        for kind in build(target) {
            self.next_handle_id += 1;
            self.handles.push(SceneObjectHandle {
                id: self.next_handle_id,
                kind,
                view: target,
                phase: LifecyclePhase::FadingIn,
                opacity: 0.0,
            });
        }
        self.stage = Stage::FadingIn;
        self.fade_progress = 0.0;
    }
}
