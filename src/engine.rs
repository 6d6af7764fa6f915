//! The engine context.
//!
//! An [`Engine`] owns every piece of mutable state (structures, camera,
//! transition controller, smoothed parameters, the async inbox) and is
//! driven by exactly one [`Engine::tick`] per display refresh. All mutation
//! happens synchronously inside the tick, so no locking exists anywhere;
//! long-latency work posts completions into the inbox instead of touching
//! state directly.
//!
//! # Example
//!
//! ```
//! use astrarium::prelude::*;
//!
//! let mut engine = Engine::new(EngineConfig::sample()).unwrap();
//! engine.set_fixed_delta(Some(1.0 / 60.0));
//! let mut renderer = NullRenderer::new();
//!
//! for _ in 0..10 {
//!     engine.tick(&PointerSnapshot::default(), None, &mut renderer);
//! }
//! assert_eq!(renderer.frames(), 10);
//! engine.shutdown();
//! ```

use crate::audio::AudioFeatureExtractor;
use crate::camera::{CameraRig, CameraTarget};
use crate::clock::TickClock;
use crate::config::{EngineConfig, StructureSpec};
use crate::error::{EngineError, OracleError};
use crate::events::EngineNotice;
use crate::gravity::GravitySim;
use crate::inbox::{AsyncResult, Inbox, InboxSender};
use crate::input::PointerSnapshot;
use crate::oracle::{OracleClient, OracleRecord, OracleSchema, OracleSlot};
use crate::picking::{InteractionPicker, PickCandidate, PickOutcome};
use crate::renderer::{BodyDraw, FieldDraw, FrameBundle, OrbitDraw, RenderParams, Renderer};
use crate::seed::SeedRng;
use crate::smoothing::SmoothedParameter;
use crate::structure::{DetailLevel, Structure};
use crate::transition::{SceneObjectKind, TransitionController, TransitionEvent};
use crate::view::{EmptySpaceAction, EntityId, Selection, ViewState};
use glam::Vec3;
use std::f32::consts::TAU;
use tracing::{debug, info};

/// One configured structure with its generated instances.
struct StructureEntry {
    spec: StructureSpec,
    anchor: Vec3,
    overview: Structure,
    /// Generated lazily, the first time this structure is focused.
    detail: Option<Structure>,
}

/// The four audio-driven render parameters, smoothed per tick.
struct RenderSmoothing {
    bass: SmoothedParameter,
    mid: SmoothedParameter,
    high: SmoothedParameter,
    overall: SmoothedParameter,
}

impl RenderSmoothing {
    fn new(rate: f32) -> Self {
        Self {
            bass: SmoothedParameter::new(0.0, rate),
            mid: SmoothedParameter::new(0.0, rate),
            high: SmoothedParameter::new(0.0, rate),
            overall: SmoothedParameter::new(0.0, rate),
        }
    }

    fn params(&self) -> RenderParams {
        RenderParams {
            bass: self.bass.value(),
            mid: self.mid.value(),
            high: self.high.value(),
            overall: self.overall.value(),
        }
    }
}

struct GravityAttachment {
    structure_id: String,
    sim: GravitySim,
}

/// The simulation and view-transition engine.
pub struct Engine {
    config: EngineConfig,
    entries: Vec<StructureEntry>,
    controller: TransitionController,
    camera: CameraRig,
    picker: InteractionPicker,
    selection: Selection,
    clock: TickClock,
    audio_extractor: AudioFeatureExtractor,
    smoothing: RenderSmoothing,
    gravity: Option<GravityAttachment>,
    inbox: Inbox,
    oracle: OracleSlot,
    oracle_client: Option<Box<dyn OracleClient>>,
    overview_span: f32,
    shut_down: bool,
}

impl Engine {
    /// Build an engine from a validated configuration.
    ///
    /// Overview structures are generated eagerly; detail instances are
    /// generated the first time each structure is focused. The first ticks
    /// fade the overview in.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let entries: Vec<StructureEntry> = config
            .structures
            .iter()
            .map(|spec| {
                let anchor = match spec.position {
                    Some(p) => Vec3::from_array(p),
                    None => seeded_anchor(&spec.id),
                };
                StructureEntry {
                    overview: Structure::generate(&spec.id, &spec.to_config(DetailLevel::Overview)),
                    anchor,
                    spec: spec.clone(),
                    detail: None,
                }
            })
            .collect();

        let overview_span = entries
            .iter()
            .map(|e| e.anchor.length() + e.spec.radius)
            .fold(200.0, f32::max);

        let initial_target = overview_camera_target(overview_span);
        let mut controller =
            TransitionController::new(ViewState::Overview, config.transition.fade_seconds);
        controller.request(ViewState::Overview);

        info!(structures = entries.len(), "engine initialized");

        Ok(Self {
            camera: CameraRig::new(
                initial_target,
                config.camera.smooth_rate,
                config.camera.fov_degrees.to_radians(),
                16.0 / 9.0,
            ),
            audio_extractor: AudioFeatureExtractor::new(config.audio.ceiling),
            smoothing: RenderSmoothing::new(config.audio.smoothing_rate),
            oracle: OracleSlot::new(config.oracle_timeout),
            entries,
            controller,
            picker: InteractionPicker::new(),
            selection: Selection::none(),
            clock: TickClock::new(),
            gravity: None,
            inbox: Inbox::new(),
            oracle_client: None,
            overview_span,
            config,
            shut_down: false,
        })
    }

    /// Advance the engine by one tick and submit the frame.
    ///
    /// `spectrum` is the audio source's magnitude buffer for this tick;
    /// `None` is the valid, silently degraded no-source state.
    pub fn tick(
        &mut self,
        pointer: &PointerSnapshot,
        spectrum: Option<&[f32]>,
        renderer: &mut dyn Renderer,
    ) -> Vec<EngineNotice> {
        if self.shut_down {
            return Vec::new();
        }
        let mut notices = Vec::new();

        // Async completions first, in completion order.
        for result in self.inbox.drain() {
            match result {
                AsyncResult::Oracle(record) => {
                    if let Some(resolved) = self.oracle.accept(record) {
                        notices.push(EngineNotice::OracleResolved { record: resolved });
                    }
                }
                AsyncResult::AudioAttached { buffer_len } => {
                    info!(buffer_len, "audio source attached");
                    notices.push(EngineNotice::AudioSourceAttached { buffer_len });
                }
                AsyncResult::AudioLost => {
                    info!("audio source lost");
                    notices.push(EngineNotice::AudioSourceLost);
                }
            }
        }

        let (elapsed, dt) = self.clock.advance();

        if let Some(fallback) = self.oracle.poll_timeout(elapsed) {
            notices.push(EngineNotice::OracleResolved { record: fallback });
        }

        // Direct camera input engages the manual override.
        if let Some(drag) = pointer.drag {
            self.camera.apply_manual_orbit(drag);
        }

        // Picking runs against the *current* view's active objects.
        let ray = self.camera.ray_from_ndc(pointer.ndc);
        let candidates = self.pick_candidates(elapsed);
        if let Some(change) = self.picker.hover(&ray, &candidates) {
            notices.push(EngineNotice::HoverChanged {
                previous: change.previous,
                current: change.current,
            });
        }
        if pointer.clicked {
            match self.picker.click(&ray, &candidates) {
                PickOutcome::Hit(entity) => self.select_entity(entity, &mut notices),
                PickOutcome::EmptySpace => match self.controller.view().empty_space_action() {
                    EmptySpaceAction::SectorSelect => {
                        notices.push(EngineNotice::SectorClicked { ndc: pointer.ndc });
                    }
                    EmptySpaceAction::ClearSelection => {
                        let next = self.selection.cleared_one_level();
                        self.apply_selection(next, &mut notices);
                    }
                },
            }
        }

        // Transitions. Objects for the pending target are planned up front
        // so the build callback stays free of engine state.
        let planned = self
            .controller
            .pending_target()
            .map(|view| self.plan_objects(view));
        let events = self
            .controller
            .tick(dt, move |_| planned.unwrap_or_default());
        for event in events {
            match event {
                TransitionEvent::Started { token, to } => {
                    self.picker.reset();
                    notices.push(EngineNotice::TransitionStarted { token, to });
                }
                TransitionEvent::Completed { token, view } => {
                    self.attach_gravity(view);
                    notices.push(EngineNotice::TransitionCompleted { token, view });
                }
            }
        }

        // Camera chases the target for the (possibly new) view.
        let target = self.camera_target(elapsed);
        self.camera.set_target(target);
        self.camera.tick();

        // Living star field.
        if let Some(attachment) = &mut self.gravity {
            if let Some(entry) = self
                .entries
                .iter_mut()
                .find(|e| e.spec.id == attachment.structure_id)
            {
                if let Some(field) = entry.detail.as_mut().and_then(|s| s.field_mut()) {
                    attachment.sim.step(field, dt);
                }
            }
        }

        // Audio features, always through the smoother.
        let frame = self.audio_extractor.extract(spectrum);
        self.smoothing.bass.set_target(frame.bass);
        self.smoothing.mid.set_target(frame.mid);
        self.smoothing.high.set_target(frame.high);
        self.smoothing.overall.set_target(frame.overall);
        self.smoothing.bass.tick();
        self.smoothing.mid.tick();
        self.smoothing.high.tick();
        self.smoothing.overall.tick();

        let bundle = self.frame_bundle(elapsed);
        renderer.submit(&bundle);

        notices
    }

    /// Dispose every scene object and stop accepting ticks.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.controller.dispose_immediately();
        self.shut_down = true;
        info!("engine shut down");
    }

    // ========== Selection ==========

    /// Select a structure (or clear with `None`) through the API rather
    /// than a click.
    pub fn select_structure(&mut self, id: Option<&str>) -> Result<Vec<EngineNotice>, EngineError> {
        let next = match id {
            Some(id) => {
                self.entry(id)
                    .ok_or_else(|| EngineError::UnknownStructure(id.to_string()))?;
                Selection::with_structure(id)
            }
            None => Selection::none(),
        };
        let mut notices = Vec::new();
        self.apply_selection(next, &mut notices);
        Ok(notices)
    }

    /// Select one orbiting body of a planetary system.
    pub fn select_body(
        &mut self,
        structure_id: &str,
        body_id: &str,
    ) -> Result<Vec<EngineNotice>, EngineError> {
        let entry = self
            .entry(structure_id)
            .ok_or_else(|| EngineError::UnknownStructure(structure_id.to_string()))?;
        let known = entry
            .overview
            .bodies()
            .map(|bodies| bodies.iter().any(|b| b.id == body_id))
            .unwrap_or(false);
        if !known {
            return Err(EngineError::UnknownBody(body_id.to_string()));
        }
        let mut notices = Vec::new();
        self.apply_selection(Selection::with_body(structure_id, body_id), &mut notices);
        Ok(notices)
    }

    fn select_entity(&mut self, entity: EntityId, notices: &mut Vec<EngineNotice>) {
        let next = match entity {
            EntityId::Structure(id) => Selection::with_structure(id),
            EntityId::Body(body_id) => match self.owner_of_body(&body_id) {
                Some(structure_id) => Selection::with_body(structure_id, body_id),
                None => return,
            },
        };
        self.apply_selection(next, notices);
    }

    fn apply_selection(&mut self, next: Selection, notices: &mut Vec<EngineNotice>) {
        if next == self.selection {
            return;
        }
        debug!(?next, "selection changed");
        self.selection = next;
        self.camera.clear_manual_override();
        self.controller.request(self.selection.view_state());
        notices.push(EngineNotice::SelectionChanged {
            selection: self.selection.clone(),
        });
    }

    // ========== Oracle ==========

    /// Install the external Oracle client.
    pub fn set_oracle_client(&mut self, client: Box<dyn OracleClient>) {
        self.oracle_client = Some(client);
    }

    /// Issue an Oracle query; any outstanding query is superseded.
    ///
    /// The result (or its timeout fallback) arrives as
    /// [`EngineNotice::OracleResolved`] on a later tick. Without a client
    /// installed, the query resolves immediately to a typed fallback.
    pub fn ask_oracle(&mut self, prompt: &str, schema: OracleSchema) -> u64 {
        let request = self.oracle.begin(prompt, schema, self.clock.elapsed());
        let token = request.token;
        match &mut self.oracle_client {
            Some(client) => client.submit(request, self.inbox.sender()),
            None => {
                let fallback = OracleRecord::fallback(
                    request.token,
                    &request.schema,
                    &OracleError::Client("no oracle client installed".into()),
                );
                self.inbox.sender().post(AsyncResult::Oracle(fallback));
            }
        }
        token
    }

    // ========== Accessors ==========

    /// Producer handle for async collaborators (audio acquisition, custom
    /// Oracle transports).
    pub fn async_sender(&self) -> InboxSender {
        self.inbox.sender()
    }

    /// The view state currently presented.
    pub fn view(&self) -> ViewState {
        self.controller.view()
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Whether a view transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.controller.is_transitioning()
    }

    /// Live scene object handle count, across all phases.
    pub fn handle_count(&self) -> usize {
        self.controller.handles().len()
    }

    /// The camera rig.
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// The smoothed render parameters as of the last tick.
    pub fn render_params(&self) -> RenderParams {
        self.smoothing.params()
    }

    /// Whether an Oracle query is outstanding.
    pub fn oracle_thinking(&self) -> bool {
        self.oracle.is_thinking()
    }

    /// A structure's overview instance.
    pub fn structure(&self, id: &str) -> Option<&Structure> {
        self.entry(id).map(|e| &e.overview)
    }

    /// Pin a fixed tick delta for deterministic runs.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.clock.set_fixed_delta(delta);
    }

    /// Update the renderer's aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.set_aspect(aspect);
    }

    /// Replace a structure's parameters, regenerating it from scratch.
    ///
    /// Structures are immutable once generated; a parameter change swaps in
    /// freshly generated instances and, if the structure is on screen,
    /// requests a rebuild transition.
    pub fn update_structure(&mut self, spec: StructureSpec) -> Result<(), EngineError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.spec.id == spec.id)
            .ok_or_else(|| EngineError::UnknownStructure(spec.id.clone()))?;
        entry.overview = Structure::generate(&spec.id, &spec.to_config(DetailLevel::Overview));
        entry.detail = None;
        if let Some(p) = spec.position {
            entry.anchor = Vec3::from_array(p);
        }
        entry.spec = spec;
        self.controller.request(self.selection.view_state());
        Ok(())
    }

    // ========== Internals ==========

    fn entry(&self, id: &str) -> Option<&StructureEntry> {
        self.entries.iter().find(|e| e.spec.id == id)
    }

    fn owner_of_body(&self, body_id: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|e| {
                e.overview
                    .bodies()
                    .map(|bodies| bodies.iter().any(|b| b.id == body_id))
                    .unwrap_or(false)
            })
            .map(|e| e.spec.id.clone())
    }

    /// Ensure the focused structure has a detail instance, then list the
    /// scene objects the target view needs.
    fn plan_objects(&mut self, view: ViewState) -> Vec<SceneObjectKind> {
        if view != ViewState::Overview {
            if let Some(id) = self.selection.structure().map(str::to_owned) {
                if let Some(entry) = self.entries.iter_mut().find(|e| e.spec.id == id) {
                    if entry.detail.is_none() {
                        entry.detail = Some(Structure::generate(
                            &id,
                            &entry.spec.to_config(DetailLevel::Detail),
                        ));
                    }
                }
            }
        }

        match view {
            ViewState::Overview => self
                .entries
                .iter()
                .map(|e| SceneObjectKind::StarField {
                    structure: e.spec.id.clone(),
                })
                .collect(),
            ViewState::MidScale => {
                let Some(entry) = self.selection.structure().and_then(|id| self.entry(id)) else {
                    return Vec::new();
                };
                match entry.overview.bodies() {
                    Some(bodies) => bodies
                        .iter()
                        .flat_map(|b| {
                            [
                                SceneObjectKind::OrbitPath { body: b.id.clone() },
                                SceneObjectKind::Body { body: b.id.clone() },
                            ]
                        })
                        .collect(),
                    None => vec![SceneObjectKind::StarField {
                        structure: entry.spec.id.clone(),
                    }],
                }
            }
            ViewState::Detail => match self.selection.body() {
                Some(body_id) => vec![
                    SceneObjectKind::OrbitPath {
                        body: body_id.to_string(),
                    },
                    SceneObjectKind::Body {
                        body: body_id.to_string(),
                    },
                ],
                None => Vec::new(),
            },
        }
    }

    fn attach_gravity(&mut self, view: ViewState) {
        self.gravity = None;
        if !self.config.gravity.enabled || view != ViewState::MidScale {
            return;
        }
        let Some(id) = self.selection.structure().map(str::to_owned) else {
            return;
        };
        let field_len = match self
            .entry(&id)
            .and_then(|e| e.detail.as_ref())
            .and_then(|s| s.field())
        {
            Some(field) => field.len(),
            None => return,
        };
        self.gravity = Some(GravityAttachment {
            structure_id: id,
            sim: GravitySim::new(
                field_len,
                self.config.gravity.g,
                self.config.gravity.min_radius,
            ),
        });
    }

    /// Body world position at a given elapsed time.
    fn body_position(&self, body_id: &str, elapsed: f32) -> Option<(Vec3, f32, Vec3)> {
        let entry = self.entries.iter().find(|e| {
            e.overview
                .bodies()
                .map(|bodies| bodies.iter().any(|b| b.id == body_id))
                .unwrap_or(false)
        })?;
        let body = entry.overview.body(body_id)?;
        let position = entry.anchor + body.orbit.position_at(elapsed);
        Some((position, body.radius, body.color))
    }

    fn camera_target(&self, elapsed: f32) -> CameraTarget {
        match self.controller.view() {
            ViewState::Overview => overview_camera_target(self.overview_span),
            ViewState::MidScale => {
                match self.selection.structure().and_then(|id| self.entry(id)) {
                    Some(entry) => {
                        let r = entry.spec.radius;
                        CameraTarget {
                            position: entry.anchor + Vec3::new(0.0, r * 0.7, r * 1.6),
                            look_at: entry.anchor,
                        }
                    }
                    None => overview_camera_target(self.overview_span),
                }
            }
            ViewState::Detail => {
                match self
                    .selection
                    .body()
                    .and_then(|id| self.body_position(id, elapsed))
                {
                    Some((position, radius, _)) => CameraTarget {
                        position: position + Vec3::new(0.0, radius * 3.0, radius * 8.0 + 2.0),
                        look_at: position,
                    },
                    None => overview_camera_target(self.overview_span),
                }
            }
        }
    }

    /// Candidates for this tick's picking, from active handles only.
    fn pick_candidates(&self, elapsed: f32) -> Vec<PickCandidate> {
        self.controller
            .active_handles()
            .filter_map(|handle| match &handle.kind {
                SceneObjectKind::StarField { structure } => {
                    let entry = self.entry(structure)?;
                    Some(PickCandidate {
                        entity: EntityId::Structure(structure.clone()),
                        center: entry.anchor,
                        radius: entry.spec.radius,
                    })
                }
                SceneObjectKind::Body { body } => {
                    let (center, radius, _) = self.body_position(body, elapsed)?;
                    Some(PickCandidate {
                        entity: EntityId::Body(body.clone()),
                        center,
                        // Inflated so small bodies stay clickable.
                        radius: radius * 2.0,
                    })
                }
                // Orbit paths render but are never pickable.
                SceneObjectKind::OrbitPath { .. } => None,
            })
            .collect()
    }

    fn frame_bundle(&self, elapsed: f32) -> FrameBundle<'_> {
        let mut fields = Vec::new();
        let mut orbits = Vec::new();
        let mut bodies = Vec::new();

        for handle in self.controller.handles() {
            let opacity = handle.opacity();
            if opacity <= 0.0 {
                continue;
            }
            match &handle.kind {
                SceneObjectKind::StarField { structure } => {
                    let Some(entry) = self.entry(structure) else {
                        continue;
                    };
                    let instance = match handle.view() {
                        ViewState::Overview => Some(&entry.overview),
                        _ => entry.detail.as_ref(),
                    };
                    if let Some(field) = instance.and_then(|s| s.field()) {
                        fields.push(FieldDraw {
                            structure: &entry.spec.id,
                            field,
                            anchor: entry.anchor,
                            opacity,
                        });
                    }
                }
                SceneObjectKind::OrbitPath { body } => {
                    if let Some((entry, b)) = self.find_body(body) {
                        orbits.push(OrbitDraw {
                            body: &b.id,
                            path: b.orbit.path(),
                            anchor: entry.anchor,
                            opacity,
                        });
                    }
                }
                SceneObjectKind::Body { body } => {
                    if let Some((center, radius, color)) = self.body_position(body, elapsed) {
                        if let Some((_, b)) = self.find_body(body) {
                            bodies.push(BodyDraw {
                                body: &b.id,
                                center,
                                radius,
                                color,
                                opacity,
                            });
                        }
                    }
                }
            }
        }

        FrameBundle {
            view_proj: self.camera.view_proj(),
            fields,
            orbits,
            bodies,
            params: self.smoothing.params(),
        }
    }

    fn find_body(&self, body_id: &str) -> Option<(&StructureEntry, &crate::structure::OrbitingBody)> {
        self.entries.iter().find_map(|entry| {
            entry
                .overview
                .body(body_id)
                .map(|body| (entry, body))
        })
    }
}

fn overview_camera_target(span: f32) -> CameraTarget {
    CameraTarget {
        position: Vec3::new(0.0, span * 0.8, span * 1.5),
        look_at: Vec3::ZERO,
    }
}

/// Seeded ring placement for structures without a configured position.
fn seeded_anchor(id: &str) -> Vec3 {
    let mut rng = SeedRng::new(id).fork("anchor");
    let theta = rng.range(0.0, TAU);
    let dist = rng.range(150.0, 300.0);
    Vec3::new(
        theta.cos() * dist,
        rng.signed() * 30.0,
        theta.sin() * dist,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{FieldKind, OracleRequest};
    use crate::renderer::NullRenderer;

    fn ticked_engine() -> (Engine, NullRenderer) {
        let mut engine = Engine::new(EngineConfig::sample()).unwrap();
        engine.set_fixed_delta(Some(1.0 / 30.0));
        let mut renderer = NullRenderer::new();
        // Let the initial overview transition finish.
        for _ in 0..60 {
            engine.tick(&PointerSnapshot::default(), None, &mut renderer);
        }
        (engine, renderer)
    }

    fn run_ticks(engine: &mut Engine, renderer: &mut NullRenderer, n: usize) -> Vec<EngineNotice> {
        let mut notices = Vec::new();
        for _ in 0..n {
            notices.extend(engine.tick(&PointerSnapshot::default(), None, renderer));
        }
        notices
    }

    #[test]
    fn test_init_builds_overview() {
        let (engine, renderer) = ticked_engine();
        assert_eq!(engine.view(), ViewState::Overview);
        assert!(!engine.is_transitioning());
        // One star field handle per configured structure.
        assert_eq!(engine.handle_count(), 3);
        assert_eq!(renderer.frames(), 60);
    }

    #[test]
    fn test_selection_drives_view_state() {
        let (mut engine, mut renderer) = ticked_engine();

        engine.select_structure(Some("whirl")).unwrap();
        let notices = run_ticks(&mut engine, &mut renderer, 80);
        assert_eq!(engine.view(), ViewState::MidScale);
        assert!(notices
            .iter()
            .any(|n| matches!(n, EngineNotice::TransitionCompleted { view, .. } if *view == ViewState::MidScale)));

        engine.select_structure(None).unwrap();
        run_ticks(&mut engine, &mut renderer, 80);
        assert_eq!(engine.view(), ViewState::Overview);
    }

    #[test]
    fn test_body_selection_reaches_detail() {
        let (mut engine, mut renderer) = ticked_engine();
        engine.select_body("haven", "haven/body-2").unwrap();
        run_ticks(&mut engine, &mut renderer, 80);
        assert_eq!(engine.view(), ViewState::Detail);

        // Handles are tagged with the detail view only.
        let handles = engine.controller.handles();
        assert!(handles.iter().all(|h| h.view() == ViewState::Detail));
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let (mut engine, _) = ticked_engine();
        assert!(engine.select_structure(Some("nope")).is_err());
        assert!(engine.select_body("haven", "haven/body-99").is_err());
        assert!(engine.select_body("whirl", "whirl/body-0").is_err());
    }

    #[test]
    fn test_rapid_selection_latest_wins() {
        let (mut engine, mut renderer) = ticked_engine();
        engine.select_structure(Some("whirl")).unwrap();
        run_ticks(&mut engine, &mut renderer, 2);
        engine.select_structure(Some("smudge")).unwrap();
        run_ticks(&mut engine, &mut renderer, 2);
        engine.select_structure(Some("haven")).unwrap();
        run_ticks(&mut engine, &mut renderer, 120);

        assert_eq!(engine.view(), ViewState::MidScale);
        assert_eq!(engine.selection().structure(), Some("haven"));
        // Every surviving handle belongs to the final target.
        assert!(engine
            .controller
            .handles()
            .iter()
            .all(|h| h.view() == ViewState::MidScale));
    }

    #[test]
    fn test_selection_clears_manual_override() {
        let (mut engine, mut renderer) = ticked_engine();
        let drag = PointerSnapshot {
            drag: Some(glam::Vec2::new(0.1, 0.0)),
            ..Default::default()
        };
        engine.tick(&drag, None, &mut renderer);
        assert!(engine.camera().manual_override());

        engine.select_structure(Some("whirl")).unwrap();
        assert!(!engine.camera().manual_override());
    }

    #[test]
    fn test_audio_features_smoothed() {
        let (mut engine, mut renderer) = ticked_engine();
        let spectrum = vec![255.0f32; 64];

        engine.tick(&PointerSnapshot::default(), Some(&spectrum), &mut renderer);
        let early = engine.render_params();
        assert!(early.overall > 0.0 && early.overall < 1.0);

        for _ in 0..200 {
            engine.tick(&PointerSnapshot::default(), Some(&spectrum), &mut renderer);
        }
        let settled = engine.render_params();
        assert!(settled.overall > 0.95);

        // Dropping the source decays features toward silence.
        for _ in 0..200 {
            engine.tick(&PointerSnapshot::default(), None, &mut renderer);
        }
        assert!(engine.render_params().overall < 0.05);
    }

    struct SilentOracle;
    impl OracleClient for SilentOracle {
        fn submit(&mut self, _request: OracleRequest, _reply: InboxSender) {}
    }

    fn lore_schema() -> OracleSchema {
        OracleSchema::new("lore").with_field("text", "a short description", FieldKind::Text)
    }

    #[test]
    fn test_oracle_timeout_resolves_to_fallback() {
        let mut config = EngineConfig::sample();
        config.oracle_timeout = 0.5;
        let mut engine = Engine::new(config).unwrap();
        engine.set_fixed_delta(Some(0.1));
        engine.set_oracle_client(Box::new(SilentOracle));
        let mut renderer = NullRenderer::new();

        let token = engine.ask_oracle("what is this star?", lore_schema());
        assert!(engine.oracle_thinking());

        let mut resolved = None;
        for _ in 0..20 {
            for notice in engine.tick(&PointerSnapshot::default(), None, &mut renderer) {
                if let EngineNotice::OracleResolved { record } = notice {
                    resolved = Some(record);
                }
            }
        }
        let record = resolved.expect("timeout fallback must arrive");
        assert_eq!(record.token, token);
        assert!(record.is_fallback());
        assert!(!engine.oracle_thinking());
    }

    #[test]
    fn test_oracle_supersession_discards_stale() {
        let mut engine = Engine::new(EngineConfig::sample()).unwrap();
        engine.set_fixed_delta(Some(0.01));
        engine.set_oracle_client(Box::new(SilentOracle));
        let mut renderer = NullRenderer::new();

        let first = engine.ask_oracle("first", lore_schema());
        let second = engine.ask_oracle("second", lore_schema());

        // A late completion for the first query arrives from outside.
        engine.async_sender().post(AsyncResult::Oracle(
            OracleRecord::response(first, serde_json::json!({"text": "stale"})),
        ));
        let notices = engine.tick(&PointerSnapshot::default(), None, &mut renderer);
        assert!(!notices
            .iter()
            .any(|n| matches!(n, EngineNotice::OracleResolved { .. })));

        // The current one resolves normally.
        engine.async_sender().post(AsyncResult::Oracle(
            OracleRecord::response(second, serde_json::json!({"text": "fresh"})),
        ));
        let notices = engine.tick(&PointerSnapshot::default(), None, &mut renderer);
        assert!(notices.iter().any(|n| matches!(
            n,
            EngineNotice::OracleResolved { record } if record.token == second && !record.is_fallback()
        )));
    }

    #[test]
    fn test_shutdown_disposes_everything() {
        let (mut engine, mut renderer) = ticked_engine();
        assert!(engine.handle_count() > 0);
        engine.shutdown();
        assert_eq!(engine.handle_count(), 0);
        // Ticks after shutdown are inert.
        let notices = engine.tick(&PointerSnapshot::default(), None, &mut renderer);
        assert!(notices.is_empty());
        assert_eq!(renderer.frames(), 60);
    }

    #[test]
    fn test_update_structure_regenerates() {
        let (mut engine, mut renderer) = ticked_engine();
        let before = engine.structure("whirl").unwrap().field().unwrap().len();

        let mut spec = EngineConfig::sample().structures[0].clone();
        spec.particle_count = 1000;
        engine.update_structure(spec).unwrap();
        run_ticks(&mut engine, &mut renderer, 80);

        let after = engine.structure("whirl").unwrap().field().unwrap().len();
        assert!(after < before);
        assert!(!engine.is_transitioning());
    }
}
