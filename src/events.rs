//! Typed per-tick notifications.
//!
//! Instead of ad hoc events on a shared global target, the engine returns a
//! list of [`EngineNotice`]s from every tick. Each variant carries a named
//! payload; hosts match on the ones they care about.

use crate::oracle::OracleRecord;
use crate::view::{EntityId, Selection, ViewState};
use glam::Vec2;

/// Something that happened during a tick.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineNotice {
    /// The pointer came to rest over a different entity (or none).
    HoverChanged {
        previous: Option<EntityId>,
        current: Option<EntityId>,
    },
    /// The selection changed, by click or API call.
    SelectionChanged { selection: Selection },
    /// An empty-space click in the overview resolved to a sky sector.
    SectorClicked { ndc: Vec2 },
    /// A view transition began.
    TransitionStarted { token: u64, to: ViewState },
    /// A view transition finished; its objects are active.
    TransitionCompleted { token: u64, view: ViewState },
    /// An Oracle query resolved, genuinely or via its typed fallback.
    OracleResolved { record: OracleRecord },
    /// An audio source attached; features are now live.
    AudioSourceAttached { buffer_len: usize },
    /// The audio source went away; features degrade to zero.
    AudioSourceLost,
}
