//! View scales and selection.
//!
//! The engine's view state is derived, never freely assigned: a selected
//! body implies [`ViewState::Detail`], a selected structure alone implies
//! [`ViewState::MidScale`], and no selection implies [`ViewState::Overview`].

use serde::{Deserialize, Serialize};

/// The closed set of view scales.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewState {
    /// All structures at once.
    Overview,
    /// One structure, up close.
    MidScale,
    /// One orbiting body.
    Detail,
}

/// What clicking empty space does in a given view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptySpaceAction {
    /// Report the clicked sky sector (overview).
    SectorSelect,
    /// Drop the deepest level of the selection.
    ClearSelection,
}

impl ViewState {
    /// The action empty-space clicks perform at this scale.
    pub fn empty_space_action(self) -> EmptySpaceAction {
        match self {
            ViewState::Overview => EmptySpaceAction::SectorSelect,
            ViewState::MidScale | ViewState::Detail => EmptySpaceAction::ClearSelection,
        }
    }
}

/// An id the picker can resolve: a whole structure or one of its bodies.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityId {
    Structure(String),
    Body(String),
}

impl EntityId {
    /// The underlying id string.
    pub fn as_str(&self) -> &str {
        match self {
            EntityId::Structure(id) | EntityId::Body(id) => id,
        }
    }
}

/// The current selection. A body is only ever selected within a structure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    structure: Option<String>,
    body: Option<String>,
}

impl Selection {
    /// No selection.
    pub fn none() -> Self {
        Self::default()
    }

    /// Select a structure, clearing any body selection.
    pub fn with_structure(id: impl Into<String>) -> Self {
        Self {
            structure: Some(id.into()),
            body: None,
        }
    }

    /// Select a body inside a structure.
    pub fn with_body(structure: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            structure: Some(structure.into()),
            body: Some(body.into()),
        }
    }

    #[inline]
    pub fn structure(&self) -> Option<&str> {
        self.structure.as_deref()
    }

    #[inline]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// The view state this selection implies.
    pub fn view_state(&self) -> ViewState {
        if self.body.is_some() {
            ViewState::Detail
        } else if self.structure.is_some() {
            ViewState::MidScale
        } else {
            ViewState::Overview
        }
    }

    /// Drop the deepest selected level: body first, then structure.
    pub fn cleared_one_level(&self) -> Selection {
        if self.body.is_some() {
            Selection {
                structure: self.structure.clone(),
                body: None,
            }
        } else {
            Selection::none()
        }
    }
}
