//! Pointer input boundary.
//!
//! The engine never talks to a windowing system. The host feeds raw pointer
//! state into a [`PointerTracker`], which normalizes coordinates and
//! edge-detects clicks and drags; the engine consumes one immutable
//! [`PointerSnapshot`] per tick.
//!
//! # Usage
//!
//! ```
//! use astrarium::input::PointerTracker;
//!
//! let mut pointer = PointerTracker::new(800, 600);
//! pointer.move_to(400.0, 300.0);
//! pointer.set_button(true);
//! let snap = pointer.snapshot();
//! assert!(snap.pressed);
//! pointer.begin_tick(); // clears edge-triggered state
//! ```

use glam::Vec2;

/// Immutable pointer state for one tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerSnapshot {
    /// Pointer position in normalized device coordinates (-1..1, Y up).
    pub ndc: Vec2,
    /// Whether the primary button is held.
    pub pressed: bool,
    /// Whether the primary button went down this tick (edge-triggered).
    pub clicked: bool,
    /// Pointer movement since last tick, in NDC units, while held.
    ///
    /// `Some` marks direct camera input and engages the manual override.
    pub drag: Option<Vec2>,
}

/// Accumulates raw pointer events between ticks.
#[derive(Debug)]
pub struct PointerTracker {
    window: (u32, u32),
    position: Vec2,
    ndc: Vec2,
    held: bool,
    clicked: bool,
    drag: Vec2,
    dragged: bool,
}

impl PointerTracker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            window: (width.max(1), height.max(1)),
            position: Vec2::ZERO,
            ndc: Vec2::ZERO,
            held: false,
            clicked: false,
            drag: Vec2::ZERO,
            dragged: false,
        }
    }

    /// Update the window size used for NDC conversion.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window = (width.max(1), height.max(1));
    }

    /// Record a pointer move, in pixels from the window's top-left.
    pub fn move_to(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        let (w, h) = self.window;
        let new_ndc = Vec2::new(
            (x / w as f32) * 2.0 - 1.0,
            1.0 - (y / h as f32) * 2.0, // Y flipped
        );
        if self.held {
            self.drag += new_ndc - self.ndc;
            self.dragged = true;
        }
        self.position = new_pos;
        self.ndc = new_ndc;
    }

    /// Record the primary button state. A press fires `clicked` once.
    pub fn set_button(&mut self, pressed: bool) {
        if pressed && !self.held {
            self.clicked = true;
        }
        self.held = pressed;
    }

    /// Clear edge-triggered state. Call once at the start of each tick,
    /// after the snapshot has been consumed.
    pub fn begin_tick(&mut self) {
        self.clicked = false;
        self.drag = Vec2::ZERO;
        self.dragged = false;
    }

    /// Pointer position in window pixels.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// The snapshot the engine consumes this tick.
    pub fn snapshot(&self) -> PointerSnapshot {
        PointerSnapshot {
            ndc: self.ndc,
            pressed: self.held,
            clicked: self.clicked,
            drag: if self.dragged { Some(self.drag) } else { None },
        }
    }
}
