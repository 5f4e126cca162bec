//! Pointer tracking for swarm repulsion.
//!
//! Hosts report pointer positions in *displayed* coordinates: the size the
//! surface occupies on screen. The surface's backing store may be a different
//! size (a scaled-down canvas stretched over a window, for example), so the
//! tracker maps every position through the displayed/backing ratio before the
//! particles see it.
//!
//! # Usage
//!
//! ```ignore
//! // Pointer at the center of a 1280x720 window over a 640x360 canvas
//! tracker.pointer_move(Vec2::new(640.0, 360.0), Vec2::new(1280.0, 720.0), canvas.size());
//! assert_eq!(tracker.state().unwrap().position, Vec2::new(320.0, 180.0));
//!
//! tracker.pointer_leave(); // repulsion off from the next update
//! ```

use glam::Vec2;
use winit::event::WindowEvent;

use crate::surface::SurfaceSize;

/// An active repulsion source in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    pub radius: f32,
}

/// Map a displayed-space position into backing-store pixels.
///
/// Returns `None` if the displayed size is degenerate.
pub fn displayed_to_surface(client: Vec2, displayed: Vec2, backing: SurfaceSize) -> Option<Vec2> {
    if displayed.x <= 0.0 || displayed.y <= 0.0 || !client.is_finite() {
        return None;
    }
    Some(client * backing.as_vec2() / displayed)
}

/// Tracks the pointer in surface space.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    state: Option<PointerState>,
    radius: f32,
    // Last displayed size seen, used for raw window events
    displayed: Vec2,
    backing: SurfaceSize,
}

impl PointerTracker {
    /// Create a tracker whose pointer repels within `radius` surface pixels.
    pub fn new(radius: f32) -> Self {
        Self {
            state: None,
            radius,
            displayed: Vec2::ZERO,
            backing: SurfaceSize::default(),
        }
    }

    /// Current pointer, or `None` when no repulsion source is active.
    pub fn state(&self) -> Option<&PointerState> {
        self.state.as_ref()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Record the displayed and backing sizes used for raw window events.
    pub fn set_sizes(&mut self, displayed: Vec2, backing: SurfaceSize) {
        self.displayed = displayed;
        self.backing = backing;
    }

    /// Pointer moved to `client` (relative to the surface's top-left corner,
    /// in displayed units).
    pub fn pointer_move(&mut self, client: Vec2, displayed: Vec2, backing: SurfaceSize) {
        self.displayed = displayed;
        self.backing = backing;
        match displayed_to_surface(client, displayed, backing) {
            Some(position) => {
                self.state = Some(PointerState { position, radius: self.radius });
            }
            None => self.state = None,
        }
    }

    /// Pointer left the surface.
    pub fn pointer_leave(&mut self) {
        self.state = None;
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let client = Vec2::new(position.x as f32, position.y as f32);
                self.pointer_move(client, self.displayed, self.backing);
            }
            WindowEvent::CursorLeft { .. } => self.pointer_leave(),
            _ => {}
        }
    }
}
