use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use winit::window::Window;

use crate::traits::{HostElement, ListenerId, SurfaceId};

#[derive(Debug, Default)]
struct HostState {
    surfaces: Vec<SurfaceId>,
    listeners: Vec<ListenerId>,
    next_listener: u64,
}

/// Host element backed by a winit window
///
/// Clones share attachment and listener bookkeeping, so the event loop can
/// keep a handle while the controller owns another.
#[derive(Clone)]
pub struct WindowHost {
    window: Arc<Window>,
    state: Rc<RefCell<HostState>>,
}

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            state: Rc::new(RefCell::new(HostState::default())),
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Whether viewport resizes should be forwarded to the controller
    pub fn has_resize_listener(&self) -> bool {
        !self.state.borrow().listeners.is_empty()
    }
}

impl HostElement for WindowHost {
    fn request_redraw(&self) {
        self.window.request_redraw();
    }

    fn attach_surface(&mut self, surface: SurfaceId) {
        let mut state = self.state.borrow_mut();
        if !state.surfaces.contains(&surface) {
            state.surfaces.push(surface);
        }
    }

    fn detach_surface(&mut self, surface: SurfaceId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.surfaces.len();
        state.surfaces.retain(|s| *s != surface);
        state.surfaces.len() != before
    }

    fn contains_surface(&self, surface: SurfaceId) -> bool {
        self.state.borrow().surfaces.contains(&surface)
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener += 1;
        let listener = ListenerId(state.next_listener);
        state.listeners.push(listener);
        listener
    }

    fn remove_resize_listener(&mut self, listener: ListenerId) {
        self.state.borrow_mut().listeners.retain(|l| *l != listener);
    }
}
