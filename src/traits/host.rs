/// Viewport dimensions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDimensions {
    pub width: u32,
    pub height: u32,
}

impl WindowDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Minimised windows report a zero extent
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Identifies a render surface attached to a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Identifies a resize listener registered with a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Container the renderer output is attached into
///
/// The controller keeps the host handle for as long as it is mounted, so
/// implementations are usually cheap shared handles onto the real window.
pub trait HostElement {
    /// Ask the host to deliver another display frame
    fn request_redraw(&self);

    /// Make `surface` a child of this host
    fn attach_surface(&mut self, surface: SurfaceId);

    /// Remove `surface`; returns false if it was not attached
    fn detach_surface(&mut self, surface: SurfaceId) -> bool;

    /// Whether `surface` is currently a child of this host
    fn contains_surface(&self, surface: SurfaceId) -> bool;

    /// Start forwarding viewport resizes to the mounted controller
    fn add_resize_listener(&mut self) -> ListenerId;

    /// Stop forwarding viewport resizes for `listener`
    fn remove_resize_listener(&mut self, listener: ListenerId);
}
