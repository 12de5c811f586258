use anyhow::Result;

use super::host::{HostElement, SurfaceId, WindowDimensions};
use crate::camera::PerspectiveCamera;
use crate::scene::Scene;

/// Graphics library seam - creates device contexts presenting into a host
pub trait GraphicsBackend<H: HostElement> {
    type Surface: RenderSurface;

    /// Create a device context and a surface inside `host`
    fn create_surface(&mut self, host: &H, dimensions: WindowDimensions) -> Result<Self::Surface>;
}

/// Owning handle to a device context and its presented output
pub trait RenderSurface {
    /// Identity used when attaching to a host
    fn id(&self) -> SurfaceId;

    /// Create buffer-backed geometry for every object in the scene
    fn upload(&mut self, scene: &Scene) -> Result<()>;

    /// Render one frame of `scene` through `camera`
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()>;

    /// Reconfigure the presented output
    fn resize(&mut self, dimensions: WindowDimensions);

    /// Release every graphics resource; the surface is unusable afterwards
    fn dispose(&mut self);
}
