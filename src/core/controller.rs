use anyhow::{bail, Context, Result};

use super::frame_scheduler::{FrameHandle, FrameScheduler};
use crate::camera::PerspectiveCamera;
use crate::scene::Scene;
use crate::traits::{
    GraphicsBackend, HostElement, ListenerId, RenderSurface, SurfaceId, WindowDimensions,
};

/// Lifecycle of an ambient scene controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unmounted,
    Running,
}

/// Everything that exists only while the controller is mounted
struct Mounted<S, H> {
    host: H,
    surface: S,
    scene: Scene,
    camera: PerspectiveCamera,
    frame: FrameHandle,
    resize_listener: ListenerId,
}

/// Owns the decorative background: scene, camera, render surface and frame loop
///
/// Each instance is independent. Dropping a running controller tears it down.
pub struct AmbientSceneController<B: GraphicsBackend<H>, H: HostElement> {
    backend: B,
    scheduler: FrameScheduler,
    mounted: Option<Mounted<B::Surface, H>>,
}

impl<B: GraphicsBackend<H>, H: HostElement> AmbientSceneController<B, H> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            scheduler: FrameScheduler::new(),
            mounted: None,
        }
    }

    /// Build the scene and start the frame loop inside `host`
    ///
    /// An absent host is not an error: nothing is created and the controller
    /// stays unmounted. Graphics failures are returned with nothing left
    /// attached or scheduled.
    pub fn initialize(&mut self, width: u32, height: u32, host: Option<H>) -> Result<()> {
        if self.mounted.is_some() {
            bail!("Ambient scene is already running; tear it down before remounting");
        }

        let Some(mut host) = host else {
            log::debug!("No host element available, skipping ambient scene");
            return Ok(());
        };

        let dimensions = WindowDimensions::new(width.max(1), height.max(1));
        let camera = PerspectiveCamera::for_viewport(dimensions);
        let scene = Scene::ambient(&mut rand::thread_rng());

        let mut surface = self
            .backend
            .create_surface(&host, dimensions)
            .context("Failed to create render surface")?;

        if let Err(e) = surface.upload(&scene) {
            surface.dispose();
            return Err(e.context("Failed to upload scene geometry"));
        }

        host.attach_surface(surface.id());
        let resize_listener = host.add_resize_listener();
        let frame = self.scheduler.request();
        host.request_redraw();

        log::info!(
            "Ambient scene mounted at {}x{} with {} objects",
            dimensions.width,
            dimensions.height,
            scene.len()
        );

        self.mounted = Some(Mounted {
            host,
            surface,
            scene,
            camera,
            frame,
            resize_listener,
        });
        Ok(())
    }

    /// Run the pending frame callback: reschedule, rotate, render
    ///
    /// Returns `Ok(false)` when no frame is due, which is always the case
    /// once the controller has been torn down.
    pub fn frame_tick(&mut self) -> Result<bool> {
        let Some(mounted) = self.mounted.as_mut() else {
            return Ok(false);
        };
        let Some(handle) = self.scheduler.take() else {
            return Ok(false);
        };
        debug_assert_eq!(handle, mounted.frame);

        mounted.frame = self.scheduler.request();
        mounted.host.request_redraw();

        mounted.scene.tick();
        mounted
            .surface
            .render(&mounted.scene, &mounted.camera)
            .context("Failed to render ambient frame")?;
        Ok(true)
    }

    /// Recompute the projection and resize the surface
    ///
    /// Ignored while unmounted and for zero-sized viewports.
    pub fn on_resize(&mut self, width: u32, height: u32) -> bool {
        let Some(mounted) = self.mounted.as_mut() else {
            return false;
        };

        let dimensions = WindowDimensions::new(width, height);
        if dimensions.is_empty() {
            return false;
        }

        mounted.camera.set_viewport(dimensions);
        mounted.surface.resize(dimensions);
        log::debug!("Ambient scene resized to {}x{}", width, height);
        true
    }

    /// Stop the frame loop, detach and release the surface
    ///
    /// Safe to call repeatedly; returns false when there was nothing to tear down.
    pub fn teardown(&mut self) -> bool {
        let Some(mut mounted) = self.mounted.take() else {
            return false;
        };

        // Frames stop before any resource is released
        self.scheduler.cancel(mounted.frame);
        mounted.host.remove_resize_listener(mounted.resize_listener);
        mounted.host.detach_surface(mounted.surface.id());
        mounted.surface.dispose();

        log::info!("Ambient scene torn down");
        true
    }

    pub fn state(&self) -> LifecycleState {
        if self.mounted.is_some() {
            LifecycleState::Running
        } else {
            LifecycleState::Unmounted
        }
    }

    /// Whether the host loop should deliver a frame tick
    pub fn frame_due(&self) -> bool {
        self.mounted.is_some() && self.scheduler.pending().is_some()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.mounted.as_ref().map(|m| &m.scene)
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.mounted.as_ref().map(|m| &m.camera)
    }

    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.mounted.as_ref().map(|m| m.surface.id())
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }
}

impl<B: GraphicsBackend<H>, H: HostElement> Drop for AmbientSceneController<B, H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
