use std::cell::RefCell;
use std::rc::Rc;

use ambient_backdrop::camera::PerspectiveCamera;
use ambient_backdrop::core::{
    AmbientSceneController, GraphicsBackend, HostElement, LifecycleState, ListenerId, RenderSurface,
    SurfaceId, WindowDimensions,
};
use ambient_backdrop::scene::{ObjectKind, Scene};
use anyhow::{bail, Result};

// ============================================================================
// Mock graphics backend
// ============================================================================

#[derive(Default)]
struct BackendLog {
    surfaces_created: u64,
    /// Host each surface was created in, by creation order
    surface_hosts: Vec<u32>,
    uploads: usize,
    /// Camera aspect seen by each render call
    rendered_aspects: Vec<f32>,
    resizes: Vec<WindowDimensions>,
    disposed: Vec<SurfaceId>,
    fail_create: bool,
    fail_upload: bool,
    fail_render: bool,
}

#[derive(Clone, Default)]
struct MockBackend {
    log: Rc<RefCell<BackendLog>>,
}

struct MockSurface {
    id: SurfaceId,
    log: Rc<RefCell<BackendLog>>,
    disposed: bool,
}

impl GraphicsBackend<MockHost> for MockBackend {
    type Surface = MockSurface;

    fn create_surface(
        &mut self,
        host: &MockHost,
        _dimensions: WindowDimensions,
    ) -> Result<MockSurface> {
        let mut log = self.log.borrow_mut();
        if log.fail_create {
            bail!("no adapter");
        }
        log.surfaces_created += 1;
        log.surface_hosts.push(host.name);
        Ok(MockSurface {
            id: SurfaceId(log.surfaces_created),
            log: self.log.clone(),
            disposed: false,
        })
    }
}

impl RenderSurface for MockSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn upload(&mut self, _scene: &Scene) -> Result<()> {
        let mut log = self.log.borrow_mut();
        if log.fail_upload {
            bail!("out of memory");
        }
        log.uploads += 1;
        Ok(())
    }

    fn render(&mut self, _scene: &Scene, camera: &PerspectiveCamera) -> Result<()> {
        assert!(!self.disposed, "render after dispose");
        let mut log = self.log.borrow_mut();
        if log.fail_render {
            bail!("device lost");
        }
        log.rendered_aspects.push(camera.projected_aspect());
        Ok(())
    }

    fn resize(&mut self, dimensions: WindowDimensions) {
        self.log.borrow_mut().resizes.push(dimensions);
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.log.borrow_mut().disposed.push(self.id);
        }
    }
}

// ============================================================================
// Mock host element
// ============================================================================

#[derive(Default)]
struct HostLog {
    children: Vec<SurfaceId>,
    listeners: Vec<ListenerId>,
    next_listener: u64,
    redraw_requests: usize,
}

#[derive(Clone, Default)]
struct MockHost {
    name: u32,
    log: Rc<RefCell<HostLog>>,
}

impl MockHost {
    fn named(name: u32) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn children(&self) -> usize {
        self.log.borrow().children.len()
    }

    fn listeners(&self) -> usize {
        self.log.borrow().listeners.len()
    }

    fn redraw_requests(&self) -> usize {
        self.log.borrow().redraw_requests
    }
}

impl HostElement for MockHost {
    fn request_redraw(&self) {
        self.log.borrow_mut().redraw_requests += 1;
    }

    fn attach_surface(&mut self, surface: SurfaceId) {
        self.log.borrow_mut().children.push(surface);
    }

    fn detach_surface(&mut self, surface: SurfaceId) -> bool {
        let mut log = self.log.borrow_mut();
        let before = log.children.len();
        log.children.retain(|s| *s != surface);
        log.children.len() != before
    }

    fn contains_surface(&self, surface: SurfaceId) -> bool {
        self.log.borrow().children.contains(&surface)
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        let mut log = self.log.borrow_mut();
        log.next_listener += 1;
        let id = ListenerId(log.next_listener);
        log.listeners.push(id);
        id
    }

    fn remove_resize_listener(&mut self, listener: ListenerId) {
        self.log.borrow_mut().listeners.retain(|l| *l != listener);
    }
}

type Controller = AmbientSceneController<MockBackend, MockHost>;

fn mounted() -> (Controller, MockBackend, MockHost) {
    let backend = MockBackend::default();
    let host = MockHost::default();
    let mut controller = AmbientSceneController::new(backend.clone());
    controller
        .initialize(1024, 768, Some(host.clone()))
        .expect("mock initialize succeeds");
    (controller, backend, host)
}

fn rotation_of(controller: &Controller, name: &str) -> glam::Vec3 {
    controller
        .scene()
        .and_then(|s| s.find(name))
        .map(|o| o.rotation)
        .expect("object present")
}

// ============================================================================
// Initialize
// ============================================================================

#[test]
fn test_initialize_with_host_mounts_scene() {
    let (controller, backend, host) = mounted();

    assert_eq!(controller.state(), LifecycleState::Running);
    let scene = controller.scene().expect("scene exists while running");
    assert_eq!(scene.len(), 4);
    assert_eq!(scene.particle_fields().count(), 1);
    assert_eq!(scene.solids().count(), 3);

    assert_eq!(controller.scheduler().pending_count(), 1);
    assert!(controller.frame_due());

    let surface = controller.surface_id().expect("surface exists while running");
    assert!(host.contains_surface(surface));
    assert_eq!(host.children(), 1);
    assert_eq!(host.listeners(), 1);
    assert_eq!(host.redraw_requests(), 1);

    assert_eq!(backend.log.borrow().surfaces_created, 1);
    assert_eq!(backend.log.borrow().uploads, 1);
}

#[test]
fn test_surface_is_created_in_the_given_host() {
    let backend = MockBackend::default();
    let sidebar = MockHost::named(1);
    let main_view = MockHost::named(2);
    let mut controller: Controller = AmbientSceneController::new(backend.clone());

    controller.initialize(800, 600, Some(main_view.clone())).unwrap();
    let surface = controller.surface_id().unwrap();

    assert_eq!(backend.log.borrow().surface_hosts, vec![2]);
    assert!(main_view.contains_surface(surface));
    assert!(!sidebar.contains_surface(surface));

    controller.teardown();
    controller.initialize(800, 600, Some(sidebar.clone())).unwrap();

    assert_eq!(backend.log.borrow().surface_hosts, vec![2, 1]);
    assert_eq!(sidebar.children(), 1);
    assert_eq!(main_view.children(), 0);
}

#[test]
fn test_initialize_sets_camera_from_viewport() {
    let (controller, _, _) = mounted();
    let camera = controller.camera().expect("camera exists while running");

    assert!((camera.aspect - 1024.0 / 768.0).abs() < 1e-6);
    assert_eq!(camera.fov_degrees, 75.0);
    assert_eq!(camera.near, 0.1);
    assert_eq!(camera.far, 1000.0);
}

#[test]
fn test_initialize_without_host_creates_nothing() {
    let backend = MockBackend::default();
    let mut controller: Controller = AmbientSceneController::new(backend.clone());

    controller.initialize(800, 600, None).expect("absent host is not an error");

    assert_eq!(controller.state(), LifecycleState::Unmounted);
    assert!(controller.scene().is_none());
    assert_eq!(controller.scheduler().pending_count(), 0);
    assert_eq!(backend.log.borrow().surfaces_created, 0);
    assert!(!controller.frame_tick().unwrap());
}

#[test]
fn test_initialize_twice_is_rejected() {
    let (mut controller, backend, host) = mounted();
    let surface = controller.surface_id();

    assert!(controller.initialize(640, 480, Some(host.clone())).is_err());

    assert_eq!(controller.state(), LifecycleState::Running);
    assert_eq!(controller.surface_id(), surface);
    assert_eq!(backend.log.borrow().surfaces_created, 1);
    assert_eq!(host.children(), 1);
    assert_eq!(controller.scheduler().pending_count(), 1);
}

#[test]
fn test_failed_surface_creation_leaves_unmounted() {
    let backend = MockBackend::default();
    backend.log.borrow_mut().fail_create = true;
    let host = MockHost::default();
    let mut controller: Controller = AmbientSceneController::new(backend.clone());

    let err = controller.initialize(800, 600, Some(host.clone())).unwrap_err();
    assert!(format!("{err:#}").contains("no adapter"));

    assert_eq!(controller.state(), LifecycleState::Unmounted);
    assert_eq!(host.children(), 0);
    assert_eq!(host.listeners(), 0);
    assert_eq!(controller.scheduler().pending_count(), 0);
}

#[test]
fn test_failed_upload_disposes_surface() {
    let backend = MockBackend::default();
    backend.log.borrow_mut().fail_upload = true;
    let host = MockHost::default();
    let mut controller: Controller = AmbientSceneController::new(backend.clone());

    assert!(controller.initialize(800, 600, Some(host.clone())).is_err());

    assert_eq!(controller.state(), LifecycleState::Unmounted);
    assert_eq!(backend.log.borrow().disposed, vec![SurfaceId(1)]);
    assert_eq!(host.children(), 0);
    assert_eq!(controller.scheduler().pending_count(), 0);
}

// ============================================================================
// FrameTick
// ============================================================================

#[test]
fn test_frame_tick_renders_and_reschedules() {
    let (mut controller, backend, host) = mounted();

    assert!(controller.frame_tick().unwrap());
    assert!(controller.frame_tick().unwrap());

    assert_eq!(backend.log.borrow().rendered_aspects.len(), 2);
    assert_eq!(controller.scheduler().pending_count(), 1);
    assert_eq!(controller.scheduler().fired(), 2);
    // One request from initialize plus one per tick
    assert_eq!(host.redraw_requests(), 3);
}

#[test]
fn test_frame_ticks_accumulate_fixed_increments() {
    let (mut controller, _, _) = mounted();

    for _ in 0..100 {
        assert!(controller.frame_tick().unwrap());
    }

    let particles = rotation_of(&controller, "particles");
    assert!((particles.x - 100.0 * 0.001).abs() < 1e-4);
    assert!((particles.y - 100.0 * 0.002).abs() < 1e-4);
    assert_eq!(particles.z, 0.0);

    let icosahedron = rotation_of(&controller, "icosahedron");
    assert!((icosahedron.x - 1.0).abs() < 1e-4);
    assert!((icosahedron.y - 1.0).abs() < 1e-4);

    let torus = rotation_of(&controller, "torus");
    assert!((torus.x - 0.8).abs() < 1e-4);
    assert_eq!(torus.y, 0.0);
    assert!((torus.z - 0.5).abs() < 1e-4);

    let octahedron = rotation_of(&controller, "octahedron");
    assert!((octahedron.x - 0.6).abs() < 1e-4);
    assert!((octahedron.y - 0.8).abs() < 1e-4);
}

#[test]
fn test_frame_tick_leaves_positions_untouched() {
    let (mut controller, _, _) = mounted();
    let before: Vec<_> = controller
        .scene()
        .unwrap()
        .objects()
        .iter()
        .map(|o| o.position)
        .collect();

    for _ in 0..10 {
        controller.frame_tick().unwrap();
    }

    let after: Vec<_> = controller
        .scene()
        .unwrap()
        .objects()
        .iter()
        .map(|o| o.position)
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_render_failure_propagates() {
    let (mut controller, backend, _) = mounted();
    backend.log.borrow_mut().fail_render = true;

    let err = controller.frame_tick().unwrap_err();
    assert!(format!("{err:#}").contains("device lost"));
    // Still mounted: teardown is the caller's decision
    assert_eq!(controller.state(), LifecycleState::Running);
}

// ============================================================================
// OnResize
// ============================================================================

#[test]
fn test_resize_then_render_uses_new_aspect() {
    let (mut controller, backend, _) = mounted();

    assert!(controller.on_resize(800, 600));
    controller.frame_tick().unwrap();
    controller.frame_tick().unwrap();

    let log = backend.log.borrow();
    assert_eq!(log.resizes, vec![WindowDimensions::new(800, 600)]);
    for aspect in &log.rendered_aspects {
        assert!((aspect - 800.0 / 600.0).abs() < 1e-5);
    }
}

#[test]
fn test_zero_sized_resize_is_ignored() {
    let (mut controller, backend, _) = mounted();

    assert!(!controller.on_resize(0, 600));
    assert!(!controller.on_resize(800, 0));

    assert!(backend.log.borrow().resizes.is_empty());
    let camera = controller.camera().unwrap();
    assert!((camera.aspect - 1024.0 / 768.0).abs() < 1e-6);
}

#[test]
fn test_resize_while_unmounted_is_ignored() {
    let mut controller: Controller = AmbientSceneController::new(MockBackend::default());
    assert!(!controller.on_resize(800, 600));
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn test_teardown_stops_frames_and_detaches() {
    let (mut controller, backend, host) = mounted();
    let surface = controller.surface_id().unwrap();
    controller.frame_tick().unwrap();

    assert!(controller.teardown());

    assert_eq!(controller.state(), LifecycleState::Unmounted);
    assert_eq!(controller.scheduler().pending_count(), 0);
    assert!(!controller.frame_due());
    assert!(!controller.frame_tick().unwrap());
    assert!(!host.contains_surface(surface));
    assert_eq!(host.listeners(), 0);
    assert_eq!(backend.log.borrow().disposed, vec![surface]);
    assert_eq!(backend.log.borrow().rendered_aspects.len(), 1);
}

#[test]
fn test_teardown_is_idempotent() {
    let (mut controller, backend, host) = mounted();

    assert!(controller.teardown());
    assert!(!controller.teardown());

    assert_eq!(controller.state(), LifecycleState::Unmounted);
    assert_eq!(backend.log.borrow().disposed.len(), 1);
    assert_eq!(host.children(), 0);
    assert_eq!(controller.scheduler().pending_count(), 0);
}

#[test]
fn test_teardown_without_mount_is_noop() {
    let backend = MockBackend::default();
    let mut controller: Controller = AmbientSceneController::new(backend.clone());
    controller.initialize(800, 600, None).unwrap();

    assert!(!controller.teardown());
    assert!(backend.log.borrow().disposed.is_empty());
}

#[test]
fn test_drop_tears_down() {
    let (controller, backend, host) = mounted();
    drop(controller);

    assert_eq!(host.children(), 0);
    assert_eq!(host.listeners(), 0);
    assert_eq!(backend.log.borrow().disposed.len(), 1);
}

#[test]
fn test_remount_after_teardown() {
    let (mut controller, backend, host) = mounted();
    let first = controller.surface_id().unwrap();
    controller.teardown();

    controller.initialize(1280, 720, Some(host.clone())).unwrap();
    let second = controller.surface_id().unwrap();

    assert_ne!(first, second);
    assert_eq!(host.children(), 1);
    assert!(host.contains_surface(second));
    assert_eq!(backend.log.borrow().surfaces_created, 2);
    assert_eq!(controller.scheduler().pending_count(), 1);

    // Rotations restart from a fresh scene
    assert_eq!(rotation_of(&controller, "torus"), glam::Vec3::ZERO);
}

#[test]
fn test_instances_are_independent() {
    let (mut first, _, first_host) = mounted();
    let (mut second, _, second_host) = mounted();

    first.teardown();

    assert_eq!(first_host.children(), 0);
    assert_eq!(second_host.children(), 1);
    assert!(second.frame_tick().unwrap());
    assert_eq!(second.state(), LifecycleState::Running);
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn test_mount_resize_render_unmount() {
    let (mut controller, backend, host) = mounted();
    let surface = controller.surface_id().unwrap();

    controller.on_resize(800, 600);
    assert!(controller.frame_tick().unwrap());
    {
        let log = backend.log.borrow();
        assert_eq!(log.rendered_aspects.len(), 1);
        assert!((log.rendered_aspects[0] - 800.0 / 600.0).abs() < 1e-5);
    }

    controller.teardown();

    assert_eq!(controller.scheduler().pending_count(), 0);
    assert!(!host.contains_surface(surface));
    assert!(!controller.frame_tick().unwrap());
}

#[test]
fn test_particle_fields_differ_between_mounts() {
    let (first, _, _) = mounted();
    let (second, _, _) = mounted();

    let positions = |c: &Controller| -> Vec<glam::Vec3> {
        match &c.scene().unwrap().find("particles").unwrap().kind {
            ObjectKind::ParticleField(field) => field.positions().to_vec(),
            _ => unreachable!(),
        }
    };

    assert_ne!(positions(&first), positions(&second));
}
