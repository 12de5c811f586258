pub mod controller;
pub mod frame_scheduler;
pub mod gpu_context;
pub mod surface_renderer;
pub mod window_host;

pub use controller::{AmbientSceneController, LifecycleState};
pub use frame_scheduler::{FrameHandle, FrameScheduler};
pub use gpu_context::GpuContext;
pub use surface_renderer::{ObjectUniform, RenderSettings, WgpuBackend, WgpuSurface};
pub use window_host::WindowHost;

pub use crate::traits::*;
