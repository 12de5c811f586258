pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod frame;
pub mod math;
pub mod navigation;
pub mod scene;
pub mod traits;

pub use crate::core::{AmbientSceneController, LifecycleState, WgpuBackend, WindowHost};
pub use scene::Scene;
