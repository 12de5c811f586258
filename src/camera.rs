use glam::{Mat4, Vec3};

use crate::traits::WindowDimensions;

pub const FIELD_OF_VIEW_DEGREES: f32 = 75.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;
pub const CAMERA_DISTANCE: f32 = 30.0;

/// Camera uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

/// Fixed-position perspective camera looking down -Z
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_degrees: FIELD_OF_VIEW_DEGREES,
            aspect,
            near: NEAR_PLANE,
            far: FAR_PLANE,
            position: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
        }
    }

    pub fn for_viewport(dimensions: WindowDimensions) -> Self {
        Self::new(dimensions.aspect())
    }

    /// Recompute the projection for a new viewport size
    pub fn set_viewport(&mut self, dimensions: WindowDimensions) {
        self.aspect = dimensions.aspect();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    /// Right-handed projection with a 0..1 depth range
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Aspect ratio as encoded in the projection matrix
    pub fn projected_aspect(&self) -> f32 {
        let projection = self.projection_matrix();
        projection.y_axis.y / projection.x_axis.x
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view: self.view_matrix().to_cols_array_2d(),
            projection: self.projection_matrix().to_cols_array_2d(),
        }
    }
}
