//! Scene graph for the ambient backdrop.
//!
//! A [`Scene`] owns every [`VisualObject`] drawn behind the page. Objects are
//! either a particle field or a wireframe solid, each with a fixed per-tick
//! rotation increment applied by the frame loop.

mod ambient;
mod geometry;
mod particles;

pub use ambient::*;
pub use geometry::{SolidShape, WireframeGeometry};
pub use particles::ParticleField;

use std::f32::consts::TAU;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::math::hex_to_linear;

/// Surface appearance of a visual object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Linear RGB
    pub color: [f32; 3],
    pub opacity: f32,
    pub wireframe: bool,
    /// World-space point size, only used by particle fields
    pub point_size: f32,
}

impl Material {
    pub fn wireframe(hex: u32, opacity: f32) -> Self {
        Self {
            color: hex_to_linear(hex),
            opacity,
            wireframe: true,
            point_size: 0.0,
        }
    }

    pub fn points(hex: u32, opacity: f32, point_size: f32) -> Self {
        Self {
            color: hex_to_linear(hex),
            opacity,
            wireframe: false,
            point_size,
        }
    }

    /// Straight-alpha RGBA for the shader
    pub fn rgba(&self) -> [f32; 4] {
        [self.color[0], self.color[1], self.color[2], self.opacity]
    }
}

/// What a visual object draws
#[derive(Debug, Clone)]
pub enum ObjectKind {
    ParticleField(ParticleField),
    WireframeSolid {
        shape: SolidShape,
        geometry: WireframeGeometry,
    },
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ParticleField(_) => "particles",
            Self::WireframeSolid { shape, .. } => shape.name(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisualObject {
    pub kind: ObjectKind,
    pub material: Material,
    pub position: Vec3,
    /// Euler XYZ angles in radians, kept within one turn
    pub rotation: Vec3,
    /// Radians added to `rotation` on every frame tick
    pub spin: Vec3,
}

impl VisualObject {
    pub fn particles(field: ParticleField, material: Material, spin: Vec3) -> Self {
        Self {
            kind: ObjectKind::ParticleField(field),
            material,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            spin,
        }
    }

    pub fn solid(shape: SolidShape, material: Material, position: Vec3, spin: Vec3) -> Self {
        Self {
            kind: ObjectKind::WireframeSolid {
                shape,
                geometry: shape.build(),
            },
            material,
            position,
            rotation: Vec3::ZERO,
            spin,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_particle_field(&self) -> bool {
        matches!(self.kind, ObjectKind::ParticleField(_))
    }

    /// Apply `ticks` rotation increments
    ///
    /// Each angle wraps to `[0, TAU)` so the increment never drops below the
    /// precision of the accumulated value.
    pub fn advance(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.rotation = (self.rotation + self.spin).rem_euclid(Vec3::splat(TAU));
        }
    }

    /// Translation then XYZ rotation, matching the scene's Euler convention
    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_rotation_translation(rotation, self.position)
    }
}

/// Every visual object drawn in one render pass
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<VisualObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: VisualObject) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[VisualObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn particle_fields(&self) -> impl Iterator<Item = &VisualObject> {
        self.objects.iter().filter(|o| o.is_particle_field())
    }

    pub fn solids(&self) -> impl Iterator<Item = &VisualObject> {
        self.objects.iter().filter(|o| !o.is_particle_field())
    }

    pub fn find(&self, name: &str) -> Option<&VisualObject> {
        self.objects.iter().find(|o| o.name() == name)
    }

    /// Advance every object by one frame's worth of rotation
    pub fn tick(&mut self) {
        for object in &mut self.objects {
            object.advance(1);
        }
    }
}
