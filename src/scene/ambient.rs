use glam::Vec3;
use rand::Rng;

use super::{Material, ParticleField, Scene, SolidShape, VisualObject};

pub const PARTICLE_COUNT: usize = 1000;
pub const PARTICLE_EXTENT: f32 = 100.0;
pub const PARTICLE_SIZE: f32 = 0.8;
pub const PARTICLE_COLOR: u32 = 0xffffff;
pub const PARTICLE_OPACITY: f32 = 0.6;
pub const PARTICLE_SPIN: Vec3 = Vec3::new(0.001, 0.002, 0.0);

pub const ICOSAHEDRON_SHAPE: SolidShape = SolidShape::Icosahedron { radius: 8.0, detail: 0 };
pub const ICOSAHEDRON_COLOR: u32 = 0x4f46e5;
pub const ICOSAHEDRON_OPACITY: f32 = 0.3;
pub const ICOSAHEDRON_POSITION: Vec3 = Vec3::new(-30.0, 10.0, -20.0);
pub const ICOSAHEDRON_SPIN: Vec3 = Vec3::new(0.01, 0.01, 0.0);

pub const TORUS_SHAPE: SolidShape = SolidShape::Torus {
    radius: 6.0,
    tube: 2.0,
    radial_segments: 8,
    tubular_segments: 16,
};
pub const TORUS_COLOR: u32 = 0x7c3aed;
pub const TORUS_OPACITY: f32 = 0.4;
pub const TORUS_POSITION: Vec3 = Vec3::new(25.0, -15.0, -25.0);
pub const TORUS_SPIN: Vec3 = Vec3::new(0.008, 0.0, 0.005);

pub const OCTAHEDRON_SHAPE: SolidShape = SolidShape::Octahedron { radius: 5.0, detail: 0 };
pub const OCTAHEDRON_COLOR: u32 = 0x06b6d4;
pub const OCTAHEDRON_OPACITY: f32 = 0.3;
pub const OCTAHEDRON_POSITION: Vec3 = Vec3::new(0.0, 20.0, -30.0);
pub const OCTAHEDRON_SPIN: Vec3 = Vec3::new(0.006, 0.008, 0.0);

impl Scene {
    /// Particle field plus the three wireframe solids of the page backdrop
    pub fn ambient<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut scene = Scene::new();

        let field = ParticleField::generate(PARTICLE_COUNT, PARTICLE_EXTENT, rng);
        scene.add(VisualObject::particles(
            field,
            Material::points(PARTICLE_COLOR, PARTICLE_OPACITY, PARTICLE_SIZE),
            PARTICLE_SPIN,
        ));

        scene.add(VisualObject::solid(
            ICOSAHEDRON_SHAPE,
            Material::wireframe(ICOSAHEDRON_COLOR, ICOSAHEDRON_OPACITY),
            ICOSAHEDRON_POSITION,
            ICOSAHEDRON_SPIN,
        ));
        scene.add(VisualObject::solid(
            TORUS_SHAPE,
            Material::wireframe(TORUS_COLOR, TORUS_OPACITY),
            TORUS_POSITION,
            TORUS_SPIN,
        ));
        scene.add(VisualObject::solid(
            OCTAHEDRON_SHAPE,
            Material::wireframe(OCTAHEDRON_COLOR, OCTAHEDRON_OPACITY),
            OCTAHEDRON_POSITION,
            OCTAHEDRON_SPIN,
        ));

        log::debug!(
            "Ambient scene built: {} objects, {} particles",
            scene.len(),
            PARTICLE_COUNT
        );
        scene
    }
}
