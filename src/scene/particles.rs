use glam::Vec3;
use rand::Rng;

/// Point cloud scattered uniformly through an axis-aligned cube centred on the origin
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<Vec3>,
    extent: f32,
}

impl ParticleField {
    /// Draw `count` points, each coordinate uniform in `[-extent / 2, extent / 2)`
    pub fn generate<R: Rng + ?Sized>(count: usize, extent: f32, rng: &mut R) -> Self {
        let mut coordinate = || (rng.gen::<f32>() - 0.5) * extent;
        let positions = (0..count)
            .map(|_| Vec3::new(coordinate(), coordinate(), coordinate()))
            .collect();

        Self { positions, extent }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Side length of the bounding cube
    pub fn extent(&self) -> f32 {
        self.extent
    }

    /// Positions laid out for a GPU instance buffer
    pub fn to_instance_data(&self) -> Vec<[f32; 3]> {
        self.positions.iter().map(|p| p.to_array()).collect()
    }
}
