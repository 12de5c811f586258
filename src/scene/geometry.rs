use std::collections::{BTreeSet, HashMap};
use std::f32::consts::TAU;

use glam::Vec3;

/// Shape descriptor for a wireframe solid
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolidShape {
    Icosahedron { radius: f32, detail: u32 },
    Octahedron { radius: f32, detail: u32 },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
}

impl SolidShape {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Icosahedron { .. } => "icosahedron",
            Self::Octahedron { .. } => "octahedron",
            Self::Torus { .. } => "torus",
        }
    }

    pub fn build(&self) -> WireframeGeometry {
        match *self {
            Self::Icosahedron { radius, detail } => {
                let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
                let base = [
                    Vec3::new(-1.0, t, 0.0),
                    Vec3::new(1.0, t, 0.0),
                    Vec3::new(-1.0, -t, 0.0),
                    Vec3::new(1.0, -t, 0.0),
                    Vec3::new(0.0, -1.0, t),
                    Vec3::new(0.0, 1.0, t),
                    Vec3::new(0.0, -1.0, -t),
                    Vec3::new(0.0, 1.0, -t),
                    Vec3::new(t, 0.0, -1.0),
                    Vec3::new(t, 0.0, 1.0),
                    Vec3::new(-t, 0.0, -1.0),
                    Vec3::new(-t, 0.0, 1.0),
                ];
                polyhedron(&base, &ICOSAHEDRON_FACES, radius, detail)
            }
            Self::Octahedron { radius, detail } => {
                let base = [
                    Vec3::X,
                    Vec3::NEG_X,
                    Vec3::Y,
                    Vec3::NEG_Y,
                    Vec3::Z,
                    Vec3::NEG_Z,
                ];
                polyhedron(&base, &OCTAHEDRON_FACES, radius, detail)
            }
            Self::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => torus(radius, tube, radial_segments, tubular_segments),
        }
    }
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

const OCTAHEDRON_FACES: [[usize; 3]; 8] = [
    [0, 2, 4],
    [0, 4, 3],
    [0, 3, 5],
    [0, 5, 2],
    [1, 2, 5],
    [1, 5, 3],
    [1, 3, 4],
    [1, 4, 2],
];

/// Vertex positions plus the unique edges of every triangle
#[derive(Debug, Clone, Default)]
pub struct WireframeGeometry {
    pub vertices: Vec<Vec3>,
    pub edges: Vec<[u32; 2]>,
}

impl WireframeGeometry {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Flattened positions for a vertex buffer
    pub fn positions(&self) -> Vec<[f32; 3]> {
        self.vertices.iter().map(|v| v.to_array()).collect()
    }

    /// Flattened line-list indices for an index buffer
    pub fn line_indices(&self) -> Vec<u32> {
        self.edges.iter().flat_map(|e| e.iter().copied()).collect()
    }
}

/// Collects triangle edges, welding shared vertices and edges
#[derive(Default)]
struct EdgeBuilder {
    vertices: Vec<Vec3>,
    lookup: HashMap<[i64; 3], u32>,
    edges: BTreeSet<(u32, u32)>,
}

impl EdgeBuilder {
    fn vertex(&mut self, position: Vec3) -> u32 {
        let key = (position * 1.0e4).round().to_array().map(|c| c as i64);
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.lookup.insert(key, index);
        index
    }

    fn triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let ia = self.vertex(a);
        let ib = self.vertex(b);
        let ic = self.vertex(c);
        self.edge(ia, ib);
        self.edge(ib, ic);
        self.edge(ic, ia);
    }

    fn edge(&mut self, a: u32, b: u32) {
        if a != b {
            self.edges.insert((a.min(b), a.max(b)));
        }
    }

    fn finish(self) -> WireframeGeometry {
        WireframeGeometry {
            vertices: self.vertices,
            edges: self.edges.into_iter().map(|(a, b)| [a, b]).collect(),
        }
    }
}

/// Subdivide each base face `detail` times and project onto a sphere of `radius`
fn polyhedron(base: &[Vec3], faces: &[[usize; 3]], radius: f32, detail: u32) -> WireframeGeometry {
    let mut builder = EdgeBuilder::default();
    let cols = detail as usize + 1;
    let project = |v: Vec3| v.normalize() * radius;

    for face in faces {
        let (a, b, c) = (base[face[0]], base[face[1]], base[face[2]]);

        // grid[i][j]: i steps from edge ab towards c, j along the row
        let mut grid: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);
        for i in 0..=cols {
            let t = i as f32 / cols as f32;
            let aj = a.lerp(c, t);
            let bj = b.lerp(c, t);
            let rows = cols - i;
            let row = (0..=rows)
                .map(|j| {
                    if rows == 0 {
                        aj
                    } else {
                        aj.lerp(bj, j as f32 / rows as f32)
                    }
                })
                .collect();
            grid.push(row);
        }

        for i in 0..cols {
            for j in 0..(2 * (cols - i) - 1) {
                let k = j / 2;
                if j % 2 == 0 {
                    builder.triangle(
                        project(grid[i][k + 1]),
                        project(grid[i + 1][k]),
                        project(grid[i][k]),
                    );
                } else {
                    builder.triangle(
                        project(grid[i][k + 1]),
                        project(grid[i + 1][k + 1]),
                        project(grid[i + 1][k]),
                    );
                }
            }
        }
    }

    builder.finish()
}

/// Ring of `radial` tube sections around the Z axis, `tubular` steps around the ring
fn torus(radius: f32, tube: f32, radial: u32, tubular: u32) -> WireframeGeometry {
    let radial = radial.max(3);
    let tubular = tubular.max(3);

    let mut vertices = Vec::with_capacity((radial * tubular) as usize);
    for j in 0..radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..tubular {
            let u = i as f32 / tubular as f32 * TAU;
            vertices.push(Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            ));
        }
    }

    let index = |j: u32, i: u32| (j % radial) * tubular + (i % tubular);
    let mut edges = Vec::with_capacity((3 * radial * tubular) as usize);
    for j in 0..radial {
        for i in 0..tubular {
            let a = index(j, i);
            edges.push([a, index(j, i + 1)]);
            edges.push([a, index(j + 1, i)]);
            // Diagonal splitting each quad into two triangles
            edges.push([a, index(j + 1, i + 1)]);
        }
    }

    WireframeGeometry { vertices, edges }
}
