use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Interleaved vertex: position, normal, texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.into(),
            normal: normal.into(),
            uv: uv.into(),
        }
    }
}

/// GPU ready triangle list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Appends a quad `a b c d` (counter-clockwise seen from the front).
    ///
    /// Texture coordinates run (1,1) (0,1) (0,0) (1,0) around the corners.
    pub fn push_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        let normal = (b - a).cross(d - a).normalize_or_zero();
        self.push_quad_with_normal([a, b, c, d], normal);
    }

    /// Appends a quad with an explicit normal, keeping the corner order as given.
    pub fn push_quad_with_normal(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let base = self.vertices.len() as u32;
        let uvs = [
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
        ];
        for (corner, uv) in corners.into_iter().zip(uvs) {
            self.vertices.push(Vertex::new(corner, normal, uv));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Back wall of the room, 8 wide and 2 tall on the z = 0 plane.
pub fn back_wall() -> MeshData {
    let mut mesh = MeshData::default();
    mesh.push_quad(
        Vec3::new(-4.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(4.0, 2.0, 0.0),
        Vec3::new(-4.0, 2.0, 0.0),
    );
    mesh
}

/// Floor of the room, 8 wide and 2 deep, facing up.
///
/// Corners start at the wall so the texture lines up with the back wall's.
pub fn floor() -> MeshData {
    let mut mesh = MeshData::default();
    mesh.push_quad_with_normal(
        [
            Vec3::new(-4.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 2.0),
            Vec3::new(-4.0, 0.0, 2.0),
        ],
        Vec3::Y,
    );
    mesh
}

/// Corners of each cube face, counter-clockwise seen from outside.
const CUBE_FACES: [[[f32; 3]; 4]; 6] = [
    // front
    [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
    // back
    [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]],
    // left
    [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
    // right
    [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
    // bottom
    [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
    // top
    [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]],
];

/// Axis aligned cube with unit edges centred on the origin.
pub fn unit_cube() -> MeshData {
    let mut mesh = MeshData::default();
    for [a, b, c, d] in CUBE_FACES {
        let corner = |p: [f32; 3]| Vec3::from(p) * 0.5;
        mesh.push_quad(corner(a), corner(b), corner(c), corner(d));
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_of(mesh: &MeshData) -> Vec3 {
        Vec3::from(mesh.vertices[0].normal)
    }

    #[test]
    fn room_quads_face_the_viewer() {
        assert_eq!(normal_of(&back_wall()), Vec3::Z);
        assert_eq!(normal_of(&floor()), Vec3::Y);
    }

    #[test]
    fn floor_keeps_wall_side_corner_first() {
        let floor = floor();
        assert_eq!(floor.vertices[0].position, [-4.0, 0.0, 0.0]);
        assert_eq!(floor.vertices[0].uv, [1.0, 1.0]);
        assert_eq!(floor.vertices[2].position, [4.0, 0.0, 2.0]);
        assert_eq!(floor.vertices[2].uv, [0.0, 0.0]);
        assert!(floor
            .vertices
            .iter()
            .all(|vertex| vertex.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn quad_uses_two_triangles() {
        let wall = back_wall();
        assert_eq!(wall.vertices.len(), 4);
        assert_eq!(wall.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(wall.vertices[2].uv, [0.0, 0.0]);
    }

    #[test]
    fn cube_normals_point_outwards() {
        let cube = unit_cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
        for vertex in &cube.vertices {
            let position = Vec3::from(vertex.position);
            let normal = Vec3::from(vertex.normal);
            assert!((normal.length() - 1.0).abs() < 1e-6);
            assert!((position.dot(normal) - 0.5).abs() < 1e-6);
        }
    }
}
