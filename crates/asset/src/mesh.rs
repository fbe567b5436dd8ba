//! CPU-side mesh representation handed to the renderer.

/// Vertex with position/color. Positions are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

/// How the index buffer is assembled into primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

impl Topology {
    /// Indices per primitive.
    pub fn primitive_size(self) -> usize {
        match self {
            Topology::Triangles => 3,
            Topology::Lines => 2,
        }
    }
}

/// Indexed mesh with tightly-packed vertices.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>, topology: Topology) -> Self {
        Self {
            vertices,
            indices,
            topology,
        }
    }

    /// Builds a single-colored line mesh from flat `xyz` triples.
    pub fn lines(positions: &[[f32; 3]], indices: &[u32], color: [f32; 3]) -> Self {
        let vertices = positions
            .iter()
            .map(|&p| MeshVertex::new(p, color))
            .collect();
        Self::new(vertices, indices.to_vec(), Topology::Lines)
    }

    pub fn primitive_count(&self) -> usize {
        self.indices.len() / self.topology.primitive_size()
    }

    /// Returns `true` if both buffers are non-empty, the indices form whole
    /// primitives and every index points at a vertex.
    pub fn is_valid(&self) -> bool {
        let len = self.vertices.len();
        !self.vertices.is_empty()
            && !self.indices.is_empty()
            && self.indices.len() % self.topology.primitive_size() == 0
            && self.indices.iter().all(|&i| (i as usize) < len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_data_validity() {
        let tri = MeshData::new(vec![MeshVertex::default(); 3], vec![0, 1, 2], Topology::Triangles);
        assert!(tri.is_valid());
        assert_eq!(tri.primitive_count(), 1);
    }

    #[test]
    fn partial_primitive_is_invalid() {
        let data = MeshData::new(vec![MeshVertex::default(); 3], vec![0, 1], Topology::Triangles);
        assert!(!data.is_valid());
    }

    #[test]
    fn out_of_range_index_is_invalid() {
        let data = MeshData::lines(&[[0.0; 3], [1.0; 3]], &[0, 2], [1.0; 3]);
        assert!(!data.is_valid());
    }

    #[test]
    fn empty_mesh_is_invalid() {
        let data = MeshData::new(Vec::new(), Vec::new(), Topology::Lines);
        assert!(!data.is_valid());
    }
}
