//! The built-in demo meshes: a colored triangle and two wireframes.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};

use crate::mesh::{MeshData, MeshVertex, Topology};

const WIRE_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeshKind {
    Triangle,
    #[default]
    Cube,
    Pyramid,
}

impl MeshKind {
    pub fn build(self) -> MeshData {
        match self {
            MeshKind::Triangle => triangle(),
            MeshKind::Cube => cube(),
            MeshKind::Pyramid => pyramid(),
        }
    }
}

impl FromStr for MeshKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "triangle" | "tri" => Ok(MeshKind::Triangle),
            "cube" => Ok(MeshKind::Cube),
            "pyramid" => Ok(MeshKind::Pyramid),
            other => Err(anyhow!(
                "Unknown mesh '{}' (expected triangle, cube or pyramid)",
                other
            )),
        }
    }
}

impl fmt::Display for MeshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeshKind::Triangle => "triangle",
            MeshKind::Cube => "cube",
            MeshKind::Pyramid => "pyramid",
        };
        f.write_str(name)
    }
}

/// Flat triangle in the z=0 plane, one primary color per corner.
pub fn triangle() -> MeshData {
    let vertices = vec![
        MeshVertex::new([-0.3, -0.3, 0.0], [1.0, 0.0, 0.0]),
        MeshVertex::new([0.3, -0.3, 0.0], [0.0, 1.0, 0.0]),
        MeshVertex::new([0.0, 0.3, 0.0], [0.0, 0.0, 1.0]),
    ];
    MeshData::new(vertices, vec![0, 1, 2], Topology::Triangles)
}

/// Unit cube edges as a line list.
pub fn cube() -> MeshData {
    let positions = [
        [-0.5, 0.5, 0.5],   // 0 front top left
        [0.5, 0.5, 0.5],    // 1 front top right
        [0.5, -0.5, 0.5],   // 2 front bottom right
        [-0.5, -0.5, 0.5],  // 3 front bottom left
        [-0.5, 0.5, -0.5],  // 4 back top left
        [0.5, 0.5, -0.5],   // 5 back top right
        [0.5, -0.5, -0.5],  // 6 back bottom right
        [-0.5, -0.5, -0.5], // 7 back bottom left
    ];
    #[rustfmt::skip]
    let indices = [
        0, 1, 1, 2, 2, 3, 3, 0, // front
        4, 5, 5, 6, 6, 7, 7, 4, // back
        0, 4, 1, 5, 2, 6, 3, 7, // sides
    ];
    MeshData::lines(&positions, &indices, WIRE_COLOR)
}

/// Double pyramid around a diamond ring, with a second ring hanging below the
/// lower apex.
pub fn pyramid() -> MeshData {
    let positions = [
        [0.0, 0.0, -0.1],
        [0.3, 0.0, 0.0],
        [0.0, 0.0, 0.1],
        [-0.3, 0.0, 0.0],
        [0.0, 0.5, 0.0], // 4 top apex
        [0.0, -0.5, 0.0], // 5 bottom apex
        [0.0, -0.8, -0.1],
        [0.3, -0.8, 0.0],
        [0.0, -0.8, 0.1],
        [-0.3, -0.8, 0.0],
    ];
    #[rustfmt::skip]
    let indices = [
        0, 1, 1, 2, 2, 3, 3, 0, // upper ring
        0, 4, 1, 4, 2, 4, 3, 4,
        0, 5, 1, 5, 2, 5, 3, 5,
        6, 7, 7, 8, 8, 9, 9, 6, // lower ring
        6, 5, 7, 5, 8, 5, 9, 5,
    ];
    MeshData::lines(&positions, &indices, WIRE_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_meshes_are_valid() {
        for kind in [MeshKind::Triangle, MeshKind::Cube, MeshKind::Pyramid] {
            let mesh = kind.build();
            assert!(mesh.is_valid(), "{kind} is invalid");
        }
    }

    #[test]
    fn mesh_shapes() {
        let tri = triangle();
        assert_eq!(tri.topology, Topology::Triangles);
        assert_eq!(tri.primitive_count(), 1);

        let cube = cube();
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.primitive_count(), 12);

        let pyramid = pyramid();
        assert_eq!(pyramid.vertices.len(), 10);
        assert_eq!(pyramid.primitive_count(), 20);
    }

    #[test]
    fn cube_edges_have_unit_length() {
        let cube = cube();
        for edge in cube.indices.chunks(2) {
            let a = cube.vertices[edge[0] as usize].position;
            let b = cube.vertices[edge[1] as usize].position;
            let len: f32 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f32>().sqrt();
            assert!((len - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn parse_mesh_kind() {
        assert_eq!("cube".parse::<MeshKind>().unwrap(), MeshKind::Cube);
        assert_eq!("Pyramid".parse::<MeshKind>().unwrap(), MeshKind::Pyramid);
        assert_eq!("tri".parse::<MeshKind>().unwrap(), MeshKind::Triangle);
        assert!("sphere".parse::<MeshKind>().is_err());
        assert_eq!(MeshKind::Pyramid.to_string(), "pyramid");
    }
}
