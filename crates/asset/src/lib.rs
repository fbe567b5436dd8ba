//! Assets: CPU mesh data, the built-in demo meshes and WGSL sources.

pub mod factory;
pub mod mesh;
pub mod shader;

pub use factory::MeshKind;
pub use mesh::{MeshData, MeshVertex, Topology};
pub use shader::ShaderSource;
