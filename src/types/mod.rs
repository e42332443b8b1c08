pub mod mesh;

pub use mesh::{PlyMesh, Scalar, VertexTable};
