pub mod geodesic;
pub mod tri_mesh;
