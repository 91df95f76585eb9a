//! Two-way mesh segmentation by minimum cut.
//!
//! A triangle mesh is turned into its dual graph (one node per face, arcs
//! across shared edges), the two seed faces are tied to the source and the
//! sink, and a Boykov–Kolmogorov max-flow solver finds the cheapest set of
//! edges separating them. Arc capacities combine edge length, dihedral angle,
//! per-face quality and a geodesic term that keeps the cut away from the seeds.
//!
//! ```
//! use mesh_mincut::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(-1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, -1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(0.0, 0.0, -1.0),
//! ];
//! let faces = vec![[0, 2, 4], [2, 1, 4], [0, 4, 3], [0, 5, 2], [1, 3, 4], [1, 2, 5], [0, 3, 5], [1, 5, 3]];
//! let mut mesh = TriMesh::from_triangles(vertices, faces).unwrap();
//!
//! let params = CutParams::default().with_geodesic(0.0);
//! let result = segment(&mut mesh, &Point3::new(1.0, 1.0, 1.0), &Point3::new(-1.0, -1.0, -1.0), &params).unwrap();
//! assert_eq!(result.segments[0], Segment::Source);
//! assert_eq!(result.segments[7], Segment::Sink);
//! ```
//!
//! The solver is usable on its own:
//!
//! ```
//! use mesh_mincut::maximum_flow::boykov_kolmogorov::{FlowNetwork, Segment};
//!
//! let mut network = FlowNetwork::new();
//! let u = network.add_node().unwrap();
//! let v = network.add_node().unwrap();
//! network.set_tweights(u, 5, 0).unwrap();
//! network.set_tweights(v, 0, 4).unwrap();
//! network.add_edge(u, v, 3, 0).unwrap();
//!
//! assert_eq!(network.maxflow(), 3);
//! assert_eq!(network.what_segment(v), Segment::Sink);
//! ```

pub mod error;
pub mod maximum_flow;
pub mod mesh;
pub mod segmentation;

pub use error::{AllocError, CutError, Result};

pub mod prelude {
    pub use crate::error::{CutError, Result};
    pub use crate::maximum_flow::boykov_kolmogorov::{FlowNetwork, NodeId, Segment};
    pub use crate::mesh::tri_mesh::{FacePos, TriMesh};
    pub use crate::segmentation::driver::{segment, segment_faces, Segmentation};
    pub use crate::segmentation::dual_graph::{DualGraph, DualGraphBuilder};
    pub use crate::segmentation::edge_weight::{EdgeWeight, GeometricWeight};
    pub use crate::segmentation::params::CutParams;
}
