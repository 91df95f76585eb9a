use crate::error::{CutError, Result};
use crate::maximum_flow::boykov_kolmogorov::Segment;
use crate::mesh::geodesic::face_distances_from_face;
use crate::mesh::tri_mesh::TriMesh;
use crate::segmentation::dual_graph::DualGraphBuilder;
use crate::segmentation::edge_weight::GeometricWeight;
use crate::segmentation::params::CutParams;
use nalgebra::Point3;
use tracing::{info, warn};

/// Result of a two-way segmentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub seed_faces: (usize, usize),
    /// Capacity of the minimum cut.
    pub flow: f64,
    pub segments: Vec<Segment>,
}

impl Segmentation {
    pub fn count(&self, segment: Segment) -> usize {
        self.segments.iter().filter(|&&s| s == segment).count()
    }
}

/// Split `mesh` into the part around `seed_a` and the part around `seed_b`
/// and write the labels and colours back onto the faces.
///
/// Faces that cannot be reached from the first seed keep the source label.
pub fn segment(mesh: &mut TriMesh, seed_a: &Point3<f64>, seed_b: &Point3<f64>, params: &CutParams) -> Result<Segmentation> {
    segment_with(&DualGraphBuilder::default(), mesh, seed_a, seed_b, params)
}

pub fn segment_with(builder: &DualGraphBuilder, mesh: &mut TriMesh, seed_a: &Point3<f64>, seed_b: &Point3<f64>, params: &CutParams) -> Result<Segmentation> {
    let face_a = resolve_seed(mesh, seed_a, params, "A")?;
    let face_b = resolve_seed(mesh, seed_b, params, "B")?;
    segment_faces_with(builder, mesh, face_a, face_b, params)
}

/// Same as [`segment`] with the seeds already resolved to faces.
pub fn segment_faces(mesh: &mut TriMesh, face_a: usize, face_b: usize, params: &CutParams) -> Result<Segmentation> {
    segment_faces_with(&DualGraphBuilder::default(), mesh, face_a, face_b, params)
}

fn segment_faces_with(builder: &DualGraphBuilder, mesh: &mut TriMesh, face_a: usize, face_b: usize, params: &CutParams) -> Result<Segmentation> {
    params.validate()?;
    for (name, face) in [("face_a", face_a), ("face_b", face_b)] {
        if face >= mesh.num_faces() {
            return Err(CutError::invalid_argument(name, face, "face index out of range"));
        }
    }

    let dist_a = face_distances_from_face(mesh, face_a);
    let dist_b = face_distances_from_face(mesh, face_b);
    let weight = GeometricWeight::new(*params, &dist_a, &dist_b, mesh.max_quality());

    let mut graph = builder.build(mesh, &weight, face_a, face_b)?;
    let flow = graph.maxflow();

    let segments: Vec<Segment> = (0..mesh.num_faces()).map(|face| graph.segment_of(face).unwrap_or(Segment::Source)).collect();
    for (face, &segment) in segments.iter().enumerate() {
        mesh.set_face_segment(face, segment);
    }

    let segmentation = Segmentation { seed_faces: (face_a, face_b), flow, segments };
    info!(
        seed_a = face_a,
        seed_b = face_b,
        flow,
        source_faces = segmentation.count(Segment::Source),
        sink_faces = segmentation.count(Segment::Sink),
        "mesh segmented"
    );
    Ok(segmentation)
}

fn resolve_seed(mesh: &TriMesh, point: &Point3<f64>, params: &CutParams, seed: &'static str) -> Result<usize> {
    match mesh.nearest_face(point) {
        Some((face, distance)) if params.max_seed_distance.map_or(true, |max| distance <= max) => Ok(face),
        _ => {
            warn!(seed, x = point.x, y = point.y, z = point.z, "seed point does not resolve to a face");
            Err(CutError::UnresolvedSeed { seed })
        }
    }
}
