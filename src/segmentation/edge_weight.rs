use crate::error::{CutError, Result};
use crate::mesh::geodesic::max_finite;
use crate::mesh::tri_mesh::{FacePos, TriMesh};
use crate::segmentation::params::CutParams;
use std::f64::consts::PI;

// exponent applied to seed distances in the geodesic term
const GEODESIC_EXPONENT: f64 = 1.2;

/// Capacity of the dual-graph arc leaving `pos.face` across edge `pos.edge`.
pub trait EdgeWeight {
    fn weight(&self, mesh: &TriMesh, pos: FacePos) -> f64;

    /// Called once before any arc is built; rejects a weight that cannot
    /// serve every face of `mesh`.
    fn check(&self, _mesh: &TriMesh) -> Result<()> {
        Ok(())
    }
}

impl<F> EdgeWeight for F
where
    F: Fn(&TriMesh, FacePos) -> f64,
{
    fn weight(&self, mesh: &TriMesh, pos: FacePos) -> f64 {
        self(mesh, pos)
    }
}

/// Weighted sum of edge length, geodesic proximity to the seeds, normalized
/// face quality and normalized dihedral angle.
#[derive(Debug, Clone)]
pub struct GeometricWeight<'a> {
    params: CutParams,
    dist_a: &'a [f64],
    dist_b: &'a [f64],
    max_dist_a: f64,
    max_dist_b: f64,
    total_max: f64,
    max_quality: f64,
}

impl<'a> GeometricWeight<'a> {
    /// `dist_a` / `dist_b` are per-face distances to each seed.
    pub fn new(params: CutParams, dist_a: &'a [f64], dist_b: &'a [f64], max_quality: f64) -> Self {
        let max_dist_a = max_finite(dist_a);
        let max_dist_b = max_finite(dist_b);
        let total_max = max_dist_a.powf(GEODESIC_EXPONENT) + max_dist_b.powf(GEODESIC_EXPONENT);
        Self { params, dist_a, dist_b, max_dist_a, max_dist_b, total_max, max_quality }
    }

    /// Cost returned for faces outside the geodesic band.
    pub fn total_max(&self) -> f64 {
        self.total_max
    }

    fn in_band(&self, distance: f64, max_distance: f64) -> bool {
        distance >= self.params.geo_min * max_distance && distance <= self.params.geo_max * max_distance
    }

    /// `total_max` when the face is too close to (or too far from) either
    /// seed, otherwise the normalized sum of both seed distances in `[0, 1]`.
    pub fn geodesic_term(&self, face: usize) -> f64 {
        let (da, db) = (self.dist_a[face], self.dist_b[face]);
        if !self.in_band(da, self.max_dist_a) || !self.in_band(db, self.max_dist_b) {
            return self.total_max;
        }
        if self.total_max <= 0.0 {
            return 0.0;
        }
        (da.powf(GEODESIC_EXPONENT) + db.powf(GEODESIC_EXPONENT)) / self.total_max
    }

    pub fn quality_term(&self, mesh: &TriMesh, face: usize) -> f64 {
        if self.max_quality <= 0.0 {
            return 0.0;
        }
        (mesh.quality(face) / self.max_quality).max(0.0)
    }

    pub fn dihedral_term(&self, mesh: &TriMesh, pos: FacePos) -> f64 {
        (PI + mesh.dihedral_angle(pos)) / (2.0 * PI)
    }
}

impl EdgeWeight for GeometricWeight<'_> {
    fn check(&self, mesh: &TriMesh) -> Result<()> {
        for (name, distances) in [("dist_a", self.dist_a), ("dist_b", self.dist_b)] {
            if distances.len() != mesh.num_faces() {
                return Err(CutError::invalid_argument(name, distances.len(), "needs one distance per face"));
            }
        }
        Ok(())
    }

    fn weight(&self, mesh: &TriMesh, pos: FacePos) -> f64 {
        let params = &self.params;
        let mut weight = 0.0;
        if params.edge_length > 0.0 {
            weight += params.edge_length * mesh.edge_length(pos);
        }
        if params.geodesic > 0.0 {
            weight += params.geodesic * self.geodesic_term(pos.face);
        }
        if params.ambient > 0.0 {
            weight += params.ambient * self.quality_term(mesh, pos.face);
        }
        if params.dihedral > 0.0 {
            weight += params.dihedral * self.dihedral_term(mesh, pos);
        }
        weight
    }
}
