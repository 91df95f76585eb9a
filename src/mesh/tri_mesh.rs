//! Indexed triangle mesh with face-face adjacency.
//!
//! Every face stores, for each of its three edges, the face on the other side
//! of that edge. An edge with no partner (or with more than one) points back
//! at the face itself and is treated as a border.

use crate::error::{CutError, Result};
use crate::maximum_flow::boykov_kolmogorov::Segment;
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

/// Colour written to faces on the source side of the cut.
pub const SOURCE_COLOR: [u8; 4] = [255, 0, 0, 255];
/// Colour written to faces on the sink side of the cut.
pub const SINK_COLOR: [u8; 4] = [0, 0, 255, 255];
/// Colour of faces that were never segmented.
pub const UNSEGMENTED_COLOR: [u8; 4] = [255, 255, 255, 255];

impl Segment {
    /// RGBA colour conventionally used to render this side of the cut.
    pub fn color(self) -> [u8; 4] {
        match self {
            Segment::Source => SOURCE_COLOR,
            Segment::Sink => SINK_COLOR,
        }
    }
}

/// A directed face adjacency: face `face` seen across its edge `edge`
/// (from corner `edge` to corner `(edge + 1) % 3`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FacePos {
    pub face: usize,
    pub edge: usize,
}

impl FacePos {
    pub fn new(face: usize, edge: usize) -> Self {
        Self { face, edge }
    }
}

#[derive(Debug, Clone)]
pub struct TriMesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
    // neighbour face across each edge and the index of the shared edge inside it
    ff: Vec<[usize; 3]>,
    ffi: Vec<[usize; 3]>,
    quality: Vec<f64>,
    segments: Vec<Option<Segment>>,
    colors: Vec<[u8; 4]>,
}

impl TriMesh {
    /// Build a mesh and its face-face adjacency.
    ///
    /// Fails with [`CutError::InvalidArgument`] when a vertex is not finite or
    /// a face references a missing vertex or repeats one.
    pub fn from_triangles(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Result<Self> {
        if let Some(v) = vertices.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(CutError::invalid_argument("vertex", v, "coordinates must be finite"));
        }
        for (face, corners) in faces.iter().enumerate() {
            if corners.iter().any(|&v| v >= vertices.len()) {
                return Err(CutError::invalid_argument("face", face, "references a missing vertex"));
            }
            if corners[0] == corners[1] || corners[1] == corners[2] || corners[2] == corners[0] {
                return Err(CutError::invalid_argument("face", face, "repeats a vertex"));
            }
        }

        let (ff, ffi) = face_face_adjacency(&faces);
        let num_faces = faces.len();
        Ok(Self { vertices, faces, ff, ffi, quality: vec![0.0; num_faces], segments: vec![None; num_faces], colors: vec![UNSEGMENTED_COLOR; num_faces] })
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn vertex(&self, v: usize) -> Point3<f64> {
        self.vertices[v]
    }

    #[inline]
    pub fn face(&self, f: usize) -> [usize; 3] {
        self.faces[f]
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    /// Face on the other side of `pos`; the face itself on a border.
    #[inline]
    pub fn face_neighbor(&self, pos: FacePos) -> usize {
        self.ff[pos.face][pos.edge]
    }

    /// The same edge seen from the neighbouring face.
    #[inline]
    pub fn opposite(&self, pos: FacePos) -> FacePos {
        FacePos { face: self.ff[pos.face][pos.edge], edge: self.ffi[pos.face][pos.edge] }
    }

    #[inline]
    pub fn is_border(&self, pos: FacePos) -> bool {
        self.face_neighbor(pos) == pos.face
    }

    pub fn edge_length(&self, pos: FacePos) -> f64 {
        let [p0, p1] = self.edge_points(pos);
        (p1 - p0).norm()
    }

    fn edge_points(&self, pos: FacePos) -> [Point3<f64>; 2] {
        let corners = self.faces[pos.face];
        [self.vertices[corners[pos.edge]], self.vertices[corners[(pos.edge + 1) % 3]]]
    }

    /// Unnormalized normal, twice the face area in length.
    pub fn face_normal_unnormalized(&self, f: usize) -> Vector3<f64> {
        let [a, b, c] = self.faces[f].map(|v| self.vertices[v]);
        (b - a).cross(&(c - a))
    }

    pub fn face_normal(&self, f: usize) -> Option<Vector3<f64>> {
        self.face_normal_unnormalized(f).try_normalize(f64::EPSILON)
    }

    pub fn face_centroid(&self, f: usize) -> Point3<f64> {
        let [a, b, c] = self.faces[f].map(|v| self.vertices[v]);
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }

    /// Signed bending angle across the edge of `pos`, in `[-PI, PI]`.
    ///
    /// Zero for coplanar faces, borders and degenerate faces; positive when
    /// the edge is convex, negative when it is concave.
    pub fn dihedral_angle(&self, pos: FacePos) -> f64 {
        if self.is_border(pos) {
            return 0.0;
        }
        let other = self.opposite(pos);
        let (Some(n0), Some(n1)) = (self.face_normal(pos.face), self.face_normal(other.face)) else {
            return 0.0;
        };

        let angle = n0.dot(&n1).clamp(-1.0, 1.0).acos();
        let [e0, _] = self.edge_points(pos);
        let apex = self.vertices[self.faces[other.face][(other.edge + 2) % 3]];
        if n0.dot(&(apex - e0)) > 0.0 {
            -angle
        } else {
            angle
        }
    }

    #[inline]
    pub fn quality(&self, f: usize) -> f64 {
        self.quality[f]
    }

    pub fn set_quality(&mut self, f: usize, quality: f64) {
        self.quality[f] = quality;
    }

    pub fn set_qualities(&mut self, quality: Vec<f64>) -> Result<()> {
        if quality.len() != self.faces.len() {
            return Err(CutError::invalid_argument("quality", quality.len(), "one value per face is required"));
        }
        self.quality = quality;
        Ok(())
    }

    /// Largest per-face quality, 0 for an empty mesh.
    pub fn max_quality(&self) -> f64 {
        self.quality.iter().copied().fold(0.0, f64::max)
    }

    /// The face closest to `point` together with the distance to it.
    pub fn nearest_face(&self, point: &Point3<f64>) -> Option<(usize, f64)> {
        if !point.coords.iter().all(|c| c.is_finite()) {
            return None;
        }
        let mut best: Option<(usize, f64)> = None;
        for (f, corners) in self.faces.iter().enumerate() {
            let [a, b, c] = corners.map(|v| self.vertices[v]);
            let distance_squared = (closest_point_on_triangle(point, &a, &b, &c) - point).norm_squared();
            match best {
                Some((_, d)) if d <= distance_squared => {}
                _ => best = Some((f, distance_squared)),
            }
        }
        best.map(|(f, d)| (f, d.sqrt()))
    }

    #[inline]
    pub fn face_segment(&self, f: usize) -> Option<Segment> {
        self.segments[f]
    }

    pub fn face_segments(&self) -> &[Option<Segment>] {
        &self.segments
    }

    pub fn face_colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    pub fn set_face_segment(&mut self, f: usize, segment: Segment) {
        self.segments[f] = Some(segment);
        self.colors[f] = segment.color();
    }

    pub fn clear_segments(&mut self) {
        self.segments.fill(None);
        self.colors.fill(UNSEGMENTED_COLOR);
    }
}

fn face_face_adjacency(faces: &[[usize; 3]]) -> (Vec<[usize; 3]>, Vec<[usize; 3]>) {
    let mut edge_to_faces: HashMap<(usize, usize), Vec<FacePos>> = HashMap::new();
    for (face, corners) in faces.iter().enumerate() {
        for edge in 0..3 {
            let (v0, v1) = (corners[edge], corners[(edge + 1) % 3]);
            let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
            edge_to_faces.entry(key).or_default().push(FacePos { face, edge });
        }
    }

    let mut ff: Vec<[usize; 3]> = (0..faces.len()).map(|f| [f; 3]).collect();
    let mut ffi: Vec<[usize; 3]> = vec![[0, 1, 2]; faces.len()];
    for incident in edge_to_faces.values() {
        // non-manifold edges stay borders
        if let [p, q] = incident[..] {
            if p.face == q.face {
                continue;
            }
            ff[p.face][p.edge] = q.face;
            ffi[p.face][p.edge] = q.edge;
            ff[q.face][q.edge] = p.face;
            ffi[q.face][q.edge] = p.edge;
        }
    }
    (ff, ffi)
}

// closest point on triangle abc to p (Ericson, Real-Time Collision Detection 5.1.5)
fn closest_point_on_triangle(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Point3<f64> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    let denom = va + vb + vc;
    if denom.abs() < f64::EPSILON {
        // degenerate triangle
        return *a;
    }
    a + ab * (vb / denom) + ac * (vc / denom)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    // regular octahedron with outward normals, faces ordered so that face f and face 7 - f are antipodal
    pub(crate) fn octahedron() -> TriMesh {
        let vertices = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let faces = vec![[0, 2, 4], [2, 1, 4], [0, 4, 3], [0, 5, 2], [1, 3, 4], [1, 2, 5], [0, 3, 5], [1, 5, 3]];
        TriMesh::from_triangles(vertices, faces).unwrap()
    }

    // n x n grid of unit squares in the z = 0 plane, two triangles per square
    pub(crate) fn grid(n: usize) -> TriMesh {
        let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
        let mut faces = Vec::with_capacity(n * n * 2);
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + (n + 1);
                let v11 = v01 + 1;
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }
        TriMesh::from_triangles(vertices, faces).unwrap()
    }

    #[test]
    fn octahedron_is_closed() {
        let mesh = octahedron();
        for f in 0..mesh.num_faces() {
            for e in 0..3 {
                let pos = FacePos::new(f, e);
                assert!(!mesh.is_border(pos));
                let back = mesh.opposite(mesh.opposite(pos));
                assert_eq!(back, pos);
            }
            // antipodal faces never touch
            assert!((0..3).all(|e| mesh.face_neighbor(FacePos::new(f, e)) != 7 - f));
        }
    }

    #[test]
    fn octahedron_geometry() {
        let mesh = octahedron();
        let bend = (1.0f64 / 3.0).acos();
        for f in 0..mesh.num_faces() {
            let normal = mesh.face_normal(f).unwrap();
            assert!(normal.dot(&mesh.face_centroid(f).coords) > 0.0);
            for e in 0..3 {
                let pos = FacePos::new(f, e);
                assert_relative_eq!(mesh.edge_length(pos), 2.0f64.sqrt(), epsilon = 1e-12);
                assert_relative_eq!(mesh.dihedral_angle(pos), bend, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn grid_borders_and_flat_edges() {
        let mesh = grid(2);
        assert_eq!(mesh.num_faces(), 8);
        let borders = (0..mesh.num_faces()).flat_map(|f| (0..3).map(move |e| FacePos::new(f, e))).filter(|&pos| mesh.is_border(pos)).count();
        assert_eq!(borders, 8);
        for f in 0..mesh.num_faces() {
            for e in 0..3 {
                assert_relative_eq!(mesh.dihedral_angle(FacePos::new(f, e)), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn folded_edge_sign() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.5, 1.0, 0.0), Point3::new(0.5, -1.0, 1.0), Point3::new(0.5, -1.0, -1.0)];
        // face 0 faces +z; face 1 rises above it (concave), face 2 drops below it (convex)
        let up = TriMesh::from_triangles(vertices.clone(), vec![[0, 1, 2], [1, 0, 3]]).unwrap();
        let down = TriMesh::from_triangles(vertices, vec![[0, 1, 2], [1, 0, 4]]).unwrap();
        assert!(up.dihedral_angle(FacePos::new(0, 0)) < 0.0);
        assert!(down.dihedral_angle(FacePos::new(0, 0)) > 0.0);
        assert_relative_eq!(up.dihedral_angle(FacePos::new(0, 0)), -down.dihedral_angle(FacePos::new(0, 0)), epsilon = 1e-12);
    }

    #[test]
    fn non_manifold_edge_is_a_border() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, -1.0, 0.0), Point3::new(0.0, 0.0, 1.0)];
        let mesh = TriMesh::from_triangles(vertices, vec![[0, 1, 2], [1, 0, 3], [0, 1, 4]]).unwrap();
        for f in 0..3 {
            assert!((0..3).all(|e| mesh.is_border(FacePos::new(f, e))));
        }
    }

    #[rstest]
    #[case(vec![[0, 1, 5]])]
    #[case(vec![[0, 1, 1]])]
    fn malformed_faces_are_rejected(#[case] faces: Vec<[usize; 3]>) {
        let vertices = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        assert!(matches!(TriMesh::from_triangles(vertices, faces), Err(CutError::InvalidArgument { .. })));
    }

    #[rstest]
    #[case(Point3::new(f64::INFINITY, 0.0, 0.0))]
    #[case(Point3::new(0.0, f64::NAN, 0.0))]
    fn non_finite_vertices_are_rejected(#[case] bad: Point3<f64>) {
        let vertices = vec![Point3::origin(), bad, Point3::new(0.0, 1.0, 0.0)];
        let result = TriMesh::from_triangles(vertices, vec![[0, 1, 2]]);
        assert!(matches!(result, Err(CutError::InvalidArgument { name: "vertex", .. })));
    }

    #[rstest]
    #[case(Point3::new(0.2, 0.3, 5.0), 1, 5.0)]
    #[case(Point3::new(0.9, 0.1, -1.0), 0, 1.0)]
    #[case(Point3::new(-3.0, 0.5, 0.0), 1, 3.0)]
    fn nearest_face_on_grid(#[case] point: Point3<f64>, #[case] face: usize, #[case] distance: f64) {
        let mesh = grid(1);
        let (found, d) = mesh.nearest_face(&point).unwrap();
        assert_eq!(found, face);
        assert_relative_eq!(d, distance, epsilon = 1e-12);
    }

    #[test]
    fn nearest_face_rejects_nan_and_empty_meshes() {
        let mesh = grid(1);
        assert!(mesh.nearest_face(&Point3::new(f64::NAN, 0.0, 0.0)).is_none());
        let empty = TriMesh::from_triangles(Vec::new(), Vec::new()).unwrap();
        assert!(empty.nearest_face(&Point3::origin()).is_none());
    }

    #[test]
    fn segments_and_colors() {
        let mut mesh = grid(1);
        mesh.set_face_segment(0, Segment::Sink);
        assert_eq!(mesh.face_segments(), &[Some(Segment::Sink), None]);
        assert_eq!(mesh.face_colors(), &[SINK_COLOR, UNSEGMENTED_COLOR]);
        mesh.clear_segments();
        assert_eq!(mesh.face_segment(0), None);
    }

    #[test]
    fn qualities() {
        let mut mesh = grid(1);
        assert!(mesh.set_qualities(vec![1.0]).is_err());
        mesh.set_qualities(vec![0.5, 2.0]).unwrap();
        assert_eq!(mesh.max_quality(), 2.0);
        mesh.set_quality(0, 3.0);
        assert_eq!(mesh.quality(0), 3.0);
    }
}
