//! Geodesic-like distance fields.
//!
//! Distances are shortest paths along mesh edges (Dijkstra), which
//! approximate surface geodesics on reasonably uniform meshes.

use crate::mesh::tri_mesh::TriMesh;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
struct State {
    vertex: usize,
    distance: f64,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed for a min-heap
        other.distance.total_cmp(&self.distance).then_with(|| other.vertex.cmp(&self.vertex))
    }
}

fn vertex_adjacency(mesh: &TriMesh) -> Vec<Vec<(usize, f64)>> {
    let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); mesh.num_vertices()];
    for corners in mesh.faces() {
        for k in 0..3 {
            let (u, v) = (corners[k], corners[(k + 1) % 3]);
            if neighbors[u].iter().any(|&(w, _)| w == v) {
                continue;
            }
            let length = (mesh.vertex(v) - mesh.vertex(u)).norm();
            neighbors[u].push((v, length));
            neighbors[v].push((u, length));
        }
    }
    neighbors
}

/// Distance from the nearest of `sources` to every vertex.
///
/// Unreachable vertices get `f64::INFINITY`; out-of-range sources are ignored.
pub fn vertex_distances(mesh: &TriMesh, sources: &[usize]) -> Vec<f64> {
    let adjacency = vertex_adjacency(mesh);
    let mut distances = vec![f64::INFINITY; mesh.num_vertices()];
    let mut heap = BinaryHeap::new();

    let num_vertices = distances.len();
    for &source in sources.iter().filter(|&&v| v < num_vertices) {
        distances[source] = 0.0;
        heap.push(State { vertex: source, distance: 0.0 });
    }

    while let Some(State { vertex, distance }) = heap.pop() {
        if distance > distances[vertex] {
            continue;
        }
        for &(next, length) in &adjacency[vertex] {
            let candidate = distance + length;
            if candidate < distances[next] {
                distances[next] = candidate;
                heap.push(State { vertex: next, distance: candidate });
            }
        }
    }

    distances
}

/// Per-face distance: mean of the three corner distances.
pub fn face_distances(mesh: &TriMesh, vertex_distances: &[f64]) -> Vec<f64> {
    mesh.faces().iter().map(|corners| corners.iter().map(|&v| vertex_distances[v]).sum::<f64>() / 3.0).collect()
}

/// Per-face distance field from the corners of `seed_face`.
pub fn face_distances_from_face(mesh: &TriMesh, seed_face: usize) -> Vec<f64> {
    let distances = vertex_distances(mesh, &mesh.face(seed_face));
    face_distances(mesh, &distances)
}

/// Largest finite value of a distance field, 0 if there is none.
pub fn max_finite(distances: &[f64]) -> f64 {
    distances.iter().copied().filter(|d| d.is_finite()).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::tri_mesh::tests::{grid, octahedron};
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn distances_along_grid_edges() {
        let mesh = grid(2);
        let distances = vertex_distances(&mesh, &[0]);
        assert_relative_eq!(distances[0], 0.0);
        assert_relative_eq!(distances[2], 2.0);
        // the diagonals of the grid are mesh edges
        assert_relative_eq!(distances[8], 2.0 * 2.0f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(distances[6], 2.0);
    }

    #[test]
    fn multi_source() {
        let mesh = grid(2);
        let distances = vertex_distances(&mesh, &[0, 2]);
        assert_relative_eq!(distances[1], 1.0);
        assert_relative_eq!(distances[2], 0.0);
    }

    #[test]
    fn octahedron_face_field() {
        let mesh = octahedron();
        let distances = face_distances_from_face(&mesh, 0);
        assert_relative_eq!(distances[0], 0.0);
        // the antipodal face is the farthest one
        let farthest = (0..mesh.num_faces()).max_by(|&a, &b| distances[a].total_cmp(&distances[b])).unwrap();
        assert_eq!(farthest, 7);
        assert_relative_eq!(max_finite(&distances), distances[7]);
    }

    #[test]
    fn unreachable_vertices_are_infinite() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(6.0, 0.0, 0.0),
            Point3::new(5.0, 1.0, 0.0),
        ];
        let mesh = TriMesh::from_triangles(vertices, vec![[0, 1, 2], [3, 4, 5]]).unwrap();
        let distances = face_distances_from_face(&mesh, 0);
        assert_relative_eq!(distances[0], 0.0);
        assert!(distances[1].is_infinite());
        assert_eq!(max_finite(&distances), 0.0);
    }
}
