//! Benchmarks for dual graph construction and the max-flow solve.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mesh_mincut::maximum_flow::boykov_kolmogorov::FlowNetwork;
use mesh_mincut::mesh::geodesic::face_distances_from_face;
use mesh_mincut::prelude::*;
use nalgebra::Point3;

fn create_grid_mesh(n: usize) -> TriMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            // a gentle bump so the dihedral term is not constant
            let (x, y) = (i as f64 / n as f64 - 0.5, j as f64 / n as f64 - 0.5);
            vertices.push(Point3::new(i as f64, j as f64, (-(x * x + y * y) * 8.0).exp()));
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

fn bench_dual_graph(c: &mut Criterion) {
    let mesh = create_grid_mesh(64);
    let last = mesh.num_faces() - 1;
    let dist_a = face_distances_from_face(&mesh, 0);
    let dist_b = face_distances_from_face(&mesh, last);
    let weight = GeometricWeight::new(CutParams::default(), &dist_a, &dist_b, mesh.max_quality());

    c.bench_function("build_dual_graph_64x64", |b| {
        b.iter(|| DualGraphBuilder::new().build(black_box(&mesh), &weight, 0, last).unwrap());
    });

    c.bench_function("build_and_solve_64x64", |b| {
        b.iter(|| {
            let mut graph = DualGraphBuilder::new().build(black_box(&mesh), &weight, 0, last).unwrap();
            graph.maxflow()
        });
    });
}

fn bench_geodesic(c: &mut Criterion) {
    let mesh = create_grid_mesh(64);

    c.bench_function("face_distances_64x64", |b| {
        b.iter(|| face_distances_from_face(black_box(&mesh), 0));
    });
}

fn bench_segment(c: &mut Criterion) {
    let mut mesh = create_grid_mesh(32);
    let params = CutParams::default();
    let seed_a = Point3::new(0.5, 0.5, 0.0);
    let seed_b = Point3::new(31.5, 31.5, 0.0);

    c.bench_function("segment_grid_32x32", |b| {
        b.iter(|| segment(&mut mesh, black_box(&seed_a), black_box(&seed_b), &params).unwrap());
    });
}

fn bench_grid_network(c: &mut Criterion) {
    c.bench_function("maxflow_grid_network_100x100", |b| {
        b.iter(|| {
            let n = 100;
            let mut network = FlowNetwork::new();
            let nodes: Vec<NodeId> = (0..n * n).map(|_| network.add_node().unwrap()).collect();
            for row in 0..n {
                network.set_tweights(nodes[row * n], 10i64, 0).unwrap();
                network.set_tweights(nodes[row * n + n - 1], 0, 10).unwrap();
                for col in 0..n {
                    let u = nodes[row * n + col];
                    if col + 1 < n {
                        network.add_edge(u, nodes[row * n + col + 1], 1 + ((row + col) % 3) as i64, 1).unwrap();
                    }
                    if row + 1 < n {
                        network.add_edge(u, nodes[(row + 1) * n + col], 1, 1).unwrap();
                    }
                }
            }
            network.maxflow()
        });
    });
}

criterion_group!(benches, bench_dual_graph, bench_geodesic, bench_segment, bench_grid_network);
criterion_main!(benches);
