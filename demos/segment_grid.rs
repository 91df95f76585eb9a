//! Segments a ridged grid between two corner seeds and prints the labels.

use mesh_mincut::prelude::*;
use nalgebra::Point3;

fn main() -> Result<()> {
    let n = 12;
    let mut vertices = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            // a ridge along the anti-diagonal
            let ridge = if i + j == n { 0.8 } else { 0.0 };
            vertices.push(Point3::new(i as f64, j as f64, ridge));
        }
    }
    let mut faces = Vec::new();
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let (v10, v01, v11) = (v00 + 1, v00 + n + 1, v00 + n + 2);
            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }
    let mut mesh = TriMesh::from_triangles(vertices, faces)?;

    let params = CutParams::default().with_band(0.1, 0.9);
    let result = segment(&mut mesh, &Point3::new(0.5, 0.2, 0.0), &Point3::new(n as f64 - 0.5, n as f64 - 0.2, 0.0), &params)?;

    println!("seed faces: {:?}", result.seed_faces);
    println!("cut capacity: {:.4}", result.flow);
    println!("source faces: {}, sink faces: {}", result.count(Segment::Source), result.count(Segment::Sink));
    for j in (0..n).rev() {
        let row: String = (0..n)
            .map(|i| {
                let cell = &result.segments[2 * (j * n + i)..2 * (j * n + i) + 2];
                match (cell[0], cell[1]) {
                    (Segment::Source, Segment::Source) => 'A',
                    (Segment::Sink, Segment::Sink) => 'B',
                    _ => '/',
                }
            })
            .collect();
        println!("{row}");
    }
    Ok(())
}
