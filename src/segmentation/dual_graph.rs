use crate::error::{CutError, Result};
use crate::maximum_flow::boykov_kolmogorov::{FlowNetwork, NodeId, Segment};
use crate::mesh::tri_mesh::{FacePos, TriMesh};
use crate::segmentation::edge_weight::EdgeWeight;
use tracing::debug;

/// Flow network over the faces reachable from the first seed, with the
/// face to node table used to read the cut back.
pub struct DualGraph {
    pub network: FlowNetwork<f64>,
    face_to_node: Vec<Option<NodeId>>,
    seed_a: usize,
    seed_b: usize,
}

impl DualGraph {
    #[inline]
    pub fn node_of(&self, face: usize) -> Option<NodeId> {
        self.face_to_node.get(face).copied().flatten()
    }

    pub fn seeds(&self) -> (usize, usize) {
        (self.seed_a, self.seed_b)
    }

    pub fn num_visited_faces(&self) -> usize {
        self.face_to_node.iter().filter(|node| node.is_some()).count()
    }

    pub fn maxflow(&mut self) -> f64 {
        self.network.maxflow()
    }

    /// Side of the cut of `face`; `None` for faces that never got a node.
    pub fn segment_of(&self, face: usize) -> Option<Segment> {
        self.node_of(face).map(|node| self.network.what_segment(node))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DualGraphBuilder {
    max_nodes: usize,
    max_arcs: usize,
}

impl Default for DualGraphBuilder {
    fn default() -> Self {
        Self { max_nodes: usize::MAX, max_arcs: usize::MAX }
    }
}

impl DualGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_nodes: usize, max_arcs: usize) -> Self {
        Self { max_nodes, max_arcs }
    }

    /// Build the dual graph by depth-first traversal from `seed_a`.
    ///
    /// `seed_a` is tied to the source and `seed_b` to the sink with infinite
    /// capacity. Every visited face adds one arc pair per non-border edge with
    /// the weight on the forward arc and nothing on the reverse one, so each
    /// interior mesh edge ends up with two independent pairs, one per side.
    pub fn build<W: EdgeWeight + ?Sized>(&self, mesh: &TriMesh, weight: &W, seed_a: usize, seed_b: usize) -> Result<DualGraph> {
        let num_faces = mesh.num_faces();
        if seed_a >= num_faces {
            return Err(CutError::invalid_argument("seed_a", seed_a, "face index out of range"));
        }
        if seed_b >= num_faces {
            return Err(CutError::invalid_argument("seed_b", seed_b, "face index out of range"));
        }
        if seed_a == seed_b {
            return Err(CutError::invalid_argument("seed_b", seed_b, "seeds must be distinct faces"));
        }
        weight.check(mesh)?;

        let mut network = FlowNetwork::with_limits(self.max_nodes, self.max_arcs);
        let mut face_to_node: Vec<Option<NodeId>> = vec![None; num_faces];
        let mut visited = vec![false; num_faces];

        let source = network.add_node()?;
        network.set_tweights(source, f64::INFINITY, 0.0)?;
        face_to_node[seed_a] = Some(source);
        let sink = network.add_node()?;
        network.set_tweights(sink, 0.0, f64::INFINITY)?;
        face_to_node[seed_b] = Some(sink);

        let mut stack = vec![seed_a];
        visited[seed_a] = true;
        while let Some(face) = stack.pop() {
            let Some(from) = face_to_node[face] else {
                continue;
            };
            for edge in 0..3 {
                let pos = FacePos::new(face, edge);
                let neighbor = mesh.face_neighbor(pos);
                if neighbor == face {
                    continue;
                }

                let to = match face_to_node[neighbor] {
                    Some(node) => node,
                    None => {
                        let node = network.add_node()?;
                        face_to_node[neighbor] = Some(node);
                        node
                    }
                };

                let cap = weight.weight(mesh, pos);
                if !(cap >= 0.0) || !cap.is_finite() {
                    return Err(CutError::invalid_argument("weight", cap, "edge weights must be finite and non-negative"));
                }
                network.add_edge(from, to, cap, 0.0)?;

                if !visited[neighbor] {
                    visited[neighbor] = true;
                    stack.push(neighbor);
                }
            }
        }

        debug!(faces = num_faces, nodes = network.num_nodes(), arcs = network.num_arcs(), "dual graph built");
        Ok(DualGraph { network, face_to_node, seed_a, seed_b })
    }
}
