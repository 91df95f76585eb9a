pub mod driver;
pub mod dual_graph;
pub mod edge_weight;
pub mod params;
