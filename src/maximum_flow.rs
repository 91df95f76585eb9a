pub mod arena;
pub mod boykov_kolmogorov;
