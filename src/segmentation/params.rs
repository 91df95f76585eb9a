use crate::error::{CutError, Result};

/// Weights of the four edge-cost terms and the geodesic guard band.
///
/// Every value must lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CutParams {
    /// Weight of the shared edge length.
    pub edge_length: f64,
    /// Weight of the normalized dihedral angle.
    pub dihedral: f64,
    /// Weight of the normalized per-face quality (ambient occlusion and the like).
    pub ambient: f64,
    /// Weight of the geodesic term.
    pub geodesic: f64,
    /// Lower end of the geodesic band, as a fraction of each seed's farthest distance.
    pub geo_min: f64,
    /// Upper end of the geodesic band.
    pub geo_max: f64,
    /// Seed points farther than this from every face are not resolved.
    pub max_seed_distance: Option<f64>,
}

impl Default for CutParams {
    fn default() -> Self {
        Self { edge_length: 1.0, dihedral: 1.0, ambient: 0.0, geodesic: 1.0, geo_min: 0.05, geo_max: 0.95, max_seed_distance: None }
    }
}

impl CutParams {
    pub fn with_edge_length(mut self, weight: f64) -> Self {
        self.edge_length = weight;
        self
    }

    pub fn with_dihedral(mut self, weight: f64) -> Self {
        self.dihedral = weight;
        self
    }

    pub fn with_ambient(mut self, weight: f64) -> Self {
        self.ambient = weight;
        self
    }

    pub fn with_geodesic(mut self, weight: f64) -> Self {
        self.geodesic = weight;
        self
    }

    pub fn with_band(mut self, geo_min: f64, geo_max: f64) -> Self {
        self.geo_min = geo_min;
        self.geo_max = geo_max;
        self
    }

    pub fn with_max_seed_distance(mut self, distance: f64) -> Self {
        self.max_seed_distance = Some(distance);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("edge_length", self.edge_length),
            ("dihedral", self.dihedral),
            ("ambient", self.ambient),
            ("geodesic", self.geodesic),
            ("geo_min", self.geo_min),
            ("geo_max", self.geo_max),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(CutError::invalid_argument(name, value, "must be in [0, 1]"));
            }
        }
        if self.geo_min > self.geo_max {
            return Err(CutError::invalid_argument("geo_min", self.geo_min, "must not exceed geo_max"));
        }
        if let Some(distance) = self.max_seed_distance {
            if !(distance >= 0.0) {
                return Err(CutError::invalid_argument("max_seed_distance", distance, "must be non-negative"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_is_valid() {
        assert!(CutParams::default().validate().is_ok());
    }

    #[rstest]
    #[case(CutParams::default().with_edge_length(1.5))]
    #[case(CutParams::default().with_dihedral(-0.1))]
    #[case(CutParams::default().with_ambient(f64::NAN))]
    #[case(CutParams::default().with_geodesic(2.0))]
    #[case(CutParams::default().with_band(0.6, 0.4))]
    #[case(CutParams::default().with_band(0.0, 1.01))]
    #[case(CutParams::default().with_max_seed_distance(-1.0))]
    fn out_of_range_is_rejected(#[case] params: CutParams) {
        assert!(matches!(params.validate(), Err(CutError::InvalidArgument { .. })));
    }

    #[test]
    fn boundaries_are_accepted() {
        let params = CutParams::default().with_edge_length(0.0).with_dihedral(1.0).with_ambient(1.0).with_geodesic(0.0).with_band(0.0, 1.0).with_max_seed_distance(0.0);
        assert!(params.validate().is_ok());
    }
}
