//! Planner configuration
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```toml
//! search_radius = 300.0
//! cost = "uniform"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::graph::Graph;
use crate::routing::{CityBikeCost, CostFunction};

/// Edge cost model used by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CostProfile {
    /// Bicycle preferences and restrictions from edge attributes
    #[default]
    CityBike,
    /// Plain shortest distance
    Uniform,
}

impl CostProfile {
    /// Cost function of this profile over `graph`.
    pub fn cost_function(self, graph: &Graph) -> impl CostFunction + '_ {
        let city_bike = CityBikeCost::new(graph);
        move |node_id: u32, edge_id: u32| match self {
            CostProfile::CityBike => city_bike.cost_factor(node_id, edge_id),
            CostProfile::Uniform => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Radius in metres within which a waypoint snaps to a graph node.
    pub search_radius: f64,
    /// Maximum spacing in metres of elevation profile samples.
    pub profile_max_step: f64,
    /// Number of legs kept by the route cache.
    pub cache_capacity: usize,
    pub cost: CostProfile,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            search_radius: 500.0,
            profile_max_step: 5.0,
            cache_capacity: 50,
            cost: CostProfile::default(),
        }
    }
}

impl PlannerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.search_radius.is_finite() || self.search_radius < 0.0 {
            return Err(Error::invalid(format!(
                "search_radius must be a finite distance >= 0, got {}",
                self.search_radius
            )));
        }
        if !self.profile_max_step.is_finite() || self.profile_max_step <= 0.0 {
            return Err(Error::invalid(format!(
                "profile_max_step must be > 0, got {}",
                self.profile_max_step
            )));
        }
        if self.cache_capacity == 0 {
            return Err(Error::invalid("cache_capacity must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.search_radius, 500.0);
        assert_eq!(config.profile_max_step, 5.0);
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.cost, CostProfile::CityBike);
        assert!(config.validate().is_ok());
        assert_eq!(PlannerConfig::from_toml_str("").unwrap(), config);
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let config = PlannerConfig::from_toml_str(
            r#"
            search_radius = 250.0
            cost = "uniform"
            "#,
        )
        .unwrap();
        assert_eq!(config.search_radius, 250.0);
        assert_eq!(config.cost, CostProfile::Uniform);
        assert_eq!(config.cache_capacity, 50);
    }

    #[test]
    fn test_parse_errors_and_invalid_values() {
        assert!(matches!(
            PlannerConfig::from_toml_str("cost = \"tandem\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PlannerConfig::from_toml_str("speed = 3"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PlannerConfig::from_toml_str("search_radius = -1.0"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(PlannerConfig::from_toml_str("profile_max_step = 0.0").is_err());
        assert!(PlannerConfig::from_toml_str("cache_capacity = 0").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "profile_max_step = 10.0").unwrap();
        let config = PlannerConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.profile_max_step, 10.0);

        let missing = PlannerConfig::from_toml_file(Path::new("/nonexistent/velo.toml"));
        assert!(matches!(missing, Err(Error::Io { .. })));
    }
}
