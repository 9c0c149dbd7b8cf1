//! Points in the Swiss CH1903+ plane

use serde::Serialize;

use super::ch1903;
use crate::core::{Error, Result};

/// Coverage box of the graph, in CH1903+ metres.
pub struct SwissBounds;

impl SwissBounds {
    pub const MIN_E: f64 = 2_485_000.0;
    pub const MAX_E: f64 = 2_834_000.0;
    pub const MIN_N: f64 = 1_075_000.0;
    pub const MAX_N: f64 = 1_296_000.0;
    pub const WIDTH: f64 = Self::MAX_E - Self::MIN_E;
    pub const HEIGHT: f64 = Self::MAX_N - Self::MIN_N;

    pub fn contains(e: f64, n: f64) -> bool {
        (Self::MIN_E..=Self::MAX_E).contains(&e) && (Self::MIN_N..=Self::MAX_N).contains(&n)
    }
}

/// A point of the projected plane (east, north), in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointCh {
    pub e: f64,
    pub n: f64,
}

impl PointCh {
    pub const fn new(e: f64, n: f64) -> Self {
        Self { e, n }
    }

    /// Point inside the coverage box, or `InvalidArgument`.
    pub fn try_new(e: f64, n: f64) -> Result<Self> {
        if !SwissBounds::contains(e, n) {
            return Err(Error::invalid(format!(
                "point ({e}, {n}) lies outside the covered area"
            )));
        }
        Ok(Self { e, n })
    }

    /// Plane point of a WGS84 position given in degrees.
    pub fn from_wgs84(lon: f64, lat: f64) -> Result<Self> {
        Self::try_new(ch1903::e(lon, lat), ch1903::n(lon, lat))
    }

    pub fn squared_distance_to(&self, that: &PointCh) -> f64 {
        let de = that.e - self.e;
        let dn = that.n - self.n;
        de * de + dn * dn
    }

    pub fn distance_to(&self, that: &PointCh) -> f64 {
        self.squared_distance_to(that).sqrt()
    }

    /// Longitude in degrees (WGS84).
    pub fn lon(&self) -> f64 {
        ch1903::lon(self.e, self.n)
    }

    /// Latitude in degrees (WGS84).
    pub fn lat(&self) -> f64 {
        ch1903::lat(self.e, self.n)
    }
}
