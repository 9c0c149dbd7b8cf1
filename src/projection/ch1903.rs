//! WGS84 <-> Swiss CH1903+ (LV95) approximate conversions
//!
//! Accurate to about a metre inside Switzerland, which is all the CLI needs to
//! turn user coordinates into plane points and back. Angles are in degrees.

fn lambda1(lon: f64) -> f64 {
    1e-4 * (3600.0 * lon - 26_782.5)
}

fn phi1(lat: f64) -> f64 {
    1e-4 * (3600.0 * lat - 169_028.66)
}

/// East coordinate of the WGS84 point `(lon, lat)`.
pub fn e(lon: f64, lat: f64) -> f64 {
    let l = lambda1(lon);
    let p = phi1(lat);
    2_600_072.37 + 211_455.93 * l - 10_938.51 * l * p - 0.36 * l * p * p - 44.54 * l * l * l
}

/// North coordinate of the WGS84 point `(lon, lat)`.
pub fn n(lon: f64, lat: f64) -> f64 {
    let l = lambda1(lon);
    let p = phi1(lat);
    1_200_147.07 + 308_807.95 * p + 3_745.25 * l * l + 76.63 * p * p - 194.56 * l * l * p
        + 119.79 * p * p * p
}

/// Longitude of the CH1903+ point `(e, n)`.
pub fn lon(e: f64, n: f64) -> f64 {
    let x = 1e-6 * (e - 2_600_000.0);
    let y = 1e-6 * (n - 1_200_000.0);
    let l0 = 2.677_909_4 + 4.728_982 * x + 0.791_484 * x * y + 0.1306 * x * y * y - 0.0436 * x * x * x;
    l0 * 100.0 / 36.0
}

/// Latitude of the CH1903+ point `(e, n)`.
pub fn lat(e: f64, n: f64) -> f64 {
    let x = 1e-6 * (e - 2_600_000.0);
    let y = 1e-6 * (n - 1_200_000.0);
    let p0 = 16.902_389_2 + 3.238_272 * y
        - 0.270_978 * x * x
        - 0.002_528 * y * y
        - 0.0447 * x * x * y
        - 0.0140 * y * y * y;
    p0 * 100.0 / 36.0
}
