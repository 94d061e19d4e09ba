//! Great-circle sector resolution.
//!
//! Maps a GPS position onto the ring: players interact with sectors by
//! physically standing in them, so every ADD/REMOVE command arrives as a
//! raw latitude/longitude pair. A position resolves to a sector only when
//! it falls inside the playable annulus around the game center; the sector
//! index is the bearing from the center divided into equal slices,
//! 0° = north, clockwise.

use serde::{Deserialize, Serialize};

use crate::ring::N_SECTORS;

const MILES_TO_M: f64 = 1609.344;

/// Inner edge of the playable annulus, metres from the center.
pub const INNER_RADIUS_M: f64 = 0.05 * MILES_TO_M;

/// Outer edge of the playable annulus, metres from the center.
pub const OUTER_RADIUS_M: f64 = 0.5 * MILES_TO_M;

/// Angular width of one sector, degrees.
pub const SLICE_DEG: f64 = 360.0 / N_SECTORS as f64;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// The anchor point a game is played around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

/// Haversine distance between two points, metres.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Initial bearing from point 1 to point 2, degrees in `[0, 360)`,
/// 0° = north, clockwise.
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let lambda1 = lon1.to_radians();
    let lambda2 = lon2.to_radians();

    let y = (lambda2 - lambda1).sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * (lambda2 - lambda1).cos();
    let theta = y.atan2(x).to_degrees();
    (theta + 360.0) % 360.0
}

/// Resolve a position to a sector index, or `None` outside the annulus.
pub fn sector_for_position(center: Center, lat: f64, lon: f64) -> Option<usize> {
    let d = haversine_m(center.lat, center.lon, lat, lon);
    if d < INNER_RADIUS_M || d > OUTER_RADIUS_M {
        return None;
    }
    let b = bearing_deg(center.lat, center.lon, lat, lon);
    let idx = (b / SLICE_DEG).floor() as usize;
    Some(idx.min(N_SECTORS - 1))
}
