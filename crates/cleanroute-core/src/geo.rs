//! Travel time estimation and zone partitioning (spec §4.1).

use cleanroute_domain::{ZoneId, ZONE_UNMAPPED};

const EARTH_RADIUS_M: f64 = 6_371_000.0;
const AVG_SPEED_KMH: f64 = 18.0;

/// The minimum travel minutes returned for any pair, including a point and
/// itself (spec §8 R2: "reflexive... clamped to 1 minute by design").
pub const MIN_TRAVEL_MIN: i64 = 1;

/// A degenerate operating region: coordinates outside this box are
/// unmapped and fall back to zone-less singleton handling.
const GRID_CELL_DEG: f64 = 0.01;
const LAT_MIN: f64 = -90.0;
const LAT_MAX: f64 = 90.0;
const LON_MIN: f64 = -180.0;
const LON_MAX: f64 = 180.0;

/// Round half-away-from-zero, per spec §9 "Floating-point determinism".
pub fn round_half_away_from_zero(value: f64) -> f64 {
    if value >= 0.0 {
        (value + 0.5).floor()
    } else {
        (value - 0.5).ceil()
    }
}

/// Round a score to one decimal by the documented x10-round-x/10 recipe.
pub fn round_1dp(value: f64) -> f64 {
    round_half_away_from_zero(value * 10.0) / 10.0
}

/// Great-circle travel minutes between two coordinates (spec §4.1).
///
/// Pure, deterministic, symmetric, and clamped to [`MIN_TRAVEL_MIN`].
pub fn travel_minutes(a: (f64, f64), b: (f64, f64)) -> i64 {
    let (lat1, lon1) = a;
    let (lat2, lon2) = b;
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let sin_d_phi = (d_phi / 2.0).sin();
    let sin_d_lambda = (d_lambda / 2.0).sin();
    let h = sin_d_phi * sin_d_phi + phi1.cos() * phi2.cos() * sin_d_lambda * sin_d_lambda;
    let central_angle = 2.0 * h.sqrt().clamp(-1.0, 1.0).asin();
    let distance_m = EARTH_RADIUS_M * central_angle;

    let distance_km = distance_m / 1000.0;
    let minutes = (distance_km / AVG_SPEED_KMH) * 60.0;
    let rounded = round_half_away_from_zero(minutes) as i64;
    rounded.max(MIN_TRAVEL_MIN)
}

/// Assign a coordinate to an integer zone by fixed-size grid cell (spec §4.1:
/// "grid-cell or administrative polygon lookup, chosen at implementation
/// time" — see `DESIGN.md` for the Open Question resolution).
///
/// Coordinates outside the mapped lat/lon box return [`ZONE_UNMAPPED`].
pub fn zone_of(lat: f64, lon: f64) -> ZoneId {
    if !lat.is_finite()
        || !lon.is_finite()
        || !(LAT_MIN..=LAT_MAX).contains(&lat)
        || !(LON_MIN..=LON_MAX).contains(&lon)
    {
        return ZONE_UNMAPPED;
    }
    let row = ((lat - LAT_MIN) / GRID_CELL_DEG).floor() as i64;
    let col = ((lon - LON_MIN) / GRID_CELL_DEG).floor() as i64;
    let cols_per_row = ((LON_MAX - LON_MIN) / GRID_CELL_DEG).ceil() as i64 + 1;
    ZoneId(row * cols_per_row + col)
}

/// Zones sharing an edge or corner with `zone`, excluding `zone` itself.
/// An unmapped zone has no neighbors.
pub fn adjacent_zones(zone: ZoneId) -> Vec<ZoneId> {
    if zone == ZONE_UNMAPPED {
        return Vec::new();
    }
    let cols_per_row = ((LON_MAX - LON_MIN) / GRID_CELL_DEG).ceil() as i64 + 1;
    let row = zone.0.div_euclid(cols_per_row);
    let col = zone.0.rem_euclid(cols_per_row);
    let mut neighbors = Vec::with_capacity(8);
    for d_row in -1..=1 {
        for d_col in -1..=1 {
            if d_row == 0 && d_col == 0 {
                continue;
            }
            let n_row = row + d_row;
            let n_col = col + d_col;
            if n_row < 0 || n_col < 0 {
                continue;
            }
            neighbors.push(ZoneId(n_row * cols_per_row + n_col));
        }
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_is_symmetric() {
        let a = (45.464, 9.19);
        let b = (45.470, 9.20);
        assert_eq!(travel_minutes(a, b), travel_minutes(b, a));
    }

    #[test]
    fn travel_is_clamped_to_one_minute_for_identical_points() {
        let a = (45.464, 9.19);
        assert_eq!(travel_minutes(a, a), MIN_TRAVEL_MIN);
    }

    #[test]
    fn zone_of_unmapped_returns_sentinel() {
        assert_eq!(zone_of(f64::NAN, 9.19), ZONE_UNMAPPED);
        assert_eq!(zone_of(200.0, 9.19), ZONE_UNMAPPED);
    }

    #[test]
    fn adjacent_zones_never_includes_self() {
        let z = zone_of(45.464, 9.19);
        assert!(!adjacent_zones(z).contains(&z));
    }

    #[test]
    fn unmapped_zone_has_no_neighbors() {
        assert!(adjacent_zones(ZONE_UNMAPPED).is_empty());
    }

    #[test]
    fn round_half_away_from_zero_matches_spec_examples() {
        assert_eq!(round_half_away_from_zero(2.5), 3.0);
        assert_eq!(round_half_away_from_zero(-2.5), -3.0);
        assert_eq!(round_1dp(105.04), 105.0);
        assert_eq!(round_1dp(105.05), 105.1);
    }
}
