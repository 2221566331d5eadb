//! Search-area geometry.
//!
//! Each map refresh produces a new generation with a geometrically
//! shrinking radius around a center that is fixed on a user's first
//! generation and never moves afterwards.

use cluetrail_common::GeoPoint;

/// Radius of a user's first search area.
pub const INITIAL_RADIUS_KM: f64 = 500.0;

/// Geometric decay applied per generation.
pub const RADIUS_DECAY: f64 = 0.95;

/// The radius never shrinks below this, so the search area stays viable.
pub const MIN_RADIUS_KM: f64 = 5.0;

/// Radius in km for the given generation (1-based).
pub fn radius_for_generation(generation: u32) -> f64 {
    let exponent = generation.saturating_sub(1);
    (INITIAL_RADIUS_KM * RADIUS_DECAY.powi(exponent as i32)).max(MIN_RADIUS_KM)
}

/// Center precedence: existing center > caller-supplied coordinates >
/// hardcoded default. The existing center is reused bit-for-bit, so
/// supplied coordinates only ever take effect on a user's first
/// generation.
pub fn resolve_center(
    existing: Option<GeoPoint>,
    requested: Option<GeoPoint>,
    default: GeoPoint,
) -> GeoPoint {
    existing.or(requested).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluetrail_common::DEFAULT_CENTER;

    #[test]
    fn first_generation_uses_initial_radius() {
        assert_eq!(radius_for_generation(1), 500.0);
    }

    #[test]
    fn second_generation_decays_once() {
        let r = radius_for_generation(2);
        assert!((r - 475.0).abs() < 1e-9, "expected 475, got {r}");
    }

    #[test]
    fn radius_never_increases() {
        let mut prev = radius_for_generation(1);
        for g in 2..300 {
            let r = radius_for_generation(g);
            assert!(r <= prev, "radius grew at generation {g}");
            prev = r;
        }
    }

    #[test]
    fn radius_bounded_below_by_floor() {
        // 500 * 0.95^g drops under 5 km around generation 91.
        for g in 1..300 {
            assert!(radius_for_generation(g) >= MIN_RADIUS_KM);
        }
        assert_eq!(radius_for_generation(200), MIN_RADIUS_KM);
    }

    #[test]
    fn existing_center_wins() {
        let existing = GeoPoint { lat: 45.0, lng: 9.0 };
        let requested = GeoPoint { lat: 40.0, lng: 14.0 };
        let c = resolve_center(Some(existing), Some(requested), DEFAULT_CENTER);
        assert_eq!(c, existing);
    }

    #[test]
    fn requested_center_wins_without_existing() {
        let requested = GeoPoint { lat: 40.0, lng: 14.0 };
        let c = resolve_center(None, Some(requested), DEFAULT_CENTER);
        assert_eq!(c, requested);
    }

    #[test]
    fn default_center_is_last_resort() {
        let c = resolve_center(None, None, DEFAULT_CENTER);
        assert_eq!(c, DEFAULT_CENTER);
    }
}
