//! Coalescing of nearby fire fronts.
//!
//! Single pass, order dependent: the first remaining fire becomes the
//! accumulator and swallows every later fire within `merge_distance` of its
//! running position. Swallowed fires leave the scan list immediately, so no
//! fire is matched twice. The accumulator keeps its own id, heading,
//! movement counter and active flag.
//!
//! O(n²) per pass; n is bounded by the placement limit.

use crate::core_types::fire::{truncate_front, FireEntity};
use crate::core_types::geo::{distance, LatLng};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Merge every pair of fires closer than `merge_distance`.
pub fn merge_close_fires(
    fires: Vec<FireEntity>,
    merge_distance: f64,
    max_history_points: usize,
) -> Vec<FireEntity> {
    if fires.len() <= 1 {
        return fires;
    }

    let mut remaining: VecDeque<FireEntity> = fires.into();
    let mut merged = Vec::with_capacity(remaining.len());

    while let Some(mut current) = remaining.pop_front() {
        let mut merge_count = 1.0;
        let mut i = 0;
        while i < remaining.len() {
            if distance(remaining[i].position, current.position) < merge_distance {
                if let Some(other) = remaining.remove(i) {
                    absorb(&mut current, other, merge_count, max_history_points);
                    merge_count += 1.0;
                }
            } else {
                i += 1;
            }
        }
        merged.push(current);
    }

    merged
}

/// Fold `other` into `current`; `weight` is how many fires `current` already stands for.
fn absorb(current: &mut FireEntity, other: FireEntity, weight: f64, max_history_points: usize) {
    let position = (current.position.to_vector() * weight + other.position.to_vector()) / (weight + 1.0);
    current.position = LatLng::from_vector(position);
    current.intensity = current.intensity.max(other.intensity);
    current.spread = current.spread.max(other.spread);

    let mut combined = std::mem::take(&mut current.history);
    combined.extend(other.history);
    current.history = truncate_front(dedup_points(combined), max_history_points);
}

/// Remove exact duplicate coordinates, keeping the first occurrence.
fn dedup_points(points: Vec<LatLng>) -> Vec<LatLng> {
    let mut seen = FxHashSet::default();
    points.into_iter().filter(|p| seen.insert(p.bits())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::fire::FireId;
    use crate::core_types::units::Degrees;
    use approx::assert_relative_eq;

    fn fire(n: u64, lat: f64, lng: f64, intensity: f64) -> FireEntity {
        FireEntity::with_intensity(FireId::seed(n), LatLng::new(lat, lng), Degrees::new(0.0), intensity)
    }

    #[test]
    fn test_identical_positions_merge() {
        let mut a = fire(1, 1.0, 1.0, 0.8);
        a.history = vec![LatLng::new(0.9, 1.0), LatLng::new(1.0, 1.0)];
        let mut b = fire(2, 1.0, 1.0, 1.4);
        b.history = vec![LatLng::new(1.0, 1.1), LatLng::new(1.0, 1.0)];
        b.spread = 0.3;

        let merged = merge_close_fires(vec![a, b], 0.02, 10);
        assert_eq!(merged.len(), 1);
        let m = &merged[0];
        assert_eq!(m.id, FireId::seed(1));
        assert_eq!(m.intensity, 1.4);
        assert_eq!(m.spread, 0.3);
        assert_eq!(
            m.history,
            vec![LatLng::new(0.9, 1.0), LatLng::new(1.0, 1.0), LatLng::new(1.0, 1.1)]
        );
    }

    #[test]
    fn test_far_fires_untouched() {
        let fires = vec![fire(1, 0.0, 0.0, 1.0), fire(2, 0.0, 0.05, 1.0)];
        let merged = merge_close_fires(fires.clone(), 0.02, 10);
        assert_eq!(merged, fires);
    }

    #[test]
    fn test_running_weighted_average() {
        // Three fires within range of the accumulator's running position.
        let fires = vec![
            fire(1, 0.0, 0.0, 1.0),
            fire(2, 0.0, 0.009, 1.0),
            fire(3, 0.0, 0.012, 1.0),
        ];
        let merged = merge_close_fires(fires, 0.02, 10);
        assert_eq!(merged.len(), 1);
        // (0 + 0.009) / 2 = 0.0045, then (0.0045 * 2 + 0.012) / 3 = 0.007
        assert_relative_eq!(merged[0].position.lng, 0.007, epsilon = 1e-12);
    }

    #[test]
    fn test_first_in_list_is_accumulator() {
        let fires = vec![fire(5, 0.0, 0.0, 0.2), fire(1, 0.0, 0.001, 3.0)];
        let merged = merge_close_fires(fires, 0.02, 10);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, FireId::seed(5));
        assert_eq!(merged[0].intensity, 3.0);
    }

    #[test]
    fn test_chain_is_order_dependent() {
        // b is near both a and c. b joins a, the running position only
        // reaches 0.0075, so c stays out of range.
        let fires = vec![fire(1, 0.0, 0.0, 1.0), fire(2, 0.0, 0.015, 1.0), fire(3, 0.0, 0.03, 1.0)];
        let merged = merge_close_fires(fires, 0.02, 10);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, FireId::seed(1));
        assert_eq!(merged[1].id, FireId::seed(3));
    }

    #[test]
    fn test_history_truncated_after_union() {
        let mut a = fire(1, 0.0, 0.0, 1.0);
        a.history = (0..8).map(|i| LatLng::new(f64::from(i), 0.0)).collect();
        let mut b = fire(2, 0.0, 0.0, 1.0);
        b.history = (0..8).map(|i| LatLng::new(f64::from(i), 1.0)).collect();

        let merged = merge_close_fires(vec![a, b], 0.02, 10);
        assert_eq!(merged[0].history.len(), 10);
        assert_eq!(merged[0].history.last(), Some(&LatLng::new(7.0, 1.0)));
    }
}
