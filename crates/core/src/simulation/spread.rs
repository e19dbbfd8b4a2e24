//! Per-tick fire spread.
//!
//! One tick, in order:
//! 1. Keep active fires that are still moving or burn hotter than
//!    [`HIGH_INTENSITY_THRESHOLD`]
//! 2. Sort by intensity, hottest first
//! 3. Trim to the active-fire ceiling
//! 4. Retire stalled fires, stall slow fires, branch the rest into up to
//!    three children (heading and two side branches)
//! 5. Merge nearby fronts
//!
//! Children share one capacity budget per tick, handed out hottest parent
//! first, so the emitted set never exceeds the ceiling. Every parent that
//! branches is emitted once more with `active = false` and drops out on the
//! following tick.

use crate::config::SimulationConfig;
use crate::core_types::fire::{push_history, FireEntity, FireId};
use crate::core_types::units::{Degrees, Radians};
use crate::core_types::weather::SimulationParameters;
use crate::physics::{spread_distance, MIN_SPREAD_DISTANCE};
use crate::simulation::merge::merge_close_fires;
use rand::Rng;
use tracing::debug;

/// Fires hotter than this survive candidate filtering even when stalled.
pub const HIGH_INTENSITY_THRESHOLD: f64 = 0.5;

/// A branch point closer than this (degrees, on both axes) is discarded.
pub const BRANCH_EPSILON: f64 = 0.0001;

/// Random intensity decay applied to each child.
const CHILD_INTENSITY_FACTOR: std::ops::Range<f64> = 0.7..1.0;

/// Minimum fraction of the tick's spread distance a heading branch travels.
const PRIMARY_MIN_FRACTION: f64 = 0.5;
/// Minimum fraction of the tick's spread distance a side branch travels.
const SIDE_MIN_FRACTION: f64 = 0.3;

/// One candidate branch relative to the parent's heading.
#[derive(Debug, Clone, Copy)]
struct Branch {
    offset: Radians,
    min_fraction: f64,
}

fn branches(side_offset: Degrees) -> [Branch; 3] {
    let side = side_offset.to_radians();
    [
        Branch {
            offset: Radians::new(0.0),
            min_fraction: PRIMARY_MIN_FRACTION,
        },
        Branch {
            offset: Radians::new(-side.value()),
            min_fraction: SIDE_MIN_FRACTION,
        },
        Branch {
            offset: side,
            min_fraction: SIDE_MIN_FRACTION,
        },
    ]
}

/// Whether a fire takes part in the next tick.
pub fn is_candidate(fire: &FireEntity, inactivity_limit: u32) -> bool {
    fire.active && (fire.last_movement < inactivity_limit || fire.intensity > HIGH_INTENSITY_THRESHOLD)
}

/// Advance every fire by one tick and return the next live set.
///
/// `tick_index` is the number of ticks already elapsed in the run; it is
/// folded into child ids so ids stay unique across ticks.
pub fn spread_tick<R: Rng + ?Sized>(
    fires: &[FireEntity],
    params: &SimulationParameters,
    tick_index: u64,
    config: &SimulationConfig,
    rng: &mut R,
) -> Vec<FireEntity> {
    let mut candidates: Vec<&FireEntity> = fires
        .iter()
        .filter(|f| is_candidate(f, config.inactivity_limit))
        .collect();
    candidates.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
    candidates.truncate(config.max_active_fires);

    let distance = spread_distance(params);
    let branch_set = branches(Degrees::new(config.side_branch_offset_degrees));
    let mut capacity = config.max_active_fires.saturating_sub(candidates.len());
    let mut emitted = Vec::with_capacity(config.max_active_fires);
    let mut spawned = 0usize;
    let mut retired = 0usize;

    for fire in candidates {
        if fire.last_movement >= config.inactivity_limit {
            emitted.push(fire.retired());
            retired += 1;
            continue;
        }

        if distance < MIN_SPREAD_DISTANCE {
            emitted.push(fire.stalled());
            continue;
        }

        let heading = fire.direction.to_radians();
        let points: Vec<_> = branch_set
            .iter()
            .map(|branch| {
                let travelled = distance * rng.random_range(branch.min_fraction..1.0);
                (branch, fire.position.project(heading + branch.offset, travelled))
            })
            .filter(|(_, point)| !fire.position.is_negligibly_close(*point, BRANCH_EPSILON))
            .collect();

        if points.is_empty() {
            emitted.push(fire.stalled());
            continue;
        }

        let to_create = points.len().min(capacity);
        capacity -= to_create;
        for (index, (branch, point)) in points.into_iter().take(to_create).enumerate() {
            let turn = Degrees::new(branch.offset.to_degrees().value() * 0.5);
            emitted.push(FireEntity {
                id: FireId::child(&fire.id, tick_index, index),
                position: point,
                intensity: fire.intensity * rng.random_range(CHILD_INTENSITY_FACTOR),
                spread: fire.spread + distance,
                direction: (fire.direction + turn).normalized(),
                last_movement: 0,
                active: true,
                history: push_history(&fire.history, point, config.max_history_points),
            });
            spawned += 1;
        }
        emitted.push(fire.retired());
        retired += 1;
    }

    let before_merge = emitted.len();
    let next = merge_close_fires(emitted, config.merge_distance, config.max_history_points);
    debug!(
        tick = tick_index,
        spawned,
        retired,
        merged = before_merge - next.len(),
        live = next.len(),
        "spread tick"
    );
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::geo::LatLng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rustc_hash::FxHashSet;

    fn hot_params() -> SimulationParameters {
        // risk 94, spread distance ≈ 0.021 degrees per tick
        SimulationParameters::new(0.0, 40.0, 38.0, 15.0, 1.0).unwrap()
    }

    fn seed_fire(n: u64, lat: f64, lng: f64) -> FireEntity {
        FireEntity::ignite(FireId::seed(n), LatLng::new(lat, lng), Degrees::new(0.0))
    }

    #[test]
    fn test_stalled_fire_is_retired_in_place() {
        let config = SimulationConfig::default();
        let mut fire = seed_fire(1, -17.8, -61.5);
        fire.last_movement = config.inactivity_limit;
        let mut rng = StdRng::seed_from_u64(1);

        let next = spread_tick(&[fire.clone()], &hot_params(), 0, &config, &mut rng);
        assert_eq!(next.len(), 1);
        assert!(!next[0].active);
        assert_eq!(next[0].position, fire.position);
        assert_eq!(next[0].history, fire.history);
    }

    #[test]
    fn test_stalled_low_intensity_fire_is_dropped() {
        let config = SimulationConfig::default();
        let mut fire = seed_fire(1, 0.0, 0.0);
        fire.last_movement = config.inactivity_limit;
        fire.intensity = 0.4;
        let mut rng = StdRng::seed_from_u64(1);

        let next = spread_tick(&[fire], &hot_params(), 0, &config, &mut rng);
        assert!(next.is_empty());
    }

    #[test]
    fn test_inactive_fires_are_pruned() {
        let config = SimulationConfig::default();
        let fire = seed_fire(1, 0.0, 0.0).retired();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(spread_tick(&[fire], &hot_params(), 3, &config, &mut rng).is_empty());
    }

    #[test]
    fn test_calm_weather_stalls() {
        let config = SimulationConfig::default();
        let calm = SimulationParameters::new(0.0, 0.0, 25.0, 50.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let next = spread_tick(&[seed_fire(1, 0.0, 0.0)], &calm, 0, &config, &mut rng);
        assert_eq!(next.len(), 1);
        assert!(next[0].active);
        assert_eq!(next[0].last_movement, 1);
        assert_eq!(next[0].position, LatLng::new(0.0, 0.0));
    }

    #[test]
    fn test_branching_spawns_children_and_retires_parent() {
        // Merging disabled so every branch is visible.
        let config = SimulationConfig {
            merge_distance: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let parent = seed_fire(1, -17.8, -61.5);

        let next = spread_tick(&[parent.clone()], &hot_params(), 4, &config, &mut rng);
        assert_eq!(next.len(), 4);

        let retired: Vec<_> = next.iter().filter(|f| !f.active).collect();
        assert_eq!(retired.len(), 1);
        assert_eq!(retired[0].id, parent.id);
        assert_eq!(retired[0].position, parent.position);

        let distance = spread_distance(&hot_params());
        for (i, child) in next.iter().filter(|f| f.active).enumerate() {
            assert_eq!(child.id, FireId::child(&parent.id, 4, i));
            assert!(child.intensity >= 0.7 && child.intensity < 1.0);
            assert!((child.spread - distance).abs() < 1e-12);
            assert_eq!(child.last_movement, 0);
            assert_eq!(child.history.len(), 2);
            assert_eq!(child.history.last(), Some(&child.position));
            let travelled = parent.position.distance_to(child.position);
            assert!(travelled <= distance + 1e-12);
            assert!(travelled >= 0.3 * distance - 1e-12);
        }
    }

    #[test]
    fn test_child_headings_turn_half_the_offset() {
        let config = SimulationConfig {
            merge_distance: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let next = spread_tick(&[seed_fire(1, 0.0, 0.0)], &hot_params(), 0, &config, &mut rng);

        let headings: Vec<f64> = next.iter().filter(|f| f.active).map(|f| *f.direction).collect();
        assert_eq!(headings.len(), 3);
        assert!(headings[0].abs() < 1e-9);
        assert!((headings[1] - 337.5).abs() < 1e-9);
        assert!((headings[2] - 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_ceiling_is_respected() {
        let config = SimulationConfig {
            max_active_fires: 5,
            merge_distance: 0.0,
            ..Default::default()
        };
        let fires: Vec<_> = (0..4).map(|i| seed_fire(i, f64::from(i as u32), 0.0)).collect();
        let mut rng = StdRng::seed_from_u64(3);

        let next = spread_tick(&fires, &hot_params(), 0, &config, &mut rng);
        // 4 survivors leave room for one child in total.
        assert_eq!(next.len(), 5);
        assert_eq!(next.iter().filter(|f| f.active).count(), 1);
        assert_eq!(next[0].id, FireId::child(&FireId::seed(0), 0, 0));
    }

    #[test]
    fn test_overflow_trimmed_lowest_intensity_first() {
        let config = SimulationConfig {
            max_active_fires: 2,
            merge_distance: 0.0,
            ..Default::default()
        };
        let calm = SimulationParameters::new(0.0, 0.0, 25.0, 50.0, 1.0).unwrap();
        let mut fires: Vec<_> = (0..4).map(|i| seed_fire(i, f64::from(i as u32), 0.0)).collect();
        fires[0].intensity = 0.2;
        fires[1].intensity = 0.9;
        fires[2].intensity = 0.1;
        fires[3].intensity = 0.6;
        let mut rng = StdRng::seed_from_u64(3);

        let next = spread_tick(&fires, &calm, 0, &config, &mut rng);
        let ids: Vec<_> = next.iter().map(|f| f.id.clone()).collect();
        assert_eq!(ids, vec![FireId::seed(1), FireId::seed(3)]);
    }

    #[test]
    fn test_many_ticks_keep_invariants() {
        let config = SimulationConfig {
            max_active_fires: 20,
            ..Default::default()
        };
        let fast = SimulationParameters::new(45.0, 80.0, 45.0, 10.0, 5.0).unwrap();
        let mut rng = StdRng::seed_from_u64(2024);
        let mut fires = vec![seed_fire(1, -17.8, -61.5), seed_fire(2, -17.5, -61.0)];

        for tick in 0..30 {
            fires = spread_tick(&fires, &fast, tick, &config, &mut rng);
            assert!(fires.len() <= config.max_active_fires);

            let mut ids = FxHashSet::default();
            for fire in &fires {
                assert!(ids.insert(fire.id.clone()), "duplicate id {}", fire.id);
                assert!(fire.history.len() <= config.max_history_points);
                assert!(*fire.direction >= 0.0 && *fire.direction < 360.0);
                assert!(fire.intensity >= 0.0);
            }
        }
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let config = SimulationConfig::default();
        let fires = vec![seed_fire(1, -17.8, -61.5)];
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut live = fires.clone();
            for tick in 0..5 {
                live = spread_tick(&live, &hot_params(), tick, &config, &mut rng);
            }
            live
        };
        assert_eq!(run(11), run(11));
    }
}
