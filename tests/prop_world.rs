//! Property-based tests for world rules under arbitrary action streams.
//!
//! Run with: cargo test --release prop_world

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use proptest::prelude::*;

use jewelwar::config::GameTuning;
use jewelwar::game::{UnitSlot, World, check_invariants};

const DT: f64 = 1.0 / 30.0;

/// One tick of raw orders: `(team, slot, ordinal)`, ordinals past the table
/// included on purpose.
fn tick_orders() -> impl Strategy<Value = Vec<(u8, usize, u32)>> {
    prop::collection::vec((0u8..3, 0usize..3, 0u32..14), 0..9)
}

fn to_ordinals(orders: &[(u8, usize, u32)]) -> BTreeMap<UnitSlot, u32> {
    orders
        .iter()
        .map(|&(team, index, ordinal)| (UnitSlot::new(team, index), ordinal))
        .collect()
}

/// Small, crowded maps so random walks actually meet.
fn small_tuning() -> GameTuning {
    GameTuning {
        width: 24,
        height: 18,
        resources_on_map: 12,
        max_time_s: 30.0,
        ..GameTuning::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// The invariant checker stays silent whatever the units are told to do.
    #[test]
    fn prop_random_orders_keep_invariants(
        seed in 0u64..1_000,
        ticks in prop::collection::vec(tick_orders(), 1..150),
    ) {
        let mut world = World::new(small_tuning(), seed, None).unwrap();
        for orders in &ticks {
            world.step_ordinals(&to_ordinals(orders), DT);
            let violations = check_invariants(&world);
            prop_assert!(violations.is_empty(), "{:?}", violations);
        }
    }

    /// Hit points stay within `[0, max]` for units and buildings alike.
    #[test]
    fn prop_hp_stays_in_range(
        seed in 0u64..1_000,
        ticks in prop::collection::vec(tick_orders(), 1..150),
    ) {
        let mut world = World::new(small_tuning(), seed, None).unwrap();
        for orders in &ticks {
            world.step_ordinals(&to_ordinals(orders), DT);
            for unit in &world.units {
                prop_assert!(unit.hp <= unit.stats().max_hp);
                prop_assert!(unit.is_alive() || !unit.has_jewel);
            }
            for building in &world.buildings {
                prop_assert!(building.hp <= building.stats().max_hp);
            }
        }
    }

    /// Every carried jewel has exactly one carrier, standing on it.
    #[test]
    fn prop_jewel_single_carrier(
        seed in 0u64..1_000,
        ticks in prop::collection::vec(tick_orders(), 1..150),
    ) {
        let mut world = World::new(small_tuning(), seed, None).unwrap();
        for orders in &ticks {
            world.step_ordinals(&to_ordinals(orders), DT);
            for unit in &world.units {
                let carried = world
                    .jewels
                    .iter()
                    .filter(|j| j.carried_by == Some(unit.id))
                    .count();
                prop_assert!(carried <= 1);
                prop_assert_eq!(carried == 1, unit.has_jewel);
            }
            for jewel in &world.jewels {
                if let Some(carrier) = jewel.carried_by {
                    let unit = &world.units[carrier as usize];
                    prop_assert!(unit.team != jewel.home_team);
                    prop_assert_eq!(jewel.pos, unit.pos);
                }
            }
        }
    }

    /// Replaying the same orders on the same seed gives the same world.
    #[test]
    fn prop_same_orders_same_world(
        seed in 0u64..1_000,
        ticks in prop::collection::vec(tick_orders(), 1..80),
    ) {
        let mut a = World::new(small_tuning(), seed, None).unwrap();
        let mut b = World::new(small_tuning(), seed, None).unwrap();
        for orders in &ticks {
            let ordinals = to_ordinals(orders);
            prop_assert_eq!(a.step_ordinals(&ordinals, DT), b.step_ordinals(&ordinals, DT));
        }
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }
}
