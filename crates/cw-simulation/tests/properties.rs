//! Property tests for the clock, vitals and spawner invariants.

use std::collections::BTreeMap;

use cw_core::{DVec3, EntityKind, World, WorldMeta};
use cw_simulation::{
    ClockConfig, ClockEvent, DayNightClock, IslandConfig, IslandTerrain, InteractionConfig,
    SimConfig, Simulation, SpawnerConfig, SpawnerRole, VitalKind, Vitals, VitalsConfig,
    VitalsTransition,
};
use proptest::prelude::*;

fn clock(cycle: f64, max_days: u32) -> DayNightClock {
    DayNightClock::new(
        ClockConfig::default()
            .with_cycle_duration(cycle)
            .with_max_days(max_days),
    )
    .unwrap()
}

#[derive(Debug, Clone)]
enum VitalOp {
    Tick(u8, bool),
    Restore(u8),
    Damage(u8),
    Set(i16),
}

fn vital_op() -> impl Strategy<Value = VitalOp> {
    prop_oneof![
        (1u8..30, any::<bool>()).prop_map(|(d, a)| VitalOp::Tick(d, a)),
        (0u8..120).prop_map(VitalOp::Restore),
        (0u8..120).prop_map(VitalOp::Damage),
        (-50i16..200).prop_map(VitalOp::Set),
    ]
}

fn apply(vitals: &mut Vitals, op: &VitalOp) -> Option<VitalsTransition> {
    match *op {
        VitalOp::Tick(d, active) => vitals.tick(f64::from(d), active),
        VitalOp::Restore(a) => vitals.restore(f64::from(a)),
        VitalOp::Damage(a) => vitals.damage(f64::from(a)),
        VitalOp::Set(v) => vitals.set(f64::from(v)),
    }
}

proptest! {
    #[test]
    fn tick_splitting_is_equivalent(deltas in prop::collection::vec(1u32..90, 1..40)) {
        let mut split = clock(120.0, 4);
        let mut whole = clock(120.0, 4);
        let mut total = 0.0;
        for d in &deltas {
            let d = f64::from(*d);
            split.tick(d / 2.0);
            split.tick(d / 2.0);
            total += d;
        }
        whole.tick(total);
        prop_assert_eq!(split.current_day(), whole.current_day());
        prop_assert_eq!(split.is_ended(), whole.is_ended());
    }

    #[test]
    fn current_day_is_monotonic_and_bounded(
        deltas in prop::collection::vec(0u32..400, 1..60),
        max_days in 1u32..6,
    ) {
        let mut clock = clock(120.0, max_days);
        let mut last = clock.current_day();
        let mut was_ended = false;
        for d in deltas {
            clock.tick(f64::from(d));
            prop_assert!(clock.current_day() >= last);
            prop_assert!(clock.current_day() <= max_days + 1);
            prop_assert!(!was_ended || clock.is_ended());
            last = clock.current_day();
            was_ended = clock.is_ended();
        }
    }

    #[test]
    fn each_day_event_fires_at_most_once(
        steps in prop::collection::vec((0u32..300, prop::option::of(1u32..5)), 1..40),
    ) {
        let mut clock = clock(120.0, 4);
        let mut fired: BTreeMap<u32, usize> = BTreeMap::new();
        let mut record = |events: Vec<ClockEvent>| {
            for e in events {
                if let ClockEvent::DaySpecific(day) = e {
                    *fired.entry(day).or_default() += 1;
                }
            }
        };
        record(clock.begin());
        for (delta, jump) in steps {
            record(clock.tick(f64::from(delta)));
            if let Some(day) = jump {
                record(clock.set_day(day).unwrap());
            }
        }
        for count in fired.values() {
            prop_assert!(*count <= 1);
        }
        for day in fired.keys() {
            prop_assert!(*day >= 1 && *day <= 4);
        }
    }

    #[test]
    fn vitals_stay_in_bounds(ops in prop::collection::vec(vital_op(), 1..80)) {
        for (kind, config) in [
            (VitalKind::Energy, VitalsConfig::energy()),
            (VitalKind::Thirst, VitalsConfig::thirst()),
            (VitalKind::Health, VitalsConfig::health()),
        ] {
            let mut vitals = Vitals::new(kind, config).unwrap();
            for op in &ops {
                apply(&mut vitals, op);
                prop_assert!(vitals.current() >= 0.0);
                prop_assert!(vitals.current() <= vitals.max());
            }
        }
    }

    #[test]
    fn warning_fires_once_per_warned_interval(ops in prop::collection::vec(vital_op(), 1..80)) {
        let mut vitals = Vitals::new(VitalKind::Energy, VitalsConfig::energy()).unwrap();
        let mut warned = vitals.is_warning();
        let mut raised = 0;
        let mut intervals = 0;
        for op in &ops {
            let transition = apply(&mut vitals, op);
            let now = vitals.is_warning();
            let expected = match (warned, now) {
                (false, true) => Some(VitalsTransition::WarningRaised),
                (true, false) => Some(VitalsTransition::WarningCleared),
                _ => None,
            };
            prop_assert_eq!(transition, expected);
            if transition == Some(VitalsTransition::WarningRaised) {
                raised += 1;
            }
            if !warned && now {
                intervals += 1;
            }
            warned = now;
        }
        prop_assert_eq!(raised, intervals);
    }

    #[test]
    fn spawner_population_never_exceeds_capacity(
        capacity in 1usize..7,
        steps in prop::collection::vec((1u32..20, any::<bool>()), 1..80),
        seed in any::<u64>(),
    ) {
        let mut world = World::new(WorldMeta::new("Prop"));
        let player = world.spawn(EntityKind::Player, "Player", DVec3::ZERO);
        let config = SimConfig::default()
            .with_seed(seed)
            .with_interactions(InteractionConfig::empty())
            .with_clock(ClockConfig::default().with_max_days(100))
            .with_resources(SpawnerConfig::coconuts().with_capacity(capacity).with_interval(5.0))
            .with_threats(SpawnerConfig::night_creatures().with_capacity(capacity).with_interval(3.0));
        let terrain = IslandTerrain::new(IslandConfig::flat(200.0));
        let mut sim = Simulation::new(world, player, Box::new(terrain), config).unwrap();

        for (delta, kill) in steps {
            sim.tick(f64::from(delta)).unwrap();
            if kill {
                let victim = sim.spawner(SpawnerRole::Resources).members().first().copied();
                if let Some(id) = victim {
                    sim.world_mut().despawn(id).ok();
                }
            }
            for role in [SpawnerRole::Resources, SpawnerRole::Threats] {
                prop_assert!(sim.spawner(role).population() <= capacity);
            }
            prop_assert!(sim.world().entities_by_kind(&EntityKind::Coconut).len() <= capacity);
        }
    }
}
