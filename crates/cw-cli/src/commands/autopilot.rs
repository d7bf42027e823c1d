use cw_core::{DVec3, EntityKind};
use cw_simulation::{SimResult, Simulation, SleepVerdict, VitalKind};

/// Walking speed of the scripted survivor, in metres per second.
const WALK_SPEED: f64 = 4.0;

/// Thirst level at which the survivor stops drinking.
const DRINK_UNTIL: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Goal {
    Drink(DVec3),
    Eat(DVec3),
    Sleep(DVec3),
    Talk(DVec3),
    Idle,
}

/// A scripted survivor: walks to the pond when thirsty, eats coconuts when
/// hurt, sleeps when tired and asks the guide for advice once.
#[derive(Debug, Default)]
pub struct Autopilot {
    drinking: bool,
    talked: bool,
    pub drinks: u32,
    pub meals: u32,
    pub naps: u32,
    pub refused_naps: u32,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Act for one frame. Called before the simulation ticks.
    pub fn step(&mut self, sim: &mut Simulation, dt: f64) -> SimResult<()> {
        let Some(position) = sim.world().position(sim.player()) else {
            return Ok(());
        };

        let goal = self.choose(sim, position);
        let target = match goal {
            Goal::Drink(t) | Goal::Eat(t) | Goal::Sleep(t) | Goal::Talk(t) => t,
            Goal::Idle => return Ok(()),
        };

        if position.distance(target) > 1e-6 {
            sim.move_player(step_towards(position, target, WALK_SPEED * dt))?;
            return Ok(());
        }

        match goal {
            Goal::Drink(_) => {
                if sim.try_drink()?.is_some() {
                    self.drinks += 1;
                }
            }
            Goal::Eat(_) => {
                if sim.try_pickup()?.is_some() {
                    self.meals += 1;
                }
            }
            Goal::Sleep(_) => match sim.try_sleep()? {
                SleepVerdict::Allowed => self.naps += 1,
                _ => self.refused_naps += 1,
            },
            Goal::Talk(_) => {
                sim.talk()?;
                self.talked = true;
            }
            Goal::Idle => {}
        }
        Ok(())
    }

    fn choose(&mut self, sim: &Simulation, position: DVec3) -> Goal {
        let thirst = sim.vitals(VitalKind::Thirst);
        if thirst.is_warning() {
            self.drinking = true;
        } else if thirst.current() >= DRINK_UNTIL {
            self.drinking = false;
        }
        if self.drinking {
            if let Some((_, pond)) = sim.fixtures().water_sources.first() {
                return Goal::Drink(pond.position);
            }
        }

        let health = sim.vitals(VitalKind::Health);
        if health.current() < health.max() {
            let coconut = sim
                .world()
                .nearest(position, |e| e.kind == EntityKind::Coconut);
            if let Some(coconut) = coconut {
                return Goal::Eat(coconut.position);
            }
        }

        let energy = sim.vitals(VitalKind::Energy);
        let tired = energy.is_warning() || (sim.clock().is_night() && energy.fraction() < 0.6);
        if tired {
            if let Some((_, bed)) = sim.fixtures().beds.first() {
                return Goal::Sleep(bed.position);
            }
        }

        if !self.talked {
            if let Some(guide) = sim.fixtures().guides.first() {
                return Goal::Talk(guide.config.position);
            }
        }
        Goal::Idle
    }
}

fn step_towards(from: DVec3, to: DVec3, max_step: f64) -> DVec3 {
    let offset = to - from;
    let distance = offset.length();
    if distance <= max_step {
        to
    } else {
        from + offset / distance * max_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_towards_stops_at_target() {
        let to = DVec3::new(3.0, 0.0, 4.0);
        assert_eq!(step_towards(DVec3::ZERO, to, 10.0), to);
        let mid = step_towards(DVec3::ZERO, to, 2.5);
        assert!((mid.length() - 2.5).abs() < 1e-9);
    }
}
