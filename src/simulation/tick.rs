//! Tick orchestration
//!
//! Single-threaded, sequential stepping with a documented phase order:
//! at minute 0 of each day every household runs its budget pass, in
//! creation order, BEFORE any resident steps; then every resident steps,
//! in creation order. Residents therefore always see their household's
//! same-day budget, and later-created agents observe updates made by
//! earlier ones within the same tick. Code that reads same-tick state
//! relies on this ordering.

use crate::core::time::minute_of_day;
use crate::core::types::{HouseholdId, ResidentId};
use crate::simulation::{budget, movement};
use crate::world::World;

/// Advance the simulation by one tick (one simulated minute)
pub fn run_tick(world: &mut World) {
    let tick = world.current_tick;

    if minute_of_day(tick) == 0 {
        for i in 0..world.households.len() {
            budget::step_household(world, HouseholdId(i as u32));
        }
    }

    for i in 0..world.residents.len() {
        movement::step_resident(world, ResidentId(i as u32));
    }

    world.current_tick += 1;
}

/// Run a fixed number of ticks
pub fn run_ticks(world: &mut World, ticks: u64) {
    for _ in 0..ticks {
        run_tick(world);
    }
}
