//! Resident stepping: travel, arrival, and behavior re-evaluation
//!
//! The per-tick state machine: a resident at home with an expired staying
//! period picks a new goal and location; a traveling resident advances one
//! tile along an A*-computed road route (or straight toward the goal when no
//! route exists); a resident arriving at a non-home goal performs the
//! activity's side effects and turns back home once the staying period runs
//! out. A resident with no goal location freezes in place by design.

use rand::Rng;

use crate::core::time::{day_of_week, minute_of_day};
use crate::core::types::{ParcelId, ResidentId};
use crate::simulation::{actions, goals, identity};
use crate::spatial::path::astar_path;
use crate::world::resident::Goal;
use crate::world::World;

/// One simulation step for one resident
pub fn step_resident(world: &mut World, id: ResidentId) {
    let tick = world.current_tick;

    // the day's water is used at home, first thing in the morning
    if minute_of_day(tick) == 0 {
        let home = world.resident_home_parcel(id);
        if world.residents[id.idx()].position == home {
            actions::utilize_water(world, id);
        }
    }

    move_resident(world, id);

    if world.residents[id.idx()].heard_rumor {
        propagate_rumor(world, id);
    }

    // identity refresh runs once the first full day has passed, and only
    // when the goal actually changed
    if world.residents[id.idx()].changed_goal && tick >= 1441 {
        identity::update_identity(world, id);
    }

    // a new week resets weekly worship attendance
    if day_of_week(tick) == 1 {
        world.residents[id.idx()].attended_religious_facility = false;
    }
}

/// Advance the resident one tile toward its goal, re-evaluating behavior on
/// arrival
pub fn move_resident(world: &mut World, id: ResidentId) {
    let tick = world.current_tick;
    let is_stay = actions::should_stay(&world.residents[id.idx()], tick);

    // no destination: freeze in place
    let Some(goal_location) = world.residents[id.idx()].goal_location else {
        return;
    };
    let position = world.residents[id.idx()].position;

    if position == goal_location && is_stay {
        return;
    }

    if position == goal_location {
        // the staying period ran out: act, then decide what comes next
        actions::perform_action(world, id, goal_location);
        determine_behavior(world, id);
        world.residents[id.idx()].path = None;
    } else {
        let needs_route = world.residents[id.idx()]
            .path
            .as_ref()
            .map_or(true, |p| p.is_empty());
        if needs_route {
            world.residents[id.idx()].path = compute_route(world, position, goal_location);
        }
    }

    // re-read: arrival above may have replaced the goal
    let Some(goal_location) = world.residents[id.idx()].goal_location else {
        return;
    };
    let position = world.residents[id.idx()].position;

    let mut subgoal = goal_location;
    {
        let resident = &mut world.residents[id.idx()];
        if let Some(route) = resident.path.as_mut() {
            if route.first() == Some(&position) {
                route.remove(0);
            }
            match route.first() {
                Some(&next) => subgoal = next,
                None => resident.path = None,
            }
        }
    }

    let next = actions::next_tile(world, subgoal, position);
    world.relocate_resident(id, next);
}

/// Route between the road nodes nearest to the two parcels, with the literal
/// goal parcel appended. None degrades travel to direct stepping.
fn compute_route(world: &World, from: ParcelId, to: ParcelId) -> Option<Vec<ParcelId>> {
    let start = world.nearest_node(from)?;
    let goal = world.nearest_node(to)?;
    let nodes = astar_path(&world.roads, start, goal)?;
    let mut route: Vec<ParcelId> = nodes
        .iter()
        .map(|n| {
            let loc = world.roads.nodes[n.idx()].location;
            world.parcel_at(loc.x, loc.y)
        })
        .collect();
    route.push(to);
    Some(route)
}

/// The goal transition at activity boundaries: pick a fresh goal when at
/// home, turn home after finishing elsewhere.
pub fn determine_behavior(world: &mut World, id: ResidentId) {
    let home = world.resident_home_parcel(id);
    let position = world.residents[id.idx()].position;

    if position == home {
        let goal = goals::select_goal(world, id);
        let location = actions::best_activity_location(world, id, home, goal);
        let stay_until = actions::staying_period(world, id, goal);
        let resident = &mut world.residents[id.idx()];
        resident.goal_location = location;
        resident.stay_until = stay_until;
        return;
    }

    if world.residents[id.idx()].goal_location == Some(position) && position != home {
        let stay_until = actions::staying_period(world, id, Goal::StayHome);
        let resident = &mut world.residents[id.idx()];
        resident.goal_location = Some(home);
        resident.goal = Goal::StayHome;
        resident.stay_until = stay_until;
        return;
    }

    world.residents[id.idx()].goal_location = Some(home);
}

/// Pass the rumor to one random member of the home parcel's crowd
fn propagate_rumor(world: &mut World, id: ResidentId) {
    let home = world.resident_home_parcel(id);
    let occupants = world.parcels[home.idx()].residents.clone();
    if occupants.is_empty() {
        return;
    }
    let pick = occupants[world.rng.gen_range(0..occupants.len())];
    world.residents[pick.idx()].heard_rumor = true;
}
