//! Identity standard, energy, and aggression
//!
//! Invoked from the resident step when the goal changed, after the first
//! full simulated day. Identity follows what the resident actually managed
//! to do (work, attend school, keep house); an unmet standard drains the
//! energy reservoir, and a depleted reservoir pushes the aggression value
//! under the rebellion threshold. Rumor-hearers with rebel contacts can be
//! tipped into rebellion.

use rand::Rng;

use crate::core::types::ResidentId;
use crate::world::resident::{Employment, Goal, Identity};
use crate::world::World;

/// Aggression as a logistic of the energy reservoir. Low energy pulls the
/// value under the threshold; a higher rate flattens the curve, making the
/// resident slower to aggress.
pub fn aggression_value(energy: f64, rate: f64) -> f64 {
    let rate = rate.max(f64::MIN_POSITIVE);
    1.0 / (1.0 + (-(energy - 50.0) / (10.0 * rate)).exp())
}

/// Re-evaluate the resident's identity standard and its consequences
pub fn update_identity(world: &mut World, id: ResidentId) {
    let standard_met;
    {
        let r = &mut world.residents[id.idx()];
        if r.age < 6 {
            r.identity = Identity::DomesticActivities;
            standard_met = true;
        } else if r.is_initial_rebel {
            r.identity = Identity::Rebel;
            standard_met = true;
        } else if r.is_employed() {
            r.identity = Identity::Employer;
            standard_met = true;
        } else if r.school.is_some() {
            r.identity = Identity::Student;
            standard_met = true;
        } else if r.searched_for_school {
            // wanted schooling, found none
            r.identity = Identity::DomesticActivities;
            standard_met = false;
        } else if r.employment == Employment::Searching {
            // wants employment, has none
            r.identity = Identity::DomesticActivities;
            standard_met = false;
        } else if r.employment == Employment::Inactive {
            r.identity = Identity::DomesticActivities;
            standard_met = true;
        } else {
            // has not yet tried for school or work; content for now
            standard_met = true;
        }
    }

    // energy drifts toward 100 while the standard is met, toward 0 while
    // it is not
    let drift = world.rng.gen_range(0..10) as f64;
    {
        let r = &mut world.residents[id.idx()];
        r.energy = if standard_met {
            (r.energy + drift).min(100.0)
        } else {
            (r.energy - drift).max(0.0)
        };
    }

    if !world.residents[id.idx()].heard_rumor {
        return;
    }

    let value = {
        let r = &world.residents[id.idx()];
        aggression_value(r.energy, r.aggression_rate)
    };
    world.residents[id.idx()].aggression_value = value;

    let (age, identity) = {
        let r = &world.residents[id.idx()];
        (r.age, r.identity)
    };
    if value < world.params.aggression_threshold && age > 5 && identity != Identity::Rebel {
        let contacts = world.social.contacts(id);
        let total: f64 = contacts.iter().map(|(_, w)| w.max(0.0)).sum();
        let rebel_weight: f64 = contacts
            .iter()
            .filter(|(contact, _)| world.residents[contact.idx()].identity == Identity::Rebel)
            .map(|(_, w)| w.max(0.0))
            .sum();
        if rebel_weight > 0.0 && total > 0.0 {
            let influenced = world.rng.gen::<f64>() < rebel_weight / total;
            if influenced {
                let r = &mut world.residents[id.idx()];
                r.identity = Identity::Rebel;
                r.goal = Goal::Rebel;
                tracing::debug!(resident = id.0, "influenced to rebel");
            }
        }
    }
}
