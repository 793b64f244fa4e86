//! Daily goal selection
//!
//! Each motive (work, school, job search, socializing, worship, water) is
//! eligible only inside its time window; eligible motives get a jittered
//! weight and the strongest one wins. Staying home is the default whenever
//! nothing else fires. Selection also carries the employment transitions
//! tied to the daily routine: laid-off and pulled-from-school residents
//! re-enter the labor market, and a small daily hazard lays workers off.

use rand::Rng;

use crate::core::time::{day_of_week, minute_of_day};
use crate::core::types::ResidentId;
use crate::simulation::{actions, budget};
use crate::world::resident::{Employer, Employment, Goal, Religion};
use crate::world::World;

/// Pick the resident's goal for the coming activity block. Runs when the
/// resident re-evaluates behavior at home.
pub fn select_goal(world: &mut World, id: ResidentId) -> Goal {
    let tick = world.current_tick;
    let minute = minute_of_day(tick);

    // daily windows, jittered per evaluation
    let (work_start, work_end, school_start, socialize_start, socialize_end) = {
        let rng = &mut world.rng;
        (
            60 * 8 + rng.gen_range(0..60 * 3),
            60 * 17 + rng.gen_range(0..60 * 2),
            60 * 7 + rng.gen_range(0..60 * 2),
            60 * 19 + rng.gen_range(0..60 * 2),
            60 * 21 + rng.gen_range(0..60 * 2),
        )
    };
    let work_time = minute >= work_start && minute <= work_end;
    // searching starts on the second day, giving the initially employed
    // first pick of the open positions
    let search_time = tick >= 1441 && work_time;
    let water_time = minute >= 60 * 7 && minute <= 60 * 18;
    let socialize_time = minute >= socialize_start && minute <= socialize_end;

    let old_goal = world.residents[id.idx()].goal;

    let mut w_school = 0.0;
    let mut w_work = 0.0;
    let mut w_socialize = 0.0;
    let mut w_search = 0.0;
    let mut w_religion = 0.0;

    // laid-off or pulled-from-school residents rejoin the labor market
    {
        let r = &mut world.residents[id.idx()];
        if r.employment == Employment::Inactive && (r.is_laid_off || r.left_school) && search_time {
            r.employment = Employment::Searching;
            w_search = 1.0;
        }
    }

    // the employed go to work; a daily hazard frees their slot for others
    if world.residents[id.idx()].is_employed() && work_time {
        if world.residents[id.idx()].employer.is_some() {
            w_work = 0.8 + 0.2 * world.rng.gen::<f64>();
            if world.rng.gen::<f64>() < world.params.probability_of_losing_employment {
                lay_off(world, id);
            }
        } else {
            // employed at initialization but not yet matched to an employer
            w_search = 1.0;
        }
    }

    if world.residents[id.idx()].employment == Employment::Searching && search_time {
        w_search = 1.0;
    }

    // school fires exactly at the morning start minute, weekdays only
    let school_time = minute == school_start && old_goal != Goal::GetAnEducation;
    let school_day = day_of_week(tick) < 6;
    let household = world.residents[id.idx()].household;
    let household_need = world.households[household.idx()].daily_discrepancy;

    if world.residents[id.idx()].school_eligible && school_day && school_time {
        let age = world.residents[id.idx()].age;
        if world.residents[id.idx()].school.is_some() {
            w_school = 0.8 + 0.2 * world.rng.gen::<f64>();
        } else if !world.residents[id.idx()].searched_for_school {
            if actions::find_schools(world, id).is_empty() {
                if household_need > 0.0 || age < 6 {
                    // the household can spare them; stay home
                } else {
                    world.residents[id.idx()].employment = Employment::Searching;
                    w_search = 0.8 + 0.2 * world.rng.gen::<f64>();
                }
            } else {
                w_school = 0.8 + 0.2 * world.rng.gen::<f64>();
            }
        } else {
            // searched before without luck; retry when the household can
            // afford it, otherwise keep hunting for a job
            if !actions::find_schools(world, id).is_empty() && household_need > 0.0 {
                w_school = 0.8 + 0.2 * world.rng.gen::<f64>();
            }
            if household_need < 0.0 && age > 5 {
                world.residents[id.idx()].employment = Employment::Searching;
                w_search = 0.8 + 0.2 * world.rng.gen::<f64>();
            }
        }
    }

    // worship: Christians on the seventh day, Muslims during prayer windows,
    // each at most once a week
    let church_day = day_of_week(tick) == 7;
    {
        let attended = world.residents[id.idx()].attended_religious_facility;
        let religion = world.residents[id.idx()].religion;
        if religion == Religion::Christian && church_day && !attended {
            if world.rng.gen::<f64>() < 0.8 {
                w_religion = 0.6 + 0.4 * world.rng.gen::<f64>();
                world.residents[id.idx()].attended_religious_facility = true;
            }
        }
        if religion == Religion::Muslim && !attended {
            let prayer_window = (minute > 60 * 5 && minute < 60 * 6)
                || (minute > 60 * 12 && minute < 60 * 14)
                || (minute > 60 * 15 && minute < 60 * 17);
            if prayer_window && world.rng.gen::<f64>() > 0.91 {
                w_religion = 0.6 + 0.4 * world.rng.gen::<f64>();
                world.residents[id.idx()].attended_religious_facility = true;
            }
        }
    }

    if world.residents[id.idx()].age > 5 && socialize_time && world.rng.gen::<f64>() < 0.5 {
        w_socialize = 1.0;
    }

    let w_home = if w_school == 0.0
        && w_work == 0.0
        && w_socialize == 0.0
        && w_religion == 0.0
        && w_search == 0.0
    {
        1.0
    } else {
        0.0
    };

    // fetching water competes only when someone is home to do it
    let needs_water = {
        let hh = &world.households[household.idx()];
        let home = &world.homes[hh.home.idx()];
        budget::need_water(hh, home, &world.params)
    };
    let w_water = if needs_water
        && old_goal == Goal::StayHome
        && world.residents[id.idx()].age > 15
        && water_time
    {
        1.0
    } else {
        0.0
    };

    // jitter and pick the strongest motive
    let mut activ = [0.0f64; 7];
    for slot in activ.iter_mut() {
        *slot = world.rng.gen();
    }
    for i in 0..activ.len() {
        let j = world.rng.gen_range(0..activ.len());
        if j != i {
            activ.swap(i, j);
        }
    }

    let gate = |open: bool| if open { 1.0 } else { 0.0 };
    let weights = [
        0.0,
        w_school * gate(school_time),
        w_work * activ[2] * gate(work_time),
        w_socialize * activ[3] * gate(socialize_time),
        w_search * activ[4] * gate(work_time),
        w_religion * activ[5],
        w_water * activ[6],
    ];

    let mut motive = 0;
    let mut best = weights[0];
    for (i, &w) in weights.iter().enumerate().skip(1) {
        if w > best {
            best = w;
            motive = i;
        }
    }
    if w_home == 1.0 {
        motive = 0;
    }

    let new_goal = match motive {
        1 => Goal::GetAnEducation,
        2 => Goal::GoToWork,
        3 => Goal::Socialize,
        4 => Goal::FindEmployment,
        5 => Goal::GoToChurch,
        6 => Goal::GetWater,
        _ => Goal::StayHome,
    };

    {
        let r = &mut world.residents[id.idx()];
        r.goal = new_goal;
        r.changed_goal = new_goal != old_goal;
    }
    new_goal
}

/// Remove the resident from their employer's roster and put them out of the
/// labor force for a day.
fn lay_off(world: &mut World, id: ResidentId) {
    let employer = world.residents[id.idx()].employer.take();
    match employer {
        Some(Employer::Business(b)) => remove_from(&mut world.businesses[b.idx()].employees, id),
        Some(Employer::School(s)) => remove_from(&mut world.schools[s.idx()].employees, id),
        Some(Employer::Health(h)) => remove_from(&mut world.health_facilities[h.idx()].employees, id),
        Some(Employer::Religious(r)) => {
            remove_from(&mut world.religious_facilities[r.idx()].employees, id)
        }
        None => {}
    }
    let r = &mut world.residents[id.idx()];
    r.employment = Employment::Inactive;
    r.income = 0.0;
    r.is_laid_off = true;
    tracing::debug!(resident = id.0, "laid off");
}

fn remove_from(roster: &mut Vec<ResidentId>, id: ResidentId) {
    if let Some(pos) = roster.iter().position(|&r| r == id) {
        roster.swap_remove(pos);
    }
}
