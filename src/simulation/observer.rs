//! Pull-based aggregate counts
//!
//! External loggers query these tallies once per tick; nothing is pushed.

use serde::Serialize;

use crate::simulation::budget;
use crate::world::resident::{Employer, Employment, Goal, Identity};
use crate::world::World;

/// Per-tick census of the population, indexed by the enum orderings in
/// `world::resident`
#[derive(Debug, Default, Clone, Serialize)]
pub struct WorldCounts {
    /// Residents per current goal, in `Goal::ALL` order
    pub goals: [usize; 8],
    /// Residents per identity, in `Identity::ALL` order
    pub identities: [usize; 4],
    /// Residents per employment status, in `Employment::ALL` order
    pub employment: [usize; 4],
    /// Residents employed at a business / school / health facility /
    /// religious facility
    pub employer_kinds: [usize; 4],
    /// Employed residents with no employer inside the settlement
    pub employed_outside: usize,
    /// Households per happiness level (0 unhappy, 1 semi-happy, 2 happy)
    pub happiness: [usize; 3],
    pub residents: usize,
    pub households: usize,
}

impl WorldCounts {
    pub fn collect(world: &World) -> Self {
        let mut counts = WorldCounts {
            residents: world.residents.len(),
            households: world.households.len(),
            ..Default::default()
        };

        for resident in &world.residents {
            counts.goals[resident.goal.index()] += 1;
            counts.identities[resident.identity.index()] += 1;
            counts.employment[resident.employment.index()] += 1;
            match resident.employer {
                Some(Employer::Business(_)) => counts.employer_kinds[0] += 1,
                Some(Employer::School(_)) => counts.employer_kinds[1] += 1,
                Some(Employer::Health(_)) => counts.employer_kinds[2] += 1,
                Some(Employer::Religious(_)) => counts.employer_kinds[3] += 1,
                None => {
                    if matches!(
                        resident.employment,
                        Employment::Formal | Employment::Informal
                    ) {
                        counts.employed_outside += 1;
                    }
                }
            }
        }

        for hh in &world.households {
            counts.happiness[budget::happiness(hh) as usize] += 1;
        }

        counts
    }

    /// Residents currently intending a goal
    pub fn with_goal(&self, goal: Goal) -> usize {
        self.goals[goal.index()]
    }

    pub fn with_identity(&self, identity: Identity) -> usize {
        self.identities[identity.index()]
    }

    pub fn with_employment(&self, employment: Employment) -> usize {
        self.employment[employment.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Parameters;
    use crate::simulation::population::build_population;
    use crate::world::builder::build_world;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_counts_partition_the_population() {
        let mut params = Parameters::default();
        params.width = 50;
        params.height = 50;
        params.target_residents = 300;
        let mut world = build_world(params, ChaCha8Rng::seed_from_u64(71));
        build_population(&mut world);

        let counts = WorldCounts::collect(&world);
        assert_eq!(counts.residents, world.residents.len());
        assert_eq!(counts.goals.iter().sum::<usize>(), counts.residents);
        assert_eq!(counts.identities.iter().sum::<usize>(), counts.residents);
        assert_eq!(counts.employment.iter().sum::<usize>(), counts.residents);
        assert_eq!(counts.happiness.iter().sum::<usize>(), counts.households);
    }
}
