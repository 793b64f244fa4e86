//! Residents and their demographic/behavioral attributes

use serde::{Deserialize, Serialize};

use crate::core::types::{
    BusinessId, HealthFacilityId, HouseholdId, ParcelId, ReligiousFacilityId, ResidentId, SchoolId,
    Tick,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// A resident's intended daily activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Goal {
    FindEmployment,
    GoToWork,
    GetAnEducation,
    StayHome,
    Socialize,
    GoToChurch,
    GetWater,
    Rebel,
}

impl Goal {
    pub const ALL: [Goal; 8] = [
        Goal::FindEmployment,
        Goal::GoToWork,
        Goal::GetAnEducation,
        Goal::StayHome,
        Goal::Socialize,
        Goal::GoToChurch,
        Goal::GetWater,
        Goal::Rebel,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&g| g == self).unwrap()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Employment {
    Formal,
    Informal,
    Searching,
    Inactive,
}

impl Employment {
    pub const ALL: [Employment; 4] = [
        Employment::Formal,
        Employment::Informal,
        Employment::Searching,
        Employment::Inactive,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&e| e == self).unwrap()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity {
    Student,
    Employer,
    DomesticActivities,
    Rebel,
}

impl Identity {
    pub const ALL: [Identity; 4] = [
        Identity::Student,
        Identity::Employer,
        Identity::DomesticActivities,
        Identity::Rebel,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&i| i == self).unwrap()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Religion {
    Christian,
    Muslim,
    Other,
}

/// The twelve ethnic groups of the settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ethnicity {
    Kikuyu,
    Luhya,
    Luo,
    Kalenjin,
    Kamba,
    Kisii,
    Meru,
    Mijikenda,
    Maasai,
    Turkana,
    Embu,
    Other,
}

impl Ethnicity {
    pub const ALL: [Ethnicity; 12] = [
        Ethnicity::Kikuyu,
        Ethnicity::Luhya,
        Ethnicity::Luo,
        Ethnicity::Kalenjin,
        Ethnicity::Kamba,
        Ethnicity::Kisii,
        Ethnicity::Meru,
        Ethnicity::Mijikenda,
        Ethnicity::Maasai,
        Ethnicity::Turkana,
        Ethnicity::Embu,
        Ethnicity::Other,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&e| e == self).unwrap()
    }
}

/// Where a resident works; at most one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Employer {
    Business(BusinessId),
    School(SchoolId),
    Health(HealthFacilityId),
    Religious(ReligiousFacilityId),
}

/// An individual agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resident {
    pub id: ResidentId,
    pub household: HouseholdId,
    pub age: u32,
    pub gender: Gender,
    pub ethnicity: Ethnicity,
    pub religion: Religion,
    pub employment: Employment,
    pub identity: Identity,
    pub goal: Goal,
    pub position: ParcelId,
    /// Parcel the resident is heading to; None freezes movement
    pub goal_location: Option<ParcelId>,
    pub school: Option<SchoolId>,
    pub searched_for_school: bool,
    pub employer: Option<Employer>,
    /// Monthly income
    pub income: f64,
    pub is_head_of_household: bool,
    pub school_eligible: bool,
    /// Energy reservoir in [0, 100]
    pub energy: f64,
    pub aggression_rate: f64,
    pub aggression_value: f64,
    pub heard_rumor: bool,
    pub is_laid_off: bool,
    pub left_school: bool,
    pub attended_religious_facility: bool,
    pub changed_goal: bool,
    pub is_initial_rebel: bool,
    /// Absolute tick until which the resident stays at its activity
    pub stay_until: Tick,
    /// Cached route toward the current goal
    pub path: Option<Vec<ParcelId>>,
}

impl Resident {
    /// A resident with neutral demographics, placed on a parcel. The
    /// population initializer overwrites the demographic fields.
    pub fn new(id: ResidentId, household: HouseholdId, position: ParcelId) -> Self {
        Self {
            id,
            household,
            age: 0,
            gender: Gender::Female,
            ethnicity: Ethnicity::Other,
            religion: Religion::Other,
            employment: Employment::Inactive,
            identity: Identity::DomesticActivities,
            goal: Goal::StayHome,
            position,
            goal_location: None,
            school: None,
            searched_for_school: false,
            employer: None,
            income: 0.0,
            is_head_of_household: false,
            school_eligible: false,
            energy: 100.0,
            aggression_rate: 0.0,
            aggression_value: 0.0,
            heard_rumor: false,
            is_laid_off: false,
            left_school: false,
            attended_religious_facility: false,
            changed_goal: true,
            is_initial_rebel: false,
            stay_until: 0,
            path: None,
        }
    }

    pub fn is_employed(&self) -> bool {
        matches!(self.employment, Employment::Formal | Employment::Informal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_indices_are_dense() {
        for (i, g) in Goal::ALL.iter().enumerate() {
            assert_eq!(g.index(), i);
        }
        for (i, e) in Employment::ALL.iter().enumerate() {
            assert_eq!(e.index(), i);
        }
        for (i, e) in Ethnicity::ALL.iter().enumerate() {
            assert_eq!(e.index(), i);
        }
    }

    #[test]
    fn test_new_resident_defaults() {
        let r = Resident::new(ResidentId(3), HouseholdId(1), ParcelId(9));
        assert_eq!(r.goal, Goal::StayHome);
        assert!(r.changed_goal);
        assert_eq!(r.energy, 100.0);
        assert!(r.goal_location.is_none());
    }
}
