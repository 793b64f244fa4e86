//! Homes, businesses, and facilities hosted by structures

use serde::{Deserialize, Serialize};

use crate::core::types::{HouseholdId, ResidentId, StructureId};

/// A dwelling unit, occupied by at most one household
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Home {
    pub structure: StructureId,
    pub monthly_rent: f64,
    pub has_water: bool,
    pub has_electricity: bool,
    pub has_sanitation: bool,
    /// Expected monthly electricity bill, zero when not electrified
    pub expected_electricity_cost: f64,
    /// Expected monthly piped-water bill, zero without running water
    pub expected_water_cost: f64,
    /// Occupying household; None keeps the home in the available pool
    pub household: Option<HouseholdId>,
}

impl Home {
    /// Monthly cost a prospective tenant compares against their income
    pub fn expected_housing_cost(&self) -> f64 {
        self.monthly_rent + self.expected_electricity_cost + self.expected_water_cost
    }

    pub fn is_occupied(&self) -> bool {
        self.household.is_some()
    }
}

/// An informal business employing residents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub structure: StructureId,
    pub employee_capacity: u32,
    pub employees: Vec<ResidentId>,
}

impl Business {
    pub fn employee_capacity_reached(&self) -> bool {
        self.employees.len() as u32 >= self.employee_capacity
    }
}

/// A school with a student roster and formal staff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub structure: StructureId,
    pub student_capacity: u32,
    pub students: Vec<ResidentId>,
    pub employee_capacity: u32,
    pub employees: Vec<ResidentId>,
}

impl School {
    pub fn student_capacity_reached(&self) -> bool {
        self.students.len() as u32 >= self.student_capacity
    }

    pub fn employee_capacity_reached(&self) -> bool {
        self.employees.len() as u32 >= self.employee_capacity
    }
}

/// A clinic or hospital offering formal employment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthFacility {
    pub structure: StructureId,
    pub employee_capacity: u32,
    pub employees: Vec<ResidentId>,
}

impl HealthFacility {
    pub fn employee_capacity_reached(&self) -> bool {
        self.employees.len() as u32 >= self.employee_capacity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReligiousFacilityKind {
    Church,
    Mosque,
}

/// A church or mosque; a weekly destination and a formal employer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReligiousFacility {
    pub structure: StructureId,
    pub kind: ReligiousFacilityKind,
    pub employee_capacity: u32,
    pub employees: Vec<ResidentId>,
}

impl ReligiousFacility {
    pub fn employee_capacity_reached(&self) -> bool {
        self.employees.len() as u32 >= self.employee_capacity
    }
}
