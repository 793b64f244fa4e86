//! Households: the economic unit sharing a home and a budget

use serde::{Deserialize, Serialize};

use crate::core::types::{HomeId, ResidentId, Tick};
use crate::world::resident::Ethnicity;

/// Whether the household had to adjust expenses this day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Adjustment {
    Decreased,
    Increased,
    Same,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    pub members: Vec<ResidentId>,
    pub home: HomeId,
    pub ethnicity: Ethnicity,

    /// Daily cost fields, recomputed at minute 0 of each day
    pub food_cost: f64,
    pub water_cost: f64,
    pub sanitation_cost: f64,
    pub charcoal_cost: f64,
    /// Daily electricity cost, fixed when the home is assigned
    pub electricity_cost: f64,

    /// Pre-adjustment baselines the restoration stages aim back toward
    pub desired_food_cost: f64,
    pub desired_sanitation_cost: f64,

    pub daily_income: f64,
    pub daily_expenditures: f64,
    /// income - expenditures, truncated to whole currency units
    pub daily_discrepancy: f64,

    pub adjustment: Adjustment,
    /// Set the first time a deficit forces students out of school
    pub removed_student_from_school: bool,
    /// Tick at which students were pulled from school
    pub time_left_school: Tick,

    /// Water stored at home, litres
    pub remaining_water: f64,
}

impl Household {
    pub fn new(home: HomeId, ethnicity: Ethnicity) -> Self {
        Self {
            members: Vec::new(),
            home,
            ethnicity,
            food_cost: 0.0,
            water_cost: 0.0,
            sanitation_cost: 0.0,
            charcoal_cost: 0.0,
            electricity_cost: 0.0,
            desired_food_cost: 0.0,
            desired_sanitation_cost: 0.0,
            daily_income: 0.0,
            daily_expenditures: 0.0,
            daily_discrepancy: 0.0,
            adjustment: Adjustment::Same,
            removed_student_from_school: false,
            time_left_school: 0,
            remaining_water: 0.0,
        }
    }
}
