//! Simulation parameters
//!
//! Every model constant lives here so a run is fully described by one
//! `Parameters` value plus a seed. Defaults reproduce the survey-calibrated
//! settlement parameterization; any field can be overridden from a TOML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    // === WORLD ===
    /// Grid width in parcels
    pub width: i32,
    /// Grid height in parcels
    pub height: i32,
    /// Number of named neighborhoods the buildable area is tiled into
    pub num_neighborhoods: u32,
    /// Road lattice spacing in parcels
    pub road_spacing: i32,
    /// Unbuildable margin around the grid edge, in parcels
    pub edge_margin: i32,
    /// Chance a structure contains homes
    pub home_structure_probability: f64,
    /// Homes added to a structure that has any
    pub homes_per_structure: u32,
    /// Chance a structure contains businesses
    pub business_structure_probability: f64,
    /// Businesses added to a structure that has any
    pub businesses_per_structure: u32,
    /// Facility counts placed by the world builder
    pub num_schools: u32,
    pub num_health_facilities: u32,
    pub num_religious_facilities: u32,
    pub num_water_points: u32,
    pub num_sanitation_points: u32,

    // === POPULATION ===
    /// Number of residents the initializer aims for
    pub target_residents: usize,
    /// Household size is log-normal with this mean/stdev (untransformed)
    pub household_size_mean: f64,
    pub household_size_stdev: f64,
    /// Fraction of residents that are male
    pub male_fraction: f64,
    /// Probability mass over the twelve ethnic groups, in `Ethnicity` order
    pub ethnic_distribution: Vec<f64>,
    /// Religion shares; the remainder after Christian + Muslim is Other
    pub religion_christian: f64,
    pub religion_muslim: f64,
    /// Share of non-head residents that are adults
    pub age_adult_share: f64,
    /// Share of non-head residents under six
    pub age_under6_share: f64,
    /// Share of the total population under six (cannot be employed)
    pub share_under6: f64,
    /// Employment rates by gender, before informal/formal split and
    /// under-six renormalization
    pub female_working: f64,
    pub female_searching: f64,
    pub female_inactive: f64,
    pub female_unknown: f64,
    pub male_working: f64,
    pub male_searching: f64,
    pub male_inactive: f64,
    pub male_unknown: f64,
    /// Proportion of jobs in the informal sector
    pub informality_index: f64,
    /// School-eligible girls/boys divert into informal work with this base
    /// probability (scaled by the informality index) and end up inactive
    pub school_redirect_female: f64,
    pub school_redirect_male: f64,

    // === HOUSING ===
    /// Probability mass over the monthly rent brackets
    pub rent_distribution: Vec<f64>,
    /// Monthly rent bracket bases; a home pays base + uniform(0, base)
    pub rent_brackets: Vec<f64>,
    /// Probability a home has piped water / electricity / private sanitation
    pub probability_water: f64,
    pub probability_electricity: f64,
    pub probability_sanitation: f64,
    /// Monthly electricity cost range for electrified homes
    pub min_electric_cost: f64,
    pub max_electric_cost: f64,
    /// Expected monthly cost of piped running water
    pub running_water_monthly_cost: f64,
    /// Share of income a household is willing to spend on housing
    pub percent_income_for_rent: f64,
    /// Weight given to living near same-ethnicity neighbors; 0 disables
    /// homophily matching entirely
    pub like_neighbor_preference: f64,
    /// Radius (in parcels) of the neighborhood scanned around a
    /// same-ethnicity seed household
    pub neighborhood_radius: i32,

    // === DAILY COSTS ===
    /// Cost of one meal for one person
    pub food_cost: f64,
    /// Cost of one public sanitation visit
    pub sanitation_cost: f64,
    /// Cost of one day of charcoal
    pub charcoal_cost: f64,
    /// Daily cost range of a 20-litre water barrel
    pub min_water_cost: f64,
    pub max_water_cost: f64,
    /// Per-person daily water requirement range, litres
    pub min_water_requirement: i32,
    pub max_water_requirement: i32,

    // === EMPLOYMENT & INCOME ===
    /// Daily chance an employed resident loses their job
    pub probability_of_losing_employment: f64,
    /// Vision radius (parcels) when searching for a school
    pub school_vision: i32,
    /// Vision radius (parcels) when searching for an employer
    pub employment_vision: i32,
    /// School student capacity as a share of the resident target
    pub school_capacity_share: f64,
    /// Employee capacity shares for formal and informal employers
    pub formal_capacity_share: f64,
    pub informal_capacity_share: f64,
    /// Mean monthly income by employment stream, feeding the Lorenz draw
    pub formal_mean_income: f64,
    pub informal_mean_income: f64,

    // === UNREST ===
    /// Share of residents that initially hear the rumor
    pub rumor_share: f64,
    /// Share of initial rumor-hearers that start as rebels
    pub initial_rebel_share: f64,
    /// A resident whose aggression value is under this may rebel
    pub aggression_threshold: f64,
    /// Shape of the aggression logistic; higher is slower to aggress
    pub aggression_rate: f64,
    /// Assign every resident the same aggression rate
    pub uniform_aggression_rate: bool,
    /// Parcel where rebels congregate (jittered per resident)
    pub rally_point: (i32, i32),
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            width: 120,
            height: 90,
            num_neighborhoods: 15,
            road_spacing: 8,
            edge_margin: 1,
            home_structure_probability: 0.86,
            homes_per_structure: 5,
            business_structure_probability: 0.13,
            businesses_per_structure: 3,
            num_schools: 12,
            num_health_facilities: 6,
            num_religious_facilities: 10,
            num_water_points: 20,
            num_sanitation_points: 15,

            target_residents: 3000,
            household_size_mean: 3.55,
            household_size_stdev: 1.61,
            male_fraction: 0.613,
            ethnic_distribution: vec![
                0.21, 0.14, 0.12, 0.12, 0.12, 0.06, 0.05, 0.05, 0.02, 0.01, 0.01, 0.09,
            ],
            religion_christian: 0.825,
            religion_muslim: 0.111,
            age_adult_share: 0.25,
            age_under6_share: 0.32,
            share_under6: 0.21,
            female_working: 0.41,
            female_searching: 0.096,
            female_inactive: 0.431,
            female_unknown: 0.063,
            male_working: 0.6,
            male_searching: 0.079,
            male_inactive: 0.271,
            male_unknown: 0.05,
            informality_index: 0.6,
            school_redirect_female: 0.41,
            school_redirect_male: 0.6,

            rent_distribution: vec![
                0.0089, 0.0644, 0.1733, 0.1867, 0.2022, 0.1033, 0.0867, 0.0344, 0.0233, 0.0178,
                0.0133, 0.0089, 0.0067, 0.0022, 0.0122, 0.0033, 0.0011, 0.0033, 0.0011, 0.0022,
                0.0011, 0.0011, 0.0011, 0.0011, 0.0011, 0.0392,
            ],
            rent_brackets: vec![
                200.0, 400.0, 600.0, 800.0, 1000.0, 1200.0, 1400.0, 1600.0, 1800.0, 2000.0, 2200.0,
                2400.0, 2600.0, 2800.0, 3000.0, 3200.0, 3400.0, 3600.0, 3800.0, 4000.0, 4200.0,
                4400.0, 4600.0, 4800.0, 5000.0, 5200.0,
            ],
            probability_water: 0.014,
            probability_electricity: 0.6329,
            probability_sanitation: 0.0274,
            min_electric_cost: 200.0,
            max_electric_cost: 400.0,
            running_water_monthly_cost: 0.0,
            percent_income_for_rent: 0.8,
            like_neighbor_preference: 0.5,
            neighborhood_radius: 1,

            food_cost: 30.0,
            sanitation_cost: 5.0,
            charcoal_cost: 10.0,
            min_water_cost: 5.0,
            max_water_cost: 10.0,
            min_water_requirement: 4,
            max_water_requirement: 20,

            probability_of_losing_employment: 0.01,
            school_vision: 35,
            employment_vision: 70,
            school_capacity_share: 0.0007,
            formal_capacity_share: 0.00006,
            informal_capacity_share: 0.00002,
            formal_mean_income: 12_000.0,
            informal_mean_income: 4_000.0,

            rumor_share: 0.1,
            initial_rebel_share: 0.5,
            aggression_threshold: 0.6,
            aggression_rate: 0.6,
            uniform_aggression_rate: true,
            rally_point: (60, 45),
        }
    }
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load parameters from a TOML file; missing fields keep their defaults.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: Parameters = toml::from_str(&text)?;
        Ok(params)
    }

    /// School student capacity derived from the resident target
    pub fn school_capacity(&self) -> u32 {
        ((self.school_capacity_share * self.target_residents as f64) as u32).max(1)
    }

    /// Employee capacity bound for formal employers
    pub fn formal_business_capacity(&self) -> u32 {
        (self.formal_capacity_share * self.target_residents as f64) as u32
    }

    /// Employee capacity bound for informal businesses
    pub fn informal_business_capacity(&self) -> u32 {
        (self.informal_capacity_share * self.target_residents as f64) as u32
    }

    /// Fail fast on a malformed parameterization.
    ///
    /// Draws from a distribution whose mass does not sum to one would be
    /// silently biased, so these are startup errors rather than warnings.
    pub fn validate(&self) -> Result<()> {
        fn check_sum(name: &str, dist: &[f64]) -> Result<()> {
            if dist.is_empty() {
                return Err(SimError::Config(format!("{name} is empty")));
            }
            if dist.iter().any(|&p| p < 0.0) {
                return Err(SimError::Config(format!("{name} has negative mass")));
            }
            let sum: f64 = dist.iter().sum();
            if (sum - 1.0).abs() > 1e-6 {
                return Err(SimError::Config(format!(
                    "{name} sums to {sum:.6}, expected 1.0"
                )));
            }
            Ok(())
        }

        check_sum("ethnic_distribution", &self.ethnic_distribution)?;
        if self.ethnic_distribution.len() != crate::world::resident::Ethnicity::ALL.len() {
            return Err(SimError::Config(format!(
                "ethnic_distribution has {} entries, expected {}",
                self.ethnic_distribution.len(),
                crate::world::resident::Ethnicity::ALL.len()
            )));
        }
        check_sum("rent_distribution", &self.rent_distribution)?;
        if self.rent_distribution.len() != self.rent_brackets.len() {
            return Err(SimError::Config(format!(
                "rent_distribution has {} entries but rent_brackets has {}",
                self.rent_distribution.len(),
                self.rent_brackets.len()
            )));
        }
        if self.religion_christian + self.religion_muslim > 1.0 {
            return Err(SimError::Config(
                "religion shares exceed 1.0".to_string(),
            ));
        }
        if self.age_adult_share + self.age_under6_share > 1.0 {
            return Err(SimError::Config("age mixture shares exceed 1.0".to_string()));
        }

        for (name, v) in [
            ("food_cost", self.food_cost),
            ("sanitation_cost", self.sanitation_cost),
            ("charcoal_cost", self.charcoal_cost),
            ("formal_mean_income", self.formal_mean_income),
            ("informal_mean_income", self.informal_mean_income),
        ] {
            if v <= 0.0 {
                return Err(SimError::Config(format!("{name} must be positive, got {v}")));
            }
        }
        if self.min_water_cost >= self.max_water_cost {
            return Err(SimError::Config(format!(
                "min_water_cost ({}) must be below max_water_cost ({})",
                self.min_water_cost, self.max_water_cost
            )));
        }
        if self.min_electric_cost >= self.max_electric_cost {
            return Err(SimError::Config(format!(
                "min_electric_cost ({}) must be below max_electric_cost ({})",
                self.min_electric_cost, self.max_electric_cost
            )));
        }
        if self.min_water_requirement >= self.max_water_requirement {
            return Err(SimError::Config(
                "min_water_requirement must be below max_water_requirement".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.percent_income_for_rent) || self.percent_income_for_rent == 0.0
        {
            return Err(SimError::Config(format!(
                "percent_income_for_rent must be in (0, 1], got {}",
                self.percent_income_for_rent
            )));
        }
        if self.width <= 2 * self.edge_margin || self.height <= 2 * self.edge_margin {
            return Err(SimError::Config(format!(
                "grid {}x{} leaves no buildable interior inside margin {}",
                self.width, self.height, self.edge_margin
            )));
        }
        if self.road_spacing < 2 {
            return Err(SimError::Config(format!(
                "road_spacing must be at least 2, got {}",
                self.road_spacing
            )));
        }
        if self.household_size_mean <= 0.0 || self.household_size_stdev <= 0.0 {
            return Err(SimError::Config(
                "household size distribution must have positive mean and stdev".to_string(),
            ));
        }
        Ok(())
    }
}
