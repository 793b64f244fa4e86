//! The settlement world: entity arenas, grids, and pools
//!
//! All simulation state lives in one [`World`] value that is passed by
//! reference into every system. There are no globals; a run is reproducible
//! from a `Parameters` value and a seed.

pub mod builder;
pub mod household;
pub mod parcel;
pub mod places;
pub mod resident;

use rand_chacha::ChaCha8Rng;

use crate::core::config::Parameters;
use crate::core::types::{
    BusinessId, HealthFacilityId, HomeId, HouseholdId, NodeId, ParcelId, ReligiousFacilityId,
    ResidentId, SchoolId, StructureId, Tick,
};
use crate::simulation::social::SocialNetwork;
use crate::spatial::path::RoadNetwork;
use crate::world::household::Household;
use crate::world::parcel::{Parcel, Structure};
use crate::world::places::{Business, HealthFacility, Home, ReligiousFacility, School};
use crate::world::resident::{Ethnicity, Resident};

/// The whole simulation state
pub struct World {
    pub params: Parameters,
    pub rng: ChaCha8Rng,
    pub current_tick: Tick,

    pub width: i32,
    pub height: i32,
    /// Dense row-major grid mapping each cell to its parcel
    land: Vec<ParcelId>,

    pub parcels: Vec<Parcel>,
    pub structures: Vec<Structure>,
    pub homes: Vec<Home>,
    pub businesses: Vec<Business>,
    pub schools: Vec<School>,
    pub health_facilities: Vec<HealthFacility>,
    pub religious_facilities: Vec<ReligiousFacility>,
    pub households: Vec<Household>,
    pub residents: Vec<Resident>,

    /// Homes not yet assigned to a household
    pub available_homes: Vec<HomeId>,
    /// Placed households grouped by ethnicity; seeds for homophily matching
    pub ethnic_households: Vec<Vec<HouseholdId>>,

    pub all_home_locations: Vec<ParcelId>,
    pub all_business_locations: Vec<ParcelId>,
    pub all_school_locations: Vec<ParcelId>,
    pub all_religious_locations: Vec<ParcelId>,
    pub all_water_points: Vec<ParcelId>,
    pub all_sanitation_points: Vec<ParcelId>,

    pub roads: RoadNetwork,
    /// Nearest road node per grid cell, filled by the builder flood fill
    pub closest_nodes: Vec<Option<NodeId>>,

    pub social: SocialNetwork,
}

impl World {
    /// An empty world of the configured dimensions; the builder populates it.
    pub fn new(params: Parameters, rng: ChaCha8Rng) -> Self {
        let width = params.width;
        let height = params.height;
        let cells = (width as usize) * (height as usize);
        Self {
            params,
            rng,
            current_tick: 0,
            width,
            height,
            land: Vec::with_capacity(cells),
            parcels: Vec::with_capacity(cells),
            structures: Vec::new(),
            homes: Vec::new(),
            businesses: Vec::new(),
            schools: Vec::new(),
            health_facilities: Vec::new(),
            religious_facilities: Vec::new(),
            households: Vec::new(),
            residents: Vec::new(),
            available_homes: Vec::new(),
            ethnic_households: vec![Vec::new(); Ethnicity::ALL.len()],
            all_home_locations: Vec::new(),
            all_business_locations: Vec::new(),
            all_school_locations: Vec::new(),
            all_religious_locations: Vec::new(),
            all_water_points: Vec::new(),
            all_sanitation_points: Vec::new(),
            roads: RoadNetwork::default(),
            closest_nodes: vec![None; cells],
            social: SocialNetwork::default(),
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    fn cell_index(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.in_bounds(x, y));
        (y as usize) * (self.width as usize) + (x as usize)
    }

    pub fn parcel_at(&self, x: i32, y: i32) -> ParcelId {
        self.land[self.cell_index(x, y)]
    }

    /// Used once by the builder while laying out the grid
    pub(crate) fn push_parcel_cell(&mut self, id: ParcelId) {
        self.land.push(id);
    }

    pub fn parcel(&self, id: ParcelId) -> &Parcel {
        &self.parcels[id.idx()]
    }

    pub fn parcel_mut(&mut self, id: ParcelId) -> &mut Parcel {
        &mut self.parcels[id.idx()]
    }

    pub fn is_road(&self, id: ParcelId) -> bool {
        self.parcels[id.idx()].road_id > 0
    }

    pub fn nearest_node(&self, parcel: ParcelId) -> Option<NodeId> {
        let loc = self.parcels[parcel.idx()].location;
        self.closest_nodes[self.cell_index(loc.x, loc.y)]
    }

    /// Parcel of the home a household lives in
    pub fn household_parcel(&self, id: HouseholdId) -> ParcelId {
        let home = self.households[id.idx()].home;
        self.home_parcel(home)
    }

    pub fn home_parcel(&self, id: HomeId) -> ParcelId {
        let structure = self.homes[id.idx()].structure;
        self.structures[structure.idx()].parcel
    }

    pub fn business_parcel(&self, id: BusinessId) -> ParcelId {
        self.structures[self.businesses[id.idx()].structure.idx()].parcel
    }

    pub fn school_parcel(&self, id: SchoolId) -> ParcelId {
        self.structures[self.schools[id.idx()].structure.idx()].parcel
    }

    pub fn health_facility_parcel(&self, id: HealthFacilityId) -> ParcelId {
        self.structures[self.health_facilities[id.idx()].structure.idx()].parcel
    }

    pub fn religious_facility_parcel(&self, id: ReligiousFacilityId) -> ParcelId {
        self.structures[self.religious_facilities[id.idx()].structure.idx()].parcel
    }

    /// Parcel the given resident's household lives on
    pub fn resident_home_parcel(&self, id: ResidentId) -> ParcelId {
        self.household_parcel(self.residents[id.idx()].household)
    }

    /// All parcels within Chebyshev distance `radius` of (x, y), excluding
    /// the center cell
    pub fn parcels_within(&self, x: i32, y: i32, radius: i32) -> Vec<ParcelId> {
        let mut found = Vec::new();
        for ny in (y - radius).max(0)..=(y + radius).min(self.height - 1) {
            for nx in (x - radius).max(0)..=(x + radius).min(self.width - 1) {
                if nx == x && ny == y {
                    continue;
                }
                found.push(self.parcel_at(nx, ny));
            }
        }
        found
    }

    /// Move a resident between parcels, keeping occupant lists consistent
    pub fn relocate_resident(&mut self, id: ResidentId, to: ParcelId) {
        let from = self.residents[id.idx()].position;
        if from == to {
            return;
        }
        let occupants = &mut self.parcels[from.idx()].residents;
        if let Some(pos) = occupants.iter().position(|&r| r == id) {
            occupants.swap_remove(pos);
        }
        self.parcels[to.idx()].residents.push(id);
        self.residents[id.idx()].position = to;
    }

    pub fn structure_on(&self, parcel: ParcelId) -> Option<StructureId> {
        self.parcels[parcel.idx()].structure
    }

    /// Schools hosted on a parcel
    pub fn schools_on(&self, parcel: ParcelId) -> Vec<SchoolId> {
        self.structure_on(parcel)
            .map(|s| self.structures[s.idx()].schools.clone())
            .unwrap_or_default()
    }

    pub fn businesses_on(&self, parcel: ParcelId) -> Vec<BusinessId> {
        self.structure_on(parcel)
            .map(|s| self.structures[s.idx()].businesses.clone())
            .unwrap_or_default()
    }

    pub fn health_facilities_on(&self, parcel: ParcelId) -> Vec<HealthFacilityId> {
        self.structure_on(parcel)
            .map(|s| self.structures[s.idx()].health_facilities.clone())
            .unwrap_or_default()
    }

    pub fn religious_facilities_on(&self, parcel: ParcelId) -> Vec<ReligiousFacilityId> {
        self.structure_on(parcel)
            .map(|s| self.structures[s.idx()].religious_facilities.clone())
            .unwrap_or_default()
    }

    pub fn homes_on(&self, parcel: ParcelId) -> Vec<HomeId> {
        self.structure_on(parcel)
            .map(|s| self.structures[s.idx()].homes.clone())
            .unwrap_or_default()
    }
}
