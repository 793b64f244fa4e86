//! Parcels and structures

use serde::{Deserialize, Serialize};

use crate::core::types::{
    BusinessId, GridPoint, HealthFacilityId, HomeId, ParcelId, ReligiousFacilityId, ResidentId,
    SchoolId, StructureId,
};

/// A grid cell of land, the atomic spatial unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parcel {
    pub id: ParcelId,
    pub location: GridPoint,
    /// Neighborhood the parcel belongs to; 0 means unbuildable ground
    pub neighborhood: u32,
    /// Road class crossing this parcel; 0 means no road
    pub road_id: i32,
    /// Structure occupying the parcel, at most one
    pub structure: Option<StructureId>,
    /// Residents currently standing on the parcel
    pub residents: Vec<ResidentId>,
}

impl Parcel {
    pub fn new(id: ParcelId, location: GridPoint, neighborhood: u32) -> Self {
        Self {
            id,
            location,
            neighborhood,
            road_id: 0,
            structure: None,
            residents: Vec::new(),
        }
    }

    pub fn is_buildable(&self) -> bool {
        self.neighborhood > 0
    }

    pub fn is_occupied(&self) -> bool {
        self.structure.is_some()
    }
}

/// A building on a parcel, holding homes, businesses, and facilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Structure {
    pub parcel: ParcelId,
    pub homes: Vec<HomeId>,
    pub businesses: Vec<BusinessId>,
    pub schools: Vec<SchoolId>,
    pub health_facilities: Vec<HealthFacilityId>,
    pub religious_facilities: Vec<ReligiousFacilityId>,
    pub home_capacity: u32,
    pub business_capacity: u32,
}

impl Structure {
    pub fn new(parcel: ParcelId) -> Self {
        Self {
            parcel,
            ..Default::default()
        }
    }
}
