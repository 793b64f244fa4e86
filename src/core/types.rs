//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation tick counter (1 tick = 1 minute of simulated time)
pub type Tick = u64;

macro_rules! index_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(id: u32) -> Self {
                Self(id)
            }

            /// Position of the referenced record in its arena
            pub fn idx(self) -> usize {
                self.0 as usize
            }
        }
    };
}

index_id!(
    /// Unique identifier for a grid parcel
    ParcelId
);
index_id!(
    /// Unique identifier for a structure
    StructureId
);
index_id!(
    /// Unique identifier for a home
    HomeId
);
index_id!(
    /// Unique identifier for a business
    BusinessId
);
index_id!(
    /// Unique identifier for a school
    SchoolId
);
index_id!(
    /// Unique identifier for a health facility
    HealthFacilityId
);
index_id!(
    /// Unique identifier for a religious facility
    ReligiousFacilityId
);
index_id!(
    /// Unique identifier for a household
    HouseholdId
);
index_id!(
    /// Unique identifier for a resident
    ResidentId
);
index_id!(
    /// Unique identifier for a road-network node
    NodeId
);

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two grid points
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}
