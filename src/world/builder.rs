//! Synthetic settlement topology
//!
//! Builds the immutable world the simulation runs on: a neighborhood-tiled
//! land grid, a road lattice registered both per-parcel and as a node graph,
//! structures with homes and businesses, facilities, and the
//! nearest-road-node map. The population initializer fills it with people.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::Parameters;
use crate::core::types::{GridPoint, HomeId, ParcelId, StructureId};
use crate::spatial::path::nearest_road_nodes;
use crate::world::parcel::{Parcel, Structure};
use crate::world::places::{
    Business, HealthFacility, Home, ReligiousFacility, ReligiousFacilityKind, School,
};
use crate::world::World;

/// Build a settlement from scratch. Deterministic for a given seed.
pub fn build_world(params: Parameters, rng: ChaCha8Rng) -> World {
    let mut world = World::new(params, rng);

    lay_out_parcels(&mut world);
    lay_out_roads(&mut world);
    add_structures(&mut world);
    add_facilities(&mut world);
    add_water_and_sanitation(&mut world);

    let closest = {
        let World {
            roads, rng, width, height, ..
        } = &mut world;
        nearest_road_nodes(*width, *height, roads, rng)
    };
    world.closest_nodes = closest;

    tracing::info!(
        parcels = world.parcels.len(),
        structures = world.structures.len(),
        homes = world.homes.len(),
        businesses = world.businesses.len(),
        schools = world.schools.len(),
        road_nodes = world.roads.nodes.len(),
        "world built"
    );

    world
}

/// Tile the buildable interior into rectangular neighborhoods; the margin
/// ring stays unbuildable (neighborhood 0).
fn lay_out_parcels(world: &mut World) {
    let margin = world.params.edge_margin;
    let n = world.params.num_neighborhoods.max(1);
    let rows = (n as f64).sqrt().floor().max(1.0) as u32;
    let cols = (n + rows - 1) / rows;

    let interior_w = (world.width - 2 * margin).max(1);
    let interior_h = (world.height - 2 * margin).max(1);

    for y in 0..world.height {
        for x in 0..world.width {
            let id = ParcelId(world.parcels.len() as u32);
            let interior =
                x >= margin && x < world.width - margin && y >= margin && y < world.height - margin;
            let neighborhood = if interior {
                let col = ((x - margin) as u32 * cols) / interior_w as u32;
                let row = ((y - margin) as u32 * rows) / interior_h as u32;
                (row * cols + col).min(n - 1) + 1
            } else {
                0
            };
            world.parcels.push(Parcel::new(id, GridPoint::new(x, y), neighborhood));
            world.push_parcel_cell(id);
        }
    }
}

/// Carve a road lattice through the interior and register it twice: as a
/// per-parcel road flag used by tile stepping, and as a node graph with
/// Euclidean edge weights used by the A* router.
fn lay_out_roads(world: &mut World) {
    let margin = world.params.edge_margin;
    let spacing = world.params.road_spacing;

    for y in margin..world.height - margin {
        for x in margin..world.width - margin {
            if (x - margin) % spacing == 0 || (y - margin) % spacing == 0 {
                let parcel = world.parcel_at(x, y);
                world.parcel_mut(parcel).road_id = 1;
            }
        }
    }

    // nodes at lattice intersections, edges along the lattice lines
    let xs: Vec<i32> = (margin..world.width - margin)
        .filter(|x| (x - margin) % spacing == 0)
        .collect();
    let ys: Vec<i32> = (margin..world.height - margin)
        .filter(|y| (y - margin) % spacing == 0)
        .collect();

    let mut grid_nodes = vec![vec![None; xs.len()]; ys.len()];
    for (yi, &y) in ys.iter().enumerate() {
        for (xi, &x) in xs.iter().enumerate() {
            let node = world.roads.add_node(GridPoint::new(x, y));
            grid_nodes[yi][xi] = Some(node);
            if xi > 0 {
                world.roads.link(grid_nodes[yi][xi - 1].unwrap(), node);
            }
            if yi > 0 {
                world.roads.link(grid_nodes[yi - 1][xi].unwrap(), node);
            }
        }
    }
}

/// Put a structure on every free buildable off-road parcel; most get homes,
/// some get businesses, some both.
fn add_structures(world: &mut World) {
    let mut num_homes = 0usize;
    let mut num_businesses = 0usize;

    for parcel_idx in 0..world.parcels.len() {
        let parcel_id = ParcelId(parcel_idx as u32);
        {
            let parcel = &world.parcels[parcel_idx];
            if !parcel.is_buildable() || parcel.is_occupied() || parcel.road_id > 0 {
                continue;
            }
        }

        let structure_id = StructureId(world.structures.len() as u32);
        world.structures.push(Structure::new(parcel_id));
        world.parcels[parcel_idx].structure = Some(structure_id);

        let should_add_homes: f64 = world.rng.gen();
        let should_add_businesses: f64 = world.rng.gen();

        let mut home_capacity = 0;
        let mut business_capacity = 0;

        if should_add_homes < world.params.home_structure_probability {
            home_capacity = world.params.homes_per_structure;
            for _ in 0..home_capacity {
                add_home(world, structure_id, parcel_id);
                num_homes += 1;
            }
        }
        if should_add_businesses < world.params.business_structure_probability {
            business_capacity = world.params.businesses_per_structure;
            for _ in 0..business_capacity {
                add_business(world, structure_id, parcel_id);
                num_businesses += 1;
            }
        }

        let structure = &mut world.structures[structure_id.idx()];
        structure.home_capacity = home_capacity;
        structure.business_capacity = business_capacity;
    }

    tracing::debug!(num_homes, num_businesses, "structures placed");
}

fn add_home(world: &mut World, structure: StructureId, parcel: ParcelId) {
    let monthly_rent = draw_monthly_rent(world);

    let has_water = world.rng.gen::<f64>() < world.params.probability_water;
    let has_electricity = world.rng.gen::<f64>() < world.params.probability_electricity;
    let has_sanitation = world.rng.gen::<f64>() < world.params.probability_sanitation;

    let expected_electricity_cost = if has_electricity {
        let span = (world.params.max_electric_cost - world.params.min_electric_cost) as i32;
        world.params.min_electric_cost + world.rng.gen_range(0..span) as f64
    } else {
        0.0
    };
    let expected_water_cost = if has_water {
        world.params.running_water_monthly_cost
    } else {
        0.0
    };

    let home_id = HomeId(world.homes.len() as u32);
    world.homes.push(Home {
        structure,
        monthly_rent,
        has_water,
        has_electricity,
        has_sanitation,
        expected_electricity_cost,
        expected_water_cost,
        household: None,
    });
    world.structures[structure.idx()].homes.push(home_id);
    world.available_homes.push(home_id);
    world.all_home_locations.push(parcel);
}

/// Rent bracket from the empirical distribution, plus a uniform draw within
/// the bracket
fn draw_monthly_rent(world: &mut World) -> f64 {
    let rn: f64 = world.rng.gen();
    let mut cumulative = 0.0;
    for (i, &mass) in world.params.rent_distribution.iter().enumerate() {
        cumulative += mass;
        if rn <= cumulative {
            let base = world.params.rent_brackets[i];
            return base + world.rng.gen_range(0..base as i32) as f64;
        }
    }
    // distributions validate to sum 1; this is only reachable through
    // floating point rounding on the last bracket
    let base = *world.params.rent_brackets.last().expect("nonempty brackets");
    base + world.rng.gen_range(0..base as i32) as f64
}

fn add_business(world: &mut World, structure: StructureId, parcel: ParcelId) {
    let cap = world.params.informal_business_capacity();
    let employee_capacity = if cap == 0 {
        1
    } else {
        1 + world.rng.gen_range(0..cap)
    };

    let id = crate::core::types::BusinessId(world.businesses.len() as u32);
    world.businesses.push(Business {
        structure,
        employee_capacity,
        employees: Vec::new(),
    });
    world.structures[structure.idx()].businesses.push(id);
    world.all_business_locations.push(parcel);
}

fn formal_employee_capacity(world: &mut World) -> u32 {
    let cap = world.params.formal_business_capacity();
    if cap == 0 {
        1
    } else {
        1 + world.rng.gen_range(0..cap)
    }
}

/// Host a facility on a random buildable parcel, creating a structure there
/// if the parcel has none yet
fn facility_site(world: &mut World) -> Option<(StructureId, ParcelId)> {
    let candidates: Vec<ParcelId> = world
        .parcels
        .iter()
        .filter(|p| p.is_buildable() && p.road_id == 0)
        .map(|p| p.id)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let parcel = candidates[world.rng.gen_range(0..candidates.len())];
    let structure = match world.structure_on(parcel) {
        Some(s) => s,
        None => {
            let id = StructureId(world.structures.len() as u32);
            world.structures.push(Structure::new(parcel));
            world.parcels[parcel.idx()].structure = Some(id);
            id
        }
    };
    Some((structure, parcel))
}

fn add_facilities(world: &mut World) {
    for _ in 0..world.params.num_schools {
        let Some((structure, parcel)) = facility_site(world) else {
            break;
        };
        let employee_capacity = formal_employee_capacity(world);
        let id = crate::core::types::SchoolId(world.schools.len() as u32);
        world.schools.push(School {
            structure,
            student_capacity: world.params.school_capacity(),
            students: Vec::new(),
            employee_capacity,
            employees: Vec::new(),
        });
        world.structures[structure.idx()].schools.push(id);
        world.all_school_locations.push(parcel);
    }

    for _ in 0..world.params.num_health_facilities {
        let Some((structure, _)) = facility_site(world) else {
            break;
        };
        let employee_capacity = formal_employee_capacity(world);
        let id = crate::core::types::HealthFacilityId(world.health_facilities.len() as u32);
        world.health_facilities.push(HealthFacility {
            structure,
            employee_capacity,
            employees: Vec::new(),
        });
        world.structures[structure.idx()].health_facilities.push(id);
    }

    for i in 0..world.params.num_religious_facilities {
        let Some((structure, parcel)) = facility_site(world) else {
            break;
        };
        let employee_capacity = formal_employee_capacity(world);
        let kind = if i % 2 == 0 {
            ReligiousFacilityKind::Church
        } else {
            ReligiousFacilityKind::Mosque
        };
        let id = crate::core::types::ReligiousFacilityId(world.religious_facilities.len() as u32);
        world.religious_facilities.push(ReligiousFacility {
            structure,
            kind,
            employee_capacity,
            employees: Vec::new(),
        });
        world
            .structures[structure.idx()]
            .religious_facilities
            .push(id);
        world.all_religious_locations.push(parcel);
    }
}

fn add_water_and_sanitation(world: &mut World) {
    let candidates: Vec<ParcelId> = world
        .parcels
        .iter()
        .filter(|p| p.is_buildable())
        .map(|p| p.id)
        .collect();
    if candidates.is_empty() {
        return;
    }
    for _ in 0..world.params.num_water_points {
        let parcel = candidates[world.rng.gen_range(0..candidates.len())];
        world.all_water_points.push(parcel);
    }
    for _ in 0..world.params.num_sanitation_points {
        let parcel = candidates[world.rng.gen_range(0..candidates.len())];
        world.all_sanitation_points.push(parcel);
    }
}
