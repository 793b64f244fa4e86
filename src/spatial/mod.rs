//! Spatial support: the road-node graph and pathfinding

pub mod path;
