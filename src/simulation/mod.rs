//! Simulation systems
//!
//! Population initialization, the daily household budget engine, resident
//! goal selection and movement, and the tick orchestrator that binds them.

pub mod actions;
pub mod budget;
pub mod goals;
pub mod identity;
pub mod movement;
pub mod observer;
pub mod population;
pub mod social;
pub mod tick;
pub mod wealth;
