//! Day-by-day population dynamics of a honeybee colony in a frame hive.
//!
//! The [`engine`] advances a single colony with fixed rates; [`season`]
//! drives it from a bloom calendar, generated weather and a honey ledger.
//! [`manager`] and [`analysis`] run configured simulations and summarize
//! their trajectories.

pub mod analysis;
pub mod brood;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod hive;
pub mod honey;
pub mod manager;
pub mod model;
pub mod queen;
pub mod season;
pub mod stats;
pub mod weather;
