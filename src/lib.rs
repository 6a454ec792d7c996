//! Ring-Signal Traffic Simulation Library
//!
//! A concurrent simulation of a ring of traffic signals that take turns
//! holding green, release vehicles at random while they do, and watch for
//! rear-end collisions between vehicles released by adjacent signals.

pub mod simulation;
