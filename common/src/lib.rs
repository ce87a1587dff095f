// Common library for the campus notice scheduler: pipeline, storage, delivery and ambient stack

pub mod bootstrap;
pub mod composer;
pub mod config;
pub mod db;
pub mod delivery;
pub mod errors;
pub mod models;
pub mod schedule;
pub mod scheduler;
pub mod source;
pub mod strategy;
pub mod telemetry;
