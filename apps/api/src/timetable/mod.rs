// Timetable generation core.
// Catalog Reader (catalog) → Allocation Engine (engine, audit) → Commit Controller (controller).
// The engine is pure; all store access goes through store::RegenerationTx.

pub mod audit;
pub mod catalog;
pub mod controller;
pub mod engine;
pub mod handlers;
pub mod store;

#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
pub mod memory;
