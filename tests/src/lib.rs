//! Shared test infrastructure: in-memory broker mocks and fixtures.

pub mod fixtures;
pub mod mocks;
