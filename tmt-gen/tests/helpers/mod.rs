//! Test Helper Utilities
//!
//! Shared utilities for testing tmt-gen

#[path = "../../src/http/mock.rs"]
pub mod mock_gateway;
pub mod fixtures;

pub use fixtures::{search_item, search_page, tmio_leaderboard, tmio_map};
pub use mock_gateway::MockGateway;
