//! HTTP API handlers

pub mod associations;
pub mod health;
pub mod indicators;
pub mod sources;
pub mod targets;

pub use associations::association_routes;
pub use health::health_routes;
pub use indicators::indicator_routes;
pub use sources::source_routes;
pub use targets::target_routes;
