//! HTTP API handlers for melo-ls

pub mod health;
pub mod search_lyrics;

pub use health::health_routes;
pub use search_lyrics::search_routes;
