// Hero API module.
// Provides the HTTP client and types for the hero REST API.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::HeroApiClient;
pub use types::{ApiResponse, Hero};
