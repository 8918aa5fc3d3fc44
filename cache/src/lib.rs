//! In-memory entity cache fed by chat gateway events.
//!
//! Decoded events go through [`Caches::handle_event`], which applies them to
//! per-category stores and returns them annotated with the values they
//! displaced. Everything else is read-side: facade lookups and derived
//! queries such as effective channel permissions.

pub mod caches;
pub mod config;
pub mod events;
pub mod flags;
pub mod model;
pub mod permissions;
pub mod store;

pub use caches::Caches;
pub use config::CacheConfig;
pub use events::GatewayEvent;
pub use flags::CacheFlags;
pub use permissions::Permissions;

#[cfg(test)]
mod integration_tests;
