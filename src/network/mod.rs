//! Network catalog.
//!
//! A static table of well-known networks, extendable from configuration and
//! at runtime. The executor treats every profile the same way regardless of
//! where it came from.

pub mod catalog;
pub mod profile;

pub use catalog::{CatalogError, NetworkCatalog};
pub use profile::{default_profiles, NetworkProfile};
