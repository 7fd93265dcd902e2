pub mod client;
pub mod types;

pub use client::{CatalogClient, CatalogError, CatalogRequest};
pub use types::*;
