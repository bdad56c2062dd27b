//! Shopper-facing catalog: browsing, featured products and detail pages.

pub mod browse;
pub mod detail;
pub mod routes;

pub use browse::{featured, matches_search, CatalogView};
pub use detail::ProductDetail;
