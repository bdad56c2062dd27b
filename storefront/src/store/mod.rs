//! Document persistence for products and purchase requests.

pub mod document;
pub mod memory;

pub use document::{compare_values, field, DocumentStore, Query, SortDirection};
pub use memory::MemoryDocumentStore;

pub const PRODUCTS: &str = "products";
pub const PURCHASE_REQUESTS: &str = "purchase_requests";
