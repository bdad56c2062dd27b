//! mart-axum: Axum adapter for mart services.
//!
//! Mounts registered services as REST routes and renders errors as
//! Feathers-style JSON.

pub mod app;
mod error;
pub mod params;
pub mod rest;
pub mod state;

pub use app::{axum, AxumApp};
pub use error::MartAxumError;
pub use params::{FromRestParams, RestParams};
pub use rest::tenant_from_headers;
pub use state::MartAxumState;
