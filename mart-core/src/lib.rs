//! mart-core: transport-agnostic core for the storefront.
//!
//! Services are registered by name on a [`MartApp`] and called through a
//! hook pipeline (before → service → after, error hooks on failure).

pub mod app;
pub mod config;
pub mod errors;
pub mod hooks;
pub mod registry;
pub mod service;
pub mod tenant;

pub use app::{MartApp, ServiceHandle};
pub use config::{MartConfig, MartConfigSnapshot};
pub use errors::{ErrorKind, MartError, MartResult};
pub use hooks::{AfterHook, BeforeHook, ErrorHook, HookContext, HookResult, ServiceHooks};
pub use registry::ServiceRegistry;
pub use service::{MartService, ServiceCapabilities, ServiceMethodKind};
pub use tenant::{TenantContext, TenantId};
