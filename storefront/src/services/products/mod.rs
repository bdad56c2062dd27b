pub mod product_params;
pub mod products_hooks;
pub mod products_service;
pub mod products_shared;

pub use product_params::ProductParams;
pub use products_service::ProductsService;
